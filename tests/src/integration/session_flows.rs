//! # Session Flows
//!
//! Login through rotation to reauthentication, seen from the gateway:
//!
//! 1. A fresh pair is accepted without rotation.
//! 2. An expired short-lived token is replaced and the response carries the
//!    renewed cookie plus the one-time advisory.
//! 3. An expired long-lived token forces a new login.
//! 4. Tokens of two different accounts are never accepted together.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use shared_types::StatusClass;
    use tl_02_session_verifier::ROTATION_ADVISORY;
    use tl_04_access_gateway::{SessionCookies, ACCESS_COOKIE, REFRESH_COOKIE};

    #[tokio::test]
    async fn test_fresh_pair_needs_no_rotation() {
        let h = Harness::new();
        let ann = h.user("ann").await;

        let response = h.gateway.list_categories(&ann).await;
        assert_ok(&response);
        assert!(response.renewed_access_cookie.is_none());
        assert!(response.refreshed_token_message.is_none());
    }

    #[tokio::test]
    async fn test_rotation_end_to_end() {
        let h = Harness::new();
        let ann = h.user("ann").await;
        h.clock.advance(ACCESS_TTL_SECS + 1);

        let response = h.gateway.list_categories(&ann).await;
        assert_ok(&response);
        assert_eq!(response.refreshed_token_message.as_deref(), Some(ROTATION_ADVISORY));

        let renewed = response.renewed_access_cookie.unwrap();
        assert_eq!(renewed.name, ACCESS_COOKIE);
        assert_eq!(renewed.path, "/api");
        assert!(renewed.http_only && renewed.secure);
        assert_ne!(Some(&renewed.value), ann.access_token.as_ref());

        // The client swaps in the renewed token; no further rotation.
        let next = SessionCookies::new(renewed.value, ann.refresh_token.clone().unwrap());
        let response = h.gateway.list_categories(&next).await;
        assert_ok(&response);
        assert!(response.renewed_access_cookie.is_none());
    }

    #[tokio::test]
    async fn test_expired_long_token_requires_login() {
        let h = Harness::new();
        let ann = h.user("ann").await;
        h.clock.advance(REFRESH_TTL_SECS);

        let response = h.gateway.list_categories(&ann).await;
        assert_eq!(response.status, StatusClass::Unauthorized);
        assert_eq!(response.error.as_deref(), Some("Perform login"));
        assert!(response.renewed_access_cookie.is_none());

        let fresh = h.login("ann").await;
        assert_ok(&h.gateway.list_categories(&fresh).await);
    }

    #[tokio::test]
    async fn test_denied_rotation_sets_no_cookie() {
        let h = Harness::new();
        let ann = h.user("ann").await;
        h.clock.advance(ACCESS_TTL_SECS + 1);

        let response = h.gateway.delete_group(&ann, "nope").await;
        assert_eq!(response.status, StatusClass::Unauthorized);
        assert!(response.renewed_access_cookie.is_none());
        assert!(response.refreshed_token_message.is_none());
    }

    #[tokio::test]
    async fn test_mixed_pairs_rejected() {
        let h = Harness::new();
        let ann = h.user("ann").await;
        let bob = h.user("bob").await;

        let mixed = SessionCookies::new(
            ann.access_token.clone().unwrap(),
            bob.refresh_token.clone().unwrap(),
        );
        let response = h.gateway.list_categories(&mixed).await;
        assert_eq!(response.status, StatusClass::Unauthorized);
    }

    #[tokio::test]
    async fn test_missing_or_tampered_tokens_rejected() {
        let h = Harness::new();
        let ann = h.user("ann").await;

        let half = SessionCookies {
            access_token: ann.access_token.clone(),
            refresh_token: None,
        };
        assert_eq!(
            h.gateway.list_categories(&half).await.status,
            StatusClass::Unauthorized
        );

        let mut forged = ann.access_token.clone().unwrap();
        forged.push('x');
        let tampered = SessionCookies::new(forged, ann.refresh_token.clone().unwrap());
        assert_eq!(
            h.gateway.list_categories(&tampered).await.status,
            StatusClass::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_logout_clears_both_cookies() {
        let h = Harness::new();
        let ann = h.user("ann").await;

        let response = h.gateway.logout(&ann).await;
        assert_ok(&response);
        let names: Vec<&str> = response.session_cookies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec![ACCESS_COOKIE, REFRESH_COOKIE]);
        assert!(response.session_cookies.iter().all(|c| c.value.is_empty()));

        assert_eq!(h.gateway.logout(&ann).await.status, StatusClass::ClientError);
    }
}
