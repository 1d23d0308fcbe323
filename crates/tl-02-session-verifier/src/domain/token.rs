//! # Token Codec
//!
//! Compact HS256 tokens: `base64url(header).base64url(claims).base64url(mac)`.
//!
//! ## Security Properties
//!
//! - **HMAC-SHA256 Signatures**: header and payload are signed with the
//!   configured secret
//! - **Constant-time comparison**: MAC checks go through `Mac::verify_slice`
//! - **Signature before expiry**: an `Expired` error is only returned for a
//!   token whose signature verified, so its claims can be trusted

use super::claims::TokenClaims;
use super::errors::TokenError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The only signing algorithm accepted.
pub const TOKEN_ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Signs and verifies tokens with one shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    /// Create a codec for `secret`.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Sign a payload.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let header = serde_json::to_vec(&TokenHeader::hs256())
            .map_err(|e| TokenError::Encoding(e.to_string()))?;
        let payload = serde_json::to_vec(claims).map_err(|e| TokenError::Encoding(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let mac = self.mac(signing_input.as_bytes())?.finalize().into_bytes();

        Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(mac)))
    }

    /// Verify a token's signature and expiry against `now` (Unix seconds).
    ///
    /// A token is expired once `now >= exp`.
    pub fn decode(&self, token: &str, now: u64) -> Result<TokenClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(sig_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed("expected three segments".to_string()));
        };

        let signature = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| TokenError::Malformed("signature is not base64url".to_string()))?;
        let signing_input_len = header_b64.len() + 1 + payload_b64.len();
        self.mac(token[..signing_input_len].as_bytes())?
            .verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let header: TokenHeader = decode_segment(header_b64, "header")?;
        if header.alg != TOKEN_ALGORITHM {
            return Err(TokenError::Malformed(format!(
                "unsupported algorithm {}",
                header.alg
            )));
        }

        let claims: TokenClaims = decode_segment(payload_b64, "payload")?;
        if now >= claims.exp {
            return Err(TokenError::Expired {
                claims: Box::new(claims),
            });
        }
        Ok(claims)
    }

    fn mac(&self, input: &[u8]) -> Result<HmacSha256, TokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;
        mac.update(input);
        Ok(mac)
    }
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str, what: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed(format!("{what} is not base64url")))?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::Malformed(format!("{what}: {e}")))
}
