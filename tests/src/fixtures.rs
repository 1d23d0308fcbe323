//! Shared harness for the integration flows.

use shared_types::ManualClock;
use std::sync::{Arc, OnceLock};
use tally_telemetry::{init_telemetry, TelemetryConfig, TelemetryError, TelemetryGuard};
use tl_01_record_store::InMemoryRecordStore;
use tl_02_session_verifier::SessionConfig;
use tl_03_consistency_engine::EngineConfig;
use tl_04_access_gateway::{
    AccessGateway, CategoryRequest, GatewayResponse, GroupRequest, LoginRequest, RecordRequest,
    RegisterRequest, SessionCookies,
};

/// 2023-11-14T22:13:20Z
pub const START: u64 = 1_700_000_000;

/// Short-lived lifetime of `SessionConfig::for_testing`.
pub const ACCESS_TTL_SECS: u64 = 3_600;

/// Long-lived lifetime of `SessionConfig::for_testing`.
pub const REFRESH_TTL_SECS: u64 = 604_800;

static TELEMETRY: OnceLock<Result<TelemetryGuard, TelemetryError>> = OnceLock::new();

pub type Gateway = AccessGateway<InMemoryRecordStore>;

pub struct Harness {
    pub gateway: Arc<Gateway>,
    pub store: Arc<InMemoryRecordStore>,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new() -> Self {
        TELEMETRY.get_or_init(|| init_telemetry(TelemetryConfig::for_testing()));

        let store = Arc::new(InMemoryRecordStore::new());
        let clock = ManualClock::starting_at(START);
        let gateway = Arc::new(AccessGateway::assemble_with_clock(
            store.clone(),
            SessionConfig::for_testing(),
            EngineConfig::for_testing(),
            Arc::new(clock.clone()),
        ));
        Self {
            gateway,
            store,
            clock,
        }
    }

    /// Register and log in a regular account.
    pub async fn user(&self, name: &str) -> SessionCookies {
        let response = self.gateway.register(&register_request(name)).await;
        assert_ok(&response);
        self.login(name).await
    }

    /// Register and log in an administrator.
    pub async fn admin(&self, name: &str) -> SessionCookies {
        let response = self.gateway.register_admin(&register_request(name)).await;
        assert_ok(&response);
        self.login(name).await
    }

    pub async fn login(&self, name: &str) -> SessionCookies {
        let response = self
            .gateway
            .login(&LoginRequest {
                email: email(name),
                password: password(name),
            })
            .await;
        assert_ok(&response);
        let data = response.data.unwrap();
        SessionCookies::new(
            data["accessToken"].as_str().unwrap(),
            data["refreshToken"].as_str().unwrap(),
        )
    }

    pub async fn category(&self, admin: &SessionCookies, category_type: &str, color: &str) {
        let response = self
            .gateway
            .create_category(
                admin,
                &CategoryRequest {
                    category_type: category_type.into(),
                    color: color.into(),
                },
            )
            .await;
        assert_ok(&response);
    }

    pub async fn record(&self, cookies: &SessionCookies, username: &str, category_type: &str, amount: f64) {
        let response = self
            .gateway
            .create_record(
                cookies,
                username,
                &RecordRequest {
                    username: username.into(),
                    amount,
                    category_type: category_type.into(),
                },
            )
            .await;
        assert_ok(&response);
    }

    /// Create `name` as `creator` with the named members.
    pub async fn group(&self, creator: &SessionCookies, name: &str, members: &[&str]) -> GatewayResponse {
        self.gateway
            .create_group(
                creator,
                &GroupRequest {
                    name: name.into(),
                    member_emails: members.iter().map(|m| email(m)).collect(),
                },
            )
            .await
    }
}

pub fn email(name: &str) -> String {
    format!("{name}@tally.test")
}

fn password(name: &str) -> String {
    format!("{name}-secret")
}

fn register_request(name: &str) -> RegisterRequest {
    RegisterRequest {
        username: name.into(),
        email: email(name),
        password: password(name),
    }
}

#[track_caller]
pub fn assert_ok(response: &GatewayResponse) {
    assert!(response.is_ok(), "{:?}: {:?}", response.status, response.error);
}
