//! # Access Gateway Service
//!
//! One method per HTTP-level operation. Each guarded method verifies the
//! caller's session against the operation's requirement first and only then
//! calls the Consistency Engine.
//!
//! ## Requirements
//!
//! | Operation | Requirement |
//! |-----------|-------------|
//! | `register`, `register_admin`, `login`, `logout` | none |
//! | `list_categories`, `create_group` | `Authenticated` |
//! | `create_category`, `update_category`, `delete_categories` | `Admin` |
//! | `delete_account`, `delete_group`, `insert_members`, `pull_members` | `Admin` |
//! | `list_accounts`, `list_groups`, `list_all_records`, `delete_records` | `Admin` |
//! | `add_members`, `remove_members` | `GroupMember` |
//! | `get_group`, `list_group_records`, `list_group_records_by_category` | `Admin` or `GroupMember` |
//! | `get_account`, `create_record`, `list_user_records` | `Admin` or `Owner` |
//! | `list_user_records_by_category`, `delete_record` | `Admin` or `Owner` |

use crate::adapters::Argon2Hasher;
use crate::domain::{
    AccountView, CategoryRequest, CookieDirective, DeleteRecordRequest, DeleteRecordsRequest,
    GatewayError, GatewayResponse, GroupRequest, LoginRequest, MembersRequest, RecordRequest,
    RecordView, RegisterRequest, SessionCookies, ACCESS_COOKIE, REFRESH_COOKIE,
};
use crate::ports::CredentialHasher;
use serde::Serialize;
use serde_json::{json, Value};
use shared_types::{Account, Email, Group, Role, SystemTimeSource, TimeSource};
use std::collections::HashMap;
use std::sync::Arc;
use tl_01_record_store::{RecordFilter, RecordQuery, RecordStore, StoreError};
use tl_02_session_verifier::{
    Identity, Requirement, SessionConfig, SessionVerificationApi, SessionVerifier,
    VerificationOutcome,
};
use tl_03_consistency_engine::{ConsistencyApi, ConsistencyEngine, EngineConfig};
use tracing::{debug, info, warn};

/// Verify the session or return the failure response from the caller.
macro_rules! authorize_or_respond {
    ($gateway:expr, $cookies:expr, $requirement:expr) => {
        match $gateway.authorize($cookies, &$requirement) {
            Ok(outcome) => outcome,
            Err(e) => return GatewayResponse::failure(&e),
        }
    };
}

/// Look up a group or return the failure response from the caller.
macro_rules! group_or_respond {
    ($gateway:expr, $name:expr) => {
        match $gateway.engine.find_group($name).await {
            Ok(group) => group,
            Err(e) => return GatewayResponse::failure(&GatewayError::from(e)),
        }
    };
}

/// Access Gateway over a shared record store.
pub struct AccessGateway<S: RecordStore> {
    store: Arc<S>,
    verifier: Arc<dyn SessionVerificationApi>,
    engine: Arc<dyn ConsistencyApi>,
    hasher: Arc<dyn CredentialHasher>,
}

impl<S: RecordStore + 'static> AccessGateway<S> {
    /// Create a gateway from its collaborators.
    pub fn new(
        store: Arc<S>,
        verifier: Arc<dyn SessionVerificationApi>,
        engine: Arc<dyn ConsistencyApi>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            store,
            verifier,
            engine,
            hasher,
        }
    }

    /// Wire the default verifier, engine and Argon2 hasher on the wall clock.
    pub fn assemble(store: Arc<S>, session: SessionConfig, engine: EngineConfig) -> Self {
        Self::assemble_with_clock(store, session, engine, Arc::new(SystemTimeSource))
    }

    /// Wire the default collaborators on an explicit clock.
    pub fn assemble_with_clock(
        store: Arc<S>,
        session: SessionConfig,
        engine: EngineConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        let verifier = Arc::new(SessionVerifier::with_clock(session, clock.clone()));
        let engine = Arc::new(ConsistencyEngine::with_clock(store.clone(), engine, clock));
        Self::new(store, verifier, engine, Arc::new(Argon2Hasher::new()))
    }

    fn authorize(
        &self,
        cookies: &SessionCookies,
        requirement: &Requirement,
    ) -> Result<VerificationOutcome, GatewayError> {
        let outcome = self.verifier.verify(
            cookies.access_token.as_deref(),
            cookies.refresh_token.as_deref(),
            requirement,
        );
        if outcome.granted {
            Ok(outcome)
        } else {
            Err(GatewayError::from_denial(outcome.reason))
        }
    }

    /// Serialize the result and attach the renewed cookie after a rotation.
    fn respond<T: Serialize>(
        &self,
        outcome: Option<&VerificationOutcome>,
        result: Result<T, GatewayError>,
    ) -> GatewayResponse {
        let data = result.and_then(|data| serde_json::to_value(data).map_err(GatewayError::from));
        let mut response = match data {
            Ok(value) => GatewayResponse::ok(value),
            Err(e) => {
                debug!(status = ?e.status(), "[tl-04] Operation failed: {}", e);
                GatewayResponse::failure(&e)
            }
        };

        if let Some(token) = outcome.and_then(|o| o.rotated_short_token.as_ref()) {
            response.renewed_access_cookie =
                Some(CookieDirective::access(token.clone(), self.verifier.config()));
            if response.is_ok() {
                response.refreshed_token_message =
                    outcome.and_then(|o| o.advisory()).map(str::to_string);
            }
        }
        response
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Register a regular account.
    pub async fn register(&self, request: &RegisterRequest) -> GatewayResponse {
        let result = self.create_account(request, Role::Regular).await;
        self.respond(None, result.map(|_| json!({ "message": "User added successfully" })))
    }

    /// Register an administrator account.
    pub async fn register_admin(&self, request: &RegisterRequest) -> GatewayResponse {
        let result = self.create_account(request, Role::Admin).await;
        self.respond(None, result.map(|_| json!({ "message": "Admin added successfully" })))
    }

    async fn create_account(&self, request: &RegisterRequest, role: Role) -> Result<(), GatewayError> {
        if request.username.is_empty() || request.email.is_empty() || request.password.is_empty() {
            return Err(GatewayError::Validation(
                "At least one of the parameters in the request body is an empty string".into(),
            ));
        }
        let email = parse_email(&request.email)?;

        if self.store.find_account_by_username(&request.username).await?.is_some() {
            return Err(GatewayError::Validation(
                "The username in the request body identifies an already existing user".into(),
            ));
        }
        if self.store.find_account_by_email(&email).await?.is_some() {
            return Err(GatewayError::Validation(
                "The email in the request body identifies an already existing user".into(),
            ));
        }

        let hash = self
            .hasher
            .hash(&request.password)
            .map_err(|e| GatewayError::Internal(e.to_string()))?;
        match self
            .store
            .create_account(Account::new(request.username.clone(), email, hash, role))
            .await
        {
            Ok(()) => {
                info!("[tl-04] Registered {} account {}", role, request.username);
                Ok(())
            }
            Err(StoreError::Duplicate(key)) => Err(GatewayError::Validation(format!(
                "{key} identifies an already existing user"
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials, issue a token pair and persist the long-lived one.
    pub async fn login(&self, request: &LoginRequest) -> GatewayResponse {
        match self.issue_session(request).await {
            Ok((account, pair)) => {
                let config = self.verifier.config();
                let mut response = self.respond(None, Ok(&pair));
                response.session_cookies = vec![
                    CookieDirective::access(pair.access_token.clone(), config),
                    CookieDirective::refresh(pair.refresh_token.clone(), config),
                ];
                info!("[tl-04] {} logged in", account.username);
                response
            }
            Err(e) => self.respond::<()>(None, Err(e)),
        }
    }

    async fn issue_session(
        &self,
        request: &LoginRequest,
    ) -> Result<(Account, tl_02_session_verifier::TokenPair), GatewayError> {
        if request.email.is_empty() || request.password.is_empty() {
            return Err(GatewayError::Validation(
                "At least one of the parameters in the request body is an empty string".into(),
            ));
        }
        let email = parse_email(&request.email)?;
        let account = self.store.find_account_by_email(&email).await?.ok_or_else(|| {
            GatewayError::Validation(
                "The email in the request body does not identify a user in the database".into(),
            )
        })?;
        if !self.hasher.verify(&request.password, &account.password_hash) {
            return Err(GatewayError::Validation(
                "The supplied password does not match with the one in the database".into(),
            ));
        }

        let pair = self.verifier.issue_pair(&Identity::from_account(&account))?;
        self.store
            .update_refresh_token(&account.username, Some(pair.refresh_token.clone()))
            .await?;
        Ok((account, pair))
    }

    /// Clear the persisted long-lived token and both cookies.
    pub async fn logout(&self, cookies: &SessionCookies) -> GatewayResponse {
        let result = self.end_session(cookies).await;
        let ok = result.is_ok();
        let mut response = self.respond(None, result.map(|_| json!({ "message": "User logged out" })));
        if ok {
            let config = self.verifier.config();
            response.session_cookies = vec![
                CookieDirective::clear(ACCESS_COOKIE, config),
                CookieDirective::clear(REFRESH_COOKIE, config),
            ];
        }
        response
    }

    async fn end_session(&self, cookies: &SessionCookies) -> Result<(), GatewayError> {
        let token = cookies
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                GatewayError::Validation("The request does not have a refresh token in the cookies".into())
            })?;
        let account = self.store.find_account_by_refresh_token(token).await?.ok_or_else(|| {
            GatewayError::Validation(
                "The refresh token in the request's cookies does not represent a user in the database"
                    .into(),
            )
        })?;
        self.store.update_refresh_token(&account.username, None).await?;
        info!("[tl-04] {} logged out", account.username);
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// All categories, oldest first.
    pub async fn list_categories(&self, cookies: &SessionCookies) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::Authenticated);
        let result = self.store.list_categories().await.map_err(GatewayError::from);
        self.respond(Some(&outcome), result)
    }

    /// Create a category.
    pub async fn create_category(&self, cookies: &SessionCookies, request: &CategoryRequest) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::Admin);
        let result = self
            .engine
            .create_category(&request.category_type, &request.color)
            .await
            .map_err(GatewayError::from);
        self.respond(Some(&outcome), result)
    }

    /// Rename `old_type` and recolor it.
    pub async fn update_category(
        &self,
        cookies: &SessionCookies,
        old_type: &str,
        request: &CategoryRequest,
    ) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::Admin);
        let result = self
            .engine
            .update_category(old_type, &request.category_type, &request.color)
            .await
            .map_err(GatewayError::from);
        self.respond(Some(&outcome), result)
    }

    /// Delete categories, merging their records into the fallback.
    pub async fn delete_categories(&self, cookies: &SessionCookies, types: &[String]) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::Admin);
        let result = match self.engine.remove_categories(types).await {
            Ok(report) if report.removed.is_empty() && !report.not_found.is_empty() => Err(
                GatewayError::Validation("None of the requested categories exist".into()),
            ),
            other => other.map_err(GatewayError::from),
        };
        self.respond(Some(&outcome), result)
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Every account, without credentials.
    pub async fn list_accounts(&self, cookies: &SessionCookies) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::Admin);
        let result = self
            .store
            .list_accounts()
            .await
            .map(|accounts| accounts.iter().map(AccountView::from).collect::<Vec<_>>())
            .map_err(GatewayError::from);
        self.respond(Some(&outcome), result)
    }

    /// One account, without credentials.
    pub async fn get_account(&self, cookies: &SessionCookies, username: &str) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::owner_or_admin(username));
        let result = self.existing_account(username).await.map(|a| AccountView::from(&a));
        self.respond(Some(&outcome), result)
    }

    /// Delete a non-admin account and everything that depends on it.
    pub async fn delete_account(&self, cookies: &SessionCookies, email: &str) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::Admin);
        let result = self.engine.remove_account(email).await.map_err(GatewayError::from);
        self.respond(Some(&outcome), result)
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Create a group with the caller as a member.
    pub async fn create_group(&self, cookies: &SessionCookies, request: &GroupRequest) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::Authenticated);
        let result = match outcome.identity.as_ref().map(|i| parse_email(&i.email)) {
            Some(Ok(creator)) => self
                .engine
                .create_group(&request.name, &creator, &request.member_emails)
                .await
                .map_err(GatewayError::from),
            Some(Err(e)) => Err(e),
            None => Err(GatewayError::Internal("granted outcome without identity".into())),
        };
        self.respond(Some(&outcome), result)
    }

    /// Every group.
    pub async fn list_groups(&self, cookies: &SessionCookies) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::Admin);
        let result = self
            .store
            .list_groups()
            .await
            .map(|groups| groups.iter().map(group_view).collect::<Vec<_>>())
            .map_err(GatewayError::from);
        self.respond(Some(&outcome), result)
    }

    /// Read a group.
    pub async fn get_group(&self, cookies: &SessionCookies, name: &str) -> GatewayResponse {
        let group = group_or_respond!(self, name);
        let outcome = authorize_or_respond!(
            self,
            cookies,
            Requirement::member_or_admin(group.member_emails())
        );
        self.respond(Some(&outcome), Ok(json!({ "group": group_view(&group) })))
    }

    /// Add members to the caller's own group.
    pub async fn add_members(&self, cookies: &SessionCookies, name: &str, request: &MembersRequest) -> GatewayResponse {
        let group = group_or_respond!(self, name);
        let outcome = authorize_or_respond!(self, cookies, Requirement::GroupMember(group.member_emails()));
        let result = self.engine.add_members(name, &request.emails).await.map_err(GatewayError::from);
        self.respond(Some(&outcome), result)
    }

    /// Add members to any group.
    pub async fn insert_members(&self, cookies: &SessionCookies, name: &str, request: &MembersRequest) -> GatewayResponse {
        let _group = group_or_respond!(self, name);
        let outcome = authorize_or_respond!(self, cookies, Requirement::Admin);
        let result = self.engine.add_members(name, &request.emails).await.map_err(GatewayError::from);
        self.respond(Some(&outcome), result)
    }

    /// Remove members from the caller's own group.
    pub async fn remove_members(&self, cookies: &SessionCookies, name: &str, request: &MembersRequest) -> GatewayResponse {
        let group = group_or_respond!(self, name);
        let outcome = authorize_or_respond!(self, cookies, Requirement::GroupMember(group.member_emails()));
        let result = self.engine.remove_members(name, &request.emails).await.map_err(GatewayError::from);
        self.respond(Some(&outcome), result)
    }

    /// Remove members from any group.
    pub async fn pull_members(&self, cookies: &SessionCookies, name: &str, request: &MembersRequest) -> GatewayResponse {
        let _group = group_or_respond!(self, name);
        let outcome = authorize_or_respond!(self, cookies, Requirement::Admin);
        let result = self.engine.remove_members(name, &request.emails).await.map_err(GatewayError::from);
        self.respond(Some(&outcome), result)
    }

    /// Delete a group.
    pub async fn delete_group(&self, cookies: &SessionCookies, name: &str) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::Admin);
        let result = self
            .engine
            .delete_group(name)
            .await
            .map(|_| json!({ "message": "Group deleted successfully" }))
            .map_err(GatewayError::from);
        self.respond(Some(&outcome), result)
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// File a record for `username`.
    pub async fn create_record(
        &self,
        cookies: &SessionCookies,
        username: &str,
        request: &RecordRequest,
    ) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::owner_or_admin(username));
        let result = if request.username != username {
            Err(GatewayError::Validation(
                "The username in the request body does not match the one in the route".into(),
            ))
        } else {
            self.engine
                .create_record(username, &request.category_type, request.amount)
                .await
                .map_err(GatewayError::from)
        };
        self.respond(Some(&outcome), result)
    }

    /// Records of `username` matching `query`, with category colors.
    pub async fn list_user_records(
        &self,
        cookies: &SessionCookies,
        username: &str,
        query: &RecordQuery,
    ) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::owner_or_admin(username));
        let result = self.user_records(username, query).await;
        self.respond(Some(&outcome), result)
    }

    /// Records of `username` filed under `category_type`.
    pub async fn list_user_records_by_category(
        &self,
        cookies: &SessionCookies,
        username: &str,
        category_type: &str,
    ) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::owner_or_admin(username));
        let result = self.user_records_in(username, category_type).await;
        self.respond(Some(&outcome), result)
    }

    /// Every record of every account.
    pub async fn list_all_records(&self, cookies: &SessionCookies) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::Admin);
        let result = self.record_views(&RecordFilter::all()).await;
        self.respond(Some(&outcome), result)
    }

    /// Records of every member of a group.
    pub async fn list_group_records(&self, cookies: &SessionCookies, name: &str) -> GatewayResponse {
        let group = group_or_respond!(self, name);
        let outcome = authorize_or_respond!(
            self,
            cookies,
            Requirement::member_or_admin(group.member_emails())
        );
        let result = match self.member_usernames(&group).await {
            Ok(usernames) => self.record_views(&RecordFilter::by_usernames(usernames)).await,
            Err(e) => Err(e),
        };
        self.respond(Some(&outcome), result)
    }

    /// Records of every member of a group, filed under `category_type`.
    pub async fn list_group_records_by_category(
        &self,
        cookies: &SessionCookies,
        name: &str,
        category_type: &str,
    ) -> GatewayResponse {
        let group = group_or_respond!(self, name);
        let outcome = authorize_or_respond!(
            self,
            cookies,
            Requirement::member_or_admin(group.member_emails())
        );
        let result = self.group_records_in(&group, category_type).await;
        self.respond(Some(&outcome), result)
    }

    /// Delete one record of `username`.
    pub async fn delete_record(
        &self,
        cookies: &SessionCookies,
        username: &str,
        request: &DeleteRecordRequest,
    ) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::owner_or_admin(username));
        let result = self
            .engine
            .remove_record(username, &request.id)
            .await
            .map(|_| json!({ "message": "Record deleted" }))
            .map_err(GatewayError::from);
        self.respond(Some(&outcome), result)
    }

    /// Delete a batch of records, all or none.
    pub async fn delete_records(&self, cookies: &SessionCookies, request: &DeleteRecordsRequest) -> GatewayResponse {
        let outcome = authorize_or_respond!(self, cookies, Requirement::Admin);
        let result = self
            .engine
            .remove_records(&request.ids)
            .await
            .map(|removed| json!({ "message": "Records deleted", "deletedRecords": removed }))
            .map_err(GatewayError::from);
        self.respond(Some(&outcome), result)
    }

    async fn existing_account(&self, username: &str) -> Result<Account, GatewayError> {
        self.store
            .find_account_by_username(username)
            .await?
            .ok_or_else(|| GatewayError::Validation("User not found".into()))
    }

    async fn require_category(&self, category_type: &str) -> Result<(), GatewayError> {
        match self.store.find_category_by_type(category_type).await? {
            Some(_) => Ok(()),
            None => Err(GatewayError::Validation("Category not found".into())),
        }
    }

    async fn user_records(&self, username: &str, query: &RecordQuery) -> Result<Vec<RecordView>, GatewayError> {
        self.existing_account(username).await?;
        let filter = RecordFilter::from_query(query)?.with_username(username);
        self.record_views(&filter).await
    }

    async fn user_records_in(&self, username: &str, category_type: &str) -> Result<Vec<RecordView>, GatewayError> {
        self.existing_account(username).await?;
        self.require_category(category_type).await?;
        self.record_views(&RecordFilter::by_username(username).with_category(category_type))
            .await
    }

    async fn group_records_in(&self, group: &Group, category_type: &str) -> Result<Vec<RecordView>, GatewayError> {
        self.require_category(category_type).await?;
        let usernames = self.member_usernames(group).await?;
        self.record_views(&RecordFilter::by_usernames(usernames).with_category(category_type))
            .await
    }

    /// Usernames behind the group's member emails. Members whose account is
    /// gone are skipped.
    async fn member_usernames(&self, group: &Group) -> Result<Vec<String>, GatewayError> {
        let mut usernames = Vec::with_capacity(group.len());
        for member in &group.members {
            if let Some(account) = self.store.find_account_by_email(&member.email).await? {
                usernames.push(account.username);
            }
        }
        Ok(usernames)
    }

    /// Matching records with their category colors.
    async fn record_views(&self, filter: &RecordFilter) -> Result<Vec<RecordView>, GatewayError> {
        let records = self.engine.list_records(filter).await?;

        let colors: HashMap<String, String> = self
            .store
            .list_categories()
            .await?
            .into_iter()
            .map(|c| (c.category_type, c.color))
            .collect();
        let views = records
            .into_iter()
            .map(|r| {
                let color = colors.get(&r.category_type).cloned().unwrap_or_else(|| {
                    warn!("[tl-04] Record {} has no category color", r.id);
                    String::new()
                });
                RecordView::new(r, color)
            })
            .collect();
        Ok(views)
    }
}

fn parse_email(raw: &str) -> Result<Email, GatewayError> {
    Email::parse(raw).map_err(|e| GatewayError::Validation(e.to_string()))
}

fn group_view(group: &Group) -> Value {
    json!({
        "name": group.name,
        "members": group.members.iter().map(|m| json!({ "email": m.email })).collect::<Vec<_>>(),
    })
}
