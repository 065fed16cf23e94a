//! Client for the GrowthHub REST API.
//!
//! Every request funnels through one gateway: [`GrowthHubClient::execute`]
//! attaches the stored bearer credential and tenant header on the way out
//! and handles credential expiry on the way back. Callers never hand-roll
//! identity headers.
//!
//! Tenant identity is resolved lazily. A session stored without an
//! organization (login can return before membership rows settle) triggers
//! one lookup against `/auth/organizations`; the result is persisted so
//! every later request skips the side trip. Concurrent requests share a
//! single in-flight lookup.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::store::AuthStore;
use crate::types::{
    AuthRecord, AuthResponse, MessageResponse, Organization, OrganizationMembership,
    OrganizationsResponse, Session, SignupRequest, User, UserProfile,
};

/// Default API root, matching the development backend.
const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Header carrying the tenant (organization) id on scoped requests.
pub const ORGANIZATION_HEADER: &str = "X-Organization-Id";

/// GrowthHub API client.
///
/// Cheap to clone; clones share the HTTP connection pool, the auth store,
/// and the resolution lock.
#[derive(Clone)]
pub struct GrowthHubClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn AuthStore>,
    /// Serializes organization lookups so concurrent requests share one
    /// flight instead of racing duplicate calls.
    resolution: Arc<Mutex<()>>,
}

impl GrowthHubClient {
    /// Create a client against `base_url`, persisting auth state in `store`.
    pub fn new(base_url: impl Into<String>, store: Arc<dyn AuthStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            store,
            resolution: Arc::new(Mutex::new(())),
        }
    }

    /// Create a client from the `GROWTHHUB_API_URL` environment variable,
    /// falling back to the development default.
    pub fn from_env(store: Arc<dyn AuthStore>) -> Self {
        let base_url =
            std::env::var("GROWTHHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url, store)
    }

    /// Swap in a preconfigured HTTP client (timeouts, proxies, TLS).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// API root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The auth store backing this client.
    pub fn store(&self) -> &Arc<dyn AuthStore> {
        &self.store
    }

    /// Prepared request against an API path. Identity headers are attached
    /// at send time by [`execute`](Self::execute).
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.endpoint(path))
    }

    /// GET request builder for `path`.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    /// POST request builder for `path`.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    /// PUT request builder for `path`.
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.request(Method::PUT, path)
    }

    /// DELETE request builder for `path`.
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }

    /// Send a request through the gateway.
    ///
    /// Outbound: the stored session's bearer token and the current
    /// organization id are attached, resolving the organization first if a
    /// session exists without one. Inbound: a 401 destroys the stored
    /// record and returns [`Error::AuthExpired`]; any other status passes
    /// through untouched for the caller to interpret.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let request = self.authorize(request).await?;
        let response = request.send().await?;
        self.check_auth(response)
    }

    /// GET `path` and decode a JSON body. Non-2xx becomes [`Error::Api`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(self.get(path)).await?;
        decode(response).await
    }

    /// POST `body` as JSON to `path` and decode the response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(self.post(path).json(body)).await?;
        decode(response).await
    }

    /// PUT `body` as JSON to `path` and decode the response.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(self.put(path).json(body)).await?;
        decode(response).await
    }

    /// DELETE `path` and decode the response.
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(self.delete(path)).await?;
        decode(response).await
    }

    /// Make sure the stored record carries an organization, resolving and
    /// persisting one if needed.
    ///
    /// The gateway calls this before any request sent with a session but
    /// no organization; session bootstrap can call it eagerly right after
    /// login instead of paying the cost on the first data request. When
    /// several tasks hit an unresolved record at once, the first one
    /// performs the lookup and the rest pick up the persisted result.
    pub async fn ensure_tenant_context(&self) -> Result<Organization> {
        if let Some(org) = self.stored_organization()? {
            return Ok(org);
        }

        let _guard = self.resolution.lock().await;

        // Another task may have resolved while we waited on the lock.
        if let Some(org) = self.stored_organization()? {
            return Ok(org);
        }

        let mut record = self.store.load()?.ok_or(Error::NotAuthenticated)?;
        let token = record
            .access_token()
            .ok_or(Error::NotAuthenticated)?
            .to_string();

        debug!("resolving organization for the stored session");
        let response = self
            .http
            .get(self.endpoint("/auth/organizations"))
            .bearer_auth(&token)
            .send()
            .await?;
        let response = self.check_auth(response)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "organization lookup failed");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: OrganizationsResponse = response.json().await?;
        let organization = body
            .organizations
            .into_iter()
            .next()
            .and_then(|membership| membership.organization)
            .ok_or(Error::NoOrganization)?;

        record.current_organization = Some(organization.clone());
        self.store.save(&record)?;
        debug!(organization_id = %organization.id, "organization resolved and persisted");
        Ok(organization)
    }

    /// Sign up a new account and persist the returned credentials.
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse> {
        let auth: AuthResponse = self.post_json("/auth/signup", request).await?;
        self.persist_auth(&auth)?;
        Ok(auth)
    }

    /// Log in and persist the returned credentials. The organization may
    /// come back `null`; it gets resolved on the first scoped request or
    /// by an explicit [`ensure_tenant_context`](Self::ensure_tenant_context).
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let auth: AuthResponse = self
            .post_json("/auth/login", &LoginRequest { email, password })
            .await?;
        self.persist_auth(&auth)?;
        Ok(auth)
    }

    /// Log out: tell the API (best effort), then destroy local credentials.
    ///
    /// Local state is cleared even when the server call fails. Staying
    /// signed in locally because the network flaked would be worse.
    pub async fn logout(&self) -> Result<()> {
        match self.execute(self.post("/auth/logout")).await {
            Ok(response) if !response.status().is_success() => {
                debug!(
                    status = response.status().as_u16(),
                    "logout rejected by the API; clearing locally"
                );
            }
            Err(e) => debug!(error = %e, "logout request failed; clearing locally"),
            Ok(_) => {}
        }
        self.store.clear()?;
        Ok(())
    }

    /// Fetch the signed-in user's profile and membership rows.
    pub async fn current_user(&self) -> Result<UserProfile> {
        self.get_json("/auth/me").await
    }

    /// Fetch the raw membership rows for the signed-in user.
    pub async fn organizations(&self) -> Result<Vec<OrganizationMembership>> {
        let body: OrganizationsResponse = self.get_json("/auth/organizations").await?;
        Ok(body.organizations)
    }

    /// Request a password-reset email.
    ///
    /// A pre-login flow: the call is sent bare, outside the gateway, so
    /// stored credentials never ride along and no tenant resolution runs.
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse> {
        let response = self
            .http
            .post(self.endpoint("/auth/forgot-password"))
            .json(&ForgotPasswordRequest { email })
            .send()
            .await?;
        decode(response).await
    }

    /// Set a new password using the recovery token from the reset link.
    ///
    /// Authenticates with the recovery token alone, never the stored
    /// session, and skips the gateway: a stale reset link must not destroy
    /// whatever session is already signed in.
    pub async fn reset_password(
        &self,
        recovery_token: &str,
        new_password: &str,
    ) -> Result<MessageResponse> {
        let response = self
            .http
            .post(self.endpoint("/auth/reset-password"))
            .bearer_auth(recovery_token)
            .json(&ResetPasswordRequest {
                password: new_password,
            })
            .send()
            .await?;
        decode(response).await
    }

    /// Switch the active organization. Later requests carry the new id.
    pub fn set_current_organization(&self, organization: Organization) -> Result<()> {
        let mut record = self.store.load()?.unwrap_or_default();
        record.current_organization = Some(organization);
        self.store.save(&record)?;
        Ok(())
    }

    /// Replace the stored user profile.
    pub fn set_user(&self, user: User) -> Result<()> {
        let mut record = self.store.load()?.unwrap_or_default();
        record.user = Some(user);
        self.store.save(&record)?;
        Ok(())
    }

    /// Adopt a session obtained out-of-band, e.g. from an email-confirmation
    /// callback. Later requests authenticate with it; the organization is
    /// resolved lazily like after any other login.
    pub fn set_session(&self, session: Session) -> Result<()> {
        let mut record = self.store.load()?.unwrap_or_default();
        record.session = Some(session);
        self.store.save(&record)?;
        Ok(())
    }

    /// Outbound hook: attach identity headers from the stored record.
    ///
    /// No record means an anonymous request and nothing is attached. A
    /// session without an organization blocks on resolution first, so a
    /// scoped request is never sent tenant-less while a tenant exists.
    async fn authorize(&self, mut request: RequestBuilder) -> Result<RequestBuilder> {
        let Some(record) = self.store.load()? else {
            return Ok(request);
        };

        let mut organization = record.current_organization.clone();
        if let Some(session) = &record.session {
            if organization.is_none() {
                organization = Some(self.ensure_tenant_context().await?);
            }
            request = request.bearer_auth(&session.access_token);
        }
        if let Some(org) = &organization {
            request = request.header(ORGANIZATION_HEADER, org.id.as_str());
        }
        Ok(request)
    }

    /// Inbound hook: a 401 wipes the persisted record before the caller
    /// sees the failure. Everything else passes through.
    fn check_auth(&self, response: Response) -> Result<Response> {
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("401 from the API; clearing stored credentials");
            if let Err(e) = self.store.clear() {
                warn!(error = %e, "failed to clear the auth record after a 401");
            }
            return Err(Error::AuthExpired);
        }
        Ok(response)
    }

    fn persist_auth(&self, auth: &AuthResponse) -> Result<()> {
        let record = AuthRecord::new(
            auth.user.clone(),
            auth.session.clone(),
            auth.organization.clone(),
        );
        self.store.save(&record)?;
        Ok(())
    }

    fn stored_organization(&self) -> Result<Option<Organization>> {
        Ok(self
            .store
            .load()?
            .and_then(|record| record.current_organization))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct ResetPasswordRequest<'a> {
    password: &'a str,
}

/// Decode a JSON body, mapping non-2xx statuses to [`Error::Api`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}
