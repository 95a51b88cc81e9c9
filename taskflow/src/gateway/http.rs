//! HTTP implementation of the gateway over `reqwest`.
//!
//! Every request attaches the stored bearer credential when one is
//! present; requests without a credential proceed unauthenticated and
//! the server decides. A 401 from any endpoint clears the session
//! store before the error is returned; this is the one cross-cutting
//! policy in the client, not a per-call opt-in.
//!
//! The credential value itself is never logged.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use taskflow_proto::auth::{AuthResponse, ErrorBody, LoginRequest, RegisterRequest, User};
use taskflow_proto::task::{CompletionUpdate, Task, TaskCreate, TaskId, TaskUpdate, UserId};

use super::{GatewayError, TaskGateway};
use crate::session::SessionStore;

/// Gateway to the remote `TaskFlow` server.
///
/// Cheap to clone: the inner `reqwest::Client` and session store are
/// both reference-counted.
#[derive(Clone)]
pub struct HttpGateway {
    base_url: String,
    http: reqwest::Client,
    session: Arc<SessionStore>,
}

impl HttpGateway {
    /// Create a gateway against `base_url` (no trailing slash needed).
    #[must_use]
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
            session,
        }
    }

    /// The session store this gateway reads credentials from.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Authenticate and install the returned session.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on a non-2xx response or transport
    /// failure; the session store is untouched on failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, GatewayError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: AuthResponse = self
            .request_json(Method::POST, "/auth/login", Some(&body))
            .await?;
        self.install_session(&resp);
        Ok(resp)
    }

    /// Register a new account and install the returned session.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on a non-2xx response or transport failure.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthResponse, GatewayError> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.map(str::to_string),
        };
        let resp: AuthResponse = self
            .request_json(Method::POST, "/auth/register", Some(&body))
            .await?;
        self.install_session(&resp);
        Ok(resp)
    }

    /// Fetch the user record behind the stored credential.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] (with the session already
    /// cleared) when the token is stale or absent.
    pub async fn fetch_current_user(&self) -> Result<User, GatewayError> {
        self.request_json(Method::GET, "/auth/me", None::<&()>).await
    }

    /// End the session. Purely local: the contract has no logout call.
    pub fn logout(&self) {
        self.session.clear();
    }

    fn install_session(&self, resp: &AuthResponse) {
        if let Err(e) = self
            .session
            .set(resp.user.clone(), resp.access_token.clone())
        {
            tracing::warn!(error = %e, "failed to persist session");
        }
        tracing::info!(user_id = resp.user.id, "session established");
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the bearer header when a credential is stored.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn request_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let resp = self.execute(method, path, body).await?;
        Ok(resp.json().await?)
    }

    async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, GatewayError>
    where
        B: serde::Serialize + ?Sized,
    {
        tracing::debug!(%method, path, "gateway request");
        let mut builder = self.http.request(method, self.url(path));
        builder = self.authorize(builder);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        tracing::debug!(path, status = status.as_u16(), "gateway response");

        if status.is_success() {
            return Ok(resp);
        }

        let body_text = resp.text().await.unwrap_or_default();
        let message = error_message(status, &body_text);

        if status == StatusCode::UNAUTHORIZED {
            // Cross-cutting policy: any 401 ends the session.
            self.session.clear();
            return Err(GatewayError::Unauthorized { message });
        }
        Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl TaskGateway for HttpGateway {
    async fn list_tasks(&self, user_id: UserId) -> Result<Vec<Task>, GatewayError> {
        self.request_json(Method::GET, &format!("/{user_id}/tasks"), None::<&()>)
            .await
    }

    async fn create_task(&self, user_id: UserId, fields: &TaskCreate) -> Result<Task, GatewayError> {
        self.request_json(Method::POST, &format!("/{user_id}/tasks"), Some(fields))
            .await
    }

    async fn update_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
        fields: &TaskUpdate,
    ) -> Result<Task, GatewayError> {
        self.request_json(
            Method::PUT,
            &format!("/{user_id}/tasks/{task_id}"),
            Some(fields),
        )
        .await
    }

    async fn set_completion(
        &self,
        user_id: UserId,
        task_id: TaskId,
        update: CompletionUpdate,
    ) -> Result<Task, GatewayError> {
        self.request_json(
            Method::PATCH,
            &format!("/{user_id}/tasks/{task_id}/complete"),
            Some(&update),
        )
        .await
    }

    async fn delete_task(&self, user_id: UserId, task_id: TaskId) -> Result<(), GatewayError> {
        // 204 has no payload; 200 carries `{message}`. Either is success.
        let _ = self
            .execute(
                Method::DELETE,
                &format!("/{user_id}/tasks/{task_id}"),
                None::<&()>,
            )
            .await?;
        Ok(())
    }
}

/// Extract the surfaced error message from a non-2xx response body.
///
/// The contract carries a `detail` string; when it is missing or the
/// body is not JSON, fall back to `Request failed: <status>`.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.detail)
        .unwrap_or_else(|_| format!("Request failed: {}", status.as_u16()))
}
