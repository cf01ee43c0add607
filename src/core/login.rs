use crate::core::gateway::ApiGateway;
use crate::domain::model::{Credentials, LoginOutcome, LoginResponse, User};
use crate::domain::ports::LoginObserver;
use std::sync::atomic::{AtomicU64, Ordering};

pub const LOGIN_PATH: &str = "/api/v1/user/login";

/// 傳輸失敗或錯誤回應沒有附帶訊息時使用
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred.";

/// 成功回應但 `success` 不成立且沒有訊息時使用
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed.";

/// Observer built from three closures, mirroring the caller-supplied state
/// setters of a UI form.
pub struct CallbackObserver<S, U, E>
where
    S: Fn() + Send + Sync,
    U: Fn(User) + Send + Sync,
    E: Fn(String) + Send + Sync,
{
    on_success: S,
    set_user: U,
    set_error: E,
}

impl<S, U, E> CallbackObserver<S, U, E>
where
    S: Fn() + Send + Sync,
    U: Fn(User) + Send + Sync,
    E: Fn(String) + Send + Sync,
{
    pub fn new(on_success: S, set_user: U, set_error: E) -> Self {
        Self {
            on_success,
            set_user,
            set_error,
        }
    }
}

impl<S, U, E> LoginObserver for CallbackObserver<S, U, E>
where
    S: Fn() + Send + Sync,
    U: Fn(User) + Send + Sync,
    E: Fn(String) + Send + Sync,
{
    fn on_success(&self) {
        (self.on_success)()
    }

    fn set_user(&self, user: User) {
        (self.set_user)(user)
    }

    fn set_error(&self, message: String) {
        (self.set_error)(message)
    }
}

pub struct LoginClient {
    gateway: ApiGateway,
    latest: AtomicU64,
}

impl LoginClient {
    pub fn new(gateway: ApiGateway) -> Self {
        Self {
            gateway,
            latest: AtomicU64::new(0),
        }
    }

    pub fn gateway(&self) -> &ApiGateway {
        &self.gateway
    }

    /// Exchanges credentials for a user and reports through `observer`.
    ///
    /// Exactly one of the success or error callbacks runs, unless another
    /// `login` call started while this one was in flight. In that case the
    /// stale response is dropped without touching the observer and
    /// [`LoginOutcome::Superseded`] is returned.
    pub async fn login(
        &self,
        credentials: &Credentials,
        observer: &dyn LoginObserver,
    ) -> LoginOutcome {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("Logging in as '{}' (attempt {})", credentials.username, ticket);

        let (outcome, token) = self.exchange(credentials).await;

        // 過期的回應連 token 都不能寫入
        if self.latest.load(Ordering::SeqCst) != ticket {
            tracing::debug!("Login attempt {} superseded, dropping response", ticket);
            return LoginOutcome::Superseded;
        }

        if let Some(token) = token {
            self.gateway.session().set_token(Some(token));
        }

        match &outcome {
            LoginOutcome::Authenticated(user) => {
                observer.on_success();
                observer.set_user(user.clone());
            }
            LoginOutcome::Rejected(message) | LoginOutcome::Failed(message) => {
                observer.set_error(message.clone());
            }
            LoginOutcome::Superseded => {}
        }

        outcome
    }

    /// Performs the HTTP round trip. A token issued on success is returned
    /// rather than stored, so the caller can discard it for stale responses.
    async fn exchange(&self, credentials: &Credentials) -> (LoginOutcome, Option<String>) {
        let request = match self.gateway.post(LOGIN_PATH) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!("❌ Could not build login request: {}", e);
                return (LoginOutcome::Failed(GENERIC_ERROR_MESSAGE.to_string()), None);
            }
        };

        let response = match request.json(credentials).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Login request failed: {}", e);
                return (LoginOutcome::Failed(GENERIC_ERROR_MESSAGE.to_string()), None);
            }
        };

        let status = response.status();
        tracing::debug!("Login response status: {}", status);

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read login response body: {}", e);
                return (LoginOutcome::Failed(GENERIC_ERROR_MESSAGE.to_string()), None);
            }
        };

        if !status.is_success() {
            let message = serde_json::from_slice::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| {
                    value
                        .get("message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
            tracing::warn!("Login failed with status {}: {}", status, message);
            return (LoginOutcome::Failed(message), None);
        }

        let parsed: LoginResponse = serde_json::from_slice(&body).unwrap_or_else(|e| {
            tracing::warn!("Unexpected login response body: {}", e);
            LoginResponse::default()
        });

        match parsed {
            LoginResponse {
                success: true,
                user: Some(user),
                token,
                ..
            } => {
                tracing::info!("✅ Login succeeded");
                (
                    LoginOutcome::Authenticated(user),
                    token.filter(|t| !t.is_empty()),
                )
            }
            LoginResponse { message, .. } => {
                let message = message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string());
                tracing::info!("Login rejected: {}", message);
                (LoginOutcome::Rejected(message), None)
            }
        }
    }
}
