//! Cookie-session client for the office API: login, current user, logout and the
//! refresh-and-retry policy applied to every other call.

mod transport;

pub use transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport, TransportError};

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

pub const LOGIN_PATH: &str = "/session/login";
pub const REFRESH_PATH: &str = "/session/refresh";
pub const LOGOUT_PATH: &str = "/session/logout";
pub const USER_PATH: &str = "/session/user";

pub const FALLBACK_ERROR_MESSAGE: &str = "Ocorreu um erro. Tente novamente.";

const UNAUTHORIZED: u16 = 401;

/// Invoked when the session can no longer be refreshed.
pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session is not authorized")]
    Unauthorized,
    #[error("session api returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("unexpected session api payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SessionError {
    /// Message suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Api { message, .. } => message.clone(),
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Pull the first error message out of `{errors: [{message}]}` or `{message}`.
pub fn extract_api_error_message(body: &Value) -> String {
    body.pointer("/errors/0/message")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .filter(|message| !message.is_empty())
        .unwrap_or(FALLBACK_ERROR_MESSAGE)
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Clone, Copy, Default)]
struct RefreshState {
    generation: u64,
    succeeded: bool,
}

enum Refresh {
    Renewed,
    Failed(SessionError),
}

pub struct SessionClient<T> {
    transport: T,
    refresh: tokio::sync::Mutex<RefreshState>,
    on_unauthorized: Mutex<Option<UnauthorizedHandler>>,
}

impl<T> SessionClient<T>
where
    T: HttpTransport,
{
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            refresh: tokio::sync::Mutex::new(RefreshState::default()),
            on_unauthorized: Mutex::new(None),
        }
    }

    pub fn set_unauthorized_handler(&self, handler: UnauthorizedHandler) {
        *self
            .on_unauthorized
            .lock()
            .expect("unauthorized handler mutex poisoned") = Some(handler);
    }

    fn fire_unauthorized(&self) {
        let handler = self
            .on_unauthorized
            .lock()
            .expect("unauthorized handler mutex poisoned")
            .clone();
        warn!("session expired");
        if let Some(handler) = handler {
            handler();
        }
    }

    /// Execute a call under the 401 policy. Non-2xx answers become `SessionError::Api`.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, SessionError> {
        let observed = self.refresh.lock().await.generation;
        let response = self.transport.execute(&request).await?;
        if response.status != UNAUTHORIZED {
            return into_result(response);
        }

        match request.path.as_str() {
            LOGIN_PATH => return Err(api_error(&response)),
            REFRESH_PATH => {
                self.fire_unauthorized();
                return Err(SessionError::Unauthorized);
            }
            _ => {}
        }

        if let Refresh::Failed(error) = self.refresh_after(observed).await {
            return Err(error);
        }

        let retried = self.transport.execute(&request).await?;
        if retried.status == UNAUTHORIZED {
            self.fire_unauthorized();
            return Err(SessionError::Unauthorized);
        }
        into_result(retried)
    }

    /// Refresh once per generation: callers that observed an older generation reuse the
    /// outcome of the refresh that already ran.
    async fn refresh_after(&self, observed: u64) -> Refresh {
        let mut state = self.refresh.lock().await;
        if state.generation != observed {
            return if state.succeeded {
                Refresh::Renewed
            } else {
                self.fire_unauthorized();
                Refresh::Failed(SessionError::Unauthorized)
            };
        }

        let outcome = self.transport.execute(&ApiRequest::post(REFRESH_PATH)).await;
        state.generation += 1;
        match outcome {
            Ok(response) if response.is_success() => {
                state.succeeded = true;
                info!(generation = state.generation, "session refreshed");
                Refresh::Renewed
            }
            Ok(response) if response.status == UNAUTHORIZED => {
                state.succeeded = false;
                self.fire_unauthorized();
                Refresh::Failed(SessionError::Unauthorized)
            }
            Ok(response) => {
                state.succeeded = false;
                Refresh::Failed(api_error(&response))
            }
            Err(error) => {
                state.succeeded = false;
                Refresh::Failed(error.into())
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let request = ApiRequest::post(LOGIN_PATH).with_json(json!({
            "username": username,
            "password": password,
        }));
        self.send(request).await?;
        info!(username, "login accepted");
        Ok(())
    }

    /// `Ok(None)` when the API answers without a user payload.
    pub async fn current_user(&self) -> Result<Option<SessionUser>, SessionError> {
        let response = self.send(ApiRequest::get(USER_PATH)).await?;
        let envelope: Envelope<SessionUser> = serde_json::from_value(response.body)?;
        Ok(envelope.data)
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        self.send(ApiRequest::post(LOGOUT_PATH)).await?;
        Ok(())
    }

    pub async fn refresh(&self) -> Result<(), SessionError> {
        self.send(ApiRequest::post(REFRESH_PATH)).await?;
        Ok(())
    }
}

fn api_error(response: &ApiResponse) -> SessionError {
    SessionError::Api {
        status: response.status,
        message: extract_api_error_message(&response.body),
    }
}

fn into_result(response: ApiResponse) -> Result<ApiResponse, SessionError> {
    if response.status == UNAUTHORIZED {
        Err(SessionError::Unauthorized)
    } else if response.is_success() {
        Ok(response)
    } else {
        Err(api_error(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays canned responses and records every path it was asked for.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<ApiResponse>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn with(responses: &[(u16, Value)]) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .iter()
                        .map(|(status, body)| ApiResponse {
                            status: *status,
                            body: body.clone(),
                        })
                        .collect(),
                ),
                calls: Mutex::default(),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls mutex poisoned").clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            self.calls
                .lock()
                .expect("calls mutex poisoned")
                .push(request.path.clone());
            let next = self
                .responses
                .lock()
                .expect("responses mutex poisoned")
                .pop_front();
            Ok(next.unwrap_or(ApiResponse {
                status: 500,
                body: Value::Null,
            }))
        }
    }

    fn counting_client(transport: ScriptedTransport) -> (SessionClient<ScriptedTransport>, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let client = SessionClient::new(transport);
        let counter = fired.clone();
        client.set_unauthorized_handler(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        (client, fired)
    }

    #[test]
    fn extracts_messages_in_priority_order() {
        assert_eq!(
            extract_api_error_message(&json!({"errors": [{"message": "Senha inválida"}], "message": "x"})),
            "Senha inválida"
        );
        assert_eq!(
            extract_api_error_message(&json!({"message": "Conta bloqueada"})),
            "Conta bloqueada"
        );
        assert_eq!(extract_api_error_message(&Value::Null), FALLBACK_ERROR_MESSAGE);
        assert_eq!(
            extract_api_error_message(&json!({"errors": []})),
            FALLBACK_ERROR_MESSAGE
        );
    }

    #[tokio::test]
    async fn login_unauthorized_is_returned_without_refresh() {
        let (client, fired) = counting_client(ScriptedTransport::with(&[(
            401,
            json!({"errors": [{"message": "Credenciais inválidas"}]}),
        )]));

        let result = client.login("ana@example.com", "errada").await;

        match result {
            Err(error @ SessionError::Api { status: 401, .. }) => {
                assert_eq!(error.user_message(), "Credenciais inválidas");
            }
            other => panic!("expected rejected login, got {other:?}"),
        }
        assert_eq!(client.transport.calls(), vec![LOGIN_PATH]);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn expired_call_refreshes_and_retries_once() {
        let (client, fired) = counting_client(ScriptedTransport::with(&[
            (401, Value::Null),
            (204, Value::Null),
            (200, json!({"data": {"email": "ana@example.com", "first_name": "Ana"}})),
        ]));

        let user = client
            .current_user()
            .await
            .expect("retry succeeds")
            .expect("user payload");

        assert_eq!(user.email, "ana@example.com");
        assert_eq!(client.transport.calls(), vec![USER_PATH, REFRESH_PATH, USER_PATH]);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_refresh_fires_the_unauthorized_handler() {
        let (client, fired) = counting_client(ScriptedTransport::with(&[
            (401, Value::Null),
            (401, Value::Null),
        ]));

        let result = client.current_user().await;

        assert!(matches!(result, Err(SessionError::Unauthorized)));
        assert_eq!(client.transport.calls(), vec![USER_PATH, REFRESH_PATH]);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_unauthorized_after_refresh_gives_up() {
        let (client, fired) = counting_client(ScriptedTransport::with(&[
            (401, Value::Null),
            (200, Value::Null),
            (401, Value::Null),
        ]));

        let result = client.logout().await;

        assert!(matches!(result, Err(SessionError::Unauthorized)));
        assert_eq!(client.transport.calls().len(), 3);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn other_errors_carry_the_api_message() {
        let (client, _) = counting_client(ScriptedTransport::with(&[(
            422,
            json!({"message": "Campo obrigatório"}),
        )]));

        match client.logout().await {
            Err(error @ SessionError::Api { status: 422, .. }) => {
                assert_eq!(error.user_message(), "Campo obrigatório");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
