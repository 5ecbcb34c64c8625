//! Signed-in operator state: who is logged in, UI preferences and the notification bell.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::notifications::{Notification, NotificationKind, NotificationPriority};
use crate::session::{HttpTransport, SessionClient, SessionError, SessionUser};

pub const SESSION_EXPIRED_MESSAGE: &str = "Sua sessão expirou. Faça login novamente.";
pub const LOGOUT_MESSAGE: &str = "Logout realizado com sucesso";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
}

impl User {
    /// Display name is "first last" when either is present, else username, else e-mail.
    pub fn from_api(user: &SessionUser) -> Self {
        let parts: Vec<&str> = [user.first_name.as_deref(), user.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        let name = if !parts.is_empty() {
            parts.join(" ")
        } else {
            user.username
                .as_deref()
                .filter(|username| !username.trim().is_empty())
                .unwrap_or(&user.email)
                .to_string()
        };

        Self {
            email: user.email.clone(),
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppSession {
    pub user: Option<User>,
    pub dark_mode: bool,
    pub show_welcome: bool,
    pub notifications: Vec<Notification>,
}

impl Default for AppSession {
    fn default() -> Self {
        Self {
            user: None,
            dark_mode: false,
            show_welcome: true,
            notifications: Vec::new(),
        }
    }
}

impl AppSession {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn login_success(&mut self, user: User) {
        info!(email = %user.email, "operator signed in");
        self.user = Some(user);
    }

    /// Drop the user and every piece of per-operator state.
    pub fn logout(&mut self) {
        info!("operator signed out");
        *self = Self::default();
    }

    /// Session could not be refreshed: forget the user and tell the operator why.
    pub fn unauthorized(&mut self) {
        warn!("session expired; clearing operator");
        self.user = None;
        self.notify(Notification::new(
            NotificationKind::Alert,
            NotificationPriority::High,
            "Sessão expirada",
            SESSION_EXPIRED_MESSAGE,
        ));
    }

    pub fn dismiss_welcome(&mut self) {
        self.show_welcome = false;
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    /// Newest first.
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.insert(0, notification);
    }

    /// Returns `false` when no notification has that id.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.notifications.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|item| !item.is_read).count()
    }

    /// Load the signed-in user from the session API. An unauthenticated visitor is not an
    /// error: the state simply stays signed out.
    pub async fn restore<T>(&mut self, client: &SessionClient<T>) -> Result<(), SessionError>
    where
        T: HttpTransport,
    {
        match client.current_user().await {
            Ok(Some(user)) => {
                self.login_success(User::from_api(&user));
                Ok(())
            }
            Ok(None) | Err(SessionError::Unauthorized) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Server-side logout is best effort; local state is cleared regardless.
    pub async fn sign_out<T>(&mut self, client: &SessionClient<T>) -> &'static str
    where
        T: HttpTransport,
    {
        if let Err(err) = client.logout().await {
            warn!(error = %err, "logout call failed; clearing local state anyway");
        }
        self.logout();
        LOGOUT_MESSAGE
    }
}
