use std::fmt;

use log::{error, info};

use crate::credentials::{self, Credentials};
use crate::session::Session;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    SignIn,
    SignUp,
}

impl Mode {
    pub fn title(self) -> &'static str {
        match self {
            Self::SignIn => "Welcome user",
            Self::SignUp => "Create your account",
        }
    }

    pub fn subtitle(self) -> &'static str {
        match self {
            Self::SignIn => "Sign in to continue",
            Self::SignUp => "Fill in the form to continue",
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            Self::SignIn => "Sign In",
            Self::SignUp => "Sign Up",
        }
    }

    pub fn switch_label(self) -> &'static str {
        match self {
            Self::SignIn => "New user? Create your account",
            Self::SignUp => "Already have an account? Sign in",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    Form,
    /// `username` is empty when the session was restored at start.
    LoggedIn { username: String },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: &'static str,
}

impl Alert {
    fn success(message: &'static str) -> Self {
        Self {
            kind: AlertKind::Success,
            message,
        }
    }

    fn error(message: &'static str) -> Self {
        Self {
            kind: AlertKind::Error,
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == AlertKind::Error
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self.kind {
            AlertKind::Success => "Success",
            AlertKind::Error => "Error",
        };
        write!(f, "{title}: {}", self.message)
    }
}

pub const MISSING_FIELDS: &str = "Please fill in all fields";
pub const LOGGED_IN: &str = "Logged in successfully";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const REGISTERED: &str = "Registration successful";
pub const USERNAME_TAKEN: &str = "This username is already taken.";
pub const UNEXPECTED: &str = "An unexpected error occurred. Please try again.";

/// Sign-in/sign-up form logic, minus the rendering.
pub struct App {
    credentials: Credentials,
    session: Session,
    mode: Mode,
    view: View,
}

impl App {
    pub fn new(credentials: Credentials, session: Session) -> Self {
        Self {
            credentials,
            session,
            mode: Mode::SignIn,
            view: View::Form,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn greeting(&self) -> Option<String> {
        match &self.view {
            View::LoggedIn { username } => Some(format!("Welcome, {username}!")),
            View::Form => None,
        }
    }

    /// The "switch mode" prompt, for alerts where the other mode might be what
    /// the user wanted.
    pub fn switch_hint(&self, alert: &Alert) -> Option<&'static str> {
        match alert.message {
            INVALID_CREDENTIALS | USERNAME_TAKEN => Some(self.mode.switch_label()),
            _ => None,
        }
    }

    /// Prepares storage and restores a persisted session.
    pub async fn start(&mut self) {
        if self.credentials.initialize().await.is_err() {
            error!("continuing without initialized storage");
        }

        if self.session.is_active().await {
            info!("restored session");
            self.view = View::LoggedIn {
                username: String::new(),
            };
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::SignIn => Mode::SignUp,
            Mode::SignUp => Mode::SignIn,
        };
    }

    pub async fn submit(&mut self, username: &str, password: &str) -> Alert {
        if username.is_empty() || password.is_empty() {
            return Alert::error(MISSING_FIELDS);
        }

        let result = match self.mode {
            Mode::SignIn => self.sign_in(username, password).await,
            Mode::SignUp => self.sign_up(username, password).await,
        };

        result.unwrap_or_else(|e| {
            error!("submit failed: {e}");
            Alert::error(UNEXPECTED)
        })
    }

    async fn sign_in(&mut self, username: &str, password: &str) -> credentials::Result<Alert> {
        if !self.credentials.verify_login(username, password).await? {
            return Ok(Alert::error(INVALID_CREDENTIALS));
        }

        self.session
            .set_active()
            .await
            .map_err(|()| credentials::Error::Storage)?;

        self.view = View::LoggedIn {
            username: username.into(),
        };
        Ok(Alert::success(LOGGED_IN))
    }

    async fn sign_up(&mut self, username: &str, password: &str) -> credentials::Result<Alert> {
        match self.credentials.register(username, password).await {
            Ok(()) => {
                self.mode = Mode::SignIn;
                Ok(Alert::success(REGISTERED))
            }
            Err(credentials::Error::DuplicateUsername) => Ok(Alert::error(USERNAME_TAKEN)),
            Err(e) => Err(e),
        }
    }

    pub async fn logout(&mut self) -> Result<(), ()> {
        self.session.clear_active().await?;
        self.view = View::Form;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;

    use crate::backend;

    async fn create_app() -> (App, tempfile::TempDir) {
        let (backend, dir) = backend::test::create_backend().await;
        let backend = Arc::new(backend);
        let app = App::new(
            Credentials::new(Arc::clone(&backend)),
            Session::new(backend),
        );
        (app, dir)
    }

    async fn reopen(dir: &tempfile::TempDir) -> App {
        let backend = Arc::new(backend::Backend::new(dir.path()).await.unwrap());
        let mut app = App::new(
            Credentials::new(Arc::clone(&backend)),
            Session::new(backend),
        );
        app.start().await;
        app
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() {
        let (mut app, _dir) = create_app().await;
        app.start().await;

        assert_eq!(app.submit("", "pw").await, Alert::error(MISSING_FIELDS));
        assert_eq!(app.submit("alice", "").await, Alert::error(MISSING_FIELDS));

        app.toggle_mode();
        assert_eq!(app.submit("", "").await, Alert::error(MISSING_FIELDS));
        assert_eq!(app.view(), &View::Form);
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let (mut app, _dir) = create_app().await;
        app.start().await;
        assert_eq!(app.mode(), Mode::SignIn);

        app.toggle_mode();
        assert_eq!(app.mode(), Mode::SignUp);
        assert_eq!(app.submit("alice", "secret").await, Alert::success(REGISTERED));
        assert_eq!(app.mode(), Mode::SignIn);
        assert_eq!(app.view(), &View::Form);

        assert_eq!(
            app.submit("alice", "wrong").await,
            Alert::error(INVALID_CREDENTIALS)
        );
        assert_eq!(app.view(), &View::Form);

        assert_eq!(app.submit("alice", "secret").await, Alert::success(LOGGED_IN));
        assert_eq!(app.greeting().as_deref(), Some("Welcome, alice!"));
    }

    #[tokio::test]
    async fn taken_username() {
        let (mut app, _dir) = create_app().await;
        app.start().await;

        app.toggle_mode();
        app.submit("alice", "secret").await;

        app.toggle_mode();
        let alert = app.submit("alice", "other").await;
        assert_eq!(alert, Alert::error(USERNAME_TAKEN));
        assert_eq!(alert.to_string(), "Error: This username is already taken.");
        // a failed sign-up stays in sign-up mode
        assert_eq!(app.mode(), Mode::SignUp);
    }

    #[tokio::test]
    async fn unknown_user_cannot_sign_in() {
        let (mut app, _dir) = create_app().await;
        app.start().await;

        let alert = app.submit("bob", "x").await;
        assert_eq!(alert, Alert::error(INVALID_CREDENTIALS));
        assert_eq!(app.switch_hint(&alert), Some("New user? Create your account"));
    }

    #[tokio::test]
    async fn switch_hint_only_for_credential_failures() {
        let (mut app, _dir) = create_app().await;
        app.start().await;

        let alert = app.submit("", "").await;
        assert_eq!(app.switch_hint(&alert), None);
        assert_eq!(app.switch_hint(&Alert::error(UNEXPECTED)), None);
        assert_eq!(app.switch_hint(&Alert::success(LOGGED_IN)), None);

        app.toggle_mode();
        app.submit("alice", "secret").await;
        app.toggle_mode();
        let alert = app.submit("alice", "secret").await;
        assert_eq!(alert, Alert::error(USERNAME_TAKEN));
        assert_eq!(
            app.switch_hint(&alert),
            Some("Already have an account? Sign in")
        );
    }

    #[tokio::test]
    async fn session_survives_restart_until_logout() {
        let (mut app, dir) = create_app().await;
        app.start().await;

        app.toggle_mode();
        app.submit("alice", "secret").await;
        app.submit("alice", "secret").await;

        let mut restarted = reopen(&dir).await;
        assert!(matches!(restarted.view(), View::LoggedIn { .. }));

        restarted.logout().await.unwrap();
        assert_eq!(restarted.view(), &View::Form);
        assert_eq!(restarted.greeting(), None);

        let restarted = reopen(&dir).await;
        assert_eq!(restarted.view(), &View::Form);
    }

    #[test]
    fn mode_texts() {
        assert_eq!(Mode::SignIn.title(), "Welcome user");
        assert_eq!(Mode::SignUp.submit_label(), "Sign Up");
        assert_eq!(Mode::SignIn.switch_label(), "New user? Create your account");
        assert_eq!(Alert::success(LOGGED_IN).to_string(), "Success: Logged in successfully");
    }
}
