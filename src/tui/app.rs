use tracing::warn;

use crate::app::UIConfig;
use crate::constants::{DEMO_EMAIL, DEMO_PASSWORD, UI_DEFAULT_VIEWPORT_HEIGHT};
use crate::conversation::ConversationController;
use crate::session::{has_valid_session, SessionManager};

/// Which view the route guard allows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

/// Login form state
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    /// Inline message from the last failed attempt
    pub error: Option<String>,
    /// A sign-in request is in flight
    pub pending: bool,
}

impl LoginForm {
    pub fn new(prefill_demo: bool) -> Self {
        let (email, password) = if prefill_demo {
            (DEMO_EMAIL.to_string(), DEMO_PASSWORD.to_string())
        } else {
            (String::new(), String::new())
        };

        Self {
            email,
            password,
            focus: LoginField::Email,
            error: None,
            pending: false,
        }
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn switch_field(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    /// Both fields are required before a request is made
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

/// Application state
pub struct App {
    /// Authentication state
    pub sessions: SessionManager,
    /// Present exactly while a session is held
    pub chat: Option<ConversationController>,
    /// Bumped for every new conversation, so late replies for an old one are dropped
    pub chat_generation: u64,
    pub login: LoginForm,
    pub ui: UIConfig,
    /// Is the app running?
    pub running: bool,
    /// Lines scrolled up from the bottom of the chat
    pub scroll_offset: u16,
    /// Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new app instance around an already restored (or empty) session
    pub fn new(sessions: SessionManager, ui: UIConfig) -> Self {
        let login = LoginForm::new(ui.demo_hint);
        let mut app = Self {
            sessions,
            chat: None,
            chat_generation: 0,
            login,
            ui,
            running: true,
            scroll_offset: 0,
            status_message: None,
        };
        app.sync_route();
        app
    }

    /// Current view, decided by the route guard
    pub fn screen(&self) -> Screen {
        if has_valid_session(self.sessions.current()) && self.chat.is_some() {
            Screen::Chat
        } else {
            Screen::Login
        }
    }

    /// Open a conversation when a session appears, tear it down when it goes
    fn sync_route(&mut self) {
        match (self.sessions.current(), self.chat.is_some()) {
            (Some(session), false) if has_valid_session(Some(session)) => {
                self.chat = Some(ConversationController::new(
                    session.clone(),
                    self.sessions.api(),
                ));
                self.chat_generation += 1;
                self.scroll_offset = 0;
            }
            (None, true) => {
                // Dropping the controller aborts a running voice ticker
                self.chat = None;
            }
            _ => {}
        }
    }

    /// Attempt to sign in with the form's credentials
    pub async fn submit_login(&mut self) {
        if !self.login.is_complete() {
            self.login.pending = false;
            self.login.error = Some("Please enter your email and password".to_string());
            return;
        }

        self.login.pending = true;
        let email = self.login.email.trim().to_string();
        let password = self.login.password.clone();
        let result = self.sessions.login(&email, &password).await;
        self.login.pending = false;

        match result {
            Ok(_) => {
                self.login.error = None;
                self.login.password.clear();
                self.clear_status();
                self.sync_route();
            }
            Err(e) => {
                self.login.error = Some(e.to_string());
            }
        }
    }

    /// Sign out and return to the login view
    pub fn logout(&mut self) {
        if let Some(chat) = self.chat.as_mut() {
            chat.cancel_recording();
        }
        if let Err(e) = self.sessions.logout() {
            warn!(error = %e, "Sign out could not clear stored session");
            self.set_status(format!("Signed out, but the stored session could not be cleared: {}", e));
        }
        self.login = LoginForm::new(self.ui.demo_hint);
        self.sync_route();
    }

    /// Set status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Scroll chat view up
    pub fn scroll_up(&mut self, amount: u16) {
        let Some(chat) = self.chat.as_ref() else {
            return;
        };

        // Speaker line + content lines + spacer per message
        let total_lines = chat.messages().iter().fold(0u16, |total, msg| {
            let lines = u16::try_from(msg.text.lines().count()).unwrap_or(u16::MAX);
            total.saturating_add(lines).saturating_add(2)
        });
        let max_scroll = total_lines.saturating_sub(UI_DEFAULT_VIEWPORT_HEIGHT);

        self.scroll_offset = self.scroll_offset.saturating_add(amount).min(max_scroll);
    }

    /// Scroll chat view down
    pub fn scroll_down(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }
}
