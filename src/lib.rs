pub mod api;
pub mod app;
pub mod cli;
pub mod constants;
pub mod conversation;
pub mod runtime;
pub mod session;
pub mod tui;
pub mod utils;

pub use app::{load_config, Config};
pub use conversation::{ConversationController, QuickAction, ReplySource};
pub use session::{has_valid_session, Session, SessionManager};
pub use tui::run_ui;
pub use utils::CompanionError;
