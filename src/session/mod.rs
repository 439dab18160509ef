/// Session management module - Gateway

mod manager;
mod state;
mod storage;

pub use manager::SessionManager;
pub use state::{has_valid_session, Session};
pub use storage::{FileStore, MemoryStore, SessionStore};
