/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001/api";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const STATUS_PROBE_TIMEOUT_MS: u64 = 500;

// Durable session slots
pub const TOKEN_SLOT: &str = "token";
pub const USER_SLOT: &str = "user";

// Voice capture
pub const VOICE_TICK_INTERVAL_SECS: u64 = 1;

// UI Configuration
pub const UI_REFRESH_INTERVAL_MS: u64 = 50;
pub const UI_SCROLL_LINES: u16 = 3;
pub const UI_DEFAULT_VIEWPORT_HEIGHT: u16 = 20;

// Conversation
pub const GREETING: &str = "Good morning! I'm your AI companion. How are you feeling today?";
pub const DEFAULT_DISPLAY_NAME: &str = "Friend";
pub const MOOD_SCORE_MIN: u8 = 1;
pub const MOOD_SCORE_MAX: u8 = 10;

// Authentication messages
pub const LOGIN_FAILED: &str = "Login failed";
pub const CONNECTION_FAILED: &str = "Connection failed";

// Demo account shown on the login screen
pub const DEMO_EMAIL: &str = "mary@example.com";
pub const DEMO_PASSWORD: &str = "password123";

// History
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
