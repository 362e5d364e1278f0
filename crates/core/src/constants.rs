/// Constants used throughout the authgate codebase
// Request headers
pub const DEFAULT_PATH_HEADER: &str = "X-Authz-Path";
pub const DEFAULT_USER_HEADER: &str = "X-Forwarded-User";
pub const IF_NONE_MATCH_HEADER: &str = "If-None-Match";
pub const FORWARDED_FOR_HEADER: &str = "X-Forwarded-For";
pub const REAL_IP_HEADER: &str = "X-Real-IP";

// Response headers
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

// Directory defaults
pub const DEFAULT_DIRECTORY_TIMEOUT_MS: u64 = 1000;

// Right labels every rights table understands
pub const RIGHT_ANY: &str = "any";
pub const RIGHT_NONE: &str = "none";

// Placeholder used in log lines when the client address is unknown
pub const UNKNOWN_CLIENT: &str = "-";
