use std::time::Duration;

pub const DEFAULT_URL: &str = "https://httpbin.org/get";
pub const DEFAULT_PARAMS: &str = "param1=value1\nparam2=value2";
pub const DEFAULT_HEADERS: &str = "Content-Type=application/json\nAccept=application/json";
pub const RESPONSE_PLACEHOLDER: &str = "Response will appear here after sending request";
pub const SENDING_PLACEHOLDER: &str = "Sending request...";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Seed content and limits. There is no config file; `Default` is what
/// the binary runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Dispatch-to-last-byte limit for one request.
    pub timeout: Duration,
    pub seed_url: String,
    pub seed_params: String,
    pub seed_headers: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            seed_url: DEFAULT_URL.to_string(),
            seed_params: DEFAULT_PARAMS.to_string(),
            seed_headers: DEFAULT_HEADERS.to_string(),
        }
    }
}
