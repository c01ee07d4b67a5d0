use std::time::Duration;

/// Runtime settings, adjustable over IPC.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name given to the unnamed active desktop at startup.
    pub home_name: String,
    /// Name given to every other unnamed desktop at startup.
    pub unnamed_name: String,
    /// Notification text for a desktop without a name.
    pub unnamed_placeholder: String,
    pub notification_duration: Duration,
    pub poll_interval: Duration,
    /// Shell command launched whenever a name prompt opens.
    pub prompt_command: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_name: "home".to_string(),
            unnamed_name: "work".to_string(),
            unnamed_placeholder: "(unnamed)".to_string(),
            notification_duration: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(100),
            prompt_command: None,
        }
    }
}
