use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Pacing applied before every fetch/delete call. Zero disables it;
    /// non-zero values are for demos and manual testing of loading states.
    pub api_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_delay: Duration::ZERO,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(v) = std::env::var("APP__API_DELAY_MS") {
        match v.parse::<u64>() {
            Ok(ms) => settings.api_delay = Duration::from_millis(ms),
            Err(_) => {
                tracing::warn!(value = %v, "ignoring unparseable APP__API_DELAY_MS");
            }
        }
    }

    settings
}
