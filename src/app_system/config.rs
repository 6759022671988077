use super::SystemError;

pub const BUFFER_SIZE_VAR: &str = "ORDER_INVENTORY_BUFFER_SIZE";
pub const LOG_FILTER_VAR: &str = "ORDER_INVENTORY_LOG";

/// Runtime settings for [`super::OrderSystem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    /// Mailbox capacity of each store actor.
    pub buffer_size: usize,
    /// Filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            buffer_size: 100,
            log_filter: "info".to_string(),
        }
    }
}

impl SystemConfig {
    pub fn from_env() -> Result<Self, SystemError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SystemError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(BUFFER_SIZE_VAR) {
            config.buffer_size = match raw.trim().parse::<usize>() {
                Ok(0) | Err(_) => {
                    return Err(SystemError::Config(format!(
                        "{} must be a positive integer, got {:?}",
                        BUFFER_SIZE_VAR, raw
                    )))
                }
                Ok(size) => size,
            };
        }
        if let Some(filter) = lookup(LOG_FILTER_VAR).filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }

        Ok(config)
    }
}
