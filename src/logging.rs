//! Subscriber setup for the `tracing` events emitted by elastiq.
//!
//! Environment variables:
//!
//! - `ELASTIQ_LOG_LEVEL` - filter directive (`debug`, `info`, `elastiq_orm=trace`, ...),
//!   falling back to `RUST_LOG`, then `info`
//! - `ELASTIQ_LOG_FORMAT=pretty|compact|json` - output format, default `json`

use std::env;
use tracing_subscriber::EnvFilter;

/// Level filter variable.
pub const ENV_LOG_LEVEL: &str = "ELASTIQ_LOG_LEVEL";
/// Output format variable.
pub const ENV_LOG_FORMAT: &str = "ELASTIQ_LOG_FORMAT";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Multi-line, human readable.
    Pretty,
    /// Single line per event.
    Compact,
    /// One JSON object per event.
    #[default]
    Json,
}

impl Format {
    /// Parse a format name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive.
    pub filter: String,
    /// Output format.
    pub format: Format,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: Format::Json,
        }
    }
}

impl LogConfig {
    /// Read settings from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let filter = non_empty(ENV_LOG_LEVEL)
            .or_else(|| non_empty("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());
        let format = non_empty(ENV_LOG_FORMAT)
            .and_then(|value| Format::parse(&value))
            .unwrap_or_default();

        Self { filter, format }
    }

    /// Install a global subscriber. Returns `false` when one was already set.
    pub fn install(&self) -> bool {
        let filter = EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt().with_env_filter(filter);

        let installed = match self.format {
            Format::Pretty => builder.pretty().try_init(),
            Format::Compact => builder.compact().try_init(),
            Format::Json => builder.json().try_init(),
        };
        if installed.is_err() {
            return false;
        }
        tracing::debug!(filter = %self.filter, format = ?self.format, "Logging initialized");
        true
    }
}

/// Install the global subscriber from the environment.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() -> bool {
    LogConfig::from_env().install()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> LogConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config(&[]), LogConfig::default());
    }

    #[test]
    fn test_level_precedence() {
        assert_eq!(config(&[("RUST_LOG", "warn")]).filter, "warn");
        assert_eq!(
            config(&[("RUST_LOG", "warn"), (ENV_LOG_LEVEL, "debug")]).filter,
            "debug"
        );
        assert_eq!(config(&[(ENV_LOG_LEVEL, " ")]).filter, "info");
    }

    #[test]
    fn test_format() {
        assert_eq!(config(&[(ENV_LOG_FORMAT, "PRETTY")]).format, Format::Pretty);
        assert_eq!(config(&[(ENV_LOG_FORMAT, "compact")]).format, Format::Compact);
        assert_eq!(config(&[(ENV_LOG_FORMAT, "xml")]).format, Format::Json);
    }

    #[test]
    fn test_install_twice() {
        let config = LogConfig {
            filter: "elastiq=debug".to_string(),
            format: Format::Compact,
        };
        config.install();
        assert!(!config.install());
    }
}
