use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::matching::ranking::RankingConfig;
use crate::matching::scoring::DEFAULT_PROFILE_KEY;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
    pub ranking: RankingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("MATCH_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("MATCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_target = parse_var("MATCH_LOG_TARGET", LogTarget::Stderr)?;
        let log_ansi = parse_var("MATCH_LOG_ANSI", false)?;
        let default_profile =
            env::var("MATCH_DEFAULT_PROFILE").unwrap_or_else(|_| DEFAULT_PROFILE_KEY.to_string());

        let defaults = RankingConfig::default();
        let competitor_exclusion_threshold = parse_var(
            "MATCH_COMPETITOR_EXCLUSION_THRESHOLD",
            defaults.competitor_exclusion_threshold,
        )?;
        let max_processing = parse_var("MATCH_MAX_PROCESSING", defaults.max_processing)?;
        if max_processing == 0 {
            return Err(ConfigError::InvalidValue {
                variable: "MATCH_MAX_PROCESSING",
                value: max_processing.to_string(),
            });
        }

        let estimated_value_fraction = parse_var(
            "MATCH_ESTIMATED_VALUE_FRACTION",
            defaults.estimated_value_fraction,
        )?;
        if !(estimated_value_fraction > 0.0 && estimated_value_fraction <= 1.0) {
            return Err(ConfigError::InvalidValue {
                variable: "MATCH_ESTIMATED_VALUE_FRACTION",
                value: estimated_value_fraction.to_string(),
            });
        }

        let max_page_size = parse_var("MATCH_MAX_PAGE_SIZE", defaults.max_page_size)?;
        let default_page_size = parse_var("MATCH_DEFAULT_PAGE_SIZE", defaults.default_page_size)?;
        if default_page_size == 0 || default_page_size > max_page_size {
            return Err(ConfigError::InvalidValue {
                variable: "MATCH_DEFAULT_PAGE_SIZE",
                value: default_page_size.to_string(),
            });
        }

        let timeout = match env::var("MATCH_RANKING_TIMEOUT_MS") {
            Ok(raw) if !raw.trim().is_empty() => {
                let millis = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue {
                        variable: "MATCH_RANKING_TIMEOUT_MS",
                        value: raw.clone(),
                    })?;
                Some(Duration::from_millis(millis))
            }
            _ => None,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig {
                log_level,
                target: log_target,
                ansi: log_ansi,
            },
            scoring: ScoringConfig { default_profile },
            ranking: RankingConfig {
                competitor_exclusion_threshold,
                max_processing,
                estimated_value_fraction,
                default_page_size,
                max_page_size,
                timeout,
            },
        })
    }
}

fn parse_var<T>(variable: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match env::var(variable) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue {
                variable,
                value: raw,
            }),
        _ => Ok(default),
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub target: LogTarget,
    /// Colored output, off unless `MATCH_LOG_ANSI` is set.
    pub ansi: bool,
}

/// Stream the log lines are written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    Stdout,
}

impl FromStr for LogTarget {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stderr" => Ok(Self::Stderr),
            "stdout" => Ok(Self::Stdout),
            other => Err(format!("unknown log target '{other}'")),
        }
    }
}

/// Scoring defaults applied when callers do not name a weight profile.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub default_profile: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue {
        variable: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { variable, value } => {
                write!(f, "{variable} has an invalid value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "MATCH_ENV",
            "MATCH_LOG_LEVEL",
            "MATCH_LOG_TARGET",
            "MATCH_LOG_ANSI",
            "MATCH_DEFAULT_PROFILE",
            "MATCH_COMPETITOR_EXCLUSION_THRESHOLD",
            "MATCH_MAX_PROCESSING",
            "MATCH_ESTIMATED_VALUE_FRACTION",
            "MATCH_DEFAULT_PAGE_SIZE",
            "MATCH_MAX_PAGE_SIZE",
            "MATCH_RANKING_TIMEOUT_MS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.target, LogTarget::Stderr);
        assert!(!config.telemetry.ansi);
        assert_eq!(config.scoring.default_profile, "default");
        assert_eq!(config.ranking.competitor_exclusion_threshold, 100);
        assert_eq!(config.ranking.max_processing, 100);
        assert_eq!(config.ranking.default_page_size, 50);
        assert!(config.ranking.timeout.is_none());
    }

    #[test]
    fn overrides_ranking_ceilings_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MATCH_ENV", "production");
        env::set_var("MATCH_COMPETITOR_EXCLUSION_THRESHOLD", "250");
        env::set_var("MATCH_MAX_PROCESSING", "40");
        env::set_var("MATCH_RANKING_TIMEOUT_MS", "1500");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.ranking.competitor_exclusion_threshold, 250);
        assert_eq!(config.ranking.max_processing, 40);
        assert_eq!(config.ranking.timeout, Some(Duration::from_millis(1500)));
        reset_env();
    }

    #[test]
    fn log_output_is_configurable() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MATCH_LOG_TARGET", "STDOUT");
        env::set_var("MATCH_LOG_ANSI", "true");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.telemetry.target, LogTarget::Stdout);
        assert!(config.telemetry.ansi);

        env::set_var("MATCH_LOG_TARGET", "syslog");
        let err = AppConfig::load().expect_err("unknown target is rejected");
        assert!(err.to_string().contains("MATCH_LOG_TARGET"));
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_fraction() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MATCH_ESTIMATED_VALUE_FRACTION", "1.5");
        let err = AppConfig::load().expect_err("fraction above one is rejected");
        assert!(err.to_string().contains("MATCH_ESTIMATED_VALUE_FRACTION"));
        reset_env();
    }
}
