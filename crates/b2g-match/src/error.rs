use std::fmt;

use crate::config::ConfigError;
use crate::matching::complementarity::ComplementarityLoadError;
use crate::matching::directory::DirectoryError;
use crate::matching::scoring::WeightProfileError;
use crate::matching::MatchError;
use crate::telemetry::TelemetryError;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Directory(DirectoryError),
    Complementarity(ComplementarityLoadError),
    Profiles(WeightProfileError),
    Match(MatchError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "invalid json: {}", err),
            AppError::Directory(err) => write!(f, "directory error: {}", err),
            AppError::Complementarity(err) => write!(f, "complementarity error: {}", err),
            AppError::Profiles(err) => write!(f, "weight profile error: {}", err),
            AppError::Match(err) => write!(f, "matching error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Directory(err) => Some(err),
            AppError::Complementarity(err) => Some(err),
            AppError::Profiles(err) => Some(err),
            AppError::Match(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<DirectoryError> for AppError {
    fn from(value: DirectoryError) -> Self {
        Self::Directory(value)
    }
}

impl From<ComplementarityLoadError> for AppError {
    fn from(value: ComplementarityLoadError) -> Self {
        Self::Complementarity(value)
    }
}

impl From<WeightProfileError> for AppError {
    fn from(value: WeightProfileError) -> Self {
        Self::Profiles(value)
    }
}

impl From<MatchError> for AppError {
    fn from(value: MatchError) -> Self {
        Self::Match(value)
    }
}
