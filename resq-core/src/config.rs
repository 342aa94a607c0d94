use crate::account::AdminCodePolicy;
use crate::model::GeoPosition;
use location_registry::{LocationError, LocationHierarchy};
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "incidents.db";
pub const DEFAULT_ADMIN_CODE: &str = "ADMIN123";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be `server` or `local`, got '{value}'")]
    UnknownPolicy { var: &'static str, value: String },
    #[error("{var} is not a valid coordinate: '{value}'")]
    BadCoordinate { var: &'static str, value: String },
    #[error("set both RESQ_DEVICE_LATITUDE and RESQ_DEVICE_LONGITUDE, or neither")]
    PartialPosition,
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Locations(#[from] LocationError),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PolicyKind {
    #[default]
    Server,
    Local,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResqConfig {
    pub db_path: PathBuf,
    pub admin_code: String,
    pub policy: PolicyKind,
    pub locations_path: Option<PathBuf>,
    pub device_position: Option<GeoPosition>,
}

impl Default for ResqConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            admin_code: DEFAULT_ADMIN_CODE.to_string(),
            policy: PolicyKind::Server,
            locations_path: None,
            device_position: None,
        }
    }
}

impl ResqConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let policy = match get("RESQ_ADMIN_CODE_POLICY").as_deref().map(str::trim) {
            None | Some("server") => PolicyKind::Server,
            Some("local") => PolicyKind::Local,
            Some(other) => {
                return Err(ConfigError::UnknownPolicy {
                    var: "RESQ_ADMIN_CODE_POLICY",
                    value: other.to_string(),
                })
            }
        };

        let latitude = coordinate(get("RESQ_DEVICE_LATITUDE"), "RESQ_DEVICE_LATITUDE", 90.0)?;
        let longitude = coordinate(get("RESQ_DEVICE_LONGITUDE"), "RESQ_DEVICE_LONGITUDE", 180.0)?;
        let device_position = match (latitude, longitude) {
            (Some(lat), Some(lng)) => Some(GeoPosition::new(lat, lng)),
            (None, None) => None,
            _ => return Err(ConfigError::PartialPosition),
        };

        Ok(Self {
            db_path: get("RESQ_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            admin_code: get("RESQ_ADMIN_CODE").unwrap_or(defaults.admin_code),
            policy,
            locations_path: get("RESQ_LOCATIONS_PATH").map(PathBuf::from),
            device_position,
        })
    }

    pub fn admin_code_policy(&self) -> AdminCodePolicy {
        match self.policy {
            PolicyKind::Server => AdminCodePolicy::ServerVerified,
            PolicyKind::Local => AdminCodePolicy::LocalSecret(self.admin_code.clone()),
        }
    }

    /// The configured data set, or the built-in one.
    pub fn load_hierarchy(&self) -> Result<LocationHierarchy, ConfigError> {
        let Some(path) = &self.locations_path else {
            return Ok(LocationHierarchy::builtin());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(LocationHierarchy::from_json(&text)?)
    }
}

fn coordinate(raw: Option<String>, var: &'static str, limit: f64) -> Result<Option<f64>, ConfigError> {
    raw.map(|value| {
        let parsed = value.trim().parse::<f64>();
        match parsed {
            Ok(parsed) if parsed.is_finite() && parsed.abs() <= limit => Ok(parsed),
            _ => Err(ConfigError::BadCoordinate { var, value }),
        }
    })
    .transpose()
}
