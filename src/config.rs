use crate::db_types::DEFAULT_SQL_PORT;
use crate::error::TuneError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.core.windows.net";

pub const ENV_DESCRIPTOR_FILE: &str = "SQLTUNE_DESCRIPTOR_FILE";
pub const ENV_MANAGEMENT_ENDPOINT: &str = "SQLTUNE_MANAGEMENT_ENDPOINT";
pub const ENV_SUBSCRIPTION_ID: &str = "SQLTUNE_SUBSCRIPTION_ID";
pub const ENV_MANAGEMENT_TOKEN: &str = "SQLTUNE_MANAGEMENT_TOKEN";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "SQLTUNE_CONNECT_TIMEOUT_SECS";
pub const ENV_SQL_PORT: &str = "SQLTUNE_SQL_PORT";
pub const ENV_TRUST_SERVER_CERTIFICATE: &str = "SQLTUNE_TRUST_SERVER_CERTIFICATE";

#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorSource {
    ManagementApi {
        endpoint: String,
        subscription_id: String,
        token: String,
    },
    File(PathBuf),
}

/// Settings for the collaborators around the tune pipeline: where service
/// descriptors come from and how the SQL connection is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub descriptor_source: DescriptorSource,
    pub connect_timeout: Option<Duration>,
    pub sql_port: u16,
    pub trust_server_certificate: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, TuneError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, TuneError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let descriptor_source = match value(ENV_DESCRIPTOR_FILE) {
            Some(path) => DescriptorSource::File(PathBuf::from(path)),
            None => DescriptorSource::ManagementApi {
                endpoint: value(ENV_MANAGEMENT_ENDPOINT)
                    .unwrap_or_else(|| DEFAULT_MANAGEMENT_ENDPOINT.to_string()),
                subscription_id: value(ENV_SUBSCRIPTION_ID)
                    .ok_or_else(|| missing(ENV_SUBSCRIPTION_ID))?,
                token: value(ENV_MANAGEMENT_TOKEN)
                    .ok_or_else(|| missing(ENV_MANAGEMENT_TOKEN))?,
            },
        };

        let connect_timeout = match value(ENV_CONNECT_TIMEOUT_SECS) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => return Err(invalid(ENV_CONNECT_TIMEOUT_SECS, &raw)),
            },
            None => None,
        };

        let sql_port = match value(ENV_SQL_PORT) {
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(invalid(ENV_SQL_PORT, &raw)),
            },
            None => DEFAULT_SQL_PORT,
        };

        let trust_server_certificate = match value(ENV_TRUST_SERVER_CERTIFICATE) {
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(invalid(ENV_TRUST_SERVER_CERTIFICATE, &raw)),
            },
            None => false,
        };

        Ok(Settings {
            descriptor_source,
            connect_timeout,
            sql_port,
            trust_server_certificate,
        })
    }
}

fn missing(key: &str) -> TuneError {
    TuneError::ConfigResolution(format!(
        "{} must be set (or point {} at a saved service descriptor)",
        key, ENV_DESCRIPTOR_FILE
    ))
}

fn invalid(key: &str, raw: &str) -> TuneError {
    TuneError::ConfigResolution(format!("Invalid value for {}: '{}'", key, raw))
}
