// =====================================================
// CONNECTION RESOLVER
// Turns a mobile service descriptor into SQL connection settings
// =====================================================

use crate::db_types::{ConnectionConfig, DEFAULT_SQL_PORT};
use crate::error::TuneError;
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const SQL_SERVER_DOMAIN: &str = "database.windows.net";
const MANAGEMENT_API_VERSION: &str = "2012-03-01";

// --- Resource Kinds ---

/// Resource types that contribute to the connection settings. Anything else
/// listed on the service is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    SqlServer,
    SqlDatabase,
}

impl ResourceKind {
    pub fn type_name(self) -> &'static str {
        match self {
            ResourceKind::SqlServer => "Microsoft.WindowsAzure.SQLAzure.Server",
            ResourceKind::SqlDatabase => "Microsoft.WindowsAzure.SQLAzure.DataBase",
        }
    }

    pub fn from_type_name(value: &str) -> Option<Self> {
        [ResourceKind::SqlServer, ResourceKind::SqlDatabase]
            .into_iter()
            .find(|kind| kind.type_name() == value)
    }
}

// --- Descriptor Document ---

/// The management API renders single-element lists as a bare object.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => std::slice::from_ref(item),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ServiceResource {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Type", default)]
    pub resource_type: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ResourceGroup {
    #[serde(rename = "InternalResource", alias = "ExternalResource", default)]
    pub resources: Option<OneOrMany<ServiceResource>>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ServiceDescriptor {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "InternalResources", default)]
    pub internal_resources: Option<ResourceGroup>,
    #[serde(rename = "ExternalResources", default)]
    pub external_resources: Option<ResourceGroup>,
}

impl ServiceDescriptor {
    /// Internal resources first, then external ones.
    pub fn resources(&self) -> impl Iterator<Item = &ServiceResource> {
        [&self.internal_resources, &self.external_resources]
            .into_iter()
            .flatten()
            .filter_map(|group| group.resources.as_ref())
            .flat_map(|resources| resources.as_slice().iter())
    }

    /// Name of the single resource of `kind`. Repeats of the same name are
    /// tolerated; two different names are not.
    pub fn resource_name(&self, kind: ResourceKind) -> Result<&str, TuneError> {
        let mut found: Option<&str> = None;

        for resource in self.resources() {
            let (Some(name), Some(type_name)) =
                (resource.name.as_deref(), resource.resource_type.as_deref())
            else {
                continue;
            };
            if name.is_empty() || ResourceKind::from_type_name(type_name) != Some(kind) {
                continue;
            }

            match found {
                Some(existing) if existing != name => {
                    return Err(TuneError::ConfigResolution(format!(
                        "Service lists more than one {} resource ('{}' and '{}')",
                        kind.type_name(),
                        existing,
                        name
                    )));
                }
                _ => found = Some(name),
            }
        }

        found.ok_or_else(|| {
            TuneError::ConfigResolution(format!("Service has no {} resource", kind.type_name()))
        })
    }
}

/// Builds the connection settings for `username` on the service's SQL server.
pub fn connection_from_descriptor(
    descriptor: &ServiceDescriptor,
    username: &str,
    password: &str,
) -> Result<ConnectionConfig, TuneError> {
    let server_name = descriptor.resource_name(ResourceKind::SqlServer)?;
    let database = descriptor.resource_name(ResourceKind::SqlDatabase)?;

    Ok(ConnectionConfig {
        server: format!("{}.{}", server_name, SQL_SERVER_DOMAIN),
        port: DEFAULT_SQL_PORT,
        database: database.to_string(),
        user: format!("{}@{}", username, server_name),
        password: password.to_string(),
        encrypt: true,
        trust_server_certificate: false,
    })
}

// --- Descriptor Sources ---

#[async_trait]
pub trait ServiceResolver: Send + Sync {
    async fn fetch_descriptor(&self, service_name: &str) -> Result<ServiceDescriptor, TuneError>;
}

fn validate_service_name(service_name: &str) -> Result<(), TuneError> {
    let valid = !service_name.is_empty()
        && service_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(TuneError::ConfigResolution(format!(
            "Invalid service name '{}'",
            service_name
        )))
    }
}

/// Reads the descriptor from the service management REST API.
pub struct ManagementApiResolver {
    client: reqwest::Client,
    endpoint: String,
    subscription_id: String,
    token: String,
}

impl ManagementApiResolver {
    pub fn new(
        endpoint: &str,
        subscription_id: &str,
        token: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, TuneError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TuneError::ConfigResolution(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            subscription_id: subscription_id.to_string(),
            token: token.to_string(),
        })
    }

    pub fn descriptor_url(&self, service_name: &str) -> String {
        format!(
            "{}/{}/applications/{}mobileservice",
            self.endpoint, self.subscription_id, service_name
        )
    }
}

#[async_trait]
impl ServiceResolver for ManagementApiResolver {
    async fn fetch_descriptor(&self, service_name: &str) -> Result<ServiceDescriptor, TuneError> {
        validate_service_name(service_name)?;
        let url = self.descriptor_url(service_name);
        debug!("Fetching service descriptor from {}", url);

        let response = self
            .client
            .get(&url)
            .header("x-ms-version", MANAGEMENT_API_VERSION)
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| TuneError::ConfigResolution(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TuneError::ConfigResolution(format!(
                "Service '{}' not found",
                service_name
            )));
        }
        if !status.is_success() {
            let err_body = response.text().await.unwrap_or_default();
            return Err(TuneError::ConfigResolution(format!(
                "Management API error ({}): {}",
                status, err_body
            )));
        }

        response.json::<ServiceDescriptor>().await.map_err(|e| {
            TuneError::ConfigResolution(format!("Malformed service descriptor: {}", e))
        })
    }
}

/// Reads a descriptor saved as JSON on disk.
pub struct DescriptorFileResolver {
    pub path: PathBuf,
}

#[async_trait]
impl ServiceResolver for DescriptorFileResolver {
    async fn fetch_descriptor(&self, service_name: &str) -> Result<ServiceDescriptor, TuneError> {
        validate_service_name(service_name)?;
        debug!(
            "Reading descriptor for '{}' from {}",
            service_name,
            self.path.display()
        );

        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            TuneError::ConfigResolution(format!("Cannot read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            TuneError::ConfigResolution(format!("Malformed service descriptor: {}", e))
        })
    }
}

/// Fetches the descriptor for `service_name` and derives the connection settings.
pub async fn resolve_connection<R>(
    resolver: &R,
    service_name: &str,
    username: &str,
    password: &str,
) -> Result<ConnectionConfig, TuneError>
where
    R: ServiceResolver + ?Sized,
{
    let descriptor = resolver.fetch_descriptor(service_name).await?;
    connection_from_descriptor(&descriptor, username, password)
}
