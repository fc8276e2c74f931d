// =====================================================
// TUNE COMMAND
// resolve -> connect -> query -> (apply), strictly in sequence
// =====================================================

use crate::advisor::{self, Connector, TuneReport};
use crate::config::{DescriptorSource, Settings};
use crate::error::TuneError;
use crate::mssql::MssqlConnector;
use crate::resolver::{
    resolve_connection, DescriptorFileResolver, ManagementApiResolver, ServiceResolver,
};
use log::{debug, info};
use std::fmt;

#[derive(Clone, PartialEq)]
pub struct TuneArgs {
    pub service_name: String,
    pub username: String,
    pub password: String,
    pub create_indexes: bool,
}

impl fmt::Debug for TuneArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TuneArgs")
            .field("service_name", &self.service_name)
            .field("username", &self.username)
            .field("password", &"********")
            .field("create_indexes", &self.create_indexes)
            .finish()
    }
}

/// Runs the whole pipeline against whatever resolver and connector are given.
/// Resolution failures return before the connector is touched.
pub async fn tune_service<R, C>(
    args: &TuneArgs,
    settings: &Settings,
    resolver: &R,
    connector: &C,
) -> Result<TuneReport, TuneError>
where
    R: ServiceResolver + ?Sized,
    C: Connector,
{
    info!("Connecting to db");
    let mut config =
        resolve_connection(resolver, &args.service_name, &args.username, &args.password).await?;
    config.port = settings.sql_port;
    config.trust_server_certificate = settings.trust_server_certificate;
    debug!("{:?}", config);

    let mut session = connector.connect(&config).await?;
    let report = advisor::tune(&mut session, args.create_indexes).await?;
    debug!(
        "Missing index statistics read at {}",
        report.captured_at.to_rfc3339()
    );

    Ok(report)
}

pub fn resolver_for(settings: &Settings) -> Result<Box<dyn ServiceResolver>, TuneError> {
    match &settings.descriptor_source {
        DescriptorSource::ManagementApi {
            endpoint,
            subscription_id,
            token,
        } => Ok(Box::new(ManagementApiResolver::new(
            endpoint,
            subscription_id,
            token,
            settings.connect_timeout,
        )?)),
        DescriptorSource::File(path) => Ok(Box::new(DescriptorFileResolver { path: path.clone() })),
    }
}

pub async fn run_tune_command(args: &TuneArgs, settings: &Settings) -> Result<(), TuneError> {
    let resolver = resolver_for(settings)?;
    let connector = MssqlConnector {
        connect_timeout: settings.connect_timeout,
    };

    tune_service(args, settings, resolver.as_ref(), &connector)
        .await?
        .into_result()
}
