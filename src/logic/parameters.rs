//! Non-default engine parameters an instance needs.
//!
//! Each supported engine contributes an [`EngineParameters`] strategy; adding
//! an engine means adding a strategy and a match arm in [`strategy_for`].

use itertools::Itertools;

use crate::config::Settings;
use crate::error::Result;
use crate::model::{EngineType, InstanceRecord, ParameterMap, ParameterSet};

pub const LOG_BIN_TRUST_FUNCTION_CREATORS: &str = "log_bin_trust_function_creators";
pub const BINLOG_FORMAT: &str = "binlog_format";
pub const SHARED_PRELOAD_LIBRARIES: &str = "shared_preload_libraries";
pub const PG_CRON_LIBRARY: &str = "pg_cron";

/// Source of engine-default parameter values.
#[async_trait::async_trait]
pub trait EngineDefaults: Send + Sync {
    /// Default value of `name` for the instance's family, or an empty string
    /// when the catalog has no such parameter.
    async fn engine_default(&self, name: &str, instance: &mut InstanceRecord) -> Result<String>;
}

/// Per-engine parameter rules.
#[async_trait::async_trait]
pub trait EngineParameters: Send + Sync {
    fn needs_custom_parameters(&self, instance: &InstanceRecord, settings: &Settings) -> bool;

    async fn derive(
        &self,
        instance: &mut InstanceRecord,
        settings: &Settings,
        defaults: &dyn EngineDefaults,
    ) -> Result<ParameterMap>;
}

pub struct MysqlParameters;

pub struct PostgresParameters;

static MYSQL: MysqlParameters = MysqlParameters;
static POSTGRES: PostgresParameters = PostgresParameters;

pub fn strategy_for(engine: &EngineType) -> Option<&'static dyn EngineParameters> {
    match engine {
        EngineType::Mysql => Some(&MYSQL),
        EngineType::Postgres => Some(&POSTGRES),
        EngineType::Other(_) => None,
    }
}

fn functions_allowed(instance: &InstanceRecord, settings: &Settings) -> bool {
    instance.enable_functions && settings.enable_functions_feature
}

#[async_trait::async_trait]
impl EngineParameters for MysqlParameters {
    fn needs_custom_parameters(&self, instance: &InstanceRecord, settings: &Settings) -> bool {
        functions_allowed(instance, settings) || !instance.binary_log_format.is_empty()
    }

    async fn derive(
        &self,
        instance: &mut InstanceRecord,
        settings: &Settings,
        _defaults: &dyn EngineDefaults,
    ) -> Result<ParameterMap> {
        let mut params = ParameterMap::new();
        // Always written so a previously enabled group gets switched back off.
        let trust = if functions_allowed(instance, settings) { "1" } else { "0" };
        params.insert(LOG_BIN_TRUST_FUNCTION_CREATORS.to_string(), trust.to_string());

        if !instance.binary_log_format.is_empty() {
            params.insert(BINLOG_FORMAT.to_string(), instance.binary_log_format.clone());
        }
        Ok(params)
    }
}

#[async_trait::async_trait]
impl EngineParameters for PostgresParameters {
    fn needs_custom_parameters(&self, instance: &InstanceRecord, _settings: &Settings) -> bool {
        instance.enable_pg_cron
    }

    async fn derive(
        &self,
        instance: &mut InstanceRecord,
        _settings: &Settings,
        defaults: &dyn EngineDefaults,
    ) -> Result<ParameterMap> {
        let mut params = ParameterMap::new();
        if instance.enable_pg_cron {
            let libraries = preload_libraries(instance, PG_CRON_LIBRARY, defaults).await?;
            params.insert(SHARED_PRELOAD_LIBRARIES.to_string(), libraries);
        }
        Ok(params)
    }
}

/// `library` prepended to whatever the engine default already preloads.
async fn preload_libraries(
    instance: &mut InstanceRecord,
    library: &str,
    defaults: &dyn EngineDefaults,
) -> Result<String> {
    let default = defaults
        .engine_default(SHARED_PRELOAD_LIBRARIES, instance)
        .await?;
    Ok(std::iter::once(library)
        .chain(Some(default.as_str()).filter(|d| !d.is_empty()))
        .join(","))
}

pub fn needs_custom_parameters(instance: &InstanceRecord, settings: &Settings) -> bool {
    strategy_for(&instance.engine)
        .is_some_and(|strategy| strategy.needs_custom_parameters(instance, settings))
}

/// Parameters keyed by engine type. Engines without rules yield an empty set.
pub async fn derive_parameters(
    instance: &mut InstanceRecord,
    settings: &Settings,
    defaults: &dyn EngineDefaults,
) -> Result<ParameterSet> {
    let mut set = ParameterSet::new();
    if let Some(strategy) = strategy_for(&instance.engine) {
        let params = strategy.derive(instance, settings, defaults).await?;
        set.insert(instance.engine.to_string(), params);
    }
    Ok(set)
}
