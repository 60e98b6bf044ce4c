use log::{debug, error, info};

use crate::config::Settings;
use crate::control_plane::{ControlPlane, PageCursor};
use crate::error::{BrokerError, Result};
use crate::logic::family::resolve_family;
use crate::logic::parameters::{derive_parameters, needs_custom_parameters, EngineDefaults};
use crate::model::{immediate_parameters, InstanceRecord, ParameterSet};

/// Creates, locates and updates the per-instance parameter group.
pub struct ParameterGroupManager<C> {
    client: C,
    settings: Settings,
}

impl<C: ControlPlane> ParameterGroupManager<C> {
    pub fn new(client: C, settings: Settings) -> Self {
        Self { client, settings }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Name of the group that holds `instance`'s custom parameters. Stable for
    /// a given instance, so separate create and modify calls agree on it.
    pub fn group_name(&self, instance: &InstanceRecord) -> String {
        format!("{}{}", self.settings.parameter_group_prefix, instance.format_db_name())
    }

    /// Make sure the instance's custom group exists and holds the parameters
    /// it currently needs.
    ///
    /// Returns `None` when the engine defaults are fine and the control
    /// plane's default group should be used.
    pub async fn provision_group_if_necessary(
        &self,
        instance: &mut InstanceRecord,
    ) -> Result<Option<String>> {
        if !needs_custom_parameters(instance, &self.settings) {
            return Ok(None);
        }

        let params = derive_parameters(instance, &self.settings, self).await?;

        let group_name = self.create_or_modify_group(instance, &params).await.map_err(|e| {
            error!("applying parameter group for {}: {}", instance.database, e);
            e
        })?;
        Ok(Some(group_name))
    }

    async fn create_or_modify_group(
        &self,
        instance: &mut InstanceRecord,
        params: &ParameterSet,
    ) -> Result<String> {
        let group_name = self.group_name(instance);

        if !self.group_exists(&group_name).await {
            resolve_family(&self.client, instance).await?;

            info!(
                "creating a parameter group named {} in the family of {}",
                group_name, instance.parameter_group_family
            );
            let description = format!(
                "aws broker parameter group for {}",
                instance.format_db_name()
            );
            self.client
                .create_group(&group_name, &instance.parameter_group_family, &description)
                .await
                .map_err(|e| {
                    BrokerError::control_plane("creating parameter group", &group_name, e)
                })?;
        }

        // Re-applied every time: settings can change what an existing group
        // should hold.
        let parameters = params
            .get(instance.engine.as_str())
            .map(immediate_parameters)
            .unwrap_or_default();
        self.client
            .modify_group_parameters(&group_name, &parameters)
            .await
            .map_err(|e| BrokerError::control_plane("applying parameters", &group_name, e))?;

        Ok(group_name)
    }

    /// Any failure to describe the group counts as "absent", including
    /// transient transport errors.
    pub async fn group_exists(&self, group_name: &str) -> bool {
        match self.client.describe_group_parameters(group_name).await {
            Ok(()) => {
                info!("{} parameter group already exists", group_name);
                true
            }
            Err(e) => {
                debug!("treating {} as absent: {}", group_name, e);
                false
            }
        }
    }

    /// Value of `param_name` in the engine-default catalog of the instance's
    /// family. An empty string means the catalog has no such parameter.
    pub async fn lookup_engine_default(
        &self,
        param_name: &str,
        instance: &mut InstanceRecord,
    ) -> Result<String> {
        resolve_family(&self.client, instance).await?;
        let family = instance.parameter_group_family.as_str();

        let mut cursor = PageCursor::new(self.settings.max_pages);
        while cursor.has_more() {
            let page = self
                .client
                .describe_engine_default_parameters(family, cursor.marker())
                .await
                .map_err(|e| {
                    BrokerError::control_plane("describing engine default parameters", family, e)
                })?;

            if let Some(param) = page.items.into_iter().find(|p| p.name == param_name) {
                let value = param.value.unwrap_or_default();
                info!(
                    "found default parameter value {} for parameter {}",
                    value, param_name
                );
                return Ok(value);
            }

            cursor
                .advance(page.marker)
                .map_err(|e| BrokerError::PaginationLimit {
                    operation: "describing engine default parameters",
                    resource: family.to_string(),
                    pages: e.pages,
                })?;
        }

        Ok(String::new())
    }
}

#[async_trait::async_trait]
impl<C: ControlPlane> EngineDefaults for ParameterGroupManager<C> {
    async fn engine_default(&self, name: &str, instance: &mut InstanceRecord) -> Result<String> {
        self.lookup_engine_default(name, instance).await
    }
}
