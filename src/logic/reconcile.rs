use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::control_plane::ControlPlane;
use crate::error::Result;
use crate::logic::cleanup::{sweep_orphaned_groups, SweepReport};
use crate::logic::modify::modify;
use crate::logic::parameter_group::ParameterGroupManager;
use crate::model::{InstanceRecord, Plan, UpdateOptions};

/// Inputs for the caller's create-instance call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInstanceRequest {
    pub db_instance_identifier: String,
    pub db_name: String,
    pub engine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    pub allocated_storage: u32,
    pub backup_retention_period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_parameter_group_name: Option<String>,
}

/// Inputs for the caller's modify-instance call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifyInstanceRequest {
    pub db_instance_identifier: String,
    pub allocated_storage: u32,
    pub backup_retention_period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_parameter_group_name: Option<String>,
    pub apply_immediately: bool,
}

fn pinned_version(instance: &InstanceRecord) -> Option<String> {
    Some(instance.db_version.clone()).filter(|v| !v.is_empty())
}

/// Drives one reconciliation pass for an instance.
///
/// Callers hand over exclusive access to the record for the duration of a
/// call and persist it afterwards; one pass per instance at a time.
pub struct Reconciler<C> {
    groups: ParameterGroupManager<C>,
}

impl<C: ControlPlane> Reconciler<C> {
    pub fn new(client: C, settings: Settings) -> Self {
        Self {
            groups: ParameterGroupManager::new(client, settings),
        }
    }

    pub fn parameter_groups(&self) -> &ParameterGroupManager<C> {
        &self.groups
    }

    /// Request for first-time provisioning of `instance`.
    pub async fn create_request(
        &self,
        instance: &mut InstanceRecord,
        plan: &Plan,
    ) -> Result<CreateInstanceRequest> {
        if !plan.db_version.is_empty() {
            instance.db_version = plan.db_version.clone();
        }
        let group = self.groups.provision_group_if_necessary(instance).await?;

        Ok(CreateInstanceRequest {
            db_instance_identifier: instance.database.clone(),
            db_name: instance.format_db_name(),
            engine: instance.engine.to_string(),
            engine_version: pinned_version(instance),
            allocated_storage: instance.allocated_storage,
            backup_retention_period: instance.backup_retention_period,
            db_parameter_group_name: group,
        })
    }

    /// Merge `options` into `instance` and build the modify request.
    ///
    /// A rejected field aborts before any control-plane call; the record may
    /// already hold the other accepted fields.
    pub async fn reconcile(
        &self,
        instance: &mut InstanceRecord,
        options: &UpdateOptions,
        plan: &Plan,
    ) -> Result<ModifyInstanceRequest> {
        modify(instance, options, plan)?;
        let group = self.groups.provision_group_if_necessary(instance).await?;

        Ok(ModifyInstanceRequest {
            db_instance_identifier: instance.database.clone(),
            allocated_storage: instance.allocated_storage,
            backup_retention_period: instance.backup_retention_period,
            engine_version: pinned_version(instance),
            db_parameter_group_name: group,
            apply_immediately: true,
        })
    }

    /// One cleanup pass over groups carrying the configured prefix.
    pub async fn sweep(&self) -> SweepReport {
        let settings = self.groups.settings();
        sweep_orphaned_groups(
            self.groups.client(),
            &settings.parameter_group_prefix,
            settings.max_pages,
        )
        .await
    }
}
