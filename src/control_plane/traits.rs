use crate::model::{EngineParameter, Parameter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error code returned when deleting a parameter group still attached to an
/// instance.
pub const GROUP_IN_USE_CODE: &str = "InvalidDBParameterGroupState";
pub const GROUP_NOT_FOUND_CODE: &str = "DBParameterGroupNotFound";
pub const GROUP_ALREADY_EXISTS_CODE: &str = "DBParameterGroupAlreadyExists";

/// Failure reported by the control-plane transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ControlPlaneError {
    pub code: String,
    pub message: String,
}

impl ControlPlaneError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_group_in_use(&self) -> bool {
        self.code == GROUP_IN_USE_CODE
    }
}

/// One page of a paginated listing. A missing or empty `marker` ends the
/// listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub marker: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            marker: None,
        }
    }

    pub fn with_marker(items: Vec<T>, marker: impl Into<String>) -> Self {
        Self {
            items,
            marker: Some(marker.into()),
        }
    }
}

/// Default engine version reported for an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineVersion {
    pub engine: String,
    pub version: String,
    pub parameter_group_family: String,
}

/// Operations the core issues against the managed-database control plane.
#[async_trait::async_trait]
pub trait ControlPlane: Send + Sync {
    /// Describe the parameters of a group. Only success or failure is used.
    async fn describe_group_parameters(&self, group_name: &str) -> Result<(), ControlPlaneError>;

    async fn create_group(
        &self,
        group_name: &str,
        family: &str,
        description: &str,
    ) -> Result<(), ControlPlaneError>;

    async fn modify_group_parameters(
        &self,
        group_name: &str,
        parameters: &[Parameter],
    ) -> Result<(), ControlPlaneError>;

    /// Versions flagged as default for `engine`; normally exactly one.
    async fn describe_default_engine_versions(
        &self,
        engine: &str,
    ) -> Result<Vec<EngineVersion>, ControlPlaneError>;

    async fn describe_engine_default_parameters(
        &self,
        family: &str,
        marker: Option<&str>,
    ) -> Result<Page<EngineParameter>, ControlPlaneError>;

    async fn list_groups(&self, marker: Option<&str>) -> Result<Page<String>, ControlPlaneError>;

    async fn delete_group(&self, group_name: &str) -> Result<(), ControlPlaneError>;
}

#[async_trait::async_trait]
impl<T: ControlPlane + ?Sized> ControlPlane for Arc<T> {
    async fn describe_group_parameters(&self, group_name: &str) -> Result<(), ControlPlaneError> {
        (**self).describe_group_parameters(group_name).await
    }

    async fn create_group(
        &self,
        group_name: &str,
        family: &str,
        description: &str,
    ) -> Result<(), ControlPlaneError> {
        (**self).create_group(group_name, family, description).await
    }

    async fn modify_group_parameters(
        &self,
        group_name: &str,
        parameters: &[Parameter],
    ) -> Result<(), ControlPlaneError> {
        (**self).modify_group_parameters(group_name, parameters).await
    }

    async fn describe_default_engine_versions(
        &self,
        engine: &str,
    ) -> Result<Vec<EngineVersion>, ControlPlaneError> {
        (**self).describe_default_engine_versions(engine).await
    }

    async fn describe_engine_default_parameters(
        &self,
        family: &str,
        marker: Option<&str>,
    ) -> Result<Page<EngineParameter>, ControlPlaneError> {
        (**self).describe_engine_default_parameters(family, marker).await
    }

    async fn list_groups(&self, marker: Option<&str>) -> Result<Page<String>, ControlPlaneError> {
        (**self).list_groups(marker).await
    }

    async fn delete_group(&self, group_name: &str) -> Result<(), ControlPlaneError> {
        (**self).delete_group(group_name).await
    }
}
