use serde::{Deserialize, Serialize};

/// Caller-supplied change request for an existing instance.
///
/// Zero and empty values mean "leave as is". `enable_pg_cron` is tri-state
/// because "unset" and "set to false" must be told apart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateOptions {
    pub allocated_storage: u32,
    pub backup_retention_period: u32,
    pub binary_log_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_pg_cron: Option<bool>,
}

/// Catalog plan an instance was provisioned from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    pub id: String,
    /// When set, takes precedence over the version stored on the instance.
    pub db_version: String,
}

impl Plan {
    pub fn with_version(id: impl Into<String>, db_version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            db_version: db_version.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pg_cron_absent_versus_false() {
        let absent: UpdateOptions = serde_json::from_str(r#"{"allocated_storage": 20}"#).unwrap();
        assert_eq!(absent.enable_pg_cron, None);
        assert_eq!(absent.allocated_storage, 20);

        let disabled: UpdateOptions =
            serde_json::from_str(r#"{"enable_pg_cron": false}"#).unwrap();
        assert_eq!(disabled.enable_pg_cron, Some(false));
    }
}
