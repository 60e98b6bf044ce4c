use log::{debug, warn};
use regex::Regex;
use std::sync::LazyLock;

use crate::control_plane::ControlPlane;
use crate::error::{BrokerError, Result};
use crate::model::{EngineType, InstanceRecord};

static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.*\d*").expect("version token regex"));

/// Family for a pinned version: the engine name followed by the leading
/// `major[.minor]` token, e.g. `postgres12` or `mysql8.0`.
pub fn family_for_version(engine: &EngineType, version: &str) -> String {
    let token = VERSION_TOKEN
        .find(version)
        .map(|m| m.as_str())
        .unwrap_or_default();
    if token.is_empty() {
        warn!("no numeric version token in {:?} for {}", version, engine);
    }
    format!("{}{}", engine, token)
}

/// Fill in `instance.parameter_group_family` unless it is already known.
///
/// Without a pinned version the control plane is asked for the engine's
/// default version; otherwise the family is derived locally.
pub async fn resolve_family<C: ControlPlane + ?Sized>(
    client: &C,
    instance: &mut InstanceRecord,
) -> Result<()> {
    if !instance.parameter_group_family.is_empty() {
        return Ok(());
    }

    let family = if instance.db_version.is_empty() {
        let engine = instance.engine.as_str();
        let versions = client
            .describe_default_engine_versions(engine)
            .await
            .map_err(|e| {
                BrokerError::control_plane("describing default engine version", engine, e)
            })?;
        let default = versions
            .into_iter()
            .next()
            .ok_or_else(|| BrokerError::NoDefaultEngineVersion {
                engine: engine.to_string(),
            })?;
        debug!(
            "default {} version is {} (family {})",
            engine, default.version, default.parameter_group_family
        );
        default.parameter_group_family
    } else {
        family_for_version(&instance.engine, &instance.db_version)
    };

    instance.parameter_group_family = family;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_plane::{ControlPlaneError, InMemoryControlPlane, Operation};

    #[test]
    fn test_family_for_version() {
        let cases = [
            (EngineType::Postgres, "12", "postgres12"),
            (EngineType::Postgres, "15.4", "postgres15.4"),
            (EngineType::Mysql, "8.0.35", "mysql8.0"),
            (EngineType::Mysql, "5.7", "mysql5.7"),
            (EngineType::Postgres, "latest", "postgres"),
        ];
        for (engine, version, expected) in cases {
            assert_eq!(family_for_version(&engine, version), expected, "{}", version);
        }
    }

    #[tokio::test]
    async fn test_pinned_version_needs_no_call() {
        let cp = InMemoryControlPlane::new();
        let mut instance = InstanceRecord {
            engine: EngineType::Postgres,
            db_version: "12".to_string(),
            ..Default::default()
        };
        resolve_family(&cp, &mut instance).await.unwrap();
        assert_eq!(instance.parameter_group_family, "postgres12");
        assert!(cp.calls().is_empty());
    }

    #[tokio::test]
    async fn test_default_version_is_queried() {
        let cp = InMemoryControlPlane::new();
        cp.add_default_engine_version("mysql", "8.0.35", "mysql8.0");
        let mut instance = InstanceRecord {
            engine: EngineType::Mysql,
            ..Default::default()
        };
        resolve_family(&cp, &mut instance).await.unwrap();
        assert_eq!(instance.parameter_group_family, "mysql8.0");
        assert_eq!(cp.call_count(Operation::DescribeDefaultEngineVersions), 1);
    }

    #[tokio::test]
    async fn test_resolution_is_memoized() {
        let cp = InMemoryControlPlane::new();
        let mut instance = InstanceRecord {
            engine: EngineType::Mysql,
            parameter_group_family: "mysql5.7".to_string(),
            ..Default::default()
        };
        resolve_family(&cp, &mut instance).await.unwrap();
        assert_eq!(instance.parameter_group_family, "mysql5.7");
        assert!(cp.calls().is_empty());
    }

    #[tokio::test]
    async fn test_default_version_failure_propagates() {
        let cp = InMemoryControlPlane::new();
        cp.fail(
            Operation::DescribeDefaultEngineVersions,
            ControlPlaneError::new("AccessDenied", "not allowed"),
        );
        let mut instance = InstanceRecord {
            engine: EngineType::Postgres,
            ..Default::default()
        };
        let err = resolve_family(&cp, &mut instance).await.unwrap_err();
        assert!(matches!(err, BrokerError::ControlPlane { .. }));
        assert!(instance.parameter_group_family.is_empty());
    }

    #[tokio::test]
    async fn test_missing_default_version() {
        let cp = InMemoryControlPlane::new();
        let mut instance = InstanceRecord {
            engine: EngineType::Postgres,
            ..Default::default()
        };
        let err = resolve_family(&cp, &mut instance).await.unwrap_err();
        assert!(matches!(err, BrokerError::NoDefaultEngineVersion { .. }));
    }
}
