use serde::{Deserialize, Serialize};
use std::fmt;

/// Database engine of a managed instance.
///
/// Engines the broker has no parameter rules for are kept verbatim in
/// `Other` so the record round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EngineType {
    Mysql,
    Postgres,
    Other(String),
}

impl EngineType {
    pub fn as_str(&self) -> &str {
        match self {
            EngineType::Mysql => "mysql",
            EngineType::Postgres => "postgres",
            EngineType::Other(name) => name,
        }
    }

    pub fn is_oracle(&self) -> bool {
        matches!(self.as_str(), "oracle-se1" | "oracle-se2")
    }
}

impl Default for EngineType {
    fn default() -> Self {
        EngineType::Other(String::new())
    }
}

impl From<String> for EngineType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "mysql" => EngineType::Mysql,
            "postgres" => EngineType::Postgres,
            _ => EngineType::Other(value),
        }
    }
}

impl From<&str> for EngineType {
    fn from(value: &str) -> Self {
        EngineType::from(value.to_string())
    }
}

impl From<EngineType> for String {
    fn from(value: EngineType) -> Self {
        match value {
            EngineType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted desired configuration of one managed database instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceRecord {
    pub database: String,
    #[serde(rename = "db_type")]
    pub engine: EngineType,
    /// Empty means the engine's default version.
    pub db_version: String,
    /// GiB, never decreases.
    pub allocated_storage: u32,
    pub backup_retention_period: u32,
    /// MySQL only.
    pub binary_log_format: String,
    /// MySQL only.
    pub enable_functions: bool,
    /// Postgres only.
    pub enable_pg_cron: bool,
    /// Memoized once resolved; see `logic::family`.
    pub parameter_group_family: String,
}

impl InstanceRecord {
    /// A fresh record with a newly allocated database name.
    pub fn new(engine: impl Into<EngineType>, allocated_storage: u32) -> Self {
        Self {
            database: generate_database_name(),
            engine: engine.into(),
            allocated_storage,
            ..Default::default()
        }
    }

    /// Deterministic name derived from the database name. Create and later
    /// modify calls rely on this to find the same parameter group.
    pub fn format_db_name(&self) -> String {
        if self.engine.is_oracle() {
            return "ORCL".to_string();
        }
        self.database
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .collect()
    }
}

/// `db` followed by 15 lowercase alphanumerics.
pub fn generate_database_name() -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(15)
        .collect();
    format!("db{}", suffix)
}
