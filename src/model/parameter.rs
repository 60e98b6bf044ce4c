use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameter name -> value for one engine.
pub type ParameterMap = BTreeMap<String, String>;

/// Engine type -> parameters that must deviate from the engine default.
/// Recomputed on every pass and never persisted.
pub type ParameterSet = BTreeMap<String, ParameterMap>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyMethod {
    Immediate,
    PendingReboot,
}

impl ApplyMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyMethod::Immediate => "immediate",
            ApplyMethod::PendingReboot => "pending-reboot",
        }
    }
}

/// One parameter write sent to a parameter group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    pub apply_method: ApplyMethod,
}

impl Parameter {
    pub fn immediate(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            apply_method: ApplyMethod::Immediate,
        }
    }
}

/// An entry of the engine-default parameter catalog. Some defaults carry no
/// value at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineParameter {
    pub name: String,
    pub value: Option<String>,
}

impl EngineParameter {
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.map(str::to_string),
        }
    }
}

/// Immediate-apply writes for `map`, in name order.
pub fn immediate_parameters(map: &ParameterMap) -> Vec<Parameter> {
    map.iter()
        .map(|(name, value)| Parameter::immediate(name.as_str(), value.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_method_wire_names() {
        for method in [ApplyMethod::Immediate, ApplyMethod::PendingReboot] {
            let json = serde_json::to_value(method).unwrap();
            assert_eq!(json, method.as_str());
            let back: ApplyMethod = serde_json::from_value(json).unwrap();
            assert_eq!(back, method);
        }
    }

    #[test]
    fn test_immediate_parameters_are_sorted_by_name() {
        let map = ParameterMap::from([
            ("log_bin_trust_function_creators".to_string(), "0".to_string()),
            ("binlog_format".to_string(), "ROW".to_string()),
        ]);
        let params = immediate_parameters(&map);
        assert_eq!(params[0].name, "binlog_format");
        assert_eq!(params[1].name, "log_bin_trust_function_creators");
        assert!(params.iter().all(|p| p.apply_method == ApplyMethod::Immediate));
    }
}
