use crate::control_plane::traits::{
    ControlPlane, ControlPlaneError, EngineVersion, Page, GROUP_ALREADY_EXISTS_CODE,
    GROUP_IN_USE_CODE, GROUP_NOT_FOUND_CODE,
};
use crate::model::{EngineParameter, Parameter, ParameterMap};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Control-plane calls recorded by [`InMemoryControlPlane`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    DescribeGroupParameters,
    CreateGroup,
    ModifyGroupParameters,
    DescribeDefaultEngineVersions,
    DescribeEngineDefaultParameters,
    ListGroups,
    DeleteGroup,
}

/// Stored state of one parameter group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub family: String,
    pub description: String,
    pub parameters: ParameterMap,
}

#[derive(Debug, Default)]
struct State {
    groups: BTreeMap<String, GroupEntry>,
    in_use: HashSet<String>,
    default_versions: HashMap<String, EngineVersion>,
    engine_defaults: HashMap<String, Vec<EngineParameter>>,
    failures: HashMap<Operation, ControlPlaneError>,
    endless_markers: bool,
    calls: Vec<(Operation, String)>,
}

/// Control plane kept entirely in memory.
///
/// Listings are paginated with `page_size` entries per page, using the offset
/// of the next entry as the marker.
#[derive(Debug)]
pub struct InMemoryControlPlane {
    state: Mutex<State>,
    page_size: usize,
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self::with_page_size(20)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: page_size.max(1),
        }
    }

    pub fn add_default_engine_version(&self, engine: &str, version: &str, family: &str) {
        self.state.lock().default_versions.insert(
            engine.to_string(),
            EngineVersion {
                engine: engine.to_string(),
                version: version.to_string(),
                parameter_group_family: family.to_string(),
            },
        );
    }

    pub fn set_engine_defaults(&self, family: &str, parameters: Vec<EngineParameter>) {
        self.state
            .lock()
            .engine_defaults
            .insert(family.to_string(), parameters);
    }

    pub fn insert_group(&self, name: &str, family: &str) {
        self.state.lock().groups.insert(
            name.to_string(),
            GroupEntry {
                family: family.to_string(),
                description: String::new(),
                parameters: ParameterMap::new(),
            },
        );
    }

    /// Attach a group to a (pretend) live instance so deletes are refused.
    pub fn mark_in_use(&self, name: &str) {
        self.state.lock().in_use.insert(name.to_string());
    }

    /// Make every subsequent call of `operation` fail with `error`.
    pub fn fail(&self, operation: Operation, error: ControlPlaneError) {
        self.state.lock().failures.insert(operation, error);
    }

    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Keep returning a continuation marker even past the last entry.
    pub fn set_endless_markers(&self, endless: bool) {
        self.state.lock().endless_markers = endless;
    }

    pub fn group(&self, name: &str) -> Option<GroupEntry> {
        self.state.lock().groups.get(name).cloned()
    }

    pub fn group_names(&self) -> Vec<String> {
        self.state.lock().groups.keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<(Operation, String)> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|(op, _)| *op == operation)
            .count()
    }

    fn begin(
        &self,
        state: &mut State,
        operation: Operation,
        target: &str,
    ) -> Result<(), ControlPlaneError> {
        state.calls.push((operation, target.to_string()));
        match state.failures.get(&operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn paginate<T: Clone>(
        &self,
        items: &[T],
        marker: Option<&str>,
        endless: bool,
    ) -> Result<Page<T>, ControlPlaneError> {
        let start = match marker {
            None | Some("") => 0,
            Some(m) => m.parse::<usize>().map_err(|_| {
                ControlPlaneError::new("InvalidParameterValue", format!("bad marker {}", m))
            })?,
        };
        let start = start.min(items.len());
        let end = (start + self.page_size).min(items.len());
        let page_items = items[start..end].to_vec();
        if end < items.len() || endless {
            Ok(Page::with_marker(page_items, end.to_string()))
        } else {
            Ok(Page::last(page_items))
        }
    }
}

impl Default for InMemoryControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(group_name: &str) -> ControlPlaneError {
    ControlPlaneError::new(
        GROUP_NOT_FOUND_CODE,
        format!("parameter group {} not found", group_name),
    )
}

#[async_trait::async_trait]
impl ControlPlane for InMemoryControlPlane {
    async fn describe_group_parameters(&self, group_name: &str) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock();
        self.begin(&mut state, Operation::DescribeGroupParameters, group_name)?;
        if state.groups.contains_key(group_name) {
            Ok(())
        } else {
            Err(not_found(group_name))
        }
    }

    async fn create_group(
        &self,
        group_name: &str,
        family: &str,
        description: &str,
    ) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock();
        self.begin(&mut state, Operation::CreateGroup, group_name)?;
        if state.groups.contains_key(group_name) {
            return Err(ControlPlaneError::new(
                GROUP_ALREADY_EXISTS_CODE,
                format!("parameter group {} already exists", group_name),
            ));
        }
        state.groups.insert(
            group_name.to_string(),
            GroupEntry {
                family: family.to_string(),
                description: description.to_string(),
                parameters: ParameterMap::new(),
            },
        );
        Ok(())
    }

    async fn modify_group_parameters(
        &self,
        group_name: &str,
        parameters: &[Parameter],
    ) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock();
        self.begin(&mut state, Operation::ModifyGroupParameters, group_name)?;
        let group = state
            .groups
            .get_mut(group_name)
            .ok_or_else(|| not_found(group_name))?;
        for parameter in parameters {
            group
                .parameters
                .insert(parameter.name.clone(), parameter.value.clone());
        }
        Ok(())
    }

    async fn describe_default_engine_versions(
        &self,
        engine: &str,
    ) -> Result<Vec<EngineVersion>, ControlPlaneError> {
        let mut state = self.state.lock();
        self.begin(&mut state, Operation::DescribeDefaultEngineVersions, engine)?;
        Ok(state.default_versions.get(engine).cloned().into_iter().collect())
    }

    async fn describe_engine_default_parameters(
        &self,
        family: &str,
        marker: Option<&str>,
    ) -> Result<Page<EngineParameter>, ControlPlaneError> {
        let mut state = self.state.lock();
        self.begin(&mut state, Operation::DescribeEngineDefaultParameters, family)?;
        let defaults = state.engine_defaults.get(family).cloned().unwrap_or_default();
        self.paginate(&defaults, marker, state.endless_markers)
    }

    async fn list_groups(&self, marker: Option<&str>) -> Result<Page<String>, ControlPlaneError> {
        let mut state = self.state.lock();
        self.begin(&mut state, Operation::ListGroups, marker.unwrap_or_default())?;
        let names: Vec<String> = state.groups.keys().cloned().collect();
        self.paginate(&names, marker, state.endless_markers)
    }

    async fn delete_group(&self, group_name: &str) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock();
        self.begin(&mut state, Operation::DeleteGroup, group_name)?;
        if !state.groups.contains_key(group_name) {
            return Err(not_found(group_name));
        }
        if state.in_use.contains(group_name) {
            return Err(ControlPlaneError::new(
                GROUP_IN_USE_CODE,
                format!("parameter group {} is in use", group_name),
            ));
        }
        state.groups.remove(group_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_group_lifecycle() {
        let cp = InMemoryControlPlane::new();
        assert!(cp.describe_group_parameters("g1").await.is_err());

        cp.create_group("g1", "mysql8.0", "test").await.unwrap();
        assert!(cp.describe_group_parameters("g1").await.is_ok());
        assert_eq!(
            cp.create_group("g1", "mysql8.0", "test").await.unwrap_err().code,
            GROUP_ALREADY_EXISTS_CODE
        );

        cp.modify_group_parameters("g1", &[Parameter::immediate("binlog_format", "ROW")])
            .await
            .unwrap();
        assert_eq!(cp.group("g1").unwrap().parameters["binlog_format"], "ROW");

        cp.mark_in_use("g1");
        assert!(cp.delete_group("g1").await.unwrap_err().is_group_in_use());
    }

    #[tokio::test]
    async fn test_list_groups_paginates() {
        let cp = InMemoryControlPlane::with_page_size(2);
        for name in ["a", "b", "c"] {
            cp.insert_group(name, "postgres15");
        }
        let first = cp.list_groups(None).await.unwrap();
        assert_eq!(first.items, vec!["a", "b"]);
        assert_eq!(first.marker.as_deref(), Some("2"));

        let second = cp.list_groups(first.marker.as_deref()).await.unwrap();
        assert_eq!(second.items, vec!["c"]);
        assert_eq!(second.marker, None);
    }

    #[tokio::test]
    async fn test_injected_failure_is_recorded() {
        let cp = InMemoryControlPlane::new();
        cp.fail(
            Operation::ListGroups,
            ControlPlaneError::new("Throttling", "slow down"),
        );
        assert_eq!(cp.list_groups(None).await.unwrap_err().code, "Throttling");
        assert_eq!(cp.call_count(Operation::ListGroups), 1);

        cp.clear_failures();
        assert!(cp.list_groups(None).await.is_ok());
        assert_eq!(cp.call_count(Operation::ListGroups), 2);
    }
}
