use crate::control_plane::ControlPlaneError;

pub type Result<T, E = BrokerError> = std::result::Result<T, E>;

/// Errors surfaced by the reconciliation core.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// The control plane refuses to shrink allocated storage.
    #[error("storage cannot be decreased: requested {requested} GiB, currently {current} GiB")]
    StorageDecrease { requested: u32, current: u32 },

    #[error("error {operation} for {resource}: {source}")]
    ControlPlane {
        operation: &'static str,
        resource: String,
        #[source]
        source: ControlPlaneError,
    },

    #[error("no default engine version reported for engine {engine}")]
    NoDefaultEngineVersion { engine: String },

    #[error("gave up {operation} for {resource} after {pages} pages without a final marker")]
    PaginationLimit {
        operation: &'static str,
        resource: String,
        pages: usize,
    },
}

impl BrokerError {
    pub fn control_plane(
        operation: &'static str,
        resource: impl Into<String>,
        source: ControlPlaneError,
    ) -> Self {
        Self::ControlPlane {
            operation,
            resource: resource.into(),
            source,
        }
    }

    /// True for errors detected locally, before any control-plane call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::StorageDecrease { .. })
    }
}
