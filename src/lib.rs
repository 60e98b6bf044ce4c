//! Reconciliation core of a managed-database service broker.
//!
//! Merges update requests into persisted instance records and keeps each
//! instance's custom parameter group in line with the parameters it needs.
//! Orphaned groups are removed by a separate cleanup sweep.

pub mod config;
pub mod control_plane;
pub mod error;
pub mod logic;
pub mod model;

pub use config::Settings;
pub use control_plane::{ControlPlane, ControlPlaneError, InMemoryControlPlane};
pub use error::{BrokerError, Result};
pub use logic::{
    derive_parameters, modify, needs_custom_parameters, resolve_family, sweep_orphaned_groups,
    CreateInstanceRequest, ModifyInstanceRequest, ParameterGroupManager, Reconciler, SweepReport,
};
pub use model::*;
