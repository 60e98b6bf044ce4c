pub mod cleanup;
pub mod family;
pub mod modify;
pub mod parameter_group;
pub mod parameters;
pub mod reconcile;

pub use cleanup::*;
pub use family::*;
pub use modify::*;
pub use parameter_group::*;
pub use parameters::*;
pub use reconcile::*;
