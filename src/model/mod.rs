pub mod instance;
pub mod options;
pub mod parameter;

pub use instance::*;
pub use options::*;
pub use parameter::*;
