pub mod memory;
pub mod pagination;
pub mod traits;

pub use memory::*;
pub use pagination::*;
pub use traits::*;
