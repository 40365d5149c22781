pub mod error;
pub mod hash;
pub mod transaction;

pub use error::*;
pub use hash::*;
pub use transaction::*;
