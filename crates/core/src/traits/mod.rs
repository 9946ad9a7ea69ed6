pub mod cache;
pub mod store;

pub use cache::*;
pub use store::*;
