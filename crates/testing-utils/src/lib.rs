//! # EConfig Testing Utils
//!
//! Shared testing utilities for the econfig workspace.
//!
//! - **Mock Backends**: recording in-memory implementations of `ConfigStore`
//!   and `CacheBackend`, with failure injection
//! - **Test Containers**: PostgreSQL and Redis containers for integration tests
//! - **Helpers**: one-call construction of a manager over the mocks
//!
//! ```toml
//! [dev-dependencies]
//! econfig-testing-utils = { path = "../testing-utils" }
//! ```

pub mod containers;
pub mod helpers;
pub mod mocks;

pub use containers::*;
pub use helpers::*;
pub use mocks::*;
