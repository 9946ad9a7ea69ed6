//! # EConfig Core
//!
//! Key-value configuration backed by a relational table, with an optional
//! cache holding the whole snapshot.
//!
//! - [`value`]: decoded configuration values
//! - [`codec`]: the `serialize` and `json` codings
//! - [`merge`]: recursive override merge applied on writes of map values
//! - [`traits`]: store and cache backend capabilities
//! - [`manager`]: the snapshot-owning [`ConfigManager`]
//! - [`settings`]: wiring parameters loaded from file and environment
//!
//! ```ignore
//! let manager = ConfigManager::builder()
//!     .store(store)
//!     .cache(cache)
//!     .coding("json")
//!     .build()
//!     .await?;
//!
//! manager.set("retries", 3).await?;
//! assert_eq!(manager.get_or("retries", 0).await?, Value::Int(3));
//! ```

pub mod codec;
pub mod manager;
pub mod merge;
pub mod settings;
pub mod traits;
pub mod value;

pub use codec::Coding;
pub use econfig_errors::{ConfigStoreError, ConfigStoreResult};
pub use manager::{ConfigManager, ConfigManagerBuilder, Snapshot};
pub use settings::ConfigStoreSettings;
pub use traits::*;
pub use value::{MapKey, Value};
