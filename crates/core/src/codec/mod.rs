//! Value codings
//!
//! A [`Coding`] turns a [`Value`] into the text stored in the `value` column
//! and back. The set of codings is closed: `serialize` and `json`.

mod json;
mod serialize;

use std::fmt;
use std::str::FromStr;

use econfig_errors::{ConfigStoreError, ConfigStoreResult};
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Coding strategy applied to every stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coding {
    /// Structure-preserving binary serialization, base64 text on the wire
    #[default]
    Serialize,
    /// JSON text
    Json,
}

impl Coding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Coding::Serialize => "serialize",
            Coding::Json => "json",
        }
    }

    pub fn encode(&self, value: &Value) -> ConfigStoreResult<String> {
        match self {
            Coding::Serialize => serialize::encode(value),
            Coding::Json => json::encode(value),
        }
    }

    pub fn decode(&self, raw: &str) -> ConfigStoreResult<Value> {
        match self {
            Coding::Serialize => serialize::decode(raw),
            Coding::Json => json::decode(raw),
        }
    }
}

impl FromStr for Coding {
    type Err = ConfigStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serialize" => Ok(Coding::Serialize),
            "json" => Ok(Coding::Json),
            other => Err(ConfigStoreError::config_error(format!(
                "coding \"{other}\" is invalid, expected \"serialize\" or \"json\""
            ))),
        }
    }
}

impl fmt::Display for Coding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
