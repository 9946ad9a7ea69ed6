use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use econfig_errors::{ConfigStoreError, ConfigStoreResult};

use crate::value::Value;

pub(super) fn encode(value: &Value) -> ConfigStoreResult<String> {
    let bytes = bincode::serialize(value)
        .map_err(|e| ConfigStoreError::codec_error(format!("serialize encode failed: {e}")))?;
    Ok(STANDARD.encode(bytes))
}

pub(super) fn decode(raw: &str) -> ConfigStoreResult<Value> {
    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|e| ConfigStoreError::codec_error(format!("serialize decode failed: {e}")))?;
    bincode::deserialize(&bytes)
        .map_err(|e| ConfigStoreError::codec_error(format!("serialize decode failed: {e}")))
}
