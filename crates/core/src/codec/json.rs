use econfig_errors::{ConfigStoreError, ConfigStoreResult};

use crate::value::Value;

pub(super) fn encode(value: &Value) -> ConfigStoreResult<String> {
    let json = serde_json::Value::try_from(value)
        .map_err(|e| ConfigStoreError::codec_error(format!("json encode failed: {e}")))?;
    Ok(serde_json::to_string(&json)?)
}

pub(super) fn decode(raw: &str) -> ConfigStoreResult<Value> {
    let json: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| ConfigStoreError::codec_error(format!("json decode failed: {e}")))?;
    Ok(Value::from(json))
}
