use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_park_code;
use serde_json::Value;

/// Read park codes out of a parks listing: a JSON array of objects with a
/// `parkCode` field. Codes are upper-cased. Entries without a code, or with
/// one that is not a plain alphabetic unit code, are skipped.
pub fn load_park_codes(data: &[u8]) -> Result<Vec<String>> {
    let parks: Value = serde_json::from_slice(data)?;
    let Value::Array(entries) = parks else {
        return Err(EtlError::ValidationError {
            message: "parks file must contain a JSON array".to_string(),
        });
    };

    let mut codes = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let code = match entry.get("parkCode").and_then(Value::as_str) {
            Some(code) if !code.trim().is_empty() => code.trim(),
            _ => {
                tracing::debug!("Skipping parks entry {} without a parkCode", i);
                continue;
            }
        };
        if let Err(e) = validate_park_code("parkCode", code) {
            tracing::warn!("Skipping parks entry {}: {}", i, e);
            continue;
        }
        codes.push(code.to_uppercase());
    }
    Ok(codes)
}
