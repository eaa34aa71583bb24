//! Lenient serde helpers for query model fields.
//!
//! Query models are assembled by UI code that is loose about types: a search
//! value may arrive as a number, an unused list as `null`.

use serde::{Deserialize, Deserializer};

use crate::value::Value;

/// Reads any scalar as text. `null` reads as the empty string.
pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Value::deserialize(deserializer)?.to_text())
}

/// Reads `null` as the type's default.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
