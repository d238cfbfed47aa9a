use crate::config::PaginationConfig;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum U64Input {
    Number(u64),
    Text(String),
}

/// Accepts `limit=20` as well as `"limit": "20"`.
pub fn deserialize_optional_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<U64Input>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(U64Input::Number(number)) => Ok(Some(number)),
        Some(U64Input::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(U64Input::Text(text)) => text
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(DeError::custom),
    }
}

/// Requested page size, defaulted and capped by configuration.
pub fn resolve_limit(limit: Option<u64>, config: &PaginationConfig) -> usize {
    let max = config.max_limit.max(1);
    match limit {
        Some(0) | None => config.default_limit.clamp(1, max) as usize,
        Some(n) => n.min(max) as usize,
    }
}

/// Requested offset, capped at `i64::MAX` so it still binds as a SQLite integer.
pub fn resolve_offset(offset: Option<u64>) -> usize {
    let offset = offset.unwrap_or(0).min(i64::MAX as u64);
    usize::try_from(offset).unwrap_or(usize::MAX)
}
