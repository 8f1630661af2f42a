use std::str::FromStr;

use serde::Deserialize;

use crate::errors::BackendError;

// limits are kept as text so a bad value reaches the handler and gets the
// same error body as every other failure

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<String>,
}

/// Parses an optional `limit` parameter, falling back to `default` when it
/// is absent.
pub fn parse_limit<T: FromStr>(limit: Option<&str>, default: T) -> Result<T, BackendError> {
    match limit {
        None => Ok(default),
        Some(text) => text
            .trim()
            .parse()
            .map_err(|_| BackendError::InvalidLimit(text.to_owned())),
    }
}
