//! Input classification and query normalization.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ResolveError, Result};

/// Resolution strategy for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Postal,
    Street,
    FreeText,
}

impl FromStr for QueryKind {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "postal" => Ok(QueryKind::Postal),
            "street" => Ok(QueryKind::Street),
            "free_text" => Ok(QueryKind::FreeText),
            other => Err(ResolveError::InvalidInput(format!(
                "unrecognized query type '{}'",
                other
            ))),
        }
    }
}

/// A validated, normalized query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub kind: QueryKind,
}

/// Trim and collapse internal whitespace runs to a single space.
pub fn normalize_query(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Exactly six ASCII digits once all whitespace is removed.
pub fn is_postal_code(raw: &str) -> bool {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_digit())
}

/// Classify a query, honouring an explicitly declared kind.
///
/// Without a declaration, postal-shaped input is `Postal` and everything else
/// `FreeText`; street intent is never inferred from shape.
pub fn classify(raw: &str, declared: Option<QueryKind>) -> Result<Query> {
    let text = normalize_query(raw);
    if text.is_empty() {
        return Err(ResolveError::InvalidInput("query is empty".to_string()));
    }

    let kind = match declared {
        Some(QueryKind::Postal) => {
            if !is_postal_code(&text) {
                return Err(ResolveError::InvalidInput(format!(
                    "'{}' is not a six-digit postal code",
                    text
                )));
            }
            QueryKind::Postal
        }
        Some(kind) => kind,
        None if is_postal_code(&text) => QueryKind::Postal,
        None => QueryKind::FreeText,
    };

    // Postal codes are passed downstream without internal spaces
    let text = if kind == QueryKind::Postal {
        text.replace(' ', "")
    } else {
        text
    };

    Ok(Query { text, kind })
}
