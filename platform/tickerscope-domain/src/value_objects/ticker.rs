use serde::{Deserialize, Serialize};
use std::fmt;

/// Uppercase, trimmed ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(value: &str) -> Result<Self, String> {
        let normalized = value.trim().to_uppercase();
        if normalized.is_empty() {
            return Err("empty ticker".to_string());
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(format!("invalid ticker (contains whitespace): {value}"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}
