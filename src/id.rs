//! External identifier - stable, globally unique identity for records
//!
//! Format: lowercase hyphenated UUID, always 36 characters.
//!
//! Example: `6f1c2a8e-3b7d-4e0a-9c51-2d8f4b6a7e90`
//!
//! The external id is independent of the storage-assigned surrogate key and
//! never changes once a record has been created.

use crate::{Error, Result};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of the textual form of an external id
pub const EXTERNAL_ID_LEN: usize = 36;

/// Stable string identity assigned at record creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternalId(String);

impl ExternalId {
    /// Generate a fresh random (v4) external id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Parse an external id, normalizing it to lowercase hyphenated form
    pub fn parse(s: &str) -> Result<Self> {
        let uuid = Uuid::parse_str(s)
            .map_err(|e| Error::InvalidExternalId(format!("{}: {}", s, e)))?;
        Ok(Self(uuid.hyphenated().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ExternalId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for ExternalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToSql for ExternalId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for ExternalId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        ExternalId::parse(text).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl Serialize for ExternalId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ExternalId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ExternalId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let id = ExternalId::generate();
        assert_eq!(id.as_str().len(), EXTERNAL_ID_LEN);
        assert_eq!(id.as_str().matches('-').count(), 4);
    }

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(ExternalId::generate(), ExternalId::generate());
    }

    #[test]
    fn test_parse_normalizes() {
        let id = ExternalId::parse("6F1C2A8E-3B7D-4E0A-9C51-2D8F4B6A7E90").unwrap();
        assert_eq!(id.as_str(), "6f1c2a8e-3b7d-4e0a-9c51-2d8f4b6a7e90");

        let simple = ExternalId::parse("6f1c2a8e3b7d4e0a9c512d8f4b6a7e90").unwrap();
        assert_eq!(simple, id);
    }

    #[test]
    fn test_invalid_id() {
        assert!(ExternalId::parse("").is_err());
        assert!(ExternalId::parse("not-a-uuid").is_err());
        assert!(matches!(
            "1234".parse::<ExternalId>(),
            Err(Error::InvalidExternalId(_))
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let id = ExternalId::parse("6f1c2a8e-3b7d-4e0a-9c51-2d8f4b6a7e90").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"6f1c2a8e-3b7d-4e0a-9c51-2d8f4b6a7e90\"");
        let back: ExternalId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
