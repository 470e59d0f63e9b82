//! Storage access grants and grant targets.

use crate::error::{ExchangeError, ValidationError};
use crate::ids::AccessGrantsLocationId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level requested for, or held by, a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Permission {
    Read,
    Write,
    Readwrite,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "READ",
            Permission::Write => "WRITE",
            Permission::Readwrite => "READWRITE",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READ" => Ok(Permission::Read),
            "WRITE" => Ok(Permission::Write),
            "READWRITE" => Ok(Permission::Readwrite),
            other => Err(ValidationError::InvalidPermission(other.to_string())),
        }
    }
}

/// A grant as returned to the caller. Upstream fields not listed here are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Grant {
    pub grantee_identifier: String,
    /// Kept verbatim; the storage-control service is authoritative.
    pub permission: String,
    pub access_grants_location_id: AccessGrantsLocationId,
    pub grant_scope: String,
}

/// Bucket and optional key prefix parsed from a `scheme://bucket/key` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantTarget {
    pub bucket: String,
    pub prefix: Option<String>,
}

impl GrantTarget {
    /// Parse a matched grant target.
    ///
    /// The trailing `*` of a grant scope is a matching wildcard, not part of
    /// the path: `s3://bucket/*` has no prefix and `s3://bucket/reports/*`
    /// has the prefix `reports/`. Any other key is kept as-is.
    pub fn parse(uri: &str) -> Result<Self, ExchangeError> {
        let invalid = || ExchangeError::InvalidTarget(uri.to_string());

        let (scheme, rest) = uri.split_once("://").ok_or_else(invalid)?;
        if scheme.is_empty() {
            return Err(invalid());
        }
        let (bucket, key) = rest.split_once('/').ok_or_else(invalid)?;
        if bucket.is_empty() {
            return Err(invalid());
        }

        let prefix = match key {
            "" | "*" => None,
            key if key.ends_with("/*") => Some(key[..key.len() - 1].to_string()),
            key => Some(key.to_string()),
        };

        Ok(Self {
            bucket: bucket.to_string(),
            prefix,
        })
    }
}
