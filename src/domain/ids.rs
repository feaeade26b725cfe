//! Identifier newtypes
//!
//! Accession uuids double as encounter uuids, so they get their own type to keep
//! them from being mixed up with concept or order uuids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// OpenELIS accession identifier
///
/// The lab encounter created for an accession carries the same uuid.
///
/// # Examples
///
/// ```
/// use bahmni_bridge::domain::ids::AccessionUuid;
/// use std::str::FromStr;
///
/// let uuid = AccessionUuid::from_str("12-34-56-78").unwrap();
/// assert_eq!(uuid.as_str(), "12-34-56-78");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessionUuid(String);

impl AccessionUuid {
    /// Creates a new AccessionUuid, rejecting blank values
    pub fn new(uuid: impl Into<String>) -> Result<Self, String> {
        let uuid = uuid.into();
        if uuid.trim().is_empty() {
            return Err("Accession uuid cannot be empty".to_string());
        }
        Ok(Self(uuid))
    }

    /// Returns the uuid as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AccessionUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccessionUuid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for AccessionUuid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Relative resource path carried by an atom feed event
///
/// Feed entries hold paths such as `/openelis/accession/12-34-56-78` that are
/// resolved against the OpenELIS base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Creates a new ResourcePath; the path must be non-blank and start with `/`
    pub fn new(path: impl Into<String>) -> Result<Self, String> {
        let path = path.into();
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err("Resource path cannot be empty".to_string());
        }
        if !trimmed.starts_with('/') {
            return Err(format!("Resource path must start with '/', got: {trimmed}"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, usually the resource uuid
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResourcePath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
