//! Schema versions and version ranges.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of a trait schema.
pub type SchemaVersion = u16;

/// An inclusive range of schema versions a party understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRange {
    min: SchemaVersion,
    max: SchemaVersion,
}

impl VersionRange {
    /// Creates a range, rejecting `min > max`.
    pub fn new(min: SchemaVersion, max: SchemaVersion) -> Result<Self, Error> {
        if min > max {
            return Err(Error::InvalidVersionRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// A range containing exactly one version.
    #[must_use]
    pub const fn single(version: SchemaVersion) -> Self {
        Self {
            min: version,
            max: version,
        }
    }

    #[must_use]
    pub const fn min(&self) -> SchemaVersion {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> SchemaVersion {
        self.max
    }

    /// Whether `version` falls inside the range.
    #[must_use]
    pub const fn contains(&self, version: SchemaVersion) -> bool {
        version >= self.min && version <= self.max
    }

    /// The versions both ranges understand, if any.
    #[must_use]
    pub fn intersect(&self, other: &VersionRange) -> Option<VersionRange> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then_some(VersionRange { min, max })
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::single(1)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "v{}", self.min)
        } else {
            write!(f, "v{}..=v{}", self.min, self.max)
        }
    }
}
