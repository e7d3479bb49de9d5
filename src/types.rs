//! Detection results handed to the downstream vulnerability matcher

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system identity of a layer
///
/// `name` is the specific distribution release (e.g. "bionic") and `family`
/// is the lineage used to pick compatible vulnerability feeds (e.g. "debian").
/// Only the `Default` value is empty; analyzers never return a half-filled one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Os {
    pub name: String,
    pub family: String,
}

impl Os {
    pub fn new(name: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            family: family.into(),
        }
    }

    /// True for the unset value
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.family.is_empty()
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.family)
    }
}

/// One installed package unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub release: String,
    /// Zero for formats without an epoch concept
    #[serde(default)]
    pub epoch: i32,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        release: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            release: release.into(),
            epoch: 0,
        }
    }

    pub fn with_epoch(mut self, epoch: i32) -> Self {
        self.epoch = epoch;
        self
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.name)?;
        if self.epoch != 0 {
            write!(f, "{}:", self.epoch)?;
        }
        write!(f, "{}", self.version)?;
        if !self.release.is_empty() {
            write!(f, "-{}", self.release)?;
        }
        Ok(())
    }
}
