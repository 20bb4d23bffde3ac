//! Versioned cache namespaces
//!
//! Names follow `{prefix}-{pool}-v{version}`, e.g. `xenon-static-v1.0.0`, or
//! `{pool}-v{version}` when the prefix is empty. The version is an opaque tag;
//! only the two namespaces of the running version survive activation.

use crate::error::{OffcacheError, OffcacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;
/// Which pool a namespace holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    /// Assets pinned at install time, plus runtime fetches of static file types
    Static,
    /// Everything else cached opportunistically at runtime
    Dynamic,
}

impl Pool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check a cache version tag: non-empty, made of ASCII letters, digits and
/// `. - _ +`, not starting with `.`
pub fn check_version(version: &str) -> Result<(), String> {
    if version.is_empty() {
        return Err("version is empty".to_string());
    }
    check_chars(version)
}

/// Check a namespace prefix; same alphabet as versions, may be empty
pub fn check_prefix(prefix: &str) -> Result<(), String> {
    if prefix.is_empty() {
        return Ok(());
    }
    check_chars(prefix)
}

fn check_chars(value: &str) -> Result<(), String> {
    if value.starts_with('.') {
        return Err(format!("'{}' starts with '.'", value));
    }
    match value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+')))
    {
        Some(c) => Err(format!("'{}' contains '{}'", value, c)),
        None => Ok(()),
    }
}

/// A parsed namespace name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNamespace {
    pub prefix: String,
    pub pool: Pool,
    pub version: String,
}

impl CacheNamespace {
    pub fn new(prefix: impl Into<String>, pool: Pool, version: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            pool,
            version: version.into(),
        }
    }

    /// Storage identifier of this namespace
    pub fn name(&self) -> String {
        if self.prefix.is_empty() {
            format!("{}-v{}", self.pool, self.version)
        } else {
            format!("{}-{}-v{}", self.prefix, self.pool, self.version)
        }
    }

    /// Parse a storage identifier. Returns `None` for names not written by us.
    pub fn parse(name: &str) -> Option<Self> {
        for pool in [Pool::Static, Pool::Dynamic] {
            let bare = format!("{}-v", pool);
            if let Some(version) = name.strip_prefix(&bare) {
                return check_version(version)
                    .ok()
                    .map(|_| Self::new("", pool, version));
            }

            let marker = format!("-{}", bare);
            if let Some(pos) = name.find(&marker) {
                let prefix = &name[..pos];
                let version = &name[pos + marker.len()..];
                if prefix.is_empty() || check_prefix(prefix).is_err() || check_version(version).is_err() {
                    return None;
                }
                return Some(Self::new(prefix, pool, version));
            }
        }
        None
    }
}

impl fmt::Display for CacheNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// The STATIC and DYNAMIC namespace names of one cache version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceSet {
    static_name: String,
    dynamic_name: String,
    version: String,
}

impl NamespaceSet {
    pub fn new(prefix: &str, version: &str) -> OffcacheResult<Self> {
        check_prefix(prefix)
            .map_err(|e| OffcacheError::User(format!("Invalid cache prefix: {}", e)))?;
        check_version(version)
            .map_err(|e| OffcacheError::User(format!("Invalid cache version: {}", e)))?;
        Ok(Self {
            static_name: CacheNamespace::new(prefix, Pool::Static, version).name(),
            dynamic_name: CacheNamespace::new(prefix, Pool::Dynamic, version).name(),
            version: version.to_string(),
        })
    }

    pub fn name(&self, pool: Pool) -> &str {
        match pool {
            Pool::Static => &self.static_name,
            Pool::Dynamic => &self.dynamic_name,
        }
    }

    pub fn static_name(&self) -> &str {
        &self.static_name
    }

    pub fn dynamic_name(&self) -> &str {
        &self.dynamic_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether `name` is one of the two current namespaces
    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_name || name == self.dynamic_name
    }
}
