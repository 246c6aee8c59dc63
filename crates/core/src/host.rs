//! Host classification: platform domain vs client (tenant) domain.
//!
//! The same build is served from the operator's platform domain and from every
//! salon's own domain. Which route tree is reachable is decided from the host
//! alone, so this check must never elevate ambiguous input to `Platform`.

use serde::{Deserialize, Serialize};

/// The browser-visible network host (`host[:port]`), kept verbatim.
///
/// Callers read it fresh for every classification; nothing here caches it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Host(String);

impl Host {
    pub fn new(host: impl Into<String>) -> Self {
        Self(host.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the host looks like a hostname (optionally with a port).
    ///
    /// Only ASCII letters, digits, `-`, `.`, `:` and IPv6 brackets are
    /// accepted; no empty labels.
    pub fn is_well_formed(&self) -> bool {
        is_well_formed(&self.0)
    }

    pub fn classify(&self, platform_domain: &str) -> DomainClass {
        classify(&self.0, platform_domain)
    }
}

impl core::fmt::Display for Host {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Host {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Domain class of a host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainClass {
    /// The operator's tenant-management application.
    Platform,
    /// A salon's own domain (tenant-scoped).
    Client,
}

impl DomainClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainClass::Platform => "platform",
            DomainClass::Client => "client",
        }
    }

    pub fn is_platform(&self) -> bool {
        matches!(self, DomainClass::Platform)
    }
}

impl core::fmt::Display for DomainClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `host` against the configured platform domain.
///
/// `Platform` iff `host == platform_domain` or `host` ends with
/// `"." + platform_domain`. Empty or malformed input on either side is
/// `Client`.
pub fn classify(host: &str, platform_domain: &str) -> DomainClass {
    if !is_well_formed(host) || !is_well_formed(platform_domain) {
        return DomainClass::Client;
    }

    if host == platform_domain {
        return DomainClass::Platform;
    }

    match host.strip_suffix(platform_domain) {
        Some(prefix) if prefix.len() > 1 && prefix.ends_with('.') => DomainClass::Platform,
        _ => DomainClass::Client,
    }
}

fn is_well_formed(host: &str) -> bool {
    if host.is_empty() {
        return false;
    }

    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | ':' | '[' | ']');
    if !host.chars().all(allowed) {
        return false;
    }

    // Port (or IPv6 literal) aside, every dot-separated label must be non-empty.
    let name = match host.rsplit_once(':') {
        Some((name, _port)) if !host.starts_with('[') => name,
        _ => host,
    };
    !name.is_empty() && name.split('.').all(|label| !label.is_empty())
}
