//! Monitored destinations.

use std::fmt;

/// One monitored destination.
///
/// The name is the metrics label; the address is an IP literal or a
/// hostname resolved on every probe. Targets are built once from
/// configuration and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    name: String,
    address: String,
}

impl Target {
    /// Create a new target.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Metrics label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Address to probe.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}
