//! Delegation Configuration

use delegate_dom::HostCapabilities;
use serde::{Deserialize, Serialize};

/// Delegation configuration options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Install the per-type document listeners as passive. Off by default so
    /// touch and pointer callbacks can still call `prevent_default`.
    pub passive_listeners: bool,

    /// Override the capabilities reported by the host
    pub capabilities: Option<HostCapabilities>,
}

impl Config {
    /// Capabilities to use for `host`, honouring the override
    pub fn resolve_capabilities(&self, host: HostCapabilities) -> HostCapabilities {
        self.capabilities.unwrap_or(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.passive_listeners);
        assert_eq!(config.resolve_capabilities(HostCapabilities::legacy()), HostCapabilities::legacy());
    }

    #[test]
    fn test_capability_override() {
        let config = Config {
            capabilities: Some(HostCapabilities::legacy()),
            ..Default::default()
        };
        assert_eq!(config.resolve_capabilities(HostCapabilities::default()), HostCapabilities::legacy());
    }
}
