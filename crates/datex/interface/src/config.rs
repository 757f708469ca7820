//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Order in which class and prototype bindings are scanned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOrder {
    /// First registered, first checked.
    #[default]
    RegistrationOrder,
    /// Last registered, first checked.
    MostRecentFirst,
}

/// Registry configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Scan order for value and class type derivation.
    pub scan_order: ScanOrder,
    /// Log when a class or prototype is rebound to another type.
    pub warn_on_rebind: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            scan_order: ScanOrder::RegistrationOrder,
            warn_on_rebind: true,
        }
    }
}
