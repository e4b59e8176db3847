// ============================================================================
// spark-query-sync - Options
// Per-binding options, loadable from a host configuration document
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::constants::CONFIG_KEY;
use super::types::NavigationMode;

/// Options shared by every binding.
///
/// Hosts that keep a JSON configuration document store these under the
/// `querySync` section:
///
/// ```
/// use spark_query_sync::{NavigationMode, SyncOptions};
///
/// let doc = serde_json::json!({ "querySync": { "navigation": "replace" } });
/// let options = SyncOptions::from_config(&doc);
/// assert_eq!(options.navigation, NavigationMode::Replace);
/// assert!(options.hydrate);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncOptions {
    /// History behaviour of every navigation the binding requests
    pub navigation: NavigationMode,

    /// Apply existing query parameters to the value when binding
    pub hydrate: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            navigation: NavigationMode::Push,
            hydrate: true,
        }
    }
}

impl SyncOptions {
    /// Read options from the `querySync` section of a configuration document.
    ///
    /// A missing or malformed section yields the defaults; a malformed one is
    /// logged.
    pub fn from_config(doc: &Value) -> Self {
        let Some(section) = doc.get(CONFIG_KEY) else {
            return Self::default();
        };
        match Self::deserialize(section) {
            Ok(options) => options,
            Err(err) => {
                tracing::warn!(section = CONFIG_KEY, error = %err, "invalid options, using defaults");
                Self::default()
            }
        }
    }

    /// Builder: set the navigation mode
    pub fn with_navigation(mut self, navigation: NavigationMode) -> Self {
        self.navigation = navigation;
        self
    }

    /// Builder: enable or disable hydration from the current query
    pub fn with_hydrate(mut self, hydrate: bool) -> Self {
        self.hydrate = hydrate;
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================
