use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use super::weights::WeightConfig;

/// Shared reference to the active configuration snapshot.
///
/// Readers take a whole `Arc<WeightConfig>` and keep it for the duration of a request;
/// publishing swaps the pointer, so no reader ever observes a partially updated snapshot.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    current: Arc<ArcSwap<WeightConfig>>,
}

impl ConfigHandle {
    pub fn new(config: WeightConfig) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    pub fn snapshot(&self) -> Arc<WeightConfig> {
        self.current.load_full()
    }

    /// Replaces the active snapshot and returns the one it superseded.
    pub fn publish(&self, config: WeightConfig) -> Arc<WeightConfig> {
        let version = config.identity.version.clone();
        let previous = self.current.swap(Arc::new(config));
        info!(
            previous = %previous.identity.version,
            current = %version,
            "published weight configuration snapshot"
        );
        previous
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new(WeightConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_keep_their_snapshot_across_publish() {
        let handle = ConfigHandle::default();
        let before = handle.snapshot();

        let next = WeightConfig::from_json_str(r#"{ "version": "2.0.0" }"#).expect("valid");
        let superseded = handle.publish(next);

        assert_eq!(before.version(), superseded.version());
        assert_eq!(before.version(), "1.0.0");
        assert_eq!(handle.snapshot().version(), "2.0.0");
    }

    #[test]
    fn clones_share_the_same_slot() {
        let handle = ConfigHandle::default();
        let reader = handle.clone();
        handle.publish(WeightConfig::from_json_str(r#"{ "version": "3.1.4" }"#).expect("valid"));
        assert_eq!(reader.snapshot().version(), "3.1.4");
    }
}
