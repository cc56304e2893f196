use std::sync::Arc;

use kiosk_core::config::BackendConfig;
use kiosk_display::Surface;
use tracing::{debug, warn};

use crate::backend::Backend;

/// Writes the backend's network status line into the network badge.
pub struct NetworkProbe {
    backend: Arc<dyn Backend>,
    surface: Arc<dyn Surface>,
    element: String,
    prefix: String,
    offline_badge: String,
}

impl NetworkProbe {
    pub fn new(
        backend: Arc<dyn Backend>,
        surface: Arc<dyn Surface>,
        element: &str,
        config: &BackendConfig,
    ) -> Self {
        Self {
            backend,
            surface,
            element: element.to_string(),
            prefix: config.status_prefix.clone(),
            offline_badge: config.offline_badge.clone(),
        }
    }

    /// Returns whether the status script answered.
    pub async fn probe(&self) -> bool {
        let (badge, online) = match self.backend.network_status().await {
            Ok(raw) => (badge_text(&raw, &self.prefix).to_string(), true),
            Err(e) => {
                warn!(backend = self.backend.name(), "network status unavailable: {e}");
                (self.offline_badge.clone(), false)
            }
        };
        debug!(%badge, online, "network badge");
        if let Err(e) = self.surface.set_text(&self.element, &badge) {
            warn!(element = %self.element, "network badge not updated: {e}");
        }
        online
    }
}

/// `"networkStatus &#11014; UP\n"` → `"&#11014; UP"`.
pub fn badge_text<'a>(raw: &'a str, prefix: &str) -> &'a str {
    let raw = raw.trim();
    raw.strip_prefix(prefix).unwrap_or(raw).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{model, FakeBackend};
    use std::sync::atomic::Ordering;

    #[test]
    fn prefix_is_stripped() {
        assert_eq!(badge_text("networkStatus &#11014; UP\n", "networkStatus"), "&#11014; UP");
        assert_eq!(badge_text("&#11015; DN", "networkStatus"), "&#11015; DN");
    }

    #[tokio::test]
    async fn badge_follows_backend_reachability() {
        let backend = Arc::new(FakeBackend::default());
        let surface = model();
        let probe = NetworkProbe::new(
            backend.clone(),
            surface.clone(),
            "network",
            &BackendConfig::default(),
        );

        assert!(probe.probe().await);
        assert_eq!(surface.element("network").unwrap().text.as_deref(), Some("&#11014; UP"));

        backend.offline.store(true, Ordering::SeqCst);
        assert!(!probe.probe().await);
        assert_eq!(surface.element("network").unwrap().text.as_deref(), Some("&#11015; DN"));
    }
}
