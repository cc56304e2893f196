use std::time::Duration;

use crate::error::Result;

/// Opaque display effects, addressed by element id.
///
/// Calls are synchronous and cheap; implementations must not block.
pub trait Surface: Send + Sync {
    /// Current source URL of a media element.
    fn source(&self, id: &str) -> Result<String>;

    fn set_source(&self, id: &str, url: &str) -> Result<()>;

    fn set_text(&self, id: &str, text: &str) -> Result<()>;

    /// Add a style flag; adding an existing flag is a no-op.
    fn add_class(&self, id: &str, class: &str) -> Result<()>;

    fn remove_class(&self, id: &str, class: &str) -> Result<()>;

    fn set_visible(&self, id: &str, visible: bool) -> Result<()>;

    fn attribute(&self, id: &str, name: &str) -> Result<Option<String>>;

    /// Transition duration the page applies to this element.
    fn transition_duration(&self, id: &str) -> Result<Duration>;
}
