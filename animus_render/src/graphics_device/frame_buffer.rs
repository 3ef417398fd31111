/// Framebuffer handle and completeness status
///
/// A framebuffer groups one color attachment and an optional depth
/// attachment. Binding `None` selects the default (swapchain) target.

use slotmap::new_key_type;

new_key_type! {
    /// Device-side framebuffer object
    pub struct FramebufferHandle;
}

/// Result of a completeness query on a bound framebuffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramebufferStatus {
    /// All attachments are usable
    Complete,
    /// The device rejected the attachment set (reason reported by the backend)
    Incomplete(String),
}

impl FramebufferStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, FramebufferStatus::Complete)
    }
}
