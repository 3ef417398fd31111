/// Lifecycle state of a pass inside a graph

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    /// Constructed, `prepare` not yet run (or failed)
    Uninitialized,
    /// Resources allocated, ready to render
    Prepared,
    /// Inside one `render` call
    Rendering,
    /// Resources released; terminal
    Disposed,
}

impl PassState {
    /// Validate a transition and return the new state.
    ///
    /// `Prepared -> Prepared` is the resize side-transition.
    pub fn transition(self, to: PassState) -> Result<PassState> {
        use PassState::*;
        let allowed = matches!(
            (self, to),
            (Uninitialized, Prepared)
                | (Prepared, Rendering)
                | (Rendering, Prepared)
                | (Prepared, Prepared)
                | (Uninitialized, Disposed)
                | (Prepared, Disposed)
        );
        if allowed {
            Ok(to)
        } else {
            Err(Error::UsageError(format!("invalid pass transition {:?} -> {:?}", self, to)))
        }
    }

    pub fn can_render(self) -> bool {
        self == PassState::Prepared
    }
}
