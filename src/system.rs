use picomac_input::{SystemAction, SystemControl};

/// Host stand-in for the board's reset lines: records the request instead of acting on it.
///
/// On hardware both actions end the process; callers on the host are expected to check
/// [`LatchedSystemControl::requested`] and stop.
#[derive(Debug, Default)]
pub struct LatchedSystemControl {
    requested: Option<SystemAction>,
}

impl LatchedSystemControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> Option<SystemAction> {
        self.requested
    }
}

impl SystemControl for LatchedSystemControl {
    fn perform(&mut self, action: SystemAction) {
        tracing::warn!(?action, "system action requested");
        // First request wins; the board would not have survived to see a second.
        if self.requested.is_none() {
            self.requested = Some(action);
        }
    }
}
