//! Gesture-session capture bookkeeping.
//!
//! Once a gesture arms, its move/up handling must keep receiving events even
//! when the pointer leaves the originating block (fast pointer motion outruns
//! per-element hit testing). Hosts mirror [`CaptureSession::is_attached`]
//! into their global listener attachment; the session guarantees the
//! attach/detach pairing stays balanced across every gesture exit path.

/// Begin/end-counted capture state for the active gesture.
///
/// `begin` is called exactly once per gesture-start. `end` is idempotent so
/// pointer-up and pointer-up-outside can both fire for the same gesture
/// without unbalancing the count.
#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    attached: bool,
    begun: u64,
    ended: u64,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a gesture. Must not be called while attached.
    pub fn begin(&mut self) {
        debug_assert!(!self.attached, "capture begun twice without an end");
        self.attached = true;
        self.begun += 1;
        log::trace!("capture session begin (#{})", self.begun);
    }

    /// Mark the end of a gesture. Safe to call when not attached.
    pub fn end(&mut self) {
        if self.attached {
            self.attached = false;
            self.ended += 1;
            log::trace!("capture session end (#{})", self.ended);
        }
    }

    /// Whether a gesture currently holds capture.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// True when every begin has been matched by an end.
    pub fn is_balanced(&self) -> bool {
        !self.attached && self.begun == self.ended
    }

    /// Total gestures started, for diagnostics and tests.
    pub fn begun(&self) -> u64 {
        self.begun
    }

    /// Total gestures ended, for diagnostics and tests.
    pub fn ended(&self) -> u64 {
        self.ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_end_balance() {
        let mut session = CaptureSession::new();
        assert!(session.is_balanced());

        session.begin();
        assert!(session.is_attached());
        assert!(!session.is_balanced());

        session.end();
        assert!(!session.is_attached());
        assert!(session.is_balanced());
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut session = CaptureSession::new();
        session.begin();
        session.end();
        // Up-outside after up must not over-count
        session.end();
        session.end();

        assert_eq!(session.begun(), 1);
        assert_eq!(session.ended(), 1);
        assert!(session.is_balanced());
    }

    #[test]
    fn test_repeated_gestures_stay_balanced() {
        let mut session = CaptureSession::new();
        for _ in 0..100 {
            session.begin();
            session.end();
            session.end();
        }
        assert_eq!(session.begun(), 100);
        assert_eq!(session.ended(), 100);
        assert!(session.is_balanced());
    }
}
