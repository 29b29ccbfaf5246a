use crate::fabric::PutHandle;

/// Tracks the in-flight forwarding writes of one rank.
///
/// Decouples "all my writes are issued" from "all my writes have landed":
/// a caller can move on past the former while the fabric completes the
/// writes in the background, which is the lever for overlapping completion
/// with local computation.
#[derive(Default)]
pub struct PendingPuts {
    handles: Vec<PutHandle>,
}

impl PendingPuts {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Track a freshly issued write.
    pub fn push(&mut self, handle: PutHandle) {
        self.handles.push(handle);
    }

    /// Poll every not-yet-complete handle once, retain only the still
    /// incomplete ones, and report whether the collection is now empty.
    ///
    /// Safe to call with zero pending handles (reports true).
    pub fn advance(&mut self) -> bool {
        self.handles.retain(|h| !h.is_finished());
        self.handles.is_empty()
    }

    /// Number of writes not yet observed complete.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if no writes are outstanding.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
