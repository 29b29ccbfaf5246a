/// Rank of a participant in the broadcast world (0-indexed).
pub type Rank = u32;

/// Completion milestones exposed by the asynchronous broadcast engine.
///
/// The three checkpoints are independently useful: a caller that only needs
/// its own copy of the data waits for [`Checkpoint::DataReady`] and overlaps
/// local work with the rest; a caller that reuses the source buffer waits
/// for [`Checkpoint::AllCommitted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Checkpoint {
    /// This rank's own buffer holds valid broadcast data.
    DataReady,
    /// This rank has no forwarding obligations left to issue.
    AllIssued,
    /// Every forwarding write issued by this rank has landed remotely.
    AllCommitted,
}

impl Checkpoint {
    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Checkpoint::DataReady => "data-ready",
            Checkpoint::AllIssued => "all-issued",
            Checkpoint::AllCommitted => "all-committed",
        }
    }
}

impl std::fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
