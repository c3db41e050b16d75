//! Retention classification over a receiver chain

use crate::receiver::{CanonicalTimestamp, Receiver};

/// Keep/delete verdict for one receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Attached at or after the cutoff
    KeepAfterCutoff,
    /// Newest receiver attached before the cutoff; holds the oldest needed entry
    KeepBoundary,
    /// Older than the boundary, but deletion is disabled for this run
    KeepStale,
    /// Older than the boundary and scheduled for deletion
    Delete,
}

impl Verdict {
    /// Whether the receiver is older than the boundary
    pub fn is_deletable(self) -> bool {
        matches!(self, Verdict::KeepStale | Verdict::Delete)
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::KeepAfterCutoff => "keep",
            Verdict::KeepBoundary => "keep (oldest needed)",
            Verdict::KeepStale => "can be deleted",
            Verdict::Delete => "delete",
        }
    }
}

/// Outcome of classifying a chain against a cutoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPlan {
    /// Index of the boundary receiver in chain order, if any receiver precedes the cutoff
    pub boundary: Option<usize>,
    /// One verdict per receiver, in chain order (oldest first)
    pub verdicts: Vec<Verdict>,
}

impl RetentionPlan {
    /// Number of receivers strictly older than the boundary
    pub fn deletable_count(&self) -> usize {
        self.boundary.unwrap_or(0)
    }

    /// Indices in classification order (newest first)
    pub fn scan_order(&self) -> impl Iterator<Item = usize> {
        (0..self.verdicts.len()).rev()
    }
}

/// Classify every receiver in `chain` (oldest first) against `cutoff`
///
/// The scan runs newest to oldest. The first receiver attached strictly
/// before the cutoff becomes the boundary and is kept; everything older is
/// `Delete` when `delete_enabled`, else `KeepStale`. Equal timestamps are
/// not earlier and are kept.
pub fn classify(chain: &[Receiver], cutoff: &CanonicalTimestamp, delete_enabled: bool) -> RetentionPlan {
    let older = if delete_enabled {
        Verdict::Delete
    } else {
        Verdict::KeepStale
    };

    let mut verdicts = vec![Verdict::KeepAfterCutoff; chain.len()];
    let mut boundary = None;

    for (index, receiver) in chain.iter().enumerate().rev() {
        if boundary.is_some() {
            verdicts[index] = older;
        } else if receiver.attached_at < *cutoff {
            verdicts[index] = Verdict::KeepBoundary;
            boundary = Some(index);
        }
    }

    RetentionPlan { boundary, verdicts }
}
