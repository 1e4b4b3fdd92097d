use crate::*;

pub(crate) fn find_record<'a>(list: &'a [ScoreRecord], username: &str) -> Option<&'a ScoreRecord> {
    let username = username.trim();
    list.iter().find(|record| record.username == username)
}

/// 1-based position of `username` in a fetched list, 0 when absent.
pub fn rank_of(list: &[ScoreRecord], username: &str) -> usize {
    let username = username.trim();
    list.iter()
        .position(|record| record.username == username)
        .map_or(0, |index| index + 1)
}

/// Client side check of a winning time against the user's current entry, made before submitting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubmitPreview {
    /// The user has no entry in the fetched list.
    FirstEntry,
    Improved { previous: u32, delta: u32 },
    /// Slower than the stored entry, not submitted.
    Slower { best: u32, delta: u32 },
    /// Same as the stored entry, not submitted.
    Unchanged { best: u32 },
}

impl SubmitPreview {
    pub fn evaluate(list: &[ScoreRecord], username: &str, time: u32) -> Self {
        let Some(existing) = find_record(list, username) else {
            return Self::FirstEntry;
        };

        use core::cmp::Ordering::*;
        match time.cmp(&existing.time) {
            Less => Self::Improved {
                previous: existing.time,
                delta: existing.time - time,
            },
            Greater => Self::Slower {
                best: existing.time,
                delta: time - existing.time,
            },
            Equal => Self::Unchanged {
                best: existing.time,
            },
        }
    }

    pub const fn should_submit(&self) -> bool {
        matches!(self, Self::FirstEntry | Self::Improved { .. })
    }
}

/// What the page tells the user after the service accepted a submission.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubmitReport {
    /// The user appears in the returned list.
    Ranked { rank: usize, preview: SubmitPreview },
    /// Recorded, but outside the top entries.
    Unranked { preview: SubmitPreview },
}

impl SubmitReport {
    pub fn new(preview: SubmitPreview, updated: &[ScoreRecord], username: &str) -> Self {
        match rank_of(updated, username) {
            0 => Self::Unranked { preview },
            rank => Self::Ranked { rank, preview },
        }
    }

    pub const fn rank(&self) -> Option<usize> {
        match *self {
            Self::Ranked { rank, .. } => Some(rank),
            Self::Unranked { .. } => None,
        }
    }

    pub const fn preview(&self) -> SubmitPreview {
        match *self {
            Self::Ranked { preview, .. } | Self::Unranked { preview } => preview,
        }
    }
}
