//! Status-to-health-impact classification.

use crate::channel::Status;

/// Whether a remote failure with this status downgrades the dependency's
/// health state.
///
/// UNAVAILABLE and DEADLINE_EXCEEDED mean the backend is not answering at
/// all; every other status is the backend answering, just unhappily, and
/// says nothing about reachability.
pub fn downgrades_health(status: Status) -> bool {
    matches!(status, Status::Unavailable | Status::DeadlineExceeded)
}
