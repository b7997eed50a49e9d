//! Loan status transition engine
//!
//! Pure validation of requested status changes, with no I/O. The lifecycle is
//!
//! ```text
//! pending -> {approved, rejected} -> disbursed -> completed
//! ```
//!
//! with `cancelled` reachable from any non-terminal state and
//! `{completed, cancelled}` terminal. `rejected` and `cancelled` sit out of
//! band as failure-path states: they are reachable from any non-terminal
//! state regardless of ordering.

use thiserror::Error;

use super::model::LoanStatus;
use crate::error::ApiError;

/// Why a requested transition was refused
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid status transition from '{from}' to '{to}'")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Cannot return an application to 'pending' from '{0}'")]
    BackToPending(&'static str),

    #[error("Record is frozen in terminal state '{0}'")]
    Frozen(&'static str),

    #[error("An administrative comment is required when marking an application '{0}'")]
    CommentRequired(&'static str),
}

impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

/// Position of each status in the forward ordering. Failure-path states get
/// high indices so any move into them counts as forward.
fn order_index(status: LoanStatus) -> u8 {
    match status {
        LoanStatus::Pending => 0,
        LoanStatus::Approved => 1,
        LoanStatus::Disbursed => 2,
        LoanStatus::Completed => 3,
        LoanStatus::Rejected => 98,
        LoanStatus::Cancelled => 99,
    }
}

fn is_failure_path(status: LoanStatus) -> bool {
    matches!(status, LoanStatus::Rejected | LoanStatus::Cancelled)
}

/// Validate a requested status change against the current state.
///
/// `comment` is the administrative comment supplied in the same request;
/// entering a decision state without one is refused before anything is
/// persisted. Requesting the current status is a no-op and always passes;
/// callers must not record a history entry for it.
pub fn validate_transition(
    current: LoanStatus,
    requested: LoanStatus,
    comment: Option<&str>,
) -> Result<(), TransitionError> {
    if requested == current {
        return Ok(());
    }

    if current.is_terminal() {
        return Err(TransitionError::Frozen(current.as_str()));
    }

    if requested == LoanStatus::Pending {
        return Err(TransitionError::BackToPending(current.as_str()));
    }

    // Backward moves are only allowed onto the failure path
    if order_index(requested) < order_index(current) && !is_failure_path(requested) {
        return Err(TransitionError::InvalidTransition {
            from: current.as_str(),
            to: requested.as_str(),
        });
    }

    if requested.is_decision() && comment.map_or(true, |c| c.trim().is_empty()) {
        return Err(TransitionError::CommentRequired(requested.as_str()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [LoanStatus; 6] = [
        LoanStatus::Pending,
        LoanStatus::Approved,
        LoanStatus::Rejected,
        LoanStatus::Disbursed,
        LoanStatus::Completed,
        LoanStatus::Cancelled,
    ];

    #[test]
    fn test_nominal_forward_path() {
        assert!(validate_transition(LoanStatus::Pending, LoanStatus::Approved, Some("ok")).is_ok());
        assert!(
            validate_transition(LoanStatus::Approved, LoanStatus::Disbursed, None).is_ok()
        );
        assert!(
            validate_transition(LoanStatus::Disbursed, LoanStatus::Completed, None).is_ok()
        );
    }

    #[test]
    fn test_no_path_back_to_pending() {
        for current in ALL {
            if current == LoanStatus::Pending {
                continue;
            }
            let result = validate_transition(current, LoanStatus::Pending, Some("comment"));
            assert!(
                result.is_err(),
                "transition {:?} -> pending must be refused",
                current
            );
        }
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        for current in [LoanStatus::Completed, LoanStatus::Cancelled] {
            for requested in ALL {
                let result = validate_transition(current, requested, Some("comment"));
                if requested == current {
                    assert!(result.is_ok(), "same-status request is a no-op");
                } else {
                    assert_eq!(
                        result,
                        Err(TransitionError::Frozen(current.as_str())),
                        "{:?} -> {:?} must be frozen",
                        current,
                        requested
                    );
                }
            }
        }
    }

    #[test]
    fn test_decision_requires_comment() {
        for comment in [None, Some(""), Some("   ")] {
            assert_eq!(
                validate_transition(LoanStatus::Pending, LoanStatus::Approved, comment),
                Err(TransitionError::CommentRequired("approved"))
            );
            assert_eq!(
                validate_transition(LoanStatus::Pending, LoanStatus::Rejected, comment),
                Err(TransitionError::CommentRequired("rejected"))
            );
        }

        // Retrying with a comment succeeds
        assert!(validate_transition(LoanStatus::Pending, LoanStatus::Approved, Some("ok")).is_ok());
        assert!(
            validate_transition(LoanStatus::Pending, LoanStatus::Rejected, Some("dossier incomplet"))
                .is_ok()
        );
    }

    #[test]
    fn test_failure_path_reachable_from_any_non_terminal_state() {
        for current in [
            LoanStatus::Pending,
            LoanStatus::Approved,
            LoanStatus::Disbursed,
        ] {
            assert!(
                validate_transition(current, LoanStatus::Cancelled, None).is_ok(),
                "{:?} -> cancelled must pass",
                current
            );
            assert!(
                validate_transition(current, LoanStatus::Rejected, Some("ko")).is_ok(),
                "{:?} -> rejected must pass",
                current
            );
        }

        // Rejected may still be cancelled
        assert!(validate_transition(LoanStatus::Rejected, LoanStatus::Cancelled, None).is_ok());
    }

    #[test]
    fn test_backward_transitions_refused() {
        assert_eq!(
            validate_transition(LoanStatus::Disbursed, LoanStatus::Approved, Some("encore")),
            Err(TransitionError::InvalidTransition {
                from: "disbursed",
                to: "approved",
            })
        );
        // A rejected application cannot be resurrected to approved
        assert_eq!(
            validate_transition(LoanStatus::Rejected, LoanStatus::Approved, Some("oops")),
            Err(TransitionError::InvalidTransition {
                from: "rejected",
                to: "approved",
            })
        );
        assert_eq!(
            validate_transition(LoanStatus::Rejected, LoanStatus::Disbursed, None),
            Err(TransitionError::InvalidTransition {
                from: "rejected",
                to: "disbursed",
            })
        );
    }

    #[test]
    fn test_same_status_is_a_no_op() {
        for status in ALL {
            assert!(validate_transition(status, status, None).is_ok());
        }
    }
}
