//! Order status transition table
//!
//! `CREATED` is the initial state; `DELIVERED` and `CANCELED` are terminal.
//! There are no self-loops: requesting the current status is always an
//! invalid transition.

use crate::db::models::OrderStatus;

/// Allowed targets from a given status
pub fn allowed_targets(from: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match from {
        Created => &[Preparing, Canceled],
        Preparing => &[Ready, Canceled],
        Ready => &[Delivering, Canceled],
        Delivering => &[Delivered],
        Delivered => &[],
        Canceled => &[],
    }
}

/// Whether `from -> to` is a legal transition
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Whether a customer may still self-cancel from this status. Once the
/// kitchen has the order ready, cancellation requires staff.
pub fn customer_cancelable(from: OrderStatus) -> bool {
    matches!(from, OrderStatus::Created | OrderStatus::Preparing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    const ALL: [OrderStatus; 6] = [Created, Preparing, Ready, Delivering, Delivered, Canceled];

    #[test]
    fn test_happy_path_chain_is_legal() {
        assert!(can_transition(Created, Preparing));
        assert!(can_transition(Preparing, Ready));
        assert!(can_transition(Ready, Delivering));
        assert!(can_transition(Delivering, Delivered));
    }

    #[test]
    fn test_cancellation_legal_until_delivering() {
        assert!(can_transition(Created, Canceled));
        assert!(can_transition(Preparing, Canceled));
        assert!(can_transition(Ready, Canceled));
        assert!(!can_transition(Delivering, Canceled));
    }

    #[test]
    fn test_terminal_states_have_no_targets() {
        assert!(allowed_targets(Delivered).is_empty());
        assert!(allowed_targets(Canceled).is_empty());
    }

    #[test]
    fn test_no_self_loops() {
        for status in ALL {
            assert!(
                !can_transition(status, status),
                "{status} must not transition to itself"
            );
        }
    }

    #[test]
    fn test_every_pair_outside_table_is_illegal() {
        for from in ALL {
            for to in ALL {
                let expected = allowed_targets(from).contains(&to);
                assert_eq!(can_transition(from, to), expected);
            }
        }
    }

    #[test]
    fn test_customer_window_closes_at_ready() {
        assert!(customer_cancelable(Created));
        assert!(customer_cancelable(Preparing));
        assert!(!customer_cancelable(Ready));
        assert!(!customer_cancelable(Delivering));
        assert!(!customer_cancelable(Delivered));
        assert!(!customer_cancelable(Canceled));
    }
}
