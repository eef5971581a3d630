use crate::orders::OrderStatus;

/// Service for managing order status transitions
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Arguments
    /// * `from` - Current order status
    /// * `to` - Desired new status
    ///
    /// # Returns
    /// `true` if the transition is valid, `false` otherwise
    ///
    /// # Valid Transitions
    /// - Pending → Confirmed, Cancelled
    /// - Confirmed → Preparing, Cancelled
    /// - Preparing → OutForDelivery, Cancelled
    /// - OutForDelivery → Delivered
    /// - Delivered, Cancelled → (terminal)
    /// - Any status → Same status (idempotent)
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Confirmed, OrderStatus::Preparing)
                | (OrderStatus::Confirmed, OrderStatus::Cancelled)
                | (OrderStatus::Preparing, OrderStatus::OutForDelivery)
                | (OrderStatus::Preparing, OrderStatus::Cancelled)
                | (OrderStatus::OutForDelivery, OrderStatus::Delivered)
        )
    }

    /// Cancellation requested by the order's owner; only pending orders qualify
    ///
    /// # Returns
    /// `Ok(Cancelled)`, or `Err(message)` naming the current status
    pub fn user_cancel(current: OrderStatus) -> Result<OrderStatus, String> {
        match current {
            OrderStatus::Pending => Ok(OrderStatus::Cancelled),
            other => Err(Self::cancel_rejection(other)),
        }
    }

    pub fn cancel_rejection(current: OrderStatus) -> String {
        format!("Cannot cancel an order that is {}", current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Confirmed
        ));
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Cancelled
        ));
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Preparing
        ));
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Delivered
        ));
    }

    #[test]
    fn test_confirmed_transitions() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Confirmed,
            OrderStatus::Cancelled
        ));
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Confirmed,
            OrderStatus::Preparing
        ));
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Confirmed,
            OrderStatus::Pending
        ));
    }

    #[test]
    fn test_fulfillment_chain() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery
        ));
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered
        ));
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::OutForDelivery,
            OrderStatus::Cancelled
        ));
    }

    #[test]
    fn test_cancelled_and_delivered_are_final() {
        for to in OrderStatus::ALL {
            if to != OrderStatus::Cancelled {
                assert!(!StatusMachine::is_valid_transition(OrderStatus::Cancelled, to));
            }
            if to != OrderStatus::Delivered {
                assert!(!StatusMachine::is_valid_transition(OrderStatus::Delivered, to));
            }
        }
    }

    #[test]
    fn test_user_cancel_only_from_pending() {
        assert_eq!(
            StatusMachine::user_cancel(OrderStatus::Pending),
            Ok(OrderStatus::Cancelled)
        );

        let err = StatusMachine::user_cancel(OrderStatus::Confirmed).unwrap_err();
        assert!(err.contains("confirmed"));
    }
}
