//! Order status transition rules

use super::error::OrderError;
use shared::models::OrderStatus;
use std::str::FromStr;

/// Which status changes are accepted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may be set at any time
    #[default]
    Permissive,
    /// Only forward moves along the kitchen flow, or cancellation of an
    /// open order. Re-applying the current status is accepted.
    ForwardOnly,
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "permissive" => Ok(Self::Permissive),
            "forward_only" => Ok(Self::ForwardOnly),
            other => Err(format!("unknown order transition policy: {other}")),
        }
    }
}

fn rank(status: OrderStatus) -> u8 {
    match status {
        OrderStatus::Pending => 0,
        OrderStatus::Preparing => 1,
        OrderStatus::Ready => 2,
        OrderStatus::Served => 3,
        OrderStatus::Paid => 4,
        OrderStatus::Cancelled => 5,
    }
}

impl TransitionPolicy {
    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if *self == Self::Permissive || from == to {
            return Ok(());
        }
        let allowed = !from.is_terminal() && (to == OrderStatus::Cancelled || rank(to) > rank(from));
        if allowed {
            Ok(())
        } else {
            Err(OrderError::InvalidTransition { from, to })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_permissive_accepts_everything() {
        let policy = TransitionPolicy::Permissive;
        assert!(policy.check(Paid, Pending).is_ok());
        assert!(policy.check(Cancelled, Preparing).is_ok());
    }

    #[test]
    fn test_forward_only() {
        let policy = TransitionPolicy::ForwardOnly;
        assert!(policy.check(Pending, Preparing).is_ok());
        assert!(policy.check(Pending, Paid).is_ok());
        assert!(policy.check(Served, Cancelled).is_ok());
        assert!(policy.check(Ready, Ready).is_ok());

        assert!(policy.check(Served, Preparing).is_err());
        assert!(policy.check(Paid, Cancelled).is_err());
        assert!(matches!(
            policy.check(Cancelled, Pending),
            Err(OrderError::InvalidTransition {
                from: Cancelled,
                to: Pending
            })
        ));
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("permissive".parse(), Ok(TransitionPolicy::Permissive));
        assert_eq!("forward_only".parse(), Ok(TransitionPolicy::ForwardOnly));
        assert!("strict".parse::<TransitionPolicy>().is_err());
    }
}
