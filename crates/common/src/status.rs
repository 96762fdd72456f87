//! Order status codes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of an order in its lifecycle.
///
/// Stored and accepted on the wire as a small integer code. Code `0` is the
/// "unknown" value and never denotes a valid status, so it has no variant.
///
/// ```text
/// Pending ──cancel──► Canceled
///    │
///    └──admin override──► any status
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Freshly created, the only state the owner can cancel from.
    Pending = 1,
    Confirmed = 2,
    Shipped = 3,
    Delivered = 4,
    Canceled = 5,
    Returned = 6,
    Refunded = 7,
    Failed = 8,
}

/// Raised when a code or name does not map to a defined status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl OrderStatus {
    /// Every defined status, in code order.
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
        OrderStatus::Returned,
        OrderStatus::Refunded,
        OrderStatus::Failed,
    ];

    /// Returns the storage/wire code.
    pub fn code(&self) -> i16 {
        *self as i16
    }

    /// Resolves a storage/wire code. `0` and out-of-range codes are rejected.
    pub fn from_code(code: i16) -> Result<Self, UnknownStatus> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or_else(|| UnknownStatus(code.to_string()))
    }

    /// Returns true if no further transition is defined from this status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::Returned => "Returned",
            OrderStatus::Refunded => "Refunded",
            OrderStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for OrderStatus {
    type Error = UnknownStatus;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    /// Parses a status name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_table() {
        assert_eq!(OrderStatus::Pending.code(), 1);
        assert_eq!(OrderStatus::Canceled.code(), 5);
        assert_eq!(OrderStatus::Failed.code(), 8);
    }

    #[test]
    fn from_code_roundtrips_every_status() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_code(status.code()), Ok(status));
        }
    }

    #[test]
    fn zero_code_is_rejected() {
        assert_eq!(
            OrderStatus::from_code(0),
            Err(UnknownStatus("0".to_string()))
        );
        assert!(OrderStatus::try_from(9).is_err());
        assert!(OrderStatus::try_from(-1).is_err());
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("refunded".parse(), Ok(OrderStatus::Refunded));
        assert_eq!("Shipped".parse(), Ok(OrderStatus::Shipped));
        assert!("Unknown".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        for status in OrderStatus::ALL.into_iter().skip(1) {
            assert!(status.is_terminal(), "{status} should be terminal");
        }
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&OrderStatus::Delivered).unwrap();
        assert_eq!(json, "\"Delivered\"");
        let status: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, OrderStatus::Delivered);
    }
}
