use serde::{Deserialize, Serialize};

/// Declares an integer-backed identifier newtype.
///
/// Wrapping the raw database key keeps order, product and subject ids from
/// being mixed up at call sites.
macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a raw key.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw key.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

integer_id!(
    /// Identifier of an authenticated actor (the owner of a credential).
    SubjectId
);

integer_id!(
    /// Identifier of an order.
    OrderId
);

integer_id!(
    /// Identifier of a catalog product.
    ProductId
);
