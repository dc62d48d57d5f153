use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building an identifier from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The value is zero or negative.
    #[error("{kind} must be positive, got {value}")]
    NotPositive { kind: &'static str, value: i64 },

    /// The text is not a decimal integer.
    #[error("{kind} must be an integer, got '{input}'")]
    Malformed { kind: &'static str, input: String },
}

macro_rules! positive_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier, rejecting values that are not strictly positive.
            pub fn new(value: i64) -> Result<Self, IdError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(IdError::NotPositive {
                        kind: stringify!($name),
                        value,
                    })
                }
            }

            /// Returns the underlying integer.
            pub fn get(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = IdError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s.trim().parse::<i64>().map_err(|_| IdError::Malformed {
                    kind: stringify!($name),
                    input: s.to_string(),
                })?;
                Self::new(value)
            }
        }
    };
}

positive_id!(
    /// Identifier of a persisted cart.
    CartId
);

positive_id!(
    /// Identifier of a line item inside a cart.
    CartItemId
);

positive_id!(
    /// Identifier of a catalog product.
    ProductId
);

positive_id!(
    /// Identifier of a recipe.
    RecipeId
);
