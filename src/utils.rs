use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use crate::errors::ValidationError;

/// Declares a closed enum backed by a wire-level `i32` constant.
///
/// Each variant is given its wire value and its canonical (upper-case) name: the macro generates
/// the pure mappings `TryFrom<i32>`, `From<Enum> for i32`, [`std::fmt::Display`] and
/// [`std::str::FromStr`] (case-insensitive, on the canonical name).
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal => $label:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(i32)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value,
            )+
        }

        impl $name {
            /// Wire-level integer for this value.
            pub fn value(&self) -> i32 {
                *self as i32
            }

            /// Canonical name of this value.
            pub fn name(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl TryFrom<i32> for $name {
            type Error = i32;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok($name::$variant), )+
                    other => Err(other),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(v: $name) -> i32 {
                v as i32
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $( $label => Ok($name::$variant), )+
                    _ => Err(s.to_string()),
                }
            }
        }
    };
}

pub(crate) use wire_enum;

/// Fails with [`ValidationError::EmptyField`] if `value` is empty.
pub(crate) fn require_non_empty(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }

    Ok(())
}

/// Fails with [`ValidationError::NegativeValue`] if `value` is negative.
pub(crate) fn require_non_negative<N: Into<i64>>(value: N, field: &'static str) -> Result<(), ValidationError> {
    let value = value.into();
    if value < 0 {
        return Err(ValidationError::NegativeValue { field, value });
    }

    Ok(())
}

/// Fails with [`ValidationError::EmptyCollection`] if `items` is empty.
pub(crate) fn require_at_least_one<T>(items: &[T], entity: &'static str) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::EmptyCollection(entity));
    }

    Ok(())
}

/// Fails with [`ValidationError::Duplicate`] on the first key that appears twice.
pub(crate) fn require_unique<'a, K, I>(keys: I, entity: &'static str) -> Result<(), ValidationError>
where
    K: Eq + Hash + Display + 'a,
    I: IntoIterator<Item = &'a K>,
{
    require_unique_by(keys, entity, K::to_string)
}

/// Same as [`require_unique`], for keys that are described by `describe` in the error.
pub(crate) fn require_unique_by<'a, K, I, F>(keys: I, entity: &'static str, describe: F) -> Result<(), ValidationError>
where
    K: Eq + Hash + 'a,
    I: IntoIterator<Item = &'a K>,
    F: Fn(&K) -> String,
{
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(ValidationError::Duplicate {
                entity,
                key: describe(key),
            });
        }
    }

    Ok(())
}

/// Used in unit tests to verify type is Thread Safe and Async/Await Safe.
///
/// It enforces that the given type implements the following standard traits:
///
/// * `std::marker::Sized`: type has a constant size known at compile time
/// * `std::marker::Send`: type is safe to send to another thread
/// * `std::marker::Sync`: type is Sync if it is safe to share between threads;
///   type can be Sync if and only if a reference to it is Send
/// * `std::marker::Unpin`: type can be safely moved after pinning
///
/// Resolving sides and handles only need to be sent across threads:
/// use [`is_send`] for those.
#[cfg(test)]
pub(crate) fn is_thread_safe<T: Sized + Send + Sync + Unpin>() {}

/// Used in unit tests to verify type can be moved to the native client thread.
#[cfg(test)]
pub(crate) fn is_send<T: Sized + Send + Unpin>() {}
