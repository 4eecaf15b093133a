//! Value validators attached to fields.

use std::fmt;

use crate::value::Value;

/// A check run on a native value before it is encoded.
///
/// Validators that do not apply to a value's type accept it; type checks are
/// the codec's job.
#[derive(Clone)]
pub enum Validator {
    /// Length (bytes for strings, elements for lists) at most `n`.
    MaxLength(usize),
    /// Length at least `n`.
    MinLength(usize),
    /// Integer within `min..=max`.
    Range { min: i64, max: i64 },
    /// Integer equal to one of the listed values.
    OneOf(Vec<i64>),
    /// Caller-supplied predicate, usually an enum validity table.
    Predicate {
        name: &'static str,
        check: fn(&Value) -> bool,
    },
}

impl Validator {
    /// Returns `true` if `value` passes this validator.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::MaxLength(max) => value.length().map_or(true, |len| len <= *max),
            Self::MinLength(min) => value.length().map_or(true, |len| len >= *min),
            Self::Range { min, max } => value
                .as_i128()
                .map_or(true, |v| i128::from(*min) <= v && v <= i128::from(*max)),
            Self::OneOf(allowed) => value
                .as_i128()
                .map_or(true, |v| allowed.iter().any(|a| i128::from(*a) == v)),
            Self::Predicate { check, .. } => check(value),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxLength(n) => write!(f, "max_length({n})"),
            Self::MinLength(n) => write!(f, "min_length({n})"),
            Self::Range { min, max } => write!(f, "range({min}..={max})"),
            Self::OneOf(values) => write!(f, "one_of({values:?})"),
            Self::Predicate { name, .. } => write!(f, "{name}"),
        }
    }
}

// Predicates compare by name; function pointer identity is not stable.
impl PartialEq for Validator {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MaxLength(a), Self::MaxLength(b)) | (Self::MinLength(a), Self::MinLength(b)) => {
                a == b
            }
            (Self::Range { min: a0, max: a1 }, Self::Range { min: b0, max: b1 }) => {
                a0 == b0 && a1 == b1
            }
            (Self::OneOf(a), Self::OneOf(b)) => a == b,
            (Self::Predicate { name: a, .. }, Self::Predicate { name: b, .. }) => a == b,
            _ => false,
        }
    }
}
