//! Native field values and decoded records.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use chrono::NaiveDate;

/// The native value of a single field.
///
/// Unsigned integer fields decode to [`Value::UInt`], signed ones to
/// [`Value::Int`]. Encoding accepts either variant as long as the number
/// fits the field's range.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    UInt(u64),
    Int(i64),
    Bytes(Vec<u8>),
    Str(String),
    Ipv4(Ipv4Addr),
    /// `None` is the "no date" sentinel.
    Date(Option<NaiveDate>),
    Json(serde_json::Value),
    /// Elements of a repeating or looping field.
    List(Vec<Record>),
    /// A grouped field.
    Record(Record),
}

impl Value {
    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::UInt(_) => "uint",
            Self::Int(_) => "int",
            Self::Bytes(_) => "bytes",
            Self::Str(_) => "string",
            Self::Ipv4(_) => "ipv4",
            Self::Date(_) => "date",
            Self::Json(_) => "json",
            Self::List(_) => "list",
            Self::Record(_) => "record",
        }
    }

    /// Returns the value as a wide integer if it is numeric.
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::UInt(v) => Some(i128::from(*v)),
            Self::Int(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i128().and_then(|v| u64::try_from(v).ok())
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Record]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(v) => Some(v),
            _ => None,
        }
    }

    /// Length used by length validators: bytes for strings and byte arrays,
    /// elements for lists.
    #[must_use]
    pub fn length(&self) -> Option<usize> {
        match self {
            Self::Str(v) => Some(v.len()),
            Self::Bytes(v) => Some(v.len()),
            Self::List(v) => Some(v.len()),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($variant:ident: $($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

value_from!(UInt: u8, u16, u32, u64);
value_from!(Int: i8, i16, i32, i64);
value_from!(Bool: bool);
value_from!(Str: String, &str);
value_from!(Bytes: Vec<u8>, &[u8]);
value_from!(Ipv4: Ipv4Addr);
value_from!(Json: serde_json::Value);
value_from!(List: Vec<Record>);
value_from!(Record: Record);

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(Some(value))
    }
}

impl From<Option<NaiveDate>> for Value {
    fn from(value: Option<NaiveDate>) -> Self {
        Self::Date(value)
    }
}

/// A decoded packet (or sub-record) keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
