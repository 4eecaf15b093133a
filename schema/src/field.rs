//! Field catalog: wire kinds and field definitions.

use crate::layout::Layout;
use crate::validate::Validator;
use crate::value::{Record, Value};

/// Fixed-width little-endian integer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
}

impl IntKind {
    /// Encoded width in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 => 4,
            Self::U64 | Self::I64 => 8,
        }
    }

    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Smallest representable value.
    #[must_use]
    pub const fn min(self) -> i128 {
        match self {
            Self::U8 | Self::U16 | Self::U32 | Self::U64 => 0,
            Self::I8 => i8::MIN as i128,
            Self::I16 => i16::MIN as i128,
            Self::I32 => i32::MIN as i128,
            Self::I64 => i64::MIN as i128,
        }
    }

    /// Largest representable value.
    #[must_use]
    pub const fn max(self) -> i128 {
        match self {
            Self::U8 => u8::MAX as i128,
            Self::U16 => u16::MAX as i128,
            Self::U32 => u32::MAX as i128,
            Self::U64 => u64::MAX as i128,
            Self::I8 => i8::MAX as i128,
            Self::I16 => i16::MAX as i128,
            Self::I32 => i32::MAX as i128,
            Self::I64 => i64::MAX as i128,
        }
    }

    #[must_use]
    pub const fn contains(self, value: i128) -> bool {
        self.min() <= value && value <= self.max()
    }
}

/// How many elements a repeating field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepeatCount {
    /// Always exactly this many elements; nothing is written for the count.
    Fixed(usize),
    /// The count is written immediately before the elements.
    Prefixed(IntKind),
}

/// The wire kind of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Int(IntKind),
    /// One byte, nonzero is true.
    Bool,
    /// Fixed-size byte array.
    Bytes { len: usize },
    /// NUL-terminated string. With a trim length, at most `trim_length - 1`
    /// payload bytes are written.
    Str { trim_length: Option<usize> },
    /// `u32` day count, see the codec for the epoch.
    Date,
    /// JSON document carried as a NUL-terminated string whose serialized
    /// length must stay below `max_length`.
    Json { max_length: usize },
    /// Four octets in address order.
    Ipv4,
    Repeating { count: RepeatCount, layout: Layout },
    Grouped {
        layout: Layout,
        expect_count: Option<usize>,
    },
    /// Elements each preceded by the layout's continuation flag.
    Looping { layout: Layout },
}

impl FieldKind {
    /// Encoded width for fixed-width kinds; `None` for variable ones.
    ///
    /// Exactly the fixed-width kinds may join a merge group.
    #[must_use]
    pub const fn fixed_width(&self) -> Option<usize> {
        match self {
            Self::Int(kind) => Some(kind.width()),
            Self::Bool => Some(1),
            Self::Bytes { len } => Some(*len),
            Self::Date | Self::Ipv4 => Some(4),
            Self::Str { .. }
            | Self::Json { .. }
            | Self::Repeating { .. }
            | Self::Grouped { .. }
            | Self::Looping { .. } => None,
        }
    }

    /// Nested layout for aggregate kinds.
    #[must_use]
    pub const fn layout(&self) -> Option<&Layout> {
        match self {
            Self::Repeating { layout, .. }
            | Self::Grouped { layout, .. }
            | Self::Looping { layout } => Some(layout),
            _ => None,
        }
    }

    pub(crate) fn layout_mut(&mut self) -> Option<&mut Layout> {
        match self {
            Self::Repeating { layout, .. }
            | Self::Grouped { layout, .. }
            | Self::Looping { layout } => Some(layout),
            _ => None,
        }
    }

    /// Value used when a field is absent from a record or gated out.
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            Self::Int(kind) if kind.is_signed() => Value::Int(0),
            Self::Int(_) => Value::UInt(0),
            Self::Bool => Value::Bool(false),
            Self::Bytes { len } => Value::Bytes(vec![0; *len]),
            Self::Str { .. } => Value::Str(String::new()),
            Self::Date => Value::Date(None),
            Self::Json { .. } => Value::Json(serde_json::Value::Null),
            Self::Ipv4 => Value::Ipv4(std::net::Ipv4Addr::UNSPECIFIED),
            Self::Repeating {
                count: RepeatCount::Fixed(n),
                layout,
            } => Value::List(vec![layout.default_record(); *n]),
            Self::Repeating { .. } | Self::Looping { .. } => Value::List(Vec::new()),
            Self::Grouped { layout, .. } => Value::Record(layout.default_record()),
        }
    }
}

/// One named slot in a packet.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    /// Sort key; ties keep declaration order.
    pub ordering: i32,
    pub kind: FieldKind,
    pub default: Option<Value>,
    pub validators: Vec<Validator>,
    /// Minimum protocol version for the field to be on the wire.
    pub required_version: Option<u32>,
    pub is_version_identifier: bool,
    pub is_continue_flag: bool,
}

macro_rules! int_constructors {
    ($($name:ident => $kind:ident),* $(,)?) => {
        $(
            #[must_use]
            pub fn $name(name: impl Into<String>) -> Self {
                Self::new(name, FieldKind::Int(IntKind::$kind))
            }
        )*
    };
}

impl FieldDef {
    /// Creates a field with ordering 0, no default, validators or version gate.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            ordering: 0,
            kind,
            default: None,
            validators: Vec::new(),
            required_version: None,
            is_version_identifier: false,
            is_continue_flag: false,
        }
    }

    int_constructors! {
        u8 => U8,
        i8 => I8,
        u16 => U16,
        i16 => I16,
        u32 => U32,
        i32 => I32,
        u64 => U64,
        i64 => I64,
    }

    #[must_use]
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    #[must_use]
    pub fn bytes(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, FieldKind::Bytes { len })
    }

    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Str { trim_length: None })
    }

    #[must_use]
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    #[must_use]
    pub fn json(name: impl Into<String>, max_length: usize) -> Self {
        Self::new(name, FieldKind::Json { max_length })
    }

    #[must_use]
    pub fn ipv4(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Ipv4)
    }

    #[must_use]
    pub fn repeating(name: impl Into<String>, count: RepeatCount, fields: Vec<Self>) -> Self {
        Self::new(
            name,
            FieldKind::Repeating {
                count,
                layout: Layout::declared(fields),
            },
        )
    }

    #[must_use]
    pub fn grouped(name: impl Into<String>, fields: Vec<Self>) -> Self {
        Self::new(
            name,
            FieldKind::Grouped {
                layout: Layout::declared(fields),
                expect_count: None,
            },
        )
    }

    /// A self-terminating list; exactly one of `fields` must be a
    /// [`continue_flag`](Self::continue_flag).
    #[must_use]
    pub fn looping(name: impl Into<String>, fields: Vec<Self>) -> Self {
        Self::new(
            name,
            FieldKind::Looping {
                layout: Layout::declared(fields),
            },
        )
    }

    #[must_use]
    pub const fn ordering(mut self, ordering: i32) -> Self {
        self.ordering = ordering;
        self
    }

    /// Gates the field on protocol version `version` or later.
    #[must_use]
    pub const fn since(mut self, version: u32) -> Self {
        self.required_version = Some(version);
        self
    }

    #[must_use]
    pub const fn version_identifier(mut self) -> Self {
        self.is_version_identifier = true;
        self
    }

    #[must_use]
    pub const fn continue_flag(mut self) -> Self {
        self.is_continue_flag = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Sets the string trim length. No effect on non-string fields.
    #[must_use]
    pub fn trim(mut self, trim_length: usize) -> Self {
        if let FieldKind::Str { trim_length: t } = &mut self.kind {
            *t = Some(trim_length);
        }
        self
    }

    /// States how many sub-fields a grouped field must have.
    #[must_use]
    pub fn expect_count(mut self, count: usize) -> Self {
        if let FieldKind::Grouped { expect_count, .. } = &mut self.kind {
            *expect_count = Some(count);
        }
        self
    }

    /// Returns the explicit default, or the kind's default.
    #[must_use]
    pub fn default_or_kind(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| self.kind.default_value())
    }

    /// Returns `true` if the field is on the wire at `version`.
    #[must_use]
    pub fn present_at(&self, version: u32) -> bool {
        self.required_version.map_or(true, |required| version >= required)
    }
}

/// Default record for a list of fields.
pub(crate) fn default_record(fields: &[FieldDef]) -> Record {
    fields
        .iter()
        .filter(|f| !f.is_continue_flag)
        .map(|f| (f.name.clone(), f.default_or_kind()))
        .collect()
}
