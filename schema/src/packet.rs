//! Packet schemas and their builder.

use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};
use crate::field::FieldDef;
use crate::hash::fingerprint;
use crate::layout::{Layout, PlanStep};
use crate::protocol::{Direction, Protocol};
use crate::value::Record;

/// The compiled definition of one packet type.
///
/// Built once through [`PacketSchemaBuilder`] and immutable afterwards.
/// Abstract schemas are templates for [`PacketSchemaBuilder::extends`]; they
/// are never prepared, registered or encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketSchema {
    name: String,
    id: Option<u8>,
    protocol: Protocol,
    direction: Direction,
    is_abstract: bool,
    override_existing: bool,
    default_version: Option<u32>,
    layout: Layout,
    fingerprint: u64,
}

impl PacketSchema {
    /// Starts a schema definition.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> PacketSchemaBuilder {
        PacketSchemaBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Numeric packet id. Always set on non-abstract schemas.
    #[must_use]
    pub const fn id(&self) -> Option<u8> {
        self.id
    }

    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Whether this schema replaces an existing registration for its id.
    #[must_use]
    pub const fn overrides(&self) -> bool {
        self.override_existing
    }

    /// Version assumed when the connection has not negotiated one.
    #[must_use]
    pub const fn default_version(&self) -> Option<u32> {
        self.default_version
    }

    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        self.layout.fields()
    }

    #[must_use]
    pub fn plan(&self) -> &[PlanStep] {
        self.layout.plan()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.layout.field(name)
    }

    #[must_use]
    pub fn version_field(&self) -> Option<&FieldDef> {
        self.layout.version_field().map(|i| &self.layout.fields()[i])
    }

    /// Deterministic structural hash; equal fingerprints mean identical schemas.
    #[must_use]
    pub const fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// A record holding every field's default.
    #[must_use]
    pub fn default_record(&self) -> Record {
        self.layout.default_record()
    }
}

/// Builder for [`PacketSchema`].
///
/// Options left unset are inherited from the last [`extends`](Self::extends)
/// parent, then fall back to protocol `None`, direction `Both` and no
/// default version.
#[derive(Debug, Clone)]
pub struct PacketSchemaBuilder {
    name: String,
    id: Option<u8>,
    protocol: Option<Protocol>,
    direction: Option<Direction>,
    default_version: Option<u32>,
    is_abstract: bool,
    override_existing: bool,
    parent: Option<(Protocol, Direction, Option<u32>)>,
    inherited: Vec<FieldDef>,
    fields: Vec<FieldDef>,
    version_field: Option<String>,
}

impl PacketSchemaBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            protocol: None,
            direction: None,
            default_version: None,
            is_abstract: false,
            override_existing: false,
            parent: None,
            inherited: Vec::new(),
            fields: Vec::new(),
            version_field: None,
        }
    }

    #[must_use]
    pub const fn id(mut self, id: u8) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub const fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    #[must_use]
    pub const fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    #[must_use]
    pub const fn default_version(mut self, version: u32) -> Self {
        self.default_version = Some(version);
        self
    }

    /// Marks the schema as a template only.
    #[must_use]
    pub const fn abstract_template(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Allows this schema to replace an existing registration.
    #[must_use]
    pub const fn override_existing(mut self) -> Self {
        self.override_existing = true;
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Copies the parent's fields and options.
    ///
    /// A field declared on this builder replaces the inherited field of the
    /// same name in place.
    #[must_use]
    pub fn extends(mut self, parent: &PacketSchema) -> Self {
        for field in parent.fields() {
            match self.inherited.iter_mut().find(|f| f.name == field.name) {
                Some(slot) => *slot = field.clone(),
                None => self.inherited.push(field.clone()),
            }
        }
        self.parent = Some((
            parent.protocol,
            parent.direction,
            parent.default_version,
        ));
        self
    }

    /// Marks the field called `name` as the version identifier.
    #[must_use]
    pub fn version_field(mut self, name: impl Into<String>) -> Self {
        self.version_field = Some(name.into());
        self
    }

    /// Validates the definition and prepares the parsing plan.
    pub fn build(self) -> SchemaResult<PacketSchema> {
        let name = self.name;
        let mut fields = self.inherited;
        let mut own = HashSet::new();
        for field in self.fields {
            if !own.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateFieldName {
                    packet: name,
                    field: field.name,
                });
            }
            match fields.iter_mut().find(|f| f.name == field.name) {
                Some(slot) => *slot = field,
                None => fields.push(field),
            }
        }

        if let Some(version_name) = self.version_field {
            let Some(field) = fields.iter_mut().find(|f| f.name == version_name) else {
                return Err(SchemaError::UnknownField {
                    packet: name,
                    field: version_name,
                });
            };
            field.is_version_identifier = true;
        }

        let (parent_protocol, parent_direction, parent_version) =
            self.parent.unwrap_or_default();
        let mut layout = Layout::declared(fields);
        if !self.is_abstract {
            if self.id.is_none() {
                return Err(SchemaError::MissingPacketId { packet: name });
            }
            layout.prepare(&name)?;
        }

        let mut schema = PacketSchema {
            name,
            id: self.id,
            protocol: self.protocol.unwrap_or(parent_protocol),
            direction: self.direction.unwrap_or(parent_direction),
            is_abstract: self.is_abstract,
            override_existing: self.override_existing,
            default_version: self.default_version.or(parent_version),
            layout,
            fingerprint: 0,
        };
        schema.fingerprint = fingerprint(&schema);
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_base() -> PacketSchema {
        PacketSchema::builder("AdminRecv")
            .protocol(Protocol::Admin)
            .direction(Direction::Recv)
            .default_version(1)
            .abstract_template()
            .build()
            .unwrap()
    }

    #[test]
    fn builds_concrete_schema() {
        let schema = PacketSchema::builder("Ping")
            .id(7)
            .protocol(Protocol::Admin)
            .direction(Direction::Send)
            .field(FieldDef::u32("payload"))
            .build()
            .unwrap();
        assert_eq!(schema.name(), "Ping");
        assert_eq!(schema.id(), Some(7));
        assert!(!schema.is_abstract());
        assert_eq!(schema.plan(), &[PlanStep::Single(0)]);
        assert_eq!(schema.default_record(), Record::new().with("payload", 0u32));
    }

    #[test]
    fn unset_options_use_defaults() {
        let schema = PacketSchema::builder("Plain").id(1).build().unwrap();
        assert_eq!(schema.protocol(), Protocol::None);
        assert_eq!(schema.direction(), Direction::Both);
        assert_eq!(schema.default_version(), None);
    }

    #[test]
    fn abstract_schema_is_not_prepared() {
        let base = admin_base();
        assert!(base.is_abstract());
        assert_eq!(base.id(), None);
        assert!(!base.layout().is_prepared());
    }

    #[test]
    fn child_inherits_options() {
        let base = admin_base();
        let child = PacketSchema::builder("Error")
            .extends(&base)
            .id(102)
            .field(FieldDef::u8("errorcode"))
            .build()
            .unwrap();
        assert_eq!(child.protocol(), Protocol::Admin);
        assert_eq!(child.direction(), Direction::Recv);
        assert_eq!(child.default_version(), Some(1));

        let overridden = PacketSchema::builder("Other")
            .direction(Direction::Send)
            .extends(&base)
            .id(1)
            .build()
            .unwrap();
        assert_eq!(overridden.direction(), Direction::Send);
    }

    #[test]
    fn child_field_replaces_parent_field_in_place() {
        let base = PacketSchema::builder("Base")
            .abstract_template()
            .field(FieldDef::u8("a"))
            .field(FieldDef::u8("b"))
            .build()
            .unwrap();
        let child = PacketSchema::builder("Child")
            .extends(&base)
            .id(1)
            .field(FieldDef::u32("a"))
            .field(FieldDef::u8("c"))
            .build()
            .unwrap();
        let names: Vec<&str> = child.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(child.field("a").unwrap().kind.fixed_width(), Some(4));
    }

    #[test]
    fn version_field_by_name() {
        let schema = PacketSchema::builder("Info")
            .id(1)
            .field(FieldDef::u8("version"))
            .field(FieldDef::u8("extra").since(2))
            .version_field("version")
            .build()
            .unwrap();
        assert_eq!(schema.version_field().unwrap().name, "version");
    }

    #[test]
    fn version_field_unknown_name() {
        let err = PacketSchema::builder("Info")
            .id(1)
            .field(FieldDef::u8("version"))
            .version_field("ver")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownField {
                packet: "Info".into(),
                field: "ver".into()
            }
        );
    }

    #[test]
    fn concrete_schema_requires_id() {
        let err = PacketSchema::builder("NoId").build().unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingPacketId {
                packet: "NoId".into()
            }
        );
    }

    #[test]
    fn duplicate_own_fields_rejected() {
        let err = PacketSchema::builder("Dup")
            .id(1)
            .field(FieldDef::u8("a"))
            .field(FieldDef::u8("a"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateFieldName { .. }));
    }

    #[test]
    fn preparation_errors_propagate() {
        let err = PacketSchema::builder("Loop")
            .id(1)
            .field(FieldDef::looping("items", vec![FieldDef::u8("v")]))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingContinueFlag { .. }));
    }
}
