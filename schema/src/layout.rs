//! Field lists and their prepared parsing plans.
//!
//! A [`Layout`] keeps fields in declaration order. Preparing it validates the
//! fields and computes the plan: the wire order of the fields, with runs of
//! adjacent fixed-width fields collapsed into merge groups that are read and
//! written as one bounds-checked span.

use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};
use crate::field::{default_record, FieldDef, FieldKind, RepeatCount};
use crate::value::Record;

/// One physical read/write step of a plan. Indices refer to
/// [`Layout::fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    Single(usize),
    Merged {
        leader: usize,
        rest: Vec<usize>,
        /// Combined encoded width of all members.
        width: usize,
    },
}

impl PlanStep {
    /// The first field of the step.
    #[must_use]
    pub const fn leader(&self) -> usize {
        match self {
            Self::Single(index) | Self::Merged { leader: index, .. } => *index,
        }
    }

    /// All field indices of the step in wire order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        let (leader, rest): (usize, &[usize]) = match self {
            Self::Single(index) => (*index, &[]),
            Self::Merged { leader, rest, .. } => (*leader, rest),
        };
        std::iter::once(leader).chain(rest.iter().copied())
    }
}

/// Where a layout sits, which decides the flags it may carry.
#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    Packet,
    Nested,
    Looping(&'a str),
}

/// An ordered field list plus its parsing plan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    fields: Vec<FieldDef>,
    plan: Vec<PlanStep>,
    version_field: Option<usize>,
    continue_flag: Option<usize>,
    prepared: bool,
}

impl Layout {
    /// Wraps fields without preparing them.
    #[must_use]
    pub(crate) const fn declared(fields: Vec<FieldDef>) -> Self {
        Self {
            fields,
            plan: Vec::new(),
            version_field: None,
            continue_flag: None,
            prepared: false,
        }
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// The parsing plan in wire order. Empty until prepared.
    ///
    /// A looping layout's continuation flag is not part of the plan.
    #[must_use]
    pub fn plan(&self) -> &[PlanStep] {
        &self.plan
    }

    #[must_use]
    pub const fn is_prepared(&self) -> bool {
        self.prepared
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Index of the version identifier field.
    #[must_use]
    pub const fn version_field(&self) -> Option<usize> {
        self.version_field
    }

    /// The continuation flag of a looping layout.
    #[must_use]
    pub fn continue_flag(&self) -> Option<&FieldDef> {
        self.continue_flag.map(|i| &self.fields[i])
    }

    /// Fields in wire order, continuation flag excluded.
    pub fn wire_order(&self) -> impl Iterator<Item = &FieldDef> + '_ {
        self.plan
            .iter()
            .flat_map(PlanStep::indices)
            .map(|i| &self.fields[i])
    }

    /// A record holding every field's default.
    #[must_use]
    pub fn default_record(&self) -> Record {
        default_record(&self.fields)
    }

    /// Validates the packet-level field list and computes plans recursively.
    pub(crate) fn prepare(&mut self, packet: &str) -> SchemaResult<()> {
        self.prepare_in(packet, Scope::Packet)
    }

    fn prepare_in(&mut self, packet: &str, scope: Scope<'_>) -> SchemaResult<()> {
        let err_field = |field: &str| (packet.to_owned(), field.to_owned());

        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                let (packet, field) = err_field(&field.name);
                return Err(SchemaError::DuplicateFieldName { packet, field });
            }
        }

        self.version_field = None;
        self.continue_flag = None;
        let mut version_name: Option<String> = None;
        for (index, field) in self.fields.iter_mut().enumerate() {
            if field.is_version_identifier {
                let unsigned = matches!(&field.kind, FieldKind::Int(kind) if !kind.is_signed());
                if !matches!(scope, Scope::Packet) || !unsigned {
                    let (packet, field) = err_field(&field.name);
                    return Err(SchemaError::InvalidVersionIdentifier { packet, field });
                }
                if let Some(first) = version_name.take() {
                    return Err(SchemaError::MultipleVersionIdentifiers {
                        packet: packet.to_owned(),
                        first,
                        second: field.name.clone(),
                    });
                }
                version_name = Some(field.name.clone());
                self.version_field = Some(index);
            }
            if field.is_continue_flag {
                let Scope::Looping(owner) = scope else {
                    let (packet, field) = err_field(&field.name);
                    return Err(SchemaError::InvalidContinueFlag { packet, field });
                };
                if field.kind != FieldKind::Bool {
                    let (packet, field) = err_field(&field.name);
                    return Err(SchemaError::InvalidContinueFlag { packet, field });
                }
                if self.continue_flag.is_some() {
                    let (packet, field) = err_field(owner);
                    return Err(SchemaError::MultipleContinueFlags { packet, field });
                }
                self.continue_flag = Some(index);
            }
            prepare_field(packet, field)?;
        }

        if let Scope::Looping(owner) = scope {
            if self.continue_flag.is_none() {
                let (packet, field) = err_field(owner);
                return Err(SchemaError::MissingContinueFlag { packet, field });
            }
        }

        self.plan = build_plan(&self.fields, self.continue_flag);
        self.prepared = true;
        Ok(())
    }
}

fn prepare_field(packet: &str, field: &mut FieldDef) -> SchemaResult<()> {
    let name = field.name.clone();
    let err = || (packet.to_owned(), name.clone());
    match &mut field.kind {
        FieldKind::Str {
            trim_length: Some(0),
        } => {
            let (packet, field) = err();
            Err(SchemaError::InvalidTrimLength { packet, field })
        }
        FieldKind::Json { max_length: 0 } => {
            let (packet, field) = err();
            Err(SchemaError::InvalidJsonLimit { packet, field })
        }
        FieldKind::Repeating { count, layout } => {
            if matches!(count, RepeatCount::Prefixed(kind) if kind.is_signed()) {
                let (packet, field) = err();
                return Err(SchemaError::InvalidRepeatCount { packet, field });
            }
            prepare_nested(packet, &name, layout, Scope::Nested)
        }
        FieldKind::Grouped {
            layout,
            expect_count,
        } => {
            if let Some(expected) = *expect_count {
                if expected != layout.fields.len() {
                    let (packet, field) = err();
                    return Err(SchemaError::GroupCountMismatch {
                        packet,
                        field,
                        expected,
                        actual: layout.fields.len(),
                    });
                }
            }
            prepare_nested(packet, &name, layout, Scope::Nested)
        }
        FieldKind::Looping { layout } => {
            prepare_nested(packet, &name, layout, Scope::Looping(&name))
        }
        _ => Ok(()),
    }
}

fn prepare_nested(
    packet: &str,
    name: &str,
    layout: &mut Layout,
    scope: Scope<'_>,
) -> SchemaResult<()> {
    if layout.fields.is_empty() {
        return Err(SchemaError::EmptyAggregate {
            packet: packet.to_owned(),
            field: name.to_owned(),
        });
    }
    layout.prepare_in(packet, scope)
}

/// Sorts fields by ordering (stable) and groups mergeable neighbours.
///
/// Fixed-width fields merge with the previous step when they share its
/// `required_version`. A field that some later-declared field sorts ahead of
/// is out of declaration order and always stands alone. The version
/// identifier ends its group so the fields after it see the new version.
fn build_plan(fields: &[FieldDef], skip: Option<usize>) -> Vec<PlanStep> {
    let mut order: Vec<usize> = (0..fields.len()).filter(|i| Some(*i) != skip).collect();
    order.sort_by_key(|&i| fields[i].ordering);

    let mut position = vec![0usize; fields.len()];
    for (pos, &index) in order.iter().enumerate() {
        position[index] = pos;
    }
    // A field pushed past every field declared after it stays on its own.
    let mut displaced = vec![false; fields.len()];
    let mut max_after = None;
    for index in (0..fields.len()).rev() {
        if Some(index) == skip {
            continue;
        }
        displaced[index] = max_after.is_some_and(|after| after < position[index]);
        max_after = max_after.max(Some(position[index]));
    }

    let mut plan = Vec::new();
    let mut group: Vec<usize> = Vec::new();
    for index in order {
        let field = &fields[index];
        let mergeable = field.kind.fixed_width().is_some() && !displaced[index];
        let joins = mergeable
            && group
                .last()
                .is_some_and(|&prev| fields[prev].required_version == field.required_version);
        if !joins {
            flush_group(fields, &mut group, &mut plan);
        }
        if mergeable {
            group.push(index);
        } else {
            plan.push(PlanStep::Single(index));
        }
        if field.is_version_identifier {
            flush_group(fields, &mut group, &mut plan);
        }
    }
    flush_group(fields, &mut group, &mut plan);
    plan
}

fn flush_group(fields: &[FieldDef], group: &mut Vec<usize>, plan: &mut Vec<PlanStep>) {
    match group.len() {
        0 => {}
        1 => plan.push(PlanStep::Single(group[0])),
        _ => {
            let width = group
                .iter()
                .filter_map(|&i| fields[i].kind.fixed_width())
                .sum();
            plan.push(PlanStep::Merged {
                leader: group[0],
                rest: group[1..].to_vec(),
                width,
            });
        }
    }
    group.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(fields: Vec<FieldDef>) -> Layout {
        let mut layout = Layout::declared(fields);
        layout.prepare("Test").unwrap();
        layout
    }

    fn names(layout: &Layout, step: &PlanStep) -> Vec<String> {
        step.indices()
            .map(|i| layout.fields()[i].name.clone())
            .collect()
    }

    #[test]
    fn out_of_order_field_is_isolated() {
        let layout = prepared(vec![
            FieldDef::u16("testa"),
            FieldDef::u32("testb"),
            FieldDef::u16("testc").ordering(100),
            FieldDef::i16("testd"),
        ]);
        let plan = layout.plan();
        assert_eq!(plan.len(), 2);
        assert_eq!(names(&layout, &plan[0]), vec!["testa", "testb", "testd"]);
        assert!(matches!(plan[0], PlanStep::Merged { width: 8, .. }));
        assert_eq!(plan[1], PlanStep::Single(2));
    }

    #[test]
    fn reordered_run_still_merges() {
        let layout = prepared(vec![
            FieldDef::u8("a").ordering(2),
            FieldDef::u8("b").ordering(1),
            FieldDef::u8("c").ordering(3),
        ]);
        let plan = layout.plan();
        assert_eq!(plan.len(), 1);
        assert_eq!(names(&layout, &plan[0]), vec!["b", "a", "c"]);
        assert!(matches!(plan[0], PlanStep::Merged { width: 3, .. }));
    }

    #[test]
    fn field_moved_to_tail_is_isolated() {
        let layout = prepared(vec![
            FieldDef::u8("a").ordering(9),
            FieldDef::u8("b"),
            FieldDef::u8("c"),
        ]);
        let plan = layout.plan();
        assert_eq!(names(&layout, &plan[0]), vec!["b", "c"]);
        assert_eq!(plan[1], PlanStep::Single(0));
    }

    #[test]
    fn version_boundary_splits_group() {
        let layout = prepared(vec![
            FieldDef::u8("a"),
            FieldDef::u8("b"),
            FieldDef::u8("c").since(2),
            FieldDef::u8("d").since(2),
        ]);
        let plan = layout.plan();
        assert_eq!(plan.len(), 2);
        assert_eq!(names(&layout, &plan[0]), vec!["a", "b"]);
        assert_eq!(names(&layout, &plan[1]), vec!["c", "d"]);
    }

    #[test]
    fn strings_never_merge() {
        let layout = prepared(vec![
            FieldDef::u8("a"),
            FieldDef::string("s"),
            FieldDef::u8("b"),
            FieldDef::bool("c"),
        ]);
        let plan = layout.plan();
        assert_eq!(
            plan,
            &[
                PlanStep::Single(0),
                PlanStep::Single(1),
                PlanStep::Merged {
                    leader: 2,
                    rest: vec![3],
                    width: 2
                }
            ]
        );
    }

    #[test]
    fn version_identifier_closes_group() {
        let layout = prepared(vec![
            FieldDef::u8("kind"),
            FieldDef::u8("version").version_identifier(),
            FieldDef::u8("after"),
        ]);
        assert_eq!(layout.version_field(), Some(1));
        let plan = layout.plan();
        assert_eq!(names(&layout, &plan[0]), vec!["kind", "version"]);
        assert_eq!(plan[1], PlanStep::Single(2));
    }

    #[test]
    fn ordering_ties_keep_declaration_order() {
        let layout = prepared(vec![
            FieldDef::string("b").ordering(1),
            FieldDef::string("a").ordering(1),
            FieldDef::string("first").ordering(-1),
        ]);
        let order: Vec<&str> = layout.wire_order().map(|f| f.name.as_str()).collect();
        assert_eq!(order, vec!["first", "b", "a"]);
    }

    #[test]
    fn nested_layouts_are_prepared() {
        let layout = prepared(vec![FieldDef::grouped(
            "vehicles",
            vec![FieldDef::u16("train"), FieldDef::u16("bus")],
        )]);
        let nested = layout.fields()[0].kind.layout().unwrap();
        assert!(nested.is_prepared());
        assert_eq!(nested.plan().len(), 1);
    }

    #[test]
    fn looping_plan_excludes_flag() {
        let layout = prepared(vec![FieldDef::looping(
            "settings",
            vec![
                FieldDef::u16("key"),
                FieldDef::u16("value"),
                FieldDef::bool("more").continue_flag(),
            ],
        )]);
        let nested = layout.fields()[0].kind.layout().unwrap();
        assert_eq!(nested.continue_flag().unwrap().name, "more");
        let order: Vec<&str> = nested.wire_order().map(|f| f.name.as_str()).collect();
        assert_eq!(order, vec!["key", "value"]);
    }

    fn prepare_err(fields: Vec<FieldDef>) -> SchemaError {
        Layout::declared(fields).prepare("Test").unwrap_err()
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = prepare_err(vec![FieldDef::u8("a"), FieldDef::u16("a")]);
        assert!(matches!(err, SchemaError::DuplicateFieldName { .. }));
    }

    #[test]
    fn rejects_two_version_identifiers() {
        let err = prepare_err(vec![
            FieldDef::u8("a").version_identifier(),
            FieldDef::u8("b").version_identifier(),
        ]);
        assert!(matches!(err, SchemaError::MultipleVersionIdentifiers { .. }));
    }

    #[test]
    fn rejects_signed_version_identifier() {
        let err = prepare_err(vec![FieldDef::i8("a").version_identifier()]);
        assert!(matches!(err, SchemaError::InvalidVersionIdentifier { .. }));
    }

    #[test]
    fn rejects_nested_version_identifier() {
        let err = prepare_err(vec![FieldDef::grouped(
            "g",
            vec![FieldDef::u8("v").version_identifier()],
        )]);
        assert!(matches!(err, SchemaError::InvalidVersionIdentifier { .. }));
    }

    #[test]
    fn rejects_looping_without_flag() {
        let err = prepare_err(vec![FieldDef::looping("l", vec![FieldDef::u8("v")])]);
        assert_eq!(
            err,
            SchemaError::MissingContinueFlag {
                packet: "Test".into(),
                field: "l".into()
            }
        );
    }

    #[test]
    fn rejects_two_flags() {
        let err = prepare_err(vec![FieldDef::looping(
            "l",
            vec![
                FieldDef::bool("a").continue_flag(),
                FieldDef::bool("b").continue_flag(),
            ],
        )]);
        assert!(matches!(err, SchemaError::MultipleContinueFlags { .. }));
    }

    #[test]
    fn rejects_non_bool_flag_and_stray_flag() {
        let err = prepare_err(vec![FieldDef::looping(
            "l",
            vec![FieldDef::u8("a").continue_flag()],
        )]);
        assert!(matches!(err, SchemaError::InvalidContinueFlag { .. }));
        let err = prepare_err(vec![FieldDef::bool("a").continue_flag()]);
        assert!(matches!(err, SchemaError::InvalidContinueFlag { .. }));
    }

    #[test]
    fn rejects_group_count_mismatch() {
        let err = prepare_err(vec![FieldDef::grouped(
            "vehicles",
            vec![FieldDef::u16("train"), FieldDef::u16("bus")],
        )
        .expect_count(5)]);
        assert_eq!(
            err,
            SchemaError::GroupCountMismatch {
                packet: "Test".into(),
                field: "vehicles".into(),
                expected: 5,
                actual: 2
            }
        );
    }

    #[test]
    fn rejects_bad_kind_parameters() {
        assert!(matches!(
            prepare_err(vec![FieldDef::string("s").trim(0)]),
            SchemaError::InvalidTrimLength { .. }
        ));
        assert!(matches!(
            prepare_err(vec![FieldDef::json("j", 0)]),
            SchemaError::InvalidJsonLimit { .. }
        ));
        assert!(matches!(
            prepare_err(vec![FieldDef::repeating(
                "r",
                RepeatCount::Prefixed(crate::IntKind::I8),
                vec![FieldDef::u8("v")]
            )]),
            SchemaError::InvalidRepeatCount { .. }
        ));
        assert!(matches!(
            prepare_err(vec![FieldDef::grouped("g", Vec::new())]),
            SchemaError::EmptyAggregate { .. }
        ));
    }
}
