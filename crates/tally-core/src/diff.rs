//! Field-diff engine.
//!
//! Compares a [`ProposedUpdate`] against the persisted state of an entity
//! and keeps only the fields whose value would actually change. Each field
//! kind has its own comparator; optional values follow the nil-aware rule
//! (`nil == nil`, `nil != value`, otherwise compare the values).
//!
//! Contributors are split off before scalar diffing and compared as sets.

use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use crate::enums::RelationKind;
use crate::field::{Field, FieldKind, FieldName};
use crate::proposed::ProposedUpdate;
use crate::value::FieldValue;

/// Read access to the persisted state of a mutable entity.
pub trait Snapshot {
    /// The entity kind this snapshot belongs to.
    const RELATION: RelationKind;

    /// Current value of `field`, or `None` if the entity has no such field.
    fn value_of(&self, field: Field) -> Option<FieldValue>;
}

/// What to do with a proposed field the engine cannot compare: an unknown
/// name, a field the entity does not have, or a value of the wrong kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    /// Report it as changed, so it reaches validation instead of vanishing.
    FailOpen,
    /// Drop it from the result.
    Ignore,
}

/// Policy used by [`diff`].
pub const UNKNOWN_FIELD_POLICY: UnknownFieldPolicy = UnknownFieldPolicy::FailOpen;

/// Result of diffing a proposed update against a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDiff {
    /// Changed scalar fields, ordered by wire name.
    pub fields: BTreeMap<FieldName, FieldValue>,
    /// The new contributor set, present only when membership changed.
    pub contributors: Option<Vec<Uuid>>,
}

impl FieldDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.contributors.is_none()
    }

    /// Wire names of everything that changed, in audit order.
    #[must_use]
    pub fn changed_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fields.keys().map(|n| n.as_str().to_string()).collect();
        if self.contributors.is_some() {
            names.push(Field::Contributors.as_str().to_string());
            names.sort();
        }
        names
    }
}

/// Diff `proposed` against `snapshot` with [`UNKNOWN_FIELD_POLICY`].
#[must_use]
pub fn diff<S: Snapshot>(proposed: &ProposedUpdate, snapshot: &S) -> FieldDiff {
    diff_with_policy(proposed, snapshot, UNKNOWN_FIELD_POLICY)
}

/// Diff `proposed` against `snapshot` with an explicit policy for fields
/// that cannot be compared.
#[must_use]
pub fn diff_with_policy<S: Snapshot>(
    proposed: &ProposedUpdate,
    snapshot: &S,
    policy: UnknownFieldPolicy,
) -> FieldDiff {
    let mut out = FieldDiff::default();
    let mut remaining: BTreeMap<FieldName, FieldValue> = proposed
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let contributors_key = FieldName::Known(Field::Contributors);
    if let Some(value) = remaining.remove(&contributors_key) {
        match (&value, snapshot.value_of(Field::Contributors)) {
            (FieldValue::ReferenceSet(next), Some(FieldValue::ReferenceSet(current))) => {
                if !same_members(next, &current) {
                    out.contributors = Some(dedup_preserving_order(next));
                }
            }
            _ => record_uncomparable(&mut out, policy, contributors_key, value),
        }
    }

    for (name, value) in remaining {
        let current = name.known().and_then(|field| snapshot.value_of(field));
        let (Some(field), Some(current)) = (name.known(), current) else {
            record_uncomparable(&mut out, policy, name, value);
            continue;
        };
        match comparator_for(field.kind())(&value, &current) {
            Some(true) => {}
            Some(false) => {
                out.fields.insert(name, value);
            }
            None => record_uncomparable(&mut out, policy, name, value),
        }
    }

    out
}

fn record_uncomparable(
    out: &mut FieldDiff,
    policy: UnknownFieldPolicy,
    name: FieldName,
    value: FieldValue,
) {
    match policy {
        UnknownFieldPolicy::FailOpen => {
            out.fields.insert(name, value);
        }
        UnknownFieldPolicy::Ignore => {}
    }
}

/// Returns `Some(equal)` when both values have the comparator's kind, and
/// `None` on a kind mismatch.
type Comparator = fn(&FieldValue, &FieldValue) -> Option<bool>;

const fn comparator_for(kind: FieldKind) -> Comparator {
    match kind {
        FieldKind::Text => text_eq,
        FieldKind::Number => number_eq,
        FieldKind::Timestamp => timestamp_eq,
        FieldKind::Reference => reference_eq,
        FieldKind::ReferenceSet => reference_set_eq,
    }
}

fn text_eq(proposed: &FieldValue, current: &FieldValue) -> Option<bool> {
    match (proposed, current) {
        (FieldValue::Text(a), FieldValue::Text(b)) => Some(a == b),
        _ => None,
    }
}

#[allow(clippy::float_cmp)]
fn number_eq(proposed: &FieldValue, current: &FieldValue) -> Option<bool> {
    match (proposed, current) {
        (FieldValue::Number(a), FieldValue::Number(b)) => Some(a == b),
        _ => None,
    }
}

/// `DateTime<Utc>` equality is instant equality; offsets were normalized
/// when the value was parsed.
fn timestamp_eq(proposed: &FieldValue, current: &FieldValue) -> Option<bool> {
    match (proposed, current) {
        (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(nil_aware_eq(a.as_ref(), b.as_ref())),
        _ => None,
    }
}

fn reference_eq(proposed: &FieldValue, current: &FieldValue) -> Option<bool> {
    match (proposed, current) {
        (FieldValue::Reference(a), FieldValue::Reference(b)) => Some(nil_aware_eq(a.as_ref(), b.as_ref())),
        _ => None,
    }
}

fn reference_set_eq(proposed: &FieldValue, current: &FieldValue) -> Option<bool> {
    match (proposed, current) {
        (FieldValue::ReferenceSet(a), FieldValue::ReferenceSet(b)) => Some(same_members(a, b)),
        _ => None,
    }
}

fn nil_aware_eq<T: PartialEq>(a: Option<&T>, b: Option<&T>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn same_members(a: &[Uuid], b: &[Uuid]) -> bool {
    a.iter().collect::<HashSet<_>>() == b.iter().collect::<HashSet<_>>()
}

fn dedup_preserving_order(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
