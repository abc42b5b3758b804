//! Partial updates proposed by a caller.

use std::collections::BTreeMap;

use crate::enums::RelationKind;
use crate::field::{Field, FieldName};
use crate::value::FieldValue;

/// A partial update for one entity, keyed by field name.
///
/// Iteration is ordered by wire field name. Names are never validated
/// here; unknown ones are carried through to the diff engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedUpdate {
    relation: RelationKind,
    fields: BTreeMap<FieldName, FieldValue>,
}

impl ProposedUpdate {
    #[must_use]
    pub const fn new(relation: RelationKind) -> Self {
        Self {
            relation,
            fields: BTreeMap::new(),
        }
    }

    /// Build from a decoded JSON request body.
    ///
    /// Known fields are converted by kind (see [`FieldValue::from_json`]);
    /// unknown names keep their raw JSON value.
    #[must_use]
    pub fn from_json(
        relation: RelationKind,
        body: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let fields = body
            .into_iter()
            .map(|(name, value)| {
                let name = FieldName::parse(&name);
                let value = match name.known() {
                    Some(field) => FieldValue::from_json(field.kind(), value),
                    None => FieldValue::Raw(value),
                };
                (name, value)
            })
            .collect();
        Self { relation, fields }
    }

    /// Set one field, replacing any earlier value for the same name.
    pub fn set(&mut self, name: impl Into<FieldName>, value: impl Into<FieldValue>) -> &mut Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<FieldName>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub const fn relation(&self) -> RelationKind {
        self.relation
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&FieldName::Known(field))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &FieldValue)> {
        self.fields.iter()
    }

    /// Consume into the ordered field map.
    #[must_use]
    pub fn into_fields(self) -> BTreeMap<FieldName, FieldValue> {
        self.fields
    }
}
