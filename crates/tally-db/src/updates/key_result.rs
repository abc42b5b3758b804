//! Key result update builder.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use tally_core::enums::{Priority, RelationKind};
use tally_core::field::Field;
use tally_core::proposed::ProposedUpdate;
use tally_core::value::FieldValue;

pub struct KeyResultUpdateBuilder(ProposedUpdate);

impl KeyResultUpdateBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self(ProposedUpdate::new(RelationKind::KeyResult))
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.set(Field::Name, name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.0.set(Field::Description, description.into());
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.0.set(Field::Priority, priority.as_str());
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.0.set(Field::Unit, unit.into());
        self
    }

    #[must_use]
    pub fn start_value(mut self, value: f64) -> Self {
        self.0.set(Field::StartValue, value);
        self
    }

    #[must_use]
    pub fn target_value(mut self, value: f64) -> Self {
        self.0.set(Field::TargetValue, value);
        self
    }

    #[must_use]
    pub fn current_value(mut self, value: f64) -> Self {
        self.0.set(Field::CurrentValue, value);
        self
    }

    #[must_use]
    pub fn lead_id(mut self, lead_id: Option<Uuid>) -> Self {
        self.0.set(Field::LeadId, lead_id);
        self
    }

    #[must_use]
    pub fn team_id(mut self, team_id: Option<Uuid>) -> Self {
        self.0.set(Field::TeamId, team_id);
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.0.set(Field::DueDate, due_date);
        self
    }

    /// Replace the contributor set. An empty list clears it.
    #[must_use]
    pub fn contributors(mut self, contributors: Vec<Uuid>) -> Self {
        self.0
            .set(Field::Contributors, FieldValue::ReferenceSet(contributors));
        self
    }

    #[must_use]
    pub fn build(self) -> ProposedUpdate {
        self.0
    }
}

impl Default for KeyResultUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
