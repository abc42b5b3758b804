//! Objective update builder.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use tally_core::enums::{ObjectiveStatus, RelationKind};
use tally_core::field::Field;
use tally_core::proposed::ProposedUpdate;

pub struct ObjectiveUpdateBuilder(ProposedUpdate);

impl ObjectiveUpdateBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self(ProposedUpdate::new(RelationKind::Objective))
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
    pub fn status(mut self, status: ObjectiveStatus) -> Self {
        self.0.set(Field::Status, status.as_str());
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
    pub fn start_date(mut self, start_date: Option<DateTime<Utc>>) -> Self {
        self.0.set(Field::StartDate, start_date);
        self
    }

    #[must_use]
    pub fn target_date(mut self, target_date: Option<DateTime<Utc>>) -> Self {
        self.0.set(Field::TargetDate, target_date);
        self
    }

    #[must_use]
    pub fn build(self) -> ProposedUpdate {
        self.0
    }
}

impl Default for ObjectiveUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
