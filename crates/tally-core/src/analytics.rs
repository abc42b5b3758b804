//! Analytics result types and the facet model.
//!
//! An [`AnalyticsResult`] is assembled per request from independent
//! facets. [`AnalyticsParts`] is the partially filled form the aggregator
//! writes into while facets are still running.

use std::fmt;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{Priority, ProgressBucket};

/// One independently computed part of an [`AnalyticsResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Priority,
    Progress,
    TeamAllocation,
    Timeline,
}

impl Facet {
    pub const ALL: [Self; 4] = [
        Self::Priority,
        Self::Progress,
        Self::TeamAllocation,
        Self::Timeline,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Progress => "progress",
            Self::TeamAllocation => "team_allocation",
            Self::Timeline => "timeline",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCount {
    pub bucket: ProgressBucket,
    pub count: u32,
}

/// Key results assigned to one team (`None` = unassigned).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamAllocation {
    pub team_id: Option<Uuid>,
    pub key_results: u32,
}

/// Daily roll-up of recorded `currentValue` changes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub day: NaiveDate,
    pub updates: u32,
    pub mean_value: f64,
}

/// Output of a single facet query.
#[derive(Debug, Clone, PartialEq)]
pub enum FacetOutput {
    Priority(Vec<PriorityCount>),
    Progress(Vec<ProgressCount>),
    TeamAllocation(Vec<TeamAllocation>),
    Timeline(Vec<TimelinePoint>),
}

impl FacetOutput {
    #[must_use]
    pub const fn facet(&self) -> Facet {
        match self {
            Self::Priority(_) => Facet::Priority,
            Self::Progress(_) => Facet::Progress,
            Self::TeamAllocation(_) => Facet::TeamAllocation,
            Self::Timeline(_) => Facet::Timeline,
        }
    }
}

/// Read-only statistics for one objective.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub objective_id: Uuid,
    pub priority: Vec<PriorityCount>,
    pub progress: Vec<ProgressCount>,
    pub team_allocation: Vec<TeamAllocation>,
    pub timeline: Vec<TimelinePoint>,
}

/// Facet slots filled in as results arrive. Each facet owns one slot.
#[derive(Debug, Default)]
pub struct AnalyticsParts {
    priority: Option<Vec<PriorityCount>>,
    progress: Option<Vec<ProgressCount>>,
    team_allocation: Option<Vec<TeamAllocation>>,
    timeline: Option<Vec<TimelinePoint>>,
}

impl AnalyticsParts {
    /// Store a facet's output in its slot.
    pub fn fill(&mut self, output: FacetOutput) {
        match output {
            FacetOutput::Priority(v) => self.priority = Some(v),
            FacetOutput::Progress(v) => self.progress = Some(v),
            FacetOutput::TeamAllocation(v) => self.team_allocation = Some(v),
            FacetOutput::Timeline(v) => self.timeline = Some(v),
        }
    }

    /// Facets whose slot is still empty.
    #[must_use]
    pub fn missing(&self) -> Vec<Facet> {
        Facet::ALL
            .into_iter()
            .filter(|facet| match facet {
                Facet::Priority => self.priority.is_none(),
                Facet::Progress => self.progress.is_none(),
                Facet::TeamAllocation => self.team_allocation.is_none(),
                Facet::Timeline => self.timeline.is_none(),
            })
            .collect()
    }

    /// Assemble the final result, or `None` if any slot is empty.
    #[must_use]
    pub fn finish(self, objective_id: Uuid) -> Option<AnalyticsResult> {
        Some(AnalyticsResult {
            objective_id,
            priority: self.priority?,
            progress: self.progress?,
            team_allocation: self.team_allocation?,
            timeline: self.timeline?,
        })
    }
}
