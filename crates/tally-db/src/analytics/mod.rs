//! Objective analytics.
//!
//! Each [`Facet`] is an independent read-only query over one objective's
//! key results. [`aggregate`] runs them concurrently and assembles an
//! [`AnalyticsResult`](tally_core::analytics::AnalyticsResult), or fails
//! as a whole.

mod aggregator;

pub use aggregator::{aggregate, fan_out};

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use tally_core::analytics::{
    Facet, FacetOutput, PriorityCount, ProgressCount, TeamAllocation, TimelinePoint,
};
use tally_core::enums::{AuditKind, Priority, ProgressBucket};
use tally_core::field::Field;

use crate::TallyDb;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_enum, parse_optional_uuid};

/// Something that can compute a single facet.
pub trait FacetSource: Sync {
    fn run(
        &self,
        facet: Facet,
        objective_id: Uuid,
        tenant_id: Uuid,
    ) -> impl Future<Output = Result<FacetOutput, DatabaseError>> + Send;
}

impl FacetSource for TallyDb {
    async fn run(
        &self,
        facet: Facet,
        objective_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<FacetOutput, DatabaseError> {
        let (objective_id, tenant_id) = (objective_id.to_string(), tenant_id.to_string());
        match facet {
            Facet::Priority => self
                .priority_facet(&objective_id, &tenant_id)
                .await
                .map(FacetOutput::Priority),
            Facet::Progress => self
                .progress_facet(&objective_id, &tenant_id)
                .await
                .map(FacetOutput::Progress),
            Facet::TeamAllocation => self
                .team_allocation_facet(&objective_id, &tenant_id)
                .await
                .map(FacetOutput::TeamAllocation),
            Facet::Timeline => self
                .timeline_facet(&objective_id, &tenant_id)
                .await
                .map(FacetOutput::Timeline),
        }
    }
}

fn count(value: i64) -> Result<u32, DatabaseError> {
    u32::try_from(value).map_err(|_| DatabaseError::Query(format!("count out of range: {value}")))
}

impl TallyDb {
    /// Key results per priority, every priority present (zero-filled).
    async fn priority_facet(
        &self,
        objective_id: &str,
        tenant_id: &str,
    ) -> Result<Vec<PriorityCount>, DatabaseError> {
        let reader = self.reader().await;
        let mut rows = reader
            .query(
                "SELECT priority, COUNT(*) FROM key_results
                 WHERE objective_id = ?1 AND tenant_id = ?2
                 GROUP BY priority",
                [objective_id, tenant_id],
            )
            .await?;

        let mut counts: Vec<PriorityCount> = Priority::ALL
            .into_iter()
            .map(|priority| PriorityCount { priority, count: 0 })
            .collect();
        while let Some(row) = rows.next().await? {
            let priority: Priority = parse_enum(&row.get::<String>(0)?)?;
            let n = count(row.get::<i64>(1)?)?;
            if let Some(slot) = counts.iter_mut().find(|c| c.priority == priority) {
                slot.count = n;
            }
        }
        Ok(counts)
    }

    /// Key results per progress bucket, every bucket present.
    async fn progress_facet(
        &self,
        objective_id: &str,
        tenant_id: &str,
    ) -> Result<Vec<ProgressCount>, DatabaseError> {
        let reader = self.reader().await;
        let mut rows = reader
            .query(
                "SELECT start_value, target_value, current_value FROM key_results
                 WHERE objective_id = ?1 AND tenant_id = ?2",
                [objective_id, tenant_id],
            )
            .await?;

        let mut counts: Vec<ProgressCount> = ProgressBucket::ALL
            .into_iter()
            .map(|bucket| ProgressCount { bucket, count: 0 })
            .collect();
        while let Some(row) = rows.next().await? {
            let bucket = ProgressBucket::classify(
                row.get::<f64>(0)?,
                row.get::<f64>(1)?,
                row.get::<f64>(2)?,
            );
            if let Some(slot) = counts.iter_mut().find(|c| c.bucket == bucket) {
                slot.count += 1;
            }
        }
        Ok(counts)
    }

    /// Key results per team, largest first. Unassigned is `team_id: None`.
    async fn team_allocation_facet(
        &self,
        objective_id: &str,
        tenant_id: &str,
    ) -> Result<Vec<TeamAllocation>, DatabaseError> {
        let reader = self.reader().await;
        let mut rows = reader
            .query(
                "SELECT team_id, COUNT(*) AS n FROM key_results
                 WHERE objective_id = ?1 AND tenant_id = ?2
                 GROUP BY team_id
                 ORDER BY n DESC, team_id",
                [objective_id, tenant_id],
            )
            .await?;

        let mut allocations = Vec::new();
        while let Some(row) = rows.next().await? {
            allocations.push(TeamAllocation {
                team_id: parse_optional_uuid(get_opt_string(&row, 0)?.as_deref())?,
                key_results: count(row.get::<i64>(1)?)?,
            });
        }
        Ok(allocations)
    }

    /// Daily mean of recorded `currentValue` updates across the objective's
    /// key results, oldest day first.
    async fn timeline_facet(
        &self,
        objective_id: &str,
        tenant_id: &str,
    ) -> Result<Vec<TimelinePoint>, DatabaseError> {
        let reader = self.reader().await;
        let mut rows = reader
            .query(
                "SELECT substr(a.created_at, 1, 10) AS day,
                        COUNT(*),
                        AVG(CAST(a.rendered_value AS REAL))
                 FROM audit_events a
                 JOIN key_results k ON k.id = a.entity_id
                 WHERE k.objective_id = ?1 AND k.tenant_id = ?2
                   AND a.tenant_id = ?2 AND a.kind = ?3 AND a.field = ?4
                 GROUP BY day
                 ORDER BY day",
                [
                    objective_id,
                    tenant_id,
                    AuditKind::Update.as_str(),
                    Field::CurrentValue.as_str(),
                ],
            )
            .await?;

        let mut points = Vec::new();
        while let Some(row) = rows.next().await? {
            let day: String = row.get(0)?;
            points.push(TimelinePoint {
                day: NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .map_err(|e| DatabaseError::Query(format!("Invalid day '{day}': {e}")))?,
                updates: count(row.get::<i64>(1)?)?,
                mean_value: row.get::<f64>(2)?,
            });
        }
        Ok(points)
    }
}
