//! Objective analytics entry point.

use uuid::Uuid;

use tally_core::analytics::AnalyticsResult;
use tally_core::identity::Scope;

use crate::analytics::aggregate;
use crate::error::DatabaseError;
use crate::service::TallyService;

impl TallyService {
    /// Compute every analytics facet for one objective.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the objective does not exist in
    /// the tenant, or `DatabaseError::Aggregation` if any facet fails.
    pub async fn objective_analytics(
        &self,
        scope: Scope,
        objective_id: Uuid,
    ) -> Result<AnalyticsResult, DatabaseError> {
        self.get_objective(scope, objective_id).await?;
        let started = std::time::Instant::now();
        let result = aggregate(self.db(), objective_id, scope.tenant_id).await?;
        tracing::debug!(
            %objective_id,
            elapsed_ms = started.elapsed().as_millis(),
            "analytics computed"
        );
        Ok(result)
    }
}
