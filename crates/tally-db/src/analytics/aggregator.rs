//! Concurrent facet fan-out.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use futures::future::join_all;
use uuid::Uuid;

use tally_core::analytics::{AnalyticsParts, AnalyticsResult, Facet};

use super::FacetSource;
use crate::error::DatabaseError;

/// Run `task` for every item concurrently and wait for all of them.
///
/// The futures are polled together on the calling task: waits overlap, but
/// nothing runs in parallel on another worker. Local libSQL calls are
/// synchronous once polled, so facets over the local database interleave
/// at await points rather than execute side by side.
///
/// No task is cancelled when a sibling fails. Dropping the returned future
/// drops every task still in flight.
pub async fn fan_out<T, F, Fut>(items: impl IntoIterator<Item = T>, task: F)
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = ()>,
{
    join_all(items.into_iter().map(task)).await;
}

#[derive(Default)]
struct Shared {
    parts: AnalyticsParts,
    error: Option<(Facet, DatabaseError)>,
}

/// Compute every facet of one objective.
///
/// All facets run to completion. If any of them failed, the first error
/// observed is returned and every partial result is discarded.
///
/// # Errors
///
/// Returns `DatabaseError::Aggregation` wrapping the first facet error, or
/// `DatabaseError::InvalidState` if a facet never filled its slot.
pub async fn aggregate<S: FacetSource>(
    source: &S,
    objective_id: Uuid,
    tenant_id: Uuid,
) -> Result<AnalyticsResult, DatabaseError> {
    let shared = Mutex::new(Shared::default());

    fan_out(Facet::ALL, |facet| {
        let shared = &shared;
        async move {
            let outcome = source.run(facet, objective_id, tenant_id).await;
            let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
            match outcome {
                Ok(output) => guard.parts.fill(output),
                Err(error) => {
                    tracing::warn!(%objective_id, %facet, %error, "analytics facet failed");
                    if guard.error.is_none() {
                        guard.error = Some((facet, error));
                    }
                }
            }
        }
    })
    .await;

    let Shared { parts, error } = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
    if let Some((facet, source)) = error {
        return Err(DatabaseError::Aggregation {
            facet,
            source: Box::new(source),
        });
    }

    let missing = parts.missing();
    parts.finish(objective_id).ok_or_else(|| {
        DatabaseError::InvalidState(format!("analytics facets never reported: {missing:?}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tally_core::analytics::{FacetOutput, PriorityCount};
    use tally_core::enums::Priority;

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Per-facet delay and outcome.
    #[derive(Default)]
    struct ScriptedSource {
        plan: HashMap<Facet, (u64, bool)>,
        completed: Arc<AtomicUsize>,
        dropped: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn with(mut self, facet: Facet, delay_ms: u64, fail: bool) -> Self {
            self.plan.insert(facet, (delay_ms, fail));
            self
        }
    }

    fn empty_output(facet: Facet) -> FacetOutput {
        match facet {
            Facet::Priority => FacetOutput::Priority(vec![PriorityCount {
                priority: Priority::High,
                count: 2,
            }]),
            Facet::Progress => FacetOutput::Progress(Vec::new()),
            Facet::TeamAllocation => FacetOutput::TeamAllocation(Vec::new()),
            Facet::Timeline => FacetOutput::Timeline(Vec::new()),
        }
    }

    impl FacetSource for ScriptedSource {
        async fn run(
            &self,
            facet: Facet,
            _objective_id: Uuid,
            _tenant_id: Uuid,
        ) -> Result<FacetOutput, DatabaseError> {
            let _guard = DropCounter(Arc::clone(&self.dropped));
            let (delay, fail) = self.plan.get(&facet).copied().unwrap_or((0, false));
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            if fail {
                return Err(DatabaseError::Query(format!("{facet} exploded")));
            }
            Ok(empty_output(facet))
        }
    }

    #[tokio::test]
    async fn all_facets_succeed() {
        let source = ScriptedSource::default();
        let objective_id = Uuid::new_v4();

        let result = aggregate(&source, objective_id, Uuid::new_v4()).await.unwrap();

        assert_eq!(result.objective_id, objective_id);
        assert_eq!(result.priority.len(), 1);
        assert_eq!(source.completed.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn one_failure_discards_everything() {
        let source = ScriptedSource::default().with(Facet::Progress, 0, true);

        let err = aggregate(&source, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();

        match err {
            DatabaseError::Aggregation { facet, source } => {
                assert_eq!(facet, Facet::Progress);
                assert!(source.to_string().contains("progress exploded"));
            }
            other => panic!("expected Aggregation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn siblings_finish_after_early_failure() {
        let source = ScriptedSource::default()
            .with(Facet::Priority, 0, true)
            .with(Facet::Timeline, 60, false)
            .with(Facet::TeamAllocation, 30, false);

        let err = aggregate(&source, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, DatabaseError::Aggregation { facet: Facet::Priority, .. }));
        assert_eq!(source.completed.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn facet_waits_overlap() {
        let source = Facet::ALL
            .into_iter()
            .fold(ScriptedSource::default(), |source, facet| source.with(facet, 150, false));

        let started = std::time::Instant::now();
        aggregate(&source, Uuid::new_v4(), Uuid::new_v4()).await.unwrap();

        // Sequential polling would take at least 600ms.
        assert!(started.elapsed() < Duration::from_millis(450), "{:?}", started.elapsed());
        assert_eq!(source.completed.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn late_failure_still_fails_the_whole() {
        let source = ScriptedSource::default().with(Facet::Timeline, 50, true);

        let err = aggregate(&source, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, DatabaseError::Aggregation { facet: Facet::Timeline, .. }));
        assert_eq!(source.completed.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn first_observed_error_wins() {
        let source = ScriptedSource::default()
            .with(Facet::TeamAllocation, 0, true)
            .with(Facet::Priority, 80, true);

        let err = aggregate(&source, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DatabaseError::Aggregation { facet: Facet::TeamAllocation, .. }
        ));
    }

    #[tokio::test]
    async fn dropping_the_call_drops_every_facet() {
        let source = ScriptedSource::default()
            .with(Facet::Priority, 5_000, false)
            .with(Facet::Progress, 5_000, false)
            .with(Facet::TeamAllocation, 5_000, false)
            .with(Facet::Timeline, 5_000, false);

        let outcome = tokio::time::timeout(
            Duration::from_millis(20),
            aggregate(&source, Uuid::new_v4(), Uuid::new_v4()),
        )
        .await;

        assert!(outcome.is_err(), "aggregate should have timed out");
        assert_eq!(source.completed.load(Ordering::SeqCst), 0);
        assert_eq!(source.dropped.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn fan_out_runs_every_item() {
        let seen = Mutex::new(Vec::new());
        fan_out([3, 1, 2], |n| {
            let seen = &seen;
            async move {
                tokio::time::sleep(Duration::from_millis(n * 5)).await;
                seen.lock().unwrap().push(n);
            }
        })
        .await;
        assert_eq!(*seen.lock().unwrap(), [1, 2, 3]);
    }
}
