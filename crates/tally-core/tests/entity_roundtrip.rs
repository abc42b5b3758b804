//! Serde roundtrip and JsonSchema validation tests for public entity types.

use chrono::{NaiveDate, Utc};
use schemars::schema_for;
use tally_core::analytics::*;
use tally_core::entities::*;
use tally_core::enums::*;
use uuid::Uuid;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

roundtrip_and_validate!(
    objective_roundtrip,
    Objective,
    Objective {
        id: Uuid::new_v4(),
        tenant_id: Uuid::new_v4(),
        name: "Ship the mobile app".into(),
        description: String::new(),
        status: ObjectiveStatus::Active,
        lead_id: Some(Uuid::new_v4()),
        team_id: None,
        start_date: Some(Utc::now()),
        target_date: None,
        created_by: Uuid::new_v4(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    key_result_roundtrip,
    KeyResult,
    KeyResult {
        id: Uuid::new_v4(),
        tenant_id: Uuid::new_v4(),
        objective_id: Uuid::new_v4(),
        name: "Weekly active users".into(),
        description: "Measured from product analytics".into(),
        priority: Priority::High,
        unit: "users".into(),
        start_value: 1_000.0,
        target_value: 5_000.0,
        current_value: 2_250.5,
        lead_id: None,
        team_id: Some(Uuid::new_v4()),
        due_date: Some(Utc::now()),
        contributors: vec![Uuid::new_v4(), Uuid::new_v4()],
        created_by: Uuid::new_v4(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    audit_event_roundtrip,
    AuditEvent,
    AuditEvent {
        id: Uuid::new_v4(),
        entity_id: Uuid::new_v4(),
        actor_id: Uuid::new_v4(),
        kind: AuditKind::Update,
        relation_kind: RelationKind::KeyResult,
        field: "targetValue".into(),
        rendered_value: "20.00".into(),
        comment: "adjusted scope".into(),
        tenant_id: Uuid::new_v4(),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    analytics_result_roundtrip,
    AnalyticsResult,
    AnalyticsResult {
        objective_id: Uuid::new_v4(),
        priority: vec![PriorityCount {
            priority: Priority::Urgent,
            count: 3,
        }],
        progress: vec![ProgressCount {
            bucket: ProgressBucket::OnTrack,
            count: 2,
        }],
        team_allocation: vec![TeamAllocation {
            team_id: None,
            key_results: 1,
        }],
        timeline: vec![TimelinePoint {
            day: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            updates: 4,
            mean_value: 42.5,
        }],
    }
);

#[test]
fn new_key_result_defaults() {
    let parsed: NewKeyResult = serde_json::from_value(serde_json::json!({
        "objectiveId": Uuid::nil(),
        "name": "Latency p99",
        "targetValue": 200.0
    }))
    .unwrap();
    assert_eq!(parsed.start_value, 0.0);
    assert!(parsed.contributors.is_empty());
    assert!(parsed.priority.is_none());
}
