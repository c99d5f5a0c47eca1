//! End-to-end tests for the public signupdb API surface.
//!
//! Exercises the database facade the way an application would: raw store
//! access, queries, and the activity/join services, over both ephemeral and
//! file-backed databases.

use signupdb::prelude::*;
use chrono::{Duration, Utc};
use serde_json::json;
use tempfile::TempDir;

fn new_activity(title: &str, cancel_deadline: Option<chrono::DateTime<Utc>>) -> NewActivity {
    NewActivity {
        title: title.to_string(),
        date: "2025-09-05".to_string(),
        time: "19:00".to_string(),
        location: "Court 3".to_string(),
        rules: "standard rules".to_string(),
        max_count: Some(12),
        cancel_deadline,
    }
}

fn new_join(activity_id: &str, user_id: &str) -> NewJoin {
    NewJoin {
        activity_id: activity_id.to_string(),
        user_id: user_id.to_string(),
        user_name: user_id.to_uppercase(),
        contact: "555-0100".to_string(),
        message: "see you there".to_string(),
    }
}

// ============================================================================
// Database Lifecycle Tests
// ============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn test_open_database() {
        let temp_dir = TempDir::new().unwrap();
        let db = SignupDb::open(temp_dir.path().join("test_db")).unwrap();
        assert!(temp_dir.path().join("test_db").exists());
        drop(db);
    }

    #[test]
    fn test_builder_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let db = SignupDbBuilder::new()
            .path(temp_dir.path().join("builder_db"))
            .open()
            .unwrap();
        assert!(temp_dir.path().join("builder_db").exists());
        drop(db);
    }

    #[test]
    fn test_builder_without_path_fails() {
        assert!(SignupDbBuilder::new().open().is_err());
    }

    #[test]
    fn test_ephemeral_database() {
        let db = SignupDb::ephemeral();
        db.store()
            .put("col", "x", fields_from_json(json!({ "a": 1 })))
            .unwrap();
        assert!(db.store().get("col", "x").is_ok());
    }
}

// ============================================================================
// Document Store Tests
// ============================================================================

mod store_tests {
    use super::*;

    #[test]
    fn test_put_get_round_trip_with_timestamps() {
        let db = SignupDb::ephemeral();
        db.store()
            .put("col", "x", fields_from_json(json!({ "a": 1 })))
            .unwrap();

        let doc = db.store().get("col", "x").unwrap();
        assert_eq!(doc.field("a"), Some(&Value::Int(1)));
        let created = doc.field("createdAt").cloned().unwrap();
        let updated = doc.field("updatedAt").cloned().unwrap();
        assert!(matches!(created, Value::Timestamp(_)));
        assert!(matches!(updated, Value::Timestamp(_)));

        std::thread::sleep(std::time::Duration::from_millis(5));
        db.store()
            .patch("col", "x", fields_from_json(json!({ "a": 2 })))
            .unwrap();

        let doc = db.store().get("col", "x").unwrap();
        assert_eq!(doc.field("a"), Some(&Value::Int(2)));
        assert_eq!(doc.field("createdAt"), Some(&created));
        assert_ne!(doc.field("updatedAt"), Some(&updated));
    }

    #[test]
    fn test_patch_on_missing_is_noop() {
        let db = SignupDb::ephemeral();
        db.store()
            .patch("col", "nonexistent", fields_from_json(json!({ "x": 1 })))
            .unwrap();
        assert!(db.store().list("col").unwrap().is_empty());
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let db = SignupDb::ephemeral();
        let err = db.store().get("col", "nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_collections_are_independent() {
        let db = SignupDb::ephemeral();
        db.store().put("a", "x", Fields::new()).unwrap();
        db.store().put("b", "y", Fields::new()).unwrap();
        db.store().clear("a").unwrap();
        assert!(db.store().list("a").unwrap().is_empty());
        assert_eq!(db.store().list("b").unwrap().len(), 1);
    }
}

// ============================================================================
// Query Engine Tests
// ============================================================================

mod query_tests {
    use super::*;

    fn seed(db: &SignupDb) {
        for (id, n) in [("a", 3), ("b", 1), ("c", 2)] {
            db.store()
                .put("col", id, fields_from_json(json!({ "n": n })))
                .unwrap();
        }
    }

    #[test]
    fn test_order_by_and_limit() {
        let db = SignupDb::ephemeral();
        seed(&db);

        let out = db
            .store()
            .query(
                "col",
                &[
                    Constraint::order_by("n", "asc".parse().unwrap()),
                    Constraint::limit(2),
                ],
            )
            .unwrap();
        let ids: Vec<_> = out.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
    }

    #[test]
    fn test_where_conjunction() {
        let db = SignupDb::ephemeral();
        seed(&db);

        let out = db
            .store()
            .query(
                "col",
                &[
                    Constraint::filter("n", ">".parse().unwrap(), 1i64),
                    Constraint::filter("n", FilterOp::Lt, 3i64),
                ],
            )
            .unwrap();
        let ids: Vec<_> = out.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["c"]);
    }

    #[test]
    fn test_unrecognized_operator_is_rejected_up_front() {
        let err = "contains".parse::<FilterOp>().unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[test]
    fn test_query_on_empty_collection() {
        let db = SignupDb::ephemeral();
        let out = db
            .store()
            .query("nothing", &[Constraint::limit(5)])
            .unwrap();
        assert!(out.is_empty());
    }
}

// ============================================================================
// Service Tests - Recompute Correctness & Deadline Gating
// ============================================================================

mod service_tests {
    use super::*;

    #[test]
    fn test_joined_count_tracks_live_records() {
        let db = SignupDb::ephemeral();
        let activity = db.activities.create(new_activity("Badminton", None)).unwrap();

        let mut ids = Vec::new();
        for user in ["u1", "u2", "u3"] {
            ids.push(db.joins.join_activity(new_join(&activity.id, user)).unwrap());
        }
        assert_eq!(db.activities.get(&activity.id).unwrap().joined_count, 3);

        db.joins.cancel_join(&ids[0]).unwrap();
        assert_eq!(db.activities.get(&activity.id).unwrap().joined_count, 2);

        // The cached field itself (not just the live fold-in) was updated.
        let cached = db
            .store()
            .get("activities", &activity.id)
            .unwrap()
            .field("joinedCount")
            .and_then(Value::as_int);
        assert_eq!(cached, Some(2));
    }

    #[test]
    fn test_deadline_gating() {
        let db = SignupDb::ephemeral();

        let open = db
            .activities
            .create(new_activity("Open", Some(Utc::now() + Duration::hours(1))))
            .unwrap();
        let closed = db
            .activities
            .create(new_activity("Closed", Some(Utc::now() - Duration::hours(1))))
            .unwrap();
        let unset = db.activities.create(new_activity("Unset", None)).unwrap();

        let open_join = db.joins.join_activity(new_join(&open.id, "u1")).unwrap();
        let closed_join = db.joins.join_activity(new_join(&closed.id, "u1")).unwrap();
        let unset_join = db.joins.join_activity(new_join(&unset.id, "u1")).unwrap();

        db.joins.cancel_join(&open_join).unwrap();
        db.joins.cancel_join(&unset_join).unwrap();

        let err = db.joins.cancel_join(&closed_join).unwrap_err();
        assert!(err.is_deadline_passed());
        // Nothing was mutated for the failed cancellation.
        assert_eq!(db.activities.get(&closed.id).unwrap().joined_count, 1);
    }

    #[test]
    fn test_cancel_unknown_join_is_not_found() {
        let db = SignupDb::ephemeral();
        assert!(db.joins.cancel_join("ghost").unwrap_err().is_not_found());
    }

    #[test]
    fn test_join_does_not_enforce_capacity() {
        let db = SignupDb::ephemeral();
        let mut activity = new_activity("Tiny", None);
        activity.max_count = Some(1);
        let activity = db.activities.create(activity).unwrap();

        // The service only persists and recounts; capacity is the caller's
        // pre-check.
        db.joins.join_activity(new_join(&activity.id, "u1")).unwrap();
        db.joins.join_activity(new_join(&activity.id, "u2")).unwrap();
        assert_eq!(db.activities.get(&activity.id).unwrap().joined_count, 2);
    }

    #[test]
    fn test_user_join_status_and_listings() {
        let db = SignupDb::ephemeral();
        let a1 = db.activities.create(new_activity("One", None)).unwrap();
        let a2 = db.activities.create(new_activity("Two", None)).unwrap();

        db.joins.join_activity(new_join(&a1.id, "u1")).unwrap();
        db.joins.join_activity(new_join(&a2.id, "u1")).unwrap();
        db.joins.join_activity(new_join(&a1.id, "u2")).unwrap();

        assert!(db.joins.user_join_status(&a1.id, "u1").unwrap().is_some());
        assert!(db.joins.user_join_status(&a2.id, "u2").unwrap().is_none());
        assert_eq!(db.joins.activity_joins(&a1.id).unwrap().len(), 2);
        assert_eq!(db.joins.user_joins("u1").unwrap().len(), 2);
    }
}

// ============================================================================
// Persistence Tests
// ============================================================================

mod persistence {
    use super::*;

    #[test]
    fn test_data_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db");

        let activity_id;
        let join_id;
        {
            let db = SignupDb::open(&path).unwrap();
            let activity = db.activities.create(new_activity("Badminton", None)).unwrap();
            activity_id = activity.id.clone();
            join_id = db.joins.join_activity(new_join(&activity.id, "u1")).unwrap();
        }

        let db = SignupDb::open(&path).unwrap();
        let activity = db.activities.get(&activity_id).unwrap();
        assert_eq!(activity.title, "Badminton");
        assert_eq!(activity.joined_count, 1);

        db.joins.cancel_join(&join_id).unwrap();
        assert_eq!(db.activities.get(&activity_id).unwrap().joined_count, 0);
    }

    #[test]
    fn test_each_collection_gets_its_own_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db");

        let db = SignupDb::open(&path).unwrap();
        let activity = db.activities.create(new_activity("Badminton", None)).unwrap();
        db.joins.join_activity(new_join(&activity.id, "u1")).unwrap();

        assert!(path.join("collection_activities.json").exists());
        assert!(path.join("collection_joins.json").exists());
    }
}
