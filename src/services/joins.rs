//! Sign-up service: join/cancel plus the derived-count consistency step.
//!
//! ## Recompute-from-truth
//!
//! A sign-up mutation is two independent writes (the `joins` collection,
//! then the parent activity's cached `joinedCount`) with no cross-collection
//! atomicity. After every mutation the count is recomputed wholesale from
//! the live join records, never incremented: a crash between the two writes
//! leaves the cache stale but never corrupt, and the next successful call
//! restores it without needing the failed operation's context.
//!
//! Two concurrent joins for one activity can each insert and then both
//! recount; the recount reads the post-both-inserts state, so the final
//! cache is still right. Interleavings where a recount races an in-flight
//! insert can transiently miscount until the next successful recount.
//! Callers needing strict correctness serialize calls per activity id.

use super::{ACTIVITIES, JOINS};
use crate::error::{Error, Result};
use crate::query::{Constraint, Direction, FilterOp};
use crate::store::DocumentStore;
use crate::types::{document_to, to_fields, Join, NewJoin};
use crate::value::Value;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Sign-up operations and the `joinedCount` consistency step.
#[derive(Clone)]
pub struct JoinService {
    store: Arc<DocumentStore>,
}

impl JoinService {
    /// Create a service over the given store.
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Sign a user up for an activity and return the new record's id.
    ///
    /// Persists the join, then recomputes the activity's `joinedCount`.
    /// Capacity and status checks are the caller's responsibility; this
    /// only persists and recounts.
    pub fn join_activity(&self, new_join: NewJoin) -> Result<String> {
        let mut fields = to_fields(&new_join)?;
        fields.insert("joinTime".to_string(), Value::Timestamp(Utc::now()));

        let join_id = self.store.add(JOINS, fields)?;
        self.recount(&new_join.activity_id)?;
        debug!(%join_id, activity_id = %new_join.activity_id, "joined activity");
        Ok(join_id)
    }

    /// Cancel a sign-up.
    ///
    /// `Error::NotFound` if the record (or its parent activity) is absent.
    /// With the activity's `cancelDeadline` unset, cancellation is always
    /// allowed; with it set, only while now is at or before the deadline,
    /// else `Error::DeadlinePassed` and nothing is mutated. On success the
    /// record is removed and `joinedCount` recomputed.
    pub fn cancel_join(&self, join_id: &str) -> Result<()> {
        let join: Join = document_to(&self.store.get(JOINS, join_id)?)?;
        self.check_cancel_deadline(&join.activity_id)?;

        self.store.remove(JOINS, join_id)?;
        self.recount(&join.activity_id)?;
        debug!(join_id, activity_id = %join.activity_id, "cancelled join");
        Ok(())
    }

    /// Sign-ups for one activity, newest first.
    pub fn activity_joins(&self, activity_id: &str) -> Result<Vec<Join>> {
        let docs = self.store.query(
            JOINS,
            &[
                Constraint::filter("activityId", FilterOp::Eq, activity_id),
                Constraint::order_by("createdAt", Direction::Desc),
            ],
        )?;
        docs.iter().map(document_to).collect()
    }

    /// Whether (and how) a user has already signed up for an activity.
    pub fn user_join_status(&self, activity_id: &str, user_id: &str) -> Result<Option<Join>> {
        let docs = self.store.query(
            JOINS,
            &[
                Constraint::filter("activityId", FilterOp::Eq, activity_id),
                Constraint::filter("userId", FilterOp::Eq, user_id),
            ],
        )?;
        docs.first().map(document_to).transpose()
    }

    /// All of a user's sign-ups, newest first.
    pub fn user_joins(&self, user_id: &str) -> Result<Vec<Join>> {
        let docs = self.store.query(
            JOINS,
            &[
                Constraint::filter("userId", FilterOp::Eq, user_id),
                Constraint::order_by("createdAt", Direction::Desc),
            ],
        )?;
        docs.iter().map(document_to).collect()
    }

    /// Recompute an activity's `joinedCount` from the live join records and
    /// patch it onto the activity document.
    ///
    /// A missing activity makes the patch a silent no-op, so a recount for
    /// a deleted activity is harmless. Returns the live count.
    pub fn recount(&self, activity_id: &str) -> Result<i64> {
        let joins = self.store.query(
            JOINS,
            &[Constraint::filter("activityId", FilterOp::Eq, activity_id)],
        )?;
        let count = joins.len() as i64;

        let mut patch = crate::value::Fields::new();
        patch.insert("joinedCount".to_string(), Value::Int(count));
        self.store.patch(ACTIVITIES, activity_id, patch)?;
        debug!(activity_id, count, "recomputed joined count");
        Ok(count)
    }

    /// Evaluate the cancellation-deadline policy for an activity.
    ///
    /// `Error::NotFound` if the activity is absent. An unset (or
    /// non-instant) `cancelDeadline` always allows cancellation.
    fn check_cancel_deadline(&self, activity_id: &str) -> Result<()> {
        let activity = self.store.get(ACTIVITIES, activity_id)?;
        let Some(deadline) = activity
            .field("cancelDeadline")
            .and_then(Value::coerce_instant)
        else {
            return Ok(());
        };

        if Utc::now() > deadline {
            return Err(Error::DeadlinePassed { deadline });
        }
        Ok(())
    }
}
