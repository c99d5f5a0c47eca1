//! Activity lifecycle service.
//!
//! Creation, lookup, search, and deletion of activities. Reads fold a live
//! join count into the returned value rather than trusting the cached
//! `joinedCount`, since the cache can be stale between a crashed sign-up
//! mutation and the next successful recount.

use super::{ACTIVITIES, JOINS};
use crate::error::Result;
use crate::query::{Constraint, Direction, FilterOp};
use crate::store::DocumentStore;
use crate::types::{document_to, to_fields, Activity, NewActivity};
use crate::value::{Fields, Value};
use std::sync::Arc;
use tracing::debug;

/// Activity CRUD and search.
#[derive(Clone)]
pub struct ActivityService {
    store: Arc<DocumentStore>,
}

impl ActivityService {
    /// Create a service over the given store.
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Create an activity. Starts active with a zero join count.
    pub fn create(&self, new_activity: NewActivity) -> Result<Activity> {
        let mut fields = to_fields(&new_activity)?;
        fields.insert("joinedCount".to_string(), Value::Int(0));
        fields.insert("status".to_string(), Value::String("active".to_string()));

        let id = self.store.add(ACTIVITIES, fields)?;
        debug!(%id, "created activity");
        self.get(&id)
    }

    /// Fetch one activity, with a live join count folded in.
    pub fn get(&self, activity_id: &str) -> Result<Activity> {
        let doc = self.store.get(ACTIVITIES, activity_id)?;
        let mut activity: Activity = document_to(&doc)?;
        activity.joined_count = self.join_count(activity_id)?;
        Ok(activity)
    }

    /// Most recent activities, newest first, capped at `page_size`, each
    /// carrying a live join count.
    pub fn list(&self, page_size: usize) -> Result<Vec<Activity>> {
        let docs = self.store.query(
            ACTIVITIES,
            &[
                Constraint::order_by("createdAt", Direction::Desc),
                Constraint::limit(page_size),
            ],
        )?;
        docs.iter()
            .map(|doc| {
                let mut activity: Activity = document_to(doc)?;
                activity.joined_count = self.join_count(&doc.id)?;
                Ok(activity)
            })
            .collect()
    }

    /// Shallow-patch an activity. Silent no-op on a missing id.
    pub fn update(&self, activity_id: &str, fields: Fields) -> Result<()> {
        self.store.patch(ACTIVITIES, activity_id, fields)
    }

    /// Delete an activity. Its join records are NOT cascade-deleted; they
    /// stay in the `joins` collection as orphans.
    pub fn delete(&self, activity_id: &str) -> Result<()> {
        self.store.remove(ACTIVITIES, activity_id)?;
        debug!(activity_id, "deleted activity");
        Ok(())
    }

    /// Substring search over title, location, and rules, newest first.
    pub fn search(&self, keyword: &str) -> Result<Vec<Activity>> {
        let docs = self.store.query(
            ACTIVITIES,
            &[Constraint::order_by("createdAt", Direction::Desc)],
        )?;
        docs.iter()
            .filter(|doc| {
                ["title", "location", "rules"].iter().any(|field| {
                    doc.field(field)
                        .and_then(Value::as_str)
                        .map_or(false, |text| text.contains(keyword))
                })
            })
            .map(document_to)
            .collect()
    }

    /// Authoritative live join count for one activity.
    pub fn join_count(&self, activity_id: &str) -> Result<i64> {
        let joins = self.store.query(
            JOINS,
            &[Constraint::filter("activityId", FilterOp::Eq, activity_id)],
        )?;
        Ok(joins.len() as i64)
    }

    /// Wipe the whole collection, backing key included.
    pub fn clear_all(&self) -> Result<()> {
        self.store.clear(ACTIVITIES)
    }
}
