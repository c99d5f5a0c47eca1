//! Domain services over the activity/join relationship.
//!
//! Both services are thin: they own no storage, calling the document store
//! for CRUD and the query engine to enumerate records. The join service
//! additionally keeps the activities' cached `joinedCount` consistent with
//! the authoritative `joins` collection (recompute-from-truth).

mod activities;
mod joins;

pub use activities::ActivityService;
pub use joins::JoinService;

/// Collection holding activity documents.
pub(crate) const ACTIVITIES: &str = "activities";

/// Collection holding sign-up records. Source of truth for `joinedCount`.
pub(crate) const JOINS: &str = "joins";
