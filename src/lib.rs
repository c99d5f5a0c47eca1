//! # signupdb
//!
//! Embedded document database for activity sign-up apps: a local substitute
//! for a remote document database, with no network round-trip.
//!
//! signupdb stores named collections of documents over a flat key-value
//! backing, evaluates filter/order/limit queries over them, and keeps one
//! derived aggregate — an activity's cached `joinedCount` — consistent with
//! the authoritative sign-up records by recomputing it from scratch after
//! every mutation.
//!
//! ## Quick Start
//!
//! ```ignore
//! use signupdb::prelude::*;
//!
//! // Open a database (or SignupDb::ephemeral() for tests)
//! let db = SignupDb::open("./my-db")?;
//!
//! // Raw document access
//! db.store().put("activities", "a1", fields)?;
//! let doc = db.store().get("activities", "a1")?;
//!
//! // Queries
//! let recent = db.store().query(
//!     "activities",
//!     &[
//!         Constraint::order_by("createdAt", Direction::Desc),
//!         Constraint::limit(10),
//!     ],
//! )?;
//!
//! // Domain services
//! let join_id = db.joins.join_activity(new_join)?;
//! db.joins.cancel_join(&join_id)?;
//! ```
//!
//! ## Consistency model
//!
//! The `joins` collection is the source of truth; `joinedCount` on an
//! activity is a cache, recomputed wholesale (never incremented) after each
//! sign-up mutation. Collections are separately-durable keys with no
//! cross-collection atomicity, so a crash between the two writes of a
//! mutation leaves the cache stale but never corrupt; the next successful
//! recount restores it.

#![warn(missing_docs)]

mod database;
mod error;
mod query;
mod services;
mod storage;
mod store;
mod types;
mod value;

pub mod prelude;

// Re-export main entry points
pub use database::{SignupDb, SignupDbBuilder};
pub use error::{Error, Result};

// Re-export store and query surface
pub use query::{Constraint, Direction, FilterOp};
pub use storage::{FileBackend, MemoryBackend, StorageBackend};
pub use store::{Document, DocumentStore};

// Re-export services and domain types
pub use services::{ActivityService, JoinService};
pub use types::{Activity, ActivityStatus, Join, NewActivity, NewJoin};
pub use value::{fields_from_json, value_at_path, Fields, Value};
