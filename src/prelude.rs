//! Convenient glob import for common signupdb usage.
//!
//! ```ignore
//! use signupdb::prelude::*;
//! ```

pub use crate::database::{SignupDb, SignupDbBuilder};
pub use crate::error::{Error, Result};
pub use crate::query::{Constraint, Direction, FilterOp};
pub use crate::store::{Document, DocumentStore};
pub use crate::types::{Activity, ActivityStatus, Join, NewActivity, NewJoin};
pub use crate::value::{fields_from_json, Fields, Value};
