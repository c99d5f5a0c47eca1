//! Domain types for the activity sign-up application.
//!
//! Activities and joins are stored as plain documents; these typed views
//! convert to and from [`Document`] through the serde_json bridge, so the
//! stored field names stay camelCase as the collections expect.

use crate::error::Result;
use crate::store::Document;
use crate::value::{fields_from_json, Fields};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Caller-assigned activity lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    /// Open for sign-ups.
    Active,
    /// At capacity.
    Full,
    /// Over.
    Ended,
}

/// An activity, as stored in the `activities` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Document id.
    #[serde(default)]
    pub id: String,
    /// Display title.
    pub title: String,
    /// Date, as entered by the organizer.
    pub date: String,
    /// Time of day, as entered by the organizer.
    pub time: String,
    /// Venue.
    pub location: String,
    /// Free-form rules text.
    pub rules: String,
    /// Capacity cap, if any. Not enforced by the store.
    #[serde(default)]
    pub max_count: Option<i64>,
    /// Latest instant at which a sign-up may still be cancelled.
    #[serde(default)]
    pub cancel_deadline: Option<DateTime<Utc>>,
    /// Lifecycle status, caller-assigned.
    pub status: ActivityStatus,
    /// Derived cache of the live join count. The `joins` collection is the
    /// source of truth; this field is recomputed wholesale after every
    /// sign-up mutation, never incremented.
    #[serde(default)]
    pub joined_count: i64,
    /// Set by the store on first insert.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Set by the store on every write.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating an activity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    /// Display title.
    pub title: String,
    /// Date, as entered by the organizer.
    pub date: String,
    /// Time of day, as entered by the organizer.
    pub time: String,
    /// Venue.
    pub location: String,
    /// Free-form rules text.
    pub rules: String,
    /// Capacity cap, if any.
    pub max_count: Option<i64>,
    /// Latest instant at which a sign-up may still be cancelled.
    pub cancel_deadline: Option<DateTime<Utc>>,
}

/// A sign-up record, as stored in the `joins` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Join {
    /// Document id.
    #[serde(default)]
    pub id: String,
    /// The activity this record signs up for. Foreign key by convention,
    /// not enforced by the store.
    pub activity_id: String,
    /// Signing user's id.
    pub user_id: String,
    /// Display name.
    pub user_name: String,
    /// Contact details, already validated by the caller.
    pub contact: String,
    /// Optional message to the organizer.
    #[serde(default)]
    pub message: String,
    /// When the sign-up was made.
    pub join_time: DateTime<Utc>,
    /// Set by the store on first insert.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Set by the store on every write.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for signing up to an activity. The service stamps `joinTime`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJoin {
    /// The activity to sign up for.
    pub activity_id: String,
    /// Signing user's id.
    pub user_id: String,
    /// Display name.
    pub user_name: String,
    /// Contact details, already validated by the caller.
    pub contact: String,
    /// Optional message to the organizer.
    pub message: String,
}

/// Decode a document into a typed view, folding the document id in.
pub(crate) fn document_to<T: DeserializeOwned>(doc: &Document) -> Result<T> {
    let mut json = serde_json::Map::new();
    json.insert("id".to_string(), serde_json::Value::String(doc.id.clone()));
    for (name, value) in &doc.fields {
        json.insert(name.clone(), value.clone().into());
    }
    Ok(serde_json::from_value(serde_json::Value::Object(json))?)
}

/// Encode a typed value into document fields. Any `id` field is stripped;
/// the store owns ids.
pub(crate) fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
    let mut fields = fields_from_json(serde_json::to_value(value)?);
    fields.remove("id");
    Ok(fields)
}
