//! Parameter types for the write operations.
//!
//! # Design
//! Remote entities (projects, labels, items, timezones) are not modeled; they
//! come back as `serde_json::Value`. Only the request side is typed. Optional
//! fields are `Option`: `None` leaves the field out of the request and
//! `Some(v)` always sends it, including `Some(0)` and `Some("")`.

use serde::{Deserialize, Serialize};

/// Fields for `Client::register`. All are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub timezone: String,
}

/// Fields for `Client::update_user`. Only present fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// Fields for `Client::add_project`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl NewProject {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Fields for `Client::update_project`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub project_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<i64>,
}

/// Fields for `Client::add_item`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewItem {
    pub project_id: u64,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_order: Option<i64>,
    #[serde(default)]
    pub js_date: bool,
}

/// Fields for `Client::update_item`. `project_id` moves the item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemUpdate {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_order: Option<i64>,
    #[serde(default)]
    pub js_date: bool,
}

/// Arguments for `Client::query`.
///
/// `queries` are joined into `[q1,q2]` without any quoting. A query that the
/// service expects as a string literal must already carry its own quotes,
/// e.g. `"\"overdue\""`; plain keywords such as `overdue` or `p1` work as-is.
/// Each element is percent-encoded on the wire, so filter operators like `&`
/// and `|` arrive intact.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    pub queries: Vec<String>,
    #[serde(default)]
    pub as_count: bool,
    #[serde(default)]
    pub js_date: bool,
}

impl Query {
    pub fn new<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queries: queries.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}
