use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{BookmarkId, Session, UserId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Identity returned by the auth service's `user` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl AuthUser {
    pub fn display_name(&self) -> String {
        self.user_metadata
            .full_name
            .clone()
            .or_else(|| self.user_metadata.name.clone())
            .or_else(|| self.email.clone())
            .unwrap_or_default()
    }

    pub fn into_session(self) -> Session {
        Session {
            display_name: self.display_name(),
            user_id: self.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row change delivered by the owner-filtered realtime feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub table: String,
    pub commit_timestamp: Option<String>,
    pub record_id: Option<BookmarkId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhoenixFrame {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_ref: Option<String>,
}

impl PhoenixFrame {
    pub fn new(topic: impl Into<String>, event: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            event: event.into(),
            payload,
            reference: None,
            join_ref: None,
        }
    }

    pub fn with_ref(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_join_ref(mut self, join_ref: impl Into<String>) -> Self {
        self.join_ref = Some(join_ref.into());
        self
    }

    /// Reply status of a `phx_reply` frame.
    pub fn reply_status(&self) -> Option<&str> {
        if self.event != "phx_reply" {
            return None;
        }
        self.payload.get("status").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresChangesPayload {
    pub data: PostgresChangeData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresChangeData {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub commit_timestamp: Option<String>,
    #[serde(default)]
    pub record: Option<Value>,
    #[serde(default)]
    pub old_record: Option<Value>,
}

impl From<PostgresChangeData> for ChangeEvent {
    fn from(data: PostgresChangeData) -> Self {
        let record_id = [data.record.as_ref(), data.old_record.as_ref()]
            .into_iter()
            .flatten()
            .find_map(|row| row.get("id").and_then(Value::as_i64))
            .map(BookmarkId);
        Self {
            kind: data.kind,
            table: data.table,
            commit_timestamp: data.commit_timestamp,
            record_id,
        }
    }
}
