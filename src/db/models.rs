use serde::{Deserialize, Serialize};

/// A shareable link entry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Topic {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub image_url: String,
    pub created_by_user_id: String,
    pub created_by_tag: String,
    pub created_at: String,
    pub is_deleted: bool,
}

/// Fields required to create a topic. The caller is responsible for having
/// validated `url` and normalized `image_url` before insertion.
#[derive(Debug, Clone)]
pub struct NewTopic {
    pub title: String,
    pub url: String,
    pub description: String,
    pub image_url: String,
    pub created_by_user_id: String,
    pub created_by_tag: String,
}

/// The public projection of a topic, as served by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TopicDisplay {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub image_url: String,
}

/// Audited mutation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    TopicCreate,
    TopicRemove,
    ConfigSetRole,
}

impl AuditAction {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopicCreate => "TOPIC_CREATE",
            Self::TopicRemove => "TOPIC_REMOVE",
            Self::ConfigSetRole => "CONFIG_SET_ROLE",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "TOPIC_CREATE" => Some(Self::TopicCreate),
            "TOPIC_REMOVE" => Some(Self::TopicRemove),
            "CONFIG_SET_ROLE" => Some(Self::ConfigSetRole),
            _ => None,
        }
    }
}

/// An append-only audit log row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLogEntry {
    pub id: i64,
    pub action: String,
    pub topic_id: Option<i64>,
    pub actor_user_id: String,
    pub actor_tag: String,
    pub detail: String,
    pub created_at: String,
}

impl AuditLogEntry {
    #[must_use]
    pub fn action_enum(&self) -> Option<AuditAction> {
        AuditAction::from_str(&self.action)
    }
}

/// Fields for appending an audit log entry.
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub action: AuditAction,
    pub topic_id: Option<i64>,
    pub actor_user_id: String,
    pub actor_tag: String,
    pub detail: serde_json::Value,
}
