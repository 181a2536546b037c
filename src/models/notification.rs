//! Queued notification mail model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::{NotificationKind, NotificationStatus};

/// One entry of the outgoing mail queue
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MailNotification {
    pub id: i32,
    pub kind: NotificationKind,
    pub to_user_id: Option<i32>,
    pub to_admin_id: Option<i32>,
    pub to_email: String,
    pub subject: String,
    pub body: String,
    pub status: NotificationStatus,
    pub scheduled_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

/// Mail queue query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct NotificationQuery {
    pub status: Option<NotificationStatus>,
    pub kind: Option<NotificationKind>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
