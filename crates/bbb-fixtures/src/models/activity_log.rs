//! Activity log entries.

use common::types::InstanceId;
use serde::{Deserialize, Serialize};

/// Log event type recorded against an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEvent {
    /// The activity (or its meeting) was created.
    Create,
}

/// A log record to be written by the activity log collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub bigbluebuttonbn_id: InstanceId,
    /// Composite meeting log id; derived from the activity when absent.
    pub meeting_id: Option<String>,
    pub user_id: Option<i64>,
    pub meta: Option<String>,
}

impl LogRecord {
    pub fn new(bigbluebuttonbn_id: InstanceId) -> Self {
        Self {
            bigbluebuttonbn_id,
            meeting_id: None,
            user_id: None,
            meta: None,
        }
    }

    #[must_use]
    pub fn with_meeting_id(mut self, meeting_id: impl Into<String>) -> Self {
        self.meeting_id = Some(meeting_id.into());
        self
    }

    #[must_use]
    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }
}
