//! Recording fixtures and the request used to create them.

use crate::errors::FixtureError;
use crate::flatten::MockData;
use common::types::{CourseId, GroupId, InstanceId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Presenter name used when the request does not name one.
pub const DEFAULT_PRESENTER_NAME: &str = "Fake presenter";

/// Lifecycle state of a recording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    /// The conferencing server reported the recording as ready.
    #[default]
    Notified,
    /// Waiting for the conferencing server to finish processing.
    Awaiting,
    Published,
    Unpublished,
    Deleted,
}

impl RecordingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordingState::Notified => "notified",
            RecordingState::Awaiting => "awaiting",
            RecordingState::Published => "published",
            RecordingState::Unpublished => "unpublished",
            RecordingState::Deleted => "deleted",
        }
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordingState {
    type Err = FixtureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "notified" => Ok(RecordingState::Notified),
            "awaiting" => Ok(RecordingState::Awaiting),
            "published" => Ok(RecordingState::Published),
            "unpublished" => Ok(RecordingState::Unpublished),
            "deleted" => Ok(RecordingState::Deleted),
            other => Err(FixtureError::Configuration(format!(
                "Unknown recording state '{}'",
                other
            ))),
        }
    }
}

/// A recording fixture, persisted through the recording collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingFixture {
    /// Store id, assigned on persistence.
    pub id: Option<i64>,
    pub bigbluebuttonbn_id: InstanceId,
    pub meeting_id: String,
    pub course_id: CourseId,
    pub group_id: Option<GroupId>,
    pub state: RecordingState,
    pub imported: bool,
    pub headless: bool,
    /// JSON-encoded recording payload; empty for native recordings.
    pub recording: String,
    /// Recording id assigned by the mock server.
    pub recording_id: String,
}

impl RecordingFixture {
    /// Fields sent to the mock server, in wire order, without the meta block.
    pub fn to_mock_data(&self) -> MockData {
        let mut data = MockData::new()
            .with("headless", bool_param(self.headless))
            .with("imported", bool_param(self.imported))
            .with("recording", self.recording.as_str())
            .with("state", self.state.as_str());

        if let Some(group_id) = self.group_id {
            data.insert("groupid", group_id.to_string());
        }

        data.with("bigbluebuttonbnid", self.bigbluebuttonbn_id.to_string())
            .with("meetingID", self.meeting_id.as_str())
            .with("courseid", self.course_id.to_string())
    }
}

/// Lookup filter for stored recordings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingFilter {
    pub recording_id: Option<String>,
    pub bigbluebuttonbn_id: Option<InstanceId>,
}

impl RecordingFilter {
    pub fn by_recording_id(recording_id: impl Into<String>) -> Self {
        Self {
            recording_id: Some(recording_id.into()),
            ..Default::default()
        }
    }

    /// Whether `recording` satisfies every set criterion.
    pub fn matches(&self, recording: &RecordingFixture) -> bool {
        self.recording_id
            .as_ref()
            .is_none_or(|id| *id == recording.recording_id)
            && self
                .bigbluebuttonbn_id
                .is_none_or(|id| id == recording.bigbluebuttonbn_id)
    }
}

/// Request for [`crate::builder::FixtureBuilder::create_recording`].
///
/// `imported` holds the raw flag text as a test author would write it
/// (`"1"`, `"true"`, `"no"`, ...); it is parsed when the fixture is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingRequest {
    pub bigbluebuttonbn_id: InstanceId,
    pub imported: Option<String>,
    pub imported_id: Option<String>,
    pub group_id: Option<GroupId>,
    pub state: Option<RecordingState>,
    pub presenter_name: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub tags: Option<String>,
}

impl RecordingRequest {
    pub fn new(bigbluebuttonbn_id: InstanceId) -> Self {
        Self {
            bigbluebuttonbn_id,
            imported: None,
            imported_id: None,
            group_id: None,
            state: None,
            presenter_name: None,
            description: None,
            name: None,
            tags: None,
        }
    }

    /// Mark the recording as imported from `source_recording_id`.
    #[must_use]
    pub fn imported_from(mut self, source_recording_id: impl Into<String>) -> Self {
        self.imported = Some("1".to_string());
        self.imported_id = Some(source_recording_id.into());
        self
    }

    /// Set the raw `imported` flag text.
    #[must_use]
    pub fn with_imported_flag(mut self, flag: impl Into<String>) -> Self {
        self.imported = Some(flag.into());
        self
    }

    #[must_use]
    pub fn with_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: RecordingState) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub fn with_presenter_name(mut self, presenter_name: impl Into<String>) -> Self {
        self.presenter_name = Some(presenter_name.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Parsed `imported` flag; absent means not imported.
    pub fn is_imported(&self) -> bool {
        self.imported.as_deref().is_some_and(parse_bool_flag)
    }

    /// Source recording id of an imported fixture.
    ///
    /// Blank ids and `"0"` count as missing.
    pub fn source_recording_id(&self) -> Option<&str> {
        self.imported_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != "0")
    }
}

/// Parse a boolean flag the way test data tables spell them.
///
/// `1`, `true`, `on` and `yes` are true, ignoring case. Anything else,
/// including text that is not a flag at all, is false.
pub fn parse_bool_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

pub(crate) fn bool_param(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
