//! Pre-configured instance data for fixture builder tests.

use crate::test_ids::TEST_COURSE_ID;
use bbb_fixtures::models::InstanceFields;
use common::types::CourseId;
use serde_json::{json, Value};

/// Raw instance fields, built up the way a test data table would supply
/// them.
#[derive(Debug, Clone)]
pub struct TestInstance {
    fields: InstanceFields,
}

impl Default for TestInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl TestInstance {
    /// An instance in the test course named "BBB Test Room".
    #[must_use]
    pub fn new() -> Self {
        Self::empty()
            .with_course(TEST_COURSE_ID)
            .with_name("BBB Test Room")
    }

    /// No fields at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            fields: InstanceFields::new(),
        }
    }

    #[must_use]
    pub fn with_course(self, course: CourseId) -> Self {
        self.with_field("course", json!(course.0))
    }

    #[must_use]
    pub fn with_name(self, name: &str) -> Self {
        self.with_field("name", json!(name))
    }

    #[must_use]
    pub fn with_intro(self, intro: &str) -> Self {
        self.with_field("intro", json!(intro))
    }

    #[must_use]
    pub fn with_meetingid(self, meetingid: &str) -> Self {
        self.with_field("meetingid", json!(meetingid))
    }

    /// Moderator selection string, e.g. `"role:editingteacher,user:alice"`.
    #[must_use]
    pub fn with_moderators(self, selection: &str) -> Self {
        self.with_field("moderators", json!(selection))
    }

    /// Viewer selection string, e.g. `"role:student"`.
    #[must_use]
    pub fn with_viewers(self, selection: &str) -> Self {
        self.with_field("viewers", json!(selection))
    }

    #[must_use]
    pub fn with_voice_bridge(self, voice_bridge: u32) -> Self {
        self.with_field("voicebridge", json!(voice_bridge))
    }

    /// Set any raw column.
    #[must_use]
    pub fn with_field(mut self, name: &str, value: Value) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn build(self) -> InstanceFields {
        self.fields
    }
}
