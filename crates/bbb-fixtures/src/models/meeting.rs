//! Mocked in-progress meetings.
//!
//! Meetings are never stored locally. The fixture only exists to describe
//! the room that was created on the mock server.

use crate::flatten::MockData;
use common::secret::{ExposeSecret, SecretString};
use common::types::{GroupId, InstanceId};

/// Request for [`crate::builder::FixtureBuilder::create_meeting`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingRequest {
    pub instance_id: InstanceId,
    pub group_id: Option<GroupId>,
    /// Additional room parameters passed through to the mock server.
    pub fields: Vec<(String, String)>,
}

impl MeetingRequest {
    pub fn new(instance_id: InstanceId) -> Self {
        Self {
            instance_id,
            group_id: None,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Add a pass-through room parameter (e.g. `participants`, `duration`).
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }
}

/// Room configuration sent to the mock server.
#[derive(Debug, Clone)]
pub struct MeetingFixture {
    /// Caller-supplied parameters, in request order.
    pub fields: Vec<(String, String)>,
    pub meeting_id: String,
    pub meeting_name: String,
    pub attendee_password: SecretString,
    pub moderator_password: SecretString,
    /// Voice bridge number, empty when the instance has none.
    pub voice_bridge: String,
    pub meta: Vec<(String, String)>,
}

impl MeetingFixture {
    /// Look up a meta entry by key.
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Caller fields followed by the room keys; room keys replace caller
    /// fields of the same name.
    pub fn to_mock_data(&self) -> MockData {
        let mut data = MockData::new();
        for (name, value) in &self.fields {
            data.insert(name.as_str(), value.as_str());
        }

        data.insert("meetingID", self.meeting_id.as_str());
        data.insert("meetingName", self.meeting_name.as_str());
        data.insert("attendeePW", self.attendee_password.expose_secret());
        data.insert("moderatorPW", self.moderator_password.expose_secret());
        data.insert("voiceBridge", self.voice_bridge.as_str());
        data.insert_nested(
            "meta",
            self.meta.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        data
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::flatten::{flatten, MockValue};

    fn fixture() -> MeetingFixture {
        MeetingFixture {
            fields: vec![
                ("instanceid".to_string(), "4".to_string()),
                ("meetingID".to_string(), "caller-value".to_string()),
                ("duration".to_string(), "60".to_string()),
            ],
            meeting_id: "abc-2-4".to_string(),
            meeting_name: "Room".to_string(),
            attendee_password: SecretString::from("ap"),
            moderator_password: SecretString::from("mp"),
            voice_bridge: String::new(),
            meta: vec![
                ("bbb-origin".to_string(), "Moodle".to_string()),
                ("bbb-context-id".to_string(), "2".to_string()),
            ],
        }
    }

    #[test]
    fn test_room_keys_override_caller_fields_in_place() {
        let data = fixture().to_mock_data();

        assert_eq!(
            data.get("meetingID"),
            Some(&MockValue::Scalar("abc-2-4".to_string()))
        );

        let names: Vec<String> = flatten(&data).into_iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "instanceid",
                "meetingID",
                "duration",
                "meetingName",
                "attendeePW",
                "moderatorPW",
                "voiceBridge",
                "meta_bbb-origin",
                "meta_bbb-context-id"
            ]
        );
    }

    #[test]
    fn test_passwords_are_exposed_only_in_mock_data() {
        let meeting = fixture();
        let debug = format!("{:?}", meeting);
        assert!(!debug.contains("\"mp\""));

        let params = flatten(&meeting.to_mock_data());
        let moderator = params.iter().find(|p| p.name == "moderatorPW").unwrap();
        assert_eq!(moderator.value, "mp");
    }

    #[test]
    fn test_meta_value_lookup() {
        let meeting = fixture();
        assert_eq!(meeting.meta_value("bbb-origin"), Some("Moodle"));
        assert_eq!(meeting.meta_value("missing"), None);
    }

    #[test]
    fn test_request_builder() {
        let request = MeetingRequest::new(InstanceId(4))
            .with_group(GroupId(2))
            .with_field("participants", "3");

        assert_eq!(request.group_id, Some(GroupId(2)));
        assert_eq!(
            request.fields,
            vec![("participants".to_string(), "3".to_string())]
        );
    }
}
