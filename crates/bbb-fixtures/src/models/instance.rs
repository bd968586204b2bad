//! Activity instance snapshot exposed by the instance collaborator.

use common::secret::SecretString;
use common::types::{CourseId, GroupId, InstanceId};

/// Raw column → value mapping of a new activity instance.
///
/// Ordered so the persisted record reflects the order fields were supplied.
pub type InstanceFields = serde_json::Map<String, serde_json::Value>;

/// Course details used for meeting meta data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSummary {
    pub id: CourseId,
    pub fullname: String,
    pub shortname: String,
}

/// An activity instance as seen by the fixture builder.
///
/// The group binding is local to this value; binding a group changes the
/// meeting id this snapshot reports without touching stored data.
#[derive(Debug, Clone)]
pub struct Instance {
    instance_id: InstanceId,
    course: CourseSummary,
    meetingid: String,
    name: String,
    description: String,
    viewer_password: SecretString,
    moderator_password: SecretString,
    voice_bridge: Option<u32>,
    group_id: Option<GroupId>,
}

impl Instance {
    /// Create an instance snapshot with default passwords and no description.
    pub fn new(instance_id: InstanceId, course: CourseSummary, meetingid: impl Into<String>) -> Self {
        Self {
            instance_id,
            course,
            meetingid: meetingid.into(),
            name: String::new(),
            description: String::new(),
            viewer_password: SecretString::from("ap"),
            moderator_password: SecretString::from("mp"),
            voice_bridge: None,
            group_id: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_passwords(mut self, viewer: SecretString, moderator: SecretString) -> Self {
        self.viewer_password = viewer;
        self.moderator_password = moderator;
        self
    }

    #[must_use]
    pub fn with_voice_bridge(mut self, voice_bridge: u32) -> Self {
        self.voice_bridge = Some(voice_bridge);
        self
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub fn course_id(&self) -> CourseId {
        self.course.id
    }

    pub fn course(&self) -> &CourseSummary {
        &self.course
    }

    pub fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    /// Bind this snapshot to a group.
    pub fn set_group_id(&mut self, group_id: GroupId) {
        self.group_id = Some(group_id);
    }

    /// Meeting id without any group suffix: `{meetingid}-{course}-{instance}`.
    pub fn base_meeting_id(&self) -> String {
        format!("{}-{}-{}", self.meetingid, self.course.id, self.instance_id)
    }

    /// Meeting id on the conferencing server, `[{group}]`-suffixed when a
    /// group is bound.
    pub fn meeting_id(&self) -> String {
        match self.group_id {
            Some(group_id) => format!("{}[{}]", self.base_meeting_id(), group_id),
            None => self.base_meeting_id(),
        }
    }

    pub fn meeting_name(&self) -> &str {
        &self.name
    }

    pub fn meeting_description(&self) -> &str {
        &self.description
    }

    pub fn viewer_password(&self) -> &SecretString {
        &self.viewer_password
    }

    pub fn moderator_password(&self) -> &SecretString {
        &self.moderator_password
    }

    pub fn voice_bridge(&self) -> Option<u32> {
        self.voice_bridge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::secret::ExposeSecret;

    fn course() -> CourseSummary {
        CourseSummary {
            id: CourseId(2),
            fullname: "Test course 1".to_string(),
            shortname: "tc1".to_string(),
        }
    }

    #[test]
    fn test_meeting_id_without_group() {
        let instance = Instance::new(InstanceId(5), course(), "abc123");
        assert_eq!(instance.meeting_id(), "abc123-2-5");
        assert_eq!(instance.base_meeting_id(), "abc123-2-5");
    }

    #[test]
    fn test_meeting_id_with_group_binding() {
        let mut instance = Instance::new(InstanceId(5), course(), "abc123");
        instance.set_group_id(GroupId(9));

        assert_eq!(instance.meeting_id(), "abc123-2-5[9]");
        assert_eq!(instance.base_meeting_id(), "abc123-2-5");
        assert_eq!(instance.group_id(), Some(GroupId(9)));
    }

    #[test]
    fn test_defaults_and_builders() {
        let instance = Instance::new(InstanceId(1), course(), "m")
            .with_name("Room")
            .with_description("Weekly")
            .with_voice_bridge(71234);

        assert_eq!(instance.meeting_name(), "Room");
        assert_eq!(instance.meeting_description(), "Weekly");
        assert_eq!(instance.viewer_password().expose_secret(), "ap");
        assert_eq!(instance.moderator_password().expose_secret(), "mp");
        assert_eq!(instance.voice_bridge(), Some(71234));
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let instance = Instance::new(InstanceId(1), course(), "m").with_passwords(
            SecretString::from("viewer-secret"),
            SecretString::from("moderator-secret"),
        );

        let debug = format!("{:?}", instance);
        assert!(!debug.contains("viewer-secret"));
        assert!(!debug.contains("moderator-secret"));
    }
}
