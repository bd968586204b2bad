//! In-memory collaborators for fixture builder tests.
//!
//! Each store is a cheap clone over shared state so a test can hand one
//! copy to the builder and keep another for assertions.
//!
//! # Example
//!
//! ```rust,ignore
//! use bbb_test_utils::TestCollaborators;
//!
//! let stores = TestCollaborators::standard();
//! let builder = stores.fixture_builder(config, transport);
//!
//! // ... build fixtures ...
//!
//! assert_eq!(stores.recordings.len(), 1);
//! ```

use crate::test_ids::*;
use bbb_fixtures::collaborators::{ActivityLog, Directory, InstanceStore, RecordingStore};
use bbb_fixtures::models::{
    CourseSummary, Instance, InstanceFields, LogEvent, LogRecord, RecordingFilter,
    RecordingFixture,
};
use bbb_fixtures::transport::MockTransport;
use bbb_fixtures::{Collaborators, Config, FixtureBuilder, FixtureError};
use common::secret::SecretString;
use common::types::{CourseId, InstanceId};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// In-memory activity instance table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInstanceStore {
    inner: Arc<Mutex<InstanceStoreInner>>,
}

#[derive(Debug, Default)]
struct InstanceStoreInner {
    courses: HashMap<CourseId, CourseSummary>,
    instances: BTreeMap<InstanceId, InstanceFields>,
    next_id: i64,
}

impl InMemoryInstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a course so instances in it report its names.
    #[must_use]
    pub fn with_course(self, course: CourseSummary) -> Self {
        self.inner.lock().unwrap().courses.insert(course.id, course);
        self
    }

    /// Fields stored for `id`, as they were persisted.
    pub fn stored_fields(&self, id: InstanceId) -> Option<InstanceFields> {
        self.inner.lock().unwrap().instances.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InstanceStore for InMemoryInstanceStore {
    fn create_instance(&self, fields: InstanceFields) -> Result<InstanceId, FixtureError> {
        if field_i64(&fields, "course").is_none() {
            return Err(FixtureError::Configuration(
                "Instance fields must name a course".to_string(),
            ));
        }

        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = InstanceId(inner.next_id);
        inner.instances.insert(id, fields);
        Ok(id)
    }

    fn get_from_instance_id(&self, id: InstanceId) -> Result<Instance, FixtureError> {
        let inner = self.inner.lock().unwrap();
        let fields = inner
            .instances
            .get(&id)
            .ok_or_else(|| FixtureError::NotFound(format!("no bigbluebuttonbn with id {}", id)))?;

        let course_id = CourseId(field_i64(fields, "course").unwrap_or_default());
        let course = inner
            .courses
            .get(&course_id)
            .cloned()
            .unwrap_or_else(|| CourseSummary {
                id: course_id,
                fullname: format!("Test course {}", course_id),
                shortname: format!("tc{}", course_id),
            });

        let mut instance = Instance::new(id, course, field_text(fields, "meetingid"))
            .with_name(field_text(fields, "name"))
            .with_description(field_text(fields, "intro"))
            .with_passwords(
                SecretString::from(field_text(fields, "viewerpass")),
                SecretString::from(field_text(fields, "moderatorpass")),
            );

        if let Some(voice_bridge) = field_i64(fields, "voicebridge")
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
        {
            instance = instance.with_voice_bridge(voice_bridge);
        }

        Ok(instance)
    }
}

fn field_text(fields: &InstanceFields, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn field_i64(fields: &InstanceFields, key: &str) -> Option<i64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// In-memory recording table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordingStore {
    recordings: Arc<Mutex<Vec<RecordingFixture>>>,
}

impl InMemoryRecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored recording, assigning it the next id.
    #[must_use]
    pub fn with_recording(self, recording: RecordingFixture) -> Self {
        self.create(&recording).unwrap();
        self
    }

    pub fn all(&self) -> Vec<RecordingFixture> {
        self.recordings.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.recordings.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordingStore for InMemoryRecordingStore {
    fn read_by(&self, filter: &RecordingFilter) -> Result<Option<RecordingFixture>, FixtureError> {
        let recordings = self.recordings.lock().unwrap();
        Ok(recordings.iter().find(|r| filter.matches(r)).cloned())
    }

    fn create(&self, recording: &RecordingFixture) -> Result<i64, FixtureError> {
        let mut recordings = self.recordings.lock().unwrap();
        let id = recordings.len() as i64 + 1;
        let mut stored = recording.clone();
        stored.id = Some(id);
        recordings.push(stored);
        Ok(id)
    }
}

/// In-memory role and user directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    roles: HashMap<String, i64>,
    users: HashMap<String, i64>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory with the standard roles and the test users alice, bob and
    /// charlie.
    pub fn standard() -> Self {
        Self::new()
            .with_role("editingteacher", TEST_ROLE_EDITINGTEACHER)
            .with_role("teacher", TEST_ROLE_TEACHER)
            .with_role("student", TEST_ROLE_STUDENT)
            .with_user("alice", TEST_USER_ALICE)
            .with_user("bob", TEST_USER_BOB)
            .with_user("charlie", TEST_USER_CHARLIE)
    }

    #[must_use]
    pub fn with_role(mut self, shortname: impl Into<String>, id: i64) -> Self {
        self.roles.insert(shortname.into(), id);
        self
    }

    #[must_use]
    pub fn with_user(mut self, username: impl Into<String>, id: i64) -> Self {
        self.users.insert(username.into(), id);
        self
    }
}

impl Directory for InMemoryDirectory {
    fn find_role_id(&self, shortname: &str) -> Result<Option<i64>, FixtureError> {
        Ok(self.roles.get(shortname).copied())
    }

    fn find_user_id(&self, username: &str) -> Result<Option<i64>, FixtureError> {
        Ok(self.users.get(username).copied())
    }
}

/// A log entry captured by [`InMemoryActivityLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedEvent {
    pub instance_id: InstanceId,
    pub event: LogEvent,
    pub record: LogRecord,
}

/// Activity log that keeps every entry in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActivityLog {
    entries: Arc<Mutex<Vec<LoggedEvent>>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LoggedEvent> {
        self.entries.lock().unwrap().clone()
    }
}

impl ActivityLog for InMemoryActivityLog {
    fn log(
        &self,
        activity: &Instance,
        event: LogEvent,
        record: &LogRecord,
    ) -> Result<(), FixtureError> {
        self.entries.lock().unwrap().push(LoggedEvent {
            instance_id: activity.instance_id(),
            event,
            record: record.clone(),
        });
        Ok(())
    }
}

/// The four in-memory collaborators, kept together for assertions.
#[derive(Debug, Clone, Default)]
pub struct TestCollaborators {
    pub instances: InMemoryInstanceStore,
    pub recordings: InMemoryRecordingStore,
    pub directory: InMemoryDirectory,
    pub activity_log: InMemoryActivityLog,
}

impl TestCollaborators {
    /// Collaborators with the test course registered and the standard
    /// directory.
    pub fn standard() -> Self {
        Self {
            instances: InMemoryInstanceStore::new().with_course(test_course()),
            recordings: InMemoryRecordingStore::new(),
            directory: InMemoryDirectory::standard(),
            activity_log: InMemoryActivityLog::new(),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            instances: Arc::new(self.instances.clone()),
            recordings: Arc::new(self.recordings.clone()),
            directory: Arc::new(self.directory.clone()),
            activity_log: Arc::new(self.activity_log.clone()),
        }
    }

    /// Builder over these collaborators and an arbitrary transport.
    pub fn fixture_builder(
        &self,
        config: Config,
        transport: Arc<dyn MockTransport>,
    ) -> FixtureBuilder {
        FixtureBuilder::new(config, self.collaborators(), transport)
    }

    /// Builder over these collaborators talking HTTP to `config`'s server.
    pub fn connect(&self, config: Config) -> Result<FixtureBuilder, FixtureError> {
        FixtureBuilder::connect(config, self.collaborators())
    }
}

/// The course registered by [`TestCollaborators::standard`].
pub fn test_course() -> CourseSummary {
    CourseSummary {
        id: TEST_COURSE_ID,
        fullname: TEST_COURSE_FULLNAME.to_string(),
        shortname: TEST_COURSE_SHORTNAME.to_string(),
    }
}
