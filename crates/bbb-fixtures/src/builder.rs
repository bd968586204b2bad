//! Fixture builder.
//!
//! Creates activity instances, mocked meetings, mocked recordings and
//! activity log entries. Instance and recording records go through the
//! injected [`Collaborators`]; anything that lives on the conferencing side
//! is pushed to the mock server through a [`MockTransport`].

use crate::collaborators::Collaborators;
use crate::config::Config;
use crate::errors::FixtureError;
use crate::flatten::{FlatParam, MockData};
use crate::models::{
    Instance, InstanceFields, LogEvent, LogRecord, MeetingFixture, MeetingRequest,
    RecordingFilter, RecordingFixture, RecordingRequest, DEFAULT_PRESENTER_NAME,
};
use crate::participants::ParticipantResolver;
use crate::transport::{MockRequest, MockServerClient, MockTransport};
use crate::xml::XmlNode;
use chrono::Utc;
use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};
use ring::rand::{SecureRandom, SystemRandom};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Field holding the JSON-encoded participant rules of an instance.
pub const PARTICIPANTS_FIELD: &str = "participants";

/// Default moderator password of new instances.
pub const DEFAULT_MODERATOR_PASSWORD: &str = "mp";

/// Default viewer password of new instances.
pub const DEFAULT_VIEWER_PASSWORD: &str = "ap";

/// `bbb-origin-tag` meta value sent with mocked meetings.
pub const ORIGIN_TAG: &str = concat!(
    "moodle-mod_bigbluebuttonbn (",
    env!("CARGO_PKG_VERSION"),
    ")"
);

const CREATE_MEETING_ENDPOINT: &str = "backoffice/createMeeting";
const CREATE_RECORDING_ENDPOINT: &str = "backoffice/createRecording";
const RECORDINGS_ENDPOINT: &str = "backoffice/recordings";
const RESET_ENDPOINT: &str = "backoffice/reset";

/// Builds fixtures against a set of collaborators and a mock server.
#[derive(Clone)]
pub struct FixtureBuilder {
    config: Config,
    collaborators: Collaborators,
    transport: Arc<dyn MockTransport>,
}

impl FixtureBuilder {
    pub fn new(
        config: Config,
        collaborators: Collaborators,
        transport: Arc<dyn MockTransport>,
    ) -> Self {
        Self {
            config,
            collaborators,
            transport,
        }
    }

    /// Builder talking HTTP to the mock server named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Transport` if the HTTP client cannot be built.
    pub fn connect(config: Config, collaborators: Collaborators) -> Result<Self, FixtureError> {
        let transport = Arc::new(MockServerClient::new(&config)?);
        Ok(Self::new(config, collaborators, transport))
    }

    /// Create an activity instance.
    ///
    /// The `moderators`/`viewers` selection strings are resolved and
    /// replaced by the JSON `participants` field, overwriting any
    /// participants value the caller supplied. Absent or `null` columns get
    /// their defaults; supplied values are kept.
    ///
    /// # Errors
    ///
    /// Participant resolution errors, `Serialization` if the rules cannot be
    /// encoded, and any error of the instance store.
    #[instrument(skip(self, fields), fields(field_count = fields.len()))]
    pub fn create_instance(&self, mut fields: InstanceFields) -> Result<Instance, FixtureError> {
        let resolver = ParticipantResolver::new(self.collaborators.directory.as_ref());
        let rules = resolver.resolve_participants(&mut fields)?;
        fields.insert(
            PARTICIPANTS_FIELD.to_string(),
            Value::String(serde_json::to_string(&rules)?),
        );

        let now = Utc::now().timestamp();
        let defaults = [
            ("type", json!(0)),
            ("meetingid", Value::String(random_meeting_id()?)),
            ("record", Value::Bool(true)),
            ("moderatorpass", json!(DEFAULT_MODERATOR_PASSWORD)),
            ("viewerpass", json!(DEFAULT_VIEWER_PASSWORD)),
            ("timecreated", json!(now)),
            ("timemodified", json!(now)),
            ("presentation", Value::Null),
        ];

        for (key, value) in defaults {
            if fields.get(key).is_none_or(Value::is_null) {
                fields.insert(key.to_string(), value);
            }
        }

        let instances = &self.collaborators.instances;
        let id = instances.create_instance(fields)?;
        let instance = instances.get_from_instance_id(id)?;

        info!(
            target: "bbb.fixtures.builder",
            instance_id = %id,
            meeting_id = %instance.meeting_id(),
            rules = rules.len(),
            "Instance created"
        );
        Ok(instance)
    }

    /// Create a recording on the mock server and persist it.
    ///
    /// A native recording starts out `notified` (or in the requested state)
    /// with an empty payload. An imported recording copies the stored
    /// recording named by `imported_id` and takes its payload from the mock
    /// server's `backoffice/recordings` reply.
    ///
    /// # Errors
    ///
    /// - `Configuration` for an imported recording without a usable
    ///   `imported_id` (blank or `"0"`); raised before any request is sent
    /// - `NotFound` when the instance or the source recording is missing
    /// - `Transport` when the mock server fails or its reply has no
    ///   `recordID`
    #[instrument(skip(self, request), fields(instance_id = %request.bigbluebuttonbn_id))]
    pub async fn create_recording(
        &self,
        request: RecordingRequest,
    ) -> Result<RecordingFixture, FixtureError> {
        let imported = request.is_imported();
        let mut instance = self
            .collaborators
            .instances
            .get_from_instance_id(request.bigbluebuttonbn_id)?;

        let mut recording = if imported {
            self.imported_source(&request)?
        } else {
            RecordingFixture {
                id: None,
                bigbluebuttonbn_id: instance.instance_id(),
                meeting_id: String::new(),
                course_id: instance.course_id(),
                group_id: None,
                state: request.state.unwrap_or_default(),
                imported: false,
                headless: false,
                recording: String::new(),
                recording_id: String::new(),
            }
        };

        if let Some(group_id) = request.group_id.filter(|g| g.0 != 0) {
            instance.set_group_id(group_id);
            recording.group_id = Some(group_id);
        }

        recording.bigbluebuttonbn_id = instance.instance_id();
        recording.meeting_id = instance.meeting_id();
        recording.course_id = instance.course_id();

        if recording.imported {
            let reply = self
                .send_mock_request(
                    RECORDINGS_ENDPOINT,
                    vec![
                        FlatParam::new("meetingID", recording.meeting_id.as_str()),
                        FlatParam::new("recordID", recording.meeting_id.as_str()),
                    ],
                    &MockData::new(),
                )
                .await?;
            recording.recording = serde_json::to_string(&reply.to_json())?;
        }

        let mut data = recording.to_mock_data();
        data.insert_nested(
            "meta",
            [
                ("isBreakout", "false".to_string()),
                (
                    "bn-presenter-name",
                    request
                        .presenter_name
                        .clone()
                        .unwrap_or_else(|| DEFAULT_PRESENTER_NAME.to_string()),
                ),
                ("bn-recording-ready-url", self.recording_ready_url(&instance)),
                (
                    "bbb-recording-description",
                    request.description.clone().unwrap_or_default(),
                ),
                ("bbb-recording-name", request.name.clone().unwrap_or_default()),
                ("bbb-recording-tags", request.tags.clone().unwrap_or_default()),
            ],
        );

        let reply = self
            .send_mock_request(CREATE_RECORDING_ENDPOINT, Vec::new(), &data)
            .await?;
        recording.recording_id = reply
            .child_text("recordID")
            .map(str::to_string)
            .ok_or_else(|| {
                warn!(target: "bbb.fixtures.builder", meeting_id = %recording.meeting_id, "createRecording reply has no recordID");
                FixtureError::Transport("Mock server reply has no recordID".to_string())
            })?;

        let id = self.collaborators.recordings.create(&recording)?;
        recording.id = Some(id);

        info!(
            target: "bbb.fixtures.builder",
            recording_id = %recording.recording_id,
            meeting_id = %recording.meeting_id,
            imported = recording.imported,
            state = %recording.state,
            "Recording created"
        );
        Ok(recording)
    }

    /// Stored recording an imported fixture is copied from.
    fn imported_source(&self, request: &RecordingRequest) -> Result<RecordingFixture, FixtureError> {
        let source_id = request.source_recording_id().ok_or_else(|| {
            warn!(target: "bbb.fixtures.builder", instance_id = %request.bigbluebuttonbn_id, "Imported recording requested without importedid");
            FixtureError::Configuration(
                "An imported recording requires a source importedid".to_string(),
            )
        })?;

        let mut source = self
            .collaborators
            .recordings
            .read_by(&RecordingFilter::by_recording_id(source_id))?
            .ok_or_else(|| {
                warn!(target: "bbb.fixtures.builder", source_id = %source_id, "Source recording not found");
                FixtureError::NotFound(format!("no recording with recordingid '{}'", source_id))
            })?;

        source.id = None;
        source.imported = true;
        Ok(source)
    }

    fn recording_ready_url(&self, instance: &Instance) -> String {
        format!(
            "{}/mod/bigbluebuttonbn/bbb_broker.php?action=recording_ready&bigbluebuttonbn={}",
            self.config.site_url,
            instance.instance_id()
        )
    }

    /// Mock an in-progress meeting for an instance.
    ///
    /// Caller fields are sent first, led by `instanceid` and `groupid`;
    /// the instance-derived room keys replace caller fields of the same
    /// name. Nothing is persisted.
    ///
    /// # Errors
    ///
    /// Instance store errors and `Transport` failures.
    #[instrument(skip(self, request), fields(instance_id = %request.instance_id, group_id = ?request.group_id))]
    pub async fn create_meeting(
        &self,
        request: MeetingRequest,
    ) -> Result<MeetingFixture, FixtureError> {
        let instances = &self.collaborators.instances;
        let mut instance = instances.get_from_instance_id(request.instance_id)?;
        if let Some(group_id) = request.group_id {
            instance = instances.get_group_instance_from_instance(&instance, group_id)?;
        }

        let mut fields = vec![("instanceid".to_string(), request.instance_id.to_string())];
        if let Some(group_id) = request.group_id {
            fields.push(("groupid".to_string(), group_id.to_string()));
        }
        fields.extend(request.fields);

        let course = instance.course();
        let meeting = MeetingFixture {
            fields,
            meeting_id: instance.meeting_id(),
            meeting_name: instance.meeting_name().to_string(),
            attendee_password: instance.viewer_password().clone(),
            moderator_password: instance.moderator_password().clone(),
            voice_bridge: instance
                .voice_bridge()
                .map(|v| v.to_string())
                .unwrap_or_default(),
            meta: vec![
                ("bbb-context".to_string(), course.fullname.clone()),
                ("bbb-context-id".to_string(), course.id.to_string()),
                ("bbb-context-label".to_string(), course.shortname.clone()),
                ("bbb-context-name".to_string(), course.fullname.clone()),
                ("bbb-origin".to_string(), self.config.origin.clone()),
                ("bbb-origin-tag".to_string(), ORIGIN_TAG.to_string()),
                (
                    "bbb-recording-description".to_string(),
                    instance.meeting_description().to_string(),
                ),
                (
                    "bbb-recording-name".to_string(),
                    instance.meeting_name().to_string(),
                ),
            ],
        };

        self.send_mock_request(CREATE_MEETING_ENDPOINT, Vec::new(), &meeting.to_mock_data())
            .await?;

        info!(target: "bbb.fixtures.builder", meeting_id = %meeting.meeting_id, "Meeting created");
        Ok(meeting)
    }

    /// Write a `Create` log entry for an activity.
    ///
    /// The meeting id defaults to the activity's `{meetingid}-{course}-{id}`.
    #[instrument(skip(self, record), fields(instance_id = %record.bigbluebuttonbn_id))]
    pub fn create_log(&self, mut record: LogRecord) -> Result<(), FixtureError> {
        let activity = self
            .collaborators
            .instances
            .get_from_instance_id(record.bigbluebuttonbn_id)?;

        if record.meeting_id.is_none() {
            record.meeting_id = Some(activity.base_meeting_id());
        }

        self.collaborators
            .activity_log
            .log(&activity, LogEvent::Create, &record)
    }

    /// Send a request to the mock server.
    ///
    /// `params` come first, followed by the flattened `mock_data`; a later
    /// parameter of the same name replaces an earlier one.
    pub async fn send_mock_request(
        &self,
        endpoint: &str,
        params: Vec<FlatParam>,
        mock_data: &MockData,
    ) -> Result<XmlNode, FixtureError> {
        let request = MockRequest::new(endpoint)
            .with_params(params)
            .with_mock_data(mock_data);
        self.transport.send(request).await
    }

    /// Clear all meetings and recordings held by the mock server.
    #[instrument(skip(self))]
    pub async fn reset_mock(&self) -> Result<(), FixtureError> {
        self.send_mock_request(RESET_ENDPOINT, Vec::new(), &MockData::new())
            .await?;
        info!(target: "bbb.fixtures.builder", "Mock server reset");
        Ok(())
    }
}

/// Random 40 hex character meeting id.
fn random_meeting_id() -> Result<String, FixtureError> {
    let mut seed = [0u8; 32];
    SystemRandom::new().fill(&mut seed).map_err(|_| {
        warn!(target: "bbb.fixtures.builder", "System random source failed");
        FixtureError::Configuration("Failed to generate a meeting id".to_string())
    })?;
    Ok(hex::encode(digest(&SHA1_FOR_LEGACY_USE_ONLY, &seed)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::collaborators::{ActivityLog, Directory, InstanceStore, RecordingStore};
    use crate::models::{CourseSummary, RecordingState};
    use common::secret::ExposeSecret;
    use common::types::{CourseId, GroupId, InstanceId};
    use std::sync::Mutex;

    const RECORD_REPLY: &str =
        "<response><returncode>SUCCESS</returncode><recordID>rec-1</recordID></response>";

    #[derive(Default)]
    struct Stub {
        fields: Mutex<Vec<InstanceFields>>,
        recordings: Mutex<Vec<RecordingFixture>>,
        logs: Mutex<Vec<LogRecord>>,
    }

    impl InstanceStore for Stub {
        fn create_instance(&self, fields: InstanceFields) -> Result<InstanceId, FixtureError> {
            let mut all = self.fields.lock().unwrap();
            all.push(fields);
            Ok(InstanceId(all.len() as i64))
        }

        fn get_from_instance_id(&self, id: InstanceId) -> Result<Instance, FixtureError> {
            if id.0 == 404 {
                return Err(FixtureError::NotFound(format!("instance {}", id)));
            }
            let course = CourseSummary {
                id: CourseId(2),
                fullname: "Test course".to_string(),
                shortname: "tc".to_string(),
            };
            Ok(Instance::new(id, course, "abc")
                .with_name("Room")
                .with_description("Weekly"))
        }
    }

    impl RecordingStore for Stub {
        fn read_by(
            &self,
            filter: &RecordingFilter,
        ) -> Result<Option<RecordingFixture>, FixtureError> {
            let recordings = self.recordings.lock().unwrap();
            Ok(recordings.iter().find(|r| filter.matches(r)).cloned())
        }

        fn create(&self, recording: &RecordingFixture) -> Result<i64, FixtureError> {
            let mut recordings = self.recordings.lock().unwrap();
            recordings.push(recording.clone());
            Ok(recordings.len() as i64)
        }
    }

    impl Directory for Stub {
        fn find_role_id(&self, shortname: &str) -> Result<Option<i64>, FixtureError> {
            Ok((shortname == "student").then_some(5))
        }

        fn find_user_id(&self, _username: &str) -> Result<Option<i64>, FixtureError> {
            Ok(None)
        }
    }

    impl ActivityLog for Stub {
        fn log(
            &self,
            _activity: &Instance,
            event: LogEvent,
            record: &LogRecord,
        ) -> Result<(), FixtureError> {
            assert_eq!(event, LogEvent::Create);
            self.logs.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        requests: Mutex<Vec<MockRequest>>,
    }

    #[async_trait::async_trait]
    impl MockTransport for RecordingTransport {
        async fn send(&self, request: MockRequest) -> Result<XmlNode, FixtureError> {
            let reply = match request.endpoint.as_str() {
                RECORDINGS_ENDPOINT => "<response><recordings><recording><recordID>src</recordID></recording></recordings></response>",
                CREATE_RECORDING_ENDPOINT => RECORD_REPLY,
                _ => "<response><returncode>SUCCESS</returncode></response>",
            };
            self.requests.lock().unwrap().push(request);
            XmlNode::parse(reply)
        }
    }

    fn builder() -> (FixtureBuilder, Arc<Stub>, Arc<RecordingTransport>) {
        let stub = Arc::new(Stub::default());
        let transport = Arc::new(RecordingTransport::default());
        let collaborators = Collaborators {
            instances: stub.clone(),
            recordings: stub.clone(),
            directory: stub.clone(),
            activity_log: stub.clone(),
        };
        let builder = FixtureBuilder::new(
            Config::new("http://mock.test").with_site_url("https://lms.test"),
            collaborators,
            transport.clone(),
        );
        (builder, stub, transport)
    }

    #[test]
    fn test_random_meeting_id_is_sha1_hex() {
        let a = random_meeting_id().unwrap();
        let b = random_meeting_id().unwrap();

        assert_eq!(a.len(), 40);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_create_instance_applies_defaults() {
        let (builder, stub, _) = builder();
        let mut fields = InstanceFields::new();
        fields.insert("name".to_string(), json!("Room"));
        fields.insert("meetingid".to_string(), json!("fixed"));
        fields.insert("presentation".to_string(), Value::Null);

        builder.create_instance(fields).unwrap();

        let stored = stub.fields.lock().unwrap();
        let stored = &stored[0];
        assert_eq!(stored["meetingid"], json!("fixed"));
        assert_eq!(stored["type"], json!(0));
        assert_eq!(stored["record"], json!(true));
        assert_eq!(stored["moderatorpass"], json!("mp"));
        assert_eq!(stored["viewerpass"], json!("ap"));
        assert_eq!(stored["presentation"], Value::Null);
        assert_eq!(stored["timecreated"], stored["timemodified"]);
        assert_eq!(stored[PARTICIPANTS_FIELD], json!("[]"));
    }

    #[test]
    fn test_create_instance_overwrites_participants() {
        let (builder, stub, _) = builder();
        let mut fields = InstanceFields::new();
        fields.insert(PARTICIPANTS_FIELD.to_string(), json!("caller value"));
        fields.insert("viewers".to_string(), json!("role:student"));

        builder.create_instance(fields).unwrap();

        let stored = stub.fields.lock().unwrap();
        let participants: Value =
            serde_json::from_str(stored[0][PARTICIPANTS_FIELD].as_str().unwrap()).unwrap();
        assert_eq!(participants.as_array().unwrap().len(), 2);
        assert!(!stored[0].contains_key("viewers"));
    }

    #[tokio::test]
    async fn test_imported_without_source_sends_nothing() {
        let (builder, _, transport) = builder();
        let request = RecordingRequest::new(InstanceId(1)).with_imported_flag("1");

        let err = builder.create_recording(request).await.unwrap_err();

        assert!(matches!(err, FixtureError::Configuration(_)));
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_imported_source_zero_counts_as_missing() {
        let (builder, _, transport) = builder();
        let request = RecordingRequest::new(InstanceId(1)).imported_from("0");

        let err = builder.create_recording(request).await.unwrap_err();

        assert!(matches!(err, FixtureError::Configuration(_)));
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_native_recording() {
        let (builder, stub, transport) = builder();
        let request = RecordingRequest::new(InstanceId(3))
            .with_name("Demo")
            .with_group(GroupId(7));

        let recording = builder.create_recording(request).await.unwrap();

        assert_eq!(recording.recording_id, "rec-1");
        assert_eq!(recording.meeting_id, "abc-2-3[7]");
        assert_eq!(recording.state, RecordingState::Notified);
        assert_eq!(recording.id, Some(1));
        assert_eq!(stub.recordings.lock().unwrap().len(), 1);

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.endpoint, CREATE_RECORDING_ENDPOINT);
        assert_eq!(request.param("groupid"), Some("7"));
        assert_eq!(request.param("meta_bbb-recording-name"), Some("Demo"));
        assert_eq!(request.param("meta_bn-presenter-name"), Some("Fake presenter"));
        assert_eq!(
            request.param("meta_bn-recording-ready-url"),
            Some("https://lms.test/mod/bigbluebuttonbn/bbb_broker.php?action=recording_ready&bigbluebuttonbn=3")
        );
    }

    #[tokio::test]
    async fn test_imported_recording_fetches_payload() {
        let (builder, stub, transport) = builder();
        builder
            .create_recording(RecordingRequest::new(InstanceId(3)))
            .await
            .unwrap();

        let imported = builder
            .create_recording(RecordingRequest::new(InstanceId(4)).imported_from("rec-1"))
            .await
            .unwrap();

        assert!(imported.imported);
        assert_eq!(imported.bigbluebuttonbn_id, InstanceId(4));
        assert_eq!(
            imported.recording,
            r#"{"recordings":{"recording":{"recordID":"src"}}}"#
        );
        assert_eq!(stub.recordings.lock().unwrap().len(), 2);

        let requests = transport.requests.lock().unwrap();
        let fetch = &requests[1];
        assert_eq!(fetch.endpoint, RECORDINGS_ENDPOINT);
        assert_eq!(fetch.param("meetingID"), Some("abc-2-4"));
        assert_eq!(fetch.param("recordID"), Some("abc-2-4"));
        assert_eq!(requests[2].param("imported"), Some("true"));
    }

    #[tokio::test]
    async fn test_imported_source_missing_is_not_found() {
        let (builder, _, _) = builder();
        let err = builder
            .create_recording(RecordingRequest::new(InstanceId(1)).imported_from("nope"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_meeting_room_keys() {
        let (builder, _, transport) = builder();
        let meeting = builder
            .create_meeting(
                MeetingRequest::new(InstanceId(5))
                    .with_group(GroupId(1))
                    .with_field("meetingID", "ignored")
                    .with_field("participants", "2"),
            )
            .await
            .unwrap();

        assert_eq!(meeting.meeting_id, "abc-2-5[1]");
        assert_eq!(meeting.moderator_password.expose_secret(), "mp");
        assert_eq!(meeting.meta_value("bbb-origin"), Some("Moodle"));
        assert_eq!(meeting.meta_value("bbb-recording-description"), Some("Weekly"));

        let requests = transport.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.endpoint, CREATE_MEETING_ENDPOINT);
        assert_eq!(request.params[0].name, "instanceid");
        assert_eq!(request.param("meetingID"), Some("abc-2-5[1]"));
        assert_eq!(request.param("participants"), Some("2"));
        assert_eq!(request.param("meta_bbb-context-label"), Some("tc"));
    }

    #[test]
    fn test_create_log_defaults_meeting_id() {
        let (builder, stub, _) = builder();
        builder.create_log(LogRecord::new(InstanceId(6))).unwrap();
        builder
            .create_log(LogRecord::new(InstanceId(6)).with_meeting_id("custom"))
            .unwrap();

        let logs = stub.logs.lock().unwrap();
        assert_eq!(logs[0].meeting_id.as_deref(), Some("abc-2-6"));
        assert_eq!(logs[1].meeting_id.as_deref(), Some("custom"));
    }

    #[test]
    fn test_create_log_missing_instance() {
        let (builder, _, _) = builder();
        let err = builder.create_log(LogRecord::new(InstanceId(404))).unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_reset_mock() {
        let (builder, _, transport) = builder();
        builder.reset_mock().await.unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].endpoint, RESET_ENDPOINT);
        assert!(requests[0].params.is_empty());
    }
}
