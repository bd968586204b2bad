//! Fixture data models.

pub mod activity_log;
pub mod instance;
pub mod meeting;
pub mod recording;

pub use activity_log::{LogEvent, LogRecord};
pub use instance::{CourseSummary, Instance, InstanceFields};
pub use meeting::{MeetingFixture, MeetingRequest};
pub use recording::{
    parse_bool_flag, RecordingFilter, RecordingFixture, RecordingRequest, RecordingState,
    DEFAULT_PRESENTER_NAME,
};
