//! Collaborator interfaces consumed by the fixture builder.
//!
//! Storage of instances, recordings and log entries belongs to the plugin;
//! the builder only sees these traits. Each is injected through
//! [`Collaborators`] so no global database handle is needed.

use crate::errors::FixtureError;
use crate::models::{
    Instance, InstanceFields, LogEvent, LogRecord, RecordingFilter, RecordingFixture,
};
use common::types::{GroupId, InstanceId};
use std::sync::Arc;

/// Activity instance storage.
pub trait InstanceStore: Send + Sync {
    /// Persist a new instance record and return its id.
    fn create_instance(&self, fields: InstanceFields) -> Result<InstanceId, FixtureError>;

    /// Load an instance; a missing id is a `NotFound` error.
    fn get_from_instance_id(&self, id: InstanceId) -> Result<Instance, FixtureError>;

    /// Instance narrowed to a group.
    fn get_group_instance_from_instance(
        &self,
        instance: &Instance,
        group_id: GroupId,
    ) -> Result<Instance, FixtureError> {
        let mut group_instance = instance.clone();
        group_instance.set_group_id(group_id);
        Ok(group_instance)
    }
}

/// Recording storage.
pub trait RecordingStore: Send + Sync {
    fn read_by(&self, filter: &RecordingFilter) -> Result<Option<RecordingFixture>, FixtureError>;

    /// Persist a recording and return its store id.
    fn create(&self, recording: &RecordingFixture) -> Result<i64, FixtureError>;
}

/// Role and user directory.
pub trait Directory: Send + Sync {
    /// Role id for a role short name.
    fn find_role_id(&self, shortname: &str) -> Result<Option<i64>, FixtureError>;

    /// User id for a username.
    fn find_user_id(&self, username: &str) -> Result<Option<i64>, FixtureError>;
}

/// Activity log writer.
pub trait ActivityLog: Send + Sync {
    fn log(
        &self,
        activity: &Instance,
        event: LogEvent,
        record: &LogRecord,
    ) -> Result<(), FixtureError>;
}

/// The set of collaborators a [`crate::builder::FixtureBuilder`] works with.
#[derive(Clone)]
pub struct Collaborators {
    pub instances: Arc<dyn InstanceStore>,
    pub recordings: Arc<dyn RecordingStore>,
    pub directory: Arc<dyn Directory>,
    pub activity_log: Arc<dyn ActivityLog>,
}
