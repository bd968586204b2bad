//! BigBlueButton activity fixtures
//!
//! Builds test fixtures for the BigBlueButton activity module: activity
//! instances with resolved participant rules, mocked in-progress meetings,
//! mocked recordings and activity log entries.
//!
//! # Architecture
//!
//! ```text
//! FixtureBuilder -> ParticipantResolver -> Directory
//!                -> flatten -> MockTransport -> mock BBB server
//!                -> InstanceStore / RecordingStore / ActivityLog
//! ```
//!
//! Storage is reached only through the collaborator traits in
//! [`collaborators`]; the mock server only through [`transport::MockTransport`].
//!
//! # Modules
//!
//! - `builder` - Fixture orchestration
//! - `collaborators` - Store, directory and log traits
//! - `config` - Configuration from environment
//! - `errors` - Fixture error type
//! - `flatten` - Nested mock data to flat query parameters
//! - `models` - Fixture data models
//! - `participants` - Participant selection rules
//! - `transport` - Mock server HTTP client
//! - `xml` - Owned XML reply trees

pub mod builder;
pub mod collaborators;
pub mod config;
pub mod errors;
pub mod flatten;
pub mod models;
pub mod participants;
pub mod transport;
pub mod xml;

pub use builder::FixtureBuilder;
pub use collaborators::Collaborators;
pub use config::Config;
pub use errors::FixtureError;
