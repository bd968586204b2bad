//! # BBB Test Utilities
//!
//! Shared test utilities for the BigBlueButton fixture generator.
//!
//! ## Modules
//!
//! - `stores` - In-memory instance, recording, directory and log collaborators
//! - `mock_transport` - Transport stub with canned XML replies
//! - `mock_server` - wiremock-backed mock BBB server
//! - `fixtures` - Instance field builders
//! - `test_ids` - Fixed ids for deterministic tests
//! - `tracing_init` - One-time tracing setup for test binaries
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bbb_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     init_test_tracing();
//!
//!     let server = MockBbbServer::start().await;
//!     server.mount_create_recording(TEST_RECORD_ID).await;
//!
//!     let stores = TestCollaborators::standard();
//!     let builder = stores.connect(server.config()).unwrap();
//!     let instance = builder
//!         .create_instance(TestInstance::new().with_name("Room").build())
//!         .unwrap();
//!
//!     // Run your test...
//! }
//! ```

pub mod fixtures;
pub mod mock_server;
pub mod mock_transport;
pub mod stores;
pub mod test_ids;
pub mod tracing_init;

// Re-export commonly used items
pub use fixtures::*;
pub use mock_server::*;
pub use mock_transport::*;
pub use stores::*;
pub use test_ids::*;
pub use tracing_init::*;
