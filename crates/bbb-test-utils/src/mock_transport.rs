//! Transport stub for builder tests that do not need HTTP.
//!
//! Captures every [`MockRequest`] and answers with a canned XML reply per
//! endpoint.

use bbb_fixtures::transport::{MockRequest, MockTransport};
use bbb_fixtures::xml::XmlNode;
use bbb_fixtures::FixtureError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Reply used for endpoints without a canned reply.
pub const SUCCESS_REPLY: &str = "<response><returncode>SUCCESS</returncode></response>";

/// Mock server transport that never leaves the process.
pub struct MockTransportStub {
    replies: HashMap<String, String>,
    requests: Mutex<Vec<MockRequest>>,
    call_count: AtomicUsize,
    return_error: bool,
}

impl Default for MockTransportStub {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransportStub {
    /// Stub answering `SUCCESS` to everything.
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            return_error: false,
        }
    }

    /// Stub whose `createRecording` reply carries `record_id`.
    pub fn recording(record_id: &str) -> Self {
        Self::new().with_reply(
            "backoffice/createRecording",
            crate::mock_server::xml_reply(&[("recordID", record_id)]),
        )
    }

    /// Stub failing every request with a transport error.
    pub fn failing() -> Self {
        Self {
            return_error: true,
            ..Self::new()
        }
    }

    /// Answer `endpoint` with `xml`.
    #[must_use]
    pub fn with_reply(mut self, endpoint: impl Into<String>, xml: impl Into<String>) -> Self {
        self.replies.insert(endpoint.into(), xml.into());
        self
    }

    /// Number of requests sent, including failed ones.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests sent to `endpoint`, in order.
    pub fn requests_to(&self, endpoint: &str) -> Vec<MockRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.endpoint == endpoint)
            .collect()
    }
}

#[async_trait::async_trait]
impl MockTransport for MockTransportStub {
    async fn send(&self, request: MockRequest) -> Result<XmlNode, FixtureError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let reply = self
            .replies
            .get(&request.endpoint)
            .cloned()
            .unwrap_or_else(|| SUCCESS_REPLY.to_string());
        self.requests.lock().unwrap().push(request);

        if self.return_error {
            return Err(FixtureError::Transport(
                "Mock transport error".to_string(),
            ));
        }

        XmlNode::parse(&reply)
    }
}
