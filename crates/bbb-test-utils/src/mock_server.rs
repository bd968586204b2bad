//! wiremock-backed mock BBB server.
//!
//! Stands in for the real mock server's `backoffice/*` endpoints so builder
//! tests can assert on the exact query strings sent.
//!
//! # Example
//!
//! ```rust,ignore
//! let server = MockBbbServer::start().await;
//! server.mount_create_recording("rec-1").await;
//!
//! let builder = TestCollaborators::standard().connect(server.config())?;
//! // ...
//! let sent = server.requests_to("backoffice/createRecording").await;
//! assert_eq!(query_value(&sent[0], "meta_bbb-recording-name").as_deref(), Some("Demo"));
//! ```

use bbb_fixtures::Config;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// A `SUCCESS` XML reply carrying `fields` as child elements.
pub fn xml_reply(fields: &[(&str, &str)]) -> String {
    let mut xml = String::from("<response><returncode>SUCCESS</returncode>");
    for (name, value) in fields {
        xml.push_str(&format!("<{name}>{}</{name}>", escape(value)));
    }
    xml.push_str("</response>");
    xml
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Query parameters of a captured request, in order.
pub fn query_params(request: &Request) -> Vec<(String, String)> {
    request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Value of the query parameter `name` of a captured request.
pub fn query_value(request: &Request, name: &str) -> Option<String> {
    query_params(request)
        .into_iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v)
}

/// A mock BBB server on a random local port.
pub struct MockBbbServer {
    server: MockServer,
}

impl MockBbbServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Fixture configuration pointing at this server.
    pub fn config(&self) -> Config {
        Config::new(self.uri())
    }

    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// Answer GET `/{endpoint}` with `xml`.
    pub async fn mount_reply(&self, endpoint: &str, xml: impl Into<String>) {
        Mock::given(method("GET"))
            .and(path(format!("/{}", endpoint)))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/xml")
                    .set_body_string(xml.into()),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mount_create_recording(&self, record_id: &str) {
        self.mount_reply(
            "backoffice/createRecording",
            xml_reply(&[("recordID", record_id)]),
        )
        .await;
    }

    pub async fn mount_create_meeting(&self) {
        self.mount_reply("backoffice/createMeeting", xml_reply(&[]))
            .await;
    }

    /// Answer `backoffice/recordings` with a listing of `record_ids`.
    pub async fn mount_recordings(&self, record_ids: &[&str]) {
        let mut xml = String::from("<response><returncode>SUCCESS</returncode><recordings>");
        for id in record_ids {
            xml.push_str(&format!(
                "<recording><recordID>{}</recordID><published>true</published></recording>",
                escape(id)
            ));
        }
        xml.push_str("</recordings></response>");
        self.mount_reply("backoffice/recordings", xml).await;
    }

    pub async fn mount_reset(&self) {
        self.mount_reply("backoffice/reset", xml_reply(&[])).await;
    }

    /// Answer `endpoint` with an HTTP error status.
    pub async fn mount_failure(&self, endpoint: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/{}", endpoint)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Fail the test on drop if any request reaches the server.
    pub async fn expect_no_requests(&self) {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Requests received on `/{endpoint}`, in order.
    pub async fn requests_to(&self, endpoint: &str) -> Vec<Request> {
        let wanted = format!("/{}", endpoint);
        self.received_requests()
            .await
            .into_iter()
            .filter(|r| r.url.path() == wanted)
            .collect()
    }
}
