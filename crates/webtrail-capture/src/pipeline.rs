//! Capture pipeline — filters observed traffic and assembles network events.
//!
//! The browsing engine reports each request exactly once, on one of two
//! callbacks: a completed response or a transport-level failure. Requests
//! outside the session's root domain are discarded silently. A sink error
//! is isolated per event so capture of subsequent traffic continues.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use webtrail_core::{now_ms, Event, EventSink, NetworkEvent};
use webtrail_domain::is_subdomain_of;

use crate::body::{decode_request_body, decode_response_body, ResponseBody};

/// A request that completed with an HTTP response.
#[derive(Debug, Clone)]
pub struct CompletedResponse {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub request_headers: HashMap<String, String>,
    /// Raw outgoing payload, if the request carried one.
    pub post_data: Option<String>,
    pub response_headers: HashMap<String, String>,
}

/// A request that failed at the transport level (never an HTTP status).
#[derive(Debug, Clone)]
pub struct FailedRequest {
    pub method: String,
    pub url: String,
    pub request_headers: HashMap<String, String>,
    pub post_data: Option<String>,
    /// Engine-reported failure description (e.g. "net::ERR_CONNECTION_REFUSED").
    pub failure: String,
}

/// Per-attachment capture pipeline. The root domain is fixed for the
/// lifetime of one pipeline; rebinding means constructing a new one.
pub struct CapturePipeline {
    root_domain: String,
    sink: Arc<dyn EventSink>,
}

impl CapturePipeline {
    pub fn new(root_domain: impl Into<String>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            root_domain: root_domain.into(),
            sink,
        }
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    /// Callback for a completed response. The body source is only read for
    /// non-binary content types.
    pub fn on_response(&self, response: CompletedResponse, body: &mut dyn ResponseBody) {
        if !is_subdomain_of(&response.url, &self.root_domain) {
            debug!("filtered out-of-domain response: {}", response.url);
            return;
        }

        let content_type = header_value(&response.response_headers, "content-type")
            .unwrap_or_default()
            .to_string();

        let event = NetworkEvent {
            timestamp: now_ms(),
            url: response.url,
            method: response.method,
            request_headers: response.request_headers,
            request_body: decode_request_body(response.post_data.as_deref()),
            response_status: Some(response.status),
            response_headers: response.response_headers,
            response_body: decode_response_body(&content_type, body),
            error: None,
        };

        self.deliver(Event::Network(event));
    }

    /// Callback for a request that never completed.
    pub fn on_request_failed(&self, request: FailedRequest) {
        if !is_subdomain_of(&request.url, &self.root_domain) {
            debug!("filtered out-of-domain failure: {}", request.url);
            return;
        }

        let event = NetworkEvent {
            timestamp: now_ms(),
            url: request.url,
            method: request.method,
            request_headers: request.request_headers,
            request_body: decode_request_body(request.post_data.as_deref()),
            response_status: None,
            response_headers: HashMap::new(),
            response_body: webtrail_core::BodyValue::Absent,
            error: Some(request.failure),
        };

        self.deliver(Event::Network(event));
    }

    fn deliver(&self, event: Event) {
        if let Err(e) = self.sink.emit(event) {
            warn!("event sink rejected network event: {}", e);
        }
    }
}

fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::InlineBody;
    use parking_lot::Mutex;
    use webtrail_core::BodyValue;

    /// Sink collecting emitted events; optionally errors on every emit.
    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<Event>>,
        fail: bool,
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: Event) -> webtrail_core::Result<()> {
            if self.fail {
                return Err(webtrail_core::Error::Sink("sink offline".into()));
            }
            self.events.lock().push(event);
            Ok(())
        }
    }

    fn completed(url: &str) -> CompletedResponse {
        CompletedResponse {
            method: "GET".into(),
            url: url.into(),
            status: 200,
            request_headers: HashMap::from([("accept".into(), "*/*".into())]),
            post_data: None,
            response_headers: HashMap::from([(
                "Content-Type".into(),
                "application/json".into(),
            )]),
        }
    }

    #[test]
    fn test_out_of_domain_response_discarded() {
        let sink = Arc::new(RecordingSink::default());
        let pipeline = CapturePipeline::new("example.com", sink.clone());

        let mut body = InlineBody::new(Some("{}".into()));
        pipeline.on_response(completed("https://tracker.ads.net/pixel"), &mut body);

        assert!(sink.events.lock().is_empty());
    }

    #[test]
    fn test_matching_response_emitted() {
        let sink = Arc::new(RecordingSink::default());
        let pipeline = CapturePipeline::new("example.com", sink.clone());

        let mut body = InlineBody::new(Some(r#"{"result":"success"}"#.into()));
        pipeline.on_response(completed("https://api.example.com/data"), &mut body);

        let events = sink.events.lock();
        assert_eq!(events.len(), 1);
        let Event::Network(event) = &events[0] else {
            panic!("expected network event");
        };
        assert_eq!(event.url, "https://api.example.com/data");
        assert_eq!(event.method, "GET");
        assert_eq!(event.response_status, Some(200));
        assert_eq!(
            event.response_body,
            BodyValue::Json(serde_json::json!({"result": "success"}))
        );
        assert_eq!(event.request_body, BodyValue::Absent);
        assert!(event.error.is_none());
        assert!(event.timestamp > 0);
    }

    #[test]
    fn test_post_data_decoded() {
        let sink = Arc::new(RecordingSink::default());
        let pipeline = CapturePipeline::new("example.com", sink.clone());

        let mut response = completed("https://example.com/api");
        response.method = "POST".into();
        response.post_data = Some(r#"{"name":"test"}"#.into());
        let mut body = InlineBody::new(Some("ok".into()));
        pipeline.on_response(response, &mut body);

        let events = sink.events.lock();
        let Event::Network(event) = &events[0] else {
            panic!("expected network event");
        };
        assert_eq!(event.request_body, BodyValue::Json(serde_json::json!({"name": "test"})));
    }

    #[test]
    fn test_failed_request_shape() {
        let sink = Arc::new(RecordingSink::default());
        let pipeline = CapturePipeline::new("example.com", sink.clone());

        pipeline.on_request_failed(FailedRequest {
            method: "GET".into(),
            url: "https://shop.example.com/down".into(),
            request_headers: HashMap::new(),
            post_data: None,
            failure: "net::ERR_CONNECTION_REFUSED".into(),
        });

        let events = sink.events.lock();
        assert_eq!(events.len(), 1);
        let Event::Network(event) = &events[0] else {
            panic!("expected network event");
        };
        assert_eq!(event.response_status, None);
        assert!(event.response_headers.is_empty());
        assert_eq!(event.response_body, BodyValue::Absent);
        assert_eq!(event.error.as_deref(), Some("net::ERR_CONNECTION_REFUSED"));
    }

    #[test]
    fn test_out_of_domain_failure_discarded() {
        let sink = Arc::new(RecordingSink::default());
        let pipeline = CapturePipeline::new("example.com", sink.clone());

        pipeline.on_request_failed(FailedRequest {
            method: "GET".into(),
            url: "https://fakeexample.com/".into(),
            request_headers: HashMap::new(),
            post_data: None,
            failure: "net::ERR_ABORTED".into(),
        });

        assert!(sink.events.lock().is_empty());
    }

    #[test]
    fn test_sink_error_does_not_stop_capture() {
        let failing = Arc::new(RecordingSink {
            events: Mutex::new(Vec::new()),
            fail: true,
        });
        let pipeline = CapturePipeline::new("example.com", failing);

        let mut body = InlineBody::new(Some("{}".into()));
        pipeline.on_response(completed("https://example.com/one"), &mut body);

        // Subsequent traffic is still processed after a sink failure.
        let working = Arc::new(RecordingSink::default());
        let pipeline = CapturePipeline::new("example.com", working.clone());
        let mut body = InlineBody::new(Some("{}".into()));
        pipeline.on_response(completed("https://example.com/two"), &mut body);
        assert_eq!(working.events.lock().len(), 1);
    }

    #[test]
    fn test_content_type_lookup_case_insensitive() {
        let sink = Arc::new(RecordingSink::default());
        let pipeline = CapturePipeline::new("example.com", sink.clone());

        let mut response = completed("https://example.com/logo");
        response
            .response_headers
            .insert("Content-Type".into(), "image/png".into());
        pipeline.on_response(response, &mut InlineBody::new(Some("raw png".into())));

        let events = sink.events.lock();
        let Event::Network(event) = &events[0] else {
            panic!("expected network event");
        };
        assert_eq!(event.response_body, BodyValue::Binary);
    }
}
