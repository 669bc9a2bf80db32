//! Webtrail Capture — network traffic observation and normalization.
//!
//! Turns raw request/response callbacks from a browsing engine into
//! normalized network events, filtered to the session's root domain.

pub mod body;
pub mod pipeline;

pub use body::{
    decode_request_body, decode_response_body, is_binary_content_type, InlineBody, ResponseBody,
};
pub use pipeline::{CapturePipeline, CompletedResponse, FailedRequest};
