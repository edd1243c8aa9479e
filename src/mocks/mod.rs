//! In-memory hosts that record every call, for exercising the orchestration without HTTP.

mod source;

pub use source::{FakeSource, SourceCall, DEFAULT_BRANCH, LATEST_COMMIT};
pub use target::{FakeTarget, TargetCall};

use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::Error;

pub fn remote_failure(what: &str) -> Error {
    Error::Status {
        method: Method::POST,
        url: Url::parse("https://fake.invalid/").unwrap(),
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: format!("{} blew up", what),
    }
}
