//! Helpers shared by the resource services.

use crate::error::{ApiError, ApiResult};
use session_gateway::ApiResponse;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::{debug, warn};
use url::form_urlencoded;

/// Page selection for paged listings. The backend counts pages from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub(crate) fn append_to(&self, pairs: &mut Vec<(&'static str, String)>) {
        pairs.push(("page", self.page.to_string()));
        pairs.push(("size", self.size.to_string()));
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 10 }
    }
}

/// `path` with `pairs` appended as a percent-encoded query. Repeated keys
/// stay repeated, which the backend reads as a list.
pub(crate) fn with_query(path: &str, pairs: &[(&'static str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish();
    format!("{}?{}", path, query)
}

pub(crate) fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

pub(crate) fn expect_success(operation: &'static str, response: ApiResponse) -> ApiResult<ApiResponse> {
    if response.is_success() {
        debug!(operation, status = response.status(), "API call succeeded");
        return Ok(response);
    }

    let body = response.text();
    warn!(
        operation,
        status = response.status(),
        body_summary = %summarize_response_body(&body),
        "API call failed"
    );
    Err(ApiError::Api {
        status: response.status(),
        body,
    })
}
