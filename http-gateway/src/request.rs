//! Per-request options shared by all four verbs

use std::time::Duration;

use serde_json::Value;

/// Optional inputs to a gateway request
///
/// When both `data` and `json` are set, the form data is sent and the JSON
/// body is ignored.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Body sent as `application/x-www-form-urlencoded`
    pub data: Option<Vec<(String, String)>>,
    /// Body sent as `application/json`
    pub json: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<(String, String)>,
    /// Overall timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.data = Some(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Headers to send as-is; `Cookie` entries are folded into [`cookie_header`]
    ///
    /// [`cookie_header`]: RequestOptions::cookie_header
    pub(crate) fn plain_headers(&self) -> impl Iterator<Item = &(String, String)> {
        self.headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("cookie"))
    }

    /// Value of the single `Cookie` header to send, if any
    ///
    /// Raw `Cookie` values passed through [`header`](RequestOptions::header)
    /// come first, followed by the pairs added with
    /// [`cookie`](RequestOptions::cookie). Nothing is dropped.
    pub(crate) fn cookie_header(&self) -> Option<String> {
        let parts: Vec<String> = self
            .headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("cookie"))
            .map(|(_, value)| value.trim().trim_end_matches(';').to_string())
            .filter(|value| !value.is_empty())
            .chain(
                self.cookies
                    .iter()
                    .map(|(name, value)| format!("{}={}", name, value)),
            )
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}
