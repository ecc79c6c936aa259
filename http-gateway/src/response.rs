//! Owned HTTP response returned by the gateway

use std::borrow::Cow;
use std::io::Read;

use serde::de::DeserializeOwned;

use crate::error::{GatewayError, Result};

/// A fully-read HTTP response
///
/// The body is read eagerly because the gateway has to inspect it before
/// deciding whether the call failed. Nothing is parsed or decoded
/// automatically: the body is kept as the raw bytes the server sent, with no
/// size cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub(crate) status: u16,
    pub(crate) status_text: String,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl Response {
    /// Drain a ureq response into an owned one
    pub(crate) fn read(response: ureq::Response) -> Result<Self> {
        let status = response.status();
        let status_text = response.status_text().to_string();
        let url = response.get_url().to_string();

        let mut headers = Vec::new();
        for name in response.headers_names() {
            for value in response.all(&name) {
                headers.push((name.clone(), value.to_string()));
            }
        }

        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(GatewayError::fetch)?;

        Ok(Self {
            status,
            status_text,
            url,
            headers,
            body,
        })
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Final URL after redirects
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of the named header, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Raw body exactly as received
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// Body as text; invalid UTF-8 sequences become U+FFFD
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Body as text, failing on invalid UTF-8
    pub fn text_strict(&self) -> Result<&str> {
        std::str::from_utf8(&self.body).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}
