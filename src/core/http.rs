//! HTTP artifact store.
//!
//! Artifacts are exchanged as `{"long_string": "<document>"}` at
//! `{base_url}/{id}`: GET to fetch, POST to publish. The identifier is
//! percent-encoded as a single path segment.

use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::ArtifactStore;

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactPayload {
    long_string: String,
}

fn http_error(url: &str, e: reqwest::Error) -> Error {
    Error::remote_request_failed(url, e.status().map(|s| s.as_u16()), e.to_string())
}

/// Remote document store reachable over HTTP.
pub struct RemoteStore {
    client: Client,
    base_url: String,
    base: Url,
}

impl RemoteStore {
    pub fn new(base_url: &str) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');

        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(Error::validation_invalid_argument(
                "url",
                "Remote store URL must start with http:// or https://",
                Some(base_url.to_string()),
            ));
        }

        let base = Url::parse(trimmed).map_err(|e| {
            Error::validation_invalid_argument(
                "url",
                format!("Invalid remote store URL: {}", e),
                Some(base_url.to_string()),
            )
        })?;

        Ok(Self {
            client: Client::new(),
            base_url: trimmed.to_string(),
            base,
        })
    }

    pub fn url_for(&self, id: &str) -> Result<String> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::internal_unexpected(format!("Cannot append a path to {}", self.base_url))
            })?
            .pop_if_empty()
            .push(id);
        Ok(url.to_string())
    }
}

impl ArtifactStore for RemoteStore {
    fn read(&self, id: &str) -> Result<String> {
        let url = self.url_for(id)?;
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| http_error(&url, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::artifact_not_found(id, self.describe()));
        }

        let body = success_body(&url, response)?;
        decode_payload(&url, &body)
    }

    fn write(&self, id: &str, content: &str) -> Result<()> {
        let url = self.url_for(id)?;
        let response = self
            .client
            .post(&url)
            .json(&ArtifactPayload {
                long_string: content.to_string(),
            })
            .send()
            .map_err(|e| http_error(&url, e))?;

        if response.status() == StatusCode::CONFLICT {
            return Err(Error::artifact_write_conflict(id, self.describe()));
        }

        success_body(&url, response)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("url:{}", self.base_url)
    }
}

fn success_body(url: &str, response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().map_err(|e| http_error(url, e))?;

    if !status.is_success() {
        return Err(Error::remote_request_failed(
            url,
            Some(status.as_u16()),
            format!("HTTP {}: {}", status.as_u16(), body),
        ));
    }

    Ok(body)
}

fn decode_payload(url: &str, body: &str) -> Result<String> {
    serde_json::from_str::<ArtifactPayload>(body)
        .map(|payload| payload.long_string)
        .map_err(|e| Error::remote_invalid_response(url, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_for_joins_without_double_slash() {
        let store = RemoteStore::new("https://splunk.example.com/api/").unwrap();
        assert_eq!(
            store.url_for("prod_report_1").unwrap(),
            "https://splunk.example.com/api/prod_report_1"
        );
        assert_eq!(store.describe(), "url:https://splunk.example.com/api");
    }

    #[test]
    fn url_for_encodes_identifier_as_one_segment() {
        let store = RemoteStore::new("https://splunk.example.com/api").unwrap();
        assert_eq!(
            store.url_for("dash?x=1#top%").unwrap(),
            "https://splunk.example.com/api/dash%3Fx=1%23top%25"
        );
    }

    #[test]
    fn url_for_on_bare_host_has_single_slash() {
        let store = RemoteStore::new("http://localhost:8089").unwrap();
        assert_eq!(store.url_for("dev_a").unwrap(), "http://localhost:8089/dev_a");
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = RemoteStore::new("ftp://example.com").err().unwrap();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn payload_round_trips_long_string_field() {
        let encoded = serde_json::to_string(&ArtifactPayload {
            long_string: "<dashboard/>".to_string(),
        })
        .unwrap();
        assert_eq!(encoded, r#"{"long_string":"<dashboard/>"}"#);
        assert_eq!(decode_payload("u", &encoded).unwrap(), "<dashboard/>");
    }

    #[test]
    fn payload_without_long_string_is_invalid() {
        let err = decode_payload("http://x/a", r#"{"text":"nope"}"#).unwrap_err();
        assert_eq!(err.code.as_str(), "remote.invalid_response");
    }
}
