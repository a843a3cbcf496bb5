//! HTTP client for the Obsidian Local REST API plugin

use std::time::Duration;

use chrono::{TimeZone, Utc};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;

use super::{RemoteNote, ServerStatus, VaultApi};
use crate::config::ProjectConfig;
use crate::{Error, Result};

/// Media type that makes the plugin return a note with its metadata.
const NOTE_JSON: &str = "application/vnd.olrapi.note+json";

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode each segment of a vault path, keeping the separators.
pub fn encode_vault_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Connection options for [`RestVault`].
#[derive(Debug, Clone)]
pub struct RestOptions {
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl Default for RestOptions {
    fn default() -> Self {
        Self {
            verify_tls: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Vault reached over the plugin's REST API.
pub struct RestVault {
    client: Client,
    host: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    files: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct NoteJson {
    content: String,
    #[serde(default)]
    path: Option<String>,
    stat: NoteStat,
}

#[derive(Debug, Deserialize)]
struct NoteStat {
    /// Milliseconds since the epoch
    mtime: i64,
    #[serde(default)]
    size: Option<u64>,
}

impl RestVault {
    pub fn new(host: &str, api_key: &str, options: RestOptions) -> Result<Self> {
        // Requests go straight to the configured host
        let client = Client::builder()
            .no_proxy()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(!options.verify_tls)
            .build()
            .map_err(|err| Error::Connectivity {
                endpoint: host.to_string(),
                status: None,
                message: format!("failed to build HTTP client: {err}"),
            })?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Client for the configured host and key.
    ///
    /// Fails with [`Error::MissingEnv`] when either is unset.
    pub fn from_config(config: &ProjectConfig) -> Result<Self> {
        let (host, key) = config.secrets.require_api()?;
        let obsidian = &config.settings.obsidian;
        Self::new(
            host,
            key,
            RestOptions {
                verify_tls: obsidian.verify_tls,
                timeout: Duration::from_secs(obsidian.timeout_seconds),
            },
        )
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.host, endpoint)
    }

    fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<Response> {
        request
            .bearer_auth(&self.api_key)
            .send()
            .map_err(|err| Error::Connectivity {
                endpoint: self.url(endpoint),
                status: None,
                message: err.to_string(),
            })
    }

    fn vault_endpoint(path: &str) -> String {
        format!("/vault/{}", encode_vault_path(path.trim_start_matches('/')))
    }
}

/// Map a non-success status onto the error taxonomy.
pub(crate) fn check_status(status: StatusCode, endpoint: &str, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    let detail = body.trim();
    let message = if detail.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {}", truncate(detail, 200))
    };

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Error::Auth {
            status: Some(status.as_u16()),
            message,
        });
    }

    Err(Error::Connectivity {
        endpoint: endpoint.to_string(),
        status: Some(status.as_u16()),
        message,
    })
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Turn one listing entry into a name relative to the listed directory.
///
/// The plugin returns names relative to the directory, but some versions
/// return vault-relative paths; both are accepted.
pub(crate) fn listing_entry_name(entry: &serde_json::Value, dir: &str) -> Option<String> {
    let raw = match entry {
        serde_json::Value::String(name) => name.clone(),
        serde_json::Value::Object(map) => map
            .get("path")
            .or_else(|| map.get("name"))
            .and_then(|v| v.as_str())?
            .to_string(),
        _ => return None,
    };

    let dir = dir.trim_matches('/');
    let prefix = format!("{dir}/");
    let name = if !dir.is_empty() && raw.starts_with(&prefix) {
        raw[prefix.len()..].to_string()
    } else {
        raw
    };

    if name.is_empty() || name == "/" {
        None
    } else {
        Some(name)
    }
}

impl VaultApi for RestVault {
    fn describe(&self) -> String {
        self.host.clone()
    }

    fn status(&self) -> Result<ServerStatus> {
        let endpoint = "/";
        let response = self.send(self.client.get(self.url(endpoint)), endpoint)?;
        let status = response.status();
        let body = response.text().map_err(|err| Error::Connectivity {
            endpoint: self.url(endpoint),
            status: Some(status.as_u16()),
            message: err.to_string(),
        })?;
        check_status(status, &self.url(endpoint), &body)?;

        let server: ServerStatus = serde_json::from_str(&body).map_err(|err| Error::Protocol {
            endpoint: self.url(endpoint),
            message: err.to_string(),
        })?;
        if !server.authenticated {
            return Err(Error::Auth {
                status: None,
                message: "the server reports the request as unauthenticated".to_string(),
            });
        }
        Ok(server)
    }

    fn list_dir(&self, dir: &str) -> Result<Option<Vec<String>>> {
        let dir = dir.trim_matches('/');
        let endpoint = if dir.is_empty() {
            "/vault/".to_string()
        } else {
            format!("{}/", Self::vault_endpoint(dir))
        };

        let response = self.send(self.client.get(self.url(&endpoint)), &endpoint)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(dir, "vault directory does not exist");
            return Ok(None);
        }
        let body = response.text().map_err(|err| Error::Connectivity {
            endpoint: self.url(&endpoint),
            status: Some(status.as_u16()),
            message: err.to_string(),
        })?;
        check_status(status, &self.url(&endpoint), &body)?;

        let listing: Listing = serde_json::from_str(&body).map_err(|err| Error::Protocol {
            endpoint: self.url(&endpoint),
            message: err.to_string(),
        })?;
        Ok(Some(
            listing
                .files
                .iter()
                .filter_map(|entry| listing_entry_name(entry, dir))
                .collect(),
        ))
    }

    fn read_note(&self, path: &str) -> Result<RemoteNote> {
        let endpoint = Self::vault_endpoint(path);
        let request = self
            .client
            .get(self.url(&endpoint))
            .header(reqwest::header::ACCEPT, NOTE_JSON);
        let response = self.send(request, &endpoint)?;
        let status = response.status();
        let body = response.text().map_err(|err| Error::Connectivity {
            endpoint: self.url(&endpoint),
            status: Some(status.as_u16()),
            message: err.to_string(),
        })?;
        check_status(status, &self.url(&endpoint), &body)?;

        let note: NoteJson = serde_json::from_str(&body).map_err(|err| Error::Protocol {
            endpoint: self.url(&endpoint),
            message: err.to_string(),
        })?;
        let modified = Utc
            .timestamp_millis_opt(note.stat.mtime)
            .single()
            .ok_or_else(|| Error::Protocol {
                endpoint: self.url(&endpoint),
                message: format!("invalid modification time {}", note.stat.mtime),
            })?;

        let content = note.content.into_bytes();
        Ok(RemoteNote {
            path: note.path.unwrap_or_else(|| path.to_string()),
            size: note.stat.size.unwrap_or(content.len() as u64),
            content,
            modified,
        })
    }

    fn write_note(&self, path: &str, content: &[u8]) -> Result<()> {
        let endpoint = Self::vault_endpoint(path);
        let request = self
            .client
            .put(self.url(&endpoint))
            .header(reqwest::header::CONTENT_TYPE, "text/markdown")
            .body(content.to_vec());
        let response = self.send(request, &endpoint)?;
        let status = response.status();
        let body = response.text().unwrap_or_default();
        check_status(status, &self.url(&endpoint), &body)?;
        tracing::debug!(path, bytes = content.len(), "wrote note to vault");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn segments_are_encoded_separately() {
        assert_eq!(
            encode_vault_path("10-Projects/My Notes/a#b.md"),
            "10-Projects/My%20Notes/a%23b.md"
        );
    }

    #[test]
    fn unicode_is_percent_encoded() {
        assert_eq!(encode_vault_path("café.md"), "caf%C3%A9.md");
    }

    #[test]
    fn auth_statuses_map_to_auth_errors() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = check_status(status, "/vault/", "").unwrap_err();
            assert!(matches!(err, Error::Auth { .. }), "{status}");
        }
    }

    #[test]
    fn other_failures_map_to_connectivity_with_status() {
        let err = check_status(StatusCode::INTERNAL_SERVER_ERROR, "/vault/a.md", "boom").unwrap_err();
        match err {
            Error::Connectivity { status, message, .. } => {
                assert_eq!(status, Some(500));
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn success_passes() {
        assert!(check_status(StatusCode::NO_CONTENT, "/vault/a.md", "").is_ok());
    }

    #[test]
    fn listing_names_are_made_relative() {
        let dir = "10-Projects/atlas";
        assert_eq!(
            listing_entry_name(&json!("10-Projects/atlas/a.md"), dir),
            Some("a.md".to_string())
        );
        assert_eq!(listing_entry_name(&json!("sub/"), dir), Some("sub/".to_string()));
        assert_eq!(
            listing_entry_name(&json!({"path": "b.md"}), dir),
            Some("b.md".to_string())
        );
        assert_eq!(listing_entry_name(&json!(42), dir), None);
    }
}
