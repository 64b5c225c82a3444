//! Notification transport.
//!
//! The destination is a single apprise-style URL resolved once at startup.
//! Its scheme picks the wire format:
//!
//! | Scheme | Request |
//! |---|---|
//! | `json://`, `jsons://`, `http://`, `https://` | POST `{"version","title","message","type"}` |
//! | `ntfy://topic`, `ntfy://host/topic`, `ntfys://host/topic` | POST body text, `Title` header |
//! | `gotify://host/token`, `gotifys://host/token` | POST `{"title","message","priority"}` to `/message` |

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

/// Public ntfy instance used when an `ntfy://` URL names only a topic.
const NTFY_PUBLIC_BASE: &str = "https://ntfy.sh";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from resolving or delivering a notification.
///
/// Messages never include the destination URL, which may embed tokens.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("No notification URL configured")]
    NotConfigured,

    #[error("Unsupported notification scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid notification URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notification endpoint returned HTTP {status}")]
    Status { status: u16 },
}

/// Anything that can deliver a titled message to the operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// A resolved notification destination.
pub enum NotifyTarget {
    Json { endpoint: Url },
    Ntfy { endpoint: Url },
    Gotify { endpoint: Url, token: String },
}

impl NotifyTarget {
    pub fn parse(raw: &str) -> Result<Self, NotifyError> {
        let (scheme, rest) = raw
            .split_once("://")
            .ok_or_else(|| NotifyError::InvalidUrl("missing scheme".to_string()))?;

        match scheme.to_ascii_lowercase().as_str() {
            "json" | "http" => Ok(Self::Json {
                endpoint: http_url("http", rest)?,
            }),
            "jsons" | "https" => Ok(Self::Json {
                endpoint: http_url("https", rest)?,
            }),
            "ntfy" => Self::ntfy("http", rest),
            "ntfys" => Self::ntfy("https", rest),
            "gotify" => Self::gotify("http", rest),
            "gotifys" => Self::gotify("https", rest),
            other => Err(NotifyError::UnsupportedScheme(other.to_string())),
        }
    }

    fn ntfy(scheme: &str, rest: &str) -> Result<Self, NotifyError> {
        let url = http_url(scheme, rest)?;

        // `ntfy://topic` has no path: the "host" is the topic on ntfy.sh.
        if url.path().trim_matches('/').is_empty() {
            let topic = url
                .host_str()
                .ok_or_else(|| NotifyError::InvalidUrl("missing ntfy topic".to_string()))?;
            let endpoint = Url::parse(&format!("{NTFY_PUBLIC_BASE}/{topic}"))
                .map_err(|e| NotifyError::InvalidUrl(e.to_string()))?;
            return Ok(Self::Ntfy { endpoint });
        }

        Ok(Self::Ntfy { endpoint: url })
    }

    fn gotify(scheme: &str, rest: &str) -> Result<Self, NotifyError> {
        let mut endpoint = http_url(scheme, rest)?;

        let mut segments: Vec<String> = endpoint
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).map(String::from).collect())
            .unwrap_or_default();
        let token = segments
            .pop()
            .ok_or_else(|| NotifyError::InvalidUrl("missing gotify token".to_string()))?;

        let mut path = String::from("/");
        for segment in &segments {
            path.push_str(segment);
            path.push('/');
        }
        path.push_str("message");
        endpoint.set_path(&path);
        endpoint.set_query(None);

        Ok(Self::Gotify { endpoint, token })
    }

    pub fn endpoint(&self) -> &Url {
        match self {
            Self::Json { endpoint } | Self::Ntfy { endpoint } | Self::Gotify { endpoint, .. } => {
                endpoint
            }
        }
    }

    pub fn service(&self) -> &'static str {
        match self {
            Self::Json { .. } => "json",
            Self::Ntfy { .. } => "ntfy",
            Self::Gotify { .. } => "gotify",
        }
    }
}

impl fmt::Debug for NotifyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyTarget")
            .field("service", &self.service())
            .field("host", &self.endpoint().host_str())
            .finish_non_exhaustive()
    }
}

fn http_url(scheme: &str, rest: &str) -> Result<Url, NotifyError> {
    let url = Url::parse(&format!("{scheme}://{rest}"))
        .map_err(|e| NotifyError::InvalidUrl(e.to_string()))?;
    if url.host_str().is_none() {
        return Err(NotifyError::InvalidUrl("missing host".to_string()));
    }
    Ok(url)
}

#[derive(Serialize)]
struct JsonPayload<'a> {
    version: &'static str,
    title: &'a str,
    message: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct GotifyPayload<'a> {
    title: &'a str,
    message: &'a str,
    priority: u8,
}

/// HTTP-backed notifier. Without a target every call fails with
/// `NotConfigured`, which the monitor treats like any other delivery failure.
pub struct HttpNotifier {
    http: reqwest::Client,
    target: Option<NotifyTarget>,
}

impl HttpNotifier {
    /// Resolve `raw` into a target. An empty string disables delivery.
    pub fn from_url(raw: &str) -> Result<Self, NotifyError> {
        let raw = raw.trim();
        let target = if raw.is_empty() {
            None
        } else {
            Some(NotifyTarget::parse(raw)?)
        };

        let http = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;

        Ok(Self { http, target })
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        let target = self.target.as_ref().ok_or(NotifyError::NotConfigured)?;

        let request = match target {
            NotifyTarget::Json { endpoint } => self.http.post(endpoint.clone()).json(&JsonPayload {
                version: "1.0",
                title,
                message: body,
                kind: "info",
            }),
            NotifyTarget::Ntfy { endpoint } => self
                .http
                .post(endpoint.clone())
                .header("Title", title)
                .body(body.to_string()),
            NotifyTarget::Gotify { endpoint, token } => self
                .http
                .post(endpoint.clone())
                .header("X-Gotify-Key", token)
                .json(&GotifyPayload {
                    title,
                    message: body,
                    priority: 5,
                }),
        };

        let response = request
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                status: status.as_u16(),
            });
        }

        tracing::debug!(service = target.service(), "Notification delivered");
        Ok(())
    }
}
