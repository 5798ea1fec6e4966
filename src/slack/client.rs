//! Slack Web API client.
//!
//! Covers the four calls the bot needs: posting messages (plain or with
//! rich attachments), uploading a file, the liveness probe, and opening
//! an RTM session for the inbound event socket.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default Slack Web API base.
const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Request timeout for all Web API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Slack API error: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Optional knobs for `chat.postMessage`.
#[derive(Debug, Clone, Default)]
pub struct PostOptions {
    pub icon_emoji: Option<String>,
    pub attachments: Option<Vec<MessageAttachment>>,
}

impl PostOptions {
    /// Plain message with the bot's icon override.
    pub fn with_icon(icon: &str) -> Self {
        Self {
            icon_emoji: Some(icon.to_string()),
            ..Self::default()
        }
    }

    /// Message carrying rich attachments.
    pub fn with_attachments(icon: &str, attachments: Vec<MessageAttachment>) -> Self {
        Self {
            icon_emoji: Some(icon.to_string()),
            attachments: Some(attachments),
        }
    }
}

/// A rich attachment block.
#[derive(Debug, Clone, Serialize)]
pub struct MessageAttachment {
    pub color: String,
    pub pretext: String,
    pub fields: Vec<AttachmentField>,
}

/// One titled field inside an attachment.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

/// Slack Web API client. Cheap to clone.
#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    base_url: String,
    token: String,
}

impl SlackClient {
    /// Creates a client against the default API base.
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, DEFAULT_API_URL.to_string())
    }

    /// Creates a client against a custom API base.
    pub fn with_base_url(token: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            token,
        }
    }

    /// Posts a message to a channel.
    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
        options: PostOptions,
    ) -> Result<(), SlackError> {
        let body = PostMessageBody {
            channel,
            text,
            icon_emoji: options.icon_emoji.as_deref(),
            attachments: options.attachments,
        };

        debug!("Posting message to {}", channel);

        let response: ApiResponse = self
            .client
            .post(format!("{}/chat.postMessage", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| SlackError::ParseError(e.to_string()))?;

        response.into_result()
    }

    /// Uploads a file (the chart image) to a channel.
    pub async fn upload_file(
        &self,
        channel: &str,
        filename: &str,
        filetype: &str,
        bytes: Vec<u8>,
    ) -> Result<(), SlackError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("channels", channel.to_string())
            .text("filename", filename.to_string())
            .text("filetype", filetype.to_string())
            .part("file", part);

        debug!("Uploading {} to {}", filename, channel);

        let response: ApiResponse = self
            .client
            .post(format!("{}/files.upload", self.base_url))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| SlackError::ParseError(e.to_string()))?;

        response.into_result()
    }

    /// Liveness probe used by the watchdog.
    pub async fn auth_test(&self) -> Result<(), SlackError> {
        let response: ApiResponse = self
            .client
            .post(format!("{}/auth.test", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| SlackError::ParseError(e.to_string()))?;

        response.into_result()
    }

    /// Opens an RTM session and returns the WebSocket URL to connect to.
    pub async fn rtm_connect(&self) -> Result<String, SlackError> {
        let response: RtmConnectResponse = self
            .client
            .post(format!("{}/rtm.connect", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| SlackError::ParseError(e.to_string()))?;

        if !response.ok {
            return Err(SlackError::Api(
                response.error.unwrap_or_else(|| "unknown".to_string()),
            ));
        }
        response
            .url
            .ok_or_else(|| SlackError::ParseError("rtm.connect returned no url".to_string()))
    }
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

// ============ Wire Types ============

#[derive(Serialize)]
struct PostMessageBody<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_emoji: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<MessageAttachment>>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    error: Option<String>,
}

impl ApiResponse {
    fn into_result(self) -> Result<(), SlackError> {
        if self.ok {
            Ok(())
        } else {
            Err(SlackError::Api(
                self.error.unwrap_or_else(|| "unknown".to_string()),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct RtmConnectResponse {
    ok: bool,
    error: Option<String>,
    url: Option<String>,
}
