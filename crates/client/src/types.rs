//! Request and response types for the chat service API

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// User identifier
///
/// The service sends ids as JSON numbers, but older payloads and form
/// round-trips carry them as strings. Both compare equal by their canonical
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.trim().to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self::from(id.as_str())
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(numeric) => serializer.serialize_i64(numeric),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self(n.to_string()),
            Raw::Text(s) => Self::from(s),
        })
    }
}

/// Minimal user record returned by `/api/auth/me`, `/api/users/find` and
/// embedded as the sender of requests and messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserSummary {
    /// Username, else email
    pub fn display_name(&self) -> Option<&str> {
        non_empty(self.username.as_deref()).or_else(|| non_empty(self.email.as_deref()))
    }
}

/// Another user eligible for chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub user_id: UserId,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl Contact {
    /// Username, else email, else the raw id
    pub fn display_name(&self) -> String {
        non_empty(self.username.as_deref())
            .or_else(|| non_empty(self.email.as_deref()))
            .map(str::to_string)
            .unwrap_or_else(|| self.user_id.to_string())
    }
}

impl TryFrom<UserSummary> for Contact {
    type Error = UserSummary;

    fn try_from(summary: UserSummary) -> Result<Self, Self::Error> {
        match summary.user_id {
            Some(user_id) => Ok(Self {
                user_id,
                username: summary.username,
                email: summary.email,
            }),
            None => Err(summary),
        }
    }
}

/// Normalized friend request status
///
/// Arrives either as a plain string or as an enum object with a `name` field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FriendStatus {
    Pending,
    Accepted,
    Rejected,
    /// Missing or empty
    #[default]
    Unknown,
    /// Anything else, kept verbatim for display
    Other(String),
}

impl FriendStatus {
    /// Normalize a raw status name
    pub fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_ascii_uppercase();
        if upper.contains("PENDING") {
            Self::Pending
        } else if upper == "ACCEPTED" {
            Self::Accepted
        } else if upper == "REJECTED" {
            Self::Rejected
        } else if upper.is_empty() {
            Self::Unknown
        } else {
            Self::Other(raw.to_string())
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Unknown => "",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for FriendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for FriendStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Named { name: String },
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Text(raw) | Raw::Named { name: raw }) => Self::parse(&raw),
            None => Self::Unknown,
        })
    }
}

/// Incoming friend request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub request_id: i64,
    #[serde(default)]
    pub sender: Option<UserSummary>,
    #[serde(default)]
    pub sender_username: Option<String>,
    #[serde(default)]
    pub sender_id: Option<UserId>,
    #[serde(default)]
    pub status: FriendStatus,
}

impl FriendRequest {
    /// Best available name for the sender
    pub fn sender_name(&self) -> String {
        if let Some(name) = non_empty(self.sender_username.as_deref()) {
            return name.to_string();
        }
        if let Some(sender) = &self.sender {
            if let Some(name) = sender.display_name() {
                return name.to_string();
            }
            if let Some(id) = &sender.user_id {
                return id.to_string();
            }
        }
        self.sender_id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Message creation time as sent by the service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Milliseconds since the Unix epoch
    Millis(i64),
    Text(String),
}

impl Timestamp {
    /// Render in the local time zone, or the raw value if it does not parse
    pub fn localized(&self) -> String {
        self.to_local()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.to_string())
    }

    fn to_local(&self) -> Option<DateTime<Local>> {
        match self {
            Self::Millis(ms) => DateTime::from_timestamp_millis(*ms).map(|at| at.with_timezone(&Local)),
            Self::Text(raw) => {
                let raw = raw.trim();
                if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
                    return Some(at.with_timezone(&Local));
                }
                // Offset-less timestamps are wall-clock time in the viewer's zone
                ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                    .and_then(|naive| Local.from_local_datetime(&naive).earliest())
            }
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millis(ms) => write!(f, "{ms}"),
            Self::Text(raw) => f.write_str(raw),
        }
    }
}

/// One chat message between two users
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default)]
    pub sender: Option<UserSummary>,
    #[serde(default)]
    pub message_text: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl ChatMessage {
    pub fn sender_id(&self) -> Option<&UserId> {
        self.sender.as_ref().and_then(|s| s.user_id.as_ref())
    }

    /// Whether `current` wrote this message
    pub fn is_own(&self, current: &UserId) -> bool {
        self.sender_id() == Some(current)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Interpret a "boolean-like" response body
pub fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
