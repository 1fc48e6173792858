use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Wire representation of a task. The owning user is implicit in the
/// authenticated request and never part of the payload.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub reminder_time: Option<NaiveDateTime>,
    pub priority: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub reminder_time: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Partial update. `reminder_time` distinguishes three cases: key absent
/// (outer `None`, keep current value), key set to null (`Some(None)`, clear
/// the reminder) and key set to a string (`Some(Some(..))`, replace).
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub reminder_time: Option<Option<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    // Only runs when the key is present, so the inner Option carries the
    // null-vs-value distinction and the outer Some marks presence.
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}
