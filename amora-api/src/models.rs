use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// Wire field names below (serde renames included) are the contract with
// existing stored data; rename internally at will, never on the wire.

/// Legacy opt-out sentinels still present in stored documents. Translated
/// to absent values when a document is read; nothing past the
/// deserialization boundary ever sees them.
const OPT_OUT_SENTINELS: [&str; 2] = ["Prefer not to say", "Prefer not to share"];

fn is_opt_out(value: &str) -> bool {
    OPT_OUT_SENTINELS.contains(&value)
}

fn de_opt_out_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !is_opt_out(v)))
}

fn de_opt_out_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values.into_iter().filter(|v| !is_opt_out(v)).collect())
}

// --- Profile ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_out_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender_identity: Option<String>,
    #[serde(default, deserialize_with = "de_opt_out_list")]
    pub connection_goals: Vec<String>,
    #[serde(default, deserialize_with = "de_opt_out_list")]
    pub relationship_style: Vec<String>,
    #[serde(default, deserialize_with = "de_opt_out_list")]
    pub sex_preferences: Vec<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_out_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub children: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_preferences: Option<MatchingPreferences>,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl Profile {
    /// A profile can be surfaced in discovery only once onboarding finished
    /// and a name exists.
    pub fn is_discoverable(&self) -> bool {
        self.onboarding_completed && !self.full_name.trim().is_empty()
    }

    pub fn coords(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

// --- MatchingPreferences ---

pub const AGE_MIN_DEFAULT: u32 = 18;
pub const AGE_MAX_DEFAULT: u32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    #[serde(default = "default_age_min")]
    pub min: u32,
    #[serde(default = "default_age_max")]
    pub max: u32,
}

fn default_age_min() -> u32 {
    AGE_MIN_DEFAULT
}
fn default_age_max() -> u32 {
    AGE_MAX_DEFAULT
}

impl Default for AgeRange {
    fn default() -> Self {
        Self {
            min: AGE_MIN_DEFAULT,
            max: AGE_MAX_DEFAULT,
        }
    }
}

impl AgeRange {
    /// Only a range narrower than the full default constrains anyone.
    pub fn narrows_default(&self) -> bool {
        self.min > AGE_MIN_DEFAULT || self.max < AGE_MAX_DEFAULT
    }
}

/// A viewer's saved matching preferences. Empty lists and default ranges
/// impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchingPreferences {
    #[serde(default)]
    pub age_range: AgeRange,
    #[serde(default, deserialize_with = "de_opt_out_list")]
    pub gender: Vec<String>,
    #[serde(default, deserialize_with = "de_opt_out_list")]
    pub relationship_goals: Vec<String>,
    #[serde(default, deserialize_with = "de_opt_out_list")]
    pub relationship_style: Vec<String>,
    #[serde(default, deserialize_with = "de_opt_out_list")]
    pub sex_preferences: Vec<String>,
    #[serde(default, deserialize_with = "de_opt_out_list")]
    pub family_plans: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

// --- Like ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeType {
    #[default]
    Heart,
    Friendship,
}

impl LikeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heart => "heart",
            Self::Friendship => "friendship",
        }
    }
}

impl std::fmt::Display for LikeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    #[serde(rename = "fromUserId")]
    pub from_user_id: Uuid,
    #[serde(rename = "toUserId")]
    pub to_user_id: Uuid,
    #[serde(rename = "likeType")]
    pub like_type: LikeType,
    #[serde(default)]
    pub matched: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

// --- Pass ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pass {
    #[serde(rename = "fromUserId")]
    pub from_user_id: Uuid,
    #[serde(rename = "toUserId")]
    pub to_user_id: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

// --- Conversation ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub participants: [Uuid; 2],
    #[serde(rename = "likeType")]
    pub like_type: LikeType,
    #[serde(rename = "lastMessage", default)]
    pub last_message: String,
    #[serde(rename = "lastMessageTime", default, skip_serializing_if = "Option::is_none")]
    pub last_message_time: Option<DateTime<Utc>>,
    #[serde(
        rename = "lastMessageSenderId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_message_sender_id: Option<Uuid>,
    /// Unread message count per participant, keyed by uuid string.
    #[serde(rename = "unreadCount", default)]
    pub unread_count: HashMap<String, i64>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user: Uuid) -> bool {
        self.participants.contains(&user)
    }

    /// The other participant of a two-party conversation.
    pub fn partner_of(&self, user: Uuid) -> Option<Uuid> {
        match self.participants {
            [a, b] if a == user => Some(b),
            [a, b] if b == user => Some(a),
            _ => None,
        }
    }

    pub fn unread_for(&self, user: Uuid) -> i64 {
        self.unread_count
            .get(&user.to_string())
            .copied()
            .unwrap_or(0)
    }
}

// --- Message ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "senderId")]
    pub sender_id: Uuid,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

// --- Presence ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presence {
    pub online: bool,
    #[serde(rename = "lastSeen")]
    pub last_seen: DateTime<Utc>,
}
