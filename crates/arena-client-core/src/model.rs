use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub type UserId = u64;
pub type LobbyId = u64;
pub type TicketId = u64;
pub type MessageId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub ggp: i64,
    #[serde(default = "default_team_number")]
    pub team_number: u8,
    #[serde(default)]
    pub is_creator: bool,
}

fn default_team_number() -> u8 {
    1
}

impl Member {
    /// Team a member is drawn under in team modes. Only `2` maps to the
    /// second team; anything else, including out-of-range values, is team 1.
    #[must_use]
    pub fn team(&self) -> Team {
        if self.team_number == 2 {
            Team::Two
        } else {
            Team::One
        }
    }

    #[must_use]
    pub fn avatar_initial(&self) -> String {
        self.username
            .trim()
            .chars()
            .next()
            .map(|ch| ch.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Team {
    One,
    Two,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::One, Team::Two];

    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

/// Match format of a lobby.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum LobbyMode {
    #[default]
    OneVsOne,
    TwoVsTwo,
    ThreeVsThree,
    FiveVsFive,
    Other(String),
}

impl LobbyMode {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1x1" => Self::OneVsOne,
            "2x2" => Self::TwoVsTwo,
            "3x3" => Self::ThreeVsThree,
            "5x5" => Self::FiveVsFive,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::OneVsOne => "1x1",
            Self::TwoVsTwo => "2x2",
            Self::ThreeVsThree => "3x3",
            Self::FiveVsFive => "5x5",
            Self::Other(raw) => raw.as_str(),
        }
    }

    #[must_use]
    pub fn is_team_mode(&self) -> bool {
        matches!(
            self,
            Self::TwoVsTwo | Self::ThreeVsThree | Self::FiveVsFive
        )
    }
}

impl fmt::Display for LobbyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LobbyMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

impl Serialize for LobbyMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyStatus {
    Open,
    Full,
    Started,
    Finished,
    Other(String),
}

impl LobbyStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" => Self::Open,
            "full" => Self::Full,
            "started" => Self::Started,
            "finished" => Self::Finished,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::Full => "full",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl<'de> Deserialize<'de> for LobbyStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    Other(String),
}

impl TicketStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" => Self::Open,
            "in_progress" => Self::InProgress,
            "resolved" => Self::Resolved,
            "closed" => Self::Closed,
            other => Self::Other(other.to_string()),
        }
    }

    /// Parses only the statuses the server accepts on update.
    #[must_use]
    pub fn parse_known(raw: &str) -> Option<Self> {
        match Self::parse(raw) {
            Self::Other(_) => None,
            known => Some(known),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl<'de> Deserialize<'de> for TicketStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// One entry of a ticket or lobby chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranscriptMessage {
    pub id: MessageId,
    #[serde(alias = "message")]
    pub text: String,
    #[serde(default, alias = "created_at")]
    pub timestamp: String,
    #[serde(default, alias = "username")]
    pub author: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LobbyMembersResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub status: Option<LobbyStatus>,
    #[serde(default)]
    pub mode: LobbyMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketMessagesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub messages: Vec<TranscriptMessage>,
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessagesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub messages: Vec<TranscriptMessage>,
}

/// Generic `{success, error?}` reply to a POST command.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InviteReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub invite_code: Option<String>,
    #[serde(default)]
    pub invite_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
}
