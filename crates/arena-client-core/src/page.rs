use std::collections::BTreeMap;

use crate::model::{LobbyId, LobbyMode, MessageId, TicketId, UserId};

pub const ATTR_IS_CREATOR: &str = "data-is-creator";
pub const ATTR_CURRENT_USER_ID: &str = "data-current-user-id";
pub const ATTR_LOBBY_ID: &str = "data-lobby-id";
pub const ATTR_LOBBY_MODE: &str = "data-lobby-mode";
pub const ATTR_TICKET_ID: &str = "data-ticket-id";
pub const ATTR_MESSAGE_ID: &str = "data-message-id";
pub const ATTR_USER_ID: &str = "data-user-id";
pub const ATTR_ACTION: &str = "data-action";
pub const ATTR_TEAM_NUMBER: &str = "data-team-number";
pub const ATTR_FRIEND_ACTION: &str = "data-friend-action";
pub const ATTR_TOOLTIP: &str = "data-tooltip";

pub const CLASS_MEMBERS_LIST: &str = "members-list";
pub const CLASS_MEMBER_ITEM: &str = "member-item";
pub const CLASS_TEAM_SECTION: &str = "team-section";
pub const CLASS_MEMBER_ACTION: &str = "member-action";
pub const CLASS_LOBBY_STATUS: &str = "lobby-status";
pub const CLASS_TICKET_MESSAGES: &str = "ticket-messages";
pub const CLASS_TICKET_MESSAGE: &str = "ticket-message";
pub const CLASS_TICKET_STATUS: &str = "ticket-status";
pub const CLASS_CHAT_MESSAGES: &str = "chat-messages";
pub const CLASS_CHAT_MESSAGE: &str = "chat-message";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageContextError {
    #[error("missing attribute {0}")]
    MissingAttribute(&'static str),
    #[error("attribute {name} has invalid value {value:?}")]
    InvalidAttribute { name: &'static str, value: String },
}

/// Attributes read off one element, keyed by full attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataAttributes(BTreeMap<String, String>);

impl DataAttributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Present and non-blank.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn require(&self, name: &'static str) -> Result<&str, PageContextError> {
        self.get(name)
            .ok_or(PageContextError::MissingAttribute(name))
    }

    pub fn require_id(&self, name: &'static str) -> Result<u64, PageContextError> {
        let raw = self.require(name)?;
        raw.parse::<u64>()
            .map_err(|_| PageContextError::InvalidAttribute {
                name,
                value: raw.to_string(),
            })
    }

    /// Missing counts as `false`. Accepts Jinja's `True`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).is_some_and(parse_flag)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DataAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

#[must_use]
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

/// Who is looking at the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<UserId>,
    pub is_creator: bool,
}

impl Viewer {
    #[must_use]
    pub fn can_manage(&self, member_id: UserId) -> bool {
        self.is_creator && self.user_id != Some(member_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyPage {
    pub lobby_id: LobbyId,
    pub mode: LobbyMode,
    pub viewer: Viewer,
}

impl LobbyPage {
    pub fn from_attributes(attributes: &DataAttributes) -> Result<Self, PageContextError> {
        let lobby_id = attributes.require_id(ATTR_LOBBY_ID)?;
        let mode = attributes
            .get(ATTR_LOBBY_MODE)
            .map_or(LobbyMode::OneVsOne, LobbyMode::parse);
        let user_id = match attributes.get(ATTR_CURRENT_USER_ID) {
            Some(_) => Some(attributes.require_id(ATTR_CURRENT_USER_ID)?),
            None => None,
        };
        Ok(Self {
            lobby_id,
            mode,
            viewer: Viewer {
                user_id,
                is_creator: attributes.flag(ATTR_IS_CREATOR),
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketPage {
    pub ticket_id: TicketId,
}

impl TicketPage {
    pub fn from_attributes(attributes: &DataAttributes) -> Result<Self, PageContextError> {
        Ok(Self {
            ticket_id: attributes.require_id(ATTR_TICKET_ID)?,
        })
    }
}

/// Highest `data-message-id` among already rendered message elements.
#[must_use]
pub fn highest_message_id<'a>(
    rendered: impl IntoIterator<Item = &'a DataAttributes>,
) -> Option<MessageId> {
    rendered
        .into_iter()
        .filter_map(|attributes| attributes.require_id(ATTR_MESSAGE_ID).ok())
        .max()
}
