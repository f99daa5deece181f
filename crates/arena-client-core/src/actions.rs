use crate::api::{ApiEndpoint, ApiError};
use crate::fetch::{ApiClient, ApiTransport, Prompter};
use crate::model::{CommandReply, InviteReply, JoinReply, LobbyId, TicketId, TicketStatus, UserId};
use crate::page::{
    ATTR_ACTION, ATTR_FRIEND_ACTION, ATTR_TEAM_NUMBER, ATTR_USER_ID, DataAttributes,
    PageContextError,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandInputError {
    #[error(transparent)]
    Page(#[from] PageContextError),
    #[error("unknown action {0:?}")]
    UnknownAction(String),
    #[error("team number must be 1 or 2, got {0:?}")]
    InvalidTeam(String),
    #[error("message text is empty")]
    EmptyMessage,
    #[error("unknown ticket status {0:?}")]
    UnknownStatus(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAction {
    /// Placeholder control; no request is made.
    Swap { user_id: UserId },
    Kick { user_id: UserId },
    Ban { user_id: UserId },
    MoveToTeam { user_id: UserId, team_number: u8 },
}

impl MemberAction {
    /// Reads a clicked `.member-action` control.
    pub fn from_attributes(attributes: &DataAttributes) -> Result<Self, CommandInputError> {
        let action = attributes.require(ATTR_ACTION)?;
        let user_id = attributes.require_id(ATTR_USER_ID)?;
        match action {
            "swap" => Ok(Self::Swap { user_id }),
            "kick" => Ok(Self::Kick { user_id }),
            "ban" => Ok(Self::Ban { user_id }),
            "move" => {
                let raw = attributes.require(ATTR_TEAM_NUMBER)?;
                match raw {
                    "1" => Ok(Self::MoveToTeam {
                        user_id,
                        team_number: 1,
                    }),
                    "2" => Ok(Self::MoveToTeam {
                        user_id,
                        team_number: 2,
                    }),
                    other => Err(CommandInputError::InvalidTeam(other.to_string())),
                }
            }
            other => Err(CommandInputError::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendAction {
    Add { friend_id: UserId },
    Remove { friend_id: UserId },
}

impl FriendAction {
    /// Reads a `[data-friend-action]` control carrying `data-user-id`.
    pub fn from_attributes(attributes: &DataAttributes) -> Result<Self, CommandInputError> {
        let action = attributes.require(ATTR_FRIEND_ACTION)?;
        let friend_id = attributes.require_id(ATTR_USER_ID)?;
        match action {
            "add" => Ok(Self::Add { friend_id }),
            "remove" => Ok(Self::Remove { friend_id }),
            other => Err(CommandInputError::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Member {
        lobby_id: LobbyId,
        action: MemberAction,
    },
    Friend(FriendAction),
    SendLobbyMessage {
        lobby_id: LobbyId,
        text: String,
    },
    SendTicketMessage {
        ticket_id: TicketId,
        text: String,
    },
    UpdateTicketStatus {
        ticket_id: TicketId,
        status: TicketStatus,
    },
    CopyLobbyInvite {
        lobby_id: LobbyId,
    },
    JoinLobby {
        lobby_id: LobbyId,
        password: Option<String>,
        invite_code: Option<String>,
    },
}

fn message_text(raw: &str) -> Result<String, CommandInputError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(CommandInputError::EmptyMessage);
    }
    Ok(text.to_string())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

impl UserCommand {
    pub fn member(
        lobby_id: LobbyId,
        attributes: &DataAttributes,
    ) -> Result<Self, CommandInputError> {
        Ok(Self::Member {
            lobby_id,
            action: MemberAction::from_attributes(attributes)?,
        })
    }

    pub fn friend(attributes: &DataAttributes) -> Result<Self, CommandInputError> {
        Ok(Self::Friend(FriendAction::from_attributes(attributes)?))
    }

    pub fn send_lobby_message(lobby_id: LobbyId, raw: &str) -> Result<Self, CommandInputError> {
        Ok(Self::SendLobbyMessage {
            lobby_id,
            text: message_text(raw)?,
        })
    }

    pub fn send_ticket_message(ticket_id: TicketId, raw: &str) -> Result<Self, CommandInputError> {
        Ok(Self::SendTicketMessage {
            ticket_id,
            text: message_text(raw)?,
        })
    }

    pub fn update_ticket_status(
        ticket_id: TicketId,
        raw: &str,
    ) -> Result<Self, CommandInputError> {
        let status = TicketStatus::parse_known(raw)
            .ok_or_else(|| CommandInputError::UnknownStatus(raw.trim().to_string()))?;
        Ok(Self::UpdateTicketStatus { ticket_id, status })
    }

    #[must_use]
    pub fn join_lobby(lobby_id: LobbyId, password: Option<&str>, invite_code: Option<&str>) -> Self {
        Self::JoinLobby {
            lobby_id,
            password: non_blank(password),
            invite_code: non_blank(invite_code),
        }
    }
}

/// What the page should do once a command has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionEffect {
    Nothing,
    /// The next lobby tick renders the change.
    AwaitNextPoll,
    ReloadPage,
    Navigate(String),
    CopyToClipboard(String),
    ClearComposer,
    TicketStatusChanged(TicketStatus),
}

/// Runs a command built from page input. Malformed input is dropped with
/// a debug log: no request and no alert.
pub async fn handle_input<T: ApiTransport, P: Prompter>(
    client: &ApiClient<T, P>,
    input: Result<UserCommand, CommandInputError>,
) -> ActionEffect {
    match input {
        Ok(command) => run_command(client, command).await,
        Err(error) => {
            tracing::debug!(error = %error, "ignoring action with invalid input");
            ActionEffect::Nothing
        }
    }
}

pub async fn run_command<T: ApiTransport, P: Prompter>(
    client: &ApiClient<T, P>,
    command: UserCommand,
) -> ActionEffect {
    match command {
        UserCommand::Member { lobby_id, action } => run_member_action(client, lobby_id, action).await,
        UserCommand::Friend(action) => run_friend_action(client, action).await,
        UserCommand::SendLobbyMessage { lobby_id, text } => {
            let endpoint = ApiEndpoint::LobbySendMessage { lobby_id, text };
            if command_succeeded(client, &endpoint).await {
                ActionEffect::ClearComposer
            } else {
                ActionEffect::Nothing
            }
        }
        UserCommand::SendTicketMessage { ticket_id, text } => {
            let endpoint = ApiEndpoint::TicketSendMessage { ticket_id, text };
            if command_succeeded(client, &endpoint).await {
                ActionEffect::ClearComposer
            } else {
                ActionEffect::Nothing
            }
        }
        UserCommand::UpdateTicketStatus { ticket_id, status } => {
            let endpoint = ApiEndpoint::TicketUpdateStatus {
                ticket_id,
                status: status.clone(),
            };
            if command_succeeded(client, &endpoint).await {
                tracing::info!(ticket_id, status = status.as_str(), "ticket status updated");
                ActionEffect::TicketStatusChanged(status)
            } else {
                ActionEffect::Nothing
            }
        }
        UserCommand::CopyLobbyInvite { lobby_id } => copy_lobby_invite(client, lobby_id).await,
        UserCommand::JoinLobby {
            lobby_id,
            password,
            invite_code,
        } => join_lobby(client, lobby_id, password, invite_code).await,
    }
}

async fn run_member_action<T: ApiTransport, P: Prompter>(
    client: &ApiClient<T, P>,
    lobby_id: LobbyId,
    action: MemberAction,
) -> ActionEffect {
    let messages = client.messages();
    let endpoint = match action {
        MemberAction::Swap { user_id } => {
            tracing::debug!(lobby_id, user_id, "swap is not available yet");
            return ActionEffect::Nothing;
        }
        MemberAction::Kick { user_id } => {
            if !client.prompter().confirm(&messages.confirm_kick) {
                return ActionEffect::Nothing;
            }
            ApiEndpoint::LobbyKick { lobby_id, user_id }
        }
        MemberAction::Ban { user_id } => {
            if !client.prompter().confirm(&messages.confirm_ban) {
                return ActionEffect::Nothing;
            }
            ApiEndpoint::LobbyBan { lobby_id, user_id }
        }
        MemberAction::MoveToTeam {
            user_id,
            team_number,
        } => ApiEndpoint::LobbyMoveTeam {
            lobby_id,
            user_id,
            team_number,
        },
    };

    if command_succeeded(client, &endpoint).await {
        ActionEffect::AwaitNextPoll
    } else {
        ActionEffect::Nothing
    }
}

async fn run_friend_action<T: ApiTransport, P: Prompter>(
    client: &ApiClient<T, P>,
    action: FriendAction,
) -> ActionEffect {
    let messages = client.messages();
    let endpoint = match action {
        FriendAction::Add { friend_id } => ApiEndpoint::FriendAdd { friend_id },
        FriendAction::Remove { friend_id } => {
            if !client.prompter().confirm(&messages.confirm_remove_friend) {
                return ActionEffect::Nothing;
            }
            ApiEndpoint::FriendRemove { friend_id }
        }
    };

    let Some(reply) = client.fetch_json::<CommandReply>(&endpoint.to_request()).await else {
        return ActionEffect::Nothing;
    };
    if !reply.success {
        tracing::warn!(error = ?reply.error, "friend action rejected");
        return ActionEffect::Nothing;
    }
    if matches!(action, FriendAction::Add { .. }) {
        client.prompter().alert(&messages.friend_added);
    }
    ActionEffect::ReloadPage
}

/// Sends a `{success, error?}` command. On failure shows exactly one alert
/// with the server's error string, or the fallback text.
async fn command_succeeded<T: ApiTransport, P: Prompter>(
    client: &ApiClient<T, P>,
    endpoint: &ApiEndpoint,
) -> bool {
    let request = endpoint.to_request();
    match client.request_json::<CommandReply>(&request).await {
        Ok(reply) if reply.success => true,
        Ok(reply) => {
            tracing::warn!(path = %request.path, error = ?reply.error, "command rejected");
            alert_failure(client, reply.error.as_deref());
            false
        }
        Err(error) => {
            report_request_error(client, &request.path, &error);
            false
        }
    }
}

fn report_request_error<T: ApiTransport, P: Prompter>(
    client: &ApiClient<T, P>,
    path: &str,
    error: &ApiError,
) {
    tracing::error!(path, error = %error, "command request failed");
    alert_failure(client, error.server_message());
}

fn alert_failure<T: ApiTransport, P: Prompter>(client: &ApiClient<T, P>, server: Option<&str>) {
    let message = server
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or(client.messages().action_failed.as_str());
    client.prompter().alert(message);
}

async fn copy_lobby_invite<T: ApiTransport, P: Prompter>(
    client: &ApiClient<T, P>,
    lobby_id: LobbyId,
) -> ActionEffect {
    let request = ApiEndpoint::LobbyInvite { lobby_id }.to_request();
    match client.request_json::<InviteReply>(&request).await {
        Ok(reply) if reply.success => match non_blank(reply.invite_url.as_deref()) {
            Some(url) => ActionEffect::CopyToClipboard(url),
            None => {
                client.prompter().alert(&client.messages().invite_unavailable);
                ActionEffect::Nothing
            }
        },
        Ok(reply) => {
            alert_failure(client, reply.error.as_deref());
            ActionEffect::Nothing
        }
        Err(error) => {
            report_request_error(client, &request.path, &error);
            ActionEffect::Nothing
        }
    }
}

async fn join_lobby<T: ApiTransport, P: Prompter>(
    client: &ApiClient<T, P>,
    lobby_id: LobbyId,
    password: Option<String>,
    invite_code: Option<String>,
) -> ActionEffect {
    let request = ApiEndpoint::LobbyJoin {
        lobby_id,
        password,
        invite_code,
    }
    .to_request();
    match client.request_json::<JoinReply>(&request).await {
        Ok(reply) if reply.success => {
            let target = non_blank(reply.redirect_url.as_deref())
                .unwrap_or_else(|| format!("/lobby/{lobby_id}"));
            tracing::info!(lobby_id, "joined lobby");
            ActionEffect::Navigate(target)
        }
        Ok(reply) => {
            alert_failure(client, reply.error.as_deref());
            ActionEffect::Nothing
        }
        Err(error) => {
            report_request_error(client, &request.path, &error);
            ActionEffect::Nothing
        }
    }
}
