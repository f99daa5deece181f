#![cfg_attr(test, allow(clippy::expect_used))]

//! Browser-free core of the arena web client.
//!
//! Everything that decides what the lobby, ticket and friends pages show
//! lives here: wire types, the fetch wrapper, poller state machines, the
//! member reconciler and transcript feeds, and user action handlers. The
//! `arena-web-shell` crate supplies the transport, prompts, timers and
//! DOM mirroring.

pub mod actions;
pub mod api;
pub mod config;
pub mod fetch;
pub mod format;
pub mod lobby;
pub mod model;
pub mod page;
pub mod poller;
pub mod transcript;
pub mod view;
pub mod widgets;

pub use actions::{
    ActionEffect, CommandInputError, FriendAction, MemberAction, UserCommand, handle_input,
    run_command,
};
pub use api::{ApiEndpoint, ApiError, ApiRequest, ApiResponse, HttpMethod, decode_json_response};
pub use config::{ClientConfig, ConfigError, Messages};
pub use fetch::{ApiClient, ApiTransport, Prompter};
pub use format::{format_balance, format_date, format_number, format_timestamp};
pub use lobby::{LobbySnapshot, ReconcileReport, poll_lobby, reconcile_members};
pub use model::{
    LobbyId, LobbyMode, LobbyStatus, Member, MessageId, Team, TicketId, TicketStatus,
    TranscriptMessage, UserId,
};
pub use page::{DataAttributes, LobbyPage, PageContextError, TicketPage, Viewer};
pub use poller::{Poller, PollerKind, PollerSet, PollerState, TimerHandle};
pub use transcript::{TicketTick, TranscriptFeed, TranscriptKind, poll_chat, poll_ticket};
pub use view::ViewNode;
