pub(crate) const LOBBY_ROOT_SELECTOR: &str = "[data-lobby-id]";
pub(crate) const TICKET_ROOT_SELECTOR: &str = "[data-ticket-id]";
pub(crate) const MEMBERS_LIST_SELECTOR: &str = ".members-list";
pub(crate) const MEMBER_ITEM_SELECTOR: &str = ".member-item";
pub(crate) const MEMBER_ACTION_SELECTOR: &str = ".member-action";
pub(crate) const FRIEND_ACTION_SELECTOR: &str = "[data-friend-action]";
pub(crate) const LOBBY_STATUS_SELECTOR: &str = ".lobby-status";
pub(crate) const TICKET_STATUS_SELECTOR: &str = ".ticket-status";
pub(crate) const TICKET_MESSAGES_SELECTOR: &str = ".ticket-messages";
pub(crate) const TICKET_MESSAGE_SELECTOR: &str = ".ticket-message";
pub(crate) const CHAT_MESSAGES_SELECTOR: &str = ".chat-messages";
pub(crate) const CHAT_MESSAGE_SELECTOR: &str = ".chat-message";
pub(crate) const ALERT_SELECTOR: &str = ".alert";
pub(crate) const ALERT_CLOSE_SELECTOR: &str = ".alert .close";
pub(crate) const TOOLTIP_ANCHOR_SELECTOR: &str = "[data-tooltip]";
pub(crate) const REQUIRED_FIELD_SELECTOR: &str = "[required]";
pub(crate) const NICKNAME_TOGGLE_SELECTOR: &str = "input[data-server-toggle]";
pub(crate) const LOBBY_CHAT_FORM_SELECTOR: &str = "form.lobby-chat-form";
pub(crate) const TICKET_REPLY_FORM_SELECTOR: &str = "form.ticket-reply-form";
pub(crate) const COMPOSER_INPUT_SELECTOR: &str = "[name=message]";
pub(crate) const TICKET_STATUS_CONTROL_SELECTOR: &str = "[data-set-ticket-status]";
pub(crate) const INVITE_CONTROL_SELECTOR: &str = "[data-copy-invite]";
pub(crate) const JOIN_FORM_SELECTOR: &str = "form.lobby-join-form";
pub(crate) const ATTR_SET_TICKET_STATUS: &str = "data-set-ticket-status";
pub(crate) const ATTR_JOIN_LOBBY_ID: &str = "data-join-lobby-id";
pub(crate) const ATTR_LOBBY_STATUS: &str = "data-lobby-status";
pub(crate) const TOOLTIP_CLASS: &str = "tooltip";
pub(crate) const STATUS_CLASS_PREFIX: &str = "status-";
