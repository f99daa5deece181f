#![allow(clippy::needless_pass_by_value)]

#[cfg(target_arch = "wasm32")]
mod wasm_constants;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use arena_client_core::{
        ActionEffect, ApiClient, ClientConfig, CommandInputError, FriendAction, LobbyPage,
        PollerSet, TicketPage, TranscriptFeed, UserCommand, format_date as core_format_date,
        format_number as core_format_number, handle_input,
    };
    use gloo_timers::callback::{Interval, Timeout};
    use serde::Serialize;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{Element, HtmlElement, HtmlInputElement};

    use crate::wasm_constants::*;

    mod dom;
    mod lifecycle;
    mod network;
    mod widgets;

    use dom::*;
    use lifecycle::*;
    use network::*;
    use widgets::*;

    type BrowserClient = ApiClient<GlooTransport, BrowserPrompter>;

    thread_local! {
        static CONFIG: RefCell<ClientConfig> = RefCell::new(ClientConfig::default());
        static CLIENT: RefCell<Option<Rc<BrowserClient>>> = const { RefCell::new(None) };
        static POLLERS: RefCell<PollerSet<IntervalTimer>> = RefCell::new(PollerSet::default());
        static LOBBY_PAGE: RefCell<Option<LobbyPage>> = const { RefCell::new(None) };
        static TICKET_PAGE: RefCell<Option<TicketPage>> = const { RefCell::new(None) };
        static CHAT_FEED: RefCell<TranscriptFeed> = RefCell::new(TranscriptFeed::default());
        static TICKET_FEED: RefCell<TranscriptFeed> = RefCell::new(TranscriptFeed::default());
        static DIAGNOSTICS: RefCell<ShellDiagnostics> = RefCell::new(ShellDiagnostics::default());
        static ACTIVE_TOOLTIP: RefCell<Option<Element>> = const { RefCell::new(None) };
        static ALERT_TIMERS: RefCell<Vec<Timeout>> = const { RefCell::new(Vec::new()) };
        static DOCUMENT_CLICK_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static DOCUMENT_SUBMIT_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static DOCUMENT_CHANGE_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static PAGEHIDE_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static BEFOREUNLOAD_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static TOOLTIP_HANDLERS: RefCell<Vec<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(Vec::new()) };
    }

    #[derive(Debug, Clone, Default, Serialize)]
    struct ShellDiagnostics {
        page: Option<&'static str>,
        lobby_polling: bool,
        chat_polling: bool,
        ticket_polling: bool,
        chat_watermark: Option<u64>,
        ticket_watermark: Option<u64>,
        last_error: Option<String>,
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
        if let Err(error) = boot() {
            tracing::error!(error = %error, "arena web shell failed to boot");
            DIAGNOSTICS.with(|state| state.borrow_mut().last_error = Some(error));
        }
    }

    #[wasm_bindgen]
    pub fn shell_diagnostics_json() -> String {
        refresh_diagnostics();
        DIAGNOSTICS.with(|state| {
            serde_json::to_string(&*state.borrow()).unwrap_or_else(|_| {
                "{\"last_error\":\"diagnostics serialization failed\"}".to_string()
            })
        })
    }

    #[wasm_bindgen]
    pub fn format_number(value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        core_format_number(value.round() as i64)
    }

    #[wasm_bindgen]
    pub fn format_date(raw: String) -> String {
        core_format_date(&raw)
    }

    #[wasm_bindgen]
    pub fn copy_to_clipboard(text: String) {
        spawn_local(async move {
            copy_text(&text).await;
        });
    }

    #[wasm_bindgen]
    pub fn validate_form(form_id: String) -> bool {
        validate_form_by_id(&form_id)
    }

    #[wasm_bindgen]
    pub fn toggle_server_input(checkbox: HtmlInputElement) {
        apply_nickname_toggle(&checkbox);
    }

    #[wasm_bindgen]
    pub fn add_friend(friend_id: f64) {
        let Some(friend_id) = js_id(friend_id) else {
            tracing::debug!(friend_id, "ignoring add friend with invalid id");
            return;
        };
        dispatch(
            Ok(UserCommand::Friend(FriendAction::Add { friend_id })),
            None,
        );
    }

    #[wasm_bindgen]
    pub fn remove_friend(friend_id: f64) {
        let Some(friend_id) = js_id(friend_id) else {
            tracing::debug!(friend_id, "ignoring remove friend with invalid id");
            return;
        };
        dispatch(
            Ok(UserCommand::Friend(FriendAction::Remove { friend_id })),
            None,
        );
    }

    #[wasm_bindgen]
    pub fn join_lobby(lobby_id: f64, password: Option<String>, invite_code: Option<String>) {
        let Some(lobby_id) = js_id(lobby_id) else {
            tracing::debug!(lobby_id, "ignoring join with invalid lobby id");
            return;
        };
        dispatch(
            Ok(UserCommand::join_lobby(
                lobby_id,
                password.as_deref(),
                invite_code.as_deref(),
            )),
            None,
        );
    }

    #[wasm_bindgen]
    pub fn stop_polling() {
        stop_all_pollers("script");
    }

    /// Ids coming from inline template handlers arrive as JS numbers.
    fn js_id(raw: f64) -> Option<u64> {
        if raw.is_finite() && raw >= 1.0 && raw.fract() == 0.0 && raw <= 9_007_199_254_740_991.0 {
            Some(raw as u64)
        } else {
            None
        }
    }

    fn shared_client() -> Option<Rc<BrowserClient>> {
        CLIENT.with(|slot| slot.borrow().clone())
    }

    fn config_snapshot() -> ClientConfig {
        CONFIG.with(|config| config.borrow().clone())
    }

    /// Runs one user command off the event loop and applies its effect.
    fn dispatch(
        input: Result<UserCommand, CommandInputError>,
        composer: Option<HtmlElement>,
    ) {
        let Some(client) = shared_client() else {
            tracing::warn!("action ignored before the client was configured");
            return;
        };
        spawn_local(async move {
            let effect = handle_input(&client, input).await;
            apply_effect(effect, composer.as_ref()).await;
        });
    }

    async fn apply_effect(effect: ActionEffect, composer: Option<&HtmlElement>) {
        match effect {
            ActionEffect::Nothing => {}
            ActionEffect::AwaitNextPoll => {
                tracing::debug!("lobby command accepted; waiting for next poll");
            }
            ActionEffect::ReloadPage => reload_page(),
            ActionEffect::Navigate(target) => navigate_to(&target),
            ActionEffect::CopyToClipboard(text) => copy_text(&text).await,
            ActionEffect::ClearComposer => {
                if let Some(composer) = composer {
                    clear_composer(composer);
                }
            }
            ActionEffect::TicketStatusChanged(status) => apply_ticket_status(&status),
        }
    }

    fn refresh_diagnostics() {
        let (lobby_polling, chat_polling, ticket_polling) = POLLERS.with(|pollers| {
            let pollers = pollers.borrow();
            (
                pollers.lobby.is_polling(),
                pollers.chat.is_polling(),
                pollers.ticket.is_polling(),
            )
        });
        let chat_watermark = CHAT_FEED.with(|feed| feed.borrow().watermark());
        let ticket_watermark = TICKET_FEED.with(|feed| feed.borrow().watermark());
        DIAGNOSTICS.with(|state| {
            let mut state = state.borrow_mut();
            state.lobby_polling = lobby_polling;
            state.chat_polling = chat_polling;
            state.ticket_polling = ticket_polling;
            state.chat_watermark = chat_watermark;
            state.ticket_watermark = ticket_watermark;
        });
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn shell_diagnostics_json() -> String {
    "{\"page\":null,\"last_error\":\"web shell diagnostics only available on wasm\"}".to_string()
}
