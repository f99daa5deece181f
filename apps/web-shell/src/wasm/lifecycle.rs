use super::*;

use std::time::Duration;

use arena_client_core::config::{CONFIG_SCRIPT_ELEMENT_ID, CONFIG_WINDOW_GLOBAL};
use arena_client_core::{
    PollerKind, TimerHandle, TranscriptKind, poll_chat, poll_lobby, poll_ticket,
};

/// A running `setInterval`, cancelled when the poller stops or restarts.
pub(super) struct IntervalTimer(Interval);

impl TimerHandle for IntervalTimer {
    fn cancel(self) {
        drop(self.0.cancel());
    }
}

fn schedule_every(interval: Duration, tick: fn()) -> IntervalTimer {
    let millis = u32::try_from(interval.as_millis()).unwrap_or(u32::MAX);
    IntervalTimer(Interval::new(millis, tick))
}

pub(super) fn boot() -> Result<(), String> {
    let config = load_client_config();
    let client = Rc::new(build_client(&config));
    CONFIG.with(|slot| *slot.borrow_mut() = config);
    CLIENT.with(|slot| *slot.borrow_mut() = Some(client));

    install_document_handlers()?;
    install_unload_handlers()?;
    init_alerts();
    init_tooltips();

    if let Some(root) = query_first(LOBBY_ROOT_SELECTOR) {
        match LobbyPage::from_attributes(&data_attributes(&root)) {
            Ok(page) => start_lobby_page(page),
            Err(error) => tracing::warn!(error = %error, "lobby root has invalid attributes"),
        }
    }
    if let Some(root) = query_first(TICKET_ROOT_SELECTOR) {
        match TicketPage::from_attributes(&data_attributes(&root)) {
            Ok(page) => start_ticket_page(page),
            Err(error) => tracing::warn!(error = %error, "ticket root has invalid attributes"),
        }
    }
    tracing::info!("arena web shell booted");
    Ok(())
}

/// Config block first, then the window global, then defaults.
fn load_client_config() -> ClientConfig {
    let script = document()
        .ok()
        .and_then(|document| document.get_element_by_id(CONFIG_SCRIPT_ELEMENT_ID))
        .and_then(|element| element.text_content())
        .unwrap_or_default();
    let global = detect_config_global().unwrap_or_default();
    ClientConfig::resolve([("script", script.as_str()), ("window", global.as_str())])
}

fn detect_config_global() -> Option<String> {
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_WINDOW_GLOBAL)).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    if let Some(raw) = value.as_string() {
        return Some(raw);
    }
    js_sys::JSON::stringify(&value).ok()?.as_string()
}

fn start_lobby_page(page: LobbyPage) {
    let lobby_id = page.lobby_id;
    let config = config_snapshot();
    LOBBY_PAGE.with(|slot| *slot.borrow_mut() = Some(page));
    DIAGNOSTICS.with(|state| state.borrow_mut().page = Some("lobby"));

    POLLERS.with(|pollers| {
        pollers
            .borrow_mut()
            .get_mut(PollerKind::Lobby)
            .start(lobby_id, config.lobby_poll_interval(), |interval| {
                schedule_every(interval, lobby_tick)
            });
    });

    if query_first(CHAT_MESSAGES_SELECTOR).is_some() {
        let feed = rendered_feed(CHAT_MESSAGE_SELECTOR);
        CHAT_FEED.with(|slot| *slot.borrow_mut() = feed);
        POLLERS.with(|pollers| {
            pollers
                .borrow_mut()
                .get_mut(PollerKind::Chat)
                .start(lobby_id, config.chat_poll_interval(), |interval| {
                    schedule_every(interval, chat_tick)
                });
        });
    }
}

fn start_ticket_page(page: TicketPage) {
    let ticket_id = page.ticket_id;
    let config = config_snapshot();
    TICKET_PAGE.with(|slot| *slot.borrow_mut() = Some(page));
    DIAGNOSTICS.with(|state| state.borrow_mut().page = Some("ticket"));

    let feed = rendered_feed(TICKET_MESSAGE_SELECTOR);
    TICKET_FEED.with(|slot| *slot.borrow_mut() = feed);
    POLLERS.with(|pollers| {
        pollers
            .borrow_mut()
            .get_mut(PollerKind::Ticket)
            .start(ticket_id, config.ticket_poll_interval(), |interval| {
                schedule_every(interval, ticket_tick)
            });
    });
}

fn lobby_tick() {
    let Some(page) = LOBBY_PAGE.with(|slot| slot.borrow().clone()) else {
        return;
    };
    let Some(client) = shared_client() else {
        return;
    };
    spawn_local(async move {
        let Some(snapshot) = poll_lobby(&client, page.lobby_id).await else {
            return;
        };
        if let Err(error) = apply_lobby_snapshot(&snapshot, &page.viewer) {
            tracing::warn!(lobby_id = page.lobby_id, error = %error, "failed to render lobby members");
        }
    });
}

fn chat_tick() {
    let Some(lobby_id) = LOBBY_PAGE.with(|slot| slot.borrow().as_ref().map(|page| page.lobby_id))
    else {
        return;
    };
    let Some(client) = shared_client() else {
        return;
    };
    let feed = CHAT_FEED.with(|slot| *slot.borrow());
    spawn_local(async move {
        let Some(batch) = poll_chat(&client, lobby_id, &feed).await else {
            return;
        };
        let result = CHAT_FEED.with(|slot| {
            append_transcript(
                CHAT_MESSAGES_SELECTOR,
                &mut slot.borrow_mut(),
                TranscriptKind::Chat,
                batch,
            )
        });
        if let Err(error) = result {
            tracing::warn!(lobby_id, error = %error, "failed to render chat messages");
        }
    });
}

fn ticket_tick() {
    let Some(ticket_id) = TICKET_PAGE.with(|slot| slot.borrow().map(|page| page.ticket_id)) else {
        return;
    };
    let Some(client) = shared_client() else {
        return;
    };
    let feed = TICKET_FEED.with(|slot| *slot.borrow());
    spawn_local(async move {
        let Some(tick) = poll_ticket(&client, ticket_id, &feed).await else {
            return;
        };
        let result = TICKET_FEED.with(|slot| {
            append_transcript(
                TICKET_MESSAGES_SELECTOR,
                &mut slot.borrow_mut(),
                TranscriptKind::Ticket,
                tick.messages,
            )
        });
        if let Err(error) = result {
            tracing::warn!(ticket_id, error = %error, "failed to render ticket messages");
        }
        if let Some(status) = tick.status {
            apply_ticket_status(&status);
        }
    });
}

pub(super) fn stop_all_pollers(reason: &str) {
    let stopped = POLLERS.with(|pollers| pollers.borrow_mut().stop_all());
    if stopped > 0 {
        tracing::debug!(reason, stopped, "stopped pollers");
    }
}

fn install_unload_handlers() -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;

    PAGEHIDE_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            stop_all_pollers("pagehide");
        }));
        let _ = window.add_event_listener_with_callback("pagehide", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });

    BEFOREUNLOAD_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            stop_all_pollers("beforeunload");
        }));
        let _ = window
            .add_event_listener_with_callback("beforeunload", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });
    Ok(())
}

fn install_document_handlers() -> Result<(), String> {
    let document = document()?;

    DOCUMENT_CLICK_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |event| {
            handle_document_click(&event);
        }));
        let _ = document.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });

    DOCUMENT_SUBMIT_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |event| {
            handle_document_submit(&event);
        }));
        let _ =
            document.add_event_listener_with_callback("submit", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });

    DOCUMENT_CHANGE_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return;
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |event| {
            if let Some(toggle) = closest_target(&event, NICKNAME_TOGGLE_SELECTOR)
                .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
            {
                apply_nickname_toggle(&toggle);
            }
        }));
        let _ =
            document.add_event_listener_with_callback("change", callback.as_ref().unchecked_ref());
        *slot.borrow_mut() = Some(callback);
    });
    Ok(())
}

fn current_lobby_id() -> Option<u64> {
    LOBBY_PAGE.with(|slot| slot.borrow().as_ref().map(|page| page.lobby_id))
}

fn current_ticket_id() -> Option<u64> {
    TICKET_PAGE.with(|slot| slot.borrow().map(|page| page.ticket_id))
}

fn handle_document_click(event: &web_sys::Event) {
    if let Some(close) = closest_target(event, ALERT_CLOSE_SELECTOR) {
        if let Some(alert) = close.closest(ALERT_SELECTOR).ok().flatten() {
            hide_element(&alert);
        }
        return;
    }

    if let Some(control) = closest_target(event, MEMBER_ACTION_SELECTOR) {
        event.prevent_default();
        let Some(lobby_id) = current_lobby_id() else {
            tracing::debug!("member action outside a lobby page");
            return;
        };
        dispatch(UserCommand::member(lobby_id, &data_attributes(&control)), None);
        return;
    }

    if let Some(control) = closest_target(event, FRIEND_ACTION_SELECTOR) {
        event.prevent_default();
        dispatch(UserCommand::friend(&data_attributes(&control)), None);
        return;
    }

    if let Some(control) = closest_target(event, TICKET_STATUS_CONTROL_SELECTOR) {
        event.prevent_default();
        let Some(ticket_id) = current_ticket_id() else {
            return;
        };
        let raw = control
            .get_attribute(ATTR_SET_TICKET_STATUS)
            .unwrap_or_default();
        dispatch(UserCommand::update_ticket_status(ticket_id, &raw), None);
        return;
    }

    if closest_target(event, INVITE_CONTROL_SELECTOR).is_some() {
        event.prevent_default();
        if let Some(lobby_id) = current_lobby_id() {
            dispatch(Ok(UserCommand::CopyLobbyInvite { lobby_id }), None);
        }
    }
}

fn handle_document_submit(event: &web_sys::Event) {
    let Some(form) = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
    else {
        return;
    };

    if !validate_required_fields(&form) {
        event.prevent_default();
        return;
    }

    if form.matches(LOBBY_CHAT_FORM_SELECTOR).unwrap_or(false) {
        event.prevent_default();
        let Some(lobby_id) = current_lobby_id() else {
            return;
        };
        let composer = composer_input(&form);
        let text = composer
            .as_ref()
            .and_then(|composer| field_value(composer))
            .unwrap_or_default();
        dispatch(UserCommand::send_lobby_message(lobby_id, &text), composer);
    } else if form.matches(TICKET_REPLY_FORM_SELECTOR).unwrap_or(false) {
        event.prevent_default();
        let Some(ticket_id) = current_ticket_id() else {
            return;
        };
        let composer = composer_input(&form);
        let text = composer
            .as_ref()
            .and_then(|composer| field_value(composer))
            .unwrap_or_default();
        dispatch(UserCommand::send_ticket_message(ticket_id, &text), composer);
    } else if form.matches(JOIN_FORM_SELECTOR).unwrap_or(false) {
        event.prevent_default();
        let Some(lobby_id) = data_attributes(&form).require_id(ATTR_JOIN_LOBBY_ID).ok() else {
            tracing::debug!("join form without a lobby id");
            return;
        };
        let password = named_field_value(&form, "password");
        let invite_code = named_field_value(&form, "invite_code");
        dispatch(
            Ok(UserCommand::join_lobby(
                lobby_id,
                password.as_deref(),
                invite_code.as_deref(),
            )),
            None,
        );
    }
}

fn named_field_value(form: &Element, name: &str) -> Option<String> {
    form.query_selector(&format!("[name={name}]"))
        .ok()
        .flatten()
        .and_then(|field| field_value(&field))
}
