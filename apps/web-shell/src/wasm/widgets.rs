use super::*;

use arena_client_core::page::ATTR_TOOLTIP;
use arena_client_core::widgets::{
    ERROR_CLASS, FormField, Rect, alert_auto_dismiss, nickname_section_display,
    nickname_section_id, tooltip_position, validate_required,
};

pub(super) fn hide_element(element: &Element) {
    if let Some(element) = element.dyn_ref::<HtmlElement>() {
        let _ = element.style().set_property("display", "none");
    }
}

/// Schedules the auto-dismiss for every alert rendered with the page.
pub(super) fn init_alerts() {
    let delay = alert_auto_dismiss(config_snapshot().alert_auto_dismiss_ms);
    let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
    let timers: Vec<Timeout> = query_all(ALERT_SELECTOR)
        .into_iter()
        .map(|alert| Timeout::new(millis, move || hide_element(&alert)))
        .collect();
    if timers.is_empty() {
        return;
    }
    ALERT_TIMERS.with(|slot| slot.borrow_mut().extend(timers));
}

pub(super) fn init_tooltips() {
    let anchors = query_all(TOOLTIP_ANCHOR_SELECTOR);
    if anchors.is_empty() {
        return;
    }
    TOOLTIP_HANDLERS.with(|slot| {
        let mut handlers = slot.borrow_mut();
        if !handlers.is_empty() {
            return;
        }
        for anchor in anchors {
            let enter_anchor = anchor.clone();
            let on_enter = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                show_tooltip(&enter_anchor);
            }));
            let on_leave = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                remove_tooltip();
            }));
            let _ = anchor
                .add_event_listener_with_callback("mouseenter", on_enter.as_ref().unchecked_ref());
            let _ = anchor
                .add_event_listener_with_callback("mouseleave", on_leave.as_ref().unchecked_ref());
            handlers.push(on_enter);
            handlers.push(on_leave);
        }
    });
}

fn show_tooltip(anchor: &Element) {
    remove_tooltip();
    let Some(text) = anchor.get_attribute(ATTR_TOOLTIP) else {
        return;
    };
    let Ok(document) = document() else {
        return;
    };
    let Some(body) = document.body() else {
        return;
    };
    let Some(tooltip) = document
        .create_element("div")
        .ok()
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    tooltip.set_class_name(TOOLTIP_CLASS);
    tooltip.set_text_content(Some(&text));
    if body.append_child(&tooltip).is_err() {
        return;
    }

    // Measured after insertion so the tooltip has a layout size.
    let rect = anchor.get_bounding_client_rect();
    let position = tooltip_position(
        Rect {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        },
        f64::from(tooltip.offset_width()),
        f64::from(tooltip.offset_height()),
    );
    let style = tooltip.style();
    let _ = style.set_property("top", &position.css_top());
    let _ = style.set_property("left", &position.css_left());

    ACTIVE_TOOLTIP.with(|slot| *slot.borrow_mut() = Some(tooltip.into()));
}

fn remove_tooltip() {
    if let Some(tooltip) = ACTIVE_TOOLTIP.with(|slot| slot.borrow_mut().take()) {
        tooltip.remove();
    }
}

pub(super) fn apply_nickname_toggle(checkbox: &HtmlInputElement) {
    let section_id = nickname_section_id(&checkbox.value());
    let Some(section) = document()
        .ok()
        .and_then(|document| document.get_element_by_id(&section_id))
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    else {
        tracing::debug!(section = %section_id, "nickname section not found");
        return;
    };
    let _ = section
        .style()
        .set_property("display", nickname_section_display(checkbox.checked()));
}

pub(super) fn validate_form_by_id(form_id: &str) -> bool {
    let form = document()
        .ok()
        .and_then(|document| document.get_element_by_id(form_id));
    match form {
        Some(form) => validate_required_fields(&form),
        None => validate_required(None).is_valid(),
    }
}

/// Marks empty `[required]` fields with the error class and clears it from
/// filled ones.
pub(super) fn validate_required_fields(form: &Element) -> bool {
    let elements = query_all_within(form, REQUIRED_FIELD_SELECTOR);
    let fields: Vec<FormField> = elements
        .iter()
        .map(|element| FormField {
            name: element.get_attribute("name").unwrap_or_default(),
            value: field_value(element).unwrap_or_default(),
        })
        .collect();
    let validation = validate_required(Some(&fields));
    for (element, marked) in elements.iter().zip(&validation.marked) {
        let class_list = element.class_list();
        let _ = if *marked {
            class_list.add_1(ERROR_CLASS)
        } else {
            class_list.remove_1(ERROR_CLASS)
        };
    }
    validation.is_valid()
}
