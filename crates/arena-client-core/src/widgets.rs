use std::time::Duration;

/// Gap between a tooltip and its anchor, in CSS pixels.
pub const TOOLTIP_GAP_PX: f64 = 5.0;
pub const ERROR_CLASS: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPosition {
    pub left: f64,
    pub top: f64,
}

impl TooltipPosition {
    #[must_use]
    pub fn css_left(&self) -> String {
        format!("{}px", self.left)
    }

    #[must_use]
    pub fn css_top(&self) -> String {
        format!("{}px", self.top)
    }
}

/// Centres the tooltip horizontally over `anchor` and places it just above.
#[must_use]
pub fn tooltip_position(anchor: Rect, tooltip_width: f64, tooltip_height: f64) -> TooltipPosition {
    TooltipPosition {
        left: anchor.left + anchor.width / 2.0 - tooltip_width / 2.0,
        top: anchor.top - tooltip_height - TOOLTIP_GAP_PX,
    }
}

#[must_use]
pub fn nickname_section_id(server: &str) -> String {
    format!("nickname_section_{}", server.trim())
}

#[must_use]
pub fn nickname_section_display(checked: bool) -> &'static str {
    if checked { "block" } else { "none" }
}

/// A `[required]` form field as read from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

impl FormField {
    #[must_use]
    pub fn is_filled(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValidation {
    /// One entry per field, in order: `true` means the `error` class is set.
    pub marked: Vec<bool>,
}

impl FormValidation {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.marked.iter().any(|marked| *marked)
    }
}

/// `None` stands for a form that is not on the page, which passes.
#[must_use]
pub fn validate_required(fields: Option<&[FormField]>) -> FormValidation {
    let Some(fields) = fields else {
        return FormValidation::default();
    };
    FormValidation {
        marked: fields.iter().map(|field| !field.is_filled()).collect(),
    }
}

#[must_use]
pub fn alert_auto_dismiss(alert_auto_dismiss_ms: u32) -> Duration {
    Duration::from_millis(u64::from(alert_auto_dismiss_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, value: &str) -> FormField {
        FormField {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn tooltip_sits_centred_above_anchor() {
        let anchor = Rect {
            left: 100.0,
            top: 200.0,
            width: 40.0,
            height: 20.0,
        };
        let position = tooltip_position(anchor, 60.0, 24.0);
        assert!((position.left - 90.0).abs() < f64::EPSILON);
        assert!((position.top - 171.0).abs() < f64::EPSILON);
        assert_eq!(position.css_top(), "171px");
    }

    #[test]
    fn nickname_toggle_targets_server_section() {
        assert_eq!(nickname_section_id("S"), "nickname_section_S");
        assert_eq!(nickname_section_display(true), "block");
        assert_eq!(nickname_section_display(false), "none");
    }

    #[test]
    fn blank_required_fields_are_marked() {
        let fields = [field("title", "  "), field("body", "help"), field("email", "")];
        let result = validate_required(Some(&fields));
        assert_eq!(result.marked, vec![true, false, true]);
        assert!(!result.is_valid());
    }

    #[test]
    fn missing_form_validates() {
        assert!(validate_required(None).is_valid());
        assert!(validate_required(Some(&[field("title", "ok")])).is_valid());
    }
}
