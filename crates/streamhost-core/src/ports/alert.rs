//! Alert/dialog presenter port.
//!
//! Provisioning reaches the user only through this trait, so the CLI can
//! prompt on stdin, a desktop shell can show a native dialog, and tests can
//! script answers.

use serde::Serialize;

/// Severity shown with an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Info,
    Warning,
    Error,
}

/// A dialog with a title, a message and a row of buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub buttons: Vec<String>,
}

impl Alert {
    /// An alert with a single "OK" button.
    pub fn new(kind: AlertKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            buttons: vec!["OK".to_string()],
        }
    }

    #[must_use]
    pub fn with_buttons<I, S>(mut self, buttons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.buttons = buttons.into_iter().map(Into::into).collect();
        self
    }
}

/// Presents alerts and reports which button was chosen.
///
/// May block indefinitely while waiting for the user.
pub trait AlertPresenter: Send + Sync {
    /// Show `alert` and return the index of the chosen button,
    /// or `None` when the dialog was closed without a choice.
    fn show_alert(&self, alert: &Alert) -> Option<usize>;
}

/// Presenter for contexts without a user (services, CI).
///
/// Every alert is logged and treated as dismissed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractiveAlerts;

impl AlertPresenter for NonInteractiveAlerts {
    fn show_alert(&self, alert: &Alert) -> Option<usize> {
        tracing::warn!(
            title = %alert.title,
            kind = ?alert.kind,
            "No interactive presenter; dismissing alert: {}",
            alert.message
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_alert_has_ok_button() {
        let alert = Alert::new(AlertKind::Info, "t", "m");
        assert_eq!(alert.buttons, vec!["OK".to_string()]);
    }

    #[test]
    fn with_buttons_replaces_labels() {
        let alert = Alert::new(AlertKind::Warning, "t", "m").with_buttons(["A", "B"]);
        assert_eq!(alert.buttons.len(), 2);
        assert_eq!(alert.buttons[1], "B");
    }

    #[test]
    fn non_interactive_dismisses() {
        let alert = Alert::new(AlertKind::Error, "t", "m");
        assert_eq!(NonInteractiveAlerts.show_alert(&alert), None);
    }
}
