use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

/// Current state of one named form control.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Text(String),
    Checkbox(bool),
    MultiSelect(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    pub fn class(self) -> &'static str {
        match self {
            MessageKind::Success => "bp-message-success",
            MessageKind::Error => "bp-message-error",
        }
    }
}

pub const SUCCESS_EVENT: &str = "bp:form:success";
pub const ERROR_EVENT: &str = "bp:form:error";

#[derive(Debug, Clone, PartialEq)]
pub struct FormEvent {
    pub name: &'static str,
    pub detail: Value,
}

/// The document a controller drives: controls looked up by name, per-field
/// error slots, the message region and the submit button.
pub trait FormSurface {
    fn control(&self, name: &str) -> Option<Control>;
    fn set_field_error(&mut self, name: &str, message: &str);
    fn clear_field_error(&mut self, name: &str);
    fn clear_errors(&mut self);
    fn show_message(&mut self, message: &str, kind: MessageKind);
    fn clear_message(&mut self);
    /// `Some(text)` disables the submit button and swaps its label;
    /// `None` restores it.
    fn set_submitting(&mut self, text: Option<&str>);
    fn reset(&mut self);
    fn dispatch(&mut self, event: FormEvent);
    fn redirect(&mut self, url: &str, delay: Duration);
}

/// In-memory surface. `reset` restores the controls it was built with.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    initial: BTreeMap<String, Control>,
    pub controls: BTreeMap<String, Control>,
    pub errors: BTreeMap<String, String>,
    pub message: Option<(String, MessageKind)>,
    pub submit_label: String,
    pub submit_disabled: bool,
    idle_label: Option<String>,
    pub events: Vec<FormEvent>,
    pub redirects: Vec<(String, Duration)>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self {
            submit_label: "Submit".into(),
            ..Self::default()
        }
    }

    pub fn with_control(mut self, name: &str, control: Control) -> Self {
        self.initial.insert(name.to_string(), control.clone());
        self.controls.insert(name.to_string(), control);
        self
    }

    pub fn text(self, name: &str, value: &str) -> Self {
        self.with_control(name, Control::Text(value.to_string()))
    }

    pub fn set(&mut self, name: &str, control: Control) {
        self.controls.insert(name.to_string(), control);
    }
}

impl FormSurface for MemorySurface {
    fn control(&self, name: &str) -> Option<Control> {
        self.controls.get(name).cloned()
    }

    fn set_field_error(&mut self, name: &str, message: &str) {
        self.errors.insert(name.to_string(), message.to_string());
    }

    fn clear_field_error(&mut self, name: &str) {
        self.errors.remove(name);
    }

    fn clear_errors(&mut self) {
        self.errors.clear();
    }

    fn show_message(&mut self, message: &str, kind: MessageKind) {
        self.message = Some((message.to_string(), kind));
    }

    fn clear_message(&mut self) {
        self.message = None;
    }

    fn set_submitting(&mut self, text: Option<&str>) {
        match text {
            Some(text) => {
                if self.idle_label.is_none() {
                    self.idle_label = Some(self.submit_label.clone());
                }
                self.submit_disabled = true;
                self.submit_label = text.to_string();
            }
            None => {
                self.submit_disabled = false;
                if let Some(label) = self.idle_label.take() {
                    self.submit_label = label;
                }
            }
        }
    }

    fn reset(&mut self) {
        self.controls = self.initial.clone();
    }

    fn dispatch(&mut self, event: FormEvent) {
        self.events.push(event);
    }

    fn redirect(&mut self, url: &str, delay: Duration) {
        self.redirects.push((url.to_string(), delay));
    }
}
