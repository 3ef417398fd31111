/// GUI collaborator surface: passes register labelled controls during
/// `prepare`, the host edits them through whatever widget toolkit it uses.

use crate::error::{Error, Result};
use crate::gui::parameter::Parameter;

/// One registered control
#[derive(Debug, Clone)]
pub struct Control {
    pub label: String,
    pub value: Parameter,
}

/// Accepts control registrations from passes
pub trait ControlSink {
    fn register(&mut self, control: Control);
}

/// Discards every registration
#[derive(Debug, Default, Clone, Copy)]
pub struct NullControlSink;

impl ControlSink for NullControlSink {
    fn register(&mut self, _control: Control) {}
}

/// Records registrations so the host can list and edit them
#[derive(Debug, Default, Clone)]
pub struct ControlPanel {
    controls: Vec<Control>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn control(&self, label: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.label == label)
    }

    pub fn get(&self, label: &str) -> Option<f32> {
        self.control(label).map(|c| c.value.get())
    }

    /// Set a control by label; returns the clamped value
    pub fn set(&self, label: &str, value: f32) -> Result<f32> {
        match self.control(label) {
            Some(control) => Ok(control.value.set(value)),
            None => Err(Error::UsageError(format!("no control labelled '{}'", label))),
        }
    }

    /// Drop every control whose label starts with `prefix`
    pub fn remove_prefixed(&mut self, prefix: &str) {
        self.controls.retain(|c| !c.label.starts_with(prefix));
    }
}

impl ControlSink for ControlPanel {
    /// A second registration under the same label replaces the first
    fn register(&mut self, control: Control) {
        match self.controls.iter_mut().find(|c| c.label == control.label) {
            Some(existing) => *existing = control,
            None => self.controls.push(control),
        }
    }
}
