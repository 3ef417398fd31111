/// GUI module - shared parameters and the control registration sink

pub mod parameter;
pub mod control_panel;

pub use parameter::Parameter;
pub use control_panel::{Control, ControlPanel, ControlSink, NullControlSink};

#[cfg(test)]
#[path = "gui_tests.rs"]
mod tests;
