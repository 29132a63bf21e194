//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer takes the controller's display state and turns it into cells
//! on the terminal.  No network I/O happens here.

pub mod column_picker;
pub mod layout;
pub mod plot;
pub mod sidebar;
pub mod slider;
pub mod spinner;
pub mod theme;
