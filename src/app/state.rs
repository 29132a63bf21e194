//! Central application state.
//!
//! The controller owns the forecast data and the selection; everything else
//! here is view bookkeeping (which overlay is open, status text, decoded
//! plots) plus the outbox of fetches the handler wants started.

use ratatui::layout::Rect;

use super::controller::{FetchRequest, RenderController};
use crate::config::AppConfig;
use crate::core::forecast::Column;
use crate::ui::plot::PlotCache;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Dashboard,
    ColumnPicker,
}

pub struct AppState {
    pub controller: RenderController,
    pub config: AppConfig,
    pub active_view: ActiveView,
    /// Highlighted row in the column picker.
    pub picker_selected: usize,
    pub should_quit: bool,
    /// Transient message shown in the status bar instead of the key hints.
    pub status_message: Option<String>,
    /// Frame counter; drives the spinner.
    pub tick: u64,
    /// Last known terminal size, for mouse hit-testing.
    pub terminal_area: Rect,
    pub plot_cache: PlotCache,
    /// Fetches requested by event handlers, started by the main loop.
    pub outbox: Vec<FetchRequest>,
}

impl AppState {
    pub fn new(controller: RenderController, config: AppConfig) -> Self {
        Self {
            controller,
            config,
            active_view: ActiveView::default(),
            picker_selected: 0,
            should_quit: false,
            status_message: None,
            tick: 0,
            terminal_area: Rect::default(),
            plot_cache: PlotCache::default(),
            outbox: Vec::new(),
        }
    }

    pub fn queue(&mut self, requests: impl IntoIterator<Item = FetchRequest>) {
        self.outbox.extend(requests);
    }

    pub fn take_outbox(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Entries offered by the column picker.  Until the service reports its
    /// columns, only the current selection is listed.
    pub fn picker_columns(&self) -> Vec<Column> {
        let columns = self.controller.display().columns;
        if columns.is_empty() {
            vec![self.controller.selection().column().clone()]
        } else {
            columns.to_vec()
        }
    }
}
