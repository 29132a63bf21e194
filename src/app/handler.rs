//! Input handling. Maps key/mouse events to controller calls.
//!
//! Handlers never start fetches themselves; requests the controller issues
//! are queued on the state's outbox for the main loop to spawn.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::config::Action;
use crate::core::forecast::Column;
use crate::ui::column_picker;
use crate::ui::layout::{point_in_rect, AppLayout};
use crate::ui::slider;

use super::event::AppEvent;
use super::state::{ActiveView, AppState};

/// Apply one item from the terminal event channel.  `None` means the reader
/// task is gone and no more input can arrive, so the app quits.
pub fn handle_event(state: &mut AppState, event: Option<AppEvent>) {
    match event {
        Some(AppEvent::Key(k)) => handle_key(state, k),
        Some(AppEvent::Mouse(m)) => handle_mouse(state, m),
        Some(AppEvent::Resize(w, h)) => state.terminal_area = Rect::new(0, 0, w, h),
        Some(AppEvent::Tick) => state.tick = state.tick.wrapping_add(1),
        None => {
            tracing::warn!("terminal event reader stopped; quitting");
            state.should_quit = true;
        }
    }
}

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Dashboard => handle_dashboard_key(state, key),
        ActiveView::ColumnPicker => handle_picker_key(state, key),
    }
}

// ── Dashboard (configurable bindings) ───────────────────────────

fn handle_dashboard_key(state: &mut AppState, key: KeyEvent) {
    let Some(action) = state.config.match_key(key) else {
        return;
    };
    // Any deliberate action clears a stale status message.
    state.status_message = None;

    match action {
        Action::Quit => state.should_quit = true,
        Action::SliderPrev => {
            state.controller.step_slider(-1);
        }
        Action::SliderNext => {
            state.controller.step_slider(1);
        }
        Action::SliderFirst => {
            state.controller.slider_to_start();
        }
        Action::SliderLast => {
            state.controller.slider_to_end();
        }
        Action::OpenColumns => open_picker(state),
        Action::Refresh => {
            let requests = state.controller.refresh();
            if !requests.is_empty() {
                state.status_message = Some("Refreshing forecasts…".into());
            }
            state.queue(requests);
        }
    }
}

fn open_picker(state: &mut AppState) {
    let current = state.controller.selection().column();
    state.picker_selected = state
        .picker_columns()
        .iter()
        .position(|c| c == current)
        .unwrap_or(0);
    state.active_view = ActiveView::ColumnPicker;
}

// ── Column picker ───────────────────────────────────────────────

fn handle_picker_key(state: &mut AppState, key: KeyEvent) {
    let count = state.picker_columns().len();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.active_view = ActiveView::Dashboard;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.picker_selected = state.picker_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.picker_selected + 1 < count {
                state.picker_selected += 1;
            }
        }
        KeyCode::Home => state.picker_selected = 0,
        KeyCode::End => state.picker_selected = count.saturating_sub(1),
        KeyCode::Enter | KeyCode::Char(' ') => choose_picked(state),
        _ => {}
    }
}

fn choose_picked(state: &mut AppState) {
    let Some(column) = state.picker_columns().get(state.picker_selected).cloned() else {
        state.active_view = ActiveView::Dashboard;
        return;
    };
    select_column(state, column);
    state.active_view = ActiveView::Dashboard;
}

fn select_column(state: &mut AppState, column: Column) {
    match state.controller.on_dropdown_change(column) {
        Ok(Some(request)) => {
            state.status_message = None;
            state.queue([request]);
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("{e}");
            state.status_message = Some(e.to_string());
        }
    }
}

// ── Mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    match state.active_view {
        ActiveView::Dashboard => handle_dashboard_mouse(state, mouse),
        ActiveView::ColumnPicker => handle_picker_mouse(state, mouse),
    }
}

fn handle_dashboard_mouse(state: &mut AppState, mouse: MouseEvent) {
    let layout = AppLayout::from_area(state.terminal_area);
    let (col, row) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
            if point_in_rect(layout.slider_area, col, row) {
                let len = state.controller.store().forecast().len();
                if let Some(index) = slider::index_at(layout.slider_area, len, col, row) {
                    state.controller.on_slider_change(index as i64);
                }
                return;
            }
            if matches!(mouse.kind, MouseEventKind::Down(_))
                && point_in_rect(layout.column_area, col, row)
            {
                open_picker(state);
            }
        }
        MouseEventKind::ScrollUp => {
            if point_in_rect(layout.plot_area, col, row)
                || point_in_rect(layout.slider_area, col, row)
            {
                state.controller.step_slider(-1);
            }
        }
        MouseEventKind::ScrollDown => {
            if point_in_rect(layout.plot_area, col, row)
                || point_in_rect(layout.slider_area, col, row)
            {
                state.controller.step_slider(1);
            }
        }
        _ => {}
    }
}

fn handle_picker_mouse(state: &mut AppState, mouse: MouseEvent) {
    let count = state.picker_columns().len();
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let popup = column_picker::popup_rect(count, state.terminal_area);
            if !point_in_rect(popup, mouse.column, mouse.row) {
                // Click outside closes, like Esc.
                state.active_view = ActiveView::Dashboard;
                return;
            }
            if let Some(i) = column_picker::row_at(
                count,
                state.picker_selected,
                state.terminal_area,
                mouse.column,
                mouse.row,
            ) {
                state.picker_selected = i;
                choose_picked(state);
            }
        }
        MouseEventKind::ScrollUp => {
            state.picker_selected = state.picker_selected.saturating_sub(1);
        }
        MouseEventKind::ScrollDown => {
            if state.picker_selected + 1 < count {
                state.picker_selected += 1;
            }
        }
        _ => {}
    }
}
