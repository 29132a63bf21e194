//! A terminal dashboard for a forecast service.
//!
//! Browse pre-rendered forecast plots for one economic series at a time:
//! the slider picks the horizon, the series picker switches columns.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stderr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Terminal,
};
use tokio::sync::mpsc;

use crate::app::{
    controller::{ArtifactView, DisplayState, FetchCompletion, RenderController},
    event::spawn_event_reader,
    fetch_runtime, handler,
    state::{ActiveView, AppState},
};
use crate::config::Action;
use crate::core::{client::ForecastClient, forecast::Column, info::InfoResolver};
use crate::ui::{
    column_picker::ColumnPicker,
    layout::AppLayout,
    plot::PlotWidget,
    sidebar::{ColumnBox, InfoPanel, ValuesTable},
    slider::SliderWidget,
    spinner::LoadingIndicator,
    theme::Theme,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Terminal dashboard for forecast plots")]
struct Cli {
    /// Base URL of the forecast service.
    #[arg(long, env = "FORECAST_DASH_URL")]
    url: Option<String>,

    /// Series selected at startup.
    #[arg(long)]
    column: Option<String>,

    /// JSON file mapping series names to descriptions.
    #[arg(long)]
    info: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Write the effective configuration to the config file and exit.
    #[arg(long = "save-config")]
    save_config: bool,
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr) // never pollute stdout
                .init();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── drawing ──────────

fn draw_dashboard(state: &mut AppState, area: Rect, buf: &mut Buffer) {
    let layout = AppLayout::from_area(area);
    let display = state.controller.display();

    let image = match display.artifact {
        ArtifactView::Payload(artifact) => match (display.index, &artifact.payload) {
            (Some(i), Some(bytes)) => state.plot_cache.get_or_decode(display.revision, i, bytes),
            _ => None,
        },
        ArtifactView::Unavailable(_) => None,
    };

    let title = match display.showing_column {
        Some(col) => format!("Forecast: {col}"),
        None => "Forecast".to_string(),
    };
    PlotWidget {
        artifact: display.artifact,
        image: image.as_deref(),
        title,
        revalidating: display.revalidating,
        refresh_key: state.config.short_binding(Action::Refresh),
    }
    .render(layout.plot_area, buf);

    LoadingIndicator {
        visible: display.loading,
        tick: state.tick,
        label: if display.revalidating { "updating" } else { "loading" },
    }
    .render(layout.plot_area, buf);

    Paragraph::new(Span::styled(display.caption.as_str(), Theme::caption_style()))
        .centered()
        .render(layout.caption_area, buf);

    SliderWidget {
        index: display.index,
        len: display.len,
    }
    .render(layout.slider_area, buf);

    ColumnBox {
        selected: display.selected_column,
        showing: display.showing_column,
    }
    .render(layout.column_area, buf);

    InfoPanel {
        text: display.info_text,
    }
    .render(layout.info_area, buf);

    let points = match display.artifact {
        ArtifactView::Payload(artifact) => Some(&artifact.points),
        ArtifactView::Unavailable(_) => None,
    };
    ValuesTable {
        points,
        highlight: display.index,
    }
    .render(layout.values_area, buf);

    let hint = state.config.status_bar_hint();
    render_status(&display, state.status_message.as_deref(), &hint, layout.status_area, buf);
}

fn render_status(
    display: &DisplayState<'_>,
    message: Option<&str>,
    hint: &str,
    area: Rect,
    buf: &mut Buffer,
) {
    let updated = display
        .last_updated
        .map(|t| format!(" updated {} ", t.format("%H:%M:%S")))
        .unwrap_or_default();
    let (text, style) = match (message, display.last_error) {
        (Some(msg), _) => (msg.to_string(), Theme::status_bar_style()),
        (None, Some(err)) => (format!("Error: {err}"), Theme::error_style()),
        (None, None) => (hint.to_string(), Theme::status_bar_style()),
    };
    Paragraph::new(Line::from(Span::styled(text, style)))
        .style(Theme::status_bar_style())
        .render(area, buf);

    let width = updated.chars().count() as u16;
    if width > 0 && area.width > width {
        buf.set_span(
            area.x + area.width - width,
            area.y,
            &Span::styled(updated, Theme::status_bar_style()),
            width,
        );
    }
}

fn draw_picker(state: &AppState, area: Rect, buf: &mut Buffer) {
    let columns = state.picker_columns();
    ColumnPicker {
        columns: &columns,
        selected: state.picker_selected,
        current: state.controller.selection().column(),
        loading: !state.controller.store().has_columns(),
    }
    .render(area, buf);
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let mut user_config = config::AppConfig::load();
    if let Some(url) = cli.url {
        user_config.service_url = url;
    }
    if let Some(column) = cli.column {
        user_config.default_column = column;
    }
    if let Some(info) = cli.info {
        user_config.info_path = Some(info);
    }

    if cli.save_config {
        let path = user_config.save()?;
        println!("{}", path.display());
        return Ok(());
    }

    let client = ForecastClient::new(&user_config.service_url, user_config.request_timeout())
        .context("invalid forecast service URL")?;
    tracing::info!("forecast service at {}", client.base_url());

    let info = InfoResolver::load(user_config.info_path.as_deref());
    tracing::debug!("{} series descriptions loaded", info.len());
    let controller = RenderController::new(Column::new(user_config.default_column.clone()), info);
    let mut state = AppState::new(controller, user_config);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;
    state.terminal_area = terminal.size().map(Rect::from).unwrap_or_default();

    // ── async channels ────────────────────────────────────────
    let mut events = spawn_event_reader(Duration::from_millis(100));
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchCompletion>();

    let initial = state.controller.mount();
    fetch_runtime::spawn_all(&client, &fetch_tx, initial);

    // ── event loop ────────────────────────────────────────────
    let result: Result<()> = loop {
        let drawn = terminal.draw(|frame| {
            let area = frame.area();
            draw_dashboard(&mut state, area, frame.buffer_mut());
            if state.active_view == ActiveView::ColumnPicker {
                draw_picker(&state, area, frame.buffer_mut());
            }
        });
        if let Err(e) = drawn {
            break Err(e.into());
        }

        let requests = state.take_outbox();
        fetch_runtime::spawn_all(&client, &fetch_tx, requests);

        tokio::select! {
            biased;

            event = events.recv() => handler::handle_event(&mut state, event),

            Some(completion) = fetch_rx.recv() => {
                // Apply everything already queued before the next redraw.
                state.controller.complete(completion);
                while let Ok(more) = fetch_rx.try_recv() {
                    state.controller.complete(more);
                }
            }
        }

        if state.should_quit {
            break Ok(());
        }
    };

    state.controller.dispose();

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
