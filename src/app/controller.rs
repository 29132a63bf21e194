//! Selection-to-render controller.
//!
//! Owns the committed data, the user's selection, and the info table, and
//! reconciles them into a [`DisplayState`].  User events mutate the
//! selection and hand back [`FetchRequest`]s for the runtime to execute;
//! completions come back through [`RenderController::complete`], where the
//! request tracker decides whether they may touch the store.
//!
//! Nothing here performs I/O, so the whole controller is driven directly in
//! tests without a terminal or a network.

use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::core::{
    error::{FetchError, SelectionError},
    forecast::{clamp_index, Column, ForecastArtifact, ForecastSet, ForecastSnapshot},
    info::InfoResolver,
    request::{FetchKind, RequestPhase, RequestTracker, Verdict},
    selection::SelectionState,
    store::ForecastDataStore,
};

/// Controller lifecycle.  Events and completions only count while `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Init,
    Active,
    Disposed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    /// Forecast set for one column.
    Forecast { column: Column },
    Columns,
}

impl FetchTarget {
    pub fn kind(&self) -> FetchKind {
        match self {
            Self::Forecast { .. } => FetchKind::Forecast,
            Self::Columns => FetchKind::Columns,
        }
    }
}

/// A fetch the runtime should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub target: FetchTarget,
}

#[derive(Debug)]
pub enum FetchResult {
    Forecast {
        column: Column,
        result: Result<ForecastSet, FetchError>,
    },
    Columns(Result<Vec<Column>, FetchError>),
}

impl FetchResult {
    fn kind(&self) -> FetchKind {
        match self {
            Self::Forecast { .. } => FetchKind::Forecast,
            Self::Columns(_) => FetchKind::Columns,
        }
    }
}

/// A finished fetch, tagged with the sequence number it was issued under.
#[derive(Debug)]
pub struct FetchCompletion {
    pub seq: u64,
    pub result: FetchResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Committed,
    Failed,
    /// Older than data already committed; dropped.
    Stale,
    /// Controller not active.
    Ignored,
}

/// Why there is no plot to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// Nothing committed yet and a fetch is running.
    Loading,
    /// The committed set is empty, or nothing was ever requested.
    NoData,
    /// Nothing committed and the last attempt failed.
    FetchFailed,
    /// The entry at the selected index has no usable plot.
    MissingPayload,
}

#[derive(Debug, Clone, Copy)]
pub enum ArtifactView<'a> {
    Payload(&'a ForecastArtifact),
    Unavailable(Unavailable),
}

/// Everything the view needs for one frame.
#[derive(Debug, Clone)]
pub struct DisplayState<'a> {
    pub artifact: ArtifactView<'a>,
    pub caption: String,
    pub info_text: &'a str,
    /// Committed column list offered by the series picker.
    pub columns: Arc<[Column]>,
    pub selected_column: &'a Column,
    /// Column the on-screen data belongs to (`None` before the first commit).
    pub showing_column: Option<&'a Column>,
    /// Clamped slider index, `None` when the set is empty.
    pub index: Option<usize>,
    /// Number of variants in the committed set.
    pub len: usize,
    /// Sequence number of the committed set (keys decoded-image caches).
    pub revision: u64,
    /// A forecast or column fetch is in flight.
    pub loading: bool,
    /// Committed data is on screen while a newer forecast fetch runs.
    pub revalidating: bool,
    pub last_error: Option<&'a str>,
    pub last_updated: Option<DateTime<Local>>,
}

pub struct RenderController {
    lifecycle: Lifecycle,
    store: ForecastDataStore,
    selection: SelectionState,
    info: InfoResolver,
    tracker: RequestTracker,
    last_updated: Option<DateTime<Local>>,
}

impl RenderController {
    pub fn new(default_column: Column, info: InfoResolver) -> Self {
        Self {
            lifecycle: Lifecycle::Init,
            store: ForecastDataStore::new(),
            selection: SelectionState::new(default_column),
            info,
            tracker: RequestTracker::new(),
            last_updated: None,
        }
    }

    #[cfg(test)]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn store(&self) -> &ForecastDataStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Activate and request the initial forecast set and the column list.
    pub fn mount(&mut self) -> Vec<FetchRequest> {
        if self.lifecycle != Lifecycle::Init {
            return Vec::new();
        }
        self.lifecycle = Lifecycle::Active;
        let column = self.selection.column().clone();
        vec![
            self.issue(FetchTarget::Forecast { column }),
            self.issue(FetchTarget::Columns),
        ]
    }

    /// Stop accepting events; in-flight completions will be ignored.
    pub fn dispose(&mut self) {
        self.lifecycle = Lifecycle::Disposed;
    }

    // ── user events ─────────────────────────────────────────────

    /// Store a raw slider value.  Never fetches.
    pub fn on_slider_change(&mut self, raw: i64) -> bool {
        if self.lifecycle != Lifecycle::Active {
            return false;
        }
        self.selection.set_index(raw)
    }

    /// Move the slider `delta` positions from where it is actually shown.
    pub fn step_slider(&mut self, delta: i64) -> bool {
        let Some(current) = self.clamped_index() else {
            return false;
        };
        let target = (current as i64).saturating_add(delta);
        let last = self.store.forecast().len().saturating_sub(1) as i64;
        self.on_slider_change(target.clamp(0, last))
    }

    pub fn slider_to_start(&mut self) -> bool {
        self.on_slider_change(0)
    }

    pub fn slider_to_end(&mut self) -> bool {
        let snapshot = self.store.forecast();
        if snapshot.is_empty() {
            return false;
        }
        let last = (snapshot.len() - 1) as i64;
        self.on_slider_change(last)
    }

    /// Select a column and request its forecast set.
    ///
    /// The info text follows immediately; the previous set stays on screen
    /// until the new one commits.  Re-selecting the current column issues
    /// nothing.
    pub fn on_dropdown_change(
        &mut self,
        column: Column,
    ) -> Result<Option<FetchRequest>, SelectionError> {
        if self.lifecycle != Lifecycle::Active {
            return Ok(None);
        }
        let changed = self.selection.set_column(column, self.store.columns())?;
        if !changed {
            return Ok(None);
        }
        let column = self.selection.column().clone();
        tracing::debug!("column selected: {column}");
        Ok(Some(self.issue(FetchTarget::Forecast { column })))
    }

    /// Re-request the current forecast set and the column list.
    pub fn refresh(&mut self) -> Vec<FetchRequest> {
        if self.lifecycle != Lifecycle::Active {
            return Vec::new();
        }
        let column = self.selection.column().clone();
        vec![
            self.issue(FetchTarget::Forecast { column }),
            self.issue(FetchTarget::Columns),
        ]
    }

    // ── completions ────────────────────────────────────────────

    pub fn complete(&mut self, completion: FetchCompletion) -> CompletionOutcome {
        let FetchCompletion { seq, result } = completion;
        if self.lifecycle != Lifecycle::Active {
            tracing::debug!("ignoring completion #{seq}: controller {:?}", self.lifecycle);
            return CompletionOutcome::Ignored;
        }
        let kind = result.kind();

        match result {
            FetchResult::Forecast {
                column,
                result: Ok(artifacts),
            } => {
                if self.tracker.resolve_success(kind, seq) == Verdict::Stale {
                    tracing::debug!("discarding stale forecast #{seq}");
                    return CompletionOutcome::Stale;
                }
                tracing::info!(
                    "forecast #{seq} committed: {} variants for {}",
                    artifacts.len(),
                    column,
                );
                self.store
                    .replace_forecast_set(ForecastSnapshot::new(Some(column), seq, artifacts));
                self.last_updated = Some(Local::now());
                CompletionOutcome::Committed
            }
            FetchResult::Columns(Ok(columns)) => {
                if self.tracker.resolve_success(kind, seq) == Verdict::Stale {
                    tracing::debug!("discarding stale column list #{seq}");
                    return CompletionOutcome::Stale;
                }
                tracing::info!("column list #{seq} committed: {} columns", columns.len());
                self.store.replace_columns(columns);
                CompletionOutcome::Committed
            }
            FetchResult::Forecast { result: Err(e), .. } | FetchResult::Columns(Err(e)) => {
                let message = e.to_string();
                if self.tracker.resolve_failure(kind, seq, message) == Verdict::Stale {
                    tracing::debug!("discarding stale failure #{seq}: {e}");
                    return CompletionOutcome::Stale;
                }
                tracing::warn!("{kind:?} fetch #{seq} failed: {e}");
                CompletionOutcome::Failed
            }
        }
    }

    // ── derived view ───────────────────────────────────────────

    pub fn display(&self) -> DisplayState<'_> {
        let snapshot = self.store.forecast();
        let index = clamp_index(self.selection.index(), snapshot.len());
        let forecast_phase = self.tracker.phase(FetchKind::Forecast);

        let artifact = match index {
            Some(i) => match snapshot.get(i) {
                Some(a) if a.has_payload() => ArtifactView::Payload(a),
                _ => ArtifactView::Unavailable(Unavailable::MissingPayload),
            },
            None => ArtifactView::Unavailable(match forecast_phase {
                RequestPhase::Pending => Unavailable::Loading,
                RequestPhase::Failed => Unavailable::FetchFailed,
                RequestPhase::Idle | RequestPhase::Committed => Unavailable::NoData,
            }),
        };

        // Set by every commit; `None` only before the first one.
        let showing_column = snapshot.column.as_ref();

        let caption = caption_for(
            &artifact,
            index.and_then(|i| snapshot.get(i)),
            index,
            showing_column.unwrap_or(self.selection.column()),
        );

        let last_error = self
            .tracker
            .last_error(FetchKind::Forecast)
            .or_else(|| self.tracker.last_error(FetchKind::Columns));

        DisplayState {
            artifact,
            caption,
            info_text: self.info.resolve(self.selection.column()),
            columns: self.store.current_columns(),
            selected_column: self.selection.column(),
            showing_column,
            index,
            len: snapshot.len(),
            revision: snapshot.revision,
            loading: self.tracker.is_pending(FetchKind::Forecast)
                || self.tracker.is_pending(FetchKind::Columns),
            revalidating: self.store.has_forecast() && forecast_phase == RequestPhase::Pending,
            last_error,
            last_updated: self.last_updated,
        }
    }

    fn clamped_index(&self) -> Option<usize> {
        clamp_index(self.selection.index(), self.store.forecast().len())
    }

    fn issue(&mut self, target: FetchTarget) -> FetchRequest {
        let seq = self.tracker.issue(target.kind());
        tracing::debug!("issuing fetch #{seq}: {target:?}");
        FetchRequest { seq, target }
    }
}

fn caption_for(
    view: &ArtifactView<'_>,
    entry: Option<&ForecastArtifact>,
    index: Option<usize>,
    column: &Column,
) -> String {
    match view {
        ArtifactView::Payload(artifact) => artifact
            .caption
            .clone()
            .unwrap_or_else(|| horizon_caption(column, index.unwrap_or(0))),
        ArtifactView::Unavailable(Unavailable::MissingPayload) => {
            match entry.and_then(|a| a.error.as_deref()) {
                Some(err) => format!("No plot: {err}"),
                None => format!(
                    "No plot for {}",
                    horizon_caption(column, index.unwrap_or(0))
                ),
            }
        }
        ArtifactView::Unavailable(Unavailable::Loading) => "Loading forecasts…".to_string(),
        ArtifactView::Unavailable(Unavailable::NoData) => "No forecasts available".to_string(),
        ArtifactView::Unavailable(Unavailable::FetchFailed) => {
            "Forecast service unavailable".to_string()
        }
    }
}

fn horizon_caption(column: &Column, index: usize) -> String {
    let steps = index + 1;
    let plural = if steps == 1 { "" } else { "s" };
    format!("{column} forecast, {steps} step{plural} ahead")
}
