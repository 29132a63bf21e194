//! Last committed forecast data.
//!
//! Both values are held behind `Arc` and swapped whole, so a reader that
//! grabbed a snapshot keeps seeing a consistent value even after a newer
//! fetch commits.

use std::sync::Arc;

use super::forecast::{Column, ForecastSnapshot};

#[derive(Debug, Default)]
pub struct ForecastDataStore {
    forecast: Arc<ForecastSnapshot>,
    columns: Arc<[Column]>,
    /// `true` once any forecast set has been committed.
    forecast_committed: bool,
    columns_committed: bool,
}

impl ForecastDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_forecast_set(&mut self, snapshot: ForecastSnapshot) {
        self.forecast = Arc::new(snapshot);
        self.forecast_committed = true;
    }

    pub fn replace_columns(&mut self, columns: Vec<Column>) {
        self.columns = columns.into();
        self.columns_committed = true;
    }

    #[cfg(test)]
    pub fn current_forecast_set(&self) -> Arc<ForecastSnapshot> {
        Arc::clone(&self.forecast)
    }

    /// Borrowing accessor for the render path (no refcount traffic).
    pub fn forecast(&self) -> &ForecastSnapshot {
        &self.forecast
    }

    /// Shared handle to the committed list; cheap to hand to the view.
    pub fn current_columns(&self) -> Arc<[Column]> {
        Arc::clone(&self.columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_forecast(&self) -> bool {
        self.forecast_committed
    }

    pub fn has_columns(&self) -> bool {
        self.columns_committed
    }
}
