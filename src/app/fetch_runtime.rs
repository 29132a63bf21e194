//! Background forecast-service jobs to keep the UI loop responsive.
//!
//! Each request runs as its own tokio task and reports back over the
//! channel tagged with its sequence number; ordering is sorted out by the
//! controller, not here.

use tokio::sync::mpsc;

use super::controller::{FetchCompletion, FetchRequest, FetchResult, FetchTarget};
use crate::core::client::ForecastClient;

pub fn spawn_fetch(
    client: &ForecastClient,
    tx: mpsc::UnboundedSender<FetchCompletion>,
    request: FetchRequest,
) {
    let client = client.clone();
    tokio::spawn(async move {
        let FetchRequest { seq, target } = request;
        let t0 = std::time::Instant::now();
        let result = match target {
            FetchTarget::Forecast { column } => {
                let result = client.fetch_forecast(Some(&column)).await;
                FetchResult::Forecast { column, result }
            }
            FetchTarget::Columns => FetchResult::Columns(client.fetch_columns().await),
        };
        tracing::debug!("fetch #{seq} finished in {:.2?}", t0.elapsed());
        // Receiver gone means the app is shutting down.
        let _ = tx.send(FetchCompletion { seq, result });
    });
}

pub fn spawn_all(
    client: &ForecastClient,
    tx: &mpsc::UnboundedSender<FetchCompletion>,
    requests: impl IntoIterator<Item = FetchRequest>,
) {
    for request in requests {
        spawn_fetch(client, tx.clone(), request);
    }
}
