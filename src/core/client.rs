//! HTTP client for the forecast service.
//!
//! Two endpoints matter: `GET /forecast[?column=…]` returns an array of
//! forecast entries and `GET /getColumns` returns an array of column names.
//! Any transport error, non-2xx status, or undecodable body is a
//! [`FetchError`]; individual malformed entries are tolerated and become
//! holes or payload-less artifacts.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use reqwest::Url;
use serde::Deserialize;

use super::error::FetchError;
use super::forecast::{Column, ForecastArtifact, ForecastPoints, ForecastSet};

const FORECAST_ENDPOINT: &str = "forecast";
const COLUMNS_ENDPOINT: &str = "getColumns";

#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: reqwest::Client,
    base: Url,
}

impl ForecastClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut base =
            Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }
        // `Url::join` replaces the last path segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Fetch the forecast set, optionally filtered to `column`.
    pub async fn fetch_forecast(&self, column: Option<&Column>) -> Result<ForecastSet, FetchError> {
        let url = self.endpoint(FORECAST_ENDPOINT)?;
        let mut request = self.http.get(url);
        if let Some(column) = column {
            request = request.query(&[("column", column.as_str())]);
        }
        let body = send(request, FORECAST_ENDPOINT).await?;
        let entries: Vec<serde_json::Value> =
            serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
                endpoint: FORECAST_ENDPOINT,
                source,
            })?;
        Ok(entries.into_iter().enumerate().map(|(i, v)| decode_entry(i, v)).collect())
    }

    pub async fn fetch_columns(&self) -> Result<Vec<Column>, FetchError> {
        let url = self.endpoint(COLUMNS_ENDPOINT)?;
        let body = send(self.http.get(url), COLUMNS_ENDPOINT).await?;
        let names: Vec<String> =
            serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
                endpoint: COLUMNS_ENDPOINT,
                source,
            })?;
        Ok(names.into_iter().map(Column::from).collect())
    }

    fn endpoint(&self, name: &str) -> Result<Url, FetchError> {
        self.base
            .join(name)
            .map_err(|e| FetchError::InvalidUrl(format!("{}{name}: {e}", self.base)))
    }
}

async fn send(request: reqwest::RequestBuilder, endpoint: &'static str) -> Result<Vec<u8>, FetchError> {
    let response = request
        .send()
        .await
        .map_err(|source| FetchError::Transport { endpoint, source })?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            endpoint,
            status: status.as_u16(),
        });
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|source| FetchError::Transport { endpoint, source })?;
    Ok(bytes.to_vec())
}

// ───────────────────────────────────────── wire format ───────

#[derive(Debug, Deserialize)]
struct WireArtifact {
    #[serde(default)]
    plot_base64: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    forecast: Option<WireForecast>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireForecast {
    #[serde(default)]
    dates: Vec<serde_json::Value>,
    #[serde(default)]
    values: Vec<Option<f64>>,
}

fn decode_entry(index: usize, value: serde_json::Value) -> Option<ForecastArtifact> {
    if value.is_null() {
        return None;
    }
    let wire: WireArtifact = match serde_json::from_value(value) {
        Ok(w) => w,
        Err(e) => {
            tracing::warn!("forecast entry {index} unreadable: {e}");
            return None;
        }
    };

    let payload: Option<Arc<[u8]>> = wire.plot_base64.as_deref().and_then(|encoded| {
        match decode_payload(encoded) {
            Ok(bytes) => Some(bytes.into()),
            Err(e) => {
                tracing::warn!("forecast entry {index} has an undecodable plot: {e}");
                None
            }
        }
    });

    let forecast = wire.forecast.unwrap_or_default();
    let points = ForecastPoints {
        dates: forecast.dates.iter().map(date_label).collect(),
        values: forecast
            .values
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect(),
    };

    Some(ForecastArtifact {
        payload,
        caption: wire.caption.filter(|c| !c.trim().is_empty()),
        points,
        error: wire.error,
    })
}

/// Decode a base64 plot, tolerating a `data:` URL prefix.
fn decode_payload(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let raw = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    base64::engine::general_purpose::STANDARD.decode(raw.trim())
}

fn date_label(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        std::net::TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client_for(server: &MockServer) -> ForecastClient {
        ForecastClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn b64(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn rejects_bad_base_url() {
        let err = ForecastClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[test]
    fn base_path_is_kept() {
        let client = ForecastClient::new("http://host:5000/api", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint(FORECAST_ENDPOINT).unwrap().as_str(),
            "http://host:5000/api/forecast"
        );
    }

    #[test]
    fn data_url_prefix_is_stripped() {
        let encoded = format!("data:image/png;base64,{}", b64(b"png"));
        assert_eq!(decode_payload(&encoded).unwrap(), b"png");
    }

    #[tokio::test]
    async fn fetches_unfiltered_forecast() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let body = json!([
            {
                "plot_base64": b64(b"plot-1"),
                "forecast": { "dates": [2023, "2024"], "values": [1.0, 2.5] }
            },
            null,
            { "error": "Column 'X' not found in DataFrame." },
            { "plot_base64": "%%%not base64%%%", "caption": "broken" }
        ]);
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let set = client_for(&server).fetch_forecast(None).await.unwrap();
        assert_eq!(set.len(), 4);

        let first = set[0].as_ref().unwrap();
        assert_eq!(first.payload.as_deref(), Some(&b"plot-1"[..]));
        assert_eq!(first.points.dates, vec!["2023".to_string(), "2024".to_string()]);
        assert_eq!(first.points.values, vec![1.0, 2.5]);

        assert!(set[1].is_none());

        let third = set[2].as_ref().unwrap();
        assert!(!third.has_payload());
        assert!(third.error.as_deref().unwrap().contains("not found"));

        let fourth = set[3].as_ref().unwrap();
        assert!(!fourth.has_payload());
        assert_eq!(fourth.caption.as_deref(), Some("broken"));
    }

    #[tokio::test]
    async fn filters_by_column() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("column", "Space economy"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "plot_base64": b64(b"x") }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let column = Column::from("Space economy");
        let set = client_for(&server).fetch_forecast(Some(&column)).await.unwrap();
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getColumns"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_columns().await.unwrap_err();
        assert!(
            matches!(err, FetchError::Status { endpoint: "getColumns", status: 503 }),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn fetches_columns() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getColumns"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!(["Space economy", "Government"])),
            )
            .mount(&server)
            .await;

        let columns = client_for(&server).fetch_columns().await.unwrap();
        assert_eq!(columns, vec![Column::from("Space economy"), Column::from("Government")]);
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_failure() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"message\": \"hi\"}"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_forecast(None).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { endpoint: "forecast", .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_failure() {
        let client = ForecastClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = client.fetch_columns().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }), "got {err:?}");
    }
}
