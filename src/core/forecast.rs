//! Forecast data model shared by the store, the client, and the controller.

use std::fmt;
use std::sync::Arc;

/// A named data series, as reported by the forecast service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column(String);

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Column {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Column {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Forecast points that accompany a plot (one per step ahead).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastPoints {
    pub dates: Vec<String>,
    pub values: Vec<f64>,
}

impl ForecastPoints {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pairs of `(date label, value)`.  Missing date labels show as `-`.
    pub fn rows(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().enumerate().map(|(i, v)| {
            let date = self.dates.get(i).map(String::as_str).unwrap_or("-");
            (date, *v)
        })
    }
}

/// One server-produced forecast result.
///
/// The payload is the encoded image (PNG on the wire) and is opaque to the
/// core; only the view decodes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastArtifact {
    pub payload: Option<Arc<[u8]>>,
    pub caption: Option<String>,
    pub points: ForecastPoints,
    /// Error text reported by the service for this entry.
    pub error: Option<String>,
}

impl ForecastArtifact {
    pub fn with_payload(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            payload: Some(bytes.into()),
            ..Self::default()
        }
    }

    /// `true` when the artifact carries something that can be drawn.
    pub fn has_payload(&self) -> bool {
        self.payload.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Ordered artifacts for one column.  `None` entries are holes the server
/// could not fill.
pub type ForecastSet = Vec<Option<ForecastArtifact>>;

/// A committed forecast set together with where it came from.
#[derive(Debug, Clone, Default)]
pub struct ForecastSnapshot {
    /// Column the set was requested for; `None` means the service default.
    pub column: Option<Column>,
    /// Sequence number of the request that produced this snapshot
    /// (`0` for the empty startup snapshot).
    pub revision: u64,
    pub artifacts: ForecastSet,
}

impl ForecastSnapshot {
    pub fn new(column: Option<Column>, revision: u64, artifacts: ForecastSet) -> Self {
        Self {
            column,
            revision,
            artifacts,
        }
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Bounds-checked lookup.  Holes and out-of-range indices both yield `None`.
    pub fn get(&self, index: usize) -> Option<&ForecastArtifact> {
        self.artifacts.get(index).and_then(Option::as_ref)
    }
}

/// Clamp a raw slider value into `[0, len - 1]`.
///
/// Returns `None` when there is nothing to index into.
pub fn clamp_index(raw: i64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if raw <= 0 {
        return Some(0);
    }
    let last = len - 1;
    Some(usize::try_from(raw).map_or(last, |r| r.min(last)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_on_empty_set_is_none() {
        assert_eq!(clamp_index(0, 0), None);
        assert_eq!(clamp_index(1, 0), None);
        assert_eq!(clamp_index(-3, 0), None);
    }

    #[test]
    fn clamp_bounds_every_input() {
        for len in 1..8usize {
            for raw in [-100, -1, 0, 1, 3, 7, 12, 1_000] {
                let idx = clamp_index(raw, len).expect("non-empty set");
                assert!(idx < len, "raw={raw} len={len} idx={idx}");
            }
        }
    }

    #[test]
    fn clamp_extremes() {
        assert_eq!(clamp_index(i64::MIN, 5), Some(0));
        assert_eq!(clamp_index(i64::MAX, 5), Some(4));
        assert_eq!(clamp_index(12, 5), Some(4));
        assert_eq!(clamp_index(2, 5), Some(2));
    }

    #[test]
    fn snapshot_get_skips_holes() {
        let snap = ForecastSnapshot::new(
            None,
            1,
            vec![Some(ForecastArtifact::with_payload(vec![1u8])), None],
        );
        assert!(snap.get(0).is_some());
        assert!(snap.get(1).is_none());
        assert!(snap.get(2).is_none());
    }

    #[test]
    fn empty_payload_is_not_drawable() {
        let art = ForecastArtifact::with_payload(Vec::<u8>::new());
        assert!(!art.has_payload());
        assert!(!ForecastArtifact::default().has_payload());
    }

    #[test]
    fn points_rows_pad_missing_dates() {
        let points = ForecastPoints {
            dates: vec!["2024".into()],
            values: vec![1.5, 2.5],
        };
        let rows: Vec<_> = points.rows().collect();
        assert_eq!(rows, vec![("2024", 1.5), ("-", 2.5)]);
    }
}
