//! The validated, ordered training stream.
//!
//! This is the ingestion boundary: raw history (whatever the external
//! loader produced) is validated here, once, and everything downstream
//! works with known-good series in known-good order. Malformed records are
//! rejected at this boundary and never reach the weight model.

use crate::error::EngineError;
use crate::types::{Event, Number, Series};

/// Ordered collection of series, ids strictly increasing.
///
/// Owned by the training driver; scoring components only ever see `&[Series]`
/// slices of it.
#[derive(Debug, Clone, Default)]
pub struct TrainingStream {
    series: Vec<Series>,
}

impl TrainingStream {
    /// Validate ordering and build the stream. Series must already be
    /// individually valid; here we enforce the strictly-increasing id
    /// invariant that makes series ids usable as the system clock.
    pub fn new(series: Vec<Series>) -> Result<Self, EngineError> {
        for pair in series.windows(2) {
            if pair[1].id() <= pair[0].id() {
                return Err(EngineError::OutOfOrderSeries {
                    id: pair[1].id(),
                    prev: pair[0].id(),
                });
            }
        }
        Ok(Self { series })
    }

    /// Full ingestion path for raw history: each row of numbers becomes a
    /// validated event, each group of rows a series. Any malformed row
    /// fails the whole load - partial streams hide upstream bugs.
    pub fn from_raw(
        raw: Vec<(u64, Vec<Vec<Number>>)>,
        domain_size: Number,
        event_size: usize,
    ) -> Result<Self, EngineError> {
        let mut series = Vec::with_capacity(raw.len());
        for (id, rows) in raw {
            let events = rows
                .into_iter()
                .map(|numbers| Event::new(numbers, domain_size, event_size))
                .collect::<Result<Vec<_>, _>>()?;
            series.push(Series::new(id, events)?);
        }
        Self::new(series)
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Series> {
        self.series.iter()
    }

    /// A stream containing only the first `n` series. Used by backtesting
    /// to train on a prefix while holding out the tail.
    pub fn truncated(&self, n: usize) -> Self {
        Self {
            series: self.series[..n.min(self.series.len())].to_vec(),
        }
    }
}
