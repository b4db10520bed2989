use chrono::DateTime;
use chrono_tz::Tz;
use std::marker::PhantomData;

use crate::stats::{SpectralStats, WaveStatistics, ZeroCrossingStats};

/// Name of the end-of-burst timestamp column.
pub const END_TIME: &str = "end_time";

/// Column-oriented per-burst results for one statistics method.
///
/// The column set is fixed by `S::FIELDS` when the table is created; every
/// row appends exactly one value to each column plus one end timestamp,
/// which is stored in the table's zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Columns<S> {
    columns: Vec<Vec<f64>>,
    end_times: Vec<DateTime<Tz>>,
    tz: Tz,
    _stats: PhantomData<S>,
}

impl<S: WaveStatistics> Columns<S> {
    pub fn new(tz: Tz) -> Self {
        Self {
            columns: vec![Vec::new(); S::FIELDS.len()],
            end_times: Vec::new(),
            tz,
            _stats: PhantomData,
        }
    }

    pub fn push(&mut self, stats: &S, end: DateTime<Tz>) {
        for (column, value) in self.columns.iter_mut().zip(stats.values()) {
            column.push(value);
        }
        self.end_times.push(end.with_timezone(&self.tz));
    }

    pub fn field_names(&self) -> &'static [&'static str] {
        S::FIELDS
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        S::FIELDS
            .iter()
            .position(|f| *f == name)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn end_times(&self) -> &[DateTime<Tz>] {
        &self.end_times
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn len(&self) -> usize {
        self.end_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.end_times.is_empty()
    }

    /// Values of row `i` in field order.
    pub fn row(&self, i: usize) -> Option<(Vec<f64>, DateTime<Tz>)> {
        let end = *self.end_times.get(i)?;
        Some((self.columns.iter().map(|c| c[i]).collect(), end))
    }
}

/// Result of a burst analysis: one variant per statistics method.
#[derive(Debug, Clone, PartialEq)]
pub enum BurstTable {
    Spectral(Columns<SpectralStats>),
    ZeroCrossing(Columns<ZeroCrossingStats>),
}

impl BurstTable {
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            BurstTable::Spectral(c) => c.field_names(),
            BurstTable::ZeroCrossing(c) => c.field_names(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        match self {
            BurstTable::Spectral(c) => c.column(name),
            BurstTable::ZeroCrossing(c) => c.column(name),
        }
    }

    pub fn end_times(&self) -> &[DateTime<Tz>] {
        match self {
            BurstTable::Spectral(c) => c.end_times(),
            BurstTable::ZeroCrossing(c) => c.end_times(),
        }
    }

    pub fn timezone(&self) -> Tz {
        match self {
            BurstTable::Spectral(c) => c.timezone(),
            BurstTable::ZeroCrossing(c) => c.timezone(),
        }
    }

    pub fn row(&self, i: usize) -> Option<(Vec<f64>, DateTime<Tz>)> {
        match self {
            BurstTable::Spectral(c) => c.row(i),
            BurstTable::ZeroCrossing(c) => c.row(i),
        }
    }

    pub fn len(&self) -> usize {
        self.end_times().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Columns<SpectralStats>> for BurstTable {
    fn from(columns: Columns<SpectralStats>) -> Self {
        BurstTable::Spectral(columns)
    }
}

impl From<Columns<ZeroCrossingStats>> for BurstTable {
    fn from(columns: Columns<ZeroCrossingStats>) -> Self {
        BurstTable::ZeroCrossing(columns)
    }
}
