//! Statistics panel and per-source reconciliation.
//!
//! Three independent streams feed the panel: the unified total
//! (`/stats`), the per-source map (`/sources/stats`) and the per-source
//! array used for the chart (`/stats/sources`). Each writes only its own
//! slot, so one failing stream never blanks the others.

use crate::api_client::ApiClient;
use futures_util::future::{join, join3};
use staffsync_core::{
    Envelope, GlobalStats, LastSync, Source, SourceCount, SourceCounts, SourceStatsWire, Transport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatStream {
    Total,
    SourceMap,
    SourceChart,
    LastSync,
}

impl StatStream {
    pub fn label(&self) -> &'static str {
        match self {
            StatStream::Total => "unified total",
            StatStream::SourceMap => "source counts",
            StatStream::SourceChart => "source chart",
            StatStream::LastSync => "last sync",
        }
    }
}

/// Streams that failed during one load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsReport {
    pub failures: Vec<(StatStream, String)>,
}

impl StatsReport {
    pub fn record(&mut self, stream: StatStream, outcome: Result<(), String>) {
        if let Err(message) = outcome {
            tracing::warn!(stream = stream.label(), error = %message, "Stat stream failed");
            self.failures.push((stream, message));
        }
    }

    pub fn merge(mut self, other: StatsReport) -> Self {
        self.failures.extend(other.failures);
        self
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self, stream: StatStream) -> bool {
        self.failures.iter().any(|(s, _)| *s == stream)
    }

    /// One-line summary for a warning message.
    pub fn summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .failures
            .iter()
            .map(|(stream, message)| format!("{}: {}", stream.label(), message))
            .collect();
        Some(format!("Some statistics could not be loaded ({})", parts.join("; ")))
    }
}

// ============================================================================
// CHART
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBar {
    pub label: String,
    pub value: u64,
    /// Known source for colouring; `None` for names the client does not know.
    pub source: Option<Source>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChart {
    pub bars: Vec<ChartBar>,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartState {
    /// Nothing loaded yet, or the backend returned no rows.
    Empty,
    /// The chart stream failed; the message is displayed instead.
    Fallback(String),
    Chart(SourceChart),
}

/// Holds at most one live chart. Installing a chart drops the previous one
/// first.
#[derive(Debug, Clone)]
pub struct ChartSlot {
    state: ChartState,
    generation: u64,
}

impl Default for ChartSlot {
    fn default() -> Self {
        Self {
            state: ChartState::Empty,
            generation: 0,
        }
    }
}

impl ChartSlot {
    pub fn state(&self) -> &ChartState {
        &self.state
    }

    /// Number of charts created so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn chart(&self) -> Option<&SourceChart> {
        match &self.state {
            ChartState::Chart(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn install(&mut self, rows: &[SourceCount]) {
        self.destroy();
        if rows.is_empty() {
            return;
        }
        self.generation += 1;
        let bars = rows
            .iter()
            .map(|row| ChartBar {
                label: row
                    .source
                    .parse::<Source>()
                    .map(|s| s.label().to_string())
                    .unwrap_or_else(|_| row.source.clone()),
                value: row.count,
                source: row.source.parse::<Source>().ok(),
            })
            .collect();
        self.state = ChartState::Chart(SourceChart {
            bars,
            generation: self.generation,
        });
    }

    pub fn fallback(&mut self, message: impl Into<String>) {
        self.destroy();
        self.state = ChartState::Fallback(message.into());
    }

    fn destroy(&mut self) {
        let previous = std::mem::replace(&mut self.state, ChartState::Empty);
        drop(previous);
    }
}

// ============================================================================
// PANEL
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct StatsPanel {
    /// Last successfully loaded aggregates; the total defaults to zero.
    pub global: GlobalStats,
    /// Counts in the unified view, derived from the chart stream.
    pub unified_counts: SourceCounts,
    /// Counts read directly from each source (map endpoint).
    pub source_counts: SourceCounts,
    pub chart: ChartSlot,
    pub last_sync: Option<LastSync>,
}

impl StatsPanel {
    pub fn total_employees(&self) -> u64 {
        self.global.total_employees
    }

    pub fn apply_total(&mut self, envelope: Envelope<GlobalStats>) -> Result<(), String> {
        let stats = envelope.into_result()?;
        self.global = stats;
        Ok(())
    }

    pub fn apply_chart(&mut self, envelope: Envelope<SourceStatsWire>) -> Result<(), String> {
        match envelope.into_result() {
            Ok(wire) => {
                self.unified_counts = SourceCounts::from_wire(&wire);
                self.chart.install(&wire.rows());
                Ok(())
            }
            Err(message) => {
                self.chart.fallback(message.clone());
                Err(message)
            }
        }
    }

    pub fn apply_source_map(&mut self, envelope: Envelope<SourceStatsWire>) -> Result<(), String> {
        let wire = envelope.into_result()?;
        self.source_counts = SourceCounts::from_wire(&wire);
        Ok(())
    }

    pub fn apply_last_sync(&mut self, envelope: Envelope<LastSync>) -> Result<(), String> {
        let sync = envelope.into_result()?;
        if sync.last_update.is_some() {
            self.last_sync = Some(sync);
        }
        Ok(())
    }

    /// Total, per-source map and chart array, fetched concurrently and
    /// applied independently.
    pub async fn refresh_all<T: Transport>(&mut self, api: &ApiClient<T>, bust: bool) -> StatsReport {
        let (total, map, chart) = join3(
            api.get_stats(bust),
            api.get_sources_stats(bust),
            api.get_stats_per_source(bust),
        )
        .await;

        let mut report = StatsReport::default();
        report.record(StatStream::Total, self.apply_total(total));
        report.record(StatStream::SourceMap, self.apply_source_map(map));
        report.record(StatStream::SourceChart, self.apply_chart(chart));
        report
    }

    /// Unified total and chart array, concurrently.
    pub async fn load_unified_stats<T: Transport>(
        &mut self,
        api: &ApiClient<T>,
        bust: bool,
    ) -> StatsReport {
        let (total, chart) = join(api.get_stats(bust), api.get_stats_per_source(bust)).await;

        let mut report = StatsReport::default();
        report.record(StatStream::Total, self.apply_total(total));
        report.record(StatStream::SourceChart, self.apply_chart(chart));
        report
    }

    pub async fn load_source_stats<T: Transport>(
        &mut self,
        api: &ApiClient<T>,
        bust: bool,
    ) -> StatsReport {
        let map = api.get_sources_stats(bust).await;
        let mut report = StatsReport::default();
        report.record(StatStream::SourceMap, self.apply_source_map(map));
        report
    }

    pub async fn load_last_sync<T: Transport>(&mut self, api: &ApiClient<T>) -> StatsReport {
        let sync = api.last_sync().await;
        let mut report = StatsReport::default();
        report.record(StatStream::LastSync, self.apply_last_sync(sync));
        report
    }
}
