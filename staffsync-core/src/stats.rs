//! Statistics payloads and per-source count normalization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::source::Source;
use crate::timefmt;
use crate::Timestamp;

/// Aggregates over the unified view (`GET /stats`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    #[serde(rename = "total_employes", default, deserialize_with = "timefmt::count")]
    pub total_employees: u64,
    #[serde(rename = "nb_sources", default, deserialize_with = "timefmt::optional_number")]
    pub source_count: Option<f64>,
    #[serde(rename = "nb_departements", default, deserialize_with = "timefmt::optional_number")]
    pub department_count: Option<f64>,
    #[serde(rename = "salaire_moyen", default, deserialize_with = "timefmt::optional_number")]
    pub average_salary: Option<f64>,
    #[serde(rename = "salaire_min", default, deserialize_with = "timefmt::optional_number")]
    pub min_salary: Option<f64>,
    #[serde(rename = "salaire_max", default, deserialize_with = "timefmt::optional_number")]
    pub max_salary: Option<f64>,
}

/// Last synchronization marker (`GET /etl/last-sync`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LastSync {
    #[serde(rename = "derniere_maj", default, deserialize_with = "timefmt::optional_timestamp")]
    pub last_update: Option<Timestamp>,
    #[serde(default, deserialize_with = "timefmt::optional_number")]
    pub total: Option<f64>,
}

/// One row of the array-shaped per-source payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCount {
    /// Raw source name as sent by the backend, any casing.
    pub source: String,
    #[serde(default, deserialize_with = "timefmt::count")]
    pub count: u64,
}

/// The two shapes the backend uses for per-source counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceStatsWire {
    /// `[{"source": "CSV", "count": 10}, ...]`
    List(Vec<SourceCount>),
    /// `{"csv": 10, "mysql": 4, "postgresql": 7}`
    Map(BTreeMap<String, serde_json::Value>),
}

impl SourceStatsWire {
    /// Rows in wire order, for charting. Map entries come out in key order.
    pub fn rows(&self) -> Vec<SourceCount> {
        match self {
            SourceStatsWire::List(rows) => rows.clone(),
            SourceStatsWire::Map(map) => map
                .iter()
                .map(|(source, value)| SourceCount {
                    source: source.clone(),
                    count: value_as_count(value),
                })
                .collect(),
        }
    }
}

fn value_as_count(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Canonical per-source counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounts {
    pub csv: u64,
    pub mysql: u64,
    pub postgresql: u64,
}

impl SourceCounts {
    /// Normalize either wire shape. Source names match case-insensitively;
    /// unknown names are ignored and repeated names accumulate.
    pub fn from_wire(wire: &SourceStatsWire) -> Self {
        let mut counts = SourceCounts::default();
        for row in wire.rows() {
            if let Ok(source) = row.source.parse::<Source>() {
                let slot = counts.slot_mut(source);
                *slot = slot.saturating_add(row.count);
            }
        }
        counts
    }

    pub fn get(&self, source: Source) -> u64 {
        match source {
            Source::Csv => self.csv,
            Source::Mysql => self.mysql,
            Source::Postgresql => self.postgresql,
        }
    }

    fn slot_mut(&mut self, source: Source) -> &mut u64 {
        match source {
            Source::Csv => &mut self.csv,
            Source::Mysql => &mut self.mysql,
            Source::Postgresql => &mut self.postgresql,
        }
    }

    pub fn total(&self) -> u64 {
        self.csv
            .saturating_add(self.mysql)
            .saturating_add(self.postgresql)
    }
}
