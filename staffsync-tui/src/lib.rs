//! StaffSync TUI library exports.

pub mod api_client;
pub mod cache;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod etl;
pub mod events;
pub mod format;
pub mod keys;
pub mod nav;
pub mod notifications;
pub mod persistence;
pub mod state;
pub mod stats;
pub mod telemetry;
pub mod theme;
pub mod views;
pub mod widgets;
