//! StaffSync Core - Entity Types
//!
//! Pure data structures shared by the dashboard client and its test
//! utilities. This crate performs no I/O: requests leave through the
//! [`Transport`] trait, which the client implements over HTTP and the
//! tests implement in memory.

pub mod employee;
pub mod envelope;
pub mod error;
pub mod source;
pub mod stats;
pub mod timefmt;
pub mod transport;

pub use employee::{EmployeeDraft, EmployeeId, SourceEmployee, UnifiedEmployee, ValidateRecord};
pub use envelope::Envelope;
pub use error::{GatewayError, TransportError, ValidationError};
pub use source::{MutableSource, Source};
pub use stats::{GlobalStats, LastSync, SourceCount, SourceCounts, SourceStatsWire};
pub use transport::{ApiRequest, HttpMethod, RawResponse, Transport};

use chrono::{DateTime, NaiveDate, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Calendar date without time-of-day, used for hire dates.
pub type CalendarDate = NaiveDate;
