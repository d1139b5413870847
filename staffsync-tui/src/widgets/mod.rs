//! Reusable widget components.

pub mod chart;
pub mod detail;
pub mod filter;
pub mod pagination;
pub mod progress;
pub mod status;
pub mod table;

pub use chart::SourceBarChart;
pub use detail::DetailPanel;
pub use filter::{FilterBar, FilterOption};
pub use pagination::Pagination;
pub use progress::ProgressBar;
pub use status::StatusIndicator;
pub use table::EmployeeTable;
