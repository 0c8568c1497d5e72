/// Dashtable - In-Memory Tabular Data Engine for Dashboards
///
/// Takes a fetched record set and the controls of a dashboard table (search
/// box, per-column value filters, sort header, pager) and derives the page of
/// rows to show, plus the grouped counts behind bar and pie charts. Source
/// records are never mutated; every derived view borrows them.

pub mod value;
pub mod column;
pub mod filter;
pub mod sort;
pub mod pagination;
pub mod engine;
pub mod aggregate;
pub mod chart;
pub mod drilldown;
pub mod session;
pub mod dataset;
pub mod sections;
pub mod labels;
pub mod resource;
pub mod config;
pub mod error;

pub use value::{field, field_text, record, FieldValue, Record};
pub use column::{unique_values, ColumnDescriptor, Columns};
pub use filter::{apply_column_filters, search, FilterState};
pub use sort::{compare_values, sort, CompareMode, SortDirection, SortState};
pub use pagination::{paginate, total_pages, Page};
pub use engine::{PageView, TableQuery, TabularEngine, DEFAULT_PAGE_SIZE};
pub use aggregate::{group_count, group_sum, percentage, sum_field, Bucket};
pub use chart::{ChartData, ChartDataset};
pub use drilldown::{DrillDown, DrillSelection};
pub use session::ViewState;
pub use dataset::{Dataset, FetchOutcome, FetchTicket};
pub use sections::{JsonFileStore, MemoryStore, PreferenceStore, SectionLayout, SectionMode, SectionSpec};
pub use resource::{PageParams, Resource};
pub use config::DashboardConfig;
pub use error::{Error, Result};

// HTTP client - only when client feature is enabled
#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "client")]
pub use client::DashboardClient;

// WebSocket server modules - only when server feature is enabled
#[cfg(feature = "server")]
pub mod messages;
#[cfg(feature = "server")]
pub mod websocket;
#[cfg(feature = "server")]
pub mod server;
