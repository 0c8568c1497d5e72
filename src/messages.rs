/// WebSocket message types for view sessions
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chart::ChartData;
use crate::drilldown::DrillSelection;
use crate::resource::Resource;
use crate::sort::SortState;
use crate::value::Record;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Start a fresh view over a resource
    Open {
        resource: Resource,
        #[serde(default)]
        page_size: Option<usize>,
        /// Fields to chart in every snapshot
        #[serde(default)]
        charts: Vec<String>,
    },

    Search { term: String },

    ToggleFilter { accessor: String, value: String },

    ClearFilter { accessor: String },

    /// Header click
    Sort { key: String },

    GoToPage { page: usize },

    NextPage,

    PreviousPage,

    SetPageSize { page_size: usize },

    /// Dropdown above the charts; `null` clears it
    Select {
        field: String,
        #[serde(default)]
        value: Option<String>,
    },

    /// Chart bucket click
    DrillDown { field: String, value: String },

    ClearFilters,
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// The current page and charts, sent after every accepted message
    Snapshot {
        resource: Resource,
        rows: Vec<Record>,
        columns: Vec<String>,
        current_page: usize,
        page_size: usize,
        total_items: usize,
        total_pages: usize,
        active_filters: usize,
        sort: SortState,
        drill_down: Option<DrillSelection>,
        charts: BTreeMap<String, ChartData>,
    },

    /// Error occurred
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}
