/// WebSocket view sessions
///
/// Each connection owns one [`ViewState`]. Client messages mutate it and
/// every accepted message is answered with a fresh snapshot of the table
/// page and the requested charts. Datasets are shared read-only between
/// sessions.
use actix::prelude::*;
use actix_web_actors::ws;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::aggregate::top_n;
use crate::chart::{count_buckets_as_f64, ChartData};
use crate::column::Columns;
use crate::config::DashboardConfig;
use crate::dataset::normalize_payload;
use crate::engine::TabularEngine;
use crate::error::{Error, Result};
use crate::messages::{ClientMessage, ServerMessage};
use crate::resource::Resource;
use crate::session::ViewState;
use crate::value::Record;

/// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
/// How long before lack of client response causes a timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Records of one resource with the engine bound to their columns.
#[derive(Debug, Default)]
pub struct LoadedResource {
    pub records: Vec<Record>,
    pub engine: TabularEngine,
}

impl LoadedResource {
    pub fn new(records: Vec<Record>) -> Self {
        let engine = TabularEngine::new(Columns::infer(&records));
        LoadedResource { records, engine }
    }
}

fn read_dataset(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let payload: serde_json::Value = serde_json::from_str(&text)?;
    Ok(normalize_payload(&payload))
}

/// Shared state for all connections
pub struct AppState {
    pub config: DashboardConfig,
    datasets: Arc<RwLock<HashMap<Resource, Arc<LoadedResource>>>>,
}

impl AppState {
    /// State with every resource present and empty.
    pub fn new(config: DashboardConfig) -> Self {
        let datasets = Resource::ALL
            .iter()
            .map(|r| (*r, Arc::new(LoadedResource::default())))
            .collect();
        Self {
            config,
            datasets: Arc::new(RwLock::new(datasets)),
        }
    }

    /// Loads `<data_dir>/<resource>.json` for every resource. Unreadable
    /// files leave that resource empty.
    pub fn load(config: DashboardConfig) -> Self {
        let state = Self::new(config);
        for resource in Resource::ALL {
            let path = state.config.dataset_path(resource);
            match read_dataset(&path) {
                Ok(records) => {
                    log::info!("loaded {} {} records from {}", records.len(), resource, path.display());
                    state.insert(resource, records);
                }
                Err(e) => log::warn!("{} dataset unavailable, serving empty set: {}", resource, e),
            }
        }
        state
    }

    pub fn insert(&self, resource: Resource, records: Vec<Record>) {
        let mut datasets = self.datasets.write().unwrap_or_else(|e| e.into_inner());
        datasets.insert(resource, Arc::new(LoadedResource::new(records)));
    }

    pub fn get(&self, resource: Resource) -> Arc<LoadedResource> {
        let datasets = self.datasets.read().unwrap_or_else(|e| e.into_inner());
        datasets.get(&resource).cloned().unwrap_or_default()
    }
}

/// View state of one connection, independent of the transport.
#[derive(Debug, Default)]
pub struct ViewSession {
    resource: Option<Resource>,
    view: ViewState,
    charts: Vec<String>,
}

impl ViewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Applies a client message and returns the reply.
    pub fn apply(&mut self, msg: ClientMessage, state: &AppState) -> ServerMessage {
        let msg = match msg {
            ClientMessage::Open {
                resource,
                page_size,
                charts,
            } => {
                self.resource = Some(resource);
                self.view = ViewState::new(page_size.unwrap_or(state.config.page_size));
                self.charts = charts;
                return self.snapshot(state);
            }
            other => other,
        };

        let resource = match self.resource {
            Some(resource) => resource,
            None => return ServerMessage::error("No resource open"),
        };
        let data = state.get(resource);
        let fallback = state.config.fallback_label.as_str();

        match msg {
            ClientMessage::Open { .. } => {}
            ClientMessage::Search { term } => self.view.set_search(&term),
            ClientMessage::ToggleFilter { accessor, value } => self.view.toggle_filter(&accessor, &value),
            ClientMessage::ClearFilter { accessor } => self.view.clear_filter(&accessor),
            ClientMessage::Sort { key } => {
                if data.engine.columns().get(&key).map_or(true, |c| !c.is_sortable()) {
                    return ServerMessage::error(format!("Column '{}' is not sortable", key));
                }
                self.view.request_sort(&key)
            }
            ClientMessage::GoToPage { page } => {
                let total = self.total_items(&data);
                self.view.go_to_page(page, total)
            }
            ClientMessage::NextPage => {
                let total = self.total_items(&data);
                self.view.next_page(total)
            }
            ClientMessage::PreviousPage => {
                let total = self.total_items(&data);
                self.view.previous_page(total)
            }
            ClientMessage::SetPageSize { page_size } => self.view.set_page_size(page_size),
            ClientMessage::Select { field, value } => self.view.set_selection(&field, value.as_deref()),
            ClientMessage::DrillDown { field, value } => {
                self.view.drill(&field, &value, fallback);
            }
            ClientMessage::ClearFilters => self.view.clear_filters(),
        }

        self.snapshot(state)
    }

    fn total_items(&self, data: &LoadedResource) -> usize {
        let base = self.view.chart_records(&data.records);
        data.engine.process(base, self.view.query()).len()
    }

    fn snapshot(&self, state: &AppState) -> ServerMessage {
        let resource = match self.resource {
            Some(resource) => resource,
            None => return ServerMessage::error("No resource open"),
        };
        let data = state.get(resource);
        let page = self.view.page(&data.engine, &data.records);
        let max_entries = state.config.max_chart_entries;

        let charts: BTreeMap<String, ChartData> = self
            .charts
            .iter()
            .map(|field| {
                let buckets = self.view.chart(&data.records, field, &state.config.fallback_label);
                let buckets = count_buckets_as_f64(&top_n(buckets, max_entries.max(1)));
                (field.clone(), ChartData::from_buckets(field, &buckets, max_entries))
            })
            .collect();

        ServerMessage::Snapshot {
            resource,
            rows: page.rows.iter().map(|r| (*r).clone()).collect(),
            columns: data.engine.columns().accessors(),
            current_page: page.current_page,
            page_size: page.page_size,
            total_items: page.total_items,
            total_pages: page.total_pages,
            active_filters: page.active_filters,
            sort: self.view.query().sort.clone(),
            drill_down: self.view.drill_down().active().cloned(),
            charts,
        }
    }
}

/// WebSocket connection actor
pub struct ViewWebSocket {
    hb: Instant,
    state: actix_web::web::Data<AppState>,
    session: ViewSession,
}

impl ViewWebSocket {
    pub fn new(state: actix_web::web::Data<AppState>) -> Self {
        Self {
            hb: Instant::now(),
            state,
            session: ViewSession::new(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                log::info!("websocket client heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn send(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(text) => ctx.text(text),
            Err(e) => log::error!("failed to encode server message: {}", e),
        }
    }
}

impl Actor for ViewWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hb(ctx);
    }
}

impl StreamHandler<std::result::Result<ws::Message, ws::ProtocolError>> for ViewWebSocket {
    fn handle(&mut self, msg: std::result::Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                let reply = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => self.session.apply(client_msg, &self.state),
                    Err(e) => ServerMessage::error(format!("Invalid message format: {}", e)),
                };
                Self::send(ctx, &reply);
            }
            Ok(ws::Message::Binary(_)) => {
                log::warn!("unexpected binary message");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => ctx.stop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{record, FieldValue};

    fn state() -> AppState {
        let state = AppState::new(DashboardConfig::default());
        let sims = (0..12)
            .map(|i| {
                record([
                    ("iccid", FieldValue::from(format!("89{:04}", i))),
                    ("network_type", (if i < 8 { "4G" } else { "NB-IoT" }).into()),
                    ("country_code", FieldValue::Null),
                ])
            })
            .collect();
        state.insert(Resource::M2m, sims);
        state
    }

    fn open(session: &mut ViewSession, state: &AppState) -> ServerMessage {
        session.apply(
            ClientMessage::Open {
                resource: Resource::M2m,
                page_size: Some(5),
                charts: vec!["network_type".to_string(), "country_code".to_string()],
            },
            state,
        )
    }

    #[test]
    fn test_requires_open_resource() {
        let state = state();
        let mut session = ViewSession::new();
        let reply = session.apply(ClientMessage::NextPage, &state);
        assert!(matches!(reply, ServerMessage::Error { .. }));
    }

    #[test]
    fn test_open_snapshot() {
        let state = state();
        let mut session = ViewSession::new();
        match open(&mut session, &state) {
            ServerMessage::Snapshot {
                rows,
                total_items,
                total_pages,
                charts,
                ..
            } => {
                assert_eq!(rows.len(), 5);
                assert_eq!(total_items, 12);
                assert_eq!(total_pages, 3);
                assert_eq!(charts["network_type"].labels, vec!["4G", "NB-IoT"]);
                assert_eq!(charts["country_code"].labels, vec!["Unknown"]);
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_drill_down_and_paging() {
        let state = state();
        let mut session = ViewSession::new();
        open(&mut session, &state);

        session.apply(ClientMessage::NextPage, &state);
        session.apply(ClientMessage::NextPage, &state);
        session.apply(ClientMessage::NextPage, &state);
        assert_eq!(session.view().current_page(), 3);

        let reply = session.apply(
            ClientMessage::DrillDown {
                field: "network_type".to_string(),
                value: "NB-IoT".to_string(),
            },
            &state,
        );
        match reply {
            ServerMessage::Snapshot {
                current_page,
                total_items,
                drill_down,
                ..
            } => {
                assert_eq!(current_page, 1);
                assert_eq!(total_items, 4);
                assert_eq!(drill_down.map(|d| d.value), Some("NB-IoT".to_string()));
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_unknown_sort_column() {
        let state = state();
        let mut session = ViewSession::new();
        open(&mut session, &state);
        let reply = session.apply(ClientMessage::Sort { key: "nope".to_string() }, &state);
        assert!(matches!(reply, ServerMessage::Error { .. }));
    }

    #[test]
    fn test_client_message_format() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "ToggleFilter", "accessor": "network_type", "value": "4G"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::ToggleFilter {
                accessor: "network_type".to_string(),
                value: "4G".to_string()
            }
        );
        let msg: ClientMessage = serde_json::from_str(r#"{"type": "Open", "resource": "pools"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Open { resource: Resource::Pools, page_size: None, .. }));
    }

    #[test]
    fn test_load_missing_files_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("devices.json"), r#"{"items": [{"name": "a"}, {"name": "b"}]}"#).unwrap();
        std::fs::write(dir.path().join("kiwi.json"), "not json").unwrap();
        let config = DashboardConfig {
            data_dir: dir.path().to_path_buf(),
            ..DashboardConfig::default()
        };

        let state = AppState::load(config);
        assert_eq!(state.get(Resource::Devices).records.len(), 2);
        assert!(state.get(Resource::Kiwi).records.is_empty());
        assert!(state.get(Resource::Pools).records.is_empty());
    }
}
