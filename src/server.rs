/// HTTP server: dashboard collections, table queries and view sessions
use actix_web::{middleware, web, App, Error, HttpRequest, HttpResponse, HttpServer};
use actix_web_actors::ws;
use serde::Deserialize;

use crate::config::DashboardConfig;
use crate::engine::TableQuery;
use crate::resource::{PageParams, Resource};
use crate::websocket::{AppState, ViewWebSocket};

/// `limit`/`offset` of a collection request; no limit returns everything
/// from `offset` on.
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    limit: Option<usize>,
    #[serde(default)]
    offset: usize,
}

fn unknown_resource(err: crate::error::Error) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": err.to_string() }))
}

/// WebSocket endpoint handler
async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let resp = ws::start(ViewWebSocket::new(state), &req, stream)?;
    Ok(resp)
}

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "Dashtable server is running"
    }))
}

/// `GET /internal/dashboard/{resource}`: a window of the raw records.
async fn list_records(
    path: web::Path<String>,
    query: web::Query<ListQuery>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let resource: Resource = match path.parse() {
        Ok(resource) => resource,
        Err(e) => return unknown_resource(e),
    };
    let data = state.get(resource);
    let params = PageParams {
        limit: query.limit.unwrap_or(data.records.len()),
        offset: query.offset,
    };
    HttpResponse::Ok().json(params.window(&data.records))
}

/// `POST /internal/dashboard/{resource}/query`: runs the table pipeline.
async fn query_records(
    path: web::Path<String>,
    body: web::Json<TableQuery>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let resource: Resource = match path.parse() {
        Ok(resource) => resource,
        Err(e) => return unknown_resource(e),
    };
    let data = state.get(resource);
    let view = data.engine.run(&data.records, &body);
    HttpResponse::Ok().json(view)
}

/// Registers every route. Expects `web::Data<AppState>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws", web::get().to(ws_index))
        .route("/health", web::get().to(health_check))
        .route("/internal/dashboard/{resource}", web::get().to(list_records))
        .route("/internal/dashboard/{resource}/query", web::post().to(query_records));
}

/// Start the HTTP server with datasets loaded from `config.data_dir`
pub async fn run_server(config: DashboardConfig) -> std::io::Result<()> {
    let (host, port) = config.bind_address();
    let state = web::Data::new(AppState::load(config));

    log::info!("dashtable server listening on http://{}:{}", host, port);
    log::info!("websocket: ws://{}:{}/ws", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            // CORS for development
            .wrap(
                actix_cors::Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortState;
    use crate::value::{record, FieldValue};
    use actix_web::{http::StatusCode, test};
    use serde_json::Value as JsonValue;

    fn state() -> web::Data<AppState> {
        let state = AppState::new(DashboardConfig::default());
        let pools = (0..7)
            .map(|i| {
                record([
                    ("commercialGroup", FieldValue::from(format!("org-{}", i % 3))),
                    ("usage", FieldValue::Int(i * 10)),
                ])
            })
            .collect();
        state.insert(Resource::Pools, pools);
        web::Data::new(state)
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: JsonValue = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }

    #[actix_web::test]
    async fn test_list_window() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/internal/dashboard/pools?limit=5&offset=5")
            .to_request();
        let body: Vec<JsonValue> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 2);

        let req = test::TestRequest::get().uri("/internal/dashboard/pools").to_request();
        let body: Vec<JsonValue> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 7);
    }

    #[actix_web::test]
    async fn test_unknown_resource_is_404() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/internal/dashboard/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/internal/dashboard/nope").to_request();
        let body: JsonValue = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["error"], "unknown resource 'nope'");
    }

    #[actix_web::test]
    async fn test_query_runs_pipeline() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let query = TableQuery::new(2).with_sort(SortState::descending("usage"));
        let req = test::TestRequest::post()
            .uri("/internal/dashboard/pools/query")
            .set_json(&query)
            .to_request();
        let body: JsonValue = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_items"], 7);
        assert_eq!(body["total_pages"], 4);
        assert_eq!(body["rows"][0]["usage"], 60);
    }
}
