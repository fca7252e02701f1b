//! Actix-web server for the flow service (feature-gated).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::persistence::FlowStore;
use crate::types::Flow;

// Handle of the running server, for stop/restart. The runtime itself stays
// on the server thread; it is only live while `block_on` runs, so it cannot
// be parked here for later shutdown.
static SERVER_HANDLE: once_cell::sync::Lazy<Arc<Mutex<Option<actix_web::dev::ServerHandle>>>> =
    once_cell::sync::Lazy::new(|| Arc::new(Mutex::new(None)));

#[derive(Deserialize)]
struct DeleteBody {
    #[serde(rename = "flowId")]
    flow_id: String,
}

fn store_error(err: anyhow::Error) -> HttpResponse {
    log::error!("flow store error: {err:#}");
    HttpResponse::InternalServerError().json(json!({ "error": "storage failure" }))
}

async fn list_flows(store: web::Data<FlowStore>) -> impl Responder {
    match store.list() {
        Ok(flows) => HttpResponse::Ok().json(flows),
        Err(err) => store_error(err),
    }
}

async fn create_flow(store: web::Data<FlowStore>, body: web::Json<Flow>) -> impl Responder {
    match store.create(body.into_inner()) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(err) => store_error(err),
    }
}

async fn update_flow(store: web::Data<FlowStore>, body: web::Json<Flow>) -> impl Responder {
    let flow = body.into_inner();
    let Some(flow_id) = flow.flow_id.clone() else {
        return HttpResponse::BadRequest().json(json!({ "error": "flowId required" }));
    };
    match store.update(flow, &flow_id) {
        Ok(Some(saved)) => HttpResponse::Ok().json(saved),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "Not found" })),
        Err(err) => store_error(err),
    }
}

async fn delete_flow(store: web::Data<FlowStore>, body: web::Json<DeleteBody>) -> impl Responder {
    match store.delete(&body.flow_id) {
        Ok(true) => HttpResponse::Ok().finish(),
        Ok(false) => HttpResponse::NotFound().json(json!({ "error": "Not found" })),
        Err(err) => store_error(err),
    }
}

fn configure(cfg: &mut web::ServiceConfig) {
    // Listing is also served without the trailing slash; clients use both
    // forms.
    cfg.service(web::resource("/api/flows").route(web::get().to(list_flows)))
        .service(
            web::resource("/api/flows/")
                .route(web::get().to(list_flows))
                .route(web::post().to(create_flow))
                .route(web::put().to(update_flow))
                .route(web::delete().to(delete_flow)),
        );
}

/// Starts the flow service on its own thread and runtime. Any previously
/// running instance is stopped first.
pub fn start_server(bind: String, store: FlowStore) -> anyhow::Result<()> {
    stop_server();

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(r) => r,
            Err(e) => {
                log::error!("failed to create tokio runtime for flow service: {e}");
                return;
            }
        };

        rt.block_on(async move {
            log::info!("flow service starting on {bind}");
            let data = web::Data::new(store);
            let server = match HttpServer::new(move || {
                App::new().app_data(data.clone()).configure(configure)
            })
            .bind(&bind)
            {
                Ok(s) => s.run(),
                Err(e) => {
                    log::error!("flow service bind failed on {bind}: {e}");
                    return;
                }
            };
            {
                let mut handle = SERVER_HANDLE.lock().unwrap();
                *handle = Some(server.handle());
            }
            let _ = server.await;
        });
        // The server is down; clear the handle in case it exited on its
        // own rather than through stop_server.
        rt.shutdown_timeout(Duration::from_millis(100));
        let mut handle = SERVER_HANDLE.lock().unwrap();
        *handle = None;
    });
    Ok(())
}

/// Stops the flow service if it is running.
pub fn stop_server() {
    let handle = SERVER_HANDLE.lock().unwrap().take();
    if let Some(h) = handle {
        // The stop command is dispatched on the handle's own channel; the
        // returned confirmation future does not need polling.
        let _ = h.stop(false);
    }
}

/// Whether the flow service is currently up.
pub fn is_running() -> bool {
    SERVER_HANDLE.lock().unwrap().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette;
    use crate::persistence::StoreConfig;
    use crate::types::Graph;
    use actix_web::{http::StatusCode, test};
    use uuid::Uuid;

    fn temp_store() -> FlowStore {
        let dir = std::env::temp_dir()
            .join("flow-builder-tests")
            .join(Uuid::new_v4().to_string());
        FlowStore::new(&StoreConfig::at(dir))
    }

    fn sample_flow(name: &str) -> Flow {
        let mut graph = Graph::new();
        graph.add_node(palette::entry_def(), 50.0, 50.0).unwrap();
        graph.to_flow(name.to_string(), None)
    }

    macro_rules! service {
        ($store:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($store))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn post_then_get_returns_the_saved_flow() {
        let app = service!(temp_store());

        let post = test::TestRequest::post()
            .uri("/api/flows/")
            .set_json(sample_flow("roll"))
            .to_request();
        let saved: Flow = test::call_and_read_body_json(&app, post).await;
        assert!(saved.flow_id.is_some());

        let get = test::TestRequest::get().uri("/api/flows").to_request();
        let listed: Vec<Flow> = test::call_and_read_body_json(&app, get).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].flow_id, saved.flow_id);
        assert_eq!(listed[0].name, "roll");
    }

    #[actix_web::test]
    async fn put_updates_an_existing_flow() {
        let store = temp_store();
        let saved = store.create(sample_flow("roll")).unwrap();
        let app = service!(store.clone());

        let mut changed = saved.clone();
        changed.name = "reroll".to_string();
        let put = test::TestRequest::put()
            .uri("/api/flows/")
            .set_json(changed)
            .to_request();
        let resp = test::call_service(&app, put).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let id = saved.flow_id.unwrap();
        assert_eq!(store.load(&id).unwrap().unwrap().name, "reroll");
    }

    #[actix_web::test]
    async fn put_unknown_flow_is_404_and_missing_id_is_400() {
        let app = service!(temp_store());

        let mut unknown = sample_flow("ghost");
        unknown.flow_id = Some(Uuid::new_v4().to_string());
        let put = test::TestRequest::put()
            .uri("/api/flows/")
            .set_json(unknown)
            .to_request();
        let resp = test::call_service(&app, put).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let no_id = test::TestRequest::put()
            .uri("/api/flows/")
            .set_json(sample_flow("nameless"))
            .to_request();
        let resp = test::call_service(&app, no_id).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn delete_removes_the_flow_and_returns_ok() {
        let store = temp_store();
        let saved = store.create(sample_flow("roll")).unwrap();
        let app = service!(store.clone());

        let delete = test::TestRequest::delete()
            .uri("/api/flows/")
            .set_json(json!({ "flowId": saved.flow_id.clone().unwrap() }))
            .to_request();
        let resp = test::call_service(&app, delete).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(store.list().unwrap().is_empty());
    }

    // `use actix_web::test` shadows the built-in `#[test]` attribute here.
    #[::core::prelude::v1::test]
    fn start_and_stop_round_trip_clears_the_handle() {
        start_server("127.0.0.1:0".to_string(), temp_store()).unwrap();
        // The server thread registers its handle once the listener is up.
        for _ in 0..200 {
            if is_running() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(is_running());

        stop_server();
        assert!(!is_running());
    }

    #[actix_web::test]
    async fn delete_unknown_flow_is_404() {
        let app = service!(temp_store());

        let delete = test::TestRequest::delete()
            .uri("/api/flows/")
            .set_json(json!({ "flowId": Uuid::new_v4().to_string() }))
            .to_request();
        let resp = test::call_service(&app, delete).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
