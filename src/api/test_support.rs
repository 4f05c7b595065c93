use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::{ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::{AUTHORIZATION, HeaderName};
use actix_web::{App, Error, HttpResponse, HttpServer, test, web};
use chrono::Utc;
use serde_json::{Value, json};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::auth::jwt::{issue_for_test, sign_for_test};
use crate::backend::BackendClient;
use crate::config::Config;
use crate::live::LiveHub;
use crate::live::client::{Command, LiveHandle};
use crate::model::live::Topic;
use crate::routes;
use crate::utils::history_cache::HistoryCache;

pub const SECRET: &str = "test-secret";

/// Backend user id listed in `HR_USER_IDS` for every test app.
pub const HR_USER_ID: &str = "6f1c1c7e-3a0b-4d5e-9a55-7d2f0f3f6a10";

/// Nothing listens on the discard port.
const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Full routing table with a primed-able cache and live handles that have
/// no socket behind them.
pub struct TestApp {
    pub config: Config,
    pub backend: BackendClient,
    pub cache: HistoryCache,
    pub hub: LiveHub,
    pub commands: Vec<UnboundedReceiver<Command>>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_backend(UNREACHABLE)
    }

    pub fn with_backend(backend_url: &str) -> Self {
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some(SECRET.to_string()),
            "BACKEND_URL" => Some(backend_url.to_string()),
            // Live urls stay fixed whatever the REST backend is.
            "BACKEND_WS_URL" => Some("ws://127.0.0.1:9".to_string()),
            "HR_USER_IDS" => Some(HR_USER_ID.to_string()),
            _ => None,
        })
        .unwrap();
        let backend = BackendClient::new(&config.backend_url, Duration::from_secs(2)).unwrap();
        let cache = HistoryCache::new(config.history_limit, config.history_cache_ttl);

        let (handles, commands): (Vec<LiveHandle>, Vec<_>) = Topic::iter()
            .map(|topic| LiveHandle::detached(topic, &format!("{}{}", config.backend_ws_url, topic.path())))
            .unzip();

        Self {
            config,
            backend,
            cache,
            hub: LiveHub::from_handles(handles),
            commands,
        }
    }

    pub fn build(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = Error,
            InitError = (),
        > + use<>,
    > {
        let config = self.config.clone();
        App::new()
            .app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::new(self.backend.clone()))
            .app_data(web::Data::new(self.cache.clone()))
            .app_data(web::Data::new(self.hub.clone()))
            .configure(move |cfg| routes::configure(cfg, config))
    }

    fn peer() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 40_000))
    }

    pub fn get(uri: &str) -> test::TestRequest {
        test::TestRequest::get().uri(uri).peer_addr(Self::peer())
    }

    pub fn post(uri: &str) -> test::TestRequest {
        test::TestRequest::post().uri(uri).peer_addr(Self::peer())
    }
}

/// Authorization header for a user with the given role id.
pub fn bearer(role: u8) -> (HeaderName, String) {
    let token = issue_for_test("42", Some(role), SECRET, 600);
    (AUTHORIZATION, format!("Bearer {token}"))
}

/// Authorization header carrying exactly what the backend's login signs.
pub fn backend_bearer(user_id: &str) -> (HeaderName, String) {
    let exp = Utc::now().timestamp() + 86_400;
    let token = sign_for_test(&json!({"sub": user_id, "exp": exp}), SECRET);
    (AUTHORIZATION, format!("Bearer {token}"))
}

#[derive(Clone, Default)]
struct StubState {
    records: Arc<Mutex<Vec<Value>>>,
    posts: Arc<Mutex<Vec<Value>>>,
    rejection: Arc<Mutex<Option<String>>>,
}

async fn stub_list(state: web::Data<StubState>) -> HttpResponse {
    let records = state.records.lock().unwrap().clone();
    HttpResponse::Ok().json(records)
}

async fn stub_submit(state: web::Data<StubState>, body: web::Json<Value>) -> HttpResponse {
    let body = body.into_inner();
    state.posts.lock().unwrap().push(body.clone());

    if let Some(message) = state.rejection.lock().unwrap().clone() {
        return HttpResponse::BadRequest().json(json!({"status": "error", "message": message}));
    }

    let record = json!({
        "id": Uuid::new_v4(),
        "nama": body["nama"],
        "action": body["action"],
        "client_ip": "127.0.0.1",
        "created_at": Utc::now().to_rfc3339(),
    });
    state.records.lock().unwrap().push(record.clone());
    HttpResponse::Created().json(json!({"status": "ok", "message": "Absensi tercatat", "data": record}))
}

/// In-process stand-in for the backend's `/api/absensi` endpoints.
pub struct StubBackend {
    pub url: String,
    state: StubState,
    handle: ServerHandle,
}

impl StubBackend {
    pub fn start(records: Vec<Value>) -> Self {
        let state = StubState::default();
        *state.records.lock().unwrap() = records;

        let data = web::Data::new(state.clone());
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/api/absensi", web::get().to(stub_list))
                .route("/api/absensi", web::post().to(stub_submit))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    /// Answer every submission with `{"status":"error","message":...}`.
    pub fn reject_with(&self, message: &str) {
        *self.state.rejection.lock().unwrap() = Some(message.to_string());
    }

    /// Bodies received on `POST /api/absensi`, oldest first.
    pub fn posts(&self) -> Vec<Value> {
        self.state.posts.lock().unwrap().clone()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

/// A record as the backend lists it, created `minutes_ago` before now.
pub fn backend_record(name: &str, action: &str, minutes_ago: i64) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "nama": name,
        "action": action,
        "client_ip": null,
        "created_at": (Utc::now() - chrono::Duration::minutes(minutes_ago)).to_rfc3339(),
    })
}
