//! Shared fixtures: a scripted in-memory transport and JSON builders.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agri_core::{HttpRequest, HttpTransport, Method, TransportError, TransportResult};
use async_trait::async_trait;
use dashboard_lib::cache::QueryClient;
use dashboard_lib::config::{CacheConfig, ReferenceSource};
use dashboard_lib::queries::Queries;
use serde_json::{json, Value};

/// Replies from a per-route script. Each call consumes the head of the script
/// until one reply is left, which then repeats. Unknown routes answer 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Vec<TransportResult<Value>>>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Mutex<Option<Duration>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Appends a reply to the route's script.
    pub fn respond(&self, method: Method, path: &str, reply: TransportResult<Value>) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push(reply);
    }

    /// Replaces the route's script with a single repeating reply.
    pub fn replace(&self, method: Method, path: &str, reply: TransportResult<Value>) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), vec![reply]);
    }

    /// Every reply is held back for `delay` of (tokio) time.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn request(&self, request: HttpRequest) -> TransportResult<Value> {
        self.requests.lock().unwrap().push(request.clone());
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&(request.method, request.path.clone())) {
            Some(script) if script.len() > 1 => script.remove(0),
            Some(script) if !script.is_empty() => script[0].clone(),
            _ => Err(TransportError::Status {
                status: 404,
                body: format!("no route for {} {}", request.method, request.path),
            }),
        }
    }
}

//=========================================================================================
// Wiring
//=========================================================================================

pub fn test_cache_config() -> CacheConfig {
    CacheConfig {
        retry_attempts: 2,
        retry_base_delay: Duration::from_millis(100),
        retry_max_delay: Duration::from_secs(1),
        gc_time: Duration::from_secs(60),
    }
}

pub fn setup(transport: Arc<MockTransport>) -> (QueryClient, Queries) {
    let client = QueryClient::new(test_cache_config());
    let queries = Queries::new(client.clone(), transport, ReferenceSource::Static);
    (client, queries)
}

//=========================================================================================
// JSON Fixtures
//=========================================================================================

pub const SEASONS: &str = "/api/v1/seasons";
pub const TASKS: &str = "/api/v1/tasks";
pub const REPORTS: &str = "/api/v1/reports";

pub fn envelope(result: Value) -> Value {
    json!({"code": 200, "result": result, "message": "OK"})
}

pub fn rejected(code: i64, message: &str) -> Value {
    json!({"code": code, "result": null, "message": message})
}

pub fn season(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "seasonName": format!("Season {}", id),
        "startDate": "2024-03-01",
        "endDate": "2024-09-30",
        "status": status,
    })
}

pub fn task(id: i64, name: &str, status: &str) -> Value {
    json!({
        "id": id,
        "taskName": name,
        "status": status,
        "seasonId": 2,
        "plotId": 5,
        "startDate": "2024-04-02",
    })
}

pub fn report(id: i64, title: &str, status: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "Aphids on the north rows",
        "status": status,
        "plotId": 5,
        "reporterName": "amina",
        "createdAt": "2024-04-02T08:30:00Z",
    })
}

pub fn page(content: Vec<Value>) -> Value {
    let total = content.len();
    json!({
        "content": content,
        "totalElements": total,
        "totalPages": if total == 0 { 0 } else { 1 },
        "currentPage": 1,
        "pageSize": 20,
    })
}
