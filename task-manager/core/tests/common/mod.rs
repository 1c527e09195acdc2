//! An in-process stand-in for the task backend, served with axum on an
//! ephemeral port.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Username/password pairs the stub accepts.
pub const DEMO_USERS: [(&str, &str); 3] = [
    ("admin", "password123"),
    ("testuser", "test123"),
    ("demo", "demo"),
];

type Reply = (StatusCode, Json<Value>);

#[derive(Default)]
pub struct Backend {
    tasks: Mutex<Vec<Value>>,
    next_id: Mutex<u64>,
    put_bodies: Mutex<Vec<Value>>,
    requests: AtomicUsize,
}

impl Backend {
    pub fn tasks(&self) -> Vec<Value> {
        self.tasks.lock().unwrap().clone()
    }

    pub fn last_put_body(&self) -> Option<Value> {
        self.put_bodies.lock().unwrap().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct StubServer {
    pub base_url: String,
    pub backend: Arc<Backend>,
}

pub fn demo_task(id: u64, title: &str, priority: &str, completed: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": format!("{} notes", title),
        "priority": priority,
        "completed": completed,
    })
}

pub fn seed_tasks() -> Vec<Value> {
    vec![
        demo_task(1, "Buy groceries", "high", false),
        demo_task(2, "Read book", "low", true),
    ]
}

pub async fn start(seed: Vec<Value>) -> StubServer {
    let backend = Arc::new(Backend {
        next_id: Mutex::new(seed.len() as u64 + 1),
        tasks: Mutex::new(seed),
        ..Default::default()
    });

    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/items", get(list_items).post(create_item))
        .route("/api/items/{id}", put(update_item).delete(delete_item))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubServer {
        base_url: format!("http://{}", addr),
        backend,
    }
}

/// A base URL nothing is listening on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn authorized(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    DEMO_USERS
        .iter()
        .any(|(username, _)| value == format!("Bearer token-{}", username))
}

fn unauthorized() -> Reply {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"success": false, "message": "Invalid token"})),
    )
}

fn not_found() -> Reply {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"success": false, "message": "Task not found"})),
    )
}

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Reply {
    backend.record_request();
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if DEMO_USERS.contains(&(username, password)) {
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {"user": {"username": username}, "token": format!("token-{}", username)},
                "message": "Login successful",
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Invalid credentials"})),
        )
    }
}

async fn list_items(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Reply {
    backend.record_request();
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "data": {"tasks": backend.tasks()}})),
    )
}

async fn create_item(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    backend.record_request();
    if !authorized(&headers) {
        return unauthorized();
    }
    let title = body["title"].as_str().unwrap_or_default();
    if title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "Title is required"})),
        );
    }
    let mut next_id = backend.next_id.lock().unwrap();
    let task = json!({
        "id": *next_id,
        "title": title,
        "description": body["description"].as_str().unwrap_or_default(),
        "priority": body["priority"].as_str().unwrap_or("medium"),
        "completed": false,
    });
    *next_id += 1;
    backend.tasks.lock().unwrap().push(task.clone());
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "data": {"task": task}, "message": "Task created"})),
    )
}

async fn update_item(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Reply {
    backend.record_request();
    if !authorized(&headers) {
        return unauthorized();
    }
    backend.put_bodies.lock().unwrap().push(body.clone());
    let mut tasks = backend.tasks.lock().unwrap();
    let Some(task) = tasks.iter_mut().find(|task| task["id"] == json!(id)) else {
        return not_found();
    };
    for field in ["title", "description", "priority", "completed"] {
        if let Some(value) = body.get(field) {
            task[field] = value.clone();
        }
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "Task updated"})),
    )
}

async fn delete_item(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Reply {
    backend.record_request();
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut tasks = backend.tasks.lock().unwrap();
    let before = tasks.len();
    tasks.retain(|task| task["id"] != json!(id));
    if tasks.len() == before {
        return not_found();
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "Task deleted"})),
    )
}
