//! In-memory REST peer for exercising the fetcher over real HTTP.
//!
//! Serves a todo resource plus a handful of diagnostic routes that produce
//! the response shapes the client has to resolve: echoed requests, arbitrary
//! status codes, empty and malformed bodies, 204s and slow replies.

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_millis(200);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Todo>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/empty", get(empty))
        .route("/no-content", any(no_content))
        .route("/malformed", get(malformed))
        .route("/slow", get(slow))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("mock server listening on {addr}");
    }
    axum::serve(listener, app()).await
}

/// Bodies are parsed by hand so any `Content-Type` spelling is accepted.
fn parse_body<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, StatusCode> {
    serde_json::from_str(body).map_err(|e| {
        tracing::debug!("rejecting request body: {e}");
        StatusCode::UNPROCESSABLE_ENTITY
    })
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    let todos = db.read().await;
    Json(todos.values().cloned().collect())
}

async fn create_todo(State(db): State<Db>, body: String) -> Result<(StatusCode, Json<Todo>), StatusCode> {
    let input: CreateTodo = parse_body(&body)?;
    let todo = Todo {
        id: Uuid::new_v4(),
        title: input.title,
        completed: input.completed,
    };
    db.write().await.insert(todo.id, todo.clone());
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Todo>, StatusCode> {
    let todos = db.read().await;
    todos.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    body: String,
) -> Result<Json<Todo>, StatusCode> {
    let input: UpdateTodo = parse_body(&body)?;
    let mut todos = db.write().await;
    let todo = todos.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    Ok(Json(todo.clone()))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<StatusCode, StatusCode> {
    let mut todos = db.write().await;
    todos.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}

/// Reflect the request back: method, lower-cased headers, and the body
/// (parsed as JSON when possible, raw text otherwise).
async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Value> {
    let headers: Map<String, Value> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), Value::String(value.to_string())))
        })
        .collect();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    Json(json!({
        "method": method.as_str(),
        "headers": headers,
        "body": body,
    }))
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(json!({ "status": code }))))
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn malformed() -> &'static str {
    "Some kind of problem!"
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({ "slow": true }))
}
