//! In-process stub of the RD-OASIS REST API for tests.
//!
//! [`spawn`] serves a small fixed data set on `127.0.0.1` and returns a
//! client pointed at it. Special ids trigger error paths:
//! - `404` on any detail route answers 404;
//! - dataset `500` answers 500 with body `boom`;
//! - task `9` answers a record with an unknown status.

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::warn;

use crate::http::ApiClient;

type Params = Query<HashMap<String, String>>;
type Reply = Result<Json<Value>, StatusCode>;

pub const CREATED: &str = "2021-06-01T12:00:00Z";

/// Id the stub assigns to every newly created record.
pub const NEW_ID: u64 = 77;

/// Start the stub server and return a client for it.
pub async fn spawn() -> std::io::Result<ApiClient> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router()).await {
            warn!(error = %e, "Stub server stopped");
        }
    });

    Ok(ApiClient::new(&format!("http://{addr}/api/")))
}

fn router() -> Router {
    Router::new()
        .route("/api/docker_images/", get(list_images).post(create_image))
        .route(
            "/api/docker_images/:id/",
            get(get_image).put(update_image).delete(delete_record),
        )
        .route("/api/algorithms/", get(list_algorithms).post(create_algorithm))
        .route(
            "/api/algorithms/:id/",
            get(get_algorithm).put(update_record).delete(delete_record),
        )
        .route("/api/algorithms/:id/run/", post(run_algorithm))
        .route("/api/algorithms/:id/tasks/", get(algorithm_tasks))
        .route("/api/algorithm_tasks/", get(list_tasks))
        .route("/api/algorithm_tasks/:id/", get(get_task))
        .route("/api/algorithm_tasks/:id/logs/", get(task_logs))
        .route("/api/algorithm_tasks/:id/input/", get(task_input))
        .route("/api/algorithm_tasks/:id/output/", get(task_output))
        .route("/api/datasets/", get(list_datasets).post(create_dataset))
        .route(
            "/api/datasets/:id/",
            get(get_dataset).put(update_record).delete(delete_record),
        )
        .route("/api/datasets/:id/files/", get(dataset_files).put(update_files))
        .route("/api/datasets/:id/tree/", get(dataset_tree))
}

// Fixtures

pub fn image_json(id: u64) -> Value {
    json!({
        "id": id,
        "created": CREATED,
        "modified": CREATED,
        "name": format!("image-{id}"),
        "image_id": "python:3.10-slim",
        "image_file": null
    })
}

pub fn algorithm_json(id: u64, image: u64) -> Value {
    json!({
        "id": id,
        "created": CREATED,
        "modified": CREATED,
        "name": format!("alg-{id}"),
        "environment": {},
        "command": "echo hi",
        "entrypoint": null,
        "gpu": false,
        "docker_image": image,
        "input_dataset": []
    })
}

pub fn task_json(id: u64, algorithm: u64, status: &str) -> Value {
    json!({
        "id": id,
        "created": CREATED,
        "modified": CREATED,
        "status": status,
        "algorithm": algorithm
    })
}

pub fn file_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "created": CREATED,
        "modified": CREATED,
        "name": name,
        "description": null,
        "status": "success",
        "file": format!("files/{id}"),
        "url": "",
        "download_url": format!("http://testserver/api/rgd/checksum_file/{id}/data"),
        "type": 1,
        "failure_reason": null,
        "checksum": "d41d8cd98f00b204e9800998ecf8427e",
        "validate_checksum": false,
        "last_validation": true,
        "collection": null,
        "created_by": null
    })
}

pub fn dataset_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "created": CREATED,
        "modified": CREATED,
        "name": name,
        "description": null,
        "files": [100, 101],
        "size": 2048
    })
}

fn page(results: Vec<Value>, count: usize, next: Option<String>) -> Json<Value> {
    Json(json!({
        "count": count,
        "next": next,
        "previous": null,
        "results": results
    }))
}

fn param(params: &HashMap<String, String>, key: &str) -> Option<u64> {
    params.get(key).and_then(|v| v.parse().ok())
}

/// The posted body with the server-assigned base fields added.
fn saved(id: u64, mut body: Value) -> Value {
    if let Some(fields) = body.as_object_mut() {
        fields.insert("id".to_string(), json!(id));
        fields.insert("created".to_string(), json!(CREATED));
        fields.insert("modified".to_string(), json!(CREATED));
    }
    body
}

fn found(id: u64) -> Result<(), StatusCode> {
    if id == 404 {
        Err(StatusCode::NOT_FOUND)
    } else {
        Ok(())
    }
}

// Container images

async fn list_images(Query(params): Params) -> Json<Value> {
    const TOTAL: u64 = 3;
    let limit = param(&params, "limit").unwrap_or(TOTAL).min(TOTAL);
    let next = (limit < TOTAL)
        .then(|| format!("http://testserver/api/docker_images/?limit={limit}&offset={limit}"));
    page((1..=limit).map(image_json).collect(), TOTAL as usize, next)
}

async fn get_image(Path(id): Path<u64>) -> Reply {
    found(id)?;
    Ok(Json(image_json(id)))
}

async fn create_image(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["image_id"].is_null() == body["image_file"].is_null() {
        let errors = json!({ "non_field_errors": ["Exactly one of image_id or image_file"] });
        return (StatusCode::BAD_REQUEST, Json(errors));
    }
    (StatusCode::CREATED, Json(saved(NEW_ID, body)))
}

async fn update_image(Path(id): Path<u64>, Json(body): Json<Value>) -> Reply {
    found(id)?;
    Ok(Json(saved(id, body)))
}

// Algorithms

async fn list_algorithms(Query(params): Params) -> Json<Value> {
    let image = param(&params, "docker_image__pk").unwrap_or(1);
    page(vec![algorithm_json(1, image), algorithm_json(2, image)], 2, None)
}

async fn get_algorithm(Path(id): Path<u64>) -> Reply {
    found(id)?;
    Ok(Json(algorithm_json(id, 1)))
}

async fn create_algorithm(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(saved(NEW_ID, body)))
}

async fn run_algorithm(Path(id): Path<u64>, Json(body): Json<Value>) -> Json<Value> {
    let dataset = body["input_dataset"].as_u64().unwrap_or(0);
    Json(task_json(dataset * 100, id, "queued"))
}

async fn algorithm_tasks(Path(id): Path<u64>, Query(params): Params) -> Reply {
    found(id)?;
    let offset = param(&params, "offset").unwrap_or(0);
    let results = vec![
        task_json(offset + 1, id, "success"),
        task_json(offset + 2, id, "running"),
    ];
    Ok(page(results, 2, None))
}

// Tasks

async fn list_tasks(Query(params): Params) -> Json<Value> {
    let offset = param(&params, "offset").unwrap_or(0);
    let algorithm = param(&params, "algorithm__pk").unwrap_or(1);
    if offset == 0 {
        let next = "http://testserver/api/algorithm_tasks/?limit=2&offset=2".to_string();
        let results = vec![task_json(1, algorithm, "success"), task_json(2, algorithm, "running")];
        page(results, 3, Some(next))
    } else {
        page(vec![task_json(3, algorithm, "failed")], 3, None)
    }
}

async fn get_task(Path(id): Path<u64>) -> Reply {
    found(id)?;
    let status = if id == 9 { "exploded" } else { "running" };
    Ok(Json(task_json(id, 1, status)))
}

async fn task_logs(Path(id): Path<u64>, Query(params): Params) -> Result<String, StatusCode> {
    found(id)?;
    let log = match (params.get("head"), params.get("tail")) {
        (Some(n), _) => format!("first {n} lines"),
        (None, Some(n)) => format!("last {n} lines"),
        (None, None) => "full log".to_string(),
    };
    Ok(log)
}

async fn task_input(Path(id): Path<u64>) -> Reply {
    found(id)?;
    Ok(page(vec![file_json(100, &format!("input/{id}.tif"))], 1, None))
}

async fn task_output(Path(id): Path<u64>) -> Reply {
    found(id)?;
    Ok(page(vec![file_json(200, &format!("output/{id}.tif"))], 1, None))
}

// Datasets

async fn list_datasets(Query(params): Params) -> Json<Value> {
    let mut results = vec![dataset_json(1, "inputs")];
    if params.get("include_output_datasets").map(String::as_str) == Some("true") {
        results.push(dataset_json(2, "task-output"));
    }
    let count = results.len();
    page(results, count, None)
}

async fn get_dataset(Path(id): Path<u64>) -> Result<Json<Value>, (StatusCode, &'static str)> {
    match id {
        404 => Err((StatusCode::NOT_FOUND, "")),
        500 => Err((StatusCode::INTERNAL_SERVER_ERROR, "boom")),
        _ => Ok(Json(dataset_json(id, "inputs"))),
    }
}

async fn create_dataset(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut record = saved(NEW_ID, body);
    record["size"] = json!(null);
    (StatusCode::CREATED, Json(record))
}

async fn dataset_files(Path(id): Path<u64>) -> Reply {
    found(id)?;
    let files = vec![file_json(100, "a.txt"), file_json(101, "b/c.txt")];
    Ok(page(files, 2, None))
}

async fn update_files(Path(id): Path<u64>, Json(body): Json<Value>) -> Json<Value> {
    let mut dataset = dataset_json(id, "inputs");
    dataset["files"] = body["insert"].clone();
    Json(dataset)
}

async fn dataset_tree(Path(id): Path<u64>, Query(params): Params) -> Reply {
    found(id)?;
    let tree = match params.get("path_prefix").map(String::as_str) {
        None | Some("") => json!({
            "folders": {
                "a": {
                    "known_size": 300,
                    "num_files": 3,
                    "num_url_files": 1,
                    "created": CREATED,
                    "modified": "2021-06-02T12:00:00Z"
                }
            },
            "files": { "h.txt": file_json(101, "h.txt") }
        }),
        Some("a") => json!({
            "folders": {},
            "files": { "f.txt": file_json(102, "a/f.txt") }
        }),
        Some(_) => json!({ "folders": {}, "files": {} }),
    };
    Ok(Json(tree))
}

// Shared detail handlers

async fn update_record(Path(id): Path<u64>, Json(body): Json<Value>) -> Reply {
    found(id)?;
    let mut record = saved(id, body);
    if record.get("files").is_some() {
        record["size"] = json!(null);
    }
    Ok(Json(record))
}

async fn delete_record(Path(id): Path<u64>) -> StatusCode {
    match found(id) {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(status) => status,
    }
}
