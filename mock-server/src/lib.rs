use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

pub type Users = Arc<BTreeMap<u32, User>>;

/// Upper bound for `/slow/{ms}` so a typo cannot hang a test run.
const MAX_DELAY_MS: u64 = 10_000;

fn seed_users() -> Users {
    let users = [
        (1, "Emily", "Johnson", "emily.johnson@x.dummyjson.com"),
        (2, "Michael", "Williams", "michael.williams@x.dummyjson.com"),
        (3, "Sophia", "Brown", "sophia.brown@x.dummyjson.com"),
    ];
    Arc::new(
        users
            .into_iter()
            .map(|(id, first, last, email)| {
                (
                    id,
                    User {
                        id,
                        first_name: first.to_string(),
                        last_name: last.to_string(),
                        email: email.to_string(),
                    },
                )
            })
            .collect(),
    )
}

pub fn app() -> Router {
    Router::new()
        .route("/users/{id}", get(get_user))
        .route("/search", get(search))
        .route("/headers", get(echo_headers))
        .route("/echo", post(echo_body))
        .route("/slow/{ms}", get(slow))
        .route("/broken-json", get(broken_json))
        .fallback(not_found)
        .with_state(seed_users())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn get_user(
    State(users): State<Users>,
    Path(id): Path<u32>,
) -> Result<Json<User>, (StatusCode, Json<serde_json::Value>)> {
    users.get(&id).cloned().map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": format!("User with id '{id}' not found") })),
        )
    })
}

/// Echoes the raw query string so callers can check its exact encoding.
async fn search(RawQuery(query): RawQuery) -> String {
    query.unwrap_or_default()
}

async fn echo_headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    Json(
        headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
    )
}

async fn echo_body(headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    debug!("echoing {} bytes as {content_type}", body.len());
    ([(header::CONTENT_TYPE, content_type)], body)
}

async fn slow(Path(ms): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(ms.min(MAX_DELAY_MS))).await;
    "done"
}

async fn broken_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "{not json")
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_camel_case() {
        let users = seed_users();
        let json = serde_json::to_value(&users[&1]).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["firstName"], "Emily");
        assert_eq!(json["lastName"], "Johnson");
    }

    #[test]
    fn user_roundtrips_through_json() {
        let user = seed_users()[&2].clone();
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn seed_has_three_users() {
        let users = seed_users();
        assert_eq!(users.len(), 3);
        assert!(users.contains_key(&3));
        assert!(!users.contains_key(&4));
    }
}
