//! Demo REST handlers for `/users`.

use std::future::Future;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::app::Handler;
use crate::demo::store::{UserRecord, UserRepository};
use crate::http::{Request, Response};
use crate::routing::{RouteError, Router};

pub type SharedStore = Arc<dyn UserRepository>;

/// Build the demo route table over `store`.
pub fn router(store: SharedStore) -> Result<Router, RouteError> {
    Ok(Router::builder()
        .get("/", read_root)?
        .get("/users", with_store(&store, list_users))?
        .get("/users/{user_id}", with_store(&store, get_user))?
        .post("/users", with_store(&store, create_user))?
        .put("/users/{user_id}", with_store(&store, update_user))?
        .patch("/users/{user_id}", with_store(&store, patch_user))?
        .delete("/users/{user_id}", with_store(&store, delete_user))?
        .build())
}

fn with_store<F, Fut>(store: &SharedStore, f: F) -> impl Handler
where
    F: Fn(SharedStore, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
{
    let store = Arc::clone(store);
    move |req: Request| f(Arc::clone(&store), req)
}

fn detail(status: u16, message: &str) -> anyhow::Result<Response> {
    Ok(Response::json(status, &json!({ "detail": message }))?)
}

fn user_not_found() -> anyhow::Result<Response> {
    detail(404, "user not found")
}

fn invalid_body() -> anyhow::Result<Response> {
    detail(400, "invalid JSON body")
}

/// Non-empty JSON object from the request body.
fn json_fields(req: &Request) -> Option<UserRecord> {
    match req.json() {
        Some(Value::Object(fields)) if !fields.is_empty() => Some(fields.clone()),
        _ => None,
    }
}

async fn read_root(_req: Request) -> anyhow::Result<Response> {
    Ok(Response::json(
        200,
        &json!({ "message": "welcome to the simple REST API!" }),
    )?)
}

/// `GET /users?name=x` filters by case-insensitive substring of the name.
async fn list_users(store: SharedStore, req: Request) -> anyhow::Result<Response> {
    let mut users = store.list();
    if let Some(filter) = req.query("name") {
        let filter = filter.to_lowercase();
        users.retain(|user| {
            user.get("name")
                .and_then(Value::as_str)
                .is_some_and(|name| name.to_lowercase().contains(&filter))
        });
    }
    Ok(Response::json(200, &users)?)
}

async fn get_user(store: SharedStore, req: Request) -> anyhow::Result<Response> {
    let id = req.path_param("user_id").unwrap_or_default();
    match store.get(id) {
        Some(user) => Ok(Response::json(200, &user)?),
        None => user_not_found(),
    }
}

async fn create_user(store: SharedStore, req: Request) -> anyhow::Result<Response> {
    let Some(fields) = json_fields(&req) else {
        return invalid_body();
    };
    let user = store.create(fields);
    tracing::info!(user_id = %user["id"], "Created user");
    Ok(Response::json(201, &user)?)
}

async fn update_user(store: SharedStore, req: Request) -> anyhow::Result<Response> {
    let id = req.path_param("user_id").unwrap_or_default();
    if store.get(id).is_none() {
        return user_not_found();
    }
    let Some(fields) = json_fields(&req) else {
        return invalid_body();
    };
    match store.update(id, fields) {
        Some(user) => Ok(Response::json(200, &user)?),
        None => user_not_found(),
    }
}

async fn patch_user(store: SharedStore, req: Request) -> anyhow::Result<Response> {
    let id = req.path_param("user_id").unwrap_or_default();
    if store.get(id).is_none() {
        return user_not_found();
    }
    let Some(fields) = json_fields(&req) else {
        return invalid_body();
    };
    match store.patch(id, fields) {
        Some(user) => Ok(Response::json(200, &user)?),
        None => user_not_found(),
    }
}

async fn delete_user(store: SharedStore, req: Request) -> anyhow::Result<Response> {
    let id = req.path_param("user_id").unwrap_or_default();
    if store.delete(id) {
        tracing::info!(user_id = %id, "Deleted user");
        Ok(Response::new(204))
    } else {
        user_not_found()
    }
}
