use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use tasknest_shared::{CreateTaskRequest, UpdateTaskRequest};

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::service;
use crate::store::TaskStore;

#[get("/tasks")]
pub async fn list_tasks(
    user: AuthedUser,
    store: web::Data<TaskStore>,
) -> Result<HttpResponse, ApiError> {
    let tasks = service::list_tasks(&store, user.id)?;
    Ok(HttpResponse::Ok().json(tasks))
}

#[post("/tasks")]
pub async fn create_task(
    user: AuthedUser,
    store: web::Data<TaskStore>,
    body: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let task = service::create_task(&store, user.id, body.into_inner())?;
    Ok(HttpResponse::Created().json(task))
}

#[put("/tasks/{id}")]
pub async fn update_task(
    user: AuthedUser,
    store: web::Data<TaskStore>,
    path: web::Path<i64>,
    body: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let task = service::update_task(&store, user.id, path.into_inner(), body.into_inner())?;
    Ok(HttpResponse::Ok().json(task))
}

#[delete("/tasks/{id}")]
pub async fn delete_task(
    user: AuthedUser,
    store: web::Data<TaskStore>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    service::delete_task(&store, user.id, path.into_inner())?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted" })))
}
