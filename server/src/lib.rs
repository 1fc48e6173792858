pub mod auth;
pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod tasks;

use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

#[get("/")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "TaskNest backend is live!" }))
}

/// Mounts every route; shared between the binary and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(auth::register)
        .service(auth::login)
        .service(tasks::list_tasks)
        .service(tasks::create_task)
        .service(tasks::update_task)
        .service(tasks::delete_task);
}
