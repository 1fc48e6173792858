//! Validation and payload-to-row transformation between the wire DTOs and
//! the store. The owner id always comes from the resolved identity, never
//! from the request body.

use chrono::NaiveDateTime;
use tasknest_shared::{CreateTaskRequest, Task, UpdateTaskRequest};

use crate::error::ApiError;
use crate::store::{NewTask, ReminderPatch, TaskPatch, TaskStore};

pub const DEFAULT_PRIORITY: &str = "Medium";

pub fn create_task(
    store: &TaskStore,
    owner_id: i64,
    req: CreateTaskRequest,
) -> Result<Task, ApiError> {
    let title = match req.title {
        Some(title) if !title.trim().is_empty() => title,
        _ => return Err(ApiError::Validation("title is required".to_string())),
    };
    let reminder_time = match req.reminder_time {
        Some(raw) => Some(parse_reminder(&raw)?),
        None => None,
    };
    let task = NewTask {
        title,
        completed: req.completed.unwrap_or(false),
        reminder_time,
        priority: req
            .priority
            .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
    };
    Ok(store.insert_task(owner_id, task)?)
}

pub fn list_tasks(store: &TaskStore, owner_id: i64) -> Result<Vec<Task>, ApiError> {
    Ok(store.list_tasks(owner_id)?)
}

pub fn update_task(
    store: &TaskStore,
    owner_id: i64,
    id: i64,
    req: UpdateTaskRequest,
) -> Result<Task, ApiError> {
    let reminder_time = match req.reminder_time {
        None => ReminderPatch::Keep,
        Some(None) => ReminderPatch::Clear,
        Some(Some(raw)) => ReminderPatch::Set(parse_reminder(&raw)?),
    };
    let patch = TaskPatch {
        completed: req.completed,
        priority: req.priority,
        reminder_time,
    };
    store
        .update_task(owner_id, id, &patch)?
        .ok_or(ApiError::NotFound)
}

pub fn delete_task(store: &TaskStore, owner_id: i64, id: i64) -> Result<(), ApiError> {
    if store.delete_task(owner_id, id)? {
        Ok(())
    } else {
        Err(ApiError::NotFound)
    }
}

// Accepts ISO-8601 date-times with or without seconds, matching what the
// reference frontend's datetime-local inputs produce.
fn parse_reminder(raw: &str) -> Result<NaiveDateTime, ApiError> {
    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map_err(|_| ApiError::Validation(format!("invalid reminder_time: {raw}")))
}
