//! SQLite-backed task store. Every task query takes the owner id as a
//! mandatory predicate, so an id owned by someone else is indistinguishable
//! from a missing row at this layer already.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tasknest_shared::Task;

/// Fields of a task about to be persisted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub completed: bool,
    pub reminder_time: Option<NaiveDateTime>,
    pub priority: String,
}

/// Tagged reminder update: absent key keeps the stored value, explicit null
/// clears it, a parsed timestamp replaces it.
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderPatch {
    Keep,
    Clear,
    Set(NaiveDateTime),
}

#[derive(Debug, Clone)]
pub struct TaskPatch {
    pub completed: Option<bool>,
    pub priority: Option<String>,
    pub reminder_time: ReminderPatch,
}

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug)]
pub struct TaskStore {
    conn: Mutex<Connection>,
}

const TASK_COLUMNS: &str = "id, title, completed, reminder_time, priority";

impl TaskStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, rusqlite::Error> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;

            CREATE TABLE IF NOT EXISTS users (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              username TEXT NOT NULL UNIQUE,
              password_hash TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              title TEXT NOT NULL,
              completed INTEGER NOT NULL DEFAULT 0,
              reminder_time TEXT,
              priority TEXT NOT NULL DEFAULT 'Medium',
              owner_id INTEGER NOT NULL REFERENCES users(id)
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks(owner_id);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn guard(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn list_tasks(&self, owner_id: i64) -> Result<Vec<Task>, rusqlite::Error> {
        let conn = self.guard();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = ?1"
        ))?;
        let rows = stmt.query_map([owner_id], row_to_task)?;
        rows.collect()
    }

    pub fn insert_task(&self, owner_id: i64, task: NewTask) -> Result<Task, rusqlite::Error> {
        let conn = self.guard();
        conn.execute(
            "INSERT INTO tasks (title, completed, reminder_time, priority, owner_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                task.title,
                task.completed,
                task.reminder_time,
                task.priority,
                owner_id
            ],
        )?;
        Ok(Task {
            id: conn.last_insert_rowid(),
            title: task.title,
            completed: task.completed,
            reminder_time: task.reminder_time,
            priority: task.priority,
        })
    }

    pub fn find_task(&self, owner_id: i64, id: i64) -> Result<Option<Task>, rusqlite::Error> {
        let conn = self.guard();
        conn.query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND owner_id = ?2"),
            params![id, owner_id],
            row_to_task,
        )
        .optional()
    }

    /// Applies only the supplied fields inside one transaction; a missing or
    /// foreign-owned id yields `None` without touching the table.
    pub fn update_task(
        &self,
        owner_id: i64,
        id: i64,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, rusqlite::Error> {
        let mut conn = self.guard();
        let tx = conn.transaction()?;
        let current = tx
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND owner_id = ?2"),
                params![id, owner_id],
                row_to_task,
            )
            .optional()?;
        let Some(mut task) = current else {
            return Ok(None);
        };

        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        if let Some(priority) = &patch.priority {
            task.priority = priority.clone();
        }
        match patch.reminder_time {
            ReminderPatch::Keep => {}
            ReminderPatch::Clear => task.reminder_time = None,
            ReminderPatch::Set(at) => task.reminder_time = Some(at),
        }

        tx.execute(
            "UPDATE tasks SET completed = ?1, reminder_time = ?2, priority = ?3
             WHERE id = ?4 AND owner_id = ?5",
            params![task.completed, task.reminder_time, task.priority, id, owner_id],
        )?;
        tx.commit()?;
        Ok(Some(task))
    }

    pub fn delete_task(&self, owner_id: i64, id: i64) -> Result<bool, rusqlite::Error> {
        let conn = self.guard();
        let removed = conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )?;
        Ok(removed > 0)
    }

    /// Returns `None` when the username is already taken.
    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<i64>, rusqlite::Error> {
        let conn = self.guard();
        match conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
            params![username, password_hash],
        ) {
            Ok(_) => Ok(Some(conn.last_insert_rowid())),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRow>, rusqlite::Error> {
        let conn = self.guard();
        conn.query_row(
            "SELECT id, username, password_hash FROM users WHERE username = ?1",
            [username],
            |row| {
                Ok(UserRow {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                })
            },
        )
        .optional()
    }
}

fn row_to_task(row: &Row<'_>) -> Result<Task, rusqlite::Error> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        completed: row.get(2)?,
        reminder_time: row.get(3)?,
        priority: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_users() -> (TaskStore, i64, i64) {
        let store = TaskStore::open_in_memory().unwrap();
        let alice = store.create_user("alice", "hash-a").unwrap().unwrap();
        let bob = store.create_user("bob", "hash-b").unwrap().unwrap();
        (store, alice, bob)
    }

    fn sample_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            completed: false,
            reminder_time: None,
            priority: "Medium".to_string(),
        }
    }

    #[test]
    fn create_then_find_round_trips() {
        let (store, alice, _) = store_with_users();
        let at = "2024-01-01T10:00:00".parse::<NaiveDateTime>().unwrap();
        let created = store
            .insert_task(
                alice,
                NewTask {
                    title: "Buy milk".to_string(),
                    completed: false,
                    reminder_time: Some(at),
                    priority: "High".to_string(),
                },
            )
            .unwrap();

        let found = store.find_task(alice, created.id).unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.reminder_time, Some(at));

        let listed = store.list_tasks(alice).unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[test]
    fn tasks_are_invisible_to_other_owners() {
        let (store, alice, bob) = store_with_users();
        let task = store.insert_task(alice, sample_task("secret")).unwrap();

        assert!(store.list_tasks(bob).unwrap().is_empty());
        assert!(store.find_task(bob, task.id).unwrap().is_none());
        let patch = TaskPatch {
            completed: Some(true),
            priority: None,
            reminder_time: ReminderPatch::Keep,
        };
        assert!(store.update_task(bob, task.id, &patch).unwrap().is_none());
        assert!(!store.delete_task(bob, task.id).unwrap());

        // Alice's row is untouched by any of the above.
        let unchanged = store.find_task(alice, task.id).unwrap().unwrap();
        assert!(!unchanged.completed);
    }

    #[test]
    fn ids_are_unique_across_owners() {
        let (store, alice, bob) = store_with_users();
        let a = store.insert_task(alice, sample_task("a")).unwrap();
        let b = store.insert_task(bob, sample_task("b")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn update_applies_only_supplied_fields() {
        let (store, alice, _) = store_with_users();
        let at = "2024-01-01T10:00:00".parse::<NaiveDateTime>().unwrap();
        let task = store
            .insert_task(
                alice,
                NewTask {
                    title: "Report".to_string(),
                    completed: false,
                    reminder_time: Some(at),
                    priority: "Medium".to_string(),
                },
            )
            .unwrap();

        let patch = TaskPatch {
            completed: None,
            priority: Some("High".to_string()),
            reminder_time: ReminderPatch::Keep,
        };
        let updated = store.update_task(alice, task.id, &patch).unwrap().unwrap();
        assert_eq!(updated.priority, "High");
        assert_eq!(updated.reminder_time, Some(at));
        assert!(!updated.completed);
        assert_eq!(updated.title, "Report");

        let patch = TaskPatch {
            completed: Some(true),
            priority: None,
            reminder_time: ReminderPatch::Clear,
        };
        let updated = store.update_task(alice, task.id, &patch).unwrap().unwrap();
        assert!(updated.completed);
        assert_eq!(updated.priority, "High");
        assert_eq!(updated.reminder_time, None);
    }

    #[test]
    fn delete_misses_after_first_success() {
        let (store, alice, _) = store_with_users();
        let task = store.insert_task(alice, sample_task("gone")).unwrap();

        assert!(store.delete_task(alice, task.id).unwrap());
        assert!(!store.delete_task(alice, task.id).unwrap());
        assert!(!store.delete_task(alice, task.id).unwrap());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let store = TaskStore::open_in_memory().unwrap();
        assert!(store.create_user("alice", "h1").unwrap().is_some());
        assert!(store.create_user("alice", "h2").unwrap().is_none());
    }
}
