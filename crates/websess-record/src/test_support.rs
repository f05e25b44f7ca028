//! SQLite-backed user table for binding tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::Value;
use websess_core::{Error, Result, UserId};

use crate::repository::{serialized_attribute, Record, RecordRepository};

pub const STATUS_ACTIVE: i64 = 1;
pub const STATUS_INACTIVE: i64 = 0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub status: i64,
}

impl Record for User {
    fn primary_key(&self) -> UserId {
        UserId::from(self.id)
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        serialized_attribute(self, name)
    }
}

/// User repository over an in-memory database; criteria are SQL conditions.
pub struct UserRepository {
    conn: Mutex<Connection>,
    lookups: AtomicUsize,
    failing: AtomicBool,
}

impl UserRepository {
    /// In-memory database with one active and one inactive user.
    pub fn seeded() -> Self {
        let conn = Connection::open_in_memory().expect("open in-memory database");
        conn.execute_batch(
            "CREATE TABLE user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                email TEXT NOT NULL,
                status INTEGER NOT NULL
            );",
        )
        .expect("create user table");

        for (username, status) in [("active-user", STATUS_ACTIVE), ("inactive-user", STATUS_INACTIVE)] {
            conn.execute(
                "INSERT INTO user (username, email, status) VALUES (?1, ?2, ?3)",
                params![username, format!("{}@example.test", username), status],
            )
            .expect("seed user");
        }

        Self {
            conn: Mutex::new(conn),
            lookups: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Number of `find_by_id` calls so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Make subsequent lookups fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Fetch a user directly, without counting it as a lookup.
    pub fn find(&self, id: i64) -> Option<User> {
        self.query(&UserId::from(id), "").expect("query user")
    }

    fn query(&self, id: &UserId, criteria: &str) -> Result<Option<User>> {
        let Ok(pk) = id.as_str().parse::<i64>() else {
            return Ok(None);
        };
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;

        let mut sql = "SELECT id, username, email, status FROM user WHERE id = ?1".to_string();
        if !criteria.trim().is_empty() {
            sql.push_str(&format!(" AND ({})", criteria));
        }

        conn.query_row(&sql, params![pk], |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                status: row.get(3)?,
            })
        })
        .optional()
        .map_err(|e| Error::repository(e.to_string()))
    }
}

impl RecordRepository for UserRepository {
    type Record = User;
    type Criteria = String;

    fn find_by_id(&self, id: &UserId, criteria: &String) -> Result<Option<User>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::repository("database unavailable"));
        }
        self.query(id, criteria)
    }
}
