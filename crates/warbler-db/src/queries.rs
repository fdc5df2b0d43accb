use rusqlite::{Connection, Row};

use crate::migrations::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};
use crate::models::{MessageRow, NewUser, UserRow, UserStats, UserUpdate};
use crate::{Database, DbError, Result};

const USER_COLUMNS: &str =
    "id, username, email, password, image_url, header_image_url, bio, location, created_at";

const MESSAGE_SELECT: &str = "SELECT m.id, m.text, m.user_id, u.username, u.image_url, m.created_at
     FROM messages m
     JOIN users u ON u.id = m.user_id";

impl Database {
    // -- Users --

    /// Writes a pending user. A duplicate username or email fails here with
    /// `DbError::Conflict`.
    pub fn insert_user(&self, new: &NewUser) -> Result<UserRow> {
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO users (username, email, password, image_url) VALUES (?1, ?2, ?3, ?4)",
                (
                    &new.username,
                    &new.email,
                    &new.password_hash,
                    non_empty(new.image_url.as_deref()).unwrap_or(DEFAULT_IMAGE_URL),
                ),
            )?;
            let id = tx.last_insert_rowid();
            query_user_by_id(tx, id)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    /// All users, or those whose username contains `search` (case-sensitive).
    pub fn search_users(&self, search: Option<&str>) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| match non_empty(search) {
            Some(q) => query_users(
                conn,
                &format!("SELECT {USER_COLUMNS} FROM users WHERE instr(username, ?1) > 0 ORDER BY id"),
                [q],
            ),
            None => query_users(conn, &format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"), []),
        })
    }

    /// Returns false when no user has this id.
    pub fn update_user(&self, id: i64, update: &UserUpdate) -> Result<bool> {
        self.with_tx(|tx| {
            let changed = tx.execute(
                "UPDATE users
                 SET username = ?1, email = ?2, image_url = ?3, header_image_url = ?4,
                     bio = ?5, location = ?6
                 WHERE id = ?7",
                rusqlite::params![
                    update.username,
                    update.email,
                    non_empty(update.image_url.as_deref()).unwrap_or(DEFAULT_IMAGE_URL),
                    non_empty(update.header_image_url.as_deref()).unwrap_or(DEFAULT_HEADER_IMAGE_URL),
                    non_empty(update.bio.as_deref()),
                    non_empty(update.location.as_deref()),
                    id,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Deletes the user; their messages, follows and likes go with them.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_tx(|tx| Ok(tx.execute("DELETE FROM users WHERE id = ?1", [id])? > 0))
    }

    pub fn user_stats(&self, id: i64) -> Result<UserStats> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM messages WHERE user_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE followed_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE follower_id = ?1),
                    (SELECT COUNT(*) FROM likes WHERE user_id = ?1)",
                [id],
                |row| {
                    Ok(UserStats {
                        messages: row.get(0)?,
                        followers: row.get(1)?,
                        following: row.get(2)?,
                        likes: row.get(3)?,
                    })
                },
            )?)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, user_id: i64, text: &str) -> Result<MessageRow> {
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO messages (text, user_id) VALUES (?1, ?2)",
                rusqlite::params![text, user_id],
            )?;
            let id = tx.last_insert_rowid();
            query_message(tx, id)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    /// A user's messages in insertion order.
    pub fn messages_for_user(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                &format!("{MESSAGE_SELECT} WHERE m.user_id = ?1 ORDER BY m.id"),
                [user_id],
            )
        })
    }

    pub fn delete_message(&self, id: i64) -> Result<bool> {
        self.with_tx(|tx| Ok(tx.execute("DELETE FROM messages WHERE id = ?1", [id])? > 0))
    }

    /// Newest messages written by the user or anyone they follow.
    pub fn timeline(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                &format!(
                    "{MESSAGE_SELECT}
                     WHERE m.user_id = ?1
                        OR m.user_id IN (SELECT followed_id FROM follows WHERE follower_id = ?1)
                     ORDER BY m.created_at DESC, m.id DESC
                     LIMIT ?2"
                ),
                rusqlite::params![user_id, limit],
            )
        })
    }

    // -- Follows --

    /// Returns false if the follow already existed. Self-follow fails with
    /// `DbError::Constraint`.
    pub fn follow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        self.with_tx(|tx| {
            let inserted = tx.execute(
                "INSERT INTO follows (follower_id, followed_id) VALUES (?1, ?2)
                 ON CONFLICT (follower_id, followed_id) DO NOTHING",
                [follower_id, followed_id],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Returns false if there was nothing to remove.
    pub fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        self.with_tx(|tx| {
            let removed = tx.execute(
                "DELETE FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
                [follower_id, followed_id],
            )?;
            Ok(removed > 0)
        })
    }

    pub fn is_following(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.with_conn(|conn| follow_exists(conn, user_id, other_id))
    }

    pub fn is_followed_by(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.with_conn(|conn| follow_exists(conn, other_id, user_id))
    }

    /// Users that `user_id` follows.
    pub fn following(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            query_users(
                conn,
                &format!(
                    "SELECT {USER_COLUMNS} FROM users
                     WHERE id IN (SELECT followed_id FROM follows WHERE follower_id = ?1)
                     ORDER BY id"
                ),
                [user_id],
            )
        })
    }

    /// Users following `user_id`.
    pub fn followers(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            query_users(
                conn,
                &format!(
                    "SELECT {USER_COLUMNS} FROM users
                     WHERE id IN (SELECT follower_id FROM follows WHERE followed_id = ?1)
                     ORDER BY id"
                ),
                [user_id],
            )
        })
    }

    // -- Likes --

    /// Toggle a like: removes it if present, inserts it if not.
    /// Returns true when the message is liked after the call.
    pub fn toggle_like(&self, user_id: i64, message_id: i64) -> Result<bool> {
        self.with_tx(|tx| {
            let removed = tx.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND message_id = ?2",
                [user_id, message_id],
            )?;

            if removed > 0 {
                return Ok(false);
            }

            tx.execute(
                "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
                [user_id, message_id],
            )?;
            Ok(true)
        })
    }

    pub fn is_liking(&self, user_id: i64, message_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT 1 FROM likes WHERE user_id = ?1 AND message_id = ?2",
                    [user_id, message_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some())
        })
    }

    /// Messages `user_id` likes, oldest like first.
    pub fn liked_messages(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                &format!(
                    "{MESSAGE_SELECT}
                     JOIN likes l ON l.message_id = m.id
                     WHERE l.user_id = ?1
                     ORDER BY l.created_at, m.id"
                ),
                [user_id],
            )
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        image_url: row.get(4)?,
        header_image_url: row.get(5)?,
        bio: row.get(6)?,
        location: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        text: row.get(1)?,
        user_id: row.get(2)?,
        author_username: row.get(3)?,
        author_image_url: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"))?;
    stmt.query_row([username], user_from_row).optional()
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
    stmt.query_row([id], user_from_row).optional()
}

fn query_users<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, user_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let mut stmt = conn.prepare(&format!("{MESSAGE_SELECT} WHERE m.id = ?1"))?;
    stmt.query_row([id], message_from_row).optional()
}

fn query_messages<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn follow_exists(conn: &Connection, follower_id: i64, followed_id: i64) -> Result<bool> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
            [follower_id, followed_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
