// 🔐 Authentication & sessions
//
// sha256 password digests and uuid session tokens over the users and
// sessions tables. No cookies or middleware here: callers hold the token
// and pass it back for resolution.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// USERS
// ============================================================================

/// Authenticated account. The password hash never leaves this module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_admin: bool,
}

/// sha256 hex digest of the password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Create an account. Duplicate username or email fails on the UNIQUE
/// constraints.
pub fn register_user(
    conn: &Connection,
    username: &str,
    email: &str,
    password: &str,
    full_name: &str,
    phone: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (username, email, password_hash, full_name, phone)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![username, email, hash_password(password), full_name, phone],
    )
    .context("Failed to register user (username or email may already be taken)")?;

    Ok(conn.last_insert_rowid())
}

fn user_by_username(conn: &Connection, username: &str) -> Result<Option<(User, String)>> {
    let row = conn
        .query_row(
            "SELECT id, username, email, full_name, phone, is_admin, password_hash
             FROM users WHERE username = ?1",
            params![username],
            |row| {
                Ok((
                    User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        full_name: row.get(3)?,
                        phone: row.get(4)?,
                        is_admin: row.get(5)?,
                    },
                    row.get::<_, String>(6)?,
                ))
            },
        )
        .optional()
        .context("Failed to query user")?;

    Ok(row)
}

/// Check credentials. On success updates last_login and returns the user;
/// wrong username or password both come back as `Ok(None)`.
pub fn authenticate(conn: &Connection, username: &str, password: &str) -> Result<Option<User>> {
    let Some((user, stored_hash)) = user_by_username(conn, username)? else {
        return Ok(None);
    };

    if stored_hash != hash_password(password) {
        return Ok(None);
    }

    conn.execute(
        "UPDATE users SET last_login = ?1 WHERE id = ?2",
        params![Utc::now().to_rfc3339(), user.id],
    )
    .context("Failed to update last_login")?;

    Ok(Some(user))
}

// ============================================================================
// SESSIONS
// ============================================================================

/// Open a session for a logged-in user; returns the opaque token.
pub fn create_session(conn: &Connection, user_id: i64) -> Result<String> {
    let token = uuid::Uuid::new_v4().to_string();

    conn.execute(
        "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![token, user_id, Utc::now().to_rfc3339()],
    )
    .context("Failed to create session")?;

    Ok(token)
}

/// Resolve a session token back to its user. Unknown or destroyed tokens
/// come back as `Ok(None)`.
pub fn session_user(conn: &Connection, token: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT u.id, u.username, u.email, u.full_name, u.phone, u.is_admin
             FROM sessions s JOIN users u ON s.user_id = u.id
             WHERE s.token = ?1",
            params![token],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    full_name: row.get(3)?,
                    phone: row.get(4)?,
                    is_admin: row.get(5)?,
                })
            },
        )
        .optional()
        .context("Failed to resolve session")?;

    Ok(user)
}

/// Logout: forget the token. Destroying an unknown token is a no-op.
pub fn destroy_session(conn: &Connection, token: &str) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])
        .context("Failed to destroy session")?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_database;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_hash_password_is_sha256_hex() {
        let hash = hash_password("admin123");

        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        // Known digest of "admin123"
        assert_eq!(
            hash,
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
        );
    }

    #[test]
    fn test_register_and_authenticate() {
        let conn = test_db();
        let id = register_user(&conn, "ravi", "ravi@example.com", "s3cret", "Ravi Kumar", None)
            .unwrap();
        assert!(id > 0);

        let user = authenticate(&conn, "ravi", "s3cret").unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.full_name, "Ravi Kumar");
        assert!(!user.is_admin);

        // last_login recorded
        let last_login: Option<String> = conn
            .query_row(
                "SELECT last_login FROM users WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .unwrap();
        assert!(last_login.is_some());
    }

    #[test]
    fn test_wrong_password_and_unknown_user() {
        let conn = test_db();
        register_user(&conn, "ravi", "ravi@example.com", "s3cret", "Ravi Kumar", None).unwrap();

        assert!(authenticate(&conn, "ravi", "wrong").unwrap().is_none());
        assert!(authenticate(&conn, "nobody", "s3cret").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let conn = test_db();
        register_user(&conn, "ravi", "ravi@example.com", "s3cret", "Ravi Kumar", None).unwrap();

        // Same username
        assert!(
            register_user(&conn, "ravi", "other@example.com", "pw", "Other", None).is_err()
        );
        // Same email
        assert!(
            register_user(&conn, "other", "ravi@example.com", "pw", "Other", None).is_err()
        );
    }

    #[test]
    fn test_session_lifecycle() {
        let conn = test_db();
        let id = register_user(
            &conn,
            "priya",
            "priya@example.com",
            "pw",
            "Priya Singh",
            Some("9876543210"),
        )
        .unwrap();

        let token = create_session(&conn, id).unwrap();
        let user = session_user(&conn, &token).unwrap().unwrap();
        assert_eq!(user.username, "priya");
        assert_eq!(user.phone.as_deref(), Some("9876543210"));

        destroy_session(&conn, &token).unwrap();
        assert!(session_user(&conn, &token).unwrap().is_none());

        // Destroying again is harmless
        destroy_session(&conn, &token).unwrap();
    }

    #[test]
    fn test_default_admin_can_log_in() {
        let conn = test_db();
        crate::db::ensure_admin_user(&conn).unwrap();

        let admin = authenticate(&conn, "admin", "admin123").unwrap().unwrap();
        assert!(admin.is_admin);
    }
}
