// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User upsert and lookup operations.

use chime_core::ChimeError;
use rusqlite::params;

use crate::database::Database;
use crate::models::User;

/// Insert a user, or refresh the name fields when the id is already known.
pub async fn upsert_user(db: &Database, user: &User) -> Result<(), ChimeError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, first_name, last_name, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (user_id) DO UPDATE SET
                     first_name = excluded.first_name,
                     last_name = excluded.last_name",
                params![
                    user.user_id,
                    user.first_name,
                    user.last_name,
                    chrono::Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a user by external id.
pub async fn get_user(db: &Database, user_id: i64) -> Result<Option<User>, ChimeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT user_id, first_name, last_name FROM users WHERE user_id = ?1")?;
            let mut rows = stmt.query_map(params![user_id], |row| {
                Ok(User {
                    user_id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                })
            })?;
            rows.next().transpose().map_err(Into::into)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
