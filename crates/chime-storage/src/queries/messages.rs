// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only message log and the context window query.

use chime_core::ChimeError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{NewMessage, ReplyContext, StoredMessage, User};

/// Append a message row. Rows are never mutated or deleted.
pub async fn insert_message(db: &Database, msg: &NewMessage) -> Result<(), ChimeError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages
                     (message_id, group_id, user_id, text, reply_to_message_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    msg.message_id,
                    msg.group_id,
                    msg.user_id,
                    msg.text,
                    msg.reply_to_message_id,
                    chrono::Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The `limit` most recent messages of a group, most-recent-first.
///
/// Senders are joined in, and the reply target (when present) is
/// resolved exactly one level deep via a self-join on the external
/// message id. Deeper chains are deliberately not walked.
pub async fn recent_messages(
    db: &Database,
    group_id: i64,
    limit: i64,
) -> Result<Vec<StoredMessage>, ChimeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT m.message_id, m.text,
                        u.user_id, u.first_name, u.last_name,
                        r.text, ru.user_id, ru.first_name, ru.last_name
                 FROM messages m
                 LEFT JOIN users u ON u.user_id = m.user_id
                 LEFT JOIN messages r
                     ON r.group_id = m.group_id
                    AND r.message_id = m.reply_to_message_id
                 LEFT JOIN users ru ON ru.user_id = r.user_id
                 WHERE m.group_id = ?1
                 ORDER BY m.id DESC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![group_id, limit], |row| {
                let sender = match row.get::<_, Option<i64>>(2)? {
                    Some(user_id) => Some(User {
                        user_id,
                        first_name: row.get(3)?,
                        last_name: row.get(4)?,
                    }),
                    None => None,
                };
                let reply = match row.get::<_, Option<String>>(5)? {
                    Some(text) => {
                        let reply_sender = match row.get::<_, Option<i64>>(6)? {
                            Some(user_id) => Some(User {
                                user_id,
                                first_name: row.get(7)?,
                                last_name: row.get(8)?,
                            }),
                            None => None,
                        };
                        Some(ReplyContext {
                            sender: reply_sender,
                            text,
                        })
                    }
                    None => None,
                };
                Ok(StoredMessage {
                    message_id: row.get(0)?,
                    text: row.get(1)?,
                    sender,
                    reply,
                })
            })?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
