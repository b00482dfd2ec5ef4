// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group upsert, lookup, and admin-set operations.

use chime_core::ChimeError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Group;

/// Insert a group, or refresh its title when the id is already known.
pub async fn upsert_group(db: &Database, group: &Group) -> Result<(), ChimeError> {
    let group = group.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO groups (group_id, title, created_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (group_id) DO UPDATE SET title = excluded.title",
                params![group.group_id, group.title, chrono::Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a group by external id.
pub async fn get_group(db: &Database, group_id: i64) -> Result<Option<Group>, ChimeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT group_id, title FROM groups WHERE group_id = ?1")?;
            let mut rows = stmt.query_map(params![group_id], |row| {
                Ok(Group {
                    group_id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?;
            rows.next().transpose().map_err(Into::into)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Replace the full admin set of a group in one transaction.
///
/// The previous set is discarded wholesale; admins who left the group
/// simply stop appearing in refreshes.
pub async fn replace_admins(
    db: &Database,
    group_id: i64,
    admin_ids: &[i64],
) -> Result<(), ChimeError> {
    let admin_ids = admin_ids.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM group_admins WHERE group_id = ?1",
                params![group_id],
            )?;
            for user_id in &admin_ids {
                tx.execute(
                    "INSERT OR IGNORE INTO group_admins (group_id, user_id) VALUES (?1, ?2)",
                    params![group_id, user_id],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Admin user ids of a group, ascending.
pub async fn admin_ids(db: &Database, group_id: i64) -> Result<Vec<i64>, ChimeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM group_admins WHERE group_id = ?1 ORDER BY user_id",
            )?;
            let rows = stmt.query_map(params![group_id], |row| row.get(0))?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row?);
            }
            Ok(ids)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::queries::users::upsert_user;
    use tempfile::tempdir;

    async fn open_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("groups.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_user(id: i64) -> User {
        User {
            user_id: id,
            first_name: format!("user{id}"),
            last_name: None,
        }
    }

    #[tokio::test]
    async fn upsert_refreshes_title() {
        let (db, _dir) = open_db().await;

        let group = Group {
            group_id: -100123,
            title: "Old Title".into(),
        };
        upsert_group(&db, &group).await.unwrap();

        let renamed = Group {
            group_id: -100123,
            title: "New Title".into(),
        };
        upsert_group(&db, &renamed).await.unwrap();

        let fetched = get_group(&db, -100123).await.unwrap().unwrap();
        assert_eq!(fetched.title, "New Title");
    }

    #[tokio::test]
    async fn replace_admins_discards_previous_set() {
        let (db, _dir) = open_db().await;

        let group = Group {
            group_id: -1,
            title: "g".into(),
        };
        upsert_group(&db, &group).await.unwrap();
        for id in [10, 20, 30] {
            upsert_user(&db, &make_user(id)).await.unwrap();
        }

        replace_admins(&db, -1, &[10, 20]).await.unwrap();
        assert_eq!(admin_ids(&db, -1).await.unwrap(), vec![10, 20]);

        // A refresh with a different set fully replaces the old one;
        // user 10 is gone even though it still exists as a user.
        replace_admins(&db, -1, &[20, 30]).await.unwrap();
        assert_eq!(admin_ids(&db, -1).await.unwrap(), vec![20, 30]);
    }

    #[tokio::test]
    async fn get_unknown_group_returns_none() {
        let (db, _dir) = open_db().await;
        assert!(get_group(&db, -999).await.unwrap().is_none());
    }
}
