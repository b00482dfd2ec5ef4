// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `MessageStore` trait.

use async_trait::async_trait;

use chime_core::types::{
    Group, Instruction, InstructionDefaults, NewMessage, StoredMessage, User,
};
use chime_core::{ChimeError, MessageStore};

use crate::database::Database;
use crate::queries;

/// SQLite-backed message store.
///
/// Wraps a [`Database`] handle and delegates all operations to the typed
/// query modules.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the store at `path`, creating the database and running
    /// migrations as needed.
    pub async fn open(path: &str) -> Result<Self, ChimeError> {
        let db = Database::open(path).await?;
        Ok(Self { db })
    }

    /// Access the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoint and close the underlying database.
    pub async fn close(&self) -> Result<(), ChimeError> {
        self.db.close().await
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn upsert_user(&self, user: &User) -> Result<(), ChimeError> {
        queries::users::upsert_user(&self.db, user).await
    }

    async fn upsert_group(&self, group: &Group) -> Result<(), ChimeError> {
        queries::groups::upsert_group(&self.db, group).await
    }

    async fn get_group(&self, group_id: i64) -> Result<Option<Group>, ChimeError> {
        queries::groups::get_group(&self.db, group_id).await
    }

    async fn replace_admins(&self, group_id: i64, admin_ids: &[i64]) -> Result<(), ChimeError> {
        queries::groups::replace_admins(&self.db, group_id, admin_ids).await
    }

    async fn ensure_instruction(
        &self,
        group_id: i64,
        defaults: &InstructionDefaults,
    ) -> Result<Instruction, ChimeError> {
        queries::instructions::ensure_instruction(&self.db, group_id, defaults).await
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<(), ChimeError> {
        queries::messages::insert_message(&self.db, message).await
    }

    async fn recent_messages(
        &self,
        group_id: i64,
        limit: i64,
    ) -> Result<Vec<StoredMessage>, ChimeError> {
        queries::messages::recent_messages(&self.db, group_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn full_group_lifecycle_through_store() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let store = SqliteStore::open(db_path.to_str().unwrap()).await.unwrap();

        let alice = User {
            user_id: 10,
            first_name: "Alice".into(),
            last_name: None,
        };
        let group = Group {
            group_id: -200,
            title: "Lifecycle".into(),
        };

        store.upsert_user(&alice).await.unwrap();
        store.upsert_group(&group).await.unwrap();
        store.replace_admins(-200, &[10]).await.unwrap();

        let instruction = store
            .ensure_instruction(-200, &InstructionDefaults::default())
            .await
            .unwrap();
        assert_eq!(instruction.trigger_count, 10);

        store
            .insert_message(&NewMessage {
                message_id: 1,
                group_id: Some(-200),
                user_id: Some(10),
                text: "hello".into(),
                reply_to_message_id: None,
            })
            .await
            .unwrap();

        let recent = store.recent_messages(-200, 10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].text, "hello");
        assert_eq!(recent[0].sender.as_ref().unwrap().user_id, 10);

        assert_eq!(
            store.get_group(-200).await.unwrap().unwrap().title,
            "Lifecycle"
        );

        store.close().await.unwrap();
    }
}
