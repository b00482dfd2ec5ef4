// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound sends and the interception hook that persists them.
//!
//! [`BotSender`] is the raw transport; [`RecordedSender`] decorates any
//! sender so that every successful send lands in the message store,
//! attributed to the bot's own identity, with the reply link recorded.
//! Conversation rounds always send through the decorated handle, so the
//! hook fires for every capability equally.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, ReplyParameters};
use tracing::warn;

use chime_core::types::{NewMessage, SentMessage, User};
use chime_core::{ChatSender, ChimeError, MessageStore};

/// Raw Telegram sender over the bot handle.
pub struct BotSender {
    bot: Bot,
}

impl BotSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatSender for BotSender {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<SentMessage, ChimeError> {
        let request = self.bot.send_message(ChatId(chat_id), text);
        let request = match reply_to {
            Some(message_id) => {
                request.reply_parameters(ReplyParameters::new(MessageId(message_id as i32)))
            }
            None => request,
        };

        let sent = request.await.map_err(|e| ChimeError::Channel {
            message: format!("sendMessage to chat {chat_id} failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(SentMessage {
            message_id: sent.id.0 as i64,
        })
    }
}

/// Send-interception decorator: persists every successful outbound send.
///
/// Recording is best-effort; a store failure is logged and never fails
/// the send that already happened.
pub struct RecordedSender<S> {
    inner: S,
    store: Arc<dyn MessageStore>,
    bot_user: User,
}

impl<S: ChatSender> RecordedSender<S> {
    pub fn new(inner: S, store: Arc<dyn MessageStore>, bot_user: User) -> Self {
        Self {
            inner,
            store,
            bot_user,
        }
    }

    async fn record(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
        sent: SentMessage,
    ) -> Result<(), ChimeError> {
        self.store.upsert_user(&self.bot_user).await?;

        // Sends into chats the store has never seen (private chats,
        // unregistered groups) are kept with no group link.
        let group_id = self
            .store
            .get_group(chat_id)
            .await?
            .map(|group| group.group_id);

        self.store
            .insert_message(&NewMessage {
                message_id: sent.message_id,
                group_id,
                user_id: Some(self.bot_user.user_id),
                text: text.to_string(),
                reply_to_message_id: reply_to,
            })
            .await
    }
}

#[async_trait]
impl<S: ChatSender> ChatSender for RecordedSender<S> {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<SentMessage, ChimeError> {
        let sent = self.inner.send_message(chat_id, text, reply_to).await?;

        if let Err(e) = self.record(chat_id, text, reply_to, sent).await {
            warn!(chat_id, error = %e, "failed to persist outbound message");
        }

        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chime_core::types::{Group, Instruction, InstructionDefaults, StoredMessage};
    use std::sync::Mutex;

    struct StubSender {
        next_message_id: i64,
        fail: bool,
    }

    #[async_trait]
    impl ChatSender for StubSender {
        async fn send_message(
            &self,
            _chat_id: i64,
            _text: &str,
            _reply_to: Option<i64>,
        ) -> Result<SentMessage, ChimeError> {
            if self.fail {
                return Err(ChimeError::Channel {
                    message: "network down".into(),
                    source: None,
                });
            }
            Ok(SentMessage {
                message_id: self.next_message_id,
            })
        }
    }

    #[derive(Default)]
    struct StubStore {
        known_groups: Vec<i64>,
        users: Mutex<Vec<User>>,
        messages: Mutex<Vec<NewMessage>>,
    }

    #[async_trait]
    impl MessageStore for StubStore {
        async fn upsert_user(&self, user: &User) -> Result<(), ChimeError> {
            self.users.lock().unwrap().push(user.clone());
            Ok(())
        }

        async fn upsert_group(&self, _group: &Group) -> Result<(), ChimeError> {
            Ok(())
        }

        async fn get_group(&self, group_id: i64) -> Result<Option<Group>, ChimeError> {
            Ok(self.known_groups.contains(&group_id).then(|| Group {
                group_id,
                title: "known".into(),
            }))
        }

        async fn replace_admins(
            &self,
            _group_id: i64,
            _admin_ids: &[i64],
        ) -> Result<(), ChimeError> {
            Ok(())
        }

        async fn ensure_instruction(
            &self,
            group_id: i64,
            defaults: &InstructionDefaults,
        ) -> Result<Instruction, ChimeError> {
            Ok(Instruction {
                group_id,
                model: defaults.model,
                prompt_text: defaults.prompt_text.clone(),
                trigger_count: defaults.trigger_count,
                context_count: defaults.context_count,
            })
        }

        async fn insert_message(&self, message: &NewMessage) -> Result<(), ChimeError> {
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn recent_messages(
            &self,
            _group_id: i64,
            _limit: i64,
        ) -> Result<Vec<StoredMessage>, ChimeError> {
            Ok(Vec::new())
        }
    }

    fn bot_user() -> User {
        User {
            user_id: 999,
            first_name: "chime".into(),
            last_name: None,
        }
    }

    #[tokio::test]
    async fn successful_send_is_persisted_once_with_bot_attribution() {
        let store = Arc::new(StubStore {
            known_groups: vec![-100],
            ..Default::default()
        });
        let sender = RecordedSender::new(
            StubSender {
                next_message_id: 555,
                fail: false,
            },
            store.clone(),
            bot_user(),
        );

        let sent = sender
            .send_message(-100, "threaded reply", Some(42))
            .await
            .unwrap();
        assert_eq!(sent.message_id, 555);

        let messages = store.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_id, 555);
        assert_eq!(messages[0].group_id, Some(-100));
        assert_eq!(messages[0].user_id, Some(999));
        assert_eq!(messages[0].reply_to_message_id, Some(42));
        assert_eq!(messages[0].text, "threaded reply");
    }

    #[tokio::test]
    async fn send_to_unknown_chat_is_persisted_without_group_link() {
        let store = Arc::new(StubStore::default());
        let sender = RecordedSender::new(
            StubSender {
                next_message_id: 7,
                fail: false,
            },
            store.clone(),
            bot_user(),
        );

        sender.send_message(12345, "fresh answer", None).await.unwrap();

        let messages = store.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].group_id, None);
        assert_eq!(messages[0].reply_to_message_id, None);
    }

    #[tokio::test]
    async fn failed_send_is_not_persisted() {
        let store = Arc::new(StubStore::default());
        let sender = RecordedSender::new(
            StubSender {
                next_message_id: 0,
                fail: true,
            },
            store.clone(),
            bot_user(),
        );

        assert!(sender.send_message(-100, "lost", None).await.is_err());
        assert!(store.messages.lock().unwrap().is_empty());
    }
}
