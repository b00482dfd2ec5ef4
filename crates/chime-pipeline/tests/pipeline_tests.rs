// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests over in-memory fakes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use chime_core::types::{
    Group, IncomingMessage, Instruction, InstructionDefaults, NewMessage, ReplyContext,
    SentMessage, StoredMessage, ToolCall, ToolSpec, TranscriptEntry, User,
};
use chime_core::{ChatSender, ChimeError, MessageStore, ModelApi, TriggerCounter};
use chime_pipeline::MessagePipeline;

const BOT_USER_ID: i64 = 999;
const GROUP_ID: i64 = -100;

// --- Fakes ---

#[derive(Default)]
struct FakeStore {
    users: Mutex<HashMap<i64, User>>,
    messages: Mutex<Vec<NewMessage>>,
}

#[async_trait]
impl MessageStore for FakeStore {
    async fn upsert_user(&self, user: &User) -> Result<(), ChimeError> {
        self.users.lock().unwrap().insert(user.user_id, user.clone());
        Ok(())
    }

    async fn upsert_group(&self, _group: &Group) -> Result<(), ChimeError> {
        Ok(())
    }

    async fn get_group(&self, group_id: i64) -> Result<Option<Group>, ChimeError> {
        Ok(Some(Group {
            group_id,
            title: "fake".into(),
        }))
    }

    async fn replace_admins(&self, _group_id: i64, _admin_ids: &[i64]) -> Result<(), ChimeError> {
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
        group_id: i64,
        limit: i64,
    ) -> Result<Vec<StoredMessage>, ChimeError> {
        let users = self.users.lock().unwrap();
        let messages = self.messages.lock().unwrap();
        let in_group: Vec<&NewMessage> = messages
            .iter()
            .filter(|m| m.group_id == Some(group_id))
            .collect();

        // Most-recent-first with one level of reply resolution, the same
        // contract the SQLite store honors.
        let stored = in_group
            .iter()
            .rev()
            .take(limit as usize)
            .map(|m| {
                let reply = m.reply_to_message_id.and_then(|target| {
                    in_group
                        .iter()
                        .find(|r| r.message_id == target)
                        .map(|r| ReplyContext {
                            sender: r.user_id.and_then(|id| users.get(&id).cloned()),
                            text: r.text.clone(),
                        })
                });
                StoredMessage {
                    message_id: m.message_id,
                    text: m.text.clone(),
                    sender: m.user_id.and_then(|id| users.get(&id).cloned()),
                    reply,
                }
            })
            .collect();
        Ok(stored)
    }
}

#[derive(Default)]
struct FakeCounter {
    counts: Mutex<HashMap<i64, i64>>,
}

#[async_trait]
impl TriggerCounter for FakeCounter {
    async fn increment(&self, group_id: i64) -> Result<i64, ChimeError> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(group_id).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn decrement_by(&self, group_id: i64, amount: i64) -> Result<i64, ChimeError> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(group_id).or_insert(0);
        *count -= amount;
        Ok(*count)
    }
}

impl FakeCounter {
    fn value(&self, group_id: i64) -> i64 {
        *self.counts.lock().unwrap().get(&group_id).unwrap_or(&0)
    }
}

/// Counter whose backend is unreachable.
struct DownCounter;

#[async_trait]
impl TriggerCounter for DownCounter {
    async fn increment(&self, _group_id: i64) -> Result<i64, ChimeError> {
        Err(ChimeError::Cache {
            message: "connection refused".into(),
            source: None,
        })
    }

    async fn decrement_by(&self, _group_id: i64, _amount: i64) -> Result<i64, ChimeError> {
        Err(ChimeError::Cache {
            message: "connection refused".into(),
            source: None,
        })
    }
}

/// Scripted model: returns the same tool calls on every round and
/// records each transcript it was handed.
#[derive(Default)]
struct ScriptedModel {
    calls: Vec<ToolCall>,
    transcripts: Mutex<Vec<Vec<TranscriptEntry>>>,
}

#[async_trait]
impl ModelApi for ScriptedModel {
    async fn complete(
        &self,
        _model: &str,
        transcript: &[TranscriptEntry],
        _tools: &[ToolSpec],
    ) -> Result<Vec<ToolCall>, ChimeError> {
        self.transcripts.lock().unwrap().push(transcript.to_vec());
        Ok(self.calls.clone())
    }
}

/// Model whose endpoint always errors.
struct DownModel {
    attempts: AtomicUsize,
}

#[async_trait]
impl ModelApi for DownModel {
    async fn complete(
        &self,
        _model: &str,
        _transcript: &[TranscriptEntry],
        _tools: &[ToolSpec],
    ) -> Result<Vec<ToolCall>, ChimeError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ChimeError::Provider {
            message: "model unavailable".into(),
            source: None,
        })
    }
}

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(i64, String, Option<i64>)>>,
}

#[async_trait]
impl ChatSender for RecordingSender {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<SentMessage, ChimeError> {
        self.sent
            .lock()
            .unwrap()
            .push((chat_id, text.to_string(), reply_to));
        Ok(SentMessage { message_id: 5000 })
    }
}

// --- Helpers ---

fn defaults(trigger_count: i64, context_count: i64) -> InstructionDefaults {
    InstructionDefaults {
        trigger_count,
        context_count,
        ..InstructionDefaults::default()
    }
}

fn incoming(message_id: i64, user_id: i64, text: &str) -> IncomingMessage {
    IncomingMessage {
        message_id,
        text: text.to_string(),
        sender: Some(User {
            user_id,
            first_name: format!("user{user_id}"),
            last_name: None,
        }),
        group: Some(Group {
            group_id: GROUP_ID,
            title: "Test Group".into(),
        }),
        reply_to_message_id: None,
    }
}

struct Harness {
    store: Arc<FakeStore>,
    counter: Arc<FakeCounter>,
    model: Arc<ScriptedModel>,
    sender: Arc<RecordingSender>,
    pipeline: MessagePipeline,
}

fn harness(calls: Vec<ToolCall>, defaults: InstructionDefaults) -> Harness {
    let store = Arc::new(FakeStore::default());
    let counter = Arc::new(FakeCounter::default());
    let model = Arc::new(ScriptedModel {
        calls,
        transcripts: Mutex::new(Vec::new()),
    });
    let sender = Arc::new(RecordingSender::default());
    let pipeline = MessagePipeline::new(
        store.clone(),
        counter.clone(),
        Some(model.clone()),
        defaults,
        BOT_USER_ID,
    );
    Harness {
        store,
        counter,
        model,
        sender,
        pipeline,
    }
}

// --- Tests ---

#[tokio::test]
async fn sequential_messages_fire_once_per_threshold() {
    let h = harness(vec![], defaults(3, 10));

    for i in 1..=7 {
        h.pipeline
            .handle_message(&incoming(i, 10, &format!("msg {i}")), h.sender.clone())
            .await
            .unwrap();
    }

    // Seven messages with a threshold of three fire at 3 and 6.
    assert_eq!(h.model.transcripts.lock().unwrap().len(), 2);
    // Counter carries the overflow: 7 mod 3.
    assert_eq!(h.counter.value(GROUP_ID), 1);
    // Every message was persisted regardless of triggering.
    assert_eq!(h.store.messages.lock().unwrap().len(), 7);
}

#[tokio::test]
async fn zero_tool_calls_is_a_silent_no_op() {
    let h = harness(vec![], defaults(1, 10));

    h.pipeline
        .handle_message(&incoming(1, 10, "hello"), h.sender.clone())
        .await
        .unwrap();

    assert_eq!(h.model.transcripts.lock().unwrap().len(), 1);
    assert!(h.sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn transcript_is_system_first_then_window_oldest_first() {
    let h = harness(vec![], defaults(5, 3));

    for i in 1..=5 {
        h.pipeline
            .handle_message(&incoming(i, 10, &format!("msg {i}")), h.sender.clone())
            .await
            .unwrap();
    }

    let transcripts = h.model.transcripts.lock().unwrap();
    assert_eq!(transcripts.len(), 1);
    let transcript = &transcripts[0];

    // Three window entries plus the lone system prompt, which is first.
    assert_eq!(transcript.len(), 4);
    assert_eq!(transcript[0].role, chime_core::types::ChatRole::System);
    assert_eq!(
        transcript[0].content,
        InstructionDefaults::default().prompt_text
    );

    // Window is the three most recent messages, oldest first.
    let ids: Vec<i64> = transcript[1..]
        .iter()
        .map(|entry| {
            let envelope: serde_json::Value = serde_json::from_str(&entry.content).unwrap();
            envelope["message_id"].as_i64().unwrap()
        })
        .collect();
    assert_eq!(ids, vec![3, 4, 5]);
}

#[tokio::test]
async fn reply_chain_renders_one_level_only() {
    let h = harness(vec![], defaults(3, 10));

    h.pipeline
        .handle_message(&incoming(1, 10, "root"), h.sender.clone())
        .await
        .unwrap();
    h.pipeline
        .handle_message(
            &IncomingMessage {
                reply_to_message_id: Some(1),
                ..incoming(2, 20, "first reply")
            },
            h.sender.clone(),
        )
        .await
        .unwrap();
    h.pipeline
        .handle_message(
            &IncomingMessage {
                reply_to_message_id: Some(2),
                ..incoming(3, 10, "second reply")
            },
            h.sender.clone(),
        )
        .await
        .unwrap();

    let transcripts = h.model.transcripts.lock().unwrap();
    let last_entry = transcripts[0].last().unwrap();
    let envelope: serde_json::Value = serde_json::from_str(&last_entry.content).unwrap();

    // The grandparent ("root") is not inlined anywhere in the entry.
    assert_eq!(envelope["reply_to"]["text"], "first reply");
    assert!(envelope["reply_to"].get("reply_to").is_none());
}

#[tokio::test]
async fn unknown_capability_is_skipped_and_valid_one_executes() {
    let h = harness(
        vec![
            ToolCall {
                name: "delete_chat".into(),
                arguments: "{}".into(),
            },
            ToolCall {
                name: "answer".into(),
                arguments: r#"{"text": "I survived"}"#.into(),
            },
        ],
        defaults(1, 10),
    );

    h.pipeline
        .handle_message(&incoming(1, 10, "hello"), h.sender.clone())
        .await
        .unwrap();

    let sent = h.sender.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], (GROUP_ID, "I survived".to_string(), None));
}

#[tokio::test]
async fn counter_outage_persists_message_without_dispatch() {
    let store = Arc::new(FakeStore::default());
    let model = Arc::new(ScriptedModel::default());
    let sender = Arc::new(RecordingSender::default());
    let pipeline = MessagePipeline::new(
        store.clone(),
        Arc::new(DownCounter),
        Some(model.clone()),
        defaults(1, 10),
        BOT_USER_ID,
    );

    // Triggering is best-effort; ingestion must succeed.
    pipeline
        .handle_message(&incoming(1, 10, "hello"), sender)
        .await
        .unwrap();

    assert_eq!(store.messages.lock().unwrap().len(), 1);
    assert!(model.transcripts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn private_messages_are_persisted_but_never_counted() {
    let h = harness(vec![], defaults(1, 10));

    let private = IncomingMessage {
        group: None,
        ..incoming(1, 10, "psst")
    };
    h.pipeline
        .handle_message(&private, h.sender.clone())
        .await
        .unwrap();

    assert_eq!(h.store.messages.lock().unwrap().len(), 1);
    assert_eq!(h.counter.value(GROUP_ID), 0);
    assert!(h.model.transcripts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_dispatch_keeps_the_decrement() {
    let store = Arc::new(FakeStore::default());
    let counter = Arc::new(FakeCounter::default());
    let model = Arc::new(DownModel {
        attempts: AtomicUsize::new(0),
    });
    let sender = Arc::new(RecordingSender::default());
    let pipeline = MessagePipeline::new(
        store,
        counter.clone(),
        Some(model.clone()),
        defaults(2, 10),
        BOT_USER_ID,
    );

    pipeline
        .handle_message(&incoming(1, 10, "one"), sender.clone())
        .await
        .unwrap();
    let err = pipeline
        .handle_message(&incoming(2, 10, "two"), sender.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, ChimeError::Provider { .. }));
    assert_eq!(model.attempts.load(Ordering::SeqCst), 1);

    // The decrement is not rolled back: the failed round is abandoned
    // and counting starts over from zero.
    assert_eq!(counter.value(GROUP_ID), 0);
}

#[tokio::test]
#[should_panic(expected = "openai.api_key is not configured")]
async fn missing_model_credential_fails_loudly_on_first_dispatch() {
    let store = Arc::new(FakeStore::default());
    let counter = Arc::new(FakeCounter::default());
    let sender = Arc::new(RecordingSender::default());
    let pipeline = MessagePipeline::new(store, counter, None, defaults(1, 10), BOT_USER_ID);

    let _ = pipeline
        .handle_message(&incoming(1, 10, "hello"), sender)
        .await;
}
