// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context window assembly: recent stored messages rendered into a
//! model-ready, oldest-first transcript.

use chime_core::types::{Instruction, StoredMessage, TranscriptEntry, User};
use chime_core::{ChimeError, MessageStore};

/// Speaker label used when a message has no resolvable sender.
pub const ANONYMOUS_SENDER: &str = "anonymous";

/// Build the transcript for one conversation round.
///
/// Fetches the `context_count` most recent messages (the store returns
/// most-recent-first; the order is reversed here), prepends the group's
/// instruction prompt as the lone system entry, and tags each message
/// by sender role: the bot's own messages become assistant entries,
/// everything else a user entry labelled with the sender's external id
/// or the anonymous sentinel.
pub async fn build_transcript(
    store: &dyn MessageStore,
    group_id: i64,
    instruction: &Instruction,
    bot_user_id: i64,
) -> Result<Vec<TranscriptEntry>, ChimeError> {
    let mut recent = store
        .recent_messages(group_id, instruction.context_count)
        .await?;
    recent.reverse();

    let mut transcript = Vec::with_capacity(recent.len() + 1);
    transcript.push(TranscriptEntry::system(instruction.prompt_text.clone()));
    for message in &recent {
        transcript.push(render_entry(message, bot_user_id));
    }
    Ok(transcript)
}

/// Render one stored message as a transcript entry.
///
/// User entries carry a JSON envelope so the model can address
/// individual messages by id; one level of reply context is inlined
/// when present (deeper chains are not resolved by the store).
fn render_entry(message: &StoredMessage, bot_user_id: i64) -> TranscriptEntry {
    if message
        .sender
        .as_ref()
        .is_some_and(|user| user.user_id == bot_user_id)
    {
        return TranscriptEntry::assistant(message.text.clone());
    }

    let name = message
        .sender
        .as_ref()
        .map(|user| user.user_id.to_string())
        .unwrap_or_else(|| ANONYMOUS_SENDER.to_string());

    let mut envelope = serde_json::json!({
        "message_id": message.message_id,
        "text": message.text,
        "full_name_user": message.sender.as_ref().map(User::full_name),
    });
    if let Some(reply) = &message.reply {
        envelope["reply_to"] = serde_json::json!({
            "full_name_user": reply.sender.as_ref().map(User::full_name),
            "text": reply.text,
        });
    }

    TranscriptEntry::user(name, envelope.to_string())
}
