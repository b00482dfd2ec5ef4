// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-group instruction rows, created lazily with configured defaults.

use std::str::FromStr;

use chime_core::types::ModelId;
use chime_core::ChimeError;
use rusqlite::params;
use tracing::warn;

use crate::database::Database;
use crate::models::{Instruction, InstructionDefaults};

/// Fetch the group's instruction row, creating it from `defaults` when
/// absent. The insert is `OR IGNORE`, so concurrent callers converge on
/// one row.
pub async fn ensure_instruction(
    db: &Database,
    group_id: i64,
    defaults: &InstructionDefaults,
) -> Result<Instruction, ChimeError> {
    let defaults = defaults.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO instructions
                     (group_id, model, prompt_text, trigger_count, context_count)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    group_id,
                    defaults.model.to_string(),
                    defaults.prompt_text,
                    defaults.trigger_count,
                    defaults.context_count,
                ],
            )?;

            let row = conn.query_row(
                "SELECT model, prompt_text, trigger_count, context_count
                 FROM instructions WHERE group_id = ?1",
                params![group_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )?;
            Ok(row)
        })
        .await
        .map_err(crate::database::map_tr_err)
        .map(|(model, prompt_text, trigger_count, context_count)| {
            // An operator may have edited the model column by hand; an
            // unrecognized name falls back to the default rather than
            // poisoning every trigger for the group.
            let model = ModelId::from_str(&model).unwrap_or_else(|_| {
                warn!(group_id, model = model.as_str(), "unknown model in instruction row, using default");
                ModelId::default()
            });
            Instruction {
                group_id,
                model,
                prompt_text,
                trigger_count,
                context_count,
            }
        })
}
