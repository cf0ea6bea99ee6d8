//! Item delivery: what the game process has not consumed yet on a channel.
//!
//! Stateless per call: the whole received sequence is replayed every time
//! and the caller's count decides where delivery resumes, so a stale or
//! reset counter simply gets the matching suffix again.

use std::collections::HashMap;

use crate::state::BridgeState;
use apbridge::{Channel, DeliveredItem, ItemSender, TickResponse};

/// Items on `channel` past the first `count`, in arrival order.
///
/// Received ids missing from the tables are skipped with a warning: without
/// a definition there is no channel to sequence them on, so they never count
/// toward `count` on either channel.
pub fn deliver(state: &BridgeState, channel: Channel, count: usize) -> TickResponse {
    let tables = &state.tables;
    let items = state.with_store(|store| {
        let local = store.local_slot();
        // Receipts so far, per progressive item.
        let mut receipts: HashMap<&str, usize> = HashMap::new();
        let mut out = Vec::new();

        for received in &store.received {
            let Some(def) = tables.item(received.item) else {
                tracing::warn!("tick: unknown item id {}, skipping", received.item);
                continue;
            };

            let name = match &def.stages {
                Some(stages) => {
                    let n = receipts.entry(def.name.as_str()).or_insert(0);
                    *n += 1;
                    match stages.get(*n - 1) {
                        Some(stage) => stage.clone(),
                        None => {
                            tracing::warn!(
                                "tick: '{}' received {} times but has only {} stages, dropping",
                                def.name,
                                n,
                                stages.len()
                            );
                            continue;
                        }
                    }
                }
                None => def.name.clone(),
            };

            if def.channel != channel {
                continue;
            }

            let sender = if local == Some(received.player) {
                ItemSender::Own
            } else {
                match store.slot_info(received.player) {
                    Some(info) => ItemSender::Other(info.clone()),
                    None => ItemSender::Unknown,
                }
            };

            out.push(DeliveredItem {
                name,
                category: def.category.clone(),
                sender,
            });
        }
        out
    });

    TickResponse {
        count,
        items: items.into_iter().skip(count).collect(),
    }
}
