//! Scouting coordinator: keeps the scouted set in step with the locations
//! the session lists as ours.
//!
//! Loop:
//!   1. wait for `scouted` to go not-ready (true at startup and after every
//!      invalidation)
//!   2. wait for `connected`
//!   3. fold every owned location into the scouted set and ask the session
//!      for assignments of the whole running set
//!   4. wait for the session actor to flip `scouted` ready; a further
//!      invalidation before that sends us back to step 1 to resend
//!   5. hand a spoiler record to the sink
//!
//! The scouted set is only written in step 3, between suspension points, so
//! cancelling the task at any await leaves it consistent.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::actors::Actor;
use crate::bus::BusSender;
use crate::spoiler::SpoilerSink;
use crate::state::BridgeState;
use apbridge::{SessionCommand, SpoilerEntry, SpoilerRecord};

pub struct ScoutActor {
    pub sink: Arc<dyn SpoilerSink>,
}

impl Actor for ScoutActor {
    fn start(&self, state: Arc<BridgeState>, sender: BusSender) -> JoinHandle<()> {
        tokio::spawn(run(state, sender, Arc::clone(&self.sink)))
    }
}

async fn run(state: Arc<BridgeState>, sender: BusSender, sink: Arc<dyn SpoilerSink>) {
    loop {
        state.scouted.await_not_ready().await;
        state.connected.await_ready().await;

        if !scout_round(&state, &sender).await {
            continue;
        }

        let Some(record) = spoiler_record(&state) else {
            tracing::debug!("scout: settled without a slot, no spoiler");
            continue;
        };
        // Sinks do file I/O; keep it off the runtime thread.
        let sink = Arc::clone(&sink);
        match tokio::task::spawn_blocking(move || sink.write(&record)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("scout: failed to write spoiler: {e:#}"),
            Err(e) => tracing::warn!("scout: spoiler writer panicked: {e}"),
        }
    }
}

/// Run one scouting request. Returns `true` once `scouted` is ready, `false`
/// if scouting was invalidated again first.
async fn scout_round(state: &BridgeState, sender: &BusSender) -> bool {
    let generation = state.scouted.generation();
    let (locations, settled) = state.with_store(|store| {
        let locations = store.extend_scouted(&state.tables);
        (locations, store.is_settled(&state.tables))
    });

    if settled {
        // Nothing outstanding (e.g. no owned locations at all).
        state.scouted.set();
    } else {
        tracing::info!("scout: requesting {} locations", locations.len());
        sender.command(SessionCommand::LocationScouts { locations });
    }

    tokio::select! {
        biased;
        _ = state.scouted.await_ready() => true,
        _ = state.scouted.await_generation_after(generation) => {
            tracing::debug!("scout: invalidated before settling");
            false
        }
    }
}

/// Derive the spoiler record from the current assignments.
fn spoiler_record(state: &BridgeState) -> Option<SpoilerRecord> {
    let tables = &state.tables;
    state.with_store(|store| {
        let slot = store.local_slot()?;
        let mut entries: Vec<_> = store
            .scouted
            .iter()
            .filter_map(|id| {
                let assignment = store.assignments.get(id)?;
                let location = tables.location_by_id(*id)?;
                let owner = store.slot_info(assignment.player);
                Some(SpoilerEntry {
                    location: location.name.clone(),
                    item: store.assigned_item_name(tables, assignment),
                    player: owner
                        .map(|o| o.name.clone())
                        .unwrap_or_else(|| format!("Unknown player {}", assignment.player)),
                    game: owner.map(|o| o.game.clone()).unwrap_or_default(),
                    flags: assignment.flags.bits(),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.location.cmp(&b.location));
        Some(SpoilerRecord {
            generated_at: Utc::now(),
            slot,
            entries,
        })
    })
}
