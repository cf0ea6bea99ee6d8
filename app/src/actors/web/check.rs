//! Check handling: resolve visited location names and report the new ones.

use crate::bus::BusSender;
use crate::state::BridgeState;
use apbridge::{CheckOutcome, CheckResponse, SessionCommand};

/// The session is not connected; the caller should retry later.
#[derive(Debug, PartialEq, Eq)]
pub struct NotReady;

/// Resolve a batch of location names, in order.
///
/// Waits for scouting to settle first, so a call may block across a whole
/// scouting round. Losing the connection while waiting fails the call.
pub async fn check(
    state: &BridgeState,
    sender: &BusSender,
    names: &[&str],
) -> Result<CheckResponse, NotReady> {
    if !state.connected.is_ready() {
        return Err(NotReady);
    }
    tokio::select! {
        biased;
        _ = state.scouted.await_ready() => {}
        _ = state.connected.await_not_ready() => return Err(NotReady),
    }

    let tables = &state.tables;
    let (outcomes, goal, new_checks) = state.with_store(|store| {
        let mut outcomes = Vec::new();
        let mut goal = false;

        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let Some(location) = tables.location(name) else {
                tracing::info!("check: unknown location '{name}'");
                continue;
            };

            let Some(id) = location.id else {
                if !store.goal_reached && store.goal_location() == Some(name) {
                    store.goal_reached = true;
                    goal = true;
                    outcomes.push(CheckOutcome::Victory {
                        location: location.name.clone(),
                    });
                } else {
                    tracing::debug!("check: ignoring event location '{name}'");
                }
                continue;
            };

            if store.is_checked(id) {
                outcomes.push(CheckOutcome::AlreadyChecked {
                    location: location.name.clone(),
                });
                continue;
            }

            if !store.scouted.contains(&id) {
                outcomes.push(CheckOutcome::Disabled {
                    location: location.name.clone(),
                    item: location.vanilla_item.clone(),
                });
                continue;
            }

            let Some(assignment) = store.assignments.get(&id).copied() else {
                tracing::warn!("check: '{name}' scouted without an assignment");
                continue;
            };
            let item = store.assigned_item_name(tables, &assignment);
            let location_name = location.name.clone();
            let outcome = if store.local_slot() == Some(assignment.player) {
                CheckOutcome::SentToSelf {
                    location: location_name,
                    item,
                }
            } else {
                match store.slot_info(assignment.player) {
                    Some(info) => CheckOutcome::SentTo {
                        location: location_name,
                        item,
                        recipient: info.clone(),
                    },
                    None => CheckOutcome::SentToNoOne {
                        location: location_name,
                        item,
                    },
                }
            };
            outcomes.push(outcome);
            store.local_checked.insert(id);
        }

        (outcomes, goal, store.take_new_checks())
    });

    if goal {
        tracing::info!("check: goal complete");
        sender.command(SessionCommand::GoalComplete);
    }
    if !new_checks.is_empty() {
        tracing::info!("check: reporting {} new locations", new_checks.len());
        sender.command(SessionCommand::LocationChecks {
            locations: new_checks,
        });
    }

    Ok(CheckResponse { outcomes })
}
