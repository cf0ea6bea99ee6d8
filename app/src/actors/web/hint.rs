//! Hint pass-through.

use super::check::NotReady;
use crate::bus::BusSender;
use crate::state::BridgeState;
use apbridge::SessionCommand;

/// Ask the session for a hint on each known location. Unknown names and
/// event locations are dropped. Returns the number of hints requested.
pub fn hint(state: &BridgeState, sender: &BusSender, names: &[&str]) -> Result<usize, NotReady> {
    if !state.connected.is_ready() {
        return Err(NotReady);
    }

    let mut sent = 0;
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        match state.tables.location(name).and_then(|l| l.id) {
            Some(id) => {
                sender.command(SessionCommand::CreateHints {
                    locations: vec![id],
                });
                sent += 1;
            }
            None => tracing::debug!("hint: no location id for '{name}'"),
        }
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::session::apply_event;
    use crate::bus::{self, testing::drain_commands};
    use crate::state::testing;

    #[test]
    fn forwards_known_locations_only() {
        let state = testing::state();
        let sender = bus::channel("test");
        let mut rx = sender.subscribe();
        apply_event(&state, &sender, testing::connected_event());

        let sent = hint(&state, &sender, &["Shipyard", "Nowhere", "Homeworld Falls", "Outpost Beta"]);
        assert_eq!(sent, Ok(2));
        assert_eq!(
            drain_commands(&mut rx),
            vec![
                SessionCommand::CreateHints {
                    locations: vec![1004]
                },
                SessionCommand::CreateHints {
                    locations: vec![1001]
                },
            ]
        );
        // No local state is touched.
        state.with_store(|store| assert!(store.local_checked.is_empty()));
    }

    #[test]
    fn not_connected_is_not_ready() {
        let state = testing::state();
        let sender = bus::channel("test");
        assert_eq!(hint(&state, &sender, &["Shipyard"]), Err(NotReady));
    }
}
