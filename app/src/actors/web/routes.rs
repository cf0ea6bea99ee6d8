//! HTTP endpoint handlers polled by the game process.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::WebState;
use super::check::{self, NotReady};
use super::delivery;
use super::hint;
use apbridge::Channel;

fn text(body: impl ToString) -> Response {
    body.to_string().into_response()
}

fn not_ready() -> Response {
    StatusCode::SERVICE_UNAVAILABLE.into_response()
}

/// Path segments after the route prefix, in order. Blanks are kept and
/// skipped by the handlers.
fn split_names(path: &str) -> Vec<&str> {
    path.split('/').collect()
}

fn tick(state: &WebState, channel: Channel, count: usize) -> Response {
    if !state.root.connected.is_ready() {
        return not_ready();
    }
    text(delivery::deliver(&state.root, channel, count))
}

/// GET /Tick/Strategy/{count}
pub async fn get_tick_strategy(
    State(state): State<Arc<WebState>>,
    Path(count): Path<usize>,
) -> Response {
    tick(&state, Channel::Strategy, count)
}

/// GET /Tick/Tactical/{count}
pub async fn get_tick_tactical(
    State(state): State<Arc<WebState>>,
    Path(count): Path<usize>,
) -> Response {
    tick(&state, Channel::Tactical, count)
}

/// GET /Check/{*names}
pub async fn get_check(State(state): State<Arc<WebState>>, Path(names): Path<String>) -> Response {
    match check::check(&state.root, &state.sender, &split_names(&names)).await {
        Ok(response) => text(response),
        Err(NotReady) => not_ready(),
    }
}

/// GET /Hint/{*names}
pub async fn get_hint(State(state): State<Arc<WebState>>, Path(names): Path<String>) -> Response {
    match hint::hint(&state.root, &state.sender, &split_names(&names)) {
        Ok(_) => text(""),
        Err(NotReady) => not_ready(),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::header;

    use super::*;
    use crate::actors::session::apply_event;
    use crate::bus;
    use crate::state::testing::{self, SLOT};
    use apbridge::{NetworkItem, SessionEvent};

    fn web_state() -> Arc<WebState> {
        Arc::new(WebState::new(
            testing::state(),
            bus::channel("webserver"),
            "127.0.0.1:22142".parse().unwrap(),
        ))
    }

    async fn body(response: Response) -> String {
        String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap()
    }

    #[tokio::test]
    async fn every_endpoint_is_unavailable_before_connecting() {
        let state = web_state();
        let responses = [
            get_tick_strategy(State(Arc::clone(&state)), Path(0)).await,
            get_tick_tactical(State(Arc::clone(&state)), Path(0)).await,
            get_check(State(Arc::clone(&state)), Path("Shipyard".into())).await,
            get_hint(State(Arc::clone(&state)), Path("Shipyard".into())).await,
        ];
        for response in responses {
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(body(response).await, "");
        }
    }

    #[tokio::test]
    async fn tick_returns_plain_text_blocks() {
        let state = web_state();
        apply_event(&state.root, &state.sender, testing::connected_event());
        apply_event(
            &state.root,
            &state.sender,
            SessionEvent::ReceivedItems {
                index: 0,
                items: vec![NetworkItem {
                    item: 101,
                    location: 1002,
                    player: SLOT,
                    flags: Default::default(),
                }],
            },
        );

        let response = get_tick_tactical(State(Arc::clone(&state)), Path(0)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
        assert_eq!(body(response).await, "0\n[Upgrade]\nSelf\nShields I\n");

        let response = get_tick_strategy(State(Arc::clone(&state)), Path(0)).await;
        assert_eq!(body(response).await, "0\n");
    }

    #[tokio::test]
    async fn check_splits_names_on_slashes() {
        let state = web_state();
        apply_event(&state.root, &state.sender, testing::connected_event());
        state.root.scouted.set();

        let response = get_check(
            State(Arc::clone(&state)),
            Path("Capital Assault//Nowhere/Homeworld Falls".into()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body(response).await,
            "[Disabled]\nCapital Assault\nCapital Ship\n\
             [Victory]\nHomeworld Falls\nGoal complete\n"
        );
    }

    #[tokio::test]
    async fn hint_always_succeeds_when_connected() {
        let state = web_state();
        apply_event(&state.root, &state.sender, testing::connected_event());
        let response = get_hint(State(Arc::clone(&state)), Path("Nowhere".into())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
