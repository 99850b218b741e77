//! Live session stream for mounted views.
//!
//! ARCHITECTURE
//! ============
//! An open page subscribes with `GET /api/session/stream?view=...`. The
//! handler mounts an `AccessGuard` for that view on the session's hub
//! channel and forwards two kinds of server-sent events:
//! - `redirect`: the guard denied access; data is the target path
//! - `view`: the guard's render output changed; data is JSON
//!
//! Dropping the stream (client disconnect) unmounts the guard, so no
//! redirect is emitted for a view that is gone.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum_extra::extract::cookie::CookieJar;
use futures::Stream;
use futures::StreamExt;
use gate::{AccessGuard, GuardView, RedirectTargets, Redirector, Session};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::auth::{resolve_session, session_token};
use super::pages::Page;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    Redirect(String),
    View(GuardView),
}

impl LiveEvent {
    fn into_sse(self) -> Event {
        match self {
            Self::Redirect(path) => Event::default().event("redirect").data(path),
            Self::View(view) => Event::default()
                .event("view")
                .data(serde_json::to_string(&view).unwrap_or_default()),
        }
    }
}

/// Redirector that turns navigation requests into stream events.
struct EventRedirector {
    tx: mpsc::UnboundedSender<LiveEvent>,
}

impl Redirector for EventRedirector {
    fn navigate(&self, path: &str) {
        if self.tx.send(LiveEvent::Redirect(path.to_owned())).is_err() {
            tracing::warn!(%path, "redirect not delivered; stream closed");
        }
    }
}

struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Mount a guard for `page` on `sessions` and expose its output as a stream.
/// The guard stays mounted for as long as the stream is alive.
pub fn guard_events(
    page: Page,
    sessions: watch::Receiver<Session>,
    targets: RedirectTargets,
) -> impl Stream<Item = LiveEvent> + Send + 'static {
    let (tx, rx) = mpsc::unbounded_channel();
    let guard = AccessGuard::new(page.policy(), targets, EventRedirector { tx: tx.clone() });
    let mounted = guard.mount(sessions);

    let mut views = mounted.view();
    let forward = tokio::spawn(async move {
        loop {
            let view = *views.borrow_and_update();
            if tx.send(LiveEvent::View(view)).is_err() {
                break;
            }
            if views.changed().await.is_err() {
                break;
            }
        }
    });

    futures::stream::unfold((rx, mounted, AbortOnDrop(forward)), |(mut rx, mounted, forward)| async move {
        rx.recv().await.map(|event| (event, (rx, mounted, forward)))
    })
}

#[derive(Deserialize)]
pub struct StreamQuery {
    pub view: String,
}

/// `GET /api/session/stream?view=dashboard|admin|signin|onboarding`
pub async fn session_stream(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let page = Page::parse(&query.view).ok_or(StatusCode::BAD_REQUEST)?;

    // Without a token there is nothing to subscribe to; the guard evaluates
    // the signed-out snapshot once and the stream ends after its events.
    let sessions = match session_token(&jar) {
        Some(token) => subscribe_fresh(&state, &token)
            .await
            .ok_or(StatusCode::SERVICE_UNAVAILABLE)?,
        None => watch::channel(Session::signed_out()).1,
    };
    tracing::debug!(view = page.name(), channels = state.hub.channel_count(), "live session stream mounted");

    let events = guard_events(page, sessions, state.config.targets.clone()).map(|e| Ok(e.into_sse()));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

const SUBSCRIBE_ATTEMPTS: usize = 3;

/// Resolve `token` and join its hub channel, resolving again when a hub
/// write lands between the two. A failed resolution gets a private channel
/// so it never overwrites the snapshot other streams share.
pub(crate) async fn subscribe_fresh(state: &AppState, token: &str) -> Option<watch::Receiver<Session>> {
    for _ in 0..SUBSCRIBE_ATTEMPTS {
        let seen = state.hub.epoch();
        let session = resolve_session(state, token).await;
        if session.resolution_failed {
            return Some(watch::channel(session).1);
        }
        if let Some(rx) = state.hub.subscribe(token, session, seen) {
            return Some(rx);
        }
    }
    tracing::warn!("session changed during every subscribe attempt; stream not mounted");
    None
}

#[cfg(test)]
#[path = "live_test.rs"]
mod tests;
