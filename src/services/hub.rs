//! Live session channels.
//!
//! DESIGN
//! ======
//! One `watch` channel per session token. The hub is the single writer;
//! mounted guards (live session streams) are the readers. Publishing a
//! profile change fans out to every token of the user so all open tabs
//! re-evaluate.
//!
//! Every write bumps a hub-wide epoch. A subscriber reads the epoch before
//! resolving its session and hands it back to `subscribe`; a snapshot
//! resolved before a later write is never allowed onto a channel.
//!
//! Channels without receivers are pruned on every subscribe, publish and
//! count, so closed streams do not accumulate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use gate::Session;
use tokio::sync::watch;
use uuid::Uuid;

struct Channel {
    user_id: Option<Uuid>,
    tx: watch::Sender<Session>,
    /// Epoch of the snapshot the channel currently holds.
    written: u64,
}

#[derive(Default)]
struct Channels {
    epoch: u64,
    by_token: HashMap<String, Channel>,
}

impl Channels {
    fn prune(&mut self) {
        self.by_token.retain(|_, c| c.tx.receiver_count() > 0);
    }

    fn bump(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }
}

#[derive(Clone, Default)]
pub struct SessionHub {
    channels: Arc<Mutex<Channels>>,
}

impl SessionHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current write epoch. Read it before resolving a session that will be
    /// passed to [`SessionHub::subscribe`].
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner).epoch
    }

    /// Subscribe to updates for `token`. `current` was resolved after
    /// `seen` was read from [`SessionHub::epoch`].
    ///
    /// An existing channel written after `seen` already holds a newer
    /// snapshot and is joined as is. `None` means there is no channel and a
    /// write happened since `seen`; the caller must resolve again.
    pub fn subscribe(&self, token: &str, current: Session, seen: u64) -> Option<watch::Receiver<Session>> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels.prune();
        let epoch = channels.epoch;

        if let Some(channel) = channels.by_token.get_mut(token) {
            if channel.written <= seen {
                channel.user_id = current.user_id;
                channel.written = seen;
                channel.tx.send_if_modified(|s| {
                    if *s == current {
                        false
                    } else {
                        *s = current;
                        true
                    }
                });
            }
            return Some(channel.tx.subscribe());
        }

        if seen < epoch {
            tracing::debug!(seen, epoch, "session snapshot superseded before subscribe");
            return None;
        }

        let user_id = current.user_id;
        let (tx, rx) = watch::channel(current);
        channels.by_token.insert(token.to_owned(), Channel { user_id, tx, written: seen });
        Some(rx)
    }

    /// Publish a new snapshot for one token. Returns the number of receivers.
    pub fn publish(&self, token: &str, session: Session) -> usize {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels.prune();
        let epoch = channels.bump();
        let Some(channel) = channels.by_token.get_mut(token) else {
            return 0;
        };
        channel.user_id = session.user_id;
        channel.written = epoch;
        channel.tx.send_replace(session);
        channel.tx.receiver_count()
    }

    /// Publish a new snapshot to every token held by `user_id`.
    pub fn publish_user(&self, user_id: Uuid, session: Session) -> usize {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels.prune();
        let epoch = channels.bump();
        let mut receivers = 0;
        for channel in channels.by_token.values_mut().filter(|c| c.user_id == Some(user_id)) {
            channel.written = epoch;
            channel.tx.send_replace(session.clone());
            receivers += channel.tx.receiver_count();
        }
        tracing::debug!(%user_id, receivers, epoch, "published session update");
        receivers
    }

    /// Sign a token out: subscribers observe a signed-out session and the
    /// channel is forgotten.
    pub fn revoke(&self, token: &str) {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels.bump();
        if let Some(channel) = channels.by_token.remove(token) {
            channel.tx.send_replace(Session::signed_out());
        }
    }

    /// Number of channels with at least one live receiver.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels.prune();
        channels.by_token.len()
    }
}

#[cfg(test)]
#[path = "hub_test.rs"]
mod tests;
