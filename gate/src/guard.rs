//! Reactive guard shell around [`decide`].
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages mount an `AccessGuard` with their policy. The guard re-evaluates on
//! every session snapshot, asks the redirector to navigate on denial and
//! publishes what the page should render.
//!
//! DESIGN
//! ======
//! - A redirect is requested once per denial transition. Re-evaluating the
//!   same denial while its navigation is in flight is a no-op.
//! - The mounted loop reads sessions with `borrow_and_update`, so a burst of
//!   updates collapses to the latest snapshot.
//! - Unmount flips a flag under the same lock the redirect path holds. No
//!   navigation can start after `unmount` returns.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::decision::{GuardDecision, GuardView, RedirectTargets, decide};
use crate::policy::AccessPolicy;
use crate::session::Session;

/// Navigation side of the guard. Fire-and-forget.
///
/// Implementations own reporting of unreachable targets; the guard only
/// guarantees it asked.
pub trait Redirector: Send + Sync + 'static {
    fn navigate(&self, path: &str);
}

impl<F> Redirector for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn navigate(&self, path: &str) {
        self(path);
    }
}

// =============================================================================
// ACCESS GUARD
// =============================================================================

pub struct AccessGuard<R> {
    policy: AccessPolicy,
    targets: RedirectTargets,
    redirector: R,
    decision: GuardDecision,
    /// Target of the redirect requested for the current denial.
    in_flight: Option<String>,
}

impl<R: Redirector> AccessGuard<R> {
    #[must_use]
    pub fn new(policy: AccessPolicy, targets: RedirectTargets, redirector: R) -> Self {
        Self { policy, targets, redirector, decision: GuardDecision::Pending, in_flight: None }
    }

    /// Admin panel gate: signed in with the admin role. Non-admins land on
    /// `targets.admin_fallback` instead of the sign-in page.
    #[must_use]
    pub fn admin(targets: RedirectTargets, redirector: R) -> Self {
        Self::new(AccessPolicy::admin(), targets, redirector)
    }

    #[must_use]
    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Decision from the most recent evaluation.
    #[must_use]
    pub fn decision(&self) -> GuardDecision {
        self.decision
    }

    /// Re-evaluate against `session`, requesting navigation on a new denial.
    pub fn evaluate(&mut self, session: &Session) -> GuardView {
        let decision = decide(session, &self.policy);
        if decision != self.decision {
            tracing::debug!(from = ?self.decision, to = ?decision, user_id = ?session.user_id, "guard transition");
        }

        match decision.redirect_target(session, &self.targets) {
            Some(path) => {
                if self.in_flight.as_deref() != Some(path.as_str()) {
                    tracing::info!(?decision, %path, "guard denied access; redirecting");
                    self.redirector.navigate(&path);
                    self.in_flight = Some(path);
                }
            }
            None => self.in_flight = None,
        }

        self.decision = decision;
        decision.view(session)
    }

    /// Spawn the re-evaluation loop on the current tokio runtime.
    ///
    /// The loop ends when the session sender is dropped or the returned
    /// handle is unmounted.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn mount(self, mut sessions: watch::Receiver<Session>) -> MountedGuard {
        let mounted = Arc::new(Mutex::new(true));
        let mut guard = AccessGuard {
            policy: self.policy,
            targets: self.targets,
            redirector: MountGate { inner: self.redirector, mounted: Arc::clone(&mounted) },
            decision: self.decision,
            in_flight: self.in_flight,
        };

        let (view_tx, view_rx) = watch::channel(GuardView::Loading);
        let task = tokio::spawn(async move {
            loop {
                let session = sessions.borrow_and_update().clone();
                let view = guard.evaluate(&session);
                view_tx.send_if_modified(|current| {
                    if *current == view {
                        false
                    } else {
                        *current = view;
                        true
                    }
                });

                if sessions.changed().await.is_err() {
                    tracing::debug!("session provider dropped; guard loop finished");
                    break;
                }
            }
        });

        MountedGuard { view: view_rx, mounted, task }
    }
}

// =============================================================================
// MOUNTED GUARD
// =============================================================================

/// Redirector wrapper that drops navigation once the guard is unmounted.
struct MountGate<R> {
    inner: R,
    mounted: Arc<Mutex<bool>>,
}

impl<R: Redirector> Redirector for MountGate<R> {
    fn navigate(&self, path: &str) {
        let Ok(mounted) = self.mounted.lock() else {
            return;
        };
        if *mounted {
            self.inner.navigate(path);
        } else {
            tracing::debug!(%path, "redirect suppressed after unmount");
        }
    }
}

/// Handle to a mounted guard. Dropping it unmounts.
pub struct MountedGuard {
    view: watch::Receiver<GuardView>,
    mounted: Arc<Mutex<bool>>,
    task: JoinHandle<()>,
}

impl MountedGuard {
    /// Subscribe to render output.
    #[must_use]
    pub fn view(&self) -> watch::Receiver<GuardView> {
        self.view.clone()
    }

    #[must_use]
    pub fn current(&self) -> GuardView {
        *self.view.borrow()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.lock().map(|m| *m).unwrap_or(false)
    }

    pub fn unmount(self) {
        drop(self);
    }

    fn shutdown(&self) {
        if let Ok(mut mounted) = self.mounted.lock() {
            *mounted = false;
        }
        self.task.abort();
    }
}

impl Drop for MountedGuard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
