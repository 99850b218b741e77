use gate::Role;

use super::*;

fn member(user_id: Uuid) -> Session {
    Session::signed_in(user_id).with_profile(true, false)
}

fn not_onboarded(user_id: Uuid) -> Session {
    Session::signed_in(user_id).with_profile(false, true)
}

/// Subscribe with a snapshot resolved at the current epoch.
fn join(hub: &SessionHub, token: &str, session: Session) -> watch::Receiver<Session> {
    let seen = hub.epoch();
    hub.subscribe(token, session, seen).expect("fresh snapshot should subscribe")
}

#[test]
fn subscribe_seeds_current_session() {
    let hub = SessionHub::new();
    let id = Uuid::new_v4();
    let rx = join(&hub, "tok", member(id));
    assert_eq!(*rx.borrow(), member(id));
    assert_eq!(hub.channel_count(), 1);
}

#[test]
fn second_subscriber_shares_channel() {
    let hub = SessionHub::new();
    let id = Uuid::new_v4();
    let _a = join(&hub, "tok", member(id));
    let _b = join(&hub, "tok", member(id));
    assert_eq!(hub.channel_count(), 1);
    assert_eq!(hub.publish("tok", member(id)), 2);
}

#[tokio::test]
async fn publish_reaches_subscriber() {
    let hub = SessionHub::new();
    let id = Uuid::new_v4();
    let mut rx = join(&hub, "tok", Session::signed_in(id));

    hub.publish("tok", member(id));
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().onboarding_complete);
}

#[test]
fn publish_to_unknown_token_is_noop() {
    let hub = SessionHub::new();
    assert_eq!(hub.publish("missing", Session::signed_out()), 0);
}

#[test]
fn publish_user_fans_out_to_all_tokens() {
    let hub = SessionHub::new();
    let id = Uuid::new_v4();
    let other = Uuid::new_v4();
    let a = join(&hub, "tab-a", Session::signed_in(id));
    let b = join(&hub, "tab-b", Session::signed_in(id));
    let c = join(&hub, "tab-c", Session::signed_in(other));

    let updated = member(id).with_role(Role::Admin);
    assert_eq!(hub.publish_user(id, updated.clone()), 2);
    assert_eq!(*a.borrow(), updated);
    assert_eq!(*b.borrow(), updated);
    assert!(!c.borrow().profile_loaded);
}

#[tokio::test]
async fn revoke_signs_subscribers_out() {
    let hub = SessionHub::new();
    let mut rx = join(&hub, "tok", member(Uuid::new_v4()));
    hub.revoke("tok");

    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), Session::signed_out());
    assert_eq!(hub.channel_count(), 0);
}

#[test]
fn dropped_receivers_are_pruned() {
    let hub = SessionHub::new();
    let id = Uuid::new_v4();
    drop(join(&hub, "stale", member(id)));
    let _live = join(&hub, "live", member(id));

    assert_eq!(hub.channel_count(), 1);
}

#[test]
fn closed_streams_leave_no_channels() {
    let hub = SessionHub::new();
    let id = Uuid::new_v4();
    for n in 0..1000 {
        drop(join(&hub, &format!("tok-{n}"), member(id)));
    }
    assert_eq!(hub.channel_count(), 0);
}

#[test]
fn resubscribe_with_newer_snapshot_updates_seed() {
    let hub = SessionHub::new();
    let id = Uuid::new_v4();
    let first = join(&hub, "tok", Session::signed_in(id));
    let second = join(&hub, "tok", member(id));
    assert_eq!(*first.borrow(), member(id));
    assert_eq!(*second.borrow(), member(id));
}

#[test]
fn late_subscribe_does_not_roll_back_published_session() {
    let hub = SessionHub::new();
    let id = Uuid::new_v4();
    let live = join(&hub, "tok", not_onboarded(id));

    // A second stream resolved its session before onboarding finished...
    let seen = hub.epoch();
    let stale = not_onboarded(id);
    hub.publish_user(id, member(id));

    // ...and subscribes after the update was published.
    let late = hub.subscribe("tok", stale, seen).unwrap();
    assert!(live.borrow().onboarding_complete);
    assert!(late.borrow().onboarding_complete);
}

#[test]
fn stale_snapshot_without_channel_must_resolve_again() {
    let hub = SessionHub::new();
    let id = Uuid::new_v4();
    let seen = hub.epoch();
    hub.publish_user(id, member(id));

    assert!(hub.subscribe("tok", not_onboarded(id), seen).is_none());
    assert_eq!(hub.channel_count(), 0);

    let rx = join(&hub, "tok", member(id));
    assert!(rx.borrow().onboarding_complete);
}

#[test]
fn revoke_supersedes_snapshots_resolved_before_it() {
    let hub = SessionHub::new();
    let seen = hub.epoch();
    hub.revoke("tok");
    assert!(hub.subscribe("tok", member(Uuid::new_v4()), seen).is_none());
}
