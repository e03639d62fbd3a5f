//! Per-floor-plan fan-out of accepted votes.
//!
//! [`BroadcastHub`] keeps, for every floor-plan, the set of currently
//! connected subscribers, each behind its own unbounded channel. Publishing
//! never waits on a subscriber: a send either lands in the subscriber's
//! queue immediately or fails because the subscriber is gone, in which case
//! that subscriber is dropped and the others are unaffected.
//!
//! Publishing and subscriber-set mutation take the same write lock, so
//! every subscriber of a floor-plan observes events in the same order they
//! were published.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use heatvote_core::types::DbId;
use heatvote_db::models::vote::{PublicVote, Vote};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};

// ---------------------------------------------------------------------------
// VoteBroadcast
// ---------------------------------------------------------------------------

/// Payload pushed to subscribers for one accepted vote.
///
/// Carries only public fields: no visitor identity, no network address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteBroadcast {
    pub floorplan_id: DbId,
    #[serde(flatten)]
    pub vote: PublicVote,
}

impl From<&Vote> for VoteBroadcast {
    fn from(vote: &Vote) -> Self {
        Self {
            floorplan_id: vote.floorplan_id,
            vote: vote.public(),
        }
    }
}

/// An item delivered through a subscriber's channel.
#[derive(Debug, Clone, PartialEq)]
pub enum HubMessage {
    /// A newly accepted vote.
    Vote(Arc<VoteBroadcast>),
    /// Keep-alive request; transports translate this into a ping frame.
    Ping,
    /// The hub is shutting down; no further messages will follow.
    Close,
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Identifier of one subscriber, unique for the lifetime of the hub.
pub type SubscriberId = u64;

/// Receiving end handed to a subscriber by [`BroadcastHub::subscribe`].
///
/// Pass it back to [`BroadcastHub::unsubscribe`] on disconnect. Dropping it
/// without unsubscribing is also safe: the hub forgets the subscriber on the
/// next publish.
pub struct Subscription {
    id: SubscriberId,
    floorplan_id: DbId,
    receiver: mpsc::UnboundedReceiver<HubMessage>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn floorplan_id(&self) -> DbId {
        self.floorplan_id
    }

    /// Wait for the next message. `None` once the hub has dropped this
    /// subscriber (unsubscribe or shutdown) and the queue is drained.
    pub async fn recv(&mut self) -> Option<HubMessage> {
        self.receiver.recv().await
    }

    /// Take the next message if one is already queued.
    pub fn try_recv(&mut self) -> Option<HubMessage> {
        self.receiver.try_recv().ok()
    }
}

// ---------------------------------------------------------------------------
// BroadcastHub
// ---------------------------------------------------------------------------

type SubscriberSet = HashMap<SubscriberId, mpsc::UnboundedSender<HubMessage>>;

/// Fan-out hub for accepted votes, keyed by floor-plan.
///
/// Designed to be shared via `Arc<BroadcastHub>`.
pub struct BroadcastHub {
    floorplans: RwLock<HashMap<DbId, SubscriberSet>>,
    next_id: AtomicU64,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self {
            floorplans: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new subscriber for `floorplan_id`.
    pub async fn subscribe(&self, floorplan_id: DbId) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.floorplans
            .write()
            .await
            .entry(floorplan_id)
            .or_default()
            .insert(id, tx);
        tracing::debug!(floorplan_id, subscriber_id = id, "Subscriber registered");
        Subscription {
            id,
            floorplan_id,
            receiver: rx,
        }
    }

    /// Deregister a subscriber. Returns `false` if it was already gone.
    ///
    /// Once this returns, no further event is delivered to the subscriber.
    pub async fn unsubscribe(&self, floorplan_id: DbId, id: SubscriberId) -> bool {
        let mut floorplans = self.floorplans.write().await;
        let Some(subscribers) = floorplans.get_mut(&floorplan_id) else {
            return false;
        };
        let removed = subscribers.remove(&id).is_some();
        if subscribers.is_empty() {
            floorplans.remove(&floorplan_id);
        }
        if removed {
            tracing::debug!(floorplan_id, subscriber_id = id, "Subscriber removed");
        }
        removed
    }

    /// Push an accepted vote to every current subscriber of its floor-plan.
    ///
    /// Returns the number of subscribers the event was queued for.
    /// Subscribers whose channel is closed are dropped silently.
    pub async fn publish(&self, event: VoteBroadcast) -> usize {
        let floorplan_id = event.floorplan_id;
        let message = HubMessage::Vote(Arc::new(event));

        let mut floorplans = self.floorplans.write().await;
        let Some(subscribers) = floorplans.get_mut(&floorplan_id) else {
            return 0;
        };

        let before = subscribers.len();
        subscribers.retain(|id, tx| match tx.send(message.clone()) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(floorplan_id, subscriber_id = *id, "Dropping closed subscriber");
                false
            }
        });
        let delivered = subscribers.len();
        if subscribers.is_empty() {
            floorplans.remove(&floorplan_id);
        }

        tracing::debug!(
            floorplan_id,
            delivered,
            dropped = before - delivered,
            "Vote broadcast"
        );
        delivered
    }

    /// Queue a keep-alive for every subscriber of every floor-plan.
    pub async fn ping_all(&self) {
        let floorplans = self.floorplans.read().await;
        for subscribers in floorplans.values() {
            for tx in subscribers.values() {
                let _ = tx.send(HubMessage::Ping);
            }
        }
    }

    /// Number of live subscribers for one floor-plan.
    pub async fn subscriber_count(&self, floorplan_id: DbId) -> usize {
        self.floorplans
            .read()
            .await
            .get(&floorplan_id)
            .map_or(0, HashMap::len)
    }

    /// Number of live subscribers across all floor-plans.
    pub async fn total_subscribers(&self) -> usize {
        self.floorplans.read().await.values().map(HashMap::len).sum()
    }

    /// Send `Close` to every subscriber, then forget them all.
    pub async fn shutdown_all(&self) {
        let mut floorplans = self.floorplans.write().await;
        let mut count = 0;
        for subscribers in floorplans.values() {
            for tx in subscribers.values() {
                let _ = tx.send(HubMessage::Close);
                count += 1;
            }
        }
        floorplans.clear();
        tracing::info!(count, "Closed all vote subscribers");
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn broadcast(floorplan_id: DbId, id: DbId) -> VoteBroadcast {
        VoteBroadcast {
            floorplan_id,
            vote: PublicVote {
                id,
                x: 10,
                y: 20,
                value: 1,
                created_at: Utc.with_ymd_and_hms(2025, 8, 20, 12, 0, 0).unwrap(),
            },
        }
    }

    fn vote_id(message: HubMessage) -> DbId {
        match message {
            HubMessage::Vote(v) => v.vote.id,
            other => panic!("expected a vote, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn single_subscriber_receives_published_vote() {
        let hub = BroadcastHub::new();
        let mut sub = hub.subscribe(1).await;

        assert_eq!(hub.publish(broadcast(1, 42)).await, 1);

        assert_eq!(vote_id(sub.recv().await.unwrap()), 42);
    }

    #[tokio::test]
    async fn publish_only_reaches_the_same_floorplan() {
        let hub = BroadcastHub::new();
        let mut one = hub.subscribe(1).await;
        let mut two = hub.subscribe(2).await;

        hub.publish(broadcast(1, 7)).await;

        assert_eq!(vote_id(one.recv().await.unwrap()), 7);
        assert!(two.try_recv().is_none());
    }

    #[tokio::test]
    async fn every_subscriber_gets_every_vote_once_in_order() {
        let hub = BroadcastHub::new();
        let mut subs = Vec::new();
        for _ in 0..5 {
            subs.push(hub.subscribe(1).await);
        }

        for id in 1..=20 {
            assert_eq!(hub.publish(broadcast(1, id)).await, 5);
        }

        for sub in subs.iter_mut() {
            let received: Vec<DbId> = (0..20)
                .map(|_| vote_id(sub.try_recv().expect("queued vote")))
                .collect();
            assert_eq!(received, (1..=20).collect::<Vec<_>>());
            assert!(sub.try_recv().is_none());
        }
    }

    #[tokio::test]
    async fn unsubscribed_subscriber_gets_nothing_further() {
        let hub = BroadcastHub::new();
        let mut leaving = hub.subscribe(1).await;
        let mut staying = hub.subscribe(1).await;

        hub.publish(broadcast(1, 1)).await;
        assert!(hub.unsubscribe(1, leaving.id()).await);
        assert_eq!(hub.publish(broadcast(1, 2)).await, 1);

        assert_eq!(vote_id(leaving.recv().await.unwrap()), 1);
        assert!(leaving.recv().await.is_none());

        assert_eq!(vote_id(staying.recv().await.unwrap()), 1);
        assert_eq!(vote_id(staying.recv().await.unwrap()), 2);
    }

    #[tokio::test]
    async fn dropped_subscriber_is_pruned_without_affecting_others() {
        let hub = BroadcastHub::new();
        let gone = hub.subscribe(1).await;
        let mut alive = hub.subscribe(1).await;
        drop(gone);

        assert_eq!(hub.publish(broadcast(1, 3)).await, 1);
        assert_eq!(hub.subscriber_count(1).await, 1);
        assert_eq!(vote_id(alive.recv().await.unwrap()), 3);
    }

    #[tokio::test]
    async fn unsubscribe_twice_is_noop() {
        let hub = BroadcastHub::new();
        let sub = hub.subscribe(1).await;
        assert!(hub.unsubscribe(1, sub.id()).await);
        assert!(!hub.unsubscribe(1, sub.id()).await);
        assert_eq!(hub.total_subscribers().await, 0);
    }

    #[tokio::test]
    async fn publish_without_subscribers_returns_zero() {
        let hub = BroadcastHub::new();
        assert_eq!(hub.publish(broadcast(9, 1)).await, 0);
    }

    #[tokio::test]
    async fn concurrent_publishers_produce_one_order_for_all_subscribers() {
        let hub = Arc::new(BroadcastHub::new());
        let mut a = hub.subscribe(1).await;
        let mut b = hub.subscribe(1).await;

        let tasks: Vec<_> = (1..=50)
            .map(|id| {
                let hub = Arc::clone(&hub);
                tokio::spawn(async move { hub.publish(broadcast(1, id)).await })
            })
            .collect();
        futures::future::join_all(tasks).await;

        let seen_a: Vec<DbId> = (0..50).map(|_| vote_id(a.try_recv().unwrap())).collect();
        let seen_b: Vec<DbId> = (0..50).map(|_| vote_id(b.try_recv().unwrap())).collect();
        assert_eq!(seen_a, seen_b);
        let mut sorted = seen_a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=50).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn ping_and_shutdown_reach_all_subscribers() {
        let hub = BroadcastHub::new();
        let mut one = hub.subscribe(1).await;
        let mut two = hub.subscribe(2).await;

        hub.ping_all().await;
        assert_eq!(one.recv().await, Some(HubMessage::Ping));
        assert_eq!(two.recv().await, Some(HubMessage::Ping));

        hub.shutdown_all().await;
        assert_eq!(one.recv().await, Some(HubMessage::Close));
        assert!(one.recv().await.is_none());
        assert_eq!(two.recv().await, Some(HubMessage::Close));
        assert_eq!(hub.total_subscribers().await, 0);
    }

    #[test]
    fn broadcast_payload_is_flat_json_without_identity() {
        let json = serde_json::to_value(broadcast(1, 5)).unwrap();
        assert_eq!(json["floorplan_id"], 1);
        assert_eq!(json["id"], 5);
        assert_eq!(json["value"], 1);
        assert!(json.get("visitor_id").is_none());
    }
}
