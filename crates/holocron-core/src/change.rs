//! Change notifications.
//!
//! Every committed import publishes exactly one [`ChangeBatch`]. Subscribers
//! receive a live feed: batches published before they subscribed are never
//! replayed, and each subscriber's queue is unbounded so nothing published
//! after subscription is lost. Closing the notifier ends every stream.

use std::{
  pin::Pin,
  sync::{Arc, Mutex, PoisonError},
  task::{Context, Poll},
};

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::entity::EntityKind;

/// The entity kinds touched by one import, in fixed kind order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
  pub entities: Vec<EntityKind>,
}

impl ChangeBatch {
  pub fn new(entities: Vec<EntityKind>) -> Self { Self { entities } }

  pub fn contains(&self, kind: EntityKind) -> bool { self.entities.contains(&kind) }
}

// ─── Notifier ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Subscribers {
  senders: Vec<UnboundedSender<ChangeBatch>>,
  closed:  bool,
}

/// Fan-out publisher for change batches.
///
/// Cloning is cheap; all clones share one subscriber list.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
  inner: Arc<Mutex<Subscribers>>,
}

impl ChangeNotifier {
  pub fn new() -> Self { Self::default() }

  /// Register a new subscriber. After [`close`](Self::close) the returned
  /// stream is already finished.
  pub fn subscribe(&self) -> ChangeStream {
    let (tx, rx) = unbounded_channel();
    let mut subs = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
    if !subs.closed {
      subs.senders.push(tx);
    }
    ChangeStream { rx }
  }

  /// Deliver `batch` to every live subscriber and return how many got it.
  /// Subscribers whose stream was dropped are pruned.
  pub fn publish(&self, batch: ChangeBatch) -> usize {
    let mut subs = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
    if subs.closed {
      return 0;
    }
    subs.senders.retain(|tx| tx.send(batch.clone()).is_ok());
    tracing::debug!(
      subscribers = subs.senders.len(),
      entities = ?batch.entities,
      "published change batch"
    );
    subs.senders.len()
  }

  /// End every stream. Returns `false` if the notifier was already closed.
  pub fn close(&self) -> bool {
    let mut subs = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
    if subs.closed {
      return false;
    }
    subs.closed = true;
    subs.senders.clear();
    true
  }

  pub fn is_closed(&self) -> bool {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner).closed
  }

  pub fn subscriber_count(&self) -> usize {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner).senders.len()
  }
}

// ─── Stream ──────────────────────────────────────────────────────────────────

/// One subscriber's view of the change feed. Ends (yields `None`) once the
/// notifier is closed and every queued batch has been drained.
pub struct ChangeStream {
  rx: UnboundedReceiver<ChangeBatch>,
}

impl ChangeStream {
  /// Wait for the next batch.
  pub async fn recv(&mut self) -> Option<ChangeBatch> { self.rx.recv().await }
}

impl Stream for ChangeStream {
  type Item = ChangeBatch;

  fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    self.rx.poll_recv(cx)
  }
}

#[cfg(test)]
mod tests {
  use futures::StreamExt as _;

  use super::*;

  fn batch(kinds: &[EntityKind]) -> ChangeBatch { ChangeBatch::new(kinds.to_vec()) }

  #[tokio::test]
  async fn every_subscriber_receives_each_batch() {
    let notifier = ChangeNotifier::new();
    let mut a = notifier.subscribe();
    let mut b = notifier.subscribe();

    assert_eq!(notifier.publish(batch(&[EntityKind::Film])), 2);

    assert_eq!(a.next().await, Some(batch(&[EntityKind::Film])));
    assert_eq!(b.recv().await, Some(batch(&[EntityKind::Film])));
  }

  #[tokio::test]
  async fn late_subscribers_get_no_replay() {
    let notifier = ChangeNotifier::new();
    notifier.publish(batch(&[EntityKind::Planet]));

    let mut late = notifier.subscribe();
    notifier.publish(batch(&[EntityKind::Vehicle]));
    notifier.close();

    assert_eq!(late.next().await, Some(batch(&[EntityKind::Vehicle])));
    assert_eq!(late.next().await, None);
  }

  #[tokio::test]
  async fn close_ends_streams_and_is_idempotent() {
    let notifier = ChangeNotifier::new();
    let mut stream = notifier.subscribe();

    assert!(notifier.close());
    assert!(!notifier.close());
    assert_eq!(stream.next().await, None);

    let mut after = notifier.subscribe();
    assert_eq!(after.next().await, None);
    assert_eq!(notifier.publish(batch(&[EntityKind::Film])), 0);
  }

  #[tokio::test]
  async fn dropped_subscribers_are_pruned() {
    let notifier = ChangeNotifier::new();
    let keep = notifier.subscribe();
    drop(notifier.subscribe());

    assert_eq!(notifier.publish(batch(&[])), 1);
    assert_eq!(notifier.subscriber_count(), 1);
    drop(keep);
  }
}
