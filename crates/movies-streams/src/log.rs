use std::borrow::Cow;
use std::fmt::Debug;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tracing::{debug, trace};

/// Stream adapter that traces every signal going through it:
/// `subscribe` on the first poll, `next` per element, `complete` at the end
/// and `cancel` when dropped before completing.
pub struct Logged<S> {
  inner: S,
  label: Cow<'static, str>,
  subscribed: bool,
  completed: bool,
}

impl<S> Logged<S> {
  pub fn new(inner: S, label: impl Into<Cow<'static, str>>) -> Self {
    Self { inner, label: label.into(), subscribed: false, completed: false }
  }
}

impl<S> Stream for Logged<S>
where
  S: Stream + Unpin,
  S::Item: Debug,
{
  type Item = S::Item;

  fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    let this = &mut *self;

    if !this.subscribed {
      this.subscribed = true;
      debug!(label = %this.label, "subscribe");
    }

    match this.inner.poll_next_unpin(cx) {
      Poll::Ready(Some(item)) => {
        trace!(label = %this.label, ?item, "next");
        Poll::Ready(Some(item))
      }
      Poll::Ready(None) => {
        if !this.completed {
          this.completed = true;
          debug!(label = %this.label, "complete");
        }
        Poll::Ready(None)
      }
      Poll::Pending => Poll::Pending,
    }
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    self.inner.size_hint()
  }
}

impl<S> Drop for Logged<S> {
  fn drop(&mut self) {
    if self.subscribed && !self.completed {
      debug!(label = %self.label, "cancel");
    }
  }
}

pub trait LogExt: Stream + Sized {
  fn logged(self, label: impl Into<Cow<'static, str>>) -> Logged<Self> {
    Logged::new(self, label)
  }
}

impl<S: Stream> LogExt for S {}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::operators::from_iter;

  #[tokio::test]
  async fn is_transparent() {
    let out: Vec<_> = from_iter(["alex", "ben"]).logged("names").collect().await;
    assert_eq!(out, vec!["alex", "ben"]);
  }

  #[tokio::test]
  async fn tracks_completion_and_cancel() {
    let mut logged = from_iter(["alex", "ben"]).logged("names");
    assert_eq!(logged.next().await, Some("alex"));
    assert!(logged.subscribed && !logged.completed);
    drop(logged);

    let mut logged = from_iter(Vec::<&str>::new()).logged("empty");
    assert_eq!(logged.next().await, None);
    assert!(logged.completed);
  }
}
