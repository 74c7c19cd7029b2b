// ── Mirror subscriptions ──
//
// Handle over a collection's state channel. Consumers that redraw on
// change (a terminal table, a UI) hold one of these instead of polling.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use serde_json::Value;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::crud::CrudState;

/// Subscription to a [`CrudCollection`](crate::CrudCollection).
pub struct MirrorStream {
    current: CrudState,
    receiver: watch::Receiver<CrudState>,
}

impl MirrorStream {
    pub(crate) fn new(receiver: watch::Receiver<CrudState>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// State captured at creation, or at the last `changed()`.
    pub fn current(&self) -> &CrudState {
        &self.current
    }

    /// Latest state, which may be newer than `current()`.
    pub fn latest(&self) -> CrudState {
        self.receiver.borrow().clone()
    }

    /// Mirror records of the latest state.
    pub fn items(&self) -> Arc<Vec<Value>> {
        Arc::clone(&self.receiver.borrow().items)
    }

    /// Wait for the next change. `None` once the collection is gone.
    pub async fn changed(&mut self) -> Option<CrudState> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> MirrorWatchStream {
        MirrorWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` of collection states, starting with the current one.
pub struct MirrorWatchStream {
    inner: WatchStream<CrudState>,
}

impl Stream for MirrorWatchStream {
    type Item = CrudState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
