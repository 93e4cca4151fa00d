use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::fetch::TweetFetcher;
use crate::tweet::{Tweet, TweetId};

/// Messages the hidden relay task understands. A fetch carries its own
/// one-shot reply channel; toast and close are fire-and-forget.
pub enum BridgeRequest {
    FetchTweet {
        id: TweetId,
        reply: oneshot::Sender<Option<Tweet>>,
    },
    ShowToast(String),
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    /// A request is already outstanding. The protocol allows exactly one
    /// in-flight fetch; the caller keeps its trigger disabled while waiting.
    RequestInFlight,
    /// The relay never replied within the deadline.
    Timeout,
    /// The relay shut down before replying.
    Closed,
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::RequestInFlight => f.write_str("a bridge request is already in flight"),
            BridgeError::Timeout => f.write_str("bridge request timed out"),
            BridgeError::Closed => f.write_str("bridge relay is closed"),
        }
    }
}

impl std::error::Error for BridgeError {}

/// The widget side of the bridge. Render and event logic never touch the
/// network; they hand a tweet id to the bridge and await exactly one reply
/// from the hidden relay task that owns the fetcher.
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    fetcher: Arc<dyn TweetFetcher>,
    toast_tx: mpsc::UnboundedSender<String>,
    relay_tx: Mutex<Option<mpsc::UnboundedSender<BridgeRequest>>>,
    in_flight: AtomicBool,
    timeout: Duration,
}

impl Bridge {
    /// `toast_tx` is the user-facing notification channel; relayed
    /// `ShowToast` messages are forwarded onto it.
    pub fn new(
        fetcher: Arc<dyn TweetFetcher>,
        toast_tx: mpsc::UnboundedSender<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                fetcher,
                toast_tx,
                relay_tx: Mutex::new(None),
                in_flight: AtomicBool::new(false),
                timeout,
            }),
        }
    }

    /// Spawn the hidden relay task. Idempotent: a no-op while the relay is
    /// already running. A relay that exited (after `Close`) is respawned.
    pub fn activate(&self) {
        let mut guard = self.inner.relay_tx.lock().expect("bridge lock poisoned");
        let running = guard.as_ref().is_some_and(|tx| !tx.is_closed());
        if running {
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(relay(
            Arc::clone(&self.inner.fetcher),
            rx,
            self.inner.toast_tx.clone(),
        ));
        *guard = Some(tx);
        debug!("bridge relay activated");
    }

    /// Request one tweet through the relay and await the reply.
    ///
    /// Exactly one request may be outstanding; a second call while one is
    /// in flight fails with `RequestInFlight` instead of silently replacing
    /// the first caller's reply handler. The reply is `None` when the fetch
    /// failed or returned nothing; the protocol does not distinguish the
    /// two. A relay that never answers is cut off by the timeout.
    pub async fn request_tweet(&self, id: &TweetId) -> Result<Option<Tweet>, BridgeError> {
        if self.inner.in_flight.swap(true, Ordering::SeqCst) {
            return Err(BridgeError::RequestInFlight);
        }
        let result = self.request_inner(id).await;
        self.inner.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn request_inner(&self, id: &TweetId) -> Result<Option<Tweet>, BridgeError> {
        self.activate();

        // The reply receiver exists before the request is sent, so the
        // answer cannot race past us.
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = BridgeRequest::FetchTweet {
            id: id.clone(),
            reply: reply_tx,
        };

        {
            let guard = self.inner.relay_tx.lock().expect("bridge lock poisoned");
            let tx = guard.as_ref().ok_or(BridgeError::Closed)?;
            tx.send(request).map_err(|_| BridgeError::Closed)?;
        }

        match tokio::time::timeout(self.inner.timeout, reply_rx).await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(_)) => Err(BridgeError::Closed),
            Err(_) => {
                warn!(%id, "bridge request timed out");
                Err(BridgeError::Timeout)
            }
        }
    }

    /// Post a notification through the relay's message channel.
    pub fn show_toast(&self, text: impl Into<String>) {
        self.activate();
        let guard = self.inner.relay_tx.lock().expect("bridge lock poisoned");
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(BridgeRequest::ShowToast(text.into()));
        }
    }

    /// Ask the relay to shut down. Any later request re-activates it.
    pub fn close(&self) {
        let guard = self.inner.relay_tx.lock().expect("bridge lock poisoned");
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(BridgeRequest::Close);
        }
    }
}

/// The hidden relay. Owns the fetcher, holds no state between requests,
/// and replies exactly once per fetch. Fetch errors collapse to a `None`
/// payload here; they never cross the channel as panics.
async fn relay(
    fetcher: Arc<dyn TweetFetcher>,
    mut rx: mpsc::UnboundedReceiver<BridgeRequest>,
    toast_tx: mpsc::UnboundedSender<String>,
) {
    while let Some(request) = rx.recv().await {
        match request {
            BridgeRequest::FetchTweet { id, reply } => {
                let payload = match fetcher.fetch(&id).await {
                    Ok(tweet) => Some(tweet),
                    Err(err) => {
                        warn!(%id, error = %err, "tweet fetch failed");
                        None
                    }
                };
                // The requester may have timed out and dropped its receiver.
                let _ = reply.send(payload);
            }
            BridgeRequest::ShowToast(text) => {
                let _ = toast_tx.send(text);
            }
            BridgeRequest::Close => break,
        }
    }
    debug!("bridge relay stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tweet::{Author, PublicMetrics};
    use anyhow::anyhow;
    use async_trait::async_trait;

    fn sample_tweet() -> Tweet {
        Tweet {
            text: "the bird says hello".to_string(),
            public_metrics: PublicMetrics {
                retweet_count: 10,
                like_count: 200,
                reply_count: 3,
            },
            author: Author {
                name: "Jane Doe".to_string(),
                username: "jane".to_string(),
                verified: true,
                profile_image_uri: None,
            },
        }
    }

    fn id() -> TweetId {
        TweetId::new("1585396100026208257").unwrap()
    }

    struct StaticFetcher(Tweet);

    #[async_trait]
    impl TweetFetcher for StaticFetcher {
        async fn fetch(&self, _id: &TweetId) -> anyhow::Result<Tweet> {
            Ok(self.0.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl TweetFetcher for FailingFetcher {
        async fn fetch(&self, _id: &TweetId) -> anyhow::Result<Tweet> {
            Err(anyhow!("upstream said no"))
        }
    }

    /// Sleeps long enough that only a timeout or a second caller can
    /// observe anything.
    struct SlowFetcher(Duration, Tweet);

    #[async_trait]
    impl TweetFetcher for SlowFetcher {
        async fn fetch(&self, _id: &TweetId) -> anyhow::Result<Tweet> {
            tokio::time::sleep(self.0).await;
            Ok(self.1.clone())
        }
    }

    fn bridge_with(
        fetcher: Arc<dyn TweetFetcher>,
        timeout: Duration,
    ) -> (Bridge, mpsc::UnboundedReceiver<String>) {
        let (toast_tx, toast_rx) = mpsc::unbounded_channel();
        (Bridge::new(fetcher, toast_tx, timeout), toast_rx)
    }

    #[tokio::test]
    async fn test_round_trip_returns_tweet_unchanged() {
        let (bridge, _toasts) =
            bridge_with(Arc::new(StaticFetcher(sample_tweet())), Duration::from_secs(5));

        let tweet = bridge.request_tweet(&id()).await.unwrap().unwrap();
        assert_eq!(tweet, sample_tweet());
    }

    #[tokio::test]
    async fn test_fetch_failure_resolves_to_none() {
        let (bridge, _toasts) = bridge_with(Arc::new(FailingFetcher), Duration::from_secs(5));

        let payload = bridge.request_tweet(&id()).await.unwrap();
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn test_activate_is_idempotent() {
        let (bridge, _toasts) =
            bridge_with(Arc::new(StaticFetcher(sample_tweet())), Duration::from_secs(5));
        bridge.activate();
        bridge.activate();

        assert!(bridge.request_tweet(&id()).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_concurrent_request_is_refused() {
        let (bridge, _toasts) = bridge_with(
            Arc::new(SlowFetcher(Duration::from_secs(2), sample_tweet())),
            Duration::from_secs(30),
        );

        let first = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.request_tweet(&id()).await })
        };
        // Let the first request claim the in-flight slot.
        tokio::task::yield_now().await;

        assert_eq!(
            bridge.request_tweet(&id()).await,
            Err(BridgeError::RequestInFlight)
        );

        // The first caller is unaffected and still resolves.
        let payload = first.await.unwrap().unwrap();
        assert_eq!(payload, Some(sample_tweet()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_relay_times_out() {
        let (bridge, _toasts) = bridge_with(
            Arc::new(SlowFetcher(Duration::from_secs(3600), sample_tweet())),
            Duration::from_secs(20),
        );

        assert_eq!(bridge.request_tweet(&id()).await, Err(BridgeError::Timeout));

        // The in-flight slot is released after a timeout: the next request
        // is admitted rather than refused (and times out the same way).
        assert_eq!(bridge.request_tweet(&id()).await, Err(BridgeError::Timeout));
    }

    #[tokio::test]
    async fn test_show_toast_forwards_to_notification_channel() {
        let (bridge, mut toasts) =
            bridge_with(Arc::new(StaticFetcher(sample_tweet())), Duration::from_secs(5));

        bridge.show_toast("Hello widget");
        assert_eq!(toasts.recv().await.as_deref(), Some("Hello widget"));
    }

    #[tokio::test]
    async fn test_close_then_request_respawns_relay() {
        let (bridge, _toasts) =
            bridge_with(Arc::new(StaticFetcher(sample_tweet())), Duration::from_secs(5));

        bridge.activate();
        bridge.close();
        tokio::task::yield_now().await;

        let tweet = bridge.request_tweet(&id()).await.unwrap();
        assert_eq!(tweet, Some(sample_tweet()));
    }
}
