use async_trait::async_trait;
use tokio::sync::watch;

use crate::errors::{ReticleError, ReticleResult};
use crate::scan::traits::FrameSource;
use crate::scan::types::Frame;

/// Create a keep-only-latest frame conduit.
///
/// The handle side overwrites a single slot; the feed side waits for a change
/// and hands out whatever is newest. A producer running faster than the
/// analyzer drops intermediate frames instead of queueing them, so the
/// overlay always tracks the live picture.
pub fn frame_feed() -> (FrameHandle, FrameFeed) {
    let (tx, rx) = watch::channel(None);
    (FrameHandle { tx }, FrameFeed { rx })
}

/// Producer half: push frames from the capture callback.
#[derive(Clone)]
pub struct FrameHandle {
    tx: watch::Sender<Option<Frame>>,
}

impl FrameHandle {
    /// Replace the pending frame. Fails once the feed half is gone.
    pub fn publish(&self, frame: Frame) -> ReticleResult<()> {
        self.tx
            .send(Some(frame))
            .map_err(|_| ReticleError::Source("frame feed closed".into()))
    }
}

/// Consumer half: a [`FrameSource`] yielding the most recent frame.
pub struct FrameFeed {
    rx: watch::Receiver<Option<Frame>>,
}

#[async_trait]
impl FrameSource for FrameFeed {
    async fn next_frame(&mut self) -> ReticleResult<Option<Frame>> {
        loop {
            match self.rx.changed().await {
                // The slot starts out empty; only hand out real frames.
                Ok(()) => {
                    if let Some(frame) = self.rx.borrow().clone() {
                        return Ok(Some(frame));
                    }
                }
                Err(_) => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tag: u8) -> Frame {
        Frame::new(vec![tag], 100, 100, 0)
    }

    #[tokio::test]
    async fn slow_consumer_sees_only_newest_frame() {
        let (handle, mut feed) = frame_feed();
        handle.publish(frame(1)).unwrap();
        handle.publish(frame(2)).unwrap();
        handle.publish(frame(3)).unwrap();

        let got = feed.next_frame().await.unwrap().unwrap();
        assert_eq!(got.data, vec![3]);
    }

    #[tokio::test]
    async fn stream_ends_when_handle_drops() {
        let (handle, mut feed) = frame_feed();
        handle.publish(frame(7)).unwrap();
        drop(handle);

        // The unobserved frame is still delivered before the end-of-stream.
        assert!(feed.next_frame().await.unwrap().is_some());
        assert!(feed.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn publish_fails_after_feed_drops() {
        let (handle, feed) = frame_feed();
        drop(feed);
        let err = handle.publish(frame(1)).unwrap_err();
        assert!(matches!(err, ReticleError::Source(_)));
    }
}
