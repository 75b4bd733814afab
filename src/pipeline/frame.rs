//! Rendering frames.
//!
//! After inserting a layout the engine waits one frame so the layout has
//! rendered its slot before the next lookup. Hosts with a real frame clock
//! plug it in through [`FrameScheduler`]; the default simply yields once to
//! the executor, which is enough for synchronous `connected` callbacks and
//! still lets other navigations interleave.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;

pub trait FrameScheduler {
    /// Resolves at the start of the next frame.
    fn next_frame(&self) -> LocalBoxFuture<'static, ()>;
}

/// Frame scheduler that yields to the executor once per frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct YieldFrames;

impl FrameScheduler for YieldFrames {
    fn next_frame(&self) -> LocalBoxFuture<'static, ()> {
        Box::pin(YieldOnce { yielded: false })
    }
}

/// Pending on the first poll (waking itself), ready on the second.
#[derive(Debug)]
pub struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::FutureExt;

    #[test]
    fn test_yield_once_is_pending_first() {
        let mut frame = YieldFrames.next_frame();
        assert!((&mut frame).now_or_never().is_none());
        assert!(frame.now_or_never().is_some());
    }

    #[test]
    fn test_completes_under_executor() {
        block_on(YieldFrames.next_frame());
    }
}
