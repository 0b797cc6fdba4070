/// Identifies one requested frame so it can be cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Source of render frames, in the shape of `requestAnimationFrame`.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler advanced by its owner: every call to [`take_ready`] hands out
/// the frames requested since the previous call. The terminal event loop
/// calls it once per tick; tests call it to single-step.
///
/// [`take_ready`]: SteppedScheduler::take_ready
#[derive(Debug, Default)]
pub struct SteppedScheduler {
    next_id: u64,
    queued: Vec<FrameHandle>,
}

impl SteppedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_ready(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.queued)
    }

    pub fn pending(&self) -> usize {
        self.queued.len()
    }
}

impl FrameScheduler for SteppedScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.queued.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.queued.retain(|queued| *queued != handle);
    }
}
