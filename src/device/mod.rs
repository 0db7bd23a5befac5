//! Interfaces to the camera, the display, and time.
//!
//! The pipeline only talks to hardware through these traits. A frame source
//! fills a caller-owned row buffer and raises its [`CompletionSignal`] once
//! per finished transfer; the driver waits on the signal with a bounded
//! timeout. A frame sink accepts whole frames or contiguous pixel runs.

use crate::image::{FrameView, Geometry};
use crate::pixel::Rgb565;
use crate::util::CamFilterResult;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub mod memory;
pub mod wire;

pub use memory::{MemorySource, ScreenSink};
pub use wire::WriterSink;

/// One-shot transfer-complete flag shared between a source and the driver.
///
/// Clones share the flag, so an interrupt handler or worker thread can hold
/// one end while the driver waits on the other.
#[derive(Clone, Debug, Default)]
pub struct CompletionSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CompletionSignal {
    /// Creates a lowered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the pending transfer as complete and wakes the waiter.
    pub fn raise(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock() = true;
        cvar.notify_all();
    }

    /// Drops a completion that nobody consumed.
    pub fn clear(&self) {
        let (flag, _) = &*self.inner;
        *flag.lock() = false;
    }

    /// Waits up to `timeout` for [`raise`](Self::raise) and consumes the
    /// completion. Returns `false` on timeout.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let mut guard = flag.lock();
        cvar.wait_while_for(&mut guard, |done| !*done, timeout);
        let done = *guard;
        *guard = false;
        done
    }
}

/// Camera side of the pipeline.
pub trait FrameSource {
    /// Size of the frames this source delivers.
    fn geometry(&self) -> Geometry;

    /// Starts transferring the next sensor row into `dest`.
    ///
    /// Completion is reported through [`completion`](Self::completion), at
    /// most once per call.
    fn start_row_capture(&mut self, dest: &mut [Rgb565]) -> CamFilterResult<()>;

    /// The signal raised when a started transfer finishes.
    fn completion(&self) -> &CompletionSignal;
}

/// Display side of the pipeline.
pub trait FrameSink {
    /// Blits an entire frame.
    fn display_full_frame(&mut self, frame: FrameView<'_>) -> CamFilterResult<()>;

    /// Blits a contiguous run of pixels starting at linear offset
    /// `start_offset` of the display.
    fn display_region(&mut self, pixels: &[Rgb565], start_offset: usize) -> CamFilterResult<()>;
}

/// Millisecond time source for the alarm hold timer.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall-clock time since construction.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Starts counting from now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Clock that only moves when told to; clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading `start_ms`.
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Jumps to `now_ms`.
    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    /// Moves forward by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
