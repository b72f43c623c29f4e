use std::thread;
use std::time::{Duration, Instant};

/// Real-time wait used to pace sample emission.
///
/// Offsets are cumulative from [`Pacer::begin`], so per-sample rounding never
/// accumulates into drift.
pub trait Pacer {
    fn begin(&mut self);
    /// Blocks until `offset` has elapsed since `begin`.
    fn wait_until(&mut self, offset: Duration);
}

impl<P: Pacer + ?Sized> Pacer for Box<P> {
    fn begin(&mut self) {
        (**self).begin();
    }

    fn wait_until(&mut self, offset: Duration) {
        (**self).wait_until(offset);
    }
}

/// Blocking pacer backed by `std::thread::sleep`.
#[derive(Debug, Default)]
pub struct ThreadPacer {
    origin: Option<Instant>,
}

impl ThreadPacer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pacer for ThreadPacer {
    fn begin(&mut self) {
        self.origin = Some(Instant::now());
    }

    fn wait_until(&mut self, offset: Duration) {
        let origin = *self.origin.get_or_insert_with(Instant::now);
        let deadline = origin + offset;
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
    }
}

/// Pacer that never blocks and records the requested offsets.
#[derive(Debug, Default)]
pub struct FreeRunningPacer {
    offsets: Vec<Duration>,
}

impl FreeRunningPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offsets(&self) -> &[Duration] {
        &self.offsets
    }
}

impl Pacer for FreeRunningPacer {
    fn begin(&mut self) {
        self.offsets.clear();
    }

    fn wait_until(&mut self, offset: Duration) {
        self.offsets.push(offset);
    }
}
