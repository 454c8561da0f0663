/// Elapsed-time bookkeeping over explicit `now` readings in milliseconds.
///
/// A running segment is represented by `start_time` alone, so the clock cannot be running
/// without a segment start.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Clock {
    start_time: Option<u64>,
    previous_elapsed: u64,
    started: bool,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Opens a running segment. Returns `false` if one was already open.
    pub fn start(&mut self, now: u64) -> bool {
        if self.is_running() {
            return false;
        }
        self.start_time = Some(now);
        self.started = true;
        true
    }

    /// Closes the running segment and folds it into the accumulated time.
    pub fn pause(&mut self, now: u64) -> bool {
        if !self.is_running() {
            return false;
        }
        self.previous_elapsed = self.elapsed(now);
        self.start_time = None;
        true
    }

    pub fn stop(&mut self, now: u64) {
        self.pause(now);
        self.previous_elapsed = 0;
        self.started = false;
    }

    pub fn elapsed(&self, now: u64) -> u64 {
        let current = match self.start_time {
            Some(start_time) => now.saturating_sub(start_time),
            None => 0,
        };
        current + self.previous_elapsed
    }

    /// Overwrites the accumulated time. Ignored while running.
    pub fn seed(&mut self, elapsed: u64) -> bool {
        if self.is_running() {
            return false;
        }
        self.previous_elapsed = elapsed;
        true
    }
}
