use crate::format_duration;
use std::{fmt::Display, time::Instant};

#[derive(Clone, Copy)]
pub struct Logger {
    origin: Instant,
}

impl Logger {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }

    pub fn log(&self, value: impl Display) {
        let elapsed = self.origin.elapsed().as_millis() as u64;
        println!("{} ({} elapsed)", value, format_duration(elapsed));
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs every `interval`-th event.
#[derive(Clone, Copy)]
pub struct PartialLogger {
    index: usize,
    interval: usize,
    logger: Logger,
}

impl PartialLogger {
    pub fn new(interval: usize, logger: Logger) -> Self {
        Self {
            index: 0,
            interval: interval.max(1),
            logger,
        }
    }

    pub fn log<D: Display>(&mut self, f: impl FnOnce(usize) -> D) {
        if self.index % self.interval == 0 {
            self.logger.log(f(self.index));
        }
        self.index += 1;
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    pub fn count(&self) -> usize {
        self.index
    }
}
