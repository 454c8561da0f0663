use crate::{aligned_delay, format_duration, parse_start_time, Callback, Clock, Error, Scheduler, Timer};
use log::debug;
use serde::Serialize;
use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

pub const DEFAULT_RESOLUTION: u64 = 1000;

struct State<H> {
    clock: Clock,
    scheduler: Scheduler<H>,
}

struct Shared<T: Timer> {
    timer: T,
    state: RefCell<State<T::Handle>>,
}

impl<T: Timer> Drop for Shared<T> {
    fn drop(&mut self) {
        self.state.get_mut().scheduler.cancel_all(&self.timer);
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Snapshot {
    pub elapsed: u64,
    pub display: String,
    pub running: bool,
    pub started: bool,
    pub registrations: usize,
}

/// Elapsed-time tracker with drift-corrected periodic ticks.
///
/// Clones share the same stopwatch. Tick callbacks run on the timer's thread and may call back into
/// the stopwatch, for example to pause it.
pub struct Stopwatch<T: Timer> {
    shared: Rc<Shared<T>>,
}

impl<T: Timer> Clone for Stopwatch<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

/// Non-owning handle, for tick callbacks that need to read the stopwatch they are registered on.
pub struct WeakStopwatch<T: Timer> {
    shared: Weak<Shared<T>>,
}

impl<T: Timer> Clone for WeakStopwatch<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Timer> WeakStopwatch<T> {
    pub fn upgrade(&self) -> Option<Stopwatch<T>> {
        self.shared.upgrade().map(|shared| Stopwatch { shared })
    }
}

impl<T: Timer + 'static> Stopwatch<T> {
    pub fn new(timer: T) -> Self {
        Self {
            shared: Rc::new(Shared {
                timer,
                state: RefCell::new(State {
                    clock: Clock::new(),
                    scheduler: Scheduler::new(),
                }),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakStopwatch<T> {
        WeakStopwatch {
            shared: Rc::downgrade(&self.shared),
        }
    }

    fn now(&self) -> u64 {
        self.shared.timer.now()
    }

    fn fire_factory(&self) -> impl Fn(u64, u64) -> Box<dyn FnOnce()> {
        let shared = Rc::downgrade(&self.shared);
        move |id, epoch| -> Box<dyn FnOnce()> {
            let shared = shared.clone();
            Box::new(move || {
                if let Some(shared) = shared.upgrade() {
                    Stopwatch { shared }.fire(id, epoch);
                }
            })
        }
    }

    fn fire(&self, id: u64, epoch: u64) {
        let callback = {
            let mut state = self.shared.state.borrow_mut();
            if !state.clock.is_running() {
                return;
            }
            match state.scheduler.begin_fire(id, epoch) {
                Some(callback) => callback,
                None => return,
            }
        };
        (&mut *callback.borrow_mut())();
        let fire = self.fire_factory();
        let mut state = self.shared.state.borrow_mut();
        let state = &mut *state;
        if state.clock.is_running() {
            let elapsed = state.clock.elapsed(self.now());
            state.scheduler.finish_fire(&self.shared.timer, id, epoch, elapsed, &fire);
        }
    }

    /// Starts or resumes counting and re-anchors every tick registration. Does nothing if running.
    pub fn start(&self) {
        let fire = self.fire_factory();
        let mut state = self.shared.state.borrow_mut();
        let state = &mut *state;
        let now = self.now();
        if !state.clock.start(now) {
            return;
        }
        let elapsed = state.clock.elapsed(now);
        debug!("stopwatch started at {}", format_duration(elapsed));
        state.scheduler.reanchor_all(&self.shared.timer, elapsed, &fire);
    }

    /// Stops counting and cancels every pending tick. Registrations are kept for the next `start`.
    pub fn pause(&self) {
        let mut state = self.shared.state.borrow_mut();
        let state = &mut *state;
        if !state.clock.is_running() {
            return;
        }
        let now = self.now();
        state.scheduler.cancel_all(&self.shared.timer);
        state.clock.pause(now);
        debug!("stopwatch paused at {}", format_duration(state.clock.elapsed(now)));
    }

    /// Pauses and resets the elapsed time to zero.
    pub fn stop(&self) {
        self.pause();
        let mut state = self.shared.state.borrow_mut();
        let state = &mut *state;
        state.clock.stop(self.now());
        state.scheduler.reset_all();
    }

    pub fn elapsed(&self) -> u64 {
        self.shared.state.borrow().clock.elapsed(self.now())
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.borrow().clock.is_running()
    }

    pub fn is_started(&self) -> bool {
        self.shared.state.borrow().clock.is_started()
    }

    /// Seeds the elapsed time from an `HH:MM:SS` string without starting the stopwatch.
    /// Ignored while running.
    pub fn set_start_time(&self, time_string: &str) -> Result<(), Error> {
        let mut state = self.shared.state.borrow_mut();
        let state = &mut *state;
        if state.clock.is_running() {
            return Ok(());
        }
        let elapsed = parse_start_time(time_string)?;
        state.clock.seed(elapsed);
        state.scheduler.rebase_all(elapsed);
        Ok(())
    }

    /// Registers `callback` to run every `resolution` milliseconds of elapsed time.
    ///
    /// On a stopwatch that is running with a non-zero elapsed time, the first tick lands on the next
    /// multiple of `resolution`, unless `fire_immediately` is set, in which case the cadence starts
    /// at the moment of subscription. On a stopped stopwatch the registration waits for `start`.
    pub fn subscribe(&self, callback: impl FnMut() + 'static, resolution: u64, fire_immediately: bool) -> Result<(), Error> {
        if resolution == 0 {
            return Err(Error::InvalidResolution);
        }
        let callback: Callback = Rc::new(RefCell::new(callback));
        let fire = self.fire_factory();
        let mut state = self.shared.state.borrow_mut();
        let state = &mut *state;
        let elapsed = state.clock.elapsed(self.now());
        if !state.clock.is_running() {
            state.scheduler.register(callback, resolution, elapsed + resolution);
        } else if fire_immediately || elapsed == 0 {
            let id = state.scheduler.register(callback, resolution, elapsed + resolution);
            state.scheduler.arm(&self.shared.timer, id, elapsed, &fire);
        } else {
            let next_boundary = elapsed + aligned_delay(elapsed, resolution);
            let id = state.scheduler.register(callback, resolution, next_boundary);
            state.scheduler.arm(&self.shared.timer, id, elapsed, &fire);
        }
        Ok(())
    }

    /// Ticks every second, aligned to whole seconds of elapsed time.
    pub fn on_tick(&self, callback: impl FnMut() + 'static) -> Result<(), Error> {
        self.subscribe(callback, DEFAULT_RESOLUTION, false)
    }

    pub fn registrations(&self) -> usize {
        self.shared.state.borrow().scheduler.len()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.shared.state.borrow();
        let elapsed = state.clock.elapsed(self.now());
        Snapshot {
            elapsed,
            display: format_duration(elapsed),
            running: state.clock.is_running(),
            started: state.clock.is_started(),
            registrations: state.scheduler.len(),
        }
    }
}

impl<T: Timer + 'static> fmt::Display for Stopwatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format_duration(self.elapsed()))
    }
}
