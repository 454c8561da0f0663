use crate::Timer;
use log::{debug, trace};
use std::{cell::RefCell, rc::Rc};

pub type Callback = Rc<RefCell<dyn FnMut()>>;

/// Builds the host callback for a registration id and schedule epoch.
pub type Fire<'a> = &'a dyn Fn(u64, u64) -> Box<dyn FnOnce()>;

/// Delay from `elapsed` to the next multiple of `resolution`.
pub fn aligned_delay(elapsed: u64, resolution: u64) -> u64 {
    resolution - elapsed % resolution
}

/// First point of the grid through `boundary` that lies strictly after `elapsed`.
pub fn first_boundary_after(boundary: u64, elapsed: u64, resolution: u64) -> u64 {
    let offset = if boundary > elapsed {
        (boundary - elapsed) % resolution
    } else {
        (resolution - (elapsed - boundary) % resolution) % resolution
    };
    elapsed + if offset == 0 { resolution } else { offset }
}

/// Moves an overdue boundary forward to the first grid point at or after `elapsed`.
/// Returns the boundary and the number of grid points skipped.
pub fn catch_up(boundary: u64, elapsed: u64, resolution: u64) -> (u64, u64) {
    if boundary >= elapsed {
        return (boundary, 0);
    }
    let skipped = (elapsed - boundary + resolution - 1) / resolution;
    (boundary + skipped * resolution, skipped)
}

struct Registration<H> {
    id: u64,
    callback: Callback,
    resolution: u64,
    next_boundary: u64,
    pending: Option<H>,
    epoch: u64,
}

impl<H> Registration<H> {
    fn cancel<T: Timer<Handle = H>>(&mut self, timer: &T) {
        if let Some(handle) = self.pending.take() {
            timer.cancel(handle);
        }
        self.epoch += 1;
    }

    fn schedule<T: Timer<Handle = H>>(&mut self, timer: &T, elapsed: u64, fire: Fire) {
        self.cancel(timer);
        let delay = self.next_boundary.saturating_sub(elapsed);
        trace!("tick {} scheduled in {} ms for boundary {}", self.id, delay, self.next_boundary);
        self.pending = Some(timer.schedule_once(delay, fire(self.id, self.epoch)));
    }
}

/// Tick registrations and their pending host schedules.
///
/// Boundaries are kept on the stopwatch's logical clock (elapsed milliseconds), so every delay
/// handed to the host is derived from a fixed grid rather than from the previous fire.
pub struct Scheduler<H> {
    registrations: Vec<Registration<H>>,
    next_id: u64,
}

impl<H> Scheduler<H> {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.registrations.iter().filter(|registration| registration.pending.is_some()).count()
    }

    fn find_mut(&mut self, id: u64) -> Option<&mut Registration<H>> {
        self.registrations.iter_mut().find(|registration| registration.id == id)
    }

    pub fn register(&mut self, callback: Callback, resolution: u64, next_boundary: u64) -> u64 {
        assert!(resolution > 0);
        let id = self.next_id;
        self.next_id += 1;
        self.registrations.push(Registration {
            id,
            callback,
            resolution,
            next_boundary,
            pending: None,
            epoch: 0,
        });
        id
    }

    pub fn arm<T: Timer<Handle = H>>(&mut self, timer: &T, id: u64, elapsed: u64, fire: Fire) {
        if let Some(registration) = self.find_mut(id) {
            registration.schedule(timer, elapsed, fire);
        }
    }

    /// Replaces every pending schedule with one aimed at the registration's next boundary.
    pub fn reanchor_all<T: Timer<Handle = H>>(&mut self, timer: &T, elapsed: u64, fire: Fire) {
        for registration in &mut self.registrations {
            registration.schedule(timer, elapsed, fire);
        }
        debug!("re-anchored {} tick registrations at {} ms", self.registrations.len(), elapsed);
    }

    pub fn cancel_all<T: Timer<Handle = H>>(&mut self, timer: &T) {
        for registration in &mut self.registrations {
            registration.cancel(timer);
        }
    }

    /// Moves every registration to the first point of its grid after a rewritten `elapsed`.
    pub fn rebase_all(&mut self, elapsed: u64) {
        for registration in &mut self.registrations {
            registration.next_boundary = first_boundary_after(registration.next_boundary, elapsed, registration.resolution);
        }
        debug!("rebased {} tick registrations onto {} ms", self.registrations.len(), elapsed);
    }

    /// Restarts every cadence from a zeroed clock.
    pub fn reset_all(&mut self) {
        for registration in &mut self.registrations {
            registration.next_boundary = registration.resolution;
        }
    }

    /// Claims a fire for delivery. Returns `None` for stale fires, otherwise records the boundary
    /// as delivered and hands back the callback to invoke.
    pub fn begin_fire(&mut self, id: u64, epoch: u64) -> Option<Callback> {
        let registration = self.find_mut(id)?;
        if registration.epoch != epoch || registration.pending.is_none() {
            trace!("dropping stale fire for tick {}", id);
            return None;
        }
        registration.pending = None;
        registration.next_boundary += registration.resolution;
        Some(registration.callback.clone())
    }

    /// Schedules the boundary after a delivered fire, unless the callback re-anchored or
    /// cancelled the registration in the meantime.
    pub fn finish_fire<T: Timer<Handle = H>>(&mut self, timer: &T, id: u64, epoch: u64, elapsed: u64, fire: Fire) {
        let registration = match self.find_mut(id) {
            Some(registration) if registration.epoch == epoch && registration.pending.is_none() => registration,
            _ => return,
        };
        let (next_boundary, skipped) = catch_up(registration.next_boundary, elapsed, registration.resolution);
        if skipped > 0 {
            debug!("tick {} fell {} boundaries behind, skipping to {}", id, skipped, next_boundary);
        }
        registration.next_boundary = next_boundary;
        registration.schedule(timer, elapsed, fire);
    }
}

impl<H> Default for Scheduler<H> {
    fn default() -> Self {
        Self::new()
    }
}
