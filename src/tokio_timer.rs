use crate::Timer;
use tokio::{
    task::{spawn_local, JoinHandle},
    time::{sleep, Duration, Instant},
};

/// Host backed by the tokio time driver.
///
/// Callbacks are spawned with `spawn_local`, so the timer must be driven from inside a
/// `tokio::task::LocalSet`. See `Executor`.
#[derive(Clone, Copy, Debug)]
pub struct TokioTimer {
    origin: Instant,
}

impl TokioTimer {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for TokioTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for TokioTimer {
    type Handle = JoinHandle<()>;

    fn now(&self) -> u64 {
        Instant::now().duration_since(self.origin).as_millis() as u64
    }

    fn schedule_once(&self, delay: u64, callback: Box<dyn FnOnce()>) -> JoinHandle<()> {
        spawn_local(async move {
            sleep(Duration::from_millis(delay)).await;
            callback();
        })
    }

    fn cancel(&self, handle: JoinHandle<()>) {
        handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::TokioTimer;
    use crate::Timer;
    use std::{cell::RefCell, rc::Rc};
    use tokio::{
        task::LocalSet,
        time::{sleep, Duration},
    };

    #[tokio::test(start_paused = true)]
    async fn schedule_and_cancel() {
        LocalSet::new()
            .run_until(async {
                let timer = TokioTimer::new();
                let fired = Rc::new(RefCell::new(Vec::new()));
                for delay in [20, 10] {
                    let fired = fired.clone();
                    timer.schedule_once(delay, Box::new(move || fired.borrow_mut().push(timer.now())));
                }
                let cancelled = {
                    let fired = fired.clone();
                    timer.schedule_once(15, Box::new(move || fired.borrow_mut().push(0)))
                };
                timer.cancel(cancelled);
                sleep(Duration::from_millis(50)).await;
                assert_eq!(*fired.borrow(), vec![10, 20]);
            })
            .await;
    }
}
