/// One-shot timer primitives provided by the host.
///
/// Implementations never fire a callback synchronously from `schedule_once`, and all callbacks run
/// on the thread that owns the timer.
pub trait Timer {
    type Handle;

    /// Current time in milliseconds. Only differences between readings are meaningful.
    fn now(&self) -> u64;

    /// Runs `callback` once, no earlier than `delay` milliseconds from now.
    fn schedule_once(&self, delay: u64, callback: Box<dyn FnOnce()>) -> Self::Handle;

    /// Cancels a pending callback. Cancelling one that already fired or was cancelled does nothing.
    fn cancel(&self, handle: Self::Handle);
}
