use std::{future::Future, io};
use tokio::{
    runtime::{Builder, Runtime},
    task::LocalSet,
};

/// Single-threaded runtime for stopwatches on the tokio host. Everything spawned by `TokioTimer`
/// lands on the same thread through the `LocalSet`.
#[derive(Debug)]
pub struct Executor {
    runtime: Runtime,
    local: LocalSet,
}

impl Executor {
    pub fn new() -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_time().build()?;
        Ok(Self {
            runtime,
            local: LocalSet::new(),
        })
    }

    pub fn run<F: Future>(&self, future: F) -> F::Output {
        self.local.block_on(&self.runtime, future)
    }
}
