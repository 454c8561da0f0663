use crate::{parse_start_time, DEFAULT_RESOLUTION};
use std::{env, error};

#[derive(Debug, Clone)]
pub struct Configuration {
    resolution: u64,
    start_time: Option<String>,
    fire_immediately: bool,
    run_for: u64,
    pause_at: Option<u64>,
    pause_for: u64,
    log_interval: usize,
}

fn var(key: &str, default: Option<String>) -> Result<String, String> {
    match env::var(key) {
        Ok(value) => Ok(value),
        Err(_) => default.ok_or(format!("Missing {}", key)),
    }
}

fn var_map<T, E: error::Error>(key: &str, mut f: impl FnMut(&str) -> Result<T, E>, default: Option<T>) -> Result<T, String> {
    match var(key, None) {
        Ok(value) => f(&value).map_err(|_| format!("Invalid {} {}", key, value)),
        Err(err) => default.ok_or(err),
    }
}

fn optional_var_map<T, E: error::Error>(key: &str, f: impl FnMut(&str) -> Result<T, E>) -> Result<Option<T>, String> {
    match env::var(key) {
        Ok(_) => var_map(key, f, None).map(Some),
        Err(_) => Ok(None),
    }
}

impl Configuration {
    /// Reads the configuration from the environment.
    pub fn new() -> Result<Self, String> {
        let resolution = var_map("RESOLUTION", |resolution| resolution.parse::<u64>(), Some(DEFAULT_RESOLUTION))?;
        if resolution == 0 {
            return Err("Invalid RESOLUTION 0".to_string());
        }
        let start_time = optional_var_map("START_TIME", |start_time| parse_start_time(start_time).map(|_| start_time.to_string()))?;
        let fire_immediately = var_map("FIRE_IMMEDIATELY", |value| value.parse(), Some(false))?;
        let run_for = var_map("RUN_FOR", |run_for| run_for.parse(), Some(5000))?;
        let pause_at = optional_var_map("PAUSE_AT", |pause_at| pause_at.parse())?;
        let pause_for = var_map("PAUSE_FOR", |pause_for| pause_for.parse(), Some(1000))?;
        let log_interval = var_map("LOG_INTERVAL", |interval| interval.parse(), Some(1))?;
        Ok(Self {
            resolution,
            start_time,
            fire_immediately,
            run_for,
            pause_at,
            pause_for,
            log_interval,
        })
    }

    pub fn resolution(&self) -> u64 {
        self.resolution
    }

    pub fn start_time(&self) -> Option<&str> {
        self.start_time.as_deref()
    }

    pub fn fire_immediately(&self) -> bool {
        self.fire_immediately
    }

    pub fn run_for(&self) -> u64 {
        self.run_for
    }

    /// Pause window within the run, if one is configured and starts before the run ends.
    pub fn pause_window(&self) -> Option<(u64, u64)> {
        self.pause_at.filter(|&pause_at| pause_at < self.run_for).map(|pause_at| (pause_at, self.pause_for))
    }

    pub fn log_interval(&self) -> usize {
        self.log_interval
    }
}
