use std::{env, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("WORLD_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

/// Fixed simulation rate in ticks per second.
pub fn tick_rate_hz() -> u32 {
    env::var("WORLD_TICK_HZ")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_TICK_RATE_HZ)
        .max(1)
}

pub fn tick_interval() -> Duration {
    tick_interval_for(tick_rate_hz())
}

pub fn tick_interval_for(hz: u32) -> Duration {
    Duration::from_secs(1) / hz.max(1)
}

pub const DEFAULT_TICK_RATE_HZ: u32 = 20;
pub const COMMAND_CHANNEL_CAPACITY: usize = 256;
