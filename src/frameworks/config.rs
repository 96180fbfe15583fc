use crate::domain::ArenaTuning;
use std::{env, str::FromStr, time::Duration};

// Runtime/server settings from the environment; unset or unparsable values use defaults.

pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

const DEFAULT_TICK_RATE_HZ: u32 = 30;
const DEFAULT_BROADCAST_DELAY_MS: u64 = 200;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(env::var(key).ok().as_deref(), default)
}

fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

// Gameplay distances: NaN, infinities and negatives fall back to the default.
fn distance_or(raw: Option<&str>, default: f32) -> f32 {
    raw.and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(default)
}

fn env_distance_or(key: &str, default: f32) -> f32 {
    distance_or(env::var(key).ok().as_deref(), default)
}

pub fn http_host() -> String {
    env::var("GAME_SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

pub fn http_port() -> u16 {
    env_or("GAME_SERVER_PORT", 8080)
}

pub fn tick_interval() -> Duration {
    interval_for_rate(env_or("TICK_RATE_HZ", DEFAULT_TICK_RATE_HZ))
}

// `tokio::time::interval` panics on a zero period, which very high rates round down to.
fn interval_for_rate(hz: u32) -> Duration {
    let default = Duration::from_secs_f64(1.0 / f64::from(DEFAULT_TICK_RATE_HZ));
    if hz == 0 {
        return default;
    }
    match Duration::from_secs_f64(1.0 / f64::from(hz)) {
        interval if interval.is_zero() => default,
        interval => interval,
    }
}

pub fn broadcast_delay() -> Duration {
    Duration::from_millis(env_or("BROADCAST_DELAY_MS", DEFAULT_BROADCAST_DELAY_MS))
}

pub fn arena_tuning() -> ArenaTuning {
    let defaults = ArenaTuning::default();
    ArenaTuning {
        arena_size: env_distance_or("ARENA_SIZE", defaults.arena_size),
        player_speed: env_distance_or("PLAYER_SPEED", defaults.player_speed),
        player_size: env_distance_or("PLAYER_SIZE", defaults.player_size),
        coin_radius: env_distance_or("COIN_RADIUS", defaults.coin_radius),
        coin_count: env_or("COIN_COUNT", defaults.coin_count),
        coin_spawn_margin: env_distance_or("COIN_SPAWN_MARGIN", defaults.coin_spawn_margin),
    }
}
