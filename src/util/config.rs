use crate::core::constant::{
    HUB_CAPACITY, MAILBOX_CAPACITY, PING_INTERVAL_SECS, ROOM_CLEANUP_INTERVAL_SECS,
    ROOM_INACTIVE_DAYS,
};
use std::{env, str::FromStr};

// ========================// Config //======================== //

/// Configure of the App
#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub mailbox_capacity: usize,
    pub hub_capacity: usize,
    pub ping_interval_secs: u64,
    pub room_cleanup_interval_secs: u64,
    pub room_inactive_days: i64,
}

impl Config {
    /// Initialize the Config from env
    pub fn from_env() -> Config {
        let server_addr = env::var("SERVER_ADDR").unwrap_or("127.0.0.1:8081".to_owned());
        let database_url = env::var("DATABASE_URL").expect("failed to parse DATABASE_URL");

        Config {
            server_addr,
            database_url,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 16),
            mailbox_capacity: parse_or("MAILBOX_CAPACITY", MAILBOX_CAPACITY),
            hub_capacity: parse_nonzero("HUB_CAPACITY", HUB_CAPACITY),
            ping_interval_secs: parse_nonzero("PING_INTERVAL_SECS", PING_INTERVAL_SECS),
            room_cleanup_interval_secs: parse_nonzero(
                "ROOM_CLEANUP_INTERVAL_SECS",
                ROOM_CLEANUP_INTERVAL_SECS,
            ),
            room_inactive_days: parse_or("ROOM_INACTIVE_DAYS", ROOM_INACTIVE_DAYS),
        }
    }
}

/// Read an optional variable, falling back to `default` when it is unset
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("failed to parse {}", key)),
        Err(_) => default,
    }
}

/// Like `parse_or`, but zero is rejected as well
fn parse_nonzero<T: FromStr + Default + PartialEq>(key: &str, default: T) -> T {
    let value = parse_or(key, default);
    if value == T::default() {
        panic!("{} must be greater than zero", key);
    }
    value
}
