/// Number of outbound events a connection may have queued before it is shed
pub const MAILBOX_CAPACITY: usize = 32;
/// Depth of the hub's command queue
pub const HUB_CAPACITY: usize = 1024;
/// Messages returned by one `load_history` request
pub const HISTORY_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_ROOM_PAGE_SIZE: i64 = 20;

pub const PING_INTERVAL_SECS: u64 = 15;
pub const CLOSE_TIMEOUT_SECS: u64 = 5;

pub const ROOM_CLEANUP_INTERVAL_SECS: u64 = 3600;
pub const ROOM_INACTIVE_DAYS: i64 = 7;

pub const DEFAULT_ROOM_ORDER: &str = "created_at desc";
pub const ROOM_ORDERS: [&str; 6] = [
    "created_at desc",
    "created_at asc",
    "last_active_at desc",
    "last_active_at asc",
    "id desc",
    "id asc",
];
