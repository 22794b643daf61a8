mod log;

pub use log::{Connection, HistoryLog, HISTORY_FILE, SPEED_DIAL_SLOTS};
