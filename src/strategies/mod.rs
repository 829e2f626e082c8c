pub mod daily_entry;
pub mod signals;
