pub mod aggregate;
pub mod deriver;
pub mod price;
pub mod schedule;
pub mod ticker;
pub mod time_range;
