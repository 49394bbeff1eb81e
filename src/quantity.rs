pub mod rate;
pub mod temperature;
