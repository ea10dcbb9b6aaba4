pub mod csrf;
pub mod uploads;
