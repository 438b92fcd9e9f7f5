pub mod analytics;
pub mod attendance;
pub mod backup;
pub mod common;
pub mod core;
pub mod instructors;
pub mod notices;
pub mod records;
pub mod students;
pub mod views;
