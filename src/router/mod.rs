pub mod contacts;
pub mod metrics;
pub mod users;
