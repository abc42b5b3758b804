pub mod analytics;
pub mod audit;
pub mod dispatch;
pub mod key_result;
pub mod objective;
pub mod schema;
pub mod shared;
