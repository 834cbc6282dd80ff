mod health;
mod link;

pub use health::health_handler;
pub use link::link_handler;
