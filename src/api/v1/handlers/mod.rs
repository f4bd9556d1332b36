pub mod channels;
pub mod health;
pub mod me;
pub mod messages;
