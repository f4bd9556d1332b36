pub mod channels;
pub mod me;
pub mod messages;
