pub mod auth;
pub mod channels;
pub mod messages;

#[cfg(test)]
pub mod testing;
