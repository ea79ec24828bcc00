pub mod channel;
pub mod identity;
