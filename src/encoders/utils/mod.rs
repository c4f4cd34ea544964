pub mod packet;
pub mod pull;
pub mod push;
