pub mod common;
pub mod dump;
pub mod info;
pub mod verify;
