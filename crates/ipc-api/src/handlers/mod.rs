pub mod admin;
pub mod health;
pub mod ipc;
pub mod rent;

pub use admin::*;
pub use health::*;
pub use ipc::*;
pub use rent::*;
