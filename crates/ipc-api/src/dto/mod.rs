pub mod admin;
pub mod ipc;
pub mod query;
pub mod rent;
pub mod response;

pub use admin::*;
pub use ipc::*;
pub use query::*;
pub use rent::*;
pub use response::*;
