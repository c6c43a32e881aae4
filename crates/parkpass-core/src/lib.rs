pub mod adapter;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod html;
pub mod orders;
pub mod parser;
pub mod paths;
pub mod registry;
pub mod session;
pub mod store;
pub mod types;

pub use error::{ParkpassError, Result};
pub use store::Store;
