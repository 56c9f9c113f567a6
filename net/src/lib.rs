mod error;
pub mod tcp;

pub use error::Error;
pub use tcp::{probe, Client, Config, Connection, Server};
