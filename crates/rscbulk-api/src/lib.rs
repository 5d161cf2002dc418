// rscbulk-api: Async Rust client for the RSC management API

pub mod account;
pub mod client;
pub mod cloud;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use client::{DEFAULT_USERNAME, RscClient};
pub use error::Error;
pub use models::{BindingTicket, CloudAccess, TaskMonitor, TaskPhase};
pub use transport::{TlsMode, TransportConfig};
