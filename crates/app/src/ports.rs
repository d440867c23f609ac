//! Port definitions (traits) that adapters implement.

pub mod gateway;

pub use gateway::GatewayClient;
