//! # fritzsync-app
//!
//! Application layer — the synchronization engines and **port definitions**.
//!
//! ## Responsibilities
//! - Define the **gateway port** (trait) that gateway adapters implement
//! - Build the **item registry** once from declarative configuration
//! - Run the **poll cycle engine** (gateway → items) and the
//!   **command dispatch engine** (items → gateway)
//! - Manage the gateway **session lifecycle** (connect/disconnect/reconnect)
//! - Provide the in-process **item event bus** that carries item writes
//!
//! ## Dependency rule
//! Depends on `fritzsync-domain` only (plus `tokio::sync`/`time` for
//! channels and the scheduler). Never imports adapter crates. Adapters
//! depend on *this* crate, not the reverse.

pub mod bridge;
pub mod dispatch;
pub mod item_bus;
pub mod poll;
pub mod ports;
pub mod registry;
pub mod session;
