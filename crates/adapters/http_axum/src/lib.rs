//! # fritzsync-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** over the configured item tree
//!   (`/api/devices`, `/api/items`, …)
//! - Accept **external item writes** (`PUT /api/items/{path}`) and publish
//!   them on the item event bus with an external caller tag, so the
//!   command dispatch engine picks them up like any other write
//! - Expose a **poll trigger** (`POST /api/poll`) that forces an
//!   out-of-schedule poll tick
//!
//! ## Dependency rule
//! Depends on `fritzsync-app` (registry, event bus) and `fritzsync-domain`
//! (item views and values). Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

pub use router::build;
pub use state::AppState;
