//! # fritzsync-domain
//!
//! Pure domain model for the fritzsync gateway bridge.
//!
//! ## Responsibilities
//! - Foundational types: identifier newtypes, error conventions, timestamps
//! - Define **Device snapshots** (one fetched read of a device's reported state)
//! - Define the **attribute mapping table** (attribute name → snapshot field
//!   accessor + capability gate) and the write-trigger command roles
//! - Define the **item tree** (device items and their attribute item children)
//! - Define typed **item values** exchanged between gateway and items
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod attribute;
pub mod error;
pub mod identifier;
pub mod item;
pub mod snapshot;
pub mod time;
pub mod value;
