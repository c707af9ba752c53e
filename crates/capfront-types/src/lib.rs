//! Shared wire types for the Capfront simulation client.
//!
//! This crate is the single source of truth for the shape of everything the
//! remote simulation server sends: simulations, commodities, industries,
//! social classes, their stocks, and the trace log. Types defined here flow
//! downstream to `TypeScript` via `ts-rs` for any browser front end.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for the server's integer keys
//! - [`enums`] -- The circuit of capital ([`ActionState`], [`Action`])
//! - [`structs`] -- Entity records as decoded from the server

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Action, ActionState, UnknownStage};
pub use ids::{ClassId, CommodityId, IndustryId, SimulationId, StockId, TemplateId, TraceId};
pub use structs::{
    ClassStock, CloneResult, Commodity, Industry, IndustryStock, Simulation, SimulationTemplate,
    SocialClass, TraceEntry, UserRecord, commodity_names, usage_types,
};
