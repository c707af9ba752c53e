//! Type-safe identifier wrappers around the remote server's integer keys.
//!
//! The simulation server hands out plain integer primary keys for every
//! table. Wrapping each in its own newtype keeps a commodity id from being
//! used where an industry id is expected, and lets the view-diff engine
//! pair entities across snapshots by a key the compiler understands.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around an `i64` server key with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
            Deserialize, TS,
        )]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw server key.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the raw server key.
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of one simulation owned by a user.
    SimulationId
}

define_id! {
    /// Identifier of a commodity within a simulation.
    CommodityId
}

define_id! {
    /// Identifier of an industry within a simulation.
    IndustryId
}

define_id! {
    /// Identifier of a social class within a simulation.
    ClassId
}

define_id! {
    /// Identifier of a stock (industry-owned or class-owned).
    StockId
}

define_id! {
    /// Identifier of a trace entry.
    TraceId
}

define_id! {
    /// Identifier of a simulation template that new simulations are cloned from.
    TemplateId
}
