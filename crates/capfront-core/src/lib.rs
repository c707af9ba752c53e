//! Client-side cache for a remote capitalism simulation.
//!
//! The simulation server computes everything; this crate mirrors what it
//! computes, one snapshot per simulation step, so a user can step back and
//! forth through the history and compare any two steps without asking the
//! server again.
//!
//! # Architecture
//!
//! ```text
//! RemoteSource --> ResourceSlot<T> x7 --> Snapshot --> Timeline --> User
//!                                                                    |
//!                 reconcile / perform_action / lifecycle  <--  SimulationClient
//!                                                                    |
//!                                        view (Pair, StockContext) --> display
//! ```
//!
//! Before each request the client reconciles the user's cache with the
//! server ([`SimulationClient::reconcile`]). Actions append a snapshot and
//! refresh it ([`SimulationClient::perform_action`]). The view layer pairs
//! the viewed snapshot with the comparator snapshot by entity id.
//!
//! # Modules
//!
//! - [`remote`] / [`static_remote`] -- the server, over HTTP or canned
//! - [`slot`] -- one typed remote table
//! - [`snapshot`] -- all seven tables at one step
//! - [`timeline`] -- per-user snapshot history and cursors
//! - [`user`] / [`registry`] -- users and the shared directory
//! - [`client`] -- the context object operations run against
//! - [`reconcile`] -- cross-checking the cache against the server
//! - [`action`] -- the circuit of capital
//! - [`lifecycle`] -- login, quit, create, delete, admin
//! - [`view`] / [`display`] -- paired views and display pages

pub mod action;
pub mod client;
pub mod display;
pub mod error;
pub mod lifecycle;
pub mod reconcile;
pub mod registry;
pub mod remote;
pub mod slot;
pub mod snapshot;
pub mod static_remote;
pub mod timeline;
pub mod user;
pub mod view;

pub use action::{ActionReport, REDISPLAY_ROUTES, redirect_target};
pub use client::SimulationClient;
pub use display::DisplayPage;
pub use error::{CoreError, RemoteError, SlotError, SnapshotError};
pub use lifecycle::Dashboard;
pub use reconcile::{DivertReason, Reconciliation};
pub use registry::{UserHandle, UserRegistry};
pub use remote::{CallClass, HttpRemote, RemoteConfig, RemoteSource};
pub use slot::{ResourceKind, ResourceSlot};
pub use snapshot::Snapshot;
pub use static_remote::StaticRemote;
pub use timeline::{Cursors, Timeline};
pub use user::{User, UserSummary};
pub use view::{Pair, StockContext, ViewEntry, ViewSet};
