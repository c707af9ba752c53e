//! Entity records as the simulation server sends them.
//!
//! Every record derives `Deserialize` with container-level `#[serde(default)]`
//! so a server that omits a column still decodes; missing quantities read as
//! zero and missing names as empty strings. Economic quantities are
//! [`Decimal`] so that comparing a value at two steps is exact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::ActionState;
use crate::ids::{ClassId, CommodityId, IndustryId, SimulationId, StockId, TemplateId, TraceId};

/// Well-known `usage_type` values carried by industry and class stocks.
pub mod usage_types {
    /// Money held by the owner.
    pub const MONEY: &str = "Money";
    /// Output waiting to be sold.
    pub const SALES: &str = "Sales";
    /// Inputs held for production.
    pub const PRODUCTION: &str = "Production";
    /// Goods held for consumption.
    pub const CONSUMPTION: &str = "Consumption";
}

/// Commodity names that single out particular production stocks.
pub mod commodity_names {
    /// The commodity whose production stock is constant capital.
    pub const MEANS_OF_PRODUCTION: &str = "Means of Production";
    /// The commodity whose production stock is variable capital.
    pub const LABOUR_POWER: &str = "Labour Power";
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// One simulation owned by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct Simulation {
    /// Server key.
    pub id: SimulationId,
    /// Display name.
    pub name: String,
    /// Server-side step counter.
    pub time_stamp: i64,
    /// Stage label as the server reports it (e.g. `DEMAND`).
    pub state: String,
    /// Owning user.
    pub username: String,
    /// Number of circuits per simulated year.
    #[ts(as = "String")]
    pub periods_per_year: Decimal,
    /// Growth rate of the working population.
    #[ts(as = "String")]
    pub population_growth_rate: Decimal,
    /// Share of profit reinvested.
    #[ts(as = "String")]
    pub investment_ratio: Decimal,
    /// Currency symbol used for prices.
    pub currency_symbol: String,
    /// Symbol used for quantities.
    pub quantity_symbol: String,
    /// Monetary expression of labour time.
    #[ts(as = "String")]
    pub melt: Decimal,
}

impl Simulation {
    /// The server's stage label parsed into an [`ActionState`].
    ///
    /// Returns `None` for labels outside the circuit.
    pub fn action_state(&self) -> Option<ActionState> {
        self.state.parse().ok()
    }
}

// ---------------------------------------------------------------------------
// Commodity
// ---------------------------------------------------------------------------

/// A commodity traded in the simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct Commodity {
    /// Server key.
    pub id: CommodityId,
    /// Display name.
    pub name: String,
    /// Owning simulation.
    pub simulation_id: SimulationId,
    /// Server-side step counter.
    pub time_stamp: i64,
    /// Where the commodity comes from (industrial, social, money).
    pub origin: String,
    /// What the commodity is used for (productive, consumption, money).
    pub usage: String,
    /// Total quantity in existence.
    #[ts(as = "String")]
    pub size: Decimal,
    /// Total value of the stock.
    #[ts(as = "String")]
    pub total_value: Decimal,
    /// Total price of the stock.
    #[ts(as = "String")]
    pub total_price: Decimal,
    /// Value per unit.
    #[ts(as = "String")]
    pub unit_value: Decimal,
    /// Price per unit.
    #[ts(as = "String")]
    pub unit_price: Decimal,
    /// Periods taken to turn over.
    #[ts(as = "String")]
    pub turnover_time: Decimal,
    /// Quantity demanded.
    #[ts(as = "String")]
    pub demand: Decimal,
    /// Quantity supplied.
    #[ts(as = "String")]
    pub supply: Decimal,
    /// Share of demand that supply can satisfy.
    #[ts(as = "String")]
    pub allocation_ratio: Decimal,
    /// Ordering hint for display.
    pub display_order: i64,
    /// Icon file name.
    pub image_name: String,
    /// Hover text.
    pub tooltip: String,
    /// Demand backed by money.
    #[ts(as = "String")]
    pub monetarily_effective_demand: Decimal,
    /// Share of the commodity allocated to investment.
    #[ts(as = "String")]
    pub investment_proportion: Decimal,
}

// ---------------------------------------------------------------------------
// Industry
// ---------------------------------------------------------------------------

/// A producing industry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct Industry {
    /// Server key.
    pub id: IndustryId,
    /// Display name.
    pub name: String,
    /// Owning simulation.
    pub simulation_id: SimulationId,
    /// Server-side step counter.
    pub time_stamp: i64,
    /// Name of the commodity produced.
    pub output: String,
    /// Scale of output per period.
    #[ts(as = "String")]
    pub output_scale: Decimal,
    /// Growth rate of output.
    #[ts(as = "String")]
    pub output_growth_rate: Decimal,
    /// Capital at the start of the period.
    #[ts(as = "String")]
    pub initial_capital: Decimal,
    /// Production not yet finished.
    #[ts(as = "String")]
    pub work_in_progress: Decimal,
    /// Capital now.
    #[ts(as = "String")]
    pub current_capital: Decimal,
    /// Profit this period.
    #[ts(as = "String")]
    pub profit: Decimal,
    /// Profit over initial capital.
    #[ts(as = "String")]
    pub profit_rate: Decimal,
}

// ---------------------------------------------------------------------------
// Social class
// ---------------------------------------------------------------------------

/// A social class (workers, capitalists, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct SocialClass {
    /// Server key.
    pub id: ClassId,
    /// Display name.
    pub name: String,
    /// Owning simulation.
    pub simulation_id: SimulationId,
    /// Server-side step counter.
    pub time_stamp: i64,
    /// Number of members.
    #[ts(as = "String")]
    pub population: Decimal,
    /// Share of the class that sells labour power.
    #[ts(as = "String")]
    pub participation_ratio: Decimal,
    /// Share of revenue consumed.
    #[ts(as = "String")]
    pub consumption_ratio: Decimal,
    /// Revenue this period.
    #[ts(as = "String")]
    pub revenue: Decimal,
    /// Total assets held.
    #[ts(as = "String")]
    pub assets: Decimal,
}

// ---------------------------------------------------------------------------
// Stocks
// ---------------------------------------------------------------------------

/// A stock of one commodity owned by an industry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct IndustryStock {
    /// Server key.
    pub id: StockId,
    /// Owning simulation.
    pub simulation_id: SimulationId,
    /// Server-side step counter.
    pub time_stamp: i64,
    /// Owning industry.
    pub industry_id: IndustryId,
    /// Commodity the stock consists of.
    pub commodity_id: CommodityId,
    /// Display name.
    pub name: String,
    /// See [`usage_types`].
    pub usage_type: String,
    /// Quantity held.
    #[ts(as = "String")]
    pub size: Decimal,
    /// Value of the stock.
    #[ts(as = "String")]
    pub value: Decimal,
    /// Price of the stock.
    #[ts(as = "String")]
    pub price: Decimal,
    /// Quantity needed for the next period.
    #[ts(as = "String")]
    pub requirement: Decimal,
    /// Quantity demanded.
    #[ts(as = "String")]
    pub demand: Decimal,
}

/// A stock of one commodity owned by a social class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct ClassStock {
    /// Server key.
    pub id: StockId,
    /// Owning simulation.
    pub simulation_id: SimulationId,
    /// Server-side step counter.
    pub time_stamp: i64,
    /// Owning class.
    pub class_id: ClassId,
    /// Commodity the stock consists of.
    pub commodity_id: CommodityId,
    /// Display name.
    pub name: String,
    /// See [`usage_types`].
    pub usage_type: String,
    /// Quantity held.
    #[ts(as = "String")]
    pub size: Decimal,
    /// Value of the stock.
    #[ts(as = "String")]
    pub value: Decimal,
    /// Price of the stock.
    #[ts(as = "String")]
    pub price: Decimal,
    /// Quantity demanded.
    #[ts(as = "String")]
    pub demand: Decimal,
}

// ---------------------------------------------------------------------------
// Trace
// ---------------------------------------------------------------------------

/// One line of the server's human-readable simulation log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct TraceEntry {
    /// Server key.
    pub id: TraceId,
    /// Owning simulation.
    pub simulation_id: SimulationId,
    /// Server-side step counter.
    pub time_stamp: i64,
    /// Indentation level.
    pub level: i64,
    /// Log text.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Users, templates, admin
// ---------------------------------------------------------------------------

/// A user record as returned by the administrative endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct UserRecord {
    /// Unique user name.
    pub username: String,
    /// The user's API key.
    pub api_key: String,
    /// The simulation the server believes this user is working on.
    pub current_simulation_id: SimulationId,
    /// Whether a client session currently holds this user.
    #[serde(alias = "isLocked", alias = "locked")]
    pub is_locked: bool,
}

/// A template that new simulations are cloned from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationTemplate {
    /// Server key.
    pub id: TemplateId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
}

/// The server's reply to a clone request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct CloneResult {
    /// Human-readable outcome.
    pub message: String,
    /// Status code echoed by the server.
    #[serde(rename = "statusCode")]
    pub status_code: i64,
    /// The newly created simulation.
    pub simulation_id: SimulationId,
}
