//! Paired before/after views of simulation entities.
//!
//! A view record holds, for each quantity of interest, a [`Pair`] of its
//! value at the viewed step and at the comparator step. Entities are paired
//! across the two snapshots by id. Quantities that live in related tables
//! (an industry's money stock, say) are looked up through a [`StockContext`]
//! built from the same snapshot the entity came from, never across the two.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::debug;

use capfront_types::{
    ClassId, ClassStock, Commodity, CommodityId, Industry, IndustryId, IndustryStock, SocialClass,
    StockId, commodity_names, usage_types,
};

use crate::snapshot::Snapshot;

// ---------------------------------------------------------------------------
// Pair
// ---------------------------------------------------------------------------

/// A value at the viewed step alongside the same value at the comparator step.
///
/// Serializes as `{viewed, compared, changed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair<T> {
    /// Value at the viewed step.
    pub viewed: T,
    /// Value at the comparator step.
    pub compared: T,
}

impl<T: PartialEq> Pair<T> {
    /// Pair two values.
    pub const fn new(viewed: T, compared: T) -> Self {
        Self { viewed, compared }
    }

    /// Pair the same field read from two entities.
    pub fn of<E>(viewed: &E, compared: &E, field: impl Fn(&E) -> T) -> Self {
        Self {
            viewed: field(viewed),
            compared: field(compared),
        }
    }

    /// Whether the value differs between the two steps.
    pub fn is_changed(&self) -> bool {
        self.viewed != self.compared
    }
}

impl<T: Serialize + PartialEq> Serialize for Pair<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Pair", 3)?;
        state.serialize_field("viewed", &self.viewed)?;
        state.serialize_field("compared", &self.compared)?;
        state.serialize_field("changed", &self.is_changed())?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// Stock context
// ---------------------------------------------------------------------------

/// Read-only lookups into one snapshot's related tables.
#[derive(Debug, Clone, Copy)]
pub struct StockContext<'a> {
    commodities: &'a [Commodity],
    industries: &'a [Industry],
    classes: &'a [SocialClass],
    industry_stocks: &'a [IndustryStock],
    class_stocks: &'a [ClassStock],
}

impl<'a> StockContext<'a> {
    /// Lookups into `snapshot`.
    pub fn of(snapshot: &'a Snapshot) -> Self {
        Self {
            commodities: snapshot.commodities(),
            industries: snapshot.industries(),
            classes: snapshot.classes(),
            industry_stocks: snapshot.industry_stocks(),
            class_stocks: snapshot.class_stocks(),
        }
    }

    /// Name of commodity `id`.
    pub fn commodity_name(&self, id: CommodityId) -> Option<&'a str> {
        self.commodities
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    /// Name of industry `id`.
    pub fn industry_name(&self, id: IndustryId) -> Option<&'a str> {
        self.industries
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.name.as_str())
    }

    /// Name of class `id`.
    pub fn class_name(&self, id: ClassId) -> Option<&'a str> {
        self.classes
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    /// The stock of `usage_type` owned by industry `id`.
    pub fn industry_stock(&self, id: IndustryId, usage_type: &str) -> Option<&'a IndustryStock> {
        self.industry_stocks
            .iter()
            .find(|s| s.industry_id == id && s.usage_type == usage_type)
    }

    /// The production stock of the named commodity owned by industry `id`.
    pub fn production_stock(&self, id: IndustryId, commodity: &str) -> Option<&'a IndustryStock> {
        self.industry_stocks.iter().find(|s| {
            s.industry_id == id
                && s.usage_type == usage_types::PRODUCTION
                && self.commodity_name(s.commodity_id) == Some(commodity)
        })
    }

    /// The stock of `usage_type` owned by class `id`.
    pub fn class_stock(&self, id: ClassId, usage_type: &str) -> Option<&'a ClassStock> {
        self.class_stocks
            .iter()
            .find(|s| s.class_id == id && s.usage_type == usage_type)
    }
}

/// Quantities shared by every kind of stock.
pub trait Holding {
    /// Quantity held.
    fn size(&self) -> Decimal;
    /// Value of the holding.
    fn value(&self) -> Decimal;
    /// Price of the holding.
    fn price(&self) -> Decimal;
}

impl Holding for IndustryStock {
    fn size(&self) -> Decimal {
        self.size
    }
    fn value(&self) -> Decimal {
        self.value
    }
    fn price(&self) -> Decimal {
        self.price
    }
}

impl Holding for ClassStock {
    fn size(&self) -> Decimal {
        self.size
    }
    fn value(&self) -> Decimal {
        self.value
    }
    fn price(&self) -> Decimal {
        self.price
    }
}

/// A related stock's quantities at both steps; `None` where the stock is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockFigures {
    /// Quantity held.
    pub size: Pair<Option<Decimal>>,
    /// Value of the holding.
    pub value: Pair<Option<Decimal>>,
    /// Price of the holding.
    pub price: Pair<Option<Decimal>>,
}

impl StockFigures {
    /// Pair a stock looked up at the viewed step with one looked up at the comparator step.
    pub fn of<S: Holding>(viewed: Option<&S>, compared: Option<&S>) -> Self {
        Self {
            size: Pair::new(viewed.map(Holding::size), compared.map(Holding::size)),
            value: Pair::new(viewed.map(Holding::value), compared.map(Holding::value)),
            price: Pair::new(viewed.map(Holding::price), compared.map(Holding::price)),
        }
    }

    /// Whether any figure differs.
    pub fn is_changed(&self) -> bool {
        self.size.is_changed() || self.value.is_changed() || self.price.is_changed()
    }
}

// ---------------------------------------------------------------------------
// Pairing by id
// ---------------------------------------------------------------------------

/// An entity with a stable id.
pub trait Keyed {
    /// The id type.
    type Key: Ord + Copy + Display;
    /// This entity's id.
    fn key(&self) -> Self::Key;
}

impl Keyed for Commodity {
    type Key = CommodityId;
    fn key(&self) -> CommodityId {
        self.id
    }
}

impl Keyed for Industry {
    type Key = IndustryId;
    fn key(&self) -> IndustryId {
        self.id
    }
}

impl Keyed for SocialClass {
    type Key = ClassId;
    fn key(&self) -> ClassId {
        self.id
    }
}

impl Keyed for IndustryStock {
    type Key = StockId;
    fn key(&self) -> StockId {
        self.id
    }
}

impl Keyed for ClassStock {
    type Key = StockId;
    fn key(&self) -> StockId {
        self.id
    }
}

/// One view record and whether its entity existed at the comparator step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewEntry<V> {
    /// False when the entity is new since the comparator step; the record
    /// then compares the entity with itself.
    pub present_at_comparator: bool,
    /// The paired fields.
    #[serde(flatten)]
    pub view: V,
}

/// View records for one entity kind, in viewed-list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSet<V> {
    /// One record per viewed entity.
    pub records: Vec<ViewEntry<V>>,
    /// Entities present at the comparator step but gone at the viewed step.
    pub vanished: usize,
}

impl<V> ViewSet<V> {
    /// The first record matching `predicate`.
    pub fn find(self, predicate: impl Fn(&V) -> bool) -> Option<ViewEntry<V>> {
        self.records.into_iter().find(|entry| predicate(&entry.view))
    }
}

/// Pair two entity lists by id and build a record for each viewed entity.
pub fn build_views<'a, E, V>(
    kind: &str,
    viewed: &'a [E],
    compared: &'a [E],
    build: impl Fn(&'a E, &'a E) -> V,
) -> ViewSet<V>
where
    E: Keyed,
{
    let by_key: BTreeMap<E::Key, &E> = compared.iter().map(|e| (e.key(), e)).collect();
    let viewed_keys: BTreeSet<E::Key> = viewed.iter().map(Keyed::key).collect();

    let records = viewed
        .iter()
        .map(|entity| match by_key.get(&entity.key()) {
            Some(&earlier) => ViewEntry {
                present_at_comparator: true,
                view: build(entity, earlier),
            },
            None => ViewEntry {
                present_at_comparator: false,
                view: build(entity, entity),
            },
        })
        .collect();

    let vanished = by_key
        .keys()
        .filter(|key| !viewed_keys.contains(key))
        .count();
    if vanished > 0 {
        debug!(kind, vanished, "entities present only at the comparator step");
    }

    ViewSet { records, vanished }
}

// ---------------------------------------------------------------------------
// Commodity
// ---------------------------------------------------------------------------

/// A commodity at two steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommodityView {
    /// Server key.
    pub id: CommodityId,
    /// Display name.
    pub name: String,
    /// Where the commodity comes from.
    pub origin: String,
    /// What the commodity is used for.
    pub usage: String,
    /// Ordering hint for display.
    pub display_order: i64,
    /// Icon file name.
    pub image_name: String,
    /// Hover text.
    pub tooltip: String,
    /// Total quantity.
    pub size: Pair<Decimal>,
    /// Total value.
    pub total_value: Pair<Decimal>,
    /// Total price.
    pub total_price: Pair<Decimal>,
    /// Value per unit.
    pub unit_value: Pair<Decimal>,
    /// Price per unit.
    pub unit_price: Pair<Decimal>,
    /// Turnover time.
    pub turnover_time: Pair<Decimal>,
    /// Quantity demanded.
    pub demand: Pair<Decimal>,
    /// Quantity supplied.
    pub supply: Pair<Decimal>,
    /// Share of demand that supply can satisfy.
    pub allocation_ratio: Pair<Decimal>,
    /// Demand backed by money.
    pub monetarily_effective_demand: Pair<Decimal>,
    /// Share allocated to investment.
    pub investment_proportion: Pair<Decimal>,
}

impl CommodityView {
    /// Pair `viewed` with `compared`.
    pub fn build(viewed: &Commodity, compared: &Commodity) -> Self {
        Self {
            id: viewed.id,
            name: viewed.name.clone(),
            origin: viewed.origin.clone(),
            usage: viewed.usage.clone(),
            display_order: viewed.display_order,
            image_name: viewed.image_name.clone(),
            tooltip: viewed.tooltip.clone(),
            size: Pair::of(viewed, compared, |c| c.size),
            total_value: Pair::of(viewed, compared, |c| c.total_value),
            total_price: Pair::of(viewed, compared, |c| c.total_price),
            unit_value: Pair::of(viewed, compared, |c| c.unit_value),
            unit_price: Pair::of(viewed, compared, |c| c.unit_price),
            turnover_time: Pair::of(viewed, compared, |c| c.turnover_time),
            demand: Pair::of(viewed, compared, |c| c.demand),
            supply: Pair::of(viewed, compared, |c| c.supply),
            allocation_ratio: Pair::of(viewed, compared, |c| c.allocation_ratio),
            monetarily_effective_demand: Pair::of(viewed, compared, |c| {
                c.monetarily_effective_demand
            }),
            investment_proportion: Pair::of(viewed, compared, |c| c.investment_proportion),
        }
    }

    /// Whether any paired value differs.
    pub fn is_changed(&self) -> bool {
        [
            &self.size,
            &self.total_value,
            &self.total_price,
            &self.unit_value,
            &self.unit_price,
            &self.turnover_time,
            &self.demand,
            &self.supply,
            &self.allocation_ratio,
            &self.monetarily_effective_demand,
            &self.investment_proportion,
        ]
        .iter()
        .any(|pair| pair.is_changed())
    }
}

/// Commodity views for two snapshots.
pub fn commodity_views(viewed: &Snapshot, compared: &Snapshot) -> ViewSet<CommodityView> {
    build_views(
        "commodities",
        viewed.commodities(),
        compared.commodities(),
        CommodityView::build,
    )
}

// ---------------------------------------------------------------------------
// Industry
// ---------------------------------------------------------------------------

/// An industry at two steps, with its money, sales and capital stocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndustryView {
    /// Server key.
    pub id: IndustryId,
    /// Display name.
    pub name: String,
    /// Commodity produced.
    pub output: String,
    /// Scale of output.
    pub output_scale: Pair<Decimal>,
    /// Growth rate of output.
    pub output_growth_rate: Pair<Decimal>,
    /// Capital at the start of the period.
    pub initial_capital: Pair<Decimal>,
    /// Production not yet finished.
    pub work_in_progress: Pair<Decimal>,
    /// Capital now.
    pub current_capital: Pair<Decimal>,
    /// Profit this period.
    pub profit: Pair<Decimal>,
    /// Profit over initial capital.
    pub profit_rate: Pair<Decimal>,
    /// The industry's money stock.
    pub money: StockFigures,
    /// The industry's unsold output.
    pub sales: StockFigures,
    /// Production stock of means of production.
    pub constant_capital: StockFigures,
    /// Production stock of labour power.
    pub variable_capital: StockFigures,
}

impl IndustryView {
    /// Pair `viewed` with `compared`, resolving stocks in each one's own snapshot.
    pub fn build(
        viewed: &Industry,
        compared: &Industry,
        viewed_ctx: &StockContext<'_>,
        compared_ctx: &StockContext<'_>,
    ) -> Self {
        let usage = |usage_type: &str| {
            StockFigures::of(
                viewed_ctx.industry_stock(viewed.id, usage_type),
                compared_ctx.industry_stock(compared.id, usage_type),
            )
        };
        let production = |commodity: &str| {
            StockFigures::of(
                viewed_ctx.production_stock(viewed.id, commodity),
                compared_ctx.production_stock(compared.id, commodity),
            )
        };

        Self {
            id: viewed.id,
            name: viewed.name.clone(),
            output: viewed.output.clone(),
            output_scale: Pair::of(viewed, compared, |i| i.output_scale),
            output_growth_rate: Pair::of(viewed, compared, |i| i.output_growth_rate),
            initial_capital: Pair::of(viewed, compared, |i| i.initial_capital),
            work_in_progress: Pair::of(viewed, compared, |i| i.work_in_progress),
            current_capital: Pair::of(viewed, compared, |i| i.current_capital),
            profit: Pair::of(viewed, compared, |i| i.profit),
            profit_rate: Pair::of(viewed, compared, |i| i.profit_rate),
            money: usage(usage_types::MONEY),
            sales: usage(usage_types::SALES),
            constant_capital: production(commodity_names::MEANS_OF_PRODUCTION),
            variable_capital: production(commodity_names::LABOUR_POWER),
        }
    }

    /// Whether any paired value differs.
    pub fn is_changed(&self) -> bool {
        [
            &self.output_scale,
            &self.output_growth_rate,
            &self.initial_capital,
            &self.work_in_progress,
            &self.current_capital,
            &self.profit,
            &self.profit_rate,
        ]
        .iter()
        .any(|pair| pair.is_changed())
            || [
                &self.money,
                &self.sales,
                &self.constant_capital,
                &self.variable_capital,
            ]
            .iter()
            .any(|figures| figures.is_changed())
    }
}

/// Industry views for two snapshots.
pub fn industry_views(viewed: &Snapshot, compared: &Snapshot) -> ViewSet<IndustryView> {
    let viewed_ctx = StockContext::of(viewed);
    let compared_ctx = StockContext::of(compared);
    build_views(
        "industries",
        viewed.industries(),
        compared.industries(),
        |v, c| IndustryView::build(v, c, &viewed_ctx, &compared_ctx),
    )
}

// ---------------------------------------------------------------------------
// Social class
// ---------------------------------------------------------------------------

/// A social class at two steps, with its money, sales and consumption stocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassView {
    /// Server key.
    pub id: ClassId,
    /// Display name.
    pub name: String,
    /// Number of members.
    pub population: Pair<Decimal>,
    /// Share that sells labour power.
    pub participation_ratio: Pair<Decimal>,
    /// Share of revenue consumed.
    pub consumption_ratio: Pair<Decimal>,
    /// Revenue this period.
    pub revenue: Pair<Decimal>,
    /// Total assets.
    pub assets: Pair<Decimal>,
    /// The class's money stock.
    pub money: StockFigures,
    /// What the class has to sell.
    pub sales: StockFigures,
    /// Goods held for consumption.
    pub consumption: StockFigures,
}

impl ClassView {
    /// Pair `viewed` with `compared`, resolving stocks in each one's own snapshot.
    pub fn build(
        viewed: &SocialClass,
        compared: &SocialClass,
        viewed_ctx: &StockContext<'_>,
        compared_ctx: &StockContext<'_>,
    ) -> Self {
        let usage = |usage_type: &str| {
            StockFigures::of(
                viewed_ctx.class_stock(viewed.id, usage_type),
                compared_ctx.class_stock(compared.id, usage_type),
            )
        };

        Self {
            id: viewed.id,
            name: viewed.name.clone(),
            population: Pair::of(viewed, compared, |c| c.population),
            participation_ratio: Pair::of(viewed, compared, |c| c.participation_ratio),
            consumption_ratio: Pair::of(viewed, compared, |c| c.consumption_ratio),
            revenue: Pair::of(viewed, compared, |c| c.revenue),
            assets: Pair::of(viewed, compared, |c| c.assets),
            money: usage(usage_types::MONEY),
            sales: usage(usage_types::SALES),
            consumption: usage(usage_types::CONSUMPTION),
        }
    }

    /// Whether any paired value differs.
    pub fn is_changed(&self) -> bool {
        [
            &self.population,
            &self.participation_ratio,
            &self.consumption_ratio,
            &self.revenue,
            &self.assets,
        ]
        .iter()
        .any(|pair| pair.is_changed())
            || [&self.money, &self.sales, &self.consumption]
                .iter()
                .any(|figures| figures.is_changed())
    }
}

/// Class views for two snapshots.
pub fn class_views(viewed: &Snapshot, compared: &Snapshot) -> ViewSet<ClassView> {
    let viewed_ctx = StockContext::of(viewed);
    let compared_ctx = StockContext::of(compared);
    build_views(
        "classes",
        viewed.classes(),
        compared.classes(),
        |v, c| ClassView::build(v, c, &viewed_ctx, &compared_ctx),
    )
}

// ---------------------------------------------------------------------------
// Stocks
// ---------------------------------------------------------------------------

/// An industry-owned stock at two steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndustryStockView {
    /// Server key.
    pub id: StockId,
    /// Display name.
    pub name: String,
    /// Usage type.
    pub usage_type: String,
    /// Owning industry.
    pub industry_id: IndustryId,
    /// Owning industry's name.
    pub industry_name: Option<String>,
    /// Commodity the stock consists of.
    pub commodity_id: CommodityId,
    /// That commodity's name.
    pub commodity_name: Option<String>,
    /// Quantity held.
    pub size: Pair<Decimal>,
    /// Value.
    pub value: Pair<Decimal>,
    /// Price.
    pub price: Pair<Decimal>,
    /// Quantity needed next period.
    pub requirement: Pair<Decimal>,
    /// Quantity demanded.
    pub demand: Pair<Decimal>,
}

impl IndustryStockView {
    /// Pair `viewed` with `compared`; names come from the viewed snapshot.
    pub fn build(viewed: &IndustryStock, compared: &IndustryStock, ctx: &StockContext<'_>) -> Self {
        Self {
            id: viewed.id,
            name: viewed.name.clone(),
            usage_type: viewed.usage_type.clone(),
            industry_id: viewed.industry_id,
            industry_name: ctx.industry_name(viewed.industry_id).map(str::to_owned),
            commodity_id: viewed.commodity_id,
            commodity_name: ctx.commodity_name(viewed.commodity_id).map(str::to_owned),
            size: Pair::of(viewed, compared, |s| s.size),
            value: Pair::of(viewed, compared, |s| s.value),
            price: Pair::of(viewed, compared, |s| s.price),
            requirement: Pair::of(viewed, compared, |s| s.requirement),
            demand: Pair::of(viewed, compared, |s| s.demand),
        }
    }

    /// Whether any paired value differs.
    pub fn is_changed(&self) -> bool {
        [
            &self.size,
            &self.value,
            &self.price,
            &self.requirement,
            &self.demand,
        ]
        .iter()
        .any(|pair| pair.is_changed())
    }
}

/// Industry stock views for two snapshots.
pub fn industry_stock_views(viewed: &Snapshot, compared: &Snapshot) -> ViewSet<IndustryStockView> {
    let ctx = StockContext::of(viewed);
    build_views(
        "industry-stocks",
        viewed.industry_stocks(),
        compared.industry_stocks(),
        |v, c| IndustryStockView::build(v, c, &ctx),
    )
}

/// A class-owned stock at two steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassStockView {
    /// Server key.
    pub id: StockId,
    /// Display name.
    pub name: String,
    /// Usage type.
    pub usage_type: String,
    /// Owning class.
    pub class_id: ClassId,
    /// Owning class's name.
    pub class_name: Option<String>,
    /// Commodity the stock consists of.
    pub commodity_id: CommodityId,
    /// That commodity's name.
    pub commodity_name: Option<String>,
    /// Quantity held.
    pub size: Pair<Decimal>,
    /// Value.
    pub value: Pair<Decimal>,
    /// Price.
    pub price: Pair<Decimal>,
    /// Quantity demanded.
    pub demand: Pair<Decimal>,
}

impl ClassStockView {
    /// Pair `viewed` with `compared`; names come from the viewed snapshot.
    pub fn build(viewed: &ClassStock, compared: &ClassStock, ctx: &StockContext<'_>) -> Self {
        Self {
            id: viewed.id,
            name: viewed.name.clone(),
            usage_type: viewed.usage_type.clone(),
            class_id: viewed.class_id,
            class_name: ctx.class_name(viewed.class_id).map(str::to_owned),
            commodity_id: viewed.commodity_id,
            commodity_name: ctx.commodity_name(viewed.commodity_id).map(str::to_owned),
            size: Pair::of(viewed, compared, |s| s.size),
            value: Pair::of(viewed, compared, |s| s.value),
            price: Pair::of(viewed, compared, |s| s.price),
            demand: Pair::of(viewed, compared, |s| s.demand),
        }
    }

    /// Whether any paired value differs.
    pub fn is_changed(&self) -> bool {
        [&self.size, &self.value, &self.price, &self.demand]
            .iter()
            .any(|pair| pair.is_changed())
    }
}

/// Class stock views for two snapshots.
pub fn class_stock_views(viewed: &Snapshot, compared: &Snapshot) -> ViewSet<ClassStockView> {
    let ctx = StockContext::of(viewed);
    build_views(
        "class-stocks",
        viewed.class_stocks(),
        compared.class_stocks(),
        |v, c| ClassStockView::build(v, c, &ctx),
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::remote::RemoteSource;
    use crate::static_remote::StaticRemote;

    fn commodity(id: i64, size: Decimal) -> Commodity {
        Commodity {
            id: CommodityId::new(id),
            name: format!("c{id}"),
            size,
            ..Commodity::default()
        }
    }

    #[test]
    fn pair_with_itself_is_unchanged() {
        let a = commodity(1, dec!(100));
        assert!(!CommodityView::build(&a, &a).is_changed());

        let industry = Industry {
            id: IndustryId::new(1),
            profit: dec!(3),
            ..Industry::default()
        };
        let snapshot = Snapshot::new("k");
        let ctx = StockContext::of(&snapshot);
        assert!(!IndustryView::build(&industry, &industry, &ctx, &ctx).is_changed());
    }

    #[test]
    fn pair_reports_changes() {
        let before = commodity(1, dec!(100));
        let after = commodity(1, dec!(80));
        let view = CommodityView::build(&after, &before);
        assert_eq!(view.size, Pair::new(dec!(80), dec!(100)));
        assert!(view.size.is_changed());
        assert!(!view.unit_price.is_changed());
        assert!(view.is_changed());
    }

    #[test]
    fn pair_serializes_changed_flag() {
        let pair = Pair::new(1_i64, 2_i64);
        let json = serde_json::to_value(pair).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({"viewed": 1, "compared": 2, "changed": true}))
        );
    }

    #[test]
    fn pairs_by_id_not_position() {
        let viewed = vec![commodity(2, dec!(5)), commodity(1, dec!(7))];
        let compared = vec![commodity(1, dec!(9)), commodity(2, dec!(5))];
        let set = build_views("commodities", &viewed, &compared, CommodityView::build);

        let sizes: Vec<_> = set.records.iter().map(|e| (e.view.id, e.view.size)).collect();
        assert_eq!(
            sizes,
            vec![
                (CommodityId::new(2), Pair::new(dec!(5), dec!(5))),
                (CommodityId::new(1), Pair::new(dec!(7), dec!(9))),
            ]
        );
        assert_eq!(set.vanished, 0);
    }

    #[test]
    fn new_and_vanished_entities() {
        let viewed = vec![commodity(1, dec!(1)), commodity(3, dec!(3))];
        let compared = vec![commodity(1, dec!(1)), commodity(2, dec!(2))];
        let set = build_views("commodities", &viewed, &compared, CommodityView::build);

        let flags: Vec<_> = set.records.iter().map(|e| e.present_at_comparator).collect();
        assert_eq!(flags, vec![true, false]);
        assert!(set.records.iter().all(|e| !e.view.is_changed()));
        assert_eq!(set.vanished, 1);
    }

    #[test]
    fn entry_flattens_view() {
        let a = commodity(4, dec!(1));
        let entry = ViewEntry {
            present_at_comparator: true,
            view: CommodityView::build(&a, &a),
        };
        let json = serde_json::to_value(&entry).unwrap_or_default();
        assert_eq!(json.get("id"), Some(&serde_json::json!(4)));
        assert_eq!(json.get("present_at_comparator"), Some(&serde_json::json!(true)));
    }

    async fn stocked_snapshot(money: i64, means: i64, sales: i64) -> Snapshot {
        let canned = StaticRemote::new();
        canned.respond_json(
            "commodity",
            &serde_json::json!([
                {"id": 1, "name": "Means of Production"},
                {"id": 2, "name": "Labour Power"}
            ]),
        );
        canned.respond_json("industry", &serde_json::json!([{"id": 1, "name": "Department I"}]));
        canned.respond_json("classes", &serde_json::json!([{"id": 1, "name": "Workers"}]));
        canned.respond_json(
            "stocks/industry",
            &serde_json::json!([
                {"id": 1, "industry_id": 1, "usage_type": "Money", "size": money},
                {"id": 2, "industry_id": 1, "commodity_id": 1, "usage_type": "Production", "value": means},
                {"id": 3, "industry_id": 1, "commodity_id": 2, "usage_type": "Production", "value": 20}
            ]),
        );
        canned.respond_json(
            "stocks/class",
            &serde_json::json!([{"id": 4, "class_id": 1, "commodity_id": 2, "usage_type": "Sales", "size": sales}]),
        );

        let mut snapshot = Snapshot::new("k");
        let _ = snapshot.fetch_all(&RemoteSource::from(canned)).await;
        snapshot
    }

    #[tokio::test]
    async fn stocks_resolve_in_their_own_snapshot() {
        let earlier = stocked_snapshot(500, 30, 100).await;
        let later = stocked_snapshot(420, 45, 60).await;

        let industries = industry_views(&later, &earlier);
        let industry = industries.find(|v| v.id == IndustryId::new(1));
        let Some(industry) = industry.map(|entry| entry.view) else {
            panic!("industry 1 should be viewed");
        };
        assert_eq!(industry.money.size, Pair::new(Some(dec!(420)), Some(dec!(500))));
        assert_eq!(
            industry.constant_capital.value,
            Pair::new(Some(dec!(45)), Some(dec!(30)))
        );
        assert!(!industry.variable_capital.is_changed());
        assert!(industry.money.is_changed());
        assert!(industry.is_changed());

        let classes = class_views(&later, &earlier);
        let class = classes.find(|v| v.id == ClassId::new(1));
        let Some(class) = class.map(|entry| entry.view) else {
            panic!("class 1 should be viewed");
        };
        assert_eq!(class.sales.size, Pair::new(Some(dec!(60)), Some(dec!(100))));
        assert!(class.sales.is_changed());
        assert!(!class.money.is_changed());
        assert!(class.is_changed());

        let unchanged = industry_views(&earlier, &earlier);
        assert!(unchanged.records.iter().all(|e| !e.view.is_changed()));
    }

    #[test]
    fn missing_stocks_pair_as_none() {
        let figures = StockFigures::of::<IndustryStock>(None, None);
        assert!(!figures.is_changed());
        assert_eq!(figures.size, Pair::new(None, None));
    }
}
