//! One step's worth of simulation state.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use capfront_types::{
    ActionState, ClassStock, Commodity, Industry, IndustryStock, Simulation, SimulationId,
    SocialClass, TraceEntry,
};

use crate::error::{SlotError, SnapshotError};
use crate::remote::RemoteSource;
use crate::slot::{ResourceKind, ResourceSlot};

/// The full simulation state at one step: one slot per [`ResourceKind`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    simulations: ResourceSlot<Simulation>,
    commodities: ResourceSlot<Commodity>,
    industries: ResourceSlot<Industry>,
    classes: ResourceSlot<SocialClass>,
    industry_stocks: ResourceSlot<IndustryStock>,
    class_stocks: ResourceSlot<ClassStock>,
    trace: ResourceSlot<TraceEntry>,
    fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// An empty snapshot whose slots fetch with `credential`.
    pub fn new(credential: &str) -> Self {
        Self {
            simulations: ResourceSlot::new(ResourceKind::Simulations, credential),
            commodities: ResourceSlot::new(ResourceKind::Commodities, credential),
            industries: ResourceSlot::new(ResourceKind::Industries, credential),
            classes: ResourceSlot::new(ResourceKind::Classes, credential),
            industry_stocks: ResourceSlot::new(ResourceKind::IndustryStocks, credential),
            class_stocks: ResourceSlot::new(ResourceKind::ClassStocks, credential),
            trace: ResourceSlot::new(ResourceKind::Trace, credential),
            fetched_at: None,
        }
    }

    /// Fetch every slot concurrently.
    ///
    /// All seven fetches run to completion whatever happens to the others,
    /// so a failure still leaves the successful slots refreshed. The
    /// snapshot counts as populated once any slot succeeds or every failure
    /// was only "no rows yet".
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] listing every slot that failed.
    pub async fn fetch_all(&mut self, remote: &RemoteSource) -> Result<(), SnapshotError> {
        let (simulations, commodities, industries, classes, industry_stocks, class_stocks, trace) = futures::join!(
            self.simulations.fetch(remote),
            self.commodities.fetch(remote),
            self.industries.fetch(remote),
            self.classes.fetch(remote),
            self.industry_stocks.fetch(remote),
            self.class_stocks.fetch(remote),
            self.trace.fetch(remote),
        );

        let outcomes = [
            simulations,
            commodities,
            industries,
            classes,
            industry_stocks,
            class_stocks,
            trace,
        ];
        let mut refreshed = 0_usize;
        let mut failures: Vec<SlotError> = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(_) => refreshed = refreshed.saturating_add(1),
                Err(e) => failures.push(e),
            }
        }

        let error = SnapshotError { failures };
        if refreshed > 0 || error.is_informational() {
            self.fetched_at = Some(Utc::now());
        }

        if error.failures.is_empty() {
            info!(rows = self.total_rows(), "snapshot refreshed");
            Ok(())
        } else {
            debug!(
                refreshed,
                failed = ?error.resources(),
                "snapshot partially refreshed"
            );
            Err(error)
        }
    }

    /// When the snapshot was last populated, if ever.
    pub const fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Whether a `fetch_all` has ever populated this snapshot.
    pub const fn is_populated(&self) -> bool {
        self.fetched_at.is_some()
    }

    /// The user's current simulation rows (normally one).
    pub fn simulations(&self) -> &[Simulation] {
        self.simulations.rows()
    }

    /// Commodities at this step.
    pub fn commodities(&self) -> &[Commodity] {
        self.commodities.rows()
    }

    /// Industries at this step.
    pub fn industries(&self) -> &[Industry] {
        self.industries.rows()
    }

    /// Social classes at this step.
    pub fn classes(&self) -> &[SocialClass] {
        self.classes.rows()
    }

    /// Industry-owned stocks at this step.
    pub fn industry_stocks(&self) -> &[IndustryStock] {
        self.industry_stocks.rows()
    }

    /// Class-owned stocks at this step.
    pub fn class_stocks(&self) -> &[ClassStock] {
        self.class_stocks.rows()
    }

    /// The simulation log up to this step.
    pub fn trace(&self) -> &[TraceEntry] {
        self.trace.rows()
    }

    /// The simulation this snapshot describes.
    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulations.rows().first()
    }

    /// The stage the server reports for simulation `id`, if this snapshot has it.
    pub fn reported_state(&self, id: SimulationId) -> Option<ActionState> {
        self.simulations
            .rows()
            .iter()
            .find(|sim| sim.id == id)
            .and_then(Simulation::action_state)
    }

    /// Rows held for one resource.
    pub fn row_count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Simulations => self.simulations.len(),
            ResourceKind::Commodities => self.commodities.len(),
            ResourceKind::Industries => self.industries.len(),
            ResourceKind::Classes => self.classes.len(),
            ResourceKind::IndustryStocks => self.industry_stocks.len(),
            ResourceKind::ClassStocks => self.class_stocks.len(),
            ResourceKind::Trace => self.trace.len(),
        }
    }

    fn total_rows(&self) -> usize {
        ResourceKind::ALL
            .iter()
            .map(|kind| self.row_count(*kind))
            .fold(0, usize::saturating_add)
    }
}
