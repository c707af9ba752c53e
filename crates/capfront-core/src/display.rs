//! Pages handed to the display layer.
//!
//! Every page carries the user's name, the simulation stage and the
//! timeline cursors alongside its body. Bodies are built from the viewed
//! and comparator snapshots of the user's timeline; nothing here talks to
//! the server.

use serde::Serialize;

use capfront_types::{ActionState, ClassId, CommodityId, IndustryId, TraceEntry};

use crate::timeline::Cursors;
use crate::user::User;
use crate::view::{
    ClassStockView, ClassView, CommodityView, IndustryStockView, IndustryView, ViewEntry, ViewSet,
    class_stock_views, class_views, commodity_views, industry_stock_views, industry_views,
};

/// A page: who is looking, at what stage, at which steps, and the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayPage<T> {
    /// The user the page is for.
    pub username: String,
    /// The simulation's stage.
    pub state: ActionState,
    /// The timeline cursors.
    #[serde(flatten)]
    pub cursors: Cursors,
    /// Page content.
    pub body: T,
}

impl<T> DisplayPage<T> {
    /// Wrap `body` for `user`.
    pub fn for_user(user: &User, body: T) -> Self {
        Self {
            username: user.name.clone(),
            state: user.state(),
            cursors: user.timeline.cursors(),
            body,
        }
    }
}

/// The landing page: the three main tables side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexBody {
    /// Commodity views.
    pub commodities: ViewSet<CommodityView>,
    /// Industry views.
    pub industries: ViewSet<IndustryView>,
    /// Class views.
    pub classes: ViewSet<ClassView>,
}

/// The landing page.
pub fn index_page(user: &User) -> DisplayPage<IndexBody> {
    let (viewed, compared) = (user.timeline.viewed(), user.timeline.compared());
    DisplayPage::for_user(
        user,
        IndexBody {
            commodities: commodity_views(viewed, compared),
            industries: industry_views(viewed, compared),
            classes: class_views(viewed, compared),
        },
    )
}

/// Every commodity.
pub fn commodities_page(user: &User) -> DisplayPage<ViewSet<CommodityView>> {
    let body = commodity_views(user.timeline.viewed(), user.timeline.compared());
    DisplayPage::for_user(user, body)
}

/// Every industry.
pub fn industries_page(user: &User) -> DisplayPage<ViewSet<IndustryView>> {
    let body = industry_views(user.timeline.viewed(), user.timeline.compared());
    DisplayPage::for_user(user, body)
}

/// Every social class.
pub fn classes_page(user: &User) -> DisplayPage<ViewSet<ClassView>> {
    let body = class_views(user.timeline.viewed(), user.timeline.compared());
    DisplayPage::for_user(user, body)
}

/// Every industry stock.
pub fn industry_stocks_page(user: &User) -> DisplayPage<ViewSet<IndustryStockView>> {
    let body = industry_stock_views(user.timeline.viewed(), user.timeline.compared());
    DisplayPage::for_user(user, body)
}

/// Every class stock.
pub fn class_stocks_page(user: &User) -> DisplayPage<ViewSet<ClassStockView>> {
    let body = class_stock_views(user.timeline.viewed(), user.timeline.compared());
    DisplayPage::for_user(user, body)
}

/// The simulation log as of the viewed step.
pub fn trace_page(user: &User) -> DisplayPage<Vec<TraceEntry>> {
    DisplayPage::for_user(user, user.timeline.viewed().trace().to_vec())
}

/// One commodity, if it exists at the viewed step.
pub fn commodity_page(user: &User, id: CommodityId) -> Option<DisplayPage<ViewEntry<CommodityView>>> {
    let entry = commodity_views(user.timeline.viewed(), user.timeline.compared())
        .find(|view| view.id == id)?;
    Some(DisplayPage::for_user(user, entry))
}

/// One industry, if it exists at the viewed step.
pub fn industry_page(user: &User, id: IndustryId) -> Option<DisplayPage<ViewEntry<IndustryView>>> {
    let entry = industry_views(user.timeline.viewed(), user.timeline.compared())
        .find(|view| view.id == id)?;
    Some(DisplayPage::for_user(user, entry))
}

/// One social class, if it exists at the viewed step.
pub fn class_page(user: &User, id: ClassId) -> Option<DisplayPage<ViewEntry<ClassView>>> {
    let entry =
        class_views(user.timeline.viewed(), user.timeline.compared()).find(|view| view.id == id)?;
    Some(DisplayPage::for_user(user, entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_flattens_cursors() {
        let user = User::new("amy", "a");
        let page = trace_page(&user);
        let json = serde_json::to_value(&page).unwrap_or_default();
        assert_eq!(json.get("username"), Some(&serde_json::json!("amy")));
        assert_eq!(json.get("state"), Some(&serde_json::json!("DEMAND")));
        assert_eq!(json.get("current_step"), Some(&serde_json::json!(0)));
        assert_eq!(json.get("viewed_step"), Some(&serde_json::json!(0)));
        assert_eq!(json.get("comparator_step"), Some(&serde_json::json!(0)));
        assert_eq!(json.get("body"), Some(&serde_json::json!([])));
    }

    #[test]
    fn missing_entity_has_no_page() {
        let user = User::new("amy", "a");
        assert!(commodity_page(&user, CommodityId::new(1)).is_none());
        assert!(industry_page(&user, IndustryId::new(1)).is_none());
        assert!(class_page(&user, ClassId::new(1)).is_none());
        assert!(index_page(&user).body.commodities.records.is_empty());
    }
}
