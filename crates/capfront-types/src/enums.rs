//! Enumeration types for the circuit of capital.
//!
//! A simulation moves through a fixed cycle of stages. [`ActionState`] is
//! the stage a simulation is waiting in; [`Action`] is the button the user
//! presses to ask the server to carry that stage out.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Action state
// ---------------------------------------------------------------------------

/// The stage of the circuit a simulation is currently waiting in.
///
/// The transition table is a total cycle with no branching:
/// `DEMAND -> SUPPLY -> TRADE -> PRODUCE -> CONSUME -> INVEST -> DEMAND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum ActionState {
    /// Buyers register what they need.
    Demand,
    /// Sellers register what they can sell.
    Supply,
    /// Commodities change hands.
    Trade,
    /// Industries turn inputs into outputs.
    Produce,
    /// Classes consume what they bought.
    Consume,
    /// Profits are put back into production.
    Invest,
}

impl ActionState {
    /// Every state, in cycle order starting from [`ActionState::Demand`].
    pub const ALL: [Self; 6] = [
        Self::Demand,
        Self::Supply,
        Self::Trade,
        Self::Produce,
        Self::Consume,
        Self::Invest,
    ];

    /// The state that follows this one in the circuit.
    pub const fn next(self) -> Self {
        match self {
            Self::Demand => Self::Supply,
            Self::Supply => Self::Trade,
            Self::Trade => Self::Produce,
            Self::Produce => Self::Consume,
            Self::Consume => Self::Invest,
            Self::Invest => Self::Demand,
        }
    }

    /// The upper-case label the server uses for this state.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Demand => "DEMAND",
            Self::Supply => "SUPPLY",
            Self::Trade => "TRADE",
            Self::Produce => "PRODUCE",
            Self::Consume => "CONSUME",
            Self::Invest => "INVEST",
        }
    }

    /// The action that carries a simulation out of this state.
    pub const fn action(self) -> Action {
        match self {
            Self::Demand => Action::Demand,
            Self::Supply => Action::Supply,
            Self::Trade => Action::Trade,
            Self::Produce => Action::Produce,
            Self::Consume => Action::Consume,
            Self::Invest => Action::Invest,
        }
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ActionState {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStage(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A server-executed transition of the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Action {
    /// Register demand.
    Demand,
    /// Register supply.
    Supply,
    /// Exchange commodities.
    Trade,
    /// Produce outputs.
    Produce,
    /// Consume purchased goods.
    Consume,
    /// Reinvest profits.
    Invest,
}

impl Action {
    /// Every action, in circuit order.
    pub const ALL: [Self; 6] = [
        Self::Demand,
        Self::Supply,
        Self::Trade,
        Self::Produce,
        Self::Consume,
        Self::Invest,
    ];

    /// The lower-case name used in `action/<name>` URLs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Demand => "demand",
            Self::Supply => "supply",
            Self::Trade => "trade",
            Self::Produce => "produce",
            Self::Consume => "consume",
            Self::Invest => "invest",
        }
    }

    /// The state this action is performed from.
    pub const fn from_state(self) -> ActionState {
        match self {
            Self::Demand => ActionState::Demand,
            Self::Supply => ActionState::Supply,
            Self::Trade => ActionState::Trade,
            Self::Produce => ActionState::Produce,
            Self::Consume => ActionState::Consume,
            Self::Invest => ActionState::Invest,
        }
    }

    /// The state a simulation is left in once this action completes.
    pub const fn resulting_state(self) -> ActionState {
        self.from_state().next()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStage(s.to_owned()))
    }
}

/// A stage or action name that is not part of the circuit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown circuit stage: {0}")]
pub struct UnknownStage(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_transitions_close_the_cycle() {
        for start in ActionState::ALL {
            let mut state = start;
            for _ in 0..6 {
                state = state.next();
            }
            assert_eq!(state, start);
        }
    }

    #[test]
    fn no_state_is_its_own_successor() {
        for state in ActionState::ALL {
            assert_ne!(state.next(), state);
        }
    }

    #[test]
    fn action_table_follows_circuit() {
        assert_eq!(Action::Demand.resulting_state(), ActionState::Supply);
        assert_eq!(Action::Supply.resulting_state(), ActionState::Trade);
        assert_eq!(Action::Trade.resulting_state(), ActionState::Produce);
        assert_eq!(Action::Produce.resulting_state(), ActionState::Consume);
        assert_eq!(Action::Consume.resulting_state(), ActionState::Invest);
        assert_eq!(Action::Invest.resulting_state(), ActionState::Demand);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("trade".parse::<ActionState>().ok(), Some(ActionState::Trade));
        assert_eq!("Invest".parse::<Action>().ok(), Some(Action::Invest));
        assert!("reset".parse::<Action>().is_err());
    }

    #[test]
    fn unknown_stage_is_an_error_naming_the_input() {
        let err = "FINISHED".parse::<ActionState>().err();
        assert_eq!(err, Some(UnknownStage(String::from("FINISHED"))));
        let boxed: Option<Box<dyn std::error::Error>> = err.map(Into::into);
        assert_eq!(
            boxed.map(|e| e.to_string()).as_deref(),
            Some("unknown circuit stage: FINISHED")
        );
    }

    #[test]
    fn state_serializes_upper_case() {
        let json = serde_json::to_string(&ActionState::Produce).ok();
        assert_eq!(json.as_deref(), Some("\"PRODUCE\""));
        let action = serde_json::to_string(&Action::Consume).ok();
        assert_eq!(action.as_deref(), Some("\"consume\""));
    }

    #[test]
    fn state_action_round_trip() {
        for state in ActionState::ALL {
            assert_eq!(state.action().from_state(), state);
        }
    }
}
