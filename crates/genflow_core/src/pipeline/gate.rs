use std::fmt;

/// Which variant the user decided to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationChoice {
    Original,
    Humanized,
}

impl fmt::Display for ReconciliationChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconciliationChoice::Original => f.write_str("original"),
            ReconciliationChoice::Humanized => f.write_str("humanized"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Closed,
    Open,
    /// Closed without a choice; both variants are still pending.
    Dismissed,
    Resolved(ReconciliationChoice),
}

/// Side-by-side comparison offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub original: String,
    pub humanized: String,
}

/// Holds the pending comparison between two variants. The gate never touches
/// stage state: it hands the choice back and the sequencer commits it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconciliationGate {
    state: GateState,
    comparison: Option<Comparison>,
}

impl ReconciliationGate {
    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn comparison(&self) -> Option<&Comparison> {
        self.comparison.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, GateState::Open | GateState::Dismissed)
    }

    pub(crate) fn present(&mut self, original: &str, humanized: &str) -> &Comparison {
        self.state = GateState::Open;
        self.comparison.insert(Comparison {
            original: original.to_string(),
            humanized: humanized.to_string(),
        })
    }

    /// Re-opens a dismissed (or already open) gate. Returns the comparison to show.
    pub(crate) fn reopen(&mut self) -> Option<&Comparison> {
        if !self.is_pending() {
            return None;
        }
        self.state = GateState::Open;
        self.comparison.as_ref()
    }

    pub(crate) fn dismiss(&mut self) -> bool {
        if self.state != GateState::Open {
            return false;
        }
        self.state = GateState::Dismissed;
        true
    }

    pub(crate) fn resolve(&mut self, choice: ReconciliationChoice) -> Option<ReconciliationChoice> {
        if !self.is_pending() {
            return None;
        }
        self.state = GateState::Resolved(choice);
        self.comparison = None;
        Some(choice)
    }
}
