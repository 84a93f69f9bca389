use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Running positive/negative totals for one (stack group, entity index) slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StackPosition {
    pub start: f64,
    pub end: f64,
    pub negative_start: f64,
    pub negative_end: f64,
}

/// Stacked interval handed back to the series for one point.
///
/// `start` is the running total before the point's contribution and `end`
/// the total after it; negative points get intervals on the negative side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackedValue {
    pub start: f64,
    pub end: f64,
}

/// Accumulator for one stack group, keyed by entity index.
///
/// Entries use insertion order so diagnostics stay deterministic; correctness
/// of stacked rendering comes from the orchestrator always feeding series in
/// registration order.
#[derive(Debug, Clone, Default)]
pub struct StackAccumulator {
    positions: IndexMap<usize, StackPosition>,
}

impl StackAccumulator {
    /// Extends the positive or negative running total at `entity_index`
    /// depending on the sign of `value`.
    pub fn stack(&mut self, entity_index: usize, value: f64) -> StackedValue {
        let position = self.positions.entry(entity_index).or_default();

        if value >= 0.0 {
            position.start = position.end;
            position.end += value;
            StackedValue {
                start: position.start,
                end: position.end,
            }
        } else {
            position.negative_start = position.negative_end;
            position.negative_end += value;
            StackedValue {
                start: position.negative_start,
                end: position.negative_end,
            }
        }
    }

    #[must_use]
    pub fn position(&self, entity_index: usize) -> Option<StackPosition> {
        self.positions.get(&entity_index).copied()
    }
}

/// Per-chart stacking engine, rebuilt fresh at the start of every measure
/// pass so the previous pass's totals never leak into the next one.
#[derive(Debug, Clone, Default)]
pub struct StackManager {
    groups: IndexMap<u32, StackAccumulator>,
}

impl StackManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_mut(&mut self, stack_group: u32) -> &mut StackAccumulator {
        self.groups.entry(stack_group).or_default()
    }

    #[must_use]
    pub fn group(&self, stack_group: u32) -> Option<&StackAccumulator> {
        self.groups.get(&stack_group)
    }
}
