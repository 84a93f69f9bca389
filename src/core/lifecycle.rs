use indexmap::IndexSet;

/// Tracks which points of one series currently own a live visual.
///
/// Each measure pass registers every fetched point; the diff against the
/// previously registered set yields exactly the points whose visuals must be
/// soft-deleted. Rebinding a series to a new chart clears the tracker so the
/// next draw behaves as a first draw.
#[derive(Debug, Clone, Default)]
pub struct PointLifecycleTracker {
    ever_fetched: IndexSet<usize>,
    seen_this_pass: IndexSet<usize>,
}

impl PointLifecycleTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_pass(&mut self) {
        self.seen_this_pass.clear();
    }

    /// Registers a fetched point. Returns `true` when the point is new to the
    /// tracker, meaning its visual must be created this pass.
    pub fn mark_seen(&mut self, entity_index: usize) -> bool {
        self.seen_this_pass.insert(entity_index);
        self.ever_fetched.insert(entity_index)
    }

    /// Ends the pass and returns the points that vanished from the fetched
    /// sequence, in registration order. They are evicted from the tracker.
    pub fn finish_pass(&mut self) -> Vec<usize> {
        let to_delete: Vec<usize> = self
            .ever_fetched
            .iter()
            .copied()
            .filter(|index| !self.seen_this_pass.contains(index))
            .collect();

        for index in &to_delete {
            self.ever_fetched.shift_remove(index);
        }
        to_delete
    }

    #[must_use]
    pub fn is_live(&self, entity_index: usize) -> bool {
        self.ever_fetched.contains(&entity_index)
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.ever_fetched.len()
    }

    /// Unload path: forget everything so reattachment re-creates visuals.
    pub fn clear(&mut self) {
        self.ever_fetched.clear();
        self.seen_this_pass.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::PointLifecycleTracker;

    #[test]
    fn first_sight_reports_creation() {
        let mut tracker = PointLifecycleTracker::new();
        tracker.begin_pass();
        assert!(tracker.mark_seen(0));
        assert!(!tracker.mark_seen(0));
    }

    #[test]
    fn vanished_points_are_returned_and_evicted() {
        let mut tracker = PointLifecycleTracker::new();
        tracker.begin_pass();
        tracker.mark_seen(0);
        tracker.mark_seen(1);
        tracker.mark_seen(2);
        assert!(tracker.finish_pass().is_empty());

        tracker.begin_pass();
        tracker.mark_seen(0);
        tracker.mark_seen(2);
        assert_eq!(tracker.finish_pass(), vec![1]);
        assert_eq!(tracker.live_count(), 2);
        assert!(!tracker.is_live(1));
    }

    #[test]
    fn clear_resets_to_first_draw_state() {
        let mut tracker = PointLifecycleTracker::new();
        tracker.begin_pass();
        tracker.mark_seen(0);
        tracker.finish_pass();

        tracker.clear();
        tracker.begin_pass();
        assert!(tracker.mark_seen(0));
    }
}
