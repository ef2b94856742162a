use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Maximum number of tag suggestions visible at once.
pub const DISPLAY_WINDOW: usize = 5;

/// Per-step tag suggestion state.
///
/// Invariant: `displayed` holds at most [`DISPLAY_WINDOW`] entries, all
/// drawn from `available` minus `selected`. `seen` accumulates every tag
/// ever shown for the step so "load more" never repeats one.
pub struct TagPool {
    available: Vec<String>,
    selected: HashSet<String>,
    displayed: Vec<String>,
    seen: HashSet<String>,
    rng: StdRng,
}

impl TagPool {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic pool for tests and reproducible sessions.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            available: Vec::new(),
            selected: HashSet::new(),
            displayed: Vec::new(),
            seen: HashSet::new(),
            rng,
        }
    }

    /// Replace the candidate list for a new step: everything is reset and
    /// the display window refills in candidate order.
    pub fn reset_with(&mut self, candidates: Vec<String>) {
        self.selected.clear();
        self.displayed.clear();
        self.seen.clear();
        self.available = candidates;
        for tag in &self.available {
            if self.displayed.len() == DISPLAY_WINDOW {
                break;
            }
            if !self.selected.contains(tag) {
                self.displayed.push(tag.clone());
            }
        }
    }

    /// Mark a tag chosen: it leaves the display window for good and a
    /// random undisplayed, unselected candidate backfills its slot.
    /// Returns false when the tag is not currently displayed.
    pub fn select(&mut self, tag: &str) -> bool {
        let Some(position) = self.displayed.iter().position(|t| t == tag) else {
            return false;
        };
        self.displayed.remove(position);
        self.selected.insert(tag.to_string());
        // A chosen tag was shown, so it stays in the exclusion set even
        // though it is no longer in the display window.
        self.seen.insert(tag.to_string());

        let candidates: Vec<&String> = self
            .available
            .iter()
            .filter(|t| !self.selected.contains(*t) && !self.displayed.contains(*t))
            .collect();
        if !candidates.is_empty() {
            let pick = self.rng.gen_range(0..candidates.len());
            self.displayed.push(candidates[pick].clone());
        }
        true
    }

    pub fn displayed(&self) -> &[String] {
        &self.displayed
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Every tag ever shown for this step, in stable order for use as an
    /// exclusion list.
    pub fn seen_sorted(&self) -> Vec<String> {
        let mut seen: Vec<String> = self.seen.iter().cloned().collect();
        seen.sort_unstable();
        seen
    }

    pub fn has_seen(&self, tag: &str) -> bool {
        self.seen.contains(tag)
    }

    /// First half of "load more": the current window counts as seen and
    /// the display empties. Returns the previous window so a failed
    /// refresh can restore it.
    pub fn take_displayed_into_seen(&mut self) -> Vec<String> {
        let previous = std::mem::take(&mut self.displayed);
        for tag in &previous {
            self.seen.insert(tag.clone());
        }
        previous
    }

    /// Second half of "load more": install a fresh batch, filtering out
    /// anything already seen or selected in case the backend ignored the
    /// exclusion list, and mark the new window seen.
    pub fn apply_fresh(&mut self, tags: Vec<String>) {
        for tag in tags {
            if self.displayed.len() == DISPLAY_WINDOW {
                break;
            }
            if self.seen.contains(&tag) || self.selected.contains(&tag) {
                continue;
            }
            if !self.available.contains(&tag) {
                self.available.push(tag.clone());
            }
            self.seen.insert(tag.clone());
            self.displayed.push(tag);
        }
    }

    /// Put back a window saved by [`take_displayed_into_seen`] after a
    /// failed refresh.
    pub fn restore_displayed(&mut self, previous: Vec<String>) {
        self.displayed = previous;
    }
}

impl Default for TagPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("tag-{i}")).collect()
    }

    #[test]
    fn test_reset_fills_window_in_order() {
        let mut pool = TagPool::seeded(1);
        pool.reset_with(candidates(7));
        assert_eq!(pool.displayed(), &candidates(7)[..5]);
    }

    #[test]
    fn test_reset_with_few_candidates() {
        let mut pool = TagPool::seeded(1);
        pool.reset_with(candidates(3));
        assert_eq!(pool.displayed().len(), 3);
    }

    #[test]
    fn test_select_backfills_window() {
        let mut pool = TagPool::seeded(1);
        pool.reset_with(candidates(7));
        assert!(pool.select("tag-2"));
        // 6 unselected candidates remain, so the window stays full.
        assert_eq!(pool.displayed().len(), 5);
        assert!(!pool.displayed().contains(&"tag-2".to_string()));
        // The backfill came from the two candidates that were not shown.
        let last = pool.displayed().last().unwrap();
        assert!(last == "tag-5" || last == "tag-6");
    }

    #[test]
    fn test_window_shrinks_when_candidates_exhaust() {
        let mut pool = TagPool::seeded(1);
        pool.reset_with(candidates(6));
        for i in 0..6 {
            let tag = pool.displayed().first().cloned();
            let Some(tag) = tag else { break };
            assert!(pool.select(&tag), "round {i}");
            let remaining = pool.available_count() - pool.selected_count();
            assert!(pool.displayed().len() <= remaining.min(DISPLAY_WINDOW));
        }
        assert!(pool.displayed().is_empty());
        assert_eq!(pool.selected_count(), 6);
    }

    #[test]
    fn test_select_unknown_tag_is_rejected() {
        let mut pool = TagPool::seeded(1);
        pool.reset_with(candidates(7));
        assert!(!pool.select("not-displayed"));
        assert_eq!(pool.displayed().len(), 5);
    }

    #[test]
    fn test_load_more_excludes_previously_seen() {
        let mut pool = TagPool::seeded(1);
        pool.reset_with(candidates(10));
        let previous = pool.take_displayed_into_seen();
        assert_eq!(previous.len(), 5);
        assert!(pool.displayed().is_empty());

        // A sloppy backend echoing already-seen tags gets filtered.
        let mut batch = candidates(10)[3..9].to_vec();
        batch.push("tag-0".into());
        pool.apply_fresh(batch);

        for tag in pool.displayed() {
            assert!(!previous.contains(tag), "repeated tag {tag}");
        }
        assert_eq!(pool.displayed(), &candidates(10)[5..9]);
    }

    #[test]
    fn test_selected_tags_stay_in_exclusion_set() {
        let mut pool = TagPool::seeded(1);
        pool.reset_with(candidates(7));
        assert!(pool.select("tag-1"));
        pool.take_displayed_into_seen();

        let excluded = pool.seen_sorted();
        assert!(excluded.contains(&"tag-1".to_string()));
        // the chosen tag plus the five that were on display afterwards
        assert_eq!(excluded.len(), 6);
        assert!(pool.has_seen("tag-1"));
    }

    #[test]
    fn test_restore_after_failed_refresh() {
        let mut pool = TagPool::seeded(1);
        pool.reset_with(candidates(7));
        let previous = pool.take_displayed_into_seen();
        pool.restore_displayed(previous.clone());
        assert_eq!(pool.displayed(), previous.as_slice());
    }

    #[test]
    fn test_apply_fresh_empty_batch_leaves_display_empty() {
        let mut pool = TagPool::seeded(1);
        pool.reset_with(candidates(5));
        pool.take_displayed_into_seen();
        pool.apply_fresh(Vec::new());
        assert!(pool.displayed().is_empty());
    }
}
