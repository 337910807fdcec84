//! Rejection-free event selector.
//!
//! Rejection-free KMC draws directly from the rate distribution: a
//! cumulative-rate tree makes every draw a single `O(log N)` descent, and
//! every draw is accepted. The cost is keeping the tree current. The
//! selector does this lazily through an impact table: firing an event
//! only changes the rates of the events it impacts, and those are
//! re-evaluated at the start of the *next* selection, after the caller
//! has advanced the simulation state the calculator reads from.

use std::collections::HashMap;

use crate::core::error::SelectorError;
use crate::core::event_tree::EventRateTree;
use crate::core::selector::{EventId, EventSelectorBase, RateCalculator};

/// Event selector using the rejection-free KMC algorithm.
#[derive(Debug)]
pub struct RejectionFreeEventSelector<I, C> {
    base: EventSelectorBase<C>,
    /// Tree of current event rates, built once at construction.
    event_rate_tree: EventRateTree<I>,
    /// For each event, the events whose rates change when it fires.
    /// Structure is immutable after construction; every known event id
    /// has an entry.
    impact_table: HashMap<I, Vec<I>>,
    /// Event selected by the previous call, whose impacted rates are
    /// still stale. `None` only when the tree is fully current.
    pending_impacted: Option<I>,
}

impl<I: EventId, C: RateCalculator<I>> RejectionFreeEventSelector<I, C> {
    /// Create a selector over `event_id_list` with the given impact
    /// table.
    ///
    /// Initial rates are read from the calculator. The impact table is
    /// copied in; ids without an entry get an empty one, meaning firing
    /// them impacts no rates.
    ///
    /// # Errors
    ///
    /// Fails if the id list is empty or contains duplicates, or the
    /// calculator returns an invalid rate for any id.
    pub fn new(
        rate_calculator: C,
        event_id_list: Vec<I>,
        mut impact_table: HashMap<I, Vec<I>>,
    ) -> Result<Self, SelectorError> {
        if event_id_list.is_empty() {
            return Err(SelectorError::EmptyEventIdList);
        }
        let base = EventSelectorBase::new(rate_calculator);
        let initial_rates = base.calculate_rates(&event_id_list)?;
        let event_rate_tree = EventRateTree::new(&event_id_list, &initial_rates)?;
        for &id in &event_id_list {
            impact_table.entry(id).or_default();
        }
        Ok(Self {
            base,
            event_rate_tree,
            impact_table,
            pending_impacted: None,
        })
    }

    /// Select one event; returns its id and the Poisson time step.
    ///
    /// The tree reflects the rates as of the previous selection except
    /// for the events impacted by it; those are refreshed from the
    /// calculator first, so the draw sees every rate change the caller
    /// applied since the last call.
    ///
    /// # Errors
    ///
    /// Fails if the total rate is not positive (the chain is dead), or
    /// the calculator returns an invalid rate during refresh.
    pub fn select_event(&mut self) -> Result<(I, f64), SelectorError> {
        self.refresh_impacted_rates()?;

        let total_rate = self.event_rate_tree.total_rate();
        if total_rate <= 0.0 {
            return Err(SelectorError::ZeroTotalRate);
        }
        let time_step = self.base.calculate_time_step(total_rate);

        // u lies in (0, total_rate]; the query precondition holds.
        let query_value = total_rate * self.base.random_generator.sample_unit_interval();
        let selected = self.event_rate_tree.query_tree(query_value)?;

        debug_assert!(
            self.pending_impacted.is_none(),
            "impacted rates from the previous selection were not refreshed"
        );
        self.pending_impacted = Some(selected);
        Ok((selected, time_step))
    }

    /// Re-evaluate the rates of the events impacted by the previous
    /// selection and clear the pending marker.
    fn refresh_impacted_rates(&mut self) -> Result<(), SelectorError> {
        let Some(selected) = self.pending_impacted.take() else {
            return Ok(());
        };
        let impacted = self
            .impact_table
            .get(&selected)
            .ok_or_else(|| SelectorError::UnknownEventId {
                id: format!("{selected:?}"),
            })?;
        for &id in impacted {
            let rate = self.base.calculate_rate(id)?;
            self.event_rate_tree.update_rate(id, rate)?;
        }
        Ok(())
    }

    /// Reseed the internal random generator.
    pub fn reseed(&mut self, seed: u64) {
        self.base.reseed(seed);
    }

    /// Seed the internal generator was last initialised with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.base.seed()
    }

    /// The current total rate, as stored in the tree.
    #[must_use]
    pub fn total_rate(&self) -> f64 {
        self.event_rate_tree.total_rate()
    }

    /// Read access to the event-rate tree, for inspection and tests.
    #[must_use]
    pub const fn rate_tree(&self) -> &EventRateTree<I> {
        &self.event_rate_tree
    }

    /// The impacted-events list for `id`, if known.
    #[must_use]
    pub fn impacted_events(&self, id: I) -> Option<&[I]> {
        self.impact_table.get(&id).map(Vec::as_slice)
    }

    /// The injected rate calculator.
    #[must_use]
    pub const fn rate_calculator(&self) -> &C {
        &self.base.rate_calculator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::RandomGenerator;
    use crate::core::stats::{deviation_within, mean, standard_error_of_mean};
    use crate::core::test_support::{
        hashed_sequence, EvenOddRateCalculator, OneHotRateCalculator, UniformRateCalculator,
        TEST_SEED, TEST_SIGMA,
    };

    /// Impact table linking every event to itself and its successor
    /// (cyclically) in the id list.
    fn neighbor_impact_table(event_ids: &[i64]) -> HashMap<i64, Vec<i64>> {
        event_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, vec![id, event_ids[(i + 1) % event_ids.len()]]))
            .collect()
    }

    /// Impact table linking every event to every event.
    fn complete_impact_table(event_ids: &[i64]) -> HashMap<i64, Vec<i64>> {
        event_ids
            .iter()
            .map(|&id| (id, event_ids.to_vec()))
            .collect()
    }

    #[test]
    fn test_construct_rejects_bad_configuration() {
        let calculator = UniformRateCalculator::new(1.0);
        assert!(matches!(
            RejectionFreeEventSelector::new(&calculator, Vec::<i64>::new(), HashMap::new()),
            Err(SelectorError::EmptyEventIdList)
        ));
        assert!(matches!(
            RejectionFreeEventSelector::new(&calculator, vec![1_i64, 1], HashMap::new()),
            Err(SelectorError::DuplicateEventId { .. })
        ));
    }

    #[test]
    fn test_construction_fills_missing_impact_entries() {
        let calculator = UniformRateCalculator::new(1.0);
        let selector =
            RejectionFreeEventSelector::new(&calculator, vec![1_i64, 2, 3], HashMap::new())
                .unwrap();
        for id in [1_i64, 2, 3] {
            assert_eq!(selector.impacted_events(id), Some(&[][..]));
        }
    }

    #[test]
    fn test_one_hot_selects_only_hot_event() {
        let event_ids = hashed_sequence(1000);
        let calculator = OneHotRateCalculator::new(event_ids[0]);
        let impact_table = neighbor_impact_table(&event_ids);
        let mut selector =
            RejectionFreeEventSelector::new(&calculator, event_ids.clone(), impact_table).unwrap();
        selector.reseed(TEST_SEED);

        // The neighbour impact table only refreshes the fired event and
        // its successor, but moving the hot id is exactly such a
        // neighbour move: fire hot, make its successor hot.
        let mut expected = event_ids[0];
        for step in 0..event_ids.len() {
            let (selected, time_step) = selector.select_event().unwrap();
            assert_eq!(selected, expected, "wrong event at step {step}");
            assert!(time_step > 0.0);
            let successor = event_ids[(step + 1) % event_ids.len()];
            calculator.set_hot_id(successor);
            expected = successor;
        }
    }

    #[test]
    fn test_average_time_step() {
        let event_ids = hashed_sequence(1000);
        let n_samples = 10_000;
        let r0 = 1.5;

        let calculator = UniformRateCalculator::new(r0);
        let impact_table = complete_impact_table(&event_ids);
        let mut selector =
            RejectionFreeEventSelector::new(&calculator, event_ids.clone(), impact_table).unwrap();
        selector.reseed(TEST_SEED);

        let samples: Vec<f64> = (0..n_samples)
            .map(|_| selector.select_event().unwrap().1)
            .collect();

        let true_mean = 1.0 / (event_ids.len() as f64 * r0);
        let standard_error = standard_error_of_mean(true_mean, samples.len());
        assert!(deviation_within(
            mean(&samples),
            true_mean,
            standard_error,
            TEST_SIGMA
        ));
    }

    #[test]
    fn test_empty_impact_table_keeps_construction_rates() {
        // With no impacts, rates stay as they were at construction and
        // selection keeps working.
        let event_ids = hashed_sequence(100);
        let calculator = UniformRateCalculator::new(1.0);
        let mut selector =
            RejectionFreeEventSelector::new(&calculator, event_ids.clone(), HashMap::new())
                .unwrap();
        selector.reseed(TEST_SEED);

        // Later calculator changes must never reach the tree.
        calculator.set_rate(123.0);
        for _ in 0..100 {
            let (selected, _) = selector.select_event().unwrap();
            assert!(event_ids.contains(&selected));
        }
        assert_eq!(selector.total_rate(), event_ids.len() as f64);
    }

    #[test]
    fn test_even_odd_state_coupling() {
        // All events start at rate 1. The impact table links every even
        // id to all even ids. Once an even event fires, the calculator
        // is switched to rate 0 for even ids; the next refresh zeroes
        // exactly the even leaves, and only odd events can fire from
        // then on.
        let event_ids: Vec<i64> = (0..1000).collect();
        let even_ids: Vec<i64> = event_ids.iter().copied().filter(|id| id % 2 == 0).collect();
        let impact_table: HashMap<i64, Vec<i64>> = even_ids
            .iter()
            .map(|&id| (id, even_ids.clone()))
            .collect();

        let calculator = EvenOddRateCalculator::new(1.0, 1.0);
        let mut selector =
            RejectionFreeEventSelector::new(&calculator, event_ids, impact_table).unwrap();
        selector.reseed(TEST_SEED);

        let mut selected = 1_i64;
        while selected % 2 != 0 {
            selected = selector.select_event().unwrap().0;
        }

        calculator.set_even_rate(0.0);
        for _ in 0..100 {
            let (selected, _) = selector.select_event().unwrap();
            assert_eq!(selected % 2, 1, "even event selected after shut-off");
        }
    }

    #[test]
    fn test_seeded_single_step() {
        // ids [0, 1, 2] at rate 1: with a mirror generator on the same
        // seed, the time step is -ln(u1)/3 and the selected id is the
        // smallest with 3*u2 <= cumulative rate.
        let event_ids = vec![0_i64, 1, 2];
        let calculator = UniformRateCalculator::new(1.0);
        let impact_table = complete_impact_table(&event_ids);
        let mut selector =
            RejectionFreeEventSelector::new(&calculator, event_ids.clone(), impact_table).unwrap();

        for seed in [0_u64, 1, 7, 42, 1_000_003] {
            selector.reseed(seed);
            let mut mirror = RandomGenerator::new();
            mirror.reseed(seed);
            let u1 = mirror.sample_unit_interval();
            let u2 = mirror.sample_unit_interval();

            let (selected, time_step) = selector.select_event().unwrap();
            assert_eq!(time_step.to_bits(), (-u1.ln() / 3.0).to_bits());

            let query_value = 3.0 * u2;
            let expected = event_ids
                .iter()
                .position(|&id| query_value <= (id + 1) as f64)
                .unwrap() as i64;
            assert_eq!(selected, expected);
        }
    }

    #[test]
    fn test_identically_seeded_selectors_agree() {
        let event_ids = hashed_sequence(500);
        let calculator = UniformRateCalculator::new(0.7);
        let impact_table = neighbor_impact_table(&event_ids);

        let mut a =
            RejectionFreeEventSelector::new(&calculator, event_ids.clone(), impact_table.clone())
                .unwrap();
        let mut b =
            RejectionFreeEventSelector::new(&calculator, event_ids, impact_table).unwrap();
        a.reseed(0);
        b.reseed(0);

        for _ in 0..100 {
            let (id_a, dt_a) = a.select_event().unwrap();
            let (id_b, dt_b) = b.select_event().unwrap();
            assert_eq!(id_a, id_b);
            assert_eq!(dt_a.to_bits(), dt_b.to_bits());
        }
    }

    #[test]
    fn test_zero_total_rate_is_fatal() {
        let calculator = UniformRateCalculator::new(0.0);
        let mut selector =
            RejectionFreeEventSelector::new(&calculator, vec![1_i64, 2], HashMap::new()).unwrap();
        selector.reseed(TEST_SEED);
        assert_eq!(selector.select_event(), Err(SelectorError::ZeroTotalRate));
    }

    #[test]
    fn test_refresh_only_touches_impacted_events() {
        // Event 0 impacts only itself; events 1 and 2 impact nothing.
        // After 0 fires, a calculator change is visible in leaf 0 alone.
        let event_ids = vec![0_i64, 1, 2];
        let calculator = OneHotRateCalculator::new(0_i64);
        let impact_table: HashMap<i64, Vec<i64>> = [(0_i64, vec![0_i64])].into_iter().collect();
        let mut selector =
            RejectionFreeEventSelector::new(&calculator, event_ids, impact_table).unwrap();
        selector.reseed(TEST_SEED);

        let (selected, _) = selector.select_event().unwrap();
        assert_eq!(selected, 0);

        // Move the hot id; only leaf 0 is refreshed on the next call, so
        // the tree sees rate 0 for event 0 and stale rate 0 for the
        // others: the chain is dead.
        calculator.set_hot_id(2);
        assert_eq!(selector.select_event(), Err(SelectorError::ZeroTotalRate));
    }
}
