//! Generic filter/aggregation engine behind every monitoring domain.
//!
//! # Responsibility
//! - Own the loaded points and the derived `filtered` and `time_filtered` views.
//! - Recompute per-point statistics whenever the temporal window moves.
//!
//! # Invariants
//! - `time_filtered ⊆ filtered ⊆ all`, each an ascending index list, so
//!   relative order is always that of `all`.
//! - Derived state is a pure function of the points, the installed form
//!   filter and the temporal window: recomputing twice yields the same views.
//! - The installed form filter outlives reloads; `filtered` is recomputed
//!   from it on every `init_all_items`.
//! - Only the owning thread mutates a manager.

use crate::filter::FormFilter;
use crate::manager::ext::PointExt;
use crate::model::observation::YearMonth;
use crate::model::point::{AlarmLevel, Point};
use crate::temporal::{TemporalManager, TemporalRange};
use log::{debug, info};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Per-domain behaviour plugged into [`BaseManager`].
pub trait DomainStrategy<D> {
    /// Stable domain label used in logs and registry ids.
    fn domain(&self) -> &'static str;

    /// Display order of loaded points.
    fn compare(&self, a: &Point<D>, b: &Point<D>) -> Ordering {
        a.name.cmp(&b.name)
    }

    /// Whether a form-filtered point stays visible in the current window.
    fn retain(&self, point: &Point<D>, ext: &PointExt, _temporal: &TemporalManager) -> bool {
        retain_by_observations(point, ext)
    }

    /// Dates this point contributes to the dataset's temporal range.
    fn date_range(&self, point: &Point<D>) -> Option<TemporalRange> {
        TemporalRange::of_dates(point.observations.iter().map(|observation| observation.date))
    }
}

/// Default retention: points with nothing to date are always kept, the rest
/// need at least one observation inside the window.
pub fn retain_by_observations<D>(point: &Point<D>, ext: &PointExt) -> bool {
    point.observations.is_empty() || ext.date_latest.is_none() || !ext.filtered_observations.is_empty()
}

/// Plain alphabetical strategy for domains without special rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByName(pub &'static str);

impl<D> DomainStrategy<D> for ByName {
    fn domain(&self) -> &'static str {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
    /// A filter result referenced an item outside the loaded dataset.
    IndexOutOfBounds { index: usize, len: usize },
    /// A filter result was not strictly ascending.
    UnorderedIndices,
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "filter index {index} is outside {len} loaded items")
            }
            Self::UnorderedIndices => write!(f, "filter indices must be strictly ascending"),
        }
    }
}

impl Error for ManagerError {}

/// Loaded points plus the views derived from them.
pub struct BaseManager<D, S> {
    strategy: S,
    form_filter: FormFilter,
    snapshot_id: Option<Uuid>,
    all_items: Vec<Point<D>>,
    ext: Vec<PointExt>,
    filtered: Vec<usize>,
    time_filtered: Vec<usize>,
    temporal_range: Option<TemporalRange>,
    selected: Option<usize>,
}

impl<D, S: DomainStrategy<D>> BaseManager<D, S> {
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            form_filter: FormFilter::default(),
            snapshot_id: None,
            all_items: Vec::new(),
            ext: Vec::new(),
            filtered: Vec::new(),
            time_filtered: Vec::new(),
            temporal_range: None,
            selected: None,
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn domain(&self) -> &'static str {
        self.strategy.domain()
    }

    /// Replaces the whole dataset and returns its new snapshot id.
    ///
    /// The installed form filter is re-run over the new items; the
    /// time-filtered view stays empty until
    /// [`apply_temporal_filter`](Self::apply_temporal_filter) runs.
    pub fn init_all_items(&mut self, mut items: Vec<Point<D>>) -> Uuid {
        items.sort_by(|a, b| self.strategy.compare(a, b));

        self.temporal_range = items
            .iter()
            .filter_map(|point| self.strategy.date_range(point))
            .reduce(|acc, range| acc.union(&range));
        self.ext = items.iter().map(PointExt::for_point).collect();
        self.filtered = self.form_filter.apply(&items);
        self.time_filtered.clear();
        self.selected = None;
        self.all_items = items;

        let snapshot_id = Uuid::new_v4();
        self.snapshot_id = Some(snapshot_id);
        info!(
            "event=manager_load module=manager status=ok domain={} items={} snapshot={}",
            self.domain(),
            self.all_items.len(),
            snapshot_id
        );
        snapshot_id
    }

    pub fn snapshot_id(&self) -> Option<Uuid> {
        self.snapshot_id
    }

    /// `[first, last]` over every point of the current snapshot.
    pub fn temporal_range(&self) -> Option<TemporalRange> {
        self.temporal_range
    }

    pub fn all_items(&self) -> &[Point<D>] {
        &self.all_items
    }

    pub fn filtered_indices(&self) -> &[usize] {
        &self.filtered
    }

    pub fn time_filtered_indices(&self) -> &[usize] {
        &self.time_filtered
    }

    pub fn filtered_items(&self) -> impl Iterator<Item = &Point<D>> + '_ {
        self.filtered.iter().map(move |&index| &self.all_items[index])
    }

    pub fn time_filtered_items(&self) -> impl Iterator<Item = &Point<D>> + '_ {
        self.time_filtered.iter().map(move |&index| &self.all_items[index])
    }

    /// Points of the time-filtered view together with their derived state.
    pub fn time_filtered_with_ext(&self) -> impl Iterator<Item = (&Point<D>, &PointExt)> + '_ {
        self.time_filtered
            .iter()
            .map(move |&index| (&self.all_items[index], &self.ext[index]))
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.all_items.iter().position(|point| point.name == name)
    }

    pub fn ext(&self, index: usize) -> Option<&PointExt> {
        self.ext.get(index)
    }

    pub fn ext_by_name(&self, name: &str) -> Option<&PointExt> {
        self.index_of(name).and_then(|index| self.ext.get(index))
    }

    pub fn form_filter(&self) -> &FormFilter {
        &self.form_filter
    }

    /// Installs `filter`, recomputes `filtered` from it and cascades into the
    /// temporal filter. The filter is kept for later reloads.
    pub fn set_form_filter(
        &mut self,
        filter: FormFilter,
        temporal: &TemporalManager,
    ) -> Result<(), ManagerError> {
        let indices = filter.apply(&self.all_items);
        self.form_filter = filter;
        self.set_filtered(indices, temporal)
    }

    /// Installs a form-filter result and cascades into the temporal filter.
    pub fn set_filtered(
        &mut self,
        indices: Vec<usize>,
        temporal: &TemporalManager,
    ) -> Result<(), ManagerError> {
        let len = self.all_items.len();
        if let Some(&index) = indices.iter().find(|&&index| index >= len) {
            return Err(ManagerError::IndexOutOfBounds { index, len });
        }
        if indices.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ManagerError::UnorderedIndices);
        }

        self.filtered = indices;
        self.apply_temporal_filter(temporal);
        Ok(())
    }

    /// Rebuilds `time_filtered` from `filtered` for the current window.
    ///
    /// Derived statistics are refreshed for every loaded point, so a point
    /// re-entering the form filter never shows stale numbers.
    pub fn apply_temporal_filter(&mut self, temporal: &TemporalManager) {
        for (point, ext) in self.all_items.iter().zip(self.ext.iter_mut()) {
            ext.recompute(point, temporal);
        }

        let strategy = &self.strategy;
        let all_items = &self.all_items;
        let ext = &self.ext;
        self.time_filtered = self
            .filtered
            .iter()
            .copied()
            .filter(|&index| strategy.retain(&all_items[index], &ext[index], temporal))
            .collect();

        debug!(
            "event=temporal_filter module=manager status=ok domain={} filtered={} retained={} revision={}",
            self.domain(),
            self.filtered.len(),
            self.time_filtered.len(),
            temporal.revision()
        );
    }

    /// Selects a point by name; returns `false` when no such point is loaded.
    pub fn select(&mut self, name: &str) -> bool {
        self.selected = self.index_of(name);
        self.selected.is_some()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Point<D>> {
        self.selected.and_then(|index| self.all_items.get(index))
    }

    /// Monthly measurement counts summed over the time-filtered points.
    pub fn measurement_histogram(&self) -> BTreeMap<YearMonth, usize> {
        let mut histogram = BTreeMap::new();
        for &index in &self.time_filtered {
            for (month, count) in &self.ext[index].measurement_histogram {
                *histogram.entry(*month).or_insert(0) += count;
            }
        }
        histogram
    }

    /// Number of time-filtered points per derived alarm level.
    pub fn alarm_level_counts(&self) -> BTreeMap<AlarmLevel, usize> {
        let mut counts = BTreeMap::new();
        for &index in &self.time_filtered {
            if let Some(level) = self.ext[index].alarm_level {
                *counts.entry(level).or_insert(0) += 1;
            }
        }
        counts
    }
}
