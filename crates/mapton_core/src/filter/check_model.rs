//! Multi-select facet model.

use std::collections::BTreeSet;

/// Checked values of one facet.
///
/// A disabled model, or one with nothing checked, accepts every item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckModel {
    enabled: bool,
    available: BTreeSet<String>,
    checked: BTreeSet<String>,
}

impl Default for CheckModel {
    fn default() -> Self {
        Self {
            enabled: true,
            available: BTreeSet::new(),
            checked: BTreeSet::new(),
        }
    }
}

impl CheckModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Values offered for checking, usually the distinct values of a dataset.
    pub fn available(&self) -> &BTreeSet<String> {
        &self.available
    }

    pub fn set_available<I, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.available = values.into_iter().map(Into::into).collect();
    }

    pub fn checked(&self) -> &BTreeSet<String> {
        &self.checked
    }

    pub fn check(&mut self, value: impl Into<String>) {
        self.checked.insert(value.into());
    }

    pub fn uncheck(&mut self, value: &str) -> bool {
        self.checked.remove(value)
    }

    pub fn check_all(&mut self) {
        self.checked = self.available.clone();
    }

    pub fn clear_checks(&mut self) {
        self.checked.clear();
    }

    /// True when this model actually narrows the result.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.checked.is_empty()
    }

    pub fn accepts(&self, value: Option<&str>) -> bool {
        if !self.is_active() {
            return true;
        }
        value.is_some_and(|value| self.checked.contains(value))
    }
}
