//! Composition root for the monitoring managers.
//!
//! # Responsibility
//! - Own the temporal manager, the service registry and one manager per domain.
//! - Forward every temporal window change to every manager.
//! - Load, filter and select on behalf of callers, always with its own window.
//!
//! # Invariants
//! - Managers are only mutated through this context, and every mutation that
//!   depends on the window reads `self.temporal`. A caller cannot hand a
//!   manager a stale copy of the window.

use crate::domain::activity::{self, Activity, ActivityManager};
use crate::domain::structural::{self, StructuralManager, StructuralPoint};
use crate::domain::topo::{self, TopoManager, TopoPoint};
use crate::domain::vibration::{self, VibrationDataset, VibrationManager};
use crate::domain::{Domain, LoadSummary, ObservationRecord};
use crate::filter::FormFilter;
use crate::manager::base::ManagerError;
use crate::manager::DomainManager;
use crate::registry::{
    RegistryError, ServiceDescriptor, ServiceKind, ServiceProvider, ServiceRegistry,
};
use crate::temporal::{TemporalError, TemporalManager, TemporalRange};
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Map engine selected when the context is created.
pub const DEFAULT_MAP_ENGINE: &str = "engine.globe";

pub struct MonitoringContext {
    temporal: TemporalManager,
    registry: ServiceRegistry,
    vibration: VibrationManager,
    structural: StructuralManager,
    topo: TopoManager,
    activity: ActivityManager,
}

impl Default for MonitoringContext {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitoringContext {
    /// Empty managers, an unbounded window and the built-in layer bundles.
    pub fn new() -> Self {
        let mut context = Self {
            temporal: TemporalManager::unbounded(),
            registry: ServiceRegistry::new(),
            vibration: VibrationManager::new(),
            structural: StructuralManager::new(),
            topo: TopoManager::new(),
            activity: ActivityManager::new(),
        };
        let mut builtins: Vec<ServiceDescriptor> = [
            (vibration::DOMAIN, "Vibration"),
            (structural::DOMAIN, "Structural"),
            (topo::DOMAIN, "Topo"),
            (activity::DOMAIN, "Activities"),
        ]
        .into_iter()
        .map(|(domain, name)| {
            ServiceDescriptor::new(format!("layer.{domain}"), ServiceKind::LayerBundle, name)
        })
        .collect();
        builtins.push(ServiceDescriptor::new(
            DEFAULT_MAP_ENGINE,
            ServiceKind::MapEngine,
            "Globe",
        ));

        for descriptor in builtins {
            let id = descriptor.service_id().to_string();
            if let Err(err) = context.registry.register(Arc::new(descriptor)) {
                warn!("event=register_builtin module=context status=error service={id} error={err}");
            }
        }
        if let Err(err) = context.registry.select_map_engine(DEFAULT_MAP_ENGINE) {
            warn!("event=select_map_engine module=context status=error error={err}");
        }
        context
    }

    pub fn temporal(&self) -> &TemporalManager {
        &self.temporal
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn vibration(&self) -> &VibrationManager {
        &self.vibration
    }

    pub fn structural(&self) -> &StructuralManager {
        &self.structural
    }

    pub fn topo(&self) -> &TopoManager {
        &self.topo
    }

    pub fn activity(&self) -> &ActivityManager {
        &self.activity
    }

    /// Replaces the vibration dataset, deriving channel status at `now`.
    pub fn load_vibration(
        &mut self,
        dataset: VibrationDataset,
        now: NaiveDateTime,
    ) -> LoadSummary {
        self.vibration.load(dataset, now, &self.temporal)
    }

    pub fn load_structural(
        &mut self,
        points: Vec<StructuralPoint>,
        observations: Vec<ObservationRecord>,
    ) -> LoadSummary {
        self.structural.load(points, observations, &self.temporal)
    }

    pub fn load_topo(
        &mut self,
        points: Vec<TopoPoint>,
        observations: Vec<ObservationRecord>,
    ) -> LoadSummary {
        self.topo.load(points, observations, &self.temporal)
    }

    /// Replaces the activities, deriving their status at `now`.
    pub fn load_activities(&mut self, activities: Vec<Activity>, now: NaiveDateTime) -> Uuid {
        self.activity.load(activities, now, &self.temporal)
    }

    /// The form filter currently installed on `domain`.
    pub fn form_filter(&self, domain: Domain) -> &FormFilter {
        match domain {
            Domain::Vibration => self.vibration.form_filter(),
            Domain::Structural => self.structural.form_filter(),
            Domain::Topo => self.topo.form_filter(),
            Domain::Activity => self.activity.form_filter(),
        }
    }

    /// Installs `filter` on `domain` and cascades into its temporal view.
    /// The filter stays installed across reloads until replaced.
    pub fn apply_form_filter(
        &mut self,
        domain: Domain,
        filter: FormFilter,
    ) -> Result<(), ManagerError> {
        let (temporal, manager) = self.manager_mut(domain);
        manager.set_form_filter(filter, temporal)
    }

    /// Selects the point named `name` in `domain`; false when absent.
    pub fn select(&mut self, domain: Domain, name: &str) -> bool {
        self.manager_mut(domain).1.select(name)
    }

    pub fn clear_selection(&mut self, domain: Domain) {
        self.manager_mut(domain).1.clear_selection();
    }

    pub fn register_service(
        &mut self,
        service: Arc<dyn ServiceProvider>,
    ) -> Result<(), RegistryError> {
        self.registry.register(service)
    }

    pub fn select_map_engine(&mut self, id: &str) -> Result<(), RegistryError> {
        self.registry.select_map_engine(id)
    }

    /// Moves the window; every manager re-filters when it actually changed.
    pub fn set_temporal_range(
        &mut self,
        low: NaiveDateTime,
        high: NaiveDateTime,
    ) -> Result<bool, TemporalError> {
        let changed = self.temporal.set_range(low, high)?;
        if changed {
            self.broadcast();
        }
        Ok(changed)
    }

    /// Fits the window to the union of every loaded dataset's range.
    pub fn fit_temporal_to_data(&mut self) -> bool {
        let Some(range) = self.data_range() else {
            return false;
        };
        let changed = self.temporal.fit_to(&range);
        if changed {
            self.broadcast();
        }
        changed
    }

    /// Union of the loaded datasets' date ranges.
    pub fn data_range(&self) -> Option<TemporalRange> {
        [
            self.vibration.temporal_range(),
            self.structural.temporal_range(),
            self.topo.temporal_range(),
            self.activity.temporal_range(),
        ]
        .into_iter()
        .flatten()
        .reduce(|acc, range| acc.union(&range))
    }

    /// Re-runs the temporal filter of every manager with the current window.
    pub fn refresh_all(&mut self) {
        self.broadcast();
    }

    fn manager_mut(&mut self, domain: Domain) -> (&TemporalManager, &mut dyn DomainManager) {
        let manager: &mut dyn DomainManager = match domain {
            Domain::Vibration => &mut self.vibration,
            Domain::Structural => &mut self.structural,
            Domain::Topo => &mut self.topo,
            Domain::Activity => &mut self.activity,
        };
        (&self.temporal, manager)
    }

    fn broadcast(&mut self) {
        let temporal = &self.temporal;
        let managers: [&mut dyn DomainManager; 4] = [
            &mut self.vibration,
            &mut self.structural,
            &mut self.topo,
            &mut self.activity,
        ];
        for manager in managers {
            manager.on_temporal_changed(temporal);
            debug!("event=temporal_refresh module=context domain={}", manager.domain());
        }
        info!(
            "event=temporal_broadcast module=context status=ok revision={} low={} high={}",
            temporal.revision(),
            temporal.low(),
            temporal.high()
        );
    }
}
