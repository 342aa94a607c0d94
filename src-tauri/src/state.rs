use crate::runtime::EventSink;
use resq_core::capability::CapabilityTable;
use resq_core::config::ResqConfig;
use resq_core::geolocation::{FixedPosition, GeolocationProbe};
use resq_core::incident::IncidentServices;
use resq_core::navigation::NavMenu;
use resq_core::store::SqliteStore;
use resq_core::LocationHierarchy;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub config: Arc<ResqConfig>,
    pub hierarchy: Arc<LocationHierarchy>,
    pub capabilities: Arc<CapabilityTable>,
    pub menu: Arc<NavMenu>,
    pub sink: Arc<dyn EventSink>,
}

impl AppState {
    /// The desktop has no sensor; a configured fixed position stands in
    /// for one, otherwise geolocation is unsupported.
    pub fn probe(&self) -> GeolocationProbe<FixedPosition> {
        match self.config.device_position {
            Some(position) => GeolocationProbe::new(FixedPosition(Some(position))),
            None => GeolocationProbe::unsupported(),
        }
    }

    pub fn incident_services(&self) -> IncidentServices<Arc<SqliteStore>, FixedPosition> {
        IncidentServices {
            repository: Arc::clone(&self.store),
            probe: self.probe(),
            hierarchy: Arc::clone(&self.hierarchy),
            capabilities: Arc::clone(&self.capabilities),
        }
    }
}
