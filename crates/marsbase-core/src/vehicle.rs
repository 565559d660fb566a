use crate::id::{ResourceId, VehicleId};
use crate::loading::LoadingController;
use crate::manifest::SuppliesManifest;
use crate::store::ResourceStore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A vehicle parked at a settlement, with its own cargo hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub(crate) name: String,
    pub(crate) store: ResourceStore,
    pub(crate) loading: Option<LoadingController>,
}

impl Vehicle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: ResourceStore::new(),
            loading: None,
        }
    }

    /// Cap how much of `resource` the hold can take.
    pub fn with_capacity(mut self, resource: ResourceId, kg: f64) -> Self {
        self.store.set_amount_capacity(resource, kg);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ResourceStore {
        &mut self.store
    }

    pub fn loading(&self) -> Option<&LoadingController> {
        self.loading.as_ref()
    }

    /// A load is underway (not yet completed or failed).
    pub fn is_loading(&self) -> bool {
        self.loading
            .as_ref()
            .is_some_and(|c| !c.is_completed() && !c.is_failure())
    }

    /// Start loading `manifest`, or stop loading with `None`.
    ///
    /// A load already in progress is kept; start a new one only after the
    /// previous one has finished or been cleared.
    pub fn set_loading(&mut self, id: VehicleId, manifest: Option<SuppliesManifest>) {
        match manifest {
            None => self.loading = None,
            Some(_) if self.is_loading() => {
                warn!(vehicle = %self.name, "already loading, new manifest ignored");
            }
            Some(manifest) => {
                info!(vehicle = %self.name, mass = manifest.total_amount_mass(), "loading started");
                self.loading = Some(LoadingController::new(id, manifest));
            }
        }
    }
}
