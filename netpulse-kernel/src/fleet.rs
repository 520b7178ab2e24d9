/**
 * FLEET - Composition registre + échantillonneur
 *
 * RÔLE : Point d'entrée unique des handlers HTTP. Toute mutation réussie du registre
 * déclenche immédiatement un échantillon, après relâchement du verrou du registre.
 * Un échec (NotFound, statut invalide) ne produit aucun point.
 */

use std::time::Duration;
use tokio::task::JoinHandle;

use crate::models::{Device, DeviceSummary, Sample};
use crate::registry::{DeviceRegistry, RegistryError};
use crate::sampler::ActivitySampler;

#[derive(Clone)]
pub struct Fleet {
    registry: DeviceRegistry,
    sampler: ActivitySampler<DeviceRegistry>,
}

impl Fleet {
    pub fn new(retention: Duration) -> Self {
        let registry = DeviceRegistry::new();
        let sampler = ActivitySampler::new(registry.clone(), retention);
        Self { registry, sampler }
    }

    pub fn list(&self) -> Vec<Device> {
        self.registry.list()
    }

    pub fn get(&self, id: &str) -> Result<Device, RegistryError> {
        self.registry.get(id)
    }

    pub fn summary(&self) -> DeviceSummary {
        self.registry.summary()
    }

    pub fn add(&self, name: &str, device_type: &str) -> Device {
        let device = self.registry.add(name, device_type);
        self.sampler.sample();
        device
    }

    pub fn remove(&self, id: &str) -> Result<(), RegistryError> {
        self.registry.remove(id)?;
        self.sampler.sample();
        Ok(())
    }

    pub fn update_status(&self, id: &str, status: &str) -> Result<Device, RegistryError> {
        let device = self.registry.update_status(id, status)?;
        self.sampler.sample();
        Ok(device)
    }

    pub fn series(&self) -> Vec<Sample> {
        self.sampler.series()
    }

    pub fn spawn_sampler(&self, period: Duration) -> JoinHandle<()> {
        self.sampler.spawn_timer(period)
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn sampler(&self) -> &ActivitySampler<DeviceRegistry> {
        &self.sampler
    }
}
