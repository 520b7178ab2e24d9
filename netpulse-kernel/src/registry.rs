/**
 * REGISTRE D'APPAREILS - Table en mémoire des appareils suivis par NetPulse
 *
 * RÔLE : Création, liste, suppression et changement de statut des appareils.
 * Chaque appel prend le verrou une seule fois, pour toute la durée de l'accès à la map.
 *
 * ARCHITECTURE : Handle clonable (Arc<Mutex<DevicesMap>>), aucune persistance.
 * UTILITÉ : Source de vérité lue par l'échantillonneur des clients actifs.
 */

use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::{Device, DeviceStatus, DeviceSummary, DevicesMap};
use crate::state::{new_state, Shared};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Device not found: {0}")]
    NotFound(String),
    #[error("Invalid status '{0}'. Must be either Active or Inactive")]
    InvalidStatus(String),
}

#[derive(Clone, Default)]
pub struct DeviceRegistry {
    devices: Shared<DevicesMap>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self { devices: new_state(DevicesMap::new()) }
    }

    /// Copie de tous les appareils, ordre non garanti
    pub fn list(&self) -> Vec<Device> {
        self.devices.lock().values().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Result<Device, RegistryError> {
        self.devices
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Enregistre un nouvel appareil, toujours Active à la création.
    /// L'id est un UUID v4 : jamais réutilisé pendant la vie du process.
    pub fn add(&self, name: &str, device_type: &str) -> Device {
        let device = Device {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            device_type: device_type.to_string(),
            status: DeviceStatus::Active,
        };
        self.devices.lock().insert(device.id.clone(), device.clone());
        tracing::info!(id = %device.id, name = %device.name, "device added");
        device
    }

    pub fn remove(&self, id: &str) -> Result<Device, RegistryError> {
        let removed = self
            .devices
            .lock()
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        tracing::info!(id = %id, "device removed");
        Ok(removed)
    }

    /// Le statut est validé avant la recherche : un statut invalide laisse
    /// l'appareil intact même si l'id est inconnu.
    pub fn update_status(&self, id: &str, status: &str) -> Result<Device, RegistryError> {
        let status: DeviceStatus = status.parse()?;

        let updated = {
            let mut map = self.devices.lock();
            let Some(device) = map.get_mut(id) else {
                return Err(RegistryError::NotFound(id.to_string()));
            };
            device.status = status;
            device.clone()
        };
        tracing::info!(id = %id, status = %status, "device status updated");
        Ok(updated)
    }

    pub fn active_count(&self) -> usize {
        self.devices
            .lock()
            .values()
            .filter(|d| d.status == DeviceStatus::Active)
            .count()
    }

    pub fn len(&self) -> usize {
        self.devices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.lock().is_empty()
    }

    pub fn summary(&self) -> DeviceSummary {
        let map = self.devices.lock();
        let mut by_type = BTreeMap::new();
        let mut active = 0;
        for device in map.values() {
            *by_type.entry(device.device_type.clone()).or_insert(0) += 1;
            if device.status == DeviceStatus::Active {
                active += 1;
            }
        }
        DeviceSummary {
            total: map.len(),
            active,
            inactive: map.len() - active,
            by_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_add_assigns_active_and_unique_ids() {
        let registry = DeviceRegistry::new();
        let mut ids = HashSet::new();
        for i in 0..50 {
            let dev = registry.add(&format!("dev-{i}"), "Computer");
            assert_eq!(dev.status, DeviceStatus::Active);
            assert!(!dev.id.is_empty());
            assert!(ids.insert(dev.id.clone()), "id reused: {}", dev.id);
        }
        // les ids supprimés ne reviennent pas
        for id in ids.iter().take(25) {
            registry.remove(id).unwrap();
        }
        for _ in 0..25 {
            assert!(ids.insert(registry.add("again", "Mobile").id));
        }
        assert_eq!(registry.len(), 50);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_list_reflects_mutations() {
        let registry = DeviceRegistry::new();
        let a = registry.add("a", "Mobile");
        let b = registry.add("b", "Computer");
        let c = registry.add("c", "Computer");
        registry.update_status(&b.id, "Inactive").unwrap();
        registry.remove(&a.id).unwrap();

        let mut listed = registry.list();
        listed.sort_by(|x, y| x.name.cmp(&y.name));
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, b.id);
        assert_eq!(listed[0].status, DeviceStatus::Inactive);
        assert_eq!(listed[1], c);
    }

    #[test]
    fn test_remove_unknown_is_not_found() {
        let registry = DeviceRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.remove("nope"),
            Err(RegistryError::NotFound("nope".into()))
        );
    }

    #[test]
    fn test_update_status_errors() {
        let registry = DeviceRegistry::new();
        let dev = registry.add("printer", "Printer");

        assert_eq!(
            registry.update_status(&dev.id, "Broken"),
            Err(RegistryError::InvalidStatus("Broken".into()))
        );
        assert_eq!(registry.get(&dev.id).unwrap(), dev);

        assert_eq!(
            registry.update_status("missing", "Inactive"),
            Err(RegistryError::NotFound("missing".into()))
        );
        // statut invalide signalé avant l'id inconnu
        assert!(matches!(
            registry.update_status("missing", "bogus"),
            Err(RegistryError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_summary_counts() {
        let registry = DeviceRegistry::new();
        let phone = registry.add("phone", "Mobile");
        registry.add("tablet", "Mobile");
        registry.add("desktop", "Computer");
        registry.update_status(&phone.id, "Inactive").unwrap();

        let summary = registry.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.active, 2);
        assert_eq!(summary.inactive, 1);
        assert_eq!(summary.by_type.get("Mobile"), Some(&2));
        assert_eq!(summary.by_type.get("Computer"), Some(&1));
        assert_eq!(registry.active_count(), 2);
    }

    #[test]
    fn test_concurrent_adds_are_serialized() {
        let registry = DeviceRegistry::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let dev = registry.add(&format!("t{t}-{i}"), "Computer");
                        if i % 2 == 0 {
                            registry.update_status(&dev.id, "Inactive").unwrap();
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(registry.len(), 800);
        assert_eq!(registry.active_count(), 400);
    }
}
