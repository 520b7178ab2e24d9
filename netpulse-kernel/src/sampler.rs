/**
 * ÉCHANTILLONNEUR DES CLIENTS ACTIFS - Série glissante (timestamp, nb actifs)
 *
 * RÔLE : Compter les appareils Active et garder l'historique de la dernière heure.
 *
 * FONCTIONNEMENT :
 * - Deux déclencheurs, même transition sample() : tick périodique + mutation réussie
 * - Ajout en queue uniquement, jamais de dédoublonnage (chaque trigger = un point)
 * - Éviction en tête des points sortis de la fenêtre de rétention
 *
 * VERROUS : série (externe) puis registre (interne). Le registre est lu via un appel
 * complet qui relâche son verrou avant de rendre la main ; il ne rappelle jamais
 * l'échantillonneur sous son propre verrou, donc pas de cycle possible.
 */

use std::collections::VecDeque;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::task::{self, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};

use crate::models::{Device, DeviceStatus, Sample};
use crate::registry::DeviceRegistry;
use crate::state::{new_state, Shared};

pub const DEFAULT_RETENTION: Duration = Duration::from_secs(60 * 60);

/// Ce que l'échantillonneur sait lire : un instantané complet des appareils
pub trait DeviceSource: Send + Sync {
    fn snapshot(&self) -> Vec<Device>;
}

impl DeviceSource for DeviceRegistry {
    fn snapshot(&self) -> Vec<Device> {
        self.list()
    }
}

#[derive(Clone)]
pub struct ActivitySampler<S> {
    source: S,
    series: Shared<VecDeque<Sample>>,
    retention: time::Duration,
}

impl<S: DeviceSource> ActivitySampler<S> {
    pub fn new(source: S, retention: Duration) -> Self {
        Self {
            source,
            series: new_state(VecDeque::new()),
            retention: time::Duration::try_from(retention).unwrap_or(time::Duration::HOUR),
        }
    }

    pub fn sample(&self) -> Sample {
        self.sample_at(OffsetDateTime::now_utc())
    }

    /// Ajoute un point daté de `now` et évince tout point daté de
    /// `now - retention` ou avant. Le point ajouté reste toujours visible.
    pub fn sample_at(&self, now: OffsetDateTime) -> Sample {
        let mut series = self.series.lock();

        let count = self
            .source
            .snapshot()
            .iter()
            .filter(|d| d.status == DeviceStatus::Active)
            .count();

        let sample = Sample { timestamp: now, count };
        series.push_back(sample.clone());

        // rétention hors bornes : rien n'est assez vieux pour sortir
        if let Some(cutoff) = now.checked_sub(self.retention) {
            while series.len() > 1 && series.front().is_some_and(|s| s.timestamp <= cutoff) {
                series.pop_front();
            }
        }

        tracing::debug!(count, retained = series.len(), "active clients sampled");
        sample
    }

    pub fn series(&self) -> Vec<Sample> {
        self.series.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.series.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.lock().is_empty()
    }
}

impl<S: DeviceSource + Clone + 'static> ActivitySampler<S> {
    /// Démarre le déclencheur périodique : premier point une `period` après
    /// le lancement, puis un par `period` pour toute la vie du process.
    /// Les ticks manqués sont décalés, jamais rejoués en rafale.
    pub fn spawn_timer(&self, period: Duration) -> JoinHandle<()> {
        let sampler = self.clone();
        task::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                sampler.sample();
            }
        })
    }
}
