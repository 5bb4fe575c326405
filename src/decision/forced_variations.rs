use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use super::DecisionService;
use crate::{bucketer::BucketHasher, datafile::Variation, DatafileIndex, LogLevel};

/// User-level forced variations: user id → experiment id → variation id.
///
/// Keyed by ids so that entries survive a datafile refresh. Never persisted.
#[derive(Debug, Default)]
pub(super) struct ForcedVariations {
    map: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl ForcedVariations {
    fn lock_read(&self) -> RwLockReadGuard<'_, HashMap<String, HashMap<String, String>>> {
        self.map
            .read()
            .expect("thread holding forced variations lock should not panic")
    }

    fn lock_write(&self) -> RwLockWriteGuard<'_, HashMap<String, HashMap<String, String>>> {
        self.map
            .write()
            .expect("thread holding forced variations lock should not panic")
    }
}

impl<H: BucketHasher> DecisionService<H> {
    /// Force `user_id` into `variation_key` of `experiment_key`, or clear the override when
    /// `variation_key` is `None`.
    ///
    /// Returns `false` if the experiment or variation is not in the datafile.
    pub fn set_forced_variation(
        &self,
        config: &DatafileIndex,
        experiment_key: &str,
        user_id: &str,
        variation_key: Option<&str>,
    ) -> bool {
        // No datafile lookup or logging happens while the lock is held.
        let experiment = config.get_experiment_from_key(experiment_key);
        if experiment.is_empty() {
            return false;
        }

        let Some(variation_key) = variation_key else {
            if let Some(experiments) = self.forced_variations.lock_write().get_mut(user_id) {
                experiments.remove(&experiment.id);
            }
            self.logger.log(
                LogLevel::Debug,
                &format!(
                    "Variation mapped to experiment \"{experiment_key}\" has been removed for user \"{user_id}\"."
                ),
            );
            return true;
        };

        let variation = config.get_variation_from_key(experiment_key, variation_key);
        if variation.is_empty() {
            return false;
        }

        self.forced_variations
            .lock_write()
            .entry(user_id.to_owned())
            .or_default()
            .insert(experiment.id.clone(), variation.id.clone());
        self.logger.log(
            LogLevel::Debug,
            &format!(
                "Set variation \"{}\" for experiment \"{}\" and user \"{user_id}\" in the forced variation map.",
                variation.id, experiment.id
            ),
        );
        true
    }

    /// The variation `user_id` was forced into for `experiment_key`, if any.
    pub fn get_forced_variation(
        &self,
        config: &DatafileIndex,
        experiment_key: &str,
        user_id: &str,
    ) -> Option<Arc<Variation>> {
        let experiments = self.forced_variations.lock_read().get(user_id).cloned();
        let Some(experiments) = experiments else {
            self.logger.log(
                LogLevel::Debug,
                &format!("User \"{user_id}\" is not in the forced variation map."),
            );
            return None;
        };

        let experiment = config.get_experiment_from_key(experiment_key);
        if experiment.is_empty() {
            return None;
        }

        let Some(variation_id) = experiments.get(&experiment.id) else {
            self.logger.log(
                LogLevel::Debug,
                &format!(
                    "No experiment \"{experiment_key}\" mapped to user \"{user_id}\" in the forced variation map."
                ),
            );
            return None;
        };

        let variation = config.get_variation_from_id(experiment_key, variation_id);
        if variation.is_empty() {
            return None;
        }
        self.logger.log(
            LogLevel::Debug,
            &format!(
                "Variation \"{}\" is mapped to experiment \"{experiment_key}\" and user \"{user_id}\" in the forced variation map",
                variation.key
            ),
        );
        Some(variation)
    }
}
