//! Deterministic bucketing of visitors into groups and variations.
use std::{io::Cursor, sync::Arc};

use crate::{
    datafile::{Experiment, Group, TrafficAllocation, Variation},
    DatafileIndex, LogLevel, Logger,
};

/// Seed shared by every SDK implementation. Changing it reassigns every visitor.
const HASH_SEED: u32 = 1;

/// Number of buckets in a bucketing space.
pub const MAX_TRAFFIC_VALUE: u32 = 10_000;

const MAX_HASH_VALUE: f64 = 4_294_967_296.0;

/// Maps a bucketing key to a bucket value in `[0, MAX_TRAFFIC_VALUE)`.
pub trait BucketHasher: Send + Sync {
    /// Compute the bucket value of `bucketing_key`.
    fn generate_bucket_value(&self, bucketing_key: &str) -> u32;
}

/// The production hasher: MurmurHash3 (x86, 32-bit) with seed 1.
#[derive(Debug, Default, Clone, Copy)]
pub struct Murmur3Hasher;

impl BucketHasher for Murmur3Hasher {
    fn generate_bucket_value(&self, bucketing_key: &str) -> u32 {
        let hash = murmur3::murmur3_32(&mut Cursor::new(bucketing_key.as_bytes()), HASH_SEED)
            .expect("reading from an in-memory buffer should not fail");
        let ratio = f64::from(hash) / MAX_HASH_VALUE;
        (ratio * f64::from(MAX_TRAFFIC_VALUE)) as u32
    }
}

/// Assigns visitors to variations using a [`BucketHasher`].
pub struct Bucketer<H = Murmur3Hasher> {
    hasher: H,
    logger: Arc<dyn Logger>,
}

impl Bucketer {
    /// Create a bucketer using the production hasher.
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Bucketer::with_hasher(Murmur3Hasher, logger)
    }
}

impl<H: BucketHasher> Bucketer<H> {
    /// Create a bucketer that hashes with `hasher`.
    pub fn with_hasher(hasher: H, logger: Arc<dyn Logger>) -> Self {
        Bucketer { hasher, logger }
    }

    /// Compute the bucket value of `bucketing_key`.
    pub fn generate_bucket_value(&self, bucketing_key: &str) -> u32 {
        self.hasher.generate_bucket_value(bucketing_key)
    }

    /// Bucket a visitor into a variation of `experiment`.
    ///
    /// Returns an empty variation if the visitor falls outside the experiment's traffic, or
    /// outside the experiment's slice of its mutually exclusive group.
    pub fn bucket(
        &self,
        config: &DatafileIndex,
        experiment: &Experiment,
        bucketing_id: &str,
        user_id: &str,
    ) -> Arc<Variation> {
        if experiment.is_empty() {
            return Arc::default();
        }

        if let Some(group_id) = experiment.group_id() {
            let group = config.get_group(group_id);
            if group.is_empty() {
                return Arc::default();
            }
            if group.policy == Group::RANDOM_POLICY
                && !self.is_in_group_slice(&group, experiment, bucketing_id, user_id)
            {
                return Arc::default();
            }
        }

        let Some(variation_id) =
            self.find_bucket(bucketing_id, user_id, &experiment.id, &experiment.traffic_allocation)
        else {
            self.logger.log(
                LogLevel::Info,
                &format!("User [{user_id}] is in no variation."),
            );
            return Arc::default();
        };

        let variation = config.get_variation_from_id_by_experiment_id(&experiment.id, variation_id);
        if !variation.is_empty() {
            self.logger.log(
                LogLevel::Info,
                &format!(
                    "User [{user_id}] is in variation [{}] of experiment [{}].",
                    variation.key, experiment.key
                ),
            );
        }
        variation
    }

    fn is_in_group_slice(
        &self,
        group: &Group,
        experiment: &Experiment,
        bucketing_id: &str,
        user_id: &str,
    ) -> bool {
        match self.find_bucket(bucketing_id, user_id, &group.id, &group.traffic_allocation) {
            None => {
                self.logger.log(
                    LogLevel::Info,
                    &format!("User [{user_id}] is in no experiment."),
                );
                false
            }
            Some(experiment_id) if experiment_id != experiment.id => {
                self.logger.log(
                    LogLevel::Info,
                    &format!(
                        "User [{user_id}] is not in experiment [{}] of group [{}].",
                        experiment.key, group.id
                    ),
                );
                false
            }
            Some(_) => {
                self.logger.log(
                    LogLevel::Info,
                    &format!(
                        "User [{user_id}] is in experiment [{}] of group [{}].",
                        experiment.key, group.id
                    ),
                );
                true
            }
        }
    }

    /// Find the entity whose range contains the bucket value of `bucketing_id + parent_id`.
    fn find_bucket<'a>(
        &self,
        bucketing_id: &str,
        user_id: &str,
        parent_id: &str,
        traffic_allocation: &'a [TrafficAllocation],
    ) -> Option<&'a str> {
        let bucket_value = self.generate_bucket_value(&format!("{bucketing_id}{parent_id}"));
        self.logger.log(
            LogLevel::Debug,
            &format!(
                "Assigned bucket [{bucket_value}] to user [{user_id}] with bucketing ID [{bucketing_id}]."
            ),
        );

        traffic_allocation
            .iter()
            .find(|allocation| bucket_value < allocation.end_of_range)
            .map(|allocation| allocation.entity_id.as_str())
            .filter(|entity_id| !entity_id.is_empty())
    }
}
