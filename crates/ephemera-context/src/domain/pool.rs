//! The fragment pool: a bounded, recency-biased model of attention.
//!
//! Fragments enter at a baseline opacity, sit untouched for `fade_delay`,
//! then lose `fade_rate` opacity on every tick until they vanish. The
//! decrement is per tick, not per elapsed time, so the real-time fade speed
//! follows the caller's tick cadence. Decay only ever goes one way.

use chrono::{DateTime, TimeDelta, Utc};
use ephemera_core::error::EngineError;
use ephemera_core::presentation::{FragmentId, FragmentPosition, RemovalReason};
use serde::Deserialize;

use super::fragment::{Fragment, FragmentChange};

/// Default visibility threshold for context queries.
pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.1;

/// Tuning for a [`FragmentPool`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of live fragments.
    pub capacity: usize,
    /// How long a fragment stays at full strength before fading.
    pub fade_delay_ms: u64,
    /// Opacity lost per tick once fading.
    pub fade_rate: f64,
    /// Opacity a new fragment starts at.
    pub baseline_opacity: f64,
    /// Opacity a fragment must exceed to count as visible context.
    pub visibility_threshold: f64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 15,
            fade_delay_ms: 15_000,
            fade_rate: 0.02,
            baseline_opacity: 0.4,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
        }
    }
}

impl PoolConfig {
    /// Checks that a pool built from this configuration can run.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Configuration` if the capacity is zero, the
    /// fade rate is not positive, or the baseline opacity is outside `(0, 1]`.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.capacity == 0 {
            return Err(EngineError::Configuration(
                "fragment pool capacity must be at least 1".to_owned(),
            ));
        }
        if self.fade_rate.is_nan() || self.fade_rate <= 0.0 {
            return Err(EngineError::Configuration(format!(
                "fade rate must be positive, got {}",
                self.fade_rate
            )));
        }
        if self.baseline_opacity.is_nan() || self.baseline_opacity <= 0.0 || self.baseline_opacity > 1.0 {
            return Err(EngineError::Configuration(format!(
                "baseline opacity must lie in (0, 1], got {}",
                self.baseline_opacity
            )));
        }
        Ok(())
    }
}

/// Bounded collection of decaying fragments, oldest first.
#[derive(Debug)]
pub struct FragmentPool {
    config: PoolConfig,
    fade_delay: TimeDelta,
    fragments: Vec<Fragment>,
    next_id: u64,
    pending_changes: Vec<FragmentChange>,
}

impl FragmentPool {
    /// Creates an empty pool.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Configuration` if `config` does not validate.
    pub fn new(config: PoolConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let fade_delay = TimeDelta::milliseconds(i64::try_from(config.fade_delay_ms).map_err(
            |_| EngineError::Configuration("fade delay is out of range".to_owned()),
        )?);
        Ok(Self {
            config,
            fade_delay,
            fragments: Vec::with_capacity(config.capacity),
            next_id: 0,
            pending_changes: Vec::new(),
        })
    }

    /// The configuration this pool runs with.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Maximum number of live fragments.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Number of live fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the pool holds no fragments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Looks up a live fragment.
    #[must_use]
    pub fn get(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.id == id)
    }

    /// Live fragments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }

    /// Admits a new fragment at `now`, evicting the oldest one first when the
    /// pool is full.
    pub fn add(
        &mut self,
        text: impl Into<String>,
        position: FragmentPosition,
        now: DateTime<Utc>,
    ) -> FragmentId {
        if self.fragments.len() >= self.config.capacity {
            self.evict_oldest();
        }

        self.next_id += 1;
        let fragment = Fragment {
            id: FragmentId(self.next_id),
            text: text.into(),
            created_at: now,
            opacity: self.config.baseline_opacity,
            fading: false,
            position,
        };
        self.pending_changes
            .push(FragmentChange::Added(fragment.view()));
        let id = fragment.id;
        self.fragments.push(fragment);
        id
    }

    fn evict_oldest(&mut self) {
        // `min_by_key` keeps the first of equal keys, so ties go to insertion order.
        let Some(index) = self
            .fragments
            .iter()
            .enumerate()
            .min_by_key(|(_, f)| f.created_at)
            .map(|(i, _)| i)
        else {
            return;
        };
        let evicted = self.fragments.remove(index);
        self.pending_changes.push(FragmentChange::Removed {
            id: evicted.id,
            reason: RemovalReason::Evicted,
        });
    }

    /// Ages every fragment to `now`. Returns how many fragments faded out.
    pub fn tick(&mut self, now: DateTime<Utc>) -> usize {
        let fade_delay = self.fade_delay;
        let fade_rate = self.config.fade_rate;

        for fragment in &mut self.fragments {
            if !fragment.fading && now - fragment.created_at > fade_delay {
                fragment.fading = true;
            }
            if fragment.fading {
                fragment.opacity -= fade_rate;
                if fragment.opacity > 0.0 {
                    self.pending_changes.push(FragmentChange::Faded {
                        id: fragment.id,
                        opacity: fragment.opacity,
                    });
                }
            }
        }

        let before = self.fragments.len();
        let pending = &mut self.pending_changes;
        self.fragments.retain(|fragment| {
            if fragment.opacity <= 0.0 {
                pending.push(FragmentChange::Removed {
                    id: fragment.id,
                    reason: RemovalReason::Faded,
                });
                false
            } else {
                true
            }
        });
        before - self.fragments.len()
    }

    /// Removes a fragment by id. Removing an unknown or already removed id is
    /// a no-op that returns `false`.
    pub fn remove(&mut self, id: FragmentId) -> bool {
        let Some(index) = self.fragments.iter().position(|f| f.id == id) else {
            return false;
        };
        self.fragments.remove(index);
        self.pending_changes.push(FragmentChange::Removed {
            id,
            reason: RemovalReason::Withdrawn,
        });
        true
    }

    /// Drops every fragment without fading. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let cleared = self.fragments.len();
        for fragment in self.fragments.drain(..) {
            self.pending_changes.push(FragmentChange::Removed {
                id: fragment.id,
                reason: RemovalReason::Cleared,
            });
        }
        cleared
    }

    /// Texts of fragments brighter than `threshold`, oldest first.
    #[must_use]
    pub fn visible_texts(&self, threshold: f64) -> Vec<&str> {
        self.fragments
            .iter()
            .filter(|f| f.is_visible_above(threshold))
            .map(Fragment::text)
            .collect()
    }

    /// [`FragmentPool::visible_texts`] at the configured threshold.
    #[must_use]
    pub fn visible_texts_default(&self) -> Vec<&str> {
        self.visible_texts(self.config.visibility_threshold)
    }

    /// Whether any fragment brighter than `threshold` mentions `query`,
    /// ignoring case.
    #[must_use]
    pub fn contains(&self, query: &str, threshold: f64) -> bool {
        let needle = query.to_lowercase();
        self.fragments
            .iter()
            .any(|f| f.is_visible_above(threshold) && f.text.to_lowercase().contains(&needle))
    }

    /// [`FragmentPool::contains`] at the configured threshold.
    #[must_use]
    pub fn contains_default(&self, query: &str) -> bool {
        self.contains(query, self.config.visibility_threshold)
    }

    /// Drains the changes recorded since the last call.
    pub fn take_changes(&mut self) -> Vec<FragmentChange> {
        std::mem::take(&mut self.pending_changes)
    }
}
