//! Resource Service - hope, stress and hit point tracking for open sheets
//!
//! Each open character gets a [`ResourceTracker`] holding the optimistic local
//! counters and the debounced writer that persists them. Trackers are
//! registered per character and closed (flushed) on teardown, after sitting
//! idle, or on shutdown. A tracker whose final write fails stays registered so
//! its retries keep running.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::debounced_writer::{DebounceSettings, DebouncedWriter};
use super::errors::ServiceError;
use crate::application::ports::outbound::{CharacterDataPort, RepoError};
use crate::domain::entities::{Character, CharacterPatch};
use crate::domain::value_objects::{
    CharacterId, DualityRoll, ResourceCounter, ResourceKind, Trait, TraitScores, HOPE_CEILING,
    HOPE_FLOOR,
};

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("The {0} maximum is fixed for this character")]
    FixedMaximum(ResourceKind),
    #[error("Failed to save resources: {0}")]
    Write(#[from] RepoError),
}

/// Current values of every tracked counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceSnapshot {
    pub hope: ResourceCounter,
    pub stress: ResourceCounter,
    pub hit_points: ResourceCounter,
}

impl ResourceSnapshot {
    fn of(character: &Character) -> Self {
        Self {
            hope: character.hope,
            stress: character.stress,
            hit_points: character.hit_points,
        }
    }

    fn get_mut(&mut self, kind: ResourceKind) -> &mut ResourceCounter {
        match kind {
            ResourceKind::Hope => &mut self.hope,
            ResourceKind::Stress => &mut self.stress,
            ResourceKind::HitPoints => &mut self.hit_points,
        }
    }

    /// Copy the tracked values onto a character loaded from storage
    pub fn overlay(&self, character: &mut Character) {
        character.hope = self.hope;
        character.stress = self.stress;
        character.hit_points = self.hit_points;
    }
}

/// Result of applying a duality roll to a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RollResult {
    pub roll: DualityRoll,
    pub resources: ResourceSnapshot,
}

pub struct ResourceTracker {
    character_id: CharacterId,
    owner_id: String,
    traits: TraitScores,
    resources: Mutex<ResourceSnapshot>,
    writer: DebouncedWriter,
    last_used: Mutex<Instant>,
}

impl ResourceTracker {
    pub fn new(
        character: &Character,
        data: Arc<dyn CharacterDataPort>,
        settings: DebounceSettings,
    ) -> Self {
        Self {
            character_id: character.id,
            owner_id: character.owner_id.clone(),
            traits: character.traits,
            resources: Mutex::new(ResourceSnapshot::of(character)),
            writer: DebouncedWriter::new(character.id, data, settings),
            last_used: Mutex::new(Instant::now()),
        }
    }

    async fn touch(&self) {
        *self.last_used.lock().await = Instant::now();
    }

    async fn idle_for(&self) -> Duration {
        self.last_used.lock().await.elapsed()
    }

    pub async fn has_pending(&self) -> bool {
        self.writer.has_pending().await
    }

    pub async fn snapshot(&self) -> ResourceSnapshot {
        *self.resources.lock().await
    }

    /// Fill or clear one slot; the write follows once edits settle
    pub async fn toggle_slot(&self, kind: ResourceKind, index: u8, checked: bool) -> ResourceCounter {
        let counter = {
            let mut resources = self.resources.lock().await;
            let counter = resources.get_mut(kind);
            counter.toggle_slot(index, checked);
            *counter
        };
        self.writer
            .schedule(CharacterPatch::resource(kind, &counter))
            .await;
        counter
    }

    /// Adjust the hope maximum (clamped) and persist immediately
    pub async fn set_max(&self, kind: ResourceKind, max: u8) -> Result<ResourceCounter, ResourceError> {
        if kind != ResourceKind::Hope {
            return Err(ResourceError::FixedMaximum(kind));
        }
        let counter = {
            let mut resources = self.resources.lock().await;
            resources.hope.set_max(max.clamp(HOPE_FLOOR, HOPE_CEILING));
            resources.hope
        };
        self.writer
            .schedule(CharacterPatch::resource(kind, &counter))
            .await;
        self.writer.flush().await?;
        Ok(counter)
    }

    /// Apply a roll's resource consequences: Hope on success with Hope or a
    /// critical, and a cleared Stress on a critical.
    pub async fn apply_roll(&self, roll: DualityRoll) -> ResourceSnapshot {
        let snapshot = {
            let mut resources = self.resources.lock().await;
            if roll.grants_hope() {
                resources.hope.increment();
            }
            if roll.clears_stress() {
                resources.stress.decrement();
            }
            *resources
        };

        let mut patch = CharacterPatch::resource(ResourceKind::Hope, &snapshot.hope);
        if roll.clears_stress() {
            patch = patch.merge(CharacterPatch::resource(ResourceKind::Stress, &snapshot.stress));
        }
        self.writer.schedule(patch).await;
        snapshot
    }

    pub fn trait_score(&self, t: Trait) -> i8 {
        self.traits.get(t)
    }

    pub async fn flush(&self) -> Result<(), ResourceError> {
        Ok(self.writer.flush().await?)
    }
}

/// Registry of open resource trackers
pub struct ResourceService {
    data: Arc<dyn CharacterDataPort>,
    settings: DebounceSettings,
    trackers: RwLock<HashMap<CharacterId, Arc<ResourceTracker>>>,
}

impl ResourceService {
    pub fn new(data: Arc<dyn CharacterDataPort>, settings: DebounceSettings) -> Self {
        Self {
            data,
            settings,
            trackers: RwLock::new(HashMap::new()),
        }
    }

    /// Get the open tracker for a character the caller owns, loading it on
    /// first use
    #[instrument(skip(self))]
    pub async fn tracker(&self, owner_id: &str, id: CharacterId) -> Result<Arc<ResourceTracker>> {
        let open = self.trackers.read().await.get(&id).cloned();
        let tracker = match open {
            Some(tracker) => {
                Self::ensure_owner(&tracker, owner_id)?;
                tracker
            }
            None => self.open(owner_id, id).await?,
        };
        tracker.touch().await;
        Ok(tracker)
    }

    /// Load a character and register its tracker; only the owner may open one
    async fn open(&self, owner_id: &str, id: CharacterId) -> Result<Arc<ResourceTracker>> {
        let details = self
            .data
            .fetch_character(id)
            .await
            .context("Failed to load character for resource tracking")?
            .ok_or_else(|| ServiceError::character_not_found(id))?;
        if details.character.owner_id != owner_id {
            return Err(ServiceError::not_owner("Character").into());
        }

        let mut trackers = self.trackers.write().await;
        let tracker = trackers
            .entry(id)
            .or_insert_with(|| {
                debug!(character_id = %id, "Opened resource tracker");
                Arc::new(ResourceTracker::new(
                    &details.character,
                    self.data.clone(),
                    self.settings,
                ))
            })
            .clone();
        // A concurrent open may have registered first
        Self::ensure_owner(&tracker, owner_id)?;
        Ok(tracker)
    }

    /// Tracked values for a character, if a tracker is open
    pub async fn snapshot(&self, id: CharacterId) -> Option<ResourceSnapshot> {
        let tracker = self.trackers.read().await.get(&id).cloned()?;
        Some(tracker.snapshot().await)
    }

    #[instrument(skip(self), fields(character_id = %id, resource = %kind))]
    pub async fn toggle_slot(
        &self,
        owner_id: &str,
        id: CharacterId,
        kind: ResourceKind,
        index: u8,
        checked: bool,
    ) -> Result<ResourceCounter> {
        let tracker = self.tracker(owner_id, id).await?;
        Ok(tracker.toggle_slot(kind, index, checked).await)
    }

    #[instrument(skip(self), fields(character_id = %id, resource = %kind))]
    pub async fn set_max(
        &self,
        owner_id: &str,
        id: CharacterId,
        kind: ResourceKind,
        max: u8,
    ) -> Result<ResourceCounter> {
        let tracker = self.tracker(owner_id, id).await?;
        Ok(tracker.set_max(kind, max).await?)
    }

    /// Roll the duality dice for a character, optionally adding a trait score
    #[instrument(skip(self), fields(character_id = %id))]
    pub async fn roll(
        &self,
        owner_id: &str,
        id: CharacterId,
        with_trait: Option<Trait>,
        bonus: i32,
    ) -> Result<RollResult> {
        let tracker = self.tracker(owner_id, id).await?;
        let modifier = bonus + with_trait.map_or(0, |t| i32::from(tracker.trait_score(t)));
        let roll = DualityRoll::roll(&mut rand::thread_rng(), modifier);
        let resources = tracker.apply_roll(roll).await;

        info!(
            hope_die = roll.hope_die,
            fear_die = roll.fear_die,
            total = roll.total,
            outcome = ?roll.outcome,
            "Rolled duality dice"
        );
        Ok(RollResult { roll, resources })
    }

    /// Write pending changes now; a character with no open tracker has none
    pub async fn flush(&self, owner_id: &str, id: CharacterId) -> Result<()> {
        let tracker = self.trackers.read().await.get(&id).cloned();
        if let Some(tracker) = tracker {
            Self::ensure_owner(&tracker, owner_id)?;
            tracker.flush().await?;
        }
        Ok(())
    }

    /// Flush and drop the tracker for a character
    #[instrument(skip(self))]
    pub async fn close(&self, owner_id: &str, id: CharacterId) -> Result<()> {
        let tracker = self.trackers.read().await.get(&id).cloned();
        if let Some(tracker) = tracker {
            Self::ensure_owner(&tracker, owner_id)?;
            debug!(character_id = %id, "Closing resource tracker");
            self.retire(id, &tracker).await?;
        }
        Ok(())
    }

    /// Flush a tracker, then unregister it once nothing is left pending. A
    /// failed flush leaves it registered with its patch still pending.
    async fn retire(&self, id: CharacterId, tracker: &Arc<ResourceTracker>) -> Result<(), ResourceError> {
        loop {
            tracker.flush().await?;
            let mut trackers = self.trackers.write().await;
            // Edits that arrived during the flush go out before the tracker does
            if tracker.has_pending().await {
                continue;
            }
            if trackers.get(&id).is_some_and(|open| Arc::ptr_eq(open, tracker)) {
                trackers.remove(&id);
            }
            return Ok(());
        }
    }

    /// Close every tracker unused for `max_idle`; returns how many were closed
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let open: Vec<_> = self
            .trackers
            .read()
            .await
            .iter()
            .map(|(id, tracker)| (*id, tracker.clone()))
            .collect();

        let mut evicted = 0;
        for (id, tracker) in open {
            if tracker.idle_for().await < max_idle {
                continue;
            }
            match self.retire(id, &tracker).await {
                Ok(()) => evicted += 1,
                Err(e) => {
                    warn!(character_id = %id, error = %e, "Idle tracker kept open after failed flush")
                }
            }
        }
        if evicted > 0 {
            debug!(evicted, "Closed idle resource trackers");
        }
        evicted
    }

    fn ensure_owner(tracker: &ResourceTracker, owner_id: &str) -> Result<(), ServiceError> {
        if tracker.owner_id != owner_id {
            return Err(ServiceError::not_owner("Character"));
        }
        Ok(())
    }

    /// Flush every open tracker, typically on shutdown
    pub async fn flush_all(&self) {
        let trackers: Vec<_> = self.trackers.read().await.values().cloned().collect();
        let results = join_all(trackers.iter().map(|t| t.flush())).await;
        for (tracker, result) in trackers.iter().zip(results) {
            if let Err(e) = result {
                warn!(character_id = %tracker.character_id, error = %e, "Failed to flush resources");
            }
        }
    }
}
