//! Debounced character writes
//!
//! Rapid edits (checking resource slots, typing into sheet fields) are merged
//! into one pending [`CharacterPatch`] and written once the edits settle. The
//! writer is an explicit handle: dropping or cancelling it stops the timer,
//! and `flush` / `close` push any pending patch immediately.
//!
//! A failed write keeps its patch pending (beneath any newer edits), reports
//! a [`WriteEvent::Failed`], and re-arms the timer until the retry limit is
//! reached.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::application::ports::outbound::{CharacterDataPort, RepoError};
use crate::domain::entities::CharacterPatch;
use crate::domain::value_objects::CharacterId;

const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceSettings {
    pub delay: Duration,
    pub max_retries: u32,
}

impl Default for DebounceSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            max_retries: 3,
        }
    }
}

/// Outcome notifications for writes performed by a [`DebouncedWriter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteEvent {
    Written {
        character_id: CharacterId,
    },
    Failed {
        character_id: CharacterId,
        error: String,
        attempt: u32,
    },
    /// Retries are exhausted; the patch stays pending until the next flush
    GaveUp {
        character_id: CharacterId,
        error: String,
    },
}

#[derive(Default)]
struct WriterState {
    pending: Option<CharacterPatch>,
    timer: Option<JoinHandle<()>>,
    failures: u32,
}

struct Inner {
    character_id: CharacterId,
    data: Arc<dyn CharacterDataPort>,
    settings: DebounceSettings,
    state: Mutex<WriterState>,
    /// Serializes writes so a retried patch never lands after a newer one
    write_lock: Mutex<()>,
    events: broadcast::Sender<WriteEvent>,
}

pub struct DebouncedWriter {
    inner: Arc<Inner>,
}

impl DebouncedWriter {
    pub fn new(
        character_id: CharacterId,
        data: Arc<dyn CharacterDataPort>,
        settings: DebounceSettings,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                character_id,
                data,
                settings,
                state: Mutex::new(WriterState::default()),
                write_lock: Mutex::new(()),
                events,
            }),
        }
    }

    pub fn character_id(&self) -> CharacterId {
        self.inner.character_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WriteEvent> {
        self.inner.events.subscribe()
    }

    /// Merge `patch` into the pending write and restart the quiet period
    pub async fn schedule(&self, patch: CharacterPatch) {
        if patch.is_empty() {
            return;
        }
        let mut state = self.inner.state.lock().await;
        state.pending = Some(match state.pending.take() {
            Some(pending) => pending.merge(patch),
            None => patch,
        });
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.timer = Some(Inner::arm(&self.inner));
    }

    pub async fn has_pending(&self) -> bool {
        self.inner.state.lock().await.pending.is_some()
    }

    /// Write any pending patch now
    pub async fn flush(&self) -> Result<(), RepoError> {
        {
            let mut state = self.inner.state.lock().await;
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
        }
        self.inner.write_pending().await
    }

    /// Stop the timer and discard anything not yet written
    pub async fn cancel(&self) {
        let mut state = self.inner.state.lock().await;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        if state.pending.take().is_some() {
            debug!(character_id = %self.inner.character_id, "Discarded pending character write");
        }
    }

    /// Flush and release the writer
    pub async fn close(self) -> Result<(), RepoError> {
        self.flush().await
    }
}

impl Drop for DebouncedWriter {
    fn drop(&mut self) {
        if let Ok(mut state) = self.inner.state.try_lock() {
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
        }
    }
}

impl Inner {
    /// Spawn the quiet-period timer. The task holds only a weak reference so
    /// a dropped writer is never kept alive by its own timer.
    fn arm(this: &Arc<Inner>) -> JoinHandle<()> {
        let weak: Weak<Inner> = Arc::downgrade(this);
        let delay = this.settings.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.fire().await;
            }
        })
    }

    async fn fire(self: Arc<Self>) {
        {
            // Detach so a concurrent schedule() cannot abort an in-flight write
            let mut state = self.state.lock().await;
            state.timer = None;
        }
        let _ = self.write_pending().await;
    }

    #[instrument(skip(self), fields(character_id = %self.character_id))]
    async fn write_pending(self: &Arc<Self>) -> Result<(), RepoError> {
        let _guard = self.write_lock.lock().await;

        let patch = match self.state.lock().await.pending.take() {
            Some(patch) => patch,
            None => return Ok(()),
        };

        match self
            .data
            .update_character(self.character_id, patch.clone())
            .await
        {
            Ok(_) => {
                self.state.lock().await.failures = 0;
                debug!("Persisted debounced character write");
                let _ = self.events.send(WriteEvent::Written {
                    character_id: self.character_id,
                });
                Ok(())
            }
            Err(e) => {
                let mut state = self.state.lock().await;
                state.pending = Some(match state.pending.take() {
                    Some(newer) => patch.merge(newer),
                    None => patch,
                });
                state.failures += 1;
                let attempt = state.failures;

                error!(error = %e, attempt, "Character write failed, keeping changes pending");
                let _ = self.events.send(WriteEvent::Failed {
                    character_id: self.character_id,
                    error: e.to_string(),
                    attempt,
                });

                if attempt <= self.settings.max_retries {
                    if state.timer.is_none() {
                        state.timer = Some(Inner::arm(self));
                    }
                } else {
                    info!(attempt, "Giving up automatic retries until the next flush");
                    let _ = self.events.send(WriteEvent::GaveUp {
                        character_id: self.character_id,
                        error: e.to_string(),
                    });
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::application::ports::outbound::MockCharacterDataPort;
    use crate::domain::entities::Character;

    fn settings() -> DebounceSettings {
        DebounceSettings {
            delay: Duration::from_millis(500),
            max_retries: 1,
        }
    }

    fn hope(value: u8) -> CharacterPatch {
        CharacterPatch {
            hope: Some(value),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_coalesce_into_one_write() {
        let mut data = MockCharacterDataPort::new();
        data.expect_update_character()
            .withf(|_, patch| patch.hope == Some(3) && patch.stress == Some(1))
            .times(1)
            .returning(|_, _| Ok(Character::new("user-1", "Marlowe")));

        let writer = DebouncedWriter::new(CharacterId::new(), Arc::new(data), settings());
        writer.schedule(hope(1)).await;
        writer
            .schedule(CharacterPatch {
                stress: Some(1),
                ..Default::default()
            })
            .await;
        writer.schedule(hope(3)).await;

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!writer.has_pending().await);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_writer_never_writes() {
        let mut data = MockCharacterDataPort::new();
        data.expect_update_character().times(0);

        let writer = DebouncedWriter::new(CharacterId::new(), Arc::new(data), settings());
        writer.schedule(hope(2)).await;
        writer.cancel().await;

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!writer.has_pending().await);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_writer_never_writes() {
        let mut data = MockCharacterDataPort::new();
        data.expect_update_character().times(0);

        let writer = DebouncedWriter::new(CharacterId::new(), Arc::new(data), settings());
        writer.schedule(hope(2)).await;
        drop(writer);

        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_immediately() {
        let mut data = MockCharacterDataPort::new();
        data.expect_update_character()
            .times(1)
            .returning(|_, _| Ok(Character::new("user-1", "Marlowe")));

        let writer = DebouncedWriter::new(CharacterId::new(), Arc::new(data), settings());
        writer.schedule(hope(4)).await;
        writer.close().await.unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_is_retained_and_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let mut data = MockCharacterDataPort::new();
        data.expect_update_character().returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(RepoError::Database("timeout".to_string()))
            } else {
                Ok(Character::new("user-1", "Marlowe"))
            }
        });

        let writer = DebouncedWriter::new(CharacterId::new(), Arc::new(data), settings());
        let mut events = writer.subscribe();
        writer.schedule(hope(2)).await;

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(matches!(events.recv().await, Ok(WriteEvent::Failed { attempt: 1, .. })));
        assert!(writer.has_pending().await);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(matches!(events.recv().await, Ok(WriteEvent::Written { .. })));
        assert!(!writer.has_pending().await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_flush_surfaces_errors() {
        let mut data = MockCharacterDataPort::new();
        data.expect_update_character()
            .returning(|_, _| Err(RepoError::Database("read-only".to_string())));

        let writer = DebouncedWriter::new(CharacterId::new(), Arc::new(data), settings());
        writer.schedule(hope(1)).await;

        assert!(writer.flush().await.is_err());
        assert!(writer.has_pending().await);
        writer.cancel().await;
    }
}
