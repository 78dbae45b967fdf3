//! Gallery rotation engine.
//!
//! One `RotationEngine` owns every rotating region on the page through an
//! explicit registry keyed by gallery id. Each rotating gallery owns one
//! repeating timer task; restarting rotation aborts the previous task and
//! bumps a per-gallery epoch so a replaced timer can never mutate state.
//! Manual navigation applies the same transition the timer does, then
//! reschedules the timer so the next automatic step is a full interval away.

pub mod mood;
pub mod video;

pub use video::{PlaybackEvent, VideoPhase};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_channel::Sender;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::intent::Intent;

use video::VideoSlot;

/// Identifier for one rotating display region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GalleryId(String);

impl GalleryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for GalleryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GalleryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Manual step direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Everything needed to register one gallery.
#[derive(Debug, Clone)]
pub struct GallerySpec {
    pub id: GalleryId,
    /// Catalog indices shown by this gallery, in display order.
    pub items: Vec<usize>,
    pub interval: Duration,
    /// Re-roll a mood tag on every transition.
    pub mood_overlay: bool,
}

struct GalleryEntry {
    items: Vec<usize>,
    /// Position within `items`; valid whenever `items` is non-empty.
    active: usize,
    interval: Duration,
    mood_overlay: bool,
    visible: bool,
    /// Bumped on every timer replacement; a tick with a stale epoch is inert.
    epoch: u64,
    timer: Option<JoinHandle<()>>,
    video: Option<VideoSlot>,
}

struct Registry {
    galleries: HashMap<GalleryId, GalleryEntry>,
}

/// Rotation controller for every gallery on the page.
pub struct RotationEngine {
    catalog: Arc<Catalog>,
    registry: Arc<Mutex<Registry>>,
    intents: Sender<Intent>,
    retry_delay: Duration,
}

impl RotationEngine {
    pub fn new(catalog: Arc<Catalog>, intents: Sender<Intent>, retry_delay: Duration) -> Self {
        Self {
            catalog,
            registry: Arc::new(Mutex::new(Registry {
                galleries: HashMap::new(),
            })),
            intents,
            retry_delay,
        }
    }

    /// Creates (or replaces) a gallery and announces its initial active item.
    /// Out-of-range catalog indices are dropped with a warning.
    pub fn register(&self, spec: GallerySpec) {
        let GallerySpec {
            id,
            items,
            interval,
            mood_overlay,
        } = spec;

        let items: Vec<usize> = items
            .into_iter()
            .filter(|&index| {
                let known = self.catalog.get(index).is_some();
                if !known {
                    warn!("gallery {id}: dropping out-of-range catalog index {index}");
                }
                known
            })
            .collect();
        let has_video = items
            .iter()
            .any(|&index| self.catalog.get(index).is_some_and(|item| item.is_video()));

        let mut entry = GalleryEntry {
            items,
            active: 0,
            interval,
            mood_overlay,
            visible: true,
            epoch: 0,
            timer: None,
            video: has_video.then(VideoSlot::new),
        };

        let mut registry = self.registry.lock();
        if let Some(old) = registry.galleries.remove(&id) {
            debug!("gallery {id}: replacing existing registration");
            if let Some(timer) = old.timer {
                timer.abort();
            }
        }
        if entry.items.is_empty() {
            debug!("gallery {id}: registered with no items");
        } else {
            info!("gallery {id}: registered with {} items", entry.items.len());
            apply_transition(&self.catalog, &self.intents, &id, &mut entry, 0);
        }
        registry.galleries.insert(id, entry);
    }

    /// Begins (or restarts) periodic advancement for the gallery. Replaces
    /// any existing timer; while the video slot is active and unsettled, the
    /// timer stays parked.
    pub fn start_rotation(&self, id: &GalleryId, interval: Duration) {
        {
            let mut registry = self.registry.lock();
            let Some(entry) = registry.galleries.get_mut(id) else {
                debug!("start_rotation for unknown gallery {id}");
                return;
            };
            entry.interval = interval;
        }
        self.restart_timer(id);
    }

    /// Cancels the gallery's timer without touching its active item.
    pub fn stop_rotation(&self, id: &GalleryId) {
        let mut registry = self.registry.lock();
        let Some(entry) = registry.galleries.get_mut(id) else {
            debug!("stop_rotation for unknown gallery {id}");
            return;
        };
        entry.epoch += 1;
        if let Some(timer) = entry.timer.take() {
            timer.abort();
        }
    }

    /// Manual ±1 step. The next automatic tick lands a full interval away.
    pub fn advance(&self, id: &GalleryId, direction: Direction) {
        {
            let mut registry = self.registry.lock();
            let Some(entry) = registry.galleries.get_mut(id) else {
                debug!("advance on unknown gallery {id}");
                return;
            };
            if entry.items.is_empty() {
                debug!("advance on empty gallery {id}");
                return;
            }
            let len = entry.items.len();
            let next = match direction {
                Direction::Forward => (entry.active + 1) % len,
                Direction::Backward => (entry.active + len - 1) % len,
            };
            apply_transition(&self.catalog, &self.intents, id, entry, next);
        }
        self.restart_timer(id);
    }

    /// Absolute positioning, wrapped modulo the item count. Same timer
    /// reschedule rule as `advance`.
    pub fn jump_to(&self, id: &GalleryId, index: usize) {
        {
            let mut registry = self.registry.lock();
            let Some(entry) = registry.galleries.get_mut(id) else {
                debug!("jump_to on unknown gallery {id}");
                return;
            };
            if entry.items.is_empty() {
                debug!("jump_to on empty gallery {id}");
                return;
            }
            let next = index % entry.items.len();
            apply_transition(&self.catalog, &self.intents, id, entry, next);
        }
        self.restart_timer(id);
    }

    /// Feeds a playback notification from the rendering surface into the
    /// gallery's video state machine.
    pub fn playback_event(&self, id: &GalleryId, event: PlaybackEvent) {
        let mut resume_rotation = false;
        {
            let mut registry = self.registry.lock();
            let Some(entry) = registry.galleries.get_mut(id) else {
                debug!("playback event {event:?} for unknown gallery {id}");
                return;
            };
            let Some(phase) = entry.video.map(|video| video.phase) else {
                debug!("gallery {id}: playback event {event:?} without a video slot");
                return;
            };
            if phase == VideoPhase::Failed {
                debug!("gallery {id}: ignoring {event:?} after permanent fallback");
                return;
            }
            match event {
                PlaybackEvent::Started => {
                    if let Some(video) = entry.video.as_mut() {
                        video.phase = VideoPhase::Playing;
                    }
                    debug!("gallery {id}: video playing");
                }
                PlaybackEvent::AutoplayRejected => {
                    if phase != VideoPhase::Idle {
                        debug!("gallery {id}: autoplay rejection while {phase:?}, ignoring");
                    } else if entry.video.is_some_and(|video| !video.retried) {
                        if let Some(video) = entry.video.as_mut() {
                            video.retried = true;
                        }
                        info!(
                            "gallery {id}: autoplay rejected, retrying muted in {:?}",
                            self.retry_delay
                        );
                        self.schedule_muted_retry(id.clone());
                    } else {
                        warn!("gallery {id}: muted autoplay retry rejected, showing play prompt");
                        emit(&self.intents, Intent::ShowPlayPrompt { gallery: id.clone() });
                    }
                }
                PlaybackEvent::Ended => {
                    if let Some(video) = entry.video.as_mut() {
                        video.phase = VideoPhase::Completed;
                    }
                    debug!("gallery {id}: video completed, looping in place");
                    emit(&self.intents, Intent::RestartVideo { gallery: id.clone() });
                }
                PlaybackEvent::Error => {
                    if let Some(video) = entry.video.as_mut() {
                        video.phase = VideoPhase::Failed;
                    }
                    warn!("gallery {id}: video failed, falling back to images");
                    let catalog = &self.catalog;
                    entry
                        .items
                        .retain(|&index| catalog.get(index).is_some_and(|item| !item.is_video()));
                    emit(&self.intents, Intent::HideVideoSlot { gallery: id.clone() });
                    if entry.items.is_empty() {
                        entry.epoch += 1;
                        if let Some(timer) = entry.timer.take() {
                            timer.abort();
                        }
                    } else {
                        entry.active = 0;
                        let mood = entry.mood_overlay.then(mood::random_mood);
                        emit(
                            &self.intents,
                            Intent::SetActive {
                                gallery: id.clone(),
                                index: 0,
                                mood,
                            },
                        );
                        resume_rotation = true;
                    }
                }
            }
        }
        if resume_rotation {
            self.restart_timer(id);
        }
    }

    /// Visibility change for the gallery (it scrolled in or out of view).
    /// Pauses video playback without resetting terminal phases; returning to
    /// view resumes only when the video had not yet completed.
    pub fn set_visible(&self, id: &GalleryId, visible: bool) {
        let mut registry = self.registry.lock();
        let Some(entry) = registry.galleries.get_mut(id) else {
            debug!("set_visible for unknown gallery {id}");
            return;
        };
        if entry.visible == visible {
            return;
        }
        entry.visible = visible;
        if !slot_is_video(&self.catalog, entry, entry.active) {
            return;
        }
        let Some(video) = entry.video.as_mut() else {
            return;
        };
        if visible {
            match video.phase {
                VideoPhase::Playing => {
                    emit(&self.intents, Intent::ResumeVideo { gallery: id.clone() });
                }
                VideoPhase::Idle => {
                    // Fresh autoplay budget when the gallery scrolls back in.
                    video.retried = false;
                    emit(
                        &self.intents,
                        Intent::PlayVideo {
                            gallery: id.clone(),
                            muted: false,
                        },
                    );
                }
                VideoPhase::Completed | VideoPhase::Failed => {}
            }
        } else if video.phase.is_playing() {
            emit(&self.intents, Intent::PauseVideo { gallery: id.clone() });
        }
    }

    /// Position within the gallery's item list, when it has items.
    pub fn active_index(&self, id: &GalleryId) -> Option<usize> {
        let registry = self.registry.lock();
        let entry = registry.galleries.get(id)?;
        if entry.items.is_empty() {
            None
        } else {
            Some(entry.active)
        }
    }

    pub fn item_count(&self, id: &GalleryId) -> Option<usize> {
        let registry = self.registry.lock();
        registry.galleries.get(id).map(|entry| entry.items.len())
    }

    pub fn video_phase(&self, id: &GalleryId) -> Option<VideoPhase> {
        let registry = self.registry.lock();
        registry
            .galleries
            .get(id)
            .and_then(|entry| entry.video)
            .map(|video| video.phase)
    }

    pub fn is_rotating(&self, id: &GalleryId) -> bool {
        let registry = self.registry.lock();
        registry
            .galleries
            .get(id)
            .is_some_and(|entry| entry.timer.is_some())
    }

    /// Aborts the gallery's timer, spawns a fresh one unless the gallery is
    /// empty or parked behind its video slot.
    fn restart_timer(&self, id: &GalleryId) {
        let mut registry = self.registry.lock();
        let Some(entry) = registry.galleries.get_mut(id) else {
            return;
        };
        entry.epoch += 1;
        if let Some(timer) = entry.timer.take() {
            timer.abort();
        }
        if entry.items.is_empty() {
            return;
        }
        if video_blocks(&self.catalog, entry) {
            debug!("gallery {id}: rotation parked while the video slot is active");
            return;
        }

        let epoch = entry.epoch;
        let interval = entry.interval;
        let registry_handle = Arc::clone(&self.registry);
        let catalog = Arc::clone(&self.catalog);
        let intents = self.intents.clone();
        let gallery = id.clone();
        entry.timer = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if !rotation_tick(&registry_handle, &catalog, &intents, &gallery, epoch) {
                    break;
                }
            }
        }));
    }

    /// One-shot muted replay attempt after the configured delay. Skipped if
    /// the slot has moved past `Idle` by the time the delay elapses.
    fn schedule_muted_retry(&self, id: GalleryId) {
        let registry = Arc::clone(&self.registry);
        let intents = self.intents.clone();
        let delay = self.retry_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let still_idle = {
                let registry = registry.lock();
                registry
                    .galleries
                    .get(&id)
                    .and_then(|entry| entry.video)
                    .is_some_and(|video| video.phase == VideoPhase::Idle)
            };
            if still_idle {
                emit(
                    &intents,
                    Intent::PlayVideo {
                        gallery: id,
                        muted: true,
                    },
                );
            }
        });
    }
}

impl Drop for RotationEngine {
    fn drop(&mut self) {
        let mut registry = self.registry.lock();
        for entry in registry.galleries.values_mut() {
            entry.epoch += 1;
            if let Some(timer) = entry.timer.take() {
                timer.abort();
            }
        }
    }
}

/// One automatic advancement. Returns whether the timer should keep running.
fn rotation_tick(
    registry: &Mutex<Registry>,
    catalog: &Catalog,
    intents: &Sender<Intent>,
    id: &GalleryId,
    epoch: u64,
) -> bool {
    let mut registry = registry.lock();
    let Some(entry) = registry.galleries.get_mut(id) else {
        return false;
    };
    // A replaced timer may still have a tick in flight; it must not touch
    // gallery state.
    if entry.epoch != epoch {
        return false;
    }
    if entry.items.is_empty() {
        return false;
    }
    let next = (entry.active + 1) % entry.items.len();
    apply_transition(catalog, intents, id, entry, next);
    if video_blocks(catalog, entry) {
        debug!("gallery {id}: rotation parked while the video slot is active");
        entry.epoch += 1;
        entry.timer = None;
        return false;
    }
    true
}

/// Applies one transition: moves the active marker, rolls the mood tag, and
/// runs the video enter/leave side effects.
fn apply_transition(
    catalog: &Catalog,
    intents: &Sender<Intent>,
    id: &GalleryId,
    entry: &mut GalleryEntry,
    next: usize,
) {
    let leaving = entry.active != next;
    if leaving
        && slot_is_video(catalog, entry, entry.active)
        && entry.video.is_some_and(|video| video.phase.is_playing())
    {
        emit(intents, Intent::PauseVideo { gallery: id.clone() });
    }

    entry.active = next;
    let mood = entry.mood_overlay.then(mood::random_mood);
    emit(
        intents,
        Intent::SetActive {
            gallery: id.clone(),
            index: next,
            mood,
        },
    );

    // Becoming active re-enters the autoplay sequence from the top.
    if slot_is_video(catalog, entry, next) {
        let visible = entry.visible;
        if let Some(video) = entry.video.as_mut() {
            if video.phase != VideoPhase::Failed {
                video.reset();
                if visible {
                    emit(
                        intents,
                        Intent::PlayVideo {
                            gallery: id.clone(),
                            muted: false,
                        },
                    );
                }
            }
        }
    }
}

fn slot_is_video(catalog: &Catalog, entry: &GalleryEntry, position: usize) -> bool {
    entry
        .items
        .get(position)
        .and_then(|&index| catalog.get(index))
        .is_some_and(|item| item.is_video())
}

/// Rotation is suspended while the active slot is a video that has not
/// failed (idle, playing, or looping after completion).
fn video_blocks(catalog: &Catalog, entry: &GalleryEntry) -> bool {
    slot_is_video(catalog, entry, entry.active)
        && entry
            .video
            .is_some_and(|video| video.phase != VideoPhase::Failed)
}

fn emit(intents: &Sender<Intent>, intent: Intent) {
    if intents.try_send(intent).is_err() {
        debug!("intent channel closed, dropping intent");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaItem;
    use assert_matches::assert_matches;
    use async_channel::Receiver;
    use tokio::time::{self, Instant};

    const INTERVAL: Duration = Duration::from_secs(10);
    const RETRY_DELAY: Duration = Duration::from_millis(300);

    fn image_catalog(count: usize) -> Arc<Catalog> {
        Arc::new(Catalog::new(
            (0..count)
                .map(|i| MediaItem::image(format!("images/{i}.jpg"), format!("item {i}")))
                .collect(),
        ))
    }

    /// Catalog shaped like the hero gallery: a video slot then two images.
    fn video_catalog() -> Arc<Catalog> {
        Arc::new(Catalog::new(vec![
            MediaItem::video("videos/hero.mp4", "hero", None),
            MediaItem::image("images/1.jpg", "one"),
            MediaItem::image("images/2.jpg", "two"),
        ]))
    }

    fn engine_with(catalog: Arc<Catalog>) -> (RotationEngine, Receiver<Intent>) {
        let (tx, rx) = async_channel::unbounded();
        (RotationEngine::new(catalog, tx, RETRY_DELAY), rx)
    }

    fn spec(id: &str, items: Vec<usize>) -> GallerySpec {
        GallerySpec {
            id: GalleryId::new(id),
            items,
            interval: INTERVAL,
            mood_overlay: false,
        }
    }

    fn drain(rx: &Receiver<Intent>) -> Vec<Intent> {
        let mut out = Vec::new();
        while let Ok(intent) = rx.try_recv() {
            out.push(intent);
        }
        out
    }

    #[tokio::test]
    async fn test_register_announces_initial_active() {
        let (engine, rx) = engine_with(image_catalog(3));
        engine.register(spec("hero", vec![0, 1, 2]));
        assert_eq!(
            drain(&rx),
            vec![Intent::SetActive {
                gallery: GalleryId::new("hero"),
                index: 0,
                mood: None,
            }]
        );
        assert_eq!(engine.active_index(&GalleryId::new("hero")), Some(0));
    }

    #[tokio::test]
    async fn test_register_drops_out_of_range_indices() {
        let (engine, _rx) = engine_with(image_catalog(2));
        engine.register(spec("g", vec![0, 7, 1]));
        assert_eq!(engine.item_count(&GalleryId::new("g")), Some(2));
    }

    #[tokio::test]
    async fn test_reregister_replaces_entry() {
        let (engine, rx) = engine_with(image_catalog(4));
        let id = GalleryId::new("g");
        engine.register(spec("g", vec![0, 1, 2, 3]));
        engine.jump_to(&id, 3);
        engine.register(spec("g", vec![0, 1]));
        assert_eq!(engine.active_index(&id), Some(0));
        assert_eq!(engine.item_count(&id), Some(2));
        drain(&rx);
    }

    #[tokio::test]
    async fn test_unknown_and_empty_galleries_are_noops() {
        let (engine, rx) = engine_with(image_catalog(2));
        let ghost = GalleryId::new("ghost");
        engine.advance(&ghost, Direction::Forward);
        engine.jump_to(&ghost, 3);
        engine.start_rotation(&ghost, INTERVAL);
        engine.stop_rotation(&ghost);

        engine.register(spec("empty", vec![]));
        let empty = GalleryId::new("empty");
        engine.advance(&empty, Direction::Forward);
        engine.jump_to(&empty, 1);
        engine.start_rotation(&empty, INTERVAL);

        assert!(drain(&rx).is_empty());
        assert_eq!(engine.active_index(&empty), None);
        assert!(!engine.is_rotating(&empty));
    }

    #[tokio::test]
    async fn test_advance_inverse_pair_is_identity() {
        let (engine, _rx) = engine_with(image_catalog(4));
        let id = GalleryId::new("g");
        engine.register(spec("g", vec![0, 1, 2, 3]));
        for start in 0..4 {
            engine.jump_to(&id, start);
            engine.advance(&id, Direction::Forward);
            engine.advance(&id, Direction::Backward);
            assert_eq!(engine.active_index(&id), Some(start));
        }
    }

    #[tokio::test]
    async fn test_advance_wraps_both_ways() {
        let (engine, _rx) = engine_with(image_catalog(3));
        let id = GalleryId::new("g");
        engine.register(spec("g", vec![0, 1, 2]));
        engine.advance(&id, Direction::Backward);
        assert_eq!(engine.active_index(&id), Some(2));
        engine.advance(&id, Direction::Forward);
        assert_eq!(engine.active_index(&id), Some(0));
    }

    #[tokio::test]
    async fn test_jump_to_wraps_modulo_len() {
        let (engine, _rx) = engine_with(image_catalog(3));
        let id = GalleryId::new("g");
        engine.register(spec("g", vec![0, 1, 2]));
        engine.jump_to(&id, 7);
        assert_eq!(engine.active_index(&id), Some(1));
        engine.jump_to(&id, 3);
        assert_eq!(engine.active_index(&id), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rotation_cycles_back_to_start() {
        let (engine, rx) = engine_with(image_catalog(3));
        let id = GalleryId::new("g");
        engine.register(spec("g", vec![0, 1, 2]));
        drain(&rx);
        engine.start_rotation(&id, INTERVAL);
        assert!(engine.is_rotating(&id));

        let start = Instant::now();
        for expected in [1, 2, 0] {
            let intent = rx.recv().await.unwrap();
            assert_matches!(intent, Intent::SetActive { index, .. } if index == expected);
        }
        assert_eq!(start.elapsed(), INTERVAL * 3);
        assert_eq!(engine.active_index(&id), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_restart_leaves_single_timer() {
        let (engine, rx) = engine_with(image_catalog(3));
        let id = GalleryId::new("g");
        engine.register(spec("g", vec![0, 1, 2]));
        drain(&rx);
        engine.start_rotation(&id, INTERVAL);
        engine.start_rotation(&id, INTERVAL);

        let start = Instant::now();
        let first = rx.recv().await.unwrap();
        assert_eq!(start.elapsed(), INTERVAL);
        assert_matches!(first, Intent::SetActive { index: 1, .. });

        let second = rx.recv().await.unwrap();
        assert_eq!(start.elapsed(), INTERVAL * 2);
        assert_matches!(second, Intent::SetActive { index: 2, .. });
        assert!(drain(&rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_advance_defers_next_tick() {
        let (engine, rx) = engine_with(image_catalog(3));
        let id = GalleryId::new("g");
        engine.register(spec("g", vec![0, 1, 2]));
        drain(&rx);
        engine.start_rotation(&id, INTERVAL);

        // Let the timer get halfway to its first tick, then pre-empt it.
        time::sleep(INTERVAL / 2).await;
        let manual_at = Instant::now();
        engine.advance(&id, Direction::Forward);
        let manual = rx.recv().await.unwrap();
        assert_matches!(manual, Intent::SetActive { index: 1, .. });

        // The next automatic tick is a full interval after the manual step,
        // not half an interval after it.
        let auto = rx.recv().await.unwrap();
        assert_eq!(manual_at.elapsed(), INTERVAL);
        assert_matches!(auto, Intent::SetActive { index: 2, .. });
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_rotation_cancels_timer() {
        let (engine, rx) = engine_with(image_catalog(3));
        let id = GalleryId::new("g");
        engine.register(spec("g", vec![0, 1, 2]));
        drain(&rx);
        engine.start_rotation(&id, INTERVAL);
        engine.stop_rotation(&id);
        assert!(!engine.is_rotating(&id));
        time::sleep(INTERVAL * 3).await;
        assert!(drain(&rx).is_empty());
    }

    #[tokio::test]
    async fn test_mood_overlay_rolls_valid_tags() {
        let (engine, rx) = engine_with(image_catalog(2));
        let id = GalleryId::new("reviews");
        engine.register(GallerySpec {
            id: id.clone(),
            items: vec![0, 1],
            interval: INTERVAL,
            mood_overlay: true,
        });
        engine.advance(&id, Direction::Forward);
        for intent in drain(&rx) {
            assert_matches!(intent, Intent::SetActive { mood: Some(tag), .. } => {
                assert!(mood::MOOD_TAGS.contains(&tag));
            });
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_video_slot_parks_rotation() {
        let (engine, rx) = engine_with(video_catalog());
        let id = GalleryId::new("1");
        engine.register(spec("1", vec![0, 1, 2]));
        let initial = drain(&rx);
        assert_eq!(
            initial,
            vec![
                Intent::SetActive {
                    gallery: id.clone(),
                    index: 0,
                    mood: None,
                },
                Intent::PlayVideo {
                    gallery: id.clone(),
                    muted: false,
                },
            ]
        );

        engine.start_rotation(&id, INTERVAL);
        assert!(!engine.is_rotating(&id));
        time::sleep(INTERVAL * 3).await;
        assert!(drain(&rx).is_empty());
        assert_eq!(engine.active_index(&id), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_retries_once_muted_then_prompts() {
        let (engine, rx) = engine_with(video_catalog());
        let id = GalleryId::new("1");
        engine.register(spec("1", vec![0, 1, 2]));
        drain(&rx);

        engine.playback_event(&id, PlaybackEvent::AutoplayRejected);
        let start = Instant::now();
        let retry = rx.recv().await.unwrap();
        assert_eq!(start.elapsed(), RETRY_DELAY);
        assert_eq!(
            retry,
            Intent::PlayVideo {
                gallery: id.clone(),
                muted: true,
            }
        );

        engine.playback_event(&id, PlaybackEvent::AutoplayRejected);
        assert_eq!(
            drain(&rx),
            vec![Intent::ShowPlayPrompt {
                gallery: id.clone()
            }]
        );
        assert_eq!(engine.video_phase(&id), Some(VideoPhase::Idle));
    }

    #[tokio::test(start_paused = true)]
    async fn test_muted_retry_skipped_once_playing() {
        let (engine, rx) = engine_with(video_catalog());
        let id = GalleryId::new("1");
        engine.register(spec("1", vec![0, 1, 2]));
        drain(&rx);

        engine.playback_event(&id, PlaybackEvent::AutoplayRejected);
        // Playback starts before the retry delay elapses; the muted replay
        // must not fire.
        engine.playback_event(&id, PlaybackEvent::Started);
        time::sleep(RETRY_DELAY * 2).await;
        assert!(drain(&rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_video_loops_in_place() {
        let (engine, rx) = engine_with(video_catalog());
        let id = GalleryId::new("1");
        engine.register(spec("1", vec![0, 1, 2]));
        drain(&rx);

        engine.playback_event(&id, PlaybackEvent::Started);
        engine.playback_event(&id, PlaybackEvent::Ended);
        assert_eq!(engine.video_phase(&id), Some(VideoPhase::Completed));
        assert_eq!(
            drain(&rx),
            vec![Intent::RestartVideo {
                gallery: id.clone()
            }]
        );

        // Still no rotation: the slot loops instead of handing control back
        // to the timer.
        assert_eq!(engine.active_index(&id), Some(0));
        assert!(!engine.is_rotating(&id));
        time::sleep(INTERVAL * 2).await;
        assert!(drain(&rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_video_error_falls_back_to_images_permanently() {
        let (engine, rx) = engine_with(video_catalog());
        let id = GalleryId::new("1");
        engine.register(spec("1", vec![0, 1, 2]));
        drain(&rx);

        engine.playback_event(&id, PlaybackEvent::Error);
        let after = drain(&rx);
        assert_eq!(
            after,
            vec![
                Intent::HideVideoSlot {
                    gallery: id.clone()
                },
                Intent::SetActive {
                    gallery: id.clone(),
                    index: 0,
                    mood: None,
                },
            ]
        );
        assert_eq!(engine.item_count(&id), Some(2));
        assert_eq!(engine.video_phase(&id), Some(VideoPhase::Failed));
        assert!(engine.is_rotating(&id));

        // Image-only rotation over the two remaining slots.
        let start = Instant::now();
        let first = rx.recv().await.unwrap();
        assert_eq!(start.elapsed(), INTERVAL);
        assert_matches!(first, Intent::SetActive { index: 1, .. });
        let second = rx.recv().await.unwrap();
        assert_matches!(second, Intent::SetActive { index: 0, .. });

        // Later playback events are ignored for the rest of the session.
        engine.playback_event(&id, PlaybackEvent::Started);
        assert_eq!(engine.video_phase(&id), Some(VideoPhase::Failed));
    }

    #[tokio::test]
    async fn test_visibility_pauses_and_resumes_playback() {
        let (engine, rx) = engine_with(video_catalog());
        let id = GalleryId::new("1");
        engine.register(spec("1", vec![0, 1, 2]));
        drain(&rx);

        engine.playback_event(&id, PlaybackEvent::Started);
        engine.set_visible(&id, false);
        assert_eq!(
            drain(&rx),
            vec![Intent::PauseVideo {
                gallery: id.clone()
            }]
        );
        engine.set_visible(&id, true);
        assert_eq!(
            drain(&rx),
            vec![Intent::ResumeVideo {
                gallery: id.clone()
            }]
        );

        // A completed video stays put when scrolled back into view.
        engine.playback_event(&id, PlaybackEvent::Ended);
        drain(&rx);
        engine.set_visible(&id, false);
        engine.set_visible(&id, true);
        assert!(drain(&rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_advancing_off_video_pauses_then_reenters() {
        let (engine, rx) = engine_with(video_catalog());
        let id = GalleryId::new("1");
        engine.register(spec("1", vec![0, 1, 2]));
        drain(&rx);
        engine.playback_event(&id, PlaybackEvent::Started);

        engine.advance(&id, Direction::Forward);
        let intents = drain(&rx);
        assert_eq!(intents[0], Intent::PauseVideo { gallery: id.clone() });
        assert_matches!(intents[1], Intent::SetActive { index: 1, .. });
        assert!(engine.is_rotating(&id));

        // The timer walks the remaining image, wraps back onto the video
        // slot, attempts playback, and parks again.
        let a = rx.recv().await.unwrap();
        assert_matches!(a, Intent::SetActive { index: 2, .. });
        let b = rx.recv().await.unwrap();
        assert_matches!(b, Intent::SetActive { index: 0, .. });
        let c = rx.recv().await.unwrap();
        assert_eq!(
            c,
            Intent::PlayVideo {
                gallery: id.clone(),
                muted: false,
            }
        );
        assert!(!engine.is_rotating(&id));
        assert_eq!(engine.video_phase(&id), Some(VideoPhase::Idle));
    }
}
