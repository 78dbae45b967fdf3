//! Application wiring: catalog load, gallery registration, and the demo
//! view loop.
//!
//! The engine owns logical state only, so the binary stands in for the
//! rendering surface: it drains the intent channel and renders each intent
//! as a log line. On startup it also walks the popup and the video state
//! machine through a short scripted tour so a headless run shows the whole
//! surface working.

use std::sync::Arc;
use std::time::Duration;

use async_channel::{Receiver, Sender};
use tracing::{info, warn};

use crate::catalog::{self, Catalog};
use crate::config::{CatalogSource, Config, GalleryConfig};
use crate::form::ContactForm;
use crate::gallery::{Direction, GalleryId, GallerySpec, PlaybackEvent, RotationEngine};
use crate::intent::Intent;
use crate::popup::{PopupKey, PopupNavigator};

pub struct EcogalApp {
    config: Config,
}

impl EcogalApp {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let (intents_tx, intents_rx) = async_channel::unbounded();
        let catalog = load_catalog(&self.config.catalog, &intents_tx).await;

        let engine = RotationEngine::new(
            Arc::clone(&catalog),
            intents_tx.clone(),
            self.config.autoplay_retry_delay(),
        );
        let specs = gallery_specs(&self.config, &catalog);
        for spec in &specs {
            engine.register(spec.clone());
            engine.start_rotation(&spec.id, spec.interval);
        }

        let mut popup = PopupNavigator::new(Arc::clone(&catalog), intents_tx.clone());

        demo_tour(
            &engine,
            &mut popup,
            &specs,
            &catalog,
            &intents_rx,
            self.config.autoplay_retry_delay(),
        )
        .await;
        status_summary(&engine, &specs);
        demo_contact_form(&self.config).await;

        info!("engine running; press ctrl-c to stop");
        loop {
            tokio::select! {
                intent = intents_rx.recv() => match intent {
                    Ok(intent) => render(&catalog, &intent),
                    Err(_) => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    break;
                }
            }
        }

        for spec in &specs {
            engine.stop_rotation(&spec.id);
        }
        Ok(())
    }
}

/// Builds the catalog from the configured source. Failure is not fatal: the
/// view gets a retryable `CatalogUnavailable` and the page runs with an
/// empty catalog (no popup, idle galleries).
async fn load_catalog(source: &CatalogSource, intents: &Sender<Intent>) -> Arc<Catalog> {
    let loaded = match source {
        CatalogSource::Directory { path } => catalog::scan_directory(path),
        CatalogSource::Remote { base_url } => catalog::fetch_remote(base_url).await,
    };
    match loaded {
        Ok(catalog) => {
            info!("catalog ready: {} items", catalog.len());
            Arc::new(catalog)
        }
        Err(err) => {
            warn!("catalog unavailable: {err}");
            let _ = intents.try_send(Intent::CatalogUnavailable {
                reason: err.to_string(),
            });
            Arc::new(Catalog::empty())
        }
    }
}

/// Gallery layout from config, or the default page layout: a background
/// slider over the whole catalog, a hero gallery leading with any video
/// slot, and a faster reviews gallery with the mood overlay.
fn gallery_specs(config: &Config, catalog: &Catalog) -> Vec<GallerySpec> {
    if !config.galleries.is_empty() {
        return config
            .galleries
            .iter()
            .map(|gallery| to_spec(gallery, config))
            .collect();
    }
    if catalog.is_empty() {
        return Vec::new();
    }

    let mut specs = vec![GallerySpec {
        id: GalleryId::new("background"),
        items: catalog.all_indices(),
        interval: config.slider_interval(),
        mood_overlay: false,
    }];
    if catalog.items().iter().any(|item| item.is_video()) {
        let mut items = catalog.all_indices();
        items.sort_by_key(|&index| !catalog.get(index).is_some_and(|item| item.is_video()));
        specs.push(GallerySpec {
            id: GalleryId::new("1"),
            items,
            interval: config.slider_interval(),
            mood_overlay: false,
        });
    }
    specs.push(GallerySpec {
        id: GalleryId::new("reviews"),
        items: catalog.all_indices(),
        interval: config.review_interval(),
        mood_overlay: true,
    });
    specs
}

fn to_spec(gallery: &GalleryConfig, config: &Config) -> GallerySpec {
    GallerySpec {
        id: GalleryId::new(gallery.id.clone()),
        items: gallery.items.clone(),
        interval: gallery
            .interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.slider_interval()),
        mood_overlay: gallery.mood_overlay,
    }
}

/// Scripted pass over the popup and the video lifecycle so a headless run
/// demonstrates every transition.
async fn demo_tour(
    engine: &RotationEngine,
    popup: &mut PopupNavigator,
    specs: &[GallerySpec],
    catalog: &Catalog,
    intents: &Receiver<Intent>,
    retry_delay: Duration,
) {
    render_pending(intents, catalog);
    if catalog.is_empty() {
        return;
    }

    // Page through the popup the way a visitor would.
    popup.open(0);
    popup.handle_key(PopupKey::ArrowRight);
    popup.handle_key(PopupKey::ArrowLeft);
    popup.next();
    popup.prev();
    popup.goto(catalog.len() - 1);
    popup.handle_key(PopupKey::Escape);
    popup.open(0);
    popup.backdrop_clicked();
    info!(
        "popup tour done (open: {}, index {})",
        popup.is_open(),
        popup.current_index()
    );
    render_pending(intents, catalog);

    // Manual navigation on the first gallery.
    if let Some(spec) = specs.first() {
        engine.advance(&spec.id, Direction::Forward);
        engine.advance(&spec.id, Direction::Backward);
        engine.jump_to(&spec.id, 0);
        render_pending(intents, catalog);
    }

    // Walk a video gallery through its lifecycle: rejected autoplay, muted
    // retry, playback with a visibility round trip, loop-on-complete, then
    // the permanent image fallback.
    let video_gallery = specs.iter().find(|spec| {
        spec.items
            .iter()
            .any(|&index| catalog.get(index).is_some_and(|item| item.is_video()))
    });
    if let Some(spec) = video_gallery {
        let id = &spec.id;
        engine.playback_event(id, PlaybackEvent::AutoplayRejected);
        tokio::time::sleep(retry_delay + Duration::from_millis(50)).await;
        engine.playback_event(id, PlaybackEvent::Started);
        engine.set_visible(id, false);
        engine.set_visible(id, true);
        engine.playback_event(id, PlaybackEvent::Ended);
        engine.playback_event(id, PlaybackEvent::Started);
        engine.playback_event(id, PlaybackEvent::Error);
        render_pending(intents, catalog);
    }
}

fn status_summary(engine: &RotationEngine, specs: &[GallerySpec]) {
    for spec in specs {
        let id = &spec.id;
        info!(
            "gallery {id}: {} items, active {:?}, rotating {}, video {:?}",
            engine.item_count(id).unwrap_or(0),
            engine.active_index(id),
            engine.is_rotating(id),
            engine.video_phase(id),
        );
    }
}

/// Exercises the contact form glue: one rejected draft, then a valid
/// submission through the simulated round trip.
async fn demo_contact_form(config: &Config) {
    let mut form = ContactForm {
        name: "Anna".into(),
        phone: "+7 111".into(),
        message: "Hi".into(),
    };
    if let Err(errors) = form.validate(&config.form) {
        for error in &errors {
            info!("contact form rejected: {error}");
        }
    }

    form.phone = "+71112223344".into();
    form.message = "Planning a weekend visit with the kids".into();
    info!("message counter: {}", form.counter_text(&config.form));
    match form.submit(&config.form).await {
        Ok(()) => info!("contact form accepted"),
        Err(errors) => warn!("contact form failed with {} errors", errors.len()),
    }
}

fn render_pending(intents: &Receiver<Intent>, catalog: &Catalog) {
    while let Ok(intent) = intents.try_recv() {
        render(catalog, &intent);
    }
}

/// The demo "rendering surface": one log line per intent.
fn render(catalog: &Catalog, intent: &Intent) {
    match intent {
        Intent::SetActive {
            gallery,
            index,
            mood,
        } => match mood {
            Some(tag) => info!("[{gallery}] slide {index} active {tag}"),
            None => info!("[{gallery}] slide {index} active"),
        },
        Intent::PlayVideo { gallery, muted } => {
            info!("[{gallery}] play video (muted: {muted})");
        }
        Intent::PauseVideo { gallery } => info!("[{gallery}] pause video"),
        Intent::ResumeVideo { gallery } => info!("[{gallery}] resume video"),
        Intent::RestartVideo { gallery } => info!("[{gallery}] loop video from start"),
        Intent::HideVideoSlot { gallery } => info!("[{gallery}] hide video slot"),
        Intent::ShowPlayPrompt { gallery } => info!("[{gallery}] show tap-to-play prompt"),
        Intent::ShowPopup { index, total } => match catalog.get(*index) {
            Some(item) => {
                let counter = index + 1;
                match item.poster.as_deref() {
                    Some(poster) => info!(
                        "popup {counter}/{total}: {} [{}] (poster {poster})",
                        item.caption, item.source
                    ),
                    None => info!("popup {counter}/{total}: {} [{}]", item.caption, item.source),
                }
            }
            None => warn!("popup index {index} outside catalog"),
        },
        Intent::HidePopup => info!("popup closed"),
        Intent::CatalogUnavailable { reason } => warn!("catalog unavailable: {reason}"),
    }
}
