//! Full-catalog popup viewer (lightbox).
//!
//! Pages over the whole catalog independently of any gallery's rotation
//! state. Keyboard navigation is only live while the popup is open; every
//! operation is a no-op over an empty catalog so a failed catalog load
//! leaves the page inert rather than broken.

use std::sync::Arc;

use async_channel::Sender;
use tracing::debug;

use crate::catalog::Catalog;
use crate::intent::Intent;

/// Keys the popup reacts to while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKey {
    ArrowLeft,
    ArrowRight,
    Escape,
}

pub struct PopupNavigator {
    catalog: Arc<Catalog>,
    current: usize,
    open: bool,
    intents: Sender<Intent>,
}

impl PopupNavigator {
    pub fn new(catalog: Arc<Catalog>, intents: Sender<Intent>) -> Self {
        Self {
            catalog,
            current: 0,
            open: false,
            intents,
        }
    }

    /// Opens the popup on the item at `index` (wrapped modulo catalog
    /// length). Does nothing when already open or when the catalog is empty.
    pub fn open(&mut self, index: usize) {
        if self.open {
            debug!("popup already open");
            return;
        }
        self.goto(index);
    }

    /// `open` without the already-open guard: repositions (and opens) the
    /// popup unconditionally.
    pub fn goto(&mut self, index: usize) {
        if self.catalog.is_empty() {
            debug!("popup ignored: catalog is empty");
            return;
        }
        self.current = index % self.catalog.len();
        self.open = true;
        self.show();
    }

    /// Advances to the next catalog item, wrapping at the end.
    pub fn next(&mut self) {
        self.step(1);
    }

    /// Retreats to the previous catalog item, wrapping at the start.
    pub fn prev(&mut self) {
        self.step(self.catalog.len().saturating_sub(1));
    }

    /// Closes the popup; the view pauses any playing media.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.emit(Intent::HidePopup);
    }

    /// Keyboard contract, active only while the popup is open.
    pub fn handle_key(&mut self, key: PopupKey) {
        if !self.open {
            return;
        }
        match key {
            PopupKey::ArrowLeft => self.prev(),
            PopupKey::ArrowRight => self.next(),
            PopupKey::Escape => self.close(),
        }
    }

    /// A click on the backdrop outside the content area closes the popup.
    pub fn backdrop_clicked(&mut self) {
        self.close();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    fn step(&mut self, delta: usize) {
        if self.catalog.is_empty() {
            debug!("popup navigation ignored: catalog is empty");
            return;
        }
        self.current = (self.current + delta) % self.catalog.len();
        if self.open {
            self.show();
        }
    }

    fn show(&self) {
        self.emit(Intent::ShowPopup {
            index: self.current,
            total: self.catalog.len(),
        });
    }

    fn emit(&self, intent: Intent) {
        if self.intents.try_send(intent).is_err() {
            debug!("intent channel closed, dropping popup intent");
        }
    }
}
