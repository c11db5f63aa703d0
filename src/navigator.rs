use std::collections::BTreeSet;
use std::path::Path;
use std::rc::Rc;

use crate::backend::Backend;
use crate::collection::{step_wrapped, ImageCollection};
use crate::entry::ImageEntry;
use crate::loader::ScaleMode;

// ---------------------------------------------------------------------------
// Predictive loading parameters
// ---------------------------------------------------------------------------

/// Total heat shared out across all entries on every rebalance.
const HEAT_BUDGET: f64 = 30.0;
/// Flat decay subtracted from every entry after normalisation.
const DECAY: f64 = 1.0;
/// Heat added to each entry near the viewing position.
const NEIGHBOR_BOOST: f64 = 2.0;
/// Offsets from the current entry that count as its neighbourhood.
const NEIGHBORHOOD: [isize; 5] = [0, 1, -1, 10, -10];

/// What the caller has to do with the display after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Unchanged,
    Render,
    Clear,
}

/// The open collections, the active-collection cursor and the score-driven
/// decode/evict policy over them.
pub struct Navigator {
    collections: Vec<ImageCollection>,
    active: usize,
    backend: Rc<dyn Backend>,
}

impl Navigator {
    pub fn new(backend: Rc<dyn Backend>) -> Self {
        Self {
            collections: Vec::new(),
            active: 0,
            backend,
        }
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn collections(&self) -> &[ImageCollection] {
        &self.collections
    }

    pub fn active_collection(&self) -> Option<&ImageCollection> {
        self.collections.get(self.active)
    }

    pub fn active_collection_mut(&mut self) -> Option<&mut ImageCollection> {
        self.collections.get_mut(self.active)
    }

    pub fn current_entry(&self) -> Option<&ImageEntry> {
        self.active_collection()?.current()
    }

    pub fn current_entry_mut(&mut self) -> Option<&mut ImageEntry> {
        self.active_collection_mut()?.current_mut()
    }

    pub fn offset_collection_index(&self, offset: isize) -> usize {
        step_wrapped(self.active, self.collections.len(), offset)
    }

    pub fn entry_at(&self, collection_offset: isize, entry_offset: isize) -> Option<&ImageEntry> {
        self.collections
            .get(self.offset_collection_index(collection_offset))?
            .entry_at(entry_offset)
    }

    /// Opens `path` as a new collection at the front of the set and makes it
    /// active. Collections with nothing showable are dropped.
    pub fn open(&mut self, path: &Path) -> Refresh {
        let mut collection = ImageCollection::open(path, &self.backend);
        if !collection.is_showable() {
            log::info!("nothing to show in {}, not opening it", path.display());
            return Refresh::Unchanged;
        }

        log::info!("opened {} ({} images)", path.display(), collection.len());
        self.collections.insert(0, collection);
        self.active = 0;
        self.rebalance_and_apply();
        Refresh::Render
    }

    /// Closes the collection `offset` steps from the active one. Closing the
    /// only collection empties the set.
    pub fn close_active(&mut self, offset: isize) -> Refresh {
        if self.collections.is_empty() {
            return Refresh::Unchanged;
        }
        if self.collections.len() == 1 {
            log::info!("closed {}", self.collections[0].source().display());
            self.collections.clear();
            self.active = 0;
            return Refresh::Clear;
        }

        let target = self.offset_collection_index(offset);
        let closed = self.collections.remove(target);
        log::info!("closed {}", closed.source().display());
        if self.active >= self.collections.len() {
            self.active = 0;
        }
        self.rebalance_and_apply();
        Refresh::Render
    }

    /// Returns whether the active collection changed.
    pub fn switch_active(&mut self, offset: isize) -> bool {
        if offset == 0 || self.collections.is_empty() {
            return false;
        }
        let target = self.offset_collection_index(offset);
        if target == self.active {
            return false;
        }
        self.active = target;
        self.rebalance_and_apply();
        true
    }

    pub fn move_current(&mut self, offset: isize) -> Option<&ImageEntry> {
        self.reposition(|c| {
            c.move_by(offset);
        })
    }

    pub fn jump_to_start(&mut self) -> Option<&ImageEntry> {
        self.reposition(|c| {
            c.jump_to_start();
        })
    }

    pub fn jump_to_end(&mut self) -> Option<&ImageEntry> {
        self.reposition(|c| {
            c.jump_to_end();
        })
    }

    /// Moves the active collection's cursor and rebalances when it landed on
    /// a different entry.
    fn reposition<F>(&mut self, step: F) -> Option<&ImageEntry>
    where
        F: FnOnce(&mut ImageCollection),
    {
        let collection = self.collections.get_mut(self.active)?;
        let before = collection.cursor();
        step(collection);
        if collection.cursor() != before {
            self.rebalance_and_apply();
        }
        self.current_entry()
    }

    /// Deletes the current image from disk and drops it from its collection.
    pub fn delete_current(&mut self) -> Refresh {
        let Some(collection) = self.collections.get_mut(self.active) else {
            return Refresh::Unchanged;
        };
        let Some(entry) = collection.current_mut() else {
            return Refresh::Unchanged;
        };
        if !entry.delete_backing_file() {
            return Refresh::Unchanged;
        }

        collection.remove_current();
        if collection.is_empty() {
            return self.close_active(0);
        }
        self.rebalance_and_apply();
        Refresh::Render
    }

    pub fn render_current(&mut self, target: (u32, u32), mode: ScaleMode) -> bool {
        self.current_entry_mut()
            .is_some_and(|entry| entry.render_for_display(target, mode))
    }

    pub fn loaded_count(&self) -> usize {
        self.collections
            .iter()
            .flat_map(|c| c.entries())
            .filter(|e| e.is_loaded())
            .count()
    }

    // -----------------------------------------------------------------------
    // Predictive loading
    // -----------------------------------------------------------------------

    /// Decays every entry's heat and boosts the entries around the current
    /// one. Entries crossing the load threshold are decoded, entries reaching
    /// zero are evicted, so residency follows the viewing position.
    pub fn rebalance_and_apply(&mut self) {
        self.decay_scores();
        self.boost_neighborhood();
        log::debug!(
            "rebalanced: {} images resident across {} collections",
            self.loaded_count(),
            self.collections.len()
        );
    }

    fn decay_scores(&mut self) {
        // Every new score depends on the total from before this pass.
        let total: f64 = self
            .collections
            .iter()
            .flat_map(|c| c.entries())
            .map(ImageEntry::score)
            .sum();
        if total <= 0.0 {
            return;
        }

        for entry in self.collections.iter_mut().flat_map(|c| c.entries_mut()) {
            let share = entry.score() / total;
            entry.score_set(HEAT_BUDGET * share - DECAY);
        }
    }

    fn boost_neighborhood(&mut self) {
        let Some(collection) = self.collections.get_mut(self.active) else {
            return;
        };
        if collection.is_empty() {
            return;
        }

        // Short collections reach the same entry through several offsets.
        let neighborhood: BTreeSet<usize> = NEIGHBORHOOD
            .iter()
            .map(|&offset| collection.offset_index(offset))
            .collect();
        for idx in neighborhood {
            if let Some(entry) = collection.entry_mut(idx) {
                entry.score_add(NEIGHBOR_BOOST);
            }
        }
    }
}
