//! Sparse, windowed ring storage
//!
//! Rings are created lazily by index and evicted once they fall outside the
//! window around the current escape index. A BTreeMap keeps iteration in
//! index order, which the deterministic tick relies on.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::generator::RingGenerator;
use super::ring::Ring;
use crate::consts::{WINDOW_FUTURE, WINDOW_PAST};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RingStore {
    rings: BTreeMap<u32, Ring>,
}

impl RingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index range the window keeps around `escaped`
    pub fn window_bounds(escaped: u32) -> (u32, u32) {
        (
            escaped.saturating_sub(WINDOW_PAST),
            escaped.saturating_add(WINDOW_FUTURE),
        )
    }

    /// Create the ring at `index` if it does not exist yet
    pub fn ensure_ring<R: Rng + ?Sized>(
        &mut self,
        index: u32,
        generator: &RingGenerator,
        rng: &mut R,
    ) -> &mut Ring {
        self.rings
            .entry(index)
            .or_insert_with(|| generator.generate(index, rng))
    }

    /// Materialize every ring in the window around `escaped` and evict the rest
    ///
    /// Must only be called with no transition pending; the in-flight target
    /// may lie outside the window.
    pub fn ensure_window<R: Rng + ?Sized>(
        &mut self,
        escaped: u32,
        generator: &RingGenerator,
        rng: &mut R,
    ) {
        let (lo, hi) = Self::window_bounds(escaped);
        for index in lo..=hi {
            self.ensure_ring(index, generator, rng);
        }
        let before = self.rings.len();
        self.rings.retain(|&index, _| (lo..=hi).contains(&index));
        let evicted = before - self.rings.len();
        if evicted > 0 {
            log::trace!("Evicted {evicted} rings outside [{lo}, {hi}]");
        }
    }

    pub fn get(&self, index: u32) -> Option<&Ring> {
        self.rings.get(&index)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut Ring> {
        self.rings.get_mut(&index)
    }

    pub fn contains(&self, index: u32) -> bool {
        self.rings.contains_key(&index)
    }

    /// Ring indices in ascending order
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.rings.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ring> {
        self.rings.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ring> {
        self.rings.values_mut()
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn clear(&mut self) {
        self.rings.clear();
    }
}
