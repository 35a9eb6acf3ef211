//! Home dashboard panel order.
//!
//! Desktop shows two independent columns, narrow viewports one unified list.
//! Each list is a permutation of a fixed panel set; committing anything else
//! is refused.

use crate::output::write_output_file;
use crate::reorder::{ReorderEngine, Side, move_key};
use anyhow::{Context, Result};
use clap::ValueEnum;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Widths below this many pixels render the unified mobile list.
pub const MOBILE_BREAKPOINT_PX: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Sales,
    Purchase,
    Chart,
    Inventory,
    Product,
    TopProducts,
}

impl Panel {
    pub const LEFT: [Self; 3] = [Self::Sales, Self::Purchase, Self::Chart];
    pub const RIGHT: [Self; 3] = [Self::Inventory, Self::Product, Self::TopProducts];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Purchase => "purchase",
            Self::Chart => "chart",
            Self::Inventory => "inventory",
            Self::Product => "product",
            Self::TopProducts => "topProducts",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Sales => "Sales Overview",
            Self::Purchase => "Purchase Overview",
            Self::Chart => "Sales & Purchase",
            Self::Inventory => "Inventory Summary",
            Self::Product => "Product Summary",
            Self::TopProducts => "Top Selling Products",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::LEFT
            .into_iter()
            .chain(Self::RIGHT)
            .find(|panel| panel.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Viewport {
    #[default]
    Desktop,
    Mobile,
}

impl Viewport {
    #[must_use]
    pub const fn from_width(width_px: u32) -> Self {
        if width_px < MOBILE_BREAKPOINT_PX {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardLayout {
    left: Vec<String>,
    right: Vec<String>,
    mobile: Vec<String>,
}

impl Default for DashboardLayout {
    fn default() -> Self {
        let left = keys_of(&Panel::LEFT);
        let right = keys_of(&Panel::RIGHT);
        let mobile = left.iter().chain(&right).cloned().collect();
        Self {
            left,
            right,
            mobile,
        }
    }
}

impl DashboardLayout {
    #[must_use]
    pub fn sequence(&self, side: Side) -> &[String] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
            Side::Mobile => &self.mobile,
        }
    }

    /// Lists rendered for a viewport, in display order.
    #[must_use]
    pub fn columns(&self, viewport: Viewport) -> Vec<(Side, &[String])> {
        match viewport {
            Viewport::Desktop => vec![
                (Side::Left, self.left.as_slice()),
                (Side::Right, self.right.as_slice()),
            ],
            Viewport::Mobile => vec![(Side::Mobile, self.mobile.as_slice())],
        }
    }

    /// Replaces the order of one list.
    ///
    /// Returns `false` and keeps the current order when `sequence` is not a
    /// permutation of that list's panels.
    pub fn commit(&mut self, side: Side, sequence: Vec<String>) -> bool {
        let slot = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
            Side::Mobile => &mut self.mobile,
        };
        if !is_permutation(slot, &sequence) {
            warn!(%side, ?sequence, "refusing to commit a different panel set");
            return false;
        }
        *slot = sequence;
        true
    }

    /// Moves one panel within a list. Unknown keys leave the list unchanged.
    pub fn move_panel(&mut self, side: Side, key: &str, to_index: usize) -> bool {
        let reordered = move_key(self.sequence(side), &key.to_string(), to_index);
        self.commit(side, reordered)
    }

    /// Completes a drag gesture over the `side` list and commits the result.
    ///
    /// Returns `true` when the order was updated.
    pub fn apply_drop(&mut self, engine: &mut ReorderEngine, side: Side) -> bool {
        engine
            .drop_on(side, self.sequence(side))
            .is_some_and(|reordered| self.commit(side, reordered))
    }

    /// Whether every list holds exactly the default panel set.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let defaults = Self::default();
        [Side::Left, Side::Right, Side::Mobile]
            .into_iter()
            .all(|side| is_permutation(defaults.sequence(side), self.sequence(side)))
    }

    /// Loads a stored layout, falling back to the default when the file is
    /// missing or holds a different panel set.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stored layout, using default");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read layout {}", path.display()));
            }
        };
        let layout: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse layout {}", path.display()))?;
        if layout.is_valid() {
            Ok(layout)
        } else {
            warn!(path = %path.display(), "stored layout has an unexpected panel set, using default");
            Ok(Self::default())
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize layout")?;
        write_output_file(path, json.as_bytes()).await
    }
}

fn keys_of(panels: &[Panel]) -> Vec<String> {
    panels.iter().map(|panel| panel.key().to_string()).collect()
}

fn is_permutation(expected: &[String], candidate: &[String]) -> bool {
    if expected.len() != candidate.len() {
        return false;
    }
    let mut counts: FxHashMap<&str, isize> = FxHashMap::default();
    for key in expected {
        *counts.entry(key.as_str()).or_insert(0) += 1;
    }
    for key in candidate {
        *counts.entry(key.as_str()).or_insert(0) -= 1;
    }
    counts.values().all(|&count| count == 0)
}
