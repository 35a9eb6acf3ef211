//! Drag-and-drop reordering of dashboard panels.
//!
//! [`move_key`] is the pure list transformation. [`ReorderEngine`] tracks one
//! drag gesture at a time: which key is being dragged, from which side, where
//! the drop indicator sits, and the drag image shown under the pointer.
//!
//! Pointer positions and element bounds come in as [`PointerSample`] values and
//! the drag image is created through an injected [`DragSurface`], so the engine
//! runs the same against a browser host, a terminal, or a test double.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Which independent ordered list a panel or a drag gesture belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    /// The unified single-column list used on narrow viewports.
    Mobile,
}

impl Side {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Bounding box of a rendered list item, in the same space as [`Point`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    #[must_use]
    pub fn mid_y(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Pointer position plus the bounds of the element under it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    pub position: Point,
    pub target: Bounds,
}

impl PointerSample {
    /// Offset of the pointer from the top-left corner of the target.
    #[must_use]
    pub fn grab_offset(&self) -> Point {
        Point {
            x: self.position.x - self.target.left,
            y: self.position.y - self.target.top,
        }
    }

    /// Insertion index for a hover over the item rendered at `index`.
    ///
    /// The upper half of the item inserts before it, the lower half after it.
    #[must_use]
    pub fn insertion_index(&self, index: usize) -> usize {
        if self.position.y < self.target.mid_y() {
            index
        } else {
            index.saturating_add(1)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DragImageId(pub u64);

/// Host capability that renders the drag cursor image.
///
/// Browser drag previews are translucent, so the host attaches a fully opaque
/// copy of the element off-screen and uses it as the drag image instead.
pub trait DragSurface {
    /// Attaches a copy of the element for `key`, anchored so the pointer holds
    /// it at `grab` relative to its top-left corner.
    fn attach_drag_image(&self, key: &str, bounds: Bounds, grab: Point) -> DragImageId;

    /// Removes an image previously returned by [`Self::attach_drag_image`].
    fn detach_drag_image(&self, id: DragImageId);
}

/// Surface for hosts that have no custom drag image.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl DragSurface for NullSurface {
    fn attach_drag_image(&self, _key: &str, _bounds: Bounds, _grab: Point) -> DragImageId {
        DragImageId(0)
    }

    fn detach_drag_image(&self, _id: DragImageId) {}
}

/// Attached drag image. Detached from its surface when dropped.
pub struct DragImage {
    surface: Rc<dyn DragSurface>,
    id: DragImageId,
}

impl DragImage {
    fn attach(surface: &Rc<dyn DragSurface>, key: &str, sample: &PointerSample) -> Self {
        let id = surface.attach_drag_image(key, sample.target, sample.grab_offset());
        Self {
            surface: Rc::clone(surface),
            id,
        }
    }

    #[must_use]
    pub const fn id(&self) -> DragImageId {
        self.id
    }
}

impl Drop for DragImage {
    fn drop(&mut self) {
        self.surface.detach_drag_image(self.id);
    }
}

impl fmt::Debug for DragImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragImage").field("id", &self.id).finish()
    }
}

/// Read-only view of the gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState<'a> {
    Idle,
    Dragging { key: &'a str, side: Side },
}

/// Currently hovered insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub side: Side,
    pub index: usize,
}

#[derive(Debug)]
struct ActiveDrag {
    key: String,
    side: Side,
    image: DragImage,
}

/// Drag gesture state machine: Idle, Dragging, and Dragging with a hovered
/// drop target.
pub struct ReorderEngine {
    surface: Rc<dyn DragSurface>,
    active: Option<ActiveDrag>,
    indicator: Option<DropTarget>,
}

impl ReorderEngine {
    #[must_use]
    pub fn new(surface: Rc<dyn DragSurface>) -> Self {
        Self {
            surface,
            active: None,
            indicator: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> DragState<'_> {
        self.active
            .as_ref()
            .map_or(DragState::Idle, |drag| DragState::Dragging {
                key: drag.key.as_str(),
                side: drag.side,
            })
    }

    #[must_use]
    pub const fn indicator(&self) -> Option<DropTarget> {
        self.indicator
    }

    #[must_use]
    pub fn drag_image(&self) -> Option<DragImageId> {
        self.active.as_ref().map(|drag| drag.image.id())
    }

    /// Starts dragging `key` out of the `side` list.
    ///
    /// A gesture that is still active is abandoned first, releasing its image.
    pub fn begin_drag(&mut self, side: Side, key: &str, sample: &PointerSample) {
        self.reset();
        let image = DragImage::attach(&self.surface, key, sample);
        debug!(%side, key, image = image.id().0, "drag started");
        self.active = Some(ActiveDrag {
            key: key.to_string(),
            side,
            image,
        });
    }

    /// Records the insertion point for a pointer over the item at `index`.
    ///
    /// Hovering a list on another side than the drag source changes nothing.
    pub fn update_hover(&mut self, side: Side, index: usize, sample: &PointerSample) {
        let Some(drag) = self.active.as_ref() else {
            return;
        };
        if drag.side != side {
            trace!(%side, source = %drag.side, "hover over foreign list ignored");
            return;
        }
        let target = DropTarget {
            side,
            index: sample.insertion_index(index),
        };
        trace!(%side, index = target.index, "drop indicator moved");
        self.indicator = Some(target);
    }

    /// Ends the gesture without a drop.
    pub fn end_drag(&mut self) {
        if let Some(drag) = self.active.as_ref() {
            debug!(side = %drag.side, key = drag.key.as_str(), "drag ended");
        }
        self.reset();
    }

    /// Completes the gesture over the `side` list holding `sequence`.
    ///
    /// Returns the reordered sequence to commit, or `None` when the drop is
    /// rejected: no drag in progress, a drop on another side, or no recorded
    /// insertion point. The engine is idle afterwards in every case.
    pub fn drop_on(&mut self, side: Side, sequence: &[String]) -> Option<Vec<String>> {
        let drag = self.active.take();
        let indicator = self.indicator.take();
        let drag = drag?;

        if drag.side != side {
            debug!(%side, source = %drag.side, key = drag.key.as_str(), "drop rejected: side mismatch");
            return None;
        }
        let Some(target) = indicator.filter(|target| target.side == side) else {
            debug!(%side, key = drag.key.as_str(), "drop rejected: no insertion point");
            return None;
        };

        debug!(%side, key = drag.key.as_str(), index = target.index, "drop accepted");
        Some(move_key(sequence, &drag.key, target.index))
    }

    fn reset(&mut self) {
        self.indicator = None;
        self.active = None;
    }
}

impl Default for ReorderEngine {
    fn default() -> Self {
        Self::new(Rc::new(NullSurface))
    }
}

impl fmt::Debug for ReorderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReorderEngine")
            .field("active", &self.active)
            .field("indicator", &self.indicator)
            .finish_non_exhaustive()
    }
}

/// Moves `key` so it lands at `to_index` of the original sequence.
///
/// `to_index` is an insertion point computed against `sequence` before the
/// key is removed, so indices past the key's current slot shift down by one.
/// Out-of-range indices clamp to the end and an unknown key leaves the
/// sequence as it was.
#[must_use]
pub fn move_key<K>(sequence: &[K], key: &K, to_index: usize) -> Vec<K>
where
    K: Clone + PartialEq,
{
    let Some(from_index) = sequence.iter().position(|item| item == key) else {
        return sequence.to_vec();
    };

    let mut reordered = sequence.to_vec();
    let moved = reordered.remove(from_index);
    let target = if to_index > from_index {
        to_index - 1
    } else {
        to_index
    };
    let target = target.min(reordered.len());
    reordered.insert(target, moved);
    reordered
}
