//! Zipkart dashboard core.
//!
//! - [`percent`]: period-over-period change labels (`"+50%"`, `"-20%"`, `"0%"`).
//! - [`reorder`]: drag-and-drop panel reordering with an injected drag surface.
//! - [`layout`]: the Home dashboard's panel lists and their persistence.
//!
//! The remaining modules make up the `zipkart-dash` binary: statistics
//! loading, terminal summary, HTML report, and CSV export.

pub mod app;
pub mod cli;
pub mod formatting;
pub mod layout;
pub mod output;
pub mod percent;
pub mod progress;
pub mod reorder;
pub mod report;
pub mod sources;
pub mod statistics;
pub mod summary;
pub mod tracing_setup;

pub use layout::{DashboardLayout, Panel, Viewport};
pub use percent::{PercentChange, compute_label};
pub use reorder::{DragState, DragSurface, DropTarget, PointerSample, ReorderEngine, Side, move_key};
