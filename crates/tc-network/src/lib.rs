//! `tc-network` — the narrow road-network interface consumed by the
//! calibration side of the pipeline.
//!
//! Geometry lookups belong to the network tooling; this crate only fixes the
//! shape of what is consumed:
//!
//! ```text
//! (point, radius) -> Option<(edge_id, offset)>
//! edge_id         -> [lane_id]
//! ```
//!
//! [`NetworkLocator`] is that contract.  [`EdgeIndex`] is an in-memory
//! implementation backed by an R-tree of edge shape segments, good enough for
//! tests and city-scale networks loaded from an external export.
//!
//! # Crate layout
//!
//! | Module      | Contents                                               |
//! |-------------|--------------------------------------------------------|
//! | [`network`] | `Edge`, `Lane`, `EdgeHit`, `NetworkLocator`            |
//! | [`index`]   | `EdgeIndex`, `EdgeIndexBuilder`                        |

pub mod index;
pub mod network;

#[cfg(test)]
mod tests;

pub use index::{EdgeIndex, EdgeIndexBuilder};
pub use network::{Edge, EdgeHit, Lane, NetworkLocator};
