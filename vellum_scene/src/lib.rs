// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vellum Scene: a retained-mode scene graph for 2D vector documents.
//!
//! The crate keeps a tree of drawable nodes (groups, layers, placed raster
//! content, symbol instances) with per-node affine transforms, styling, and
//! attribute flags, and maintains the derived state a vector editor leans on
//! every frame:
//!
//! - **Cached bounds** in four variants (plain, stroke, handle, rough),
//!   computed lazily and invalidated precisely through a dependents registry;
//!   see [`Scene::bounds`].
//! - **Change notification**: every mutation funnels through one internal
//!   path that classifies it with [`ChangeFlags`], coalesces it per node into
//!   a [`ChangeSet`], and drives cache invalidation and the redraw flag.
//! - **Hit testing** front-to-back with tolerance, feature selection, and
//!   uniform filtering; see [`Scene::hit_test`].
//! - **Drawing** as a paint-order command stream into a caller-provided
//!   [`Surface`], plus a [`SurfacePool`] for renderers' scratch surfaces.
//!
//! Geometry types come from [`kurbo`]; the narrow-phase hit tests live in
//! `vellum_hit` and are re-exported where they appear in this crate's API.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Size, Vec2};
//! use vellum_scene::{BoundsKind, HitOptions, Scene};
//!
//! let mut scene = Scene::new();
//! let raster = scene.insert_raster(None, Size::new(100.0, 50.0));
//! scene.translate(raster, Vec2::new(10.0, 10.0));
//!
//! let bounds = scene.bounds(raster, BoundsKind::Bounds).unwrap();
//! assert_eq!(bounds.origin(), Point::new(10.0, 10.0));
//!
//! let hit = scene.hit_test(Point::new(20.0, 20.0), &HitOptions::default());
//! assert_eq!(hit.map(|h| h.node), Some(raster));
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): use the standard library.
//! - `libm`: use floating point implementations from [libm][] instead, for
//!   `no_std` targets. One of `std` or `libm` must be enabled.
//!
//! [libm]: https://crates.io/crates/libm

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![no_std]

extern crate alloc;

mod bounds;
mod draw;
mod event;
mod hit;
mod node;
mod scene;
mod transform;
mod types;
mod util;

pub use draw::{DrawParams, PooledSurface, Surface, SurfacePool};
pub use event::{EventHooks, EventKind, RemoveOnMask};
pub use hit::{HitOptions, HitResult};
pub use node::NodeKind;
pub use scene::Scene;
pub use types::{BlendMode, BoundsKind, BoundsPosition, ItemFlags, NodeId, Style};

pub use vellum_change::{ChangeFlags, ChangeSet};
pub use vellum_hit::HitKind;
