//! # nearthree
//!
//! `nearthree` is a Rust library for k-nearest-neighbor queries over fixed 3D point clouds.
//! It is a building block for comparing shapes, such as points sampled along neuron skeletons,
//! by finding for each point of one shape its closest matches in another.
//!
//! ## Features
//!
//! - **Immutable median-split tree**: built once over a [`PointSet`], split axis cycling
//!   x, y, z with depth, nodes stored in a flat arena.
//! - **Approximate and exact search**: [`SpatialIndex::query`] follows the close side of every
//!   split, [`SpatialIndex::query_exact`] backtracks across splitting planes when needed.
//! - **Parallel**: large trees are built with `rayon` fork/join, and bulk queries run on the
//!   `rayon` pool. The index is read-only after construction and freely shareable.
//! - **NBLAST scoring**: [`VectorCloud`] estimates per-point tangents from nearest neighbors
//!   and sums [`ScoreTable`] scores over the nearest matches of another cloud.
//!
//! ## Example
//!
//! ```
//! use nearthree::{PointSet, SpatialIndex};
//!
//! let points = PointSet::from_points(&[
//!     [0.0, 0.0, 0.0],
//!     [10.0, 0.0, 0.0],
//!     [0.0, 10.0, 0.0],
//!     [0.0, 0.0, 10.0],
//!     [5.0, 5.0, 5.0],
//! ]);
//! let index = SpatialIndex::build(points, 2)?;
//! assert_eq!(index.query([5.0, 5.0, 5.0], 1)?, vec![4]);
//! # Ok::<(), nearthree::Error>(())
//! ```

mod bounds;
pub mod cloud;
mod config;
mod error;
mod index;
pub mod kdtree;
mod points;
pub mod score;
pub mod select;

pub use bounds::BoundingBox;
pub use cloud::VectorCloud;
pub use config::IndexConfig;
pub use config::DEFAULT_LEAF_SIZE;
pub use config::DEFAULT_PARALLEL_THRESHOLD;
pub use error::Error;
pub use error::Result;
pub use index::Neighbors;
pub use index::SpatialIndex;
pub use kdtree::KdTree;
pub use kdtree::Node;
pub use kdtree::NodeId;
pub use points::PointSet;
pub use score::ScoreTable;
