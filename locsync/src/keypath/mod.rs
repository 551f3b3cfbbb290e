//! Dot-joined path keys: turning nested translation trees into flat resources
//! and back.
//!
//! [`flatten`] is a plain recursive walk. [`unflatten`] has to guess whether a
//! numeric segment addresses an array slot or an object key, and may revise
//! that guess after later keys reveal the real shape. The guessing rules live
//! in [`segment`] so they can be tested without building trees.

pub mod flatten;
pub mod segment;
pub mod unflatten;

pub use flatten::flatten;
pub use segment::{
    ContainerKind, MAX_ARRAY_INDEX, SPARSE_MIN_LENGTH, SegmentKind, classify_segment,
    container_for, split_key,
};
pub use unflatten::unflatten;
