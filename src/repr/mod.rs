//! Canonical in-memory model representations.
//!
//! - [`cart`]: single-tree CART models built from pointer-based decision trees.

pub mod cart;
