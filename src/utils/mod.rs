//! Shared helpers used by every symbology
//!
//! - Bit reading and writing (MSB-first cursors)
//! - ECI character sets and the deferred-conversion string builder
//! - Memory pools (buffer reuse across decode calls)
//! - Rendering a module matrix to pixels

pub mod bits;
pub mod charset;
pub mod memory_pool;
pub mod render;
