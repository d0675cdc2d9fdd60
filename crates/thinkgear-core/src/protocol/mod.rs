//! ThinkGear serial protocol decoding.
//!
//! The protocol follows a layered structure:
//! - `layout`: sync byte, size limits, and field tag codes (source of truth)
//! - `reader`: bounds-checked payload access and checksum arithmetic
//! - `framer`: byte-at-a-time synchronization into checksum-valid frames
//! - `parser`: tag-driven decoding of a frame payload into metrics
//! - `error`: explicit, recoverable decode errors
//!
//! Nothing here performs I/O; bytes arrive through `source` and the
//! `decoder` ties the framer and parser together.

pub mod error;
pub mod framer;
pub mod layout;
pub mod parser;
pub mod reader;

pub use framer::{Frame, FrameEvent, Framer, FramerState};
pub use parser::{FieldTag, parse_payload};
