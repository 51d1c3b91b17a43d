//! Pipeline stages for a conversion run.
//!
//! Each submodule implements exactly one step, so each is independently
//! testable and the orchestrator in [`crate::convert`] stays a thin loop.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ classify ──▶ decode ──▶ destination ──▶ encode
//! (walkdir)    (table)      (image)    (free name)     (png/tiff + DPI)
//! ```
//!
//! 1. [`discover`]    — lazily walk the scan root in lexical order, keeping
//!    files whose extension is in the format table
//! 2. [`classify`]    — `AlreadyOk` vs `NeedsConversion`, from the extension only
//! 3. [`decode`]      — capability check, then decode + EXIF orientation
//! 4. [`destination`] — sibling path with the target extension, bounded
//!    `name (N).ext` collision search
//! 5. [`encode`]      — PNG/TIFF with a resolution tag, create-only write

pub mod classify;
pub mod decode;
pub mod destination;
pub mod discover;
pub mod encode;
