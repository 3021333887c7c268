//! Output converters driven by the reconstructed element stream.
//!
//! Currently a single format: Markdown. Kept as its own module, separate
//! from layout reconstruction, so an additional output format can be
//! added later without touching `pipeline`.

pub mod markdown;

pub use markdown::to_markdown;
