//! Favicon resolution pipeline.
//!
//! Given a website reference, [`FaviconResolver`] classifies the query,
//! consults the static override table, scans the page `<head>` and its web
//! app manifest for icon declarations, ranks every candidate by closeness to
//! a target size, and returns the first candidate that actually serves an
//! image. Every failure degrades to the next fallback tier; callers only ever
//! see an icon or one of the [`Sentinel`] placeholders.

pub mod candidate;
pub mod client;
pub mod diagnostics;
pub mod error;
pub mod head;
pub mod manifest;
pub mod path;
pub mod query;
pub mod rank;
pub mod resolver;

pub use candidate::{CandidateSource, IconCandidate};
pub use client::{FetchClient, FetchTimeouts, IconImage, PageDocument};
pub use diagnostics::Diagnostics;
pub use error::ResolveError;
pub use favicon_core::Sentinel;
pub use rank::TouchIconPolicy;
pub use resolver::{FaviconResolver, Resolution, ResolveOptions, ResolverSettings};
