//! Brand visibility analysis for AI model responses.
//!
//! Finds whole-word mentions of an organization's own brand and its
//! competitors in free text, ranks the org brand by first-mention position,
//! and maps the result onto a 0-10 visibility score. Every failure resolves
//! to a fixed low-neutral analysis so callers never have to handle errors.

pub mod catalog;
pub mod detector;
pub mod error;
pub mod pipeline;
pub mod ranker;
pub mod scorer;
pub mod types;

pub use aivis_core::{BrandCatalogEntry, ScoringPolicy};
pub use catalog::{CatalogSource, StaticCatalog};
pub use detector::{detect_mentions, MentionDetector, MIN_TERM_CHARS};
pub use error::DetectError;
pub use pipeline::Analyzer;
pub use ranker::{rank_mentions, BrandTally, Prominence, MAX_COMPETITORS, MAX_ORG_BRANDS};
pub use scorer::visibility_score;
pub use types::{AnalysisOutcome, BrandAnalysis, BrandMentions, FallbackReason, Mention};
