//! Association analysis between two dataset columns.
//!
//! The engine builds a contingency table (qualitative predictor versus
//! qualitative response) or a grouped numeric summary (numeric response
//! by qualitative group), then selects and runs the appropriate test
//! through an injected [`StatsProvider`]. [`StatrsProvider`] is the
//! built-in implementation; a missing or failing provider degrades to
//! an "unavailable" result instead of erroring.

mod contingency;
mod engine;
mod mock;
mod numeric;
mod provider;
mod statrs_provider;

pub use contingency::{
    adjusted_residuals, fisher_exact_2x2, CellContext, CellFormatter, Crosstab, CrosstabOptions,
    CrosstabRow, PercentBy,
};
pub use engine::{
    AssociationEngine, Assumptions, GroupCompareOptions, GroupComparison, NumericSummary,
    SummaryRow,
};
pub use mock::MockProvider;
pub use numeric::{
    dunn_test, mann_whitney, numeric_stats, stack_groups, tukey_hsd, NumericStats, RankTest,
    StatOption,
};
pub use provider::{PairwiseComparison, PostHocAdjust, StatsProvider, TestOutcome};
pub use statrs_provider::StatrsProvider;
