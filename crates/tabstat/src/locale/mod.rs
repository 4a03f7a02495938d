//! Locale collaborator: language tags and user-facing message lookup.
//!
//! The core never hard-codes display text. Every user-facing string
//! (warning templates, test names, yes/no labels) goes through a
//! [`Translator`], for which [`Messages`] is the built-in implementation
//! covering Brazilian Portuguese, US English and European Spanish.

mod messages;

pub use messages::Messages;

use serde::{Deserialize, Serialize};

/// Supported interface languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    PtBr,
    #[default]
    EnUs,
    EsEs,
}

impl Language {
    /// Normalize a language tag ("pt", "pt-BR", "en_us", ...) to a
    /// supported language, falling back to English.
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "pt" | "pt_br" => Language::PtBr,
            "es" | "es_es" => Language::EsEs,
            _ => Language::EnUs,
        }
    }

    /// Decimal separator used when formatting numbers for this language.
    pub fn decimal_separator(&self) -> char {
        match self {
            Language::PtBr | Language::EsEs => ',',
            Language::EnUs => '.',
        }
    }

    /// Thousands separator used when formatting numbers for this language.
    pub fn thousands_separator(&self) -> char {
        match self {
            Language::PtBr | Language::EsEs => '.',
            Language::EnUs => ',',
        }
    }
}

/// Keys for every user-facing message the core can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    // Variant pipeline warnings
    WarnSearchReplace,
    WarnCoercionReplaced,
    WarnCoercionDroppedRow,
    WarnTransformSkippedRow,
    WarnCutNoNumeric,
    WarnCutInvalidIntervals,
    WarnCutOutside,
    WarnMoreSuffix,
    // Statistical test names
    TestFisherExact,
    TestChiSquare,
    TestKruskalWallis,
    TestMannWhitney,
    TestTStudent,
    // Sentinel used when no stats provider is available
    CalculationUnavailable,
    // Table labels
    LabelGroup,
    LabelPValue,
    LabelVariable,
    LabelDescription,
    // Binary decomposition labels
    BinaryYes,
    BinaryNo,
    // Descriptive statistic row labels
    StatMin,
    StatMax,
    StatRange,
    StatMeanSd,
    StatMedianIqr,
    StatMode,
    StatN,
    StatMissing,
}

/// Capability for resolving user-facing strings.
///
/// Implementations must be thread-safe (Send + Sync) so a single
/// translator can be shared across pipelines and engines.
pub trait Translator: Send + Sync {
    /// Resolve `key` in `lang`, substituting `{name}` placeholders from `vars`.
    fn translate(&self, key: MessageKey, lang: Language, vars: &[(&str, String)]) -> String;
}

/// Substitute `{name}` placeholders in a template.
pub(crate) fn interpolate(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}
