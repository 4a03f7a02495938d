//! Bounded warning collection for pipeline stages.

use crate::locale::{Language, MessageKey, Translator};

/// Maximum number of concrete examples kept per problem class.
pub const MAX_WARNING_EXAMPLES: usize = 10;

/// Collects per-row problem examples for one class of issue, keeping at
/// most [`MAX_WARNING_EXAMPLES`] concrete examples while still counting
/// the total. The overflow is summarized as a single "+N more" line so
/// warning output stays bounded regardless of dataset size.
#[derive(Debug, Default)]
pub struct WarningCollector {
    examples: Vec<String>,
    total: usize,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one problem. The example text is only built while the
    /// collector is below capacity.
    pub fn record(&mut self, example: impl FnOnce() -> String) {
        self.total += 1;
        if self.examples.len() < MAX_WARNING_EXAMPLES {
            self.examples.push(example());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Problems beyond the kept examples.
    pub fn overflow(&self) -> usize {
        self.total - self.examples.len()
    }

    /// Emit one warning line per kept example (each rendered through
    /// `key` with a `{details}` placeholder), plus a single summary line
    /// when examples overflowed.
    pub fn emit_lines(
        &self,
        warnings: &mut Vec<String>,
        translator: &dyn Translator,
        lang: Language,
        key: MessageKey,
        extra_vars: &[(&str, String)],
    ) {
        for example in &self.examples {
            let mut vars: Vec<(&str, String)> = vec![("details", example.clone())];
            vars.extend_from_slice(extra_vars);
            warnings.push(translator.translate(key, lang, &vars));
        }
        if self.overflow() > 0 {
            warnings.push(translator.translate(
                MessageKey::WarnMoreSuffix,
                lang,
                &[("count", self.overflow().to_string())],
            ));
        }
    }

    /// Emit all kept examples joined into one warning line, with the
    /// overflow summary appended to the same line.
    pub fn emit_joined(
        &self,
        warnings: &mut Vec<String>,
        translator: &dyn Translator,
        lang: Language,
        key: MessageKey,
    ) {
        if self.is_empty() {
            return;
        }
        let mut details = self.examples.join(", ");
        if self.overflow() > 0 {
            details.push(' ');
            details.push_str(&translator.translate(
                MessageKey::WarnMoreSuffix,
                lang,
                &[("count", self.overflow().to_string())],
            ));
        }
        warnings.push(translator.translate(key, lang, &[("details", details)]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Messages;

    #[test]
    fn test_cap_and_overflow() {
        let mut collector = WarningCollector::new();
        for i in 0..25 {
            collector.record(|| format!("row {i}"));
        }
        assert_eq!(collector.total(), 25);
        assert_eq!(collector.overflow(), 15);

        let mut warnings = Vec::new();
        collector.emit_lines(
            &mut warnings,
            &Messages,
            Language::EnUs,
            MessageKey::WarnCoercionDroppedRow,
            &[],
        );
        assert_eq!(warnings.len(), MAX_WARNING_EXAMPLES + 1);
        assert!(warnings.last().unwrap().contains("15 more"));
    }

    #[test]
    fn test_joined_single_line() {
        let mut collector = WarningCollector::new();
        collector.record(|| "a->b".to_string());
        collector.record(|| "c->d".to_string());

        let mut warnings = Vec::new();
        collector.emit_joined(
            &mut warnings,
            &Messages,
            Language::EnUs,
            MessageKey::WarnSearchReplace,
        );
        assert_eq!(warnings, vec!["Search & replace: a->b, c->d"]);
    }

    #[test]
    fn test_empty_emits_nothing() {
        let collector = WarningCollector::new();
        let mut warnings = Vec::new();
        collector.emit_joined(
            &mut warnings,
            &Messages,
            Language::EnUs,
            MessageKey::WarnSearchReplace,
        );
        assert!(warnings.is_empty());
    }
}
