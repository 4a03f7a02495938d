//! Built-in message catalog for the three supported languages.

use super::{Language, MessageKey, Translator, interpolate};

/// Built-in [`Translator`] backed by a static message catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct Messages;

impl Messages {
    pub fn new() -> Self {
        Self
    }

    fn template(key: MessageKey, lang: Language) -> &'static str {
        use Language::*;
        use MessageKey::*;
        match (key, lang) {
            (WarnSearchReplace, PtBr) => "Buscar e substituir: {details}",
            (WarnSearchReplace, EnUs) => "Search & replace: {details}",
            (WarnSearchReplace, EsEs) => "Buscar y reemplazar: {details}",

            (WarnCoercionReplaced, PtBr) => "Conversão numérica: substituição {details}",
            (WarnCoercionReplaced, EnUs) => "Numeric coercion replacement: {details}",
            (WarnCoercionReplaced, EsEs) => "Conversión numérica: sustitución {details}",

            (WarnCoercionDroppedRow, PtBr) => "Conversão numérica: linha removida {details}",
            (WarnCoercionDroppedRow, EnUs) => "Numeric coercion removed row: {details}",
            (WarnCoercionDroppedRow, EsEs) => "Conversión numérica: fila eliminada {details}",

            (WarnTransformSkippedRow, PtBr) => "Transformação \"{fn}\" ignorou linha {details}",
            (WarnTransformSkippedRow, EnUs) => "Transform \"{fn}\" skipped row {details}",
            (WarnTransformSkippedRow, EsEs) => "Transformación \"{fn}\" omitió fila {details}",

            (WarnCutNoNumeric, PtBr) => "Classificação: nenhum valor numérico para agrupar.",
            (WarnCutNoNumeric, EnUs) => "Cut: no numeric values to bin.",
            (WarnCutNoNumeric, EsEs) => "Clasificación: sin valores numéricos para agrupar.",

            (WarnCutInvalidIntervals, PtBr) => {
                "Classificação: não foi possível gerar intervalos válidos."
            }
            (WarnCutInvalidIntervals, EnUs) => "Cut: unable to build valid intervals.",
            (WarnCutInvalidIntervals, EsEs) => {
                "Clasificación: no se pudieron generar intervalos válidos."
            }

            (WarnCutOutside, PtBr) => "Classificação: {count} valores fora dos intervalos definidos.",
            (WarnCutOutside, EnUs) => "Cut: {count} values outside defined breaks.",
            (WarnCutOutside, EsEs) => "Clasificación: {count} valores fuera de los intervalos definidos.",

            (WarnMoreSuffix, PtBr) => "(e mais {count})",
            (WarnMoreSuffix, EnUs) => "(and {count} more)",
            (WarnMoreSuffix, EsEs) => "(y {count} más)",

            (TestFisherExact, PtBr) => "Teste exato de Fisher",
            (TestFisherExact, EnUs) => "Fisher's exact test",
            (TestFisherExact, EsEs) => "Prueba exacta de Fisher",

            (TestChiSquare, PtBr) => "Qui-quadrado",
            (TestChiSquare, EnUs) => "Chi-square",
            (TestChiSquare, EsEs) => "Chi-cuadrado",

            (TestKruskalWallis, _) => "Kruskal–Wallis",
            (TestMannWhitney, _) => "Mann–Whitney",

            (TestTStudent, PtBr) => "t de Student",
            (TestTStudent, EnUs) => "Student's t-test",
            (TestTStudent, EsEs) => "t de Student",

            (CalculationUnavailable, PtBr) => "Erro no cálculo",
            (CalculationUnavailable, EnUs) => "Calculation unavailable",
            (CalculationUnavailable, EsEs) => "Error en el cálculo",

            (LabelGroup, PtBr) | (LabelGroup, EsEs) => "Grupo",
            (LabelGroup, EnUs) => "Group",

            (LabelPValue, PtBr) => "p-valor",
            (LabelPValue, EnUs) => "p-value",
            (LabelPValue, EsEs) => "Valor p",

            (LabelVariable, PtBr) => "Variável",
            (LabelVariable, EnUs) | (LabelVariable, EsEs) => "Variable",

            (LabelDescription, PtBr) => "Descrição",
            (LabelDescription, EnUs) => "Description",
            (LabelDescription, EsEs) => "Descripción",

            (BinaryYes, PtBr) => "Sim",
            (BinaryYes, EnUs) => "Yes",
            (BinaryYes, EsEs) => "Sí",
            (BinaryNo, PtBr) => "Não",
            (BinaryNo, EnUs) | (BinaryNo, EsEs) => "No",

            (StatMin, PtBr) | (StatMin, EsEs) => "Mínimo",
            (StatMin, EnUs) => "Minimum",
            (StatMax, PtBr) | (StatMax, EsEs) => "Máximo",
            (StatMax, EnUs) => "Maximum",
            (StatRange, PtBr) => "Amplitude",
            (StatRange, EnUs) => "Range",
            (StatRange, EsEs) => "Rango",
            (StatMeanSd, PtBr) => "Média (DP)",
            (StatMeanSd, EnUs) => "Mean (SD)",
            (StatMeanSd, EsEs) => "Media (DE)",
            (StatMedianIqr, PtBr) => "Mediana (IQR)",
            (StatMedianIqr, EnUs) => "Median (IQR)",
            (StatMedianIqr, EsEs) => "Mediana (RIC)",
            (StatMode, PtBr) | (StatMode, EsEs) => "Moda",
            (StatMode, EnUs) => "Mode",
            (StatN, _) => "n",
            (StatMissing, PtBr) | (StatMissing, EsEs) => "Valores ausentes",
            (StatMissing, EnUs) => "Missing values",
        }
    }
}

impl Translator for Messages {
    fn translate(&self, key: MessageKey, lang: Language, vars: &[(&str, String)]) -> String {
        interpolate(Self::template(key, lang), vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_with_vars() {
        let msg = Messages.translate(
            MessageKey::WarnCutOutside,
            Language::EnUs,
            &[("count", "3".into())],
        );
        assert_eq!(msg, "Cut: 3 values outside defined breaks.");
    }

    #[test]
    fn test_translate_per_language() {
        assert_eq!(
            Messages.translate(MessageKey::TestChiSquare, Language::PtBr, &[]),
            "Qui-quadrado"
        );
        assert_eq!(
            Messages.translate(MessageKey::BinaryYes, Language::EsEs, &[]),
            "Sí"
        );
    }
}
