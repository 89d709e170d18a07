//! Heuristic mapping of spreadsheet headers onto record fields.
//!
//! Headers and field names are normalized (case-folded, diacritics folded,
//! punctuation and spaces dropped) and matched in three passes over all
//! headers: exact match, then substring match, then character-bigram
//! similarity above a threshold. Each field is taken at most once. The
//! result is a suggestion for an operator to review, so misses are expected.

use betbalance_core::{ImportConfig, Record};
use serde::{Deserialize, Serialize};

/// Shortest normalized name allowed to take part in a substring match.
const MIN_SUBSTRING_LEN: usize = 3;

/// A source header and the field it was mapped to, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source: String,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnMapper {
    threshold: f64,
}

impl Default for ColumnMapper {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl ColumnMapper {
    pub const DEFAULT_THRESHOLD: f64 = 0.6;

    /// Creates a mapper accepting fuzzy matches with similarity at or above `threshold`.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(config.similarity_threshold)
    }

    /// Maps each source header to at most one target field, in header order.
    pub fn detect<S, T>(&self, source_headers: &[S], target_fields: &[T]) -> Vec<ColumnMapping>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let headers: Vec<String> = source_headers.iter().map(|h| normalize(h.as_ref())).collect();
        let targets: Vec<String> = target_fields.iter().map(|t| normalize(t.as_ref())).collect();

        let mut assigned: Vec<Option<usize>> = vec![None; headers.len()];
        let mut taken = vec![false; targets.len()];

        // Exact matches first so a looser match never steals an exact one.
        for (h, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            if let Some(t) = (0..targets.len()).find(|&t| !taken[t] && targets[t] == *header) {
                assigned[h] = Some(t);
                taken[t] = true;
            }
        }

        for (h, header) in headers.iter().enumerate() {
            if header.is_empty() || assigned[h].is_some() {
                continue;
            }
            if let Some(t) = (0..targets.len()).find(|&t| !taken[t] && is_substring_match(header, &targets[t])) {
                assigned[h] = Some(t);
                taken[t] = true;
            }
        }

        for (h, header) in headers.iter().enumerate() {
            if header.is_empty() || assigned[h].is_some() {
                continue;
            }
            let mut best: Option<(usize, f64)> = None;
            for (t, target) in targets.iter().enumerate() {
                if taken[t] {
                    continue;
                }
                let score = similarity(header, target);
                if score >= self.threshold && best.map_or(true, |(_, s)| score > s) {
                    best = Some((t, score));
                }
            }
            if let Some((t, _)) = best {
                assigned[h] = Some(t);
                taken[t] = true;
            }
        }

        let mappings: Vec<ColumnMapping> = source_headers
            .iter()
            .zip(assigned)
            .map(|(source, target)| ColumnMapping {
                source: source.as_ref().to_string(),
                target: target.map(|t| target_fields[t].as_ref().to_string()),
            })
            .collect();

        tracing::debug!(
            "Mapped {} of {} headers onto {} fields",
            mappings.iter().filter(|m| m.target.is_some()).count(),
            mappings.len(),
            target_fields.len()
        );
        mappings
    }
}

/// Maps headers onto fields with the default similarity threshold.
pub fn auto_detect_column_mapping<S, T>(source_headers: &[S], target_fields: &[T]) -> Vec<ColumnMapping>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    ColumnMapper::default().detect(source_headers, target_fields)
}

/// Renames the fields of a raw row according to `mappings`, dropping unmapped columns.
#[must_use]
pub fn remap(mappings: &[ColumnMapping], row: &Record) -> Record {
    mappings
        .iter()
        .filter_map(|m| {
            let target = m.target.as_ref()?;
            let value = row.get(&m.source)?;
            Some((target.clone(), value.clone()))
        })
        .collect()
}

/// Case-folds, folds Latin diacritics and keeps only ASCII letters and digits.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(fold_diacritic)
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

fn is_substring_match(a: &str, b: &str) -> bool {
    a.len().min(b.len()) >= MIN_SUBSTRING_LEN && (a.contains(b) || b.contains(a))
}

/// Sørensen-Dice coefficient over character bigrams (0.0 - 1.0).
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a_grams = bigrams(a);
    let mut b_grams = bigrams(b);
    if a_grams.is_empty() || b_grams.is_empty() {
        return 0.0;
    }

    let total = a_grams.len() + b_grams.len();
    let mut common = 0usize;
    for gram in &a_grams {
        if let Some(pos) = b_grams.iter().position(|g| g == gram) {
            b_grams.swap_remove(pos);
            common += 1;
        }
    }

    (2 * common) as f64 / total as f64
}

fn bigrams(s: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn targets(mappings: &[ColumnMapping]) -> Vec<Option<&str>> {
        mappings.iter().map(|m| m.target.as_deref()).collect()
    }

    #[test]
    fn normalize_folds_case_accents_and_punctuation() {
        assert_eq!(normalize("  Resultado Líquido (R$) "), "resultadoliquidor");
        assert_eq!(normalize("Observação"), "observacao");
        assert_eq!(normalize("house_name"), "housename");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn exact_matches_ignore_formatting() {
        let mappings = auto_detect_column_mapping(&["Result Value", "DATE"], &["date", "result_value"]);
        assert_eq!(targets(&mappings), vec![Some("result_value"), Some("date")]);
    }

    #[test]
    fn substring_and_fuzzy_matches() {
        let headers = ["Data", "Valor (R$)", "Resultado Líquido", "Observação"];
        let fields = ["date", "stake", "resultado", "observacao"];
        let mappings = auto_detect_column_mapping(&headers, &fields);

        assert_eq!(
            targets(&mappings),
            vec![Some("date"), None, Some("resultado"), Some("observacao")]
        );
        assert_eq!(mappings[1].source, "Valor (R$)");
    }

    #[test]
    fn exact_match_wins_over_earlier_substring() {
        let mappings = auto_detect_column_mapping(&["Stake Amount", "Stake"], &["stake"]);
        assert_eq!(targets(&mappings), vec![None, Some("stake")]);
    }

    #[test]
    fn ties_go_to_earliest_target() {
        let mappings = auto_detect_column_mapping(&["stake"], &["stake_amount", "stake_value"]);
        assert_eq!(targets(&mappings), vec![Some("stake_amount")]);
    }

    #[test]
    fn targets_are_used_once() {
        let mappings = auto_detect_column_mapping(&["Stake", "stake"], &["stake"]);
        assert_eq!(targets(&mappings), vec![Some("stake"), None]);
    }

    #[test]
    fn short_names_do_not_substring_match() {
        let mappings = auto_detect_column_mapping(&["id"], &["valid_until"]);
        assert_eq!(targets(&mappings), vec![None]);
    }

    #[test]
    fn threshold_controls_fuzzy_matches() {
        let strict = ColumnMapper::new(0.9).detect(&["data"], &["date"]);
        assert_eq!(targets(&strict), vec![None]);

        let loose = ColumnMapper::new(0.5).detect(&["data"], &["date"]);
        assert_eq!(targets(&loose), vec![Some("date")]);
    }

    #[test]
    fn blank_header_is_unmapped() {
        let mappings = auto_detect_column_mapping(&["", "date"], &["date"]);
        assert_eq!(targets(&mappings), vec![None, Some("date")]);
    }

    #[test]
    fn similarity_bounds() {
        assert!((similarity("night", "night") - 1.0).abs() < f64::EPSILON);
        assert!((similarity("ab", "cd") - 0.0).abs() < f64::EPSILON);
        assert!((similarity("night", "nacht") - 0.25).abs() < 1e-9);
        assert!((similarity("a", "b") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn remap_renames_and_drops() {
        let mappings = vec![
            ColumnMapping {
                source: "Data".to_string(),
                target: Some("date".to_string()),
            },
            ColumnMapping {
                source: "Obs".to_string(),
                target: None,
            },
        ];
        let row = Record::from_json(json!({"Data": "01/02/2024", "Obs": "x"})).unwrap();
        let mapped = remap(&mappings, &row);

        assert_eq!(mapped.get("date"), Some(&json!("01/02/2024")));
        assert_eq!(mapped.len(), 1);
    }
}
