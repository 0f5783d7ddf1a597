//! Whole-word, case-insensitive brand term matching.

use std::borrow::Cow;
use std::collections::HashSet;

use aivis_core::BrandCatalogEntry;
use regex::Regex;
use unicode_normalization::{is_nfkc, UnicodeNormalization};

use crate::error::DetectError;
use crate::types::BrandMentions;

/// Terms with fewer characters than this never match.
pub const MIN_TERM_CHARS: usize = 2;

/// Compiled matchers for every brand of one catalog.
#[derive(Debug)]
pub struct MentionDetector {
    brands: Vec<BrandMatcher>,
}

#[derive(Debug)]
struct BrandMatcher {
    name: String,
    is_org_brand: bool,
    patterns: Vec<Regex>,
}

impl MentionDetector {
    /// Compile matchers for every brand term in `catalog`.
    ///
    /// Terms shorter than [`MIN_TERM_CHARS`] and case-insensitive duplicates
    /// within one brand are dropped. A brand left with no usable terms is kept
    /// and simply never matches.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Pattern`] if a term cannot be compiled.
    pub fn new(catalog: &[BrandCatalogEntry]) -> Result<Self, DetectError> {
        let brands = catalog
            .iter()
            .map(|entry| {
                let mut seen = HashSet::new();
                let mut patterns = Vec::new();
                for term in entry.term().terms() {
                    let normalized = normalize(term.trim());
                    if normalized.chars().count() < MIN_TERM_CHARS {
                        tracing::debug!(brand = %entry.name, term, "skipping short brand term");
                        continue;
                    }
                    if !seen.insert(term_key(&normalized)) {
                        continue;
                    }
                    patterns.push(compile_term(&normalized)?);
                }
                Ok(BrandMatcher {
                    name: entry.name.clone(),
                    is_org_brand: entry.is_org_brand,
                    patterns,
                })
            })
            .collect::<Result<Vec<_>, DetectError>>()?;

        Ok(Self { brands })
    }

    /// Find every whole-word occurrence of every brand in `text`.
    ///
    /// Returns one entry per catalog brand, in catalog order. Offsets are
    /// character positions in the NFKC form of `text`.
    #[must_use]
    pub fn detect(&self, text: &str) -> Vec<BrandMentions> {
        let text = normalize(text);

        self.brands
            .iter()
            .map(|brand| {
                let mut byte_offsets = Vec::new();
                for pattern in &brand.patterns {
                    find_term_offsets(pattern, &text, &mut byte_offsets);
                }
                byte_offsets.sort_unstable();
                byte_offsets.dedup();

                BrandMentions {
                    name: brand.name.clone(),
                    is_org_brand: brand.is_org_brand,
                    offsets: to_char_offsets(&text, &byte_offsets),
                }
            })
            .collect()
    }
}

/// Compile `catalog` and scan `text` in one step.
///
/// # Errors
///
/// Returns [`DetectError::Pattern`] if a term cannot be compiled.
pub fn detect_mentions(
    text: &str,
    catalog: &[BrandCatalogEntry],
) -> Result<Vec<BrandMentions>, DetectError> {
    Ok(MentionDetector::new(catalog)?.detect(text))
}

/// Key under which two brand terms count as the same term: trimmed, NFKC
/// form, lowercased. Matches the equivalence the compiled patterns apply.
pub(crate) fn term_key(term: &str) -> String {
    normalize(term.trim()).to_lowercase()
}

fn normalize(text: &str) -> Cow<'_, str> {
    if is_nfkc(text) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.nfkc().collect())
    }
}

fn compile_term(term: &str) -> Result<Regex, DetectError> {
    Regex::new(&format!("(?i){}", regex::escape(term))).map_err(|source| DetectError::Pattern {
        term: term.to_string(),
        source,
    })
}

/// Push the byte offset of every boundary-delimited match of `pattern`.
///
/// A rejected candidate resumes the scan one character after its start, so a
/// valid match overlapping it is still found. The scan always moves forward by
/// at least one character.
fn find_term_offsets(pattern: &Regex, text: &str, out: &mut Vec<usize>) {
    let mut from = 0;
    while from <= text.len() {
        let Some(m) = pattern.find_at(text, from) else {
            break;
        };

        let accepted = !m.is_empty() && is_whole_word(text, m.start(), m.end());
        if accepted {
            out.push(m.start());
        }

        from = if accepted {
            m.end()
        } else {
            m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8)
        };
    }
}

/// True when neither neighbour of `text[start..end]` is alphanumeric.
fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Convert ascending byte offsets into character offsets in a single pass.
fn to_char_offsets(text: &str, byte_offsets: &[usize]) -> Vec<usize> {
    let mut result = Vec::with_capacity(byte_offsets.len());
    let mut chars = 0;
    let mut last_byte = 0;
    for &byte in byte_offsets {
        chars += text[last_byte..byte].chars().count();
        last_byte = byte;
        result.push(chars);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets_for(text: &str, entry: BrandCatalogEntry) -> Vec<usize> {
        let mentions = detect_mentions(text, &[entry]).expect("detect");
        mentions.into_iter().next().expect("one brand").offsets
    }

    #[test]
    fn matches_whole_words_only() {
        assert!(offsets_for("ACRMsystem", BrandCatalogEntry::competitor("CRM")).is_empty());
        assert!(offsets_for("ACRMx and more", BrandCatalogEntry::competitor("CRM")).is_empty());
        assert_eq!(
            offsets_for("Our CRM system", BrandCatalogEntry::competitor("CRM")),
            vec![4]
        );
    }

    #[test]
    fn matches_at_start_and_end_of_text() {
        assert_eq!(offsets_for("Acme", BrandCatalogEntry::org_brand("Acme")), vec![0]);
        assert_eq!(
            offsets_for("we like Acme", BrandCatalogEntry::org_brand("Acme")),
            vec![8]
        );
    }

    #[test]
    fn punctuation_counts_as_boundary() {
        assert_eq!(
            offsets_for("(Acme), Acme! Acme's", BrandCatalogEntry::org_brand("Acme")),
            vec![1, 8, 14]
        );
    }

    #[test]
    fn underscore_is_a_boundary_but_digits_are_not() {
        assert_eq!(offsets_for("_Acme_", BrandCatalogEntry::org_brand("Acme")), vec![1]);
        assert!(offsets_for("Acme2", BrandCatalogEntry::org_brand("Acme")).is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let entry = BrandCatalogEntry::competitor("OpenAI");
        assert_eq!(offsets_for("try openai today", entry.clone()), vec![4]);
        assert_eq!(offsets_for("OPENAI rocks", entry), vec![0]);
    }

    #[test]
    fn metacharacters_match_literally() {
        let entry = BrandCatalogEntry::competitor("Monday.com");
        assert_eq!(offsets_for("Use Monday.com for tasks", entry.clone()), vec![4]);
        assert!(offsets_for("Use Mondayxcom for tasks", entry).is_empty());

        let entry = BrandCatalogEntry::competitor("C++ (Pro) [v2] {x} a|b ^$ \\ ?*");
        assert_eq!(
            offsets_for("see C++ (Pro) [v2] {x} a|b ^$ \\ ?* now", entry),
            vec![4]
        );
    }

    #[test]
    fn short_terms_never_match() {
        assert!(offsets_for("X marks the spot", BrandCatalogEntry::competitor("X")).is_empty());
        assert!(offsets_for("   ", BrandCatalogEntry::competitor(" ")).is_empty());
        assert!(offsets_for("anything", BrandCatalogEntry::competitor("")).is_empty());
    }

    #[test]
    fn short_variants_are_skipped_but_long_ones_match() {
        let entry = BrandCatalogEntry::org_brand("Acme").with_variants(["A", "Acme Corp"]);
        assert_eq!(offsets_for("A deal from Acme Corp", entry), vec![12]);
    }

    #[test]
    fn finds_every_occurrence() {
        assert_eq!(
            offsets_for("Acme, then Acme, then acme.", BrandCatalogEntry::org_brand("Acme")),
            vec![0, 11, 22]
        );
    }

    #[test]
    fn rejected_candidate_does_not_hide_a_later_overlapping_match() {
        // "aa" at 0 and 1 touch another "a"; the only valid match starts at 4.
        assert_eq!(
            offsets_for("aaa aa", BrandCatalogEntry::competitor("aa")),
            vec![4]
        );
    }

    #[test]
    fn variants_merge_into_one_sorted_offset_list() {
        let entry = BrandCatalogEntry::org_brand("Acme").with_variants(["ACME Inc", "Acme"]);
        assert_eq!(offsets_for("ACME Inc beats Acme", entry), vec![0, 15]);
    }

    #[test]
    fn offsets_are_character_positions() {
        assert_eq!(
            offsets_for("Crème brûlée by Acme", BrandCatalogEntry::org_brand("Acme")),
            vec![16]
        );
    }

    #[test]
    fn accented_letters_are_word_characters() {
        assert!(offsets_for("éAcme", BrandCatalogEntry::org_brand("Acme")).is_empty());
    }

    #[test]
    fn nfkc_normalizes_text_and_terms() {
        // Fullwidth letters and the "ﬁ" ligature fold to their ASCII forms.
        assert_eq!(
            offsets_for("ＡＣＭＥ rules", BrandCatalogEntry::org_brand("Acme")),
            vec![0]
        );
        assert_eq!(
            offsets_for("Try Fiber now", BrandCatalogEntry::competitor("\u{FB01}ber")),
            vec![4]
        );
    }

    #[test]
    fn empty_text_has_no_mentions() {
        assert!(offsets_for("", BrandCatalogEntry::org_brand("Acme")).is_empty());
    }

    #[test]
    fn results_follow_catalog_order() {
        let catalog = vec![
            BrandCatalogEntry::competitor("Globex"),
            BrandCatalogEntry::org_brand("Acme"),
        ];
        let mentions = detect_mentions("Acme and Globex", &catalog).expect("detect");
        assert_eq!(mentions[0].name, "Globex");
        assert_eq!(mentions[0].offsets, vec![9]);
        assert_eq!(mentions[1].name, "Acme");
        assert!(mentions[1].is_org_brand);
    }

    #[test]
    fn term_key_folds_width_and_unicode_case() {
        assert_eq!(term_key(" \u{FF21}cme "), term_key("acme"));
        assert_eq!(term_key("CAFÉ"), term_key("Café"));
        assert_ne!(term_key("Acme"), term_key("Acme Corp"));
    }

    #[test]
    fn to_char_offsets_counts_multibyte_characters() {
        let text = "ééAcme Acme";
        let first = text.find("Acme").expect("present");
        let second = text.rfind("Acme").expect("present");
        assert_eq!(to_char_offsets(text, &[first, second]), vec![2, 7]);
    }
}
