//! Fuzzy subsequence scoring.
//!
//! Lower scores are better. Consecutive matches and matches at word starts or camel-case humps
//! pull the score down; gaps between matched characters and late matches push it up.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatch {
    pub matches: bool,
    pub score: f64,
}

impl FuzzyMatch {
    const MISS: Self = Self {
        matches: false,
        score: 0.0,
    };
}

fn fold(ch: char, case_sensitive: bool) -> char {
    if case_sensitive {
        ch
    } else {
        ch.to_lowercase().next().unwrap_or(ch)
    }
}

fn is_word_boundary(prev: Option<char>, ch: char) -> bool {
    match prev {
        None => true,
        Some(prev) => {
            prev.is_whitespace()
                || matches!(prev, '-' | '_' | '.' | '/' | ':')
                || (prev.is_lowercase() && ch.is_uppercase())
        }
    }
}

fn scan(
    query: &str,
    text: &str,
    case_sensitive: bool,
    mut positions: Option<&mut Vec<usize>>,
) -> FuzzyMatch {
    let query_chars: Vec<char> = query.chars().map(|ch| fold(ch, case_sensitive)).collect();
    if query_chars.is_empty() {
        return FuzzyMatch {
            matches: true,
            score: 0.0,
        };
    }

    let mut query_index = 0usize;
    let mut score = 0.0f64;
    let mut last_match_index: Option<usize> = None;
    let mut consecutive_matches = 0i32;
    let mut prev: Option<char> = None;

    for (i, (offset, ch)) in text.char_indices().enumerate() {
        if query_index >= query_chars.len() {
            break;
        }
        if fold(ch, case_sensitive) == query_chars[query_index] {
            match last_match_index {
                Some(last) if last + 1 == i => {
                    consecutive_matches += 1;
                    score -= f64::from(consecutive_matches) * 5.0;
                }
                Some(last) => {
                    consecutive_matches = 0;
                    score += ((i - last - 1) as f64) * 2.0;
                }
                None => consecutive_matches = 0,
            }

            if is_word_boundary(prev, ch) {
                score -= 10.0;
            }
            score += (i as f64) * 0.1;

            if let Some(positions) = positions.as_deref_mut() {
                positions.push(offset);
            }
            last_match_index = Some(i);
            query_index += 1;
        }
        prev = Some(ch);
    }

    if query_index < query_chars.len() {
        return FuzzyMatch::MISS;
    }

    FuzzyMatch {
        matches: true,
        score,
    }
}

pub fn fuzzy_match(query: &str, text: &str, case_sensitive: bool) -> FuzzyMatch {
    scan(query, text, case_sensitive, None)
}

/// Byte offsets in `text` of the characters matched by `query`, or `None` when it does not
/// match.
pub fn fuzzy_positions(query: &str, text: &str, case_sensitive: bool) -> Option<Vec<usize>> {
    let mut positions = Vec::with_capacity(query.len());
    let matched = scan(query, text, case_sensitive, Some(&mut positions));
    matched.matches.then_some(positions)
}

#[cfg(test)]
mod tests {
    use super::{fuzzy_match, fuzzy_positions};

    #[test]
    fn fuzzy_match_prefers_consecutive_matches() {
        let direct = fuzzy_match("abc", "abc", false);
        let spaced = fuzzy_match("abc", "axxbxxc", false);
        assert!(direct.matches);
        assert!(spaced.matches);
        assert!(direct.score < spaced.score);
    }

    #[test]
    fn fuzzy_match_requires_ordered_subsequence() {
        assert!(!fuzzy_match("ba", "abc", false).matches);
        assert!(!fuzzy_match("abcd", "abc", false).matches);
        assert!(fuzzy_match("", "abc", false).matches);
    }

    #[test]
    fn word_starts_and_camel_humps_score_better() {
        let hump = fuzzy_match("fb", "fooBar", false);
        let buried = fuzzy_match("fb", "foobar", false);
        assert!(hump.score < buried.score);

        let word = fuzzy_match("b", "foo bar", false);
        let inner = fuzzy_match("b", "foobar", false);
        assert!(word.score < inner.score);
    }

    #[test]
    fn case_sensitivity_is_respected() {
        assert!(fuzzy_match("FB", "foobar", false).matches);
        assert!(!fuzzy_match("FB", "foobar", true).matches);
    }

    #[test]
    fn positions_are_byte_offsets() {
        assert_eq!(fuzzy_positions("ér", "héllo rust", false), Some(vec![1, 7]));
        assert_eq!(fuzzy_positions("zz", "héllo", false), None);
    }
}
