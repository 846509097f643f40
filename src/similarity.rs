//! Ratcliff/Obershelp string similarity.
//!
//! The ratio is computed from the matching blocks of two character sequences: the
//! longest contiguous common substring is located, then the unmatched regions on
//! its left and on its right are searched the same way until nothing is left.
//! With `M` the total length of all blocks,
//!
//! ```text
//! ratio = 2 * M / (len(a) + len(b))
//! ```
//!
//! Among several longest matches the one starting earliest in `a` wins, then the
//! one starting earliest in `b`. Because that tie-break depends on argument order,
//! [`similarity`] orders its arguments before matching so the ratio is symmetric.

use crate::normalize::{normalize_author, normalize_title};

/// A run of `size` equal characters at `a[a..a + size]` and `b[b..b + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

/// Similarity ratio in `[0, 1]` of two strings, compared character by character.
///
/// Returns `0.0` when either input is empty. Callers decide whether to normalize
/// first.
///
/// # Examples
///
/// ```
/// use citemerge::similarity::similarity;
///
/// assert_eq!(similarity("deep learning", "deep learning"), 1.0);
/// assert_eq!(similarity("", "deep learning"), 0.0);
/// assert_eq!(similarity("tide", "diet"), similarity("diet", "tide"));
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let first: Vec<char> = first.chars().collect();
    let second: Vec<char> = second.chars().collect();

    let matched: usize = matching_blocks(&first, &second)
        .iter()
        .map(|block| block.size)
        .sum();

    2.0 * matched as f64 / (first.len() + second.len()) as f64
}

/// Returns the matching blocks of `a` and `b`, ordered by their position in `a`.
///
/// Adjacent blocks are not coalesced.
pub fn matching_blocks<T: PartialEq>(a: &[T], b: &[T]) -> Vec<MatchingBlock> {
    let mut blocks = Vec::new();
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let block = longest_match(a, b, alo, ahi, blo, bhi);
        if block.size == 0 {
            continue;
        }
        if alo < block.a && blo < block.b {
            pending.push((alo, block.a, blo, block.b));
        }
        if block.a + block.size < ahi && block.b + block.size < bhi {
            pending.push((block.a + block.size, ahi, block.b + block.size, bhi));
        }
        blocks.push(block);
    }

    blocks.sort_by_key(|block| (block.a, block.b));
    blocks
}

/// Longest common run of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// `prev[j - blo + 1]` holds the length of the run ending at `(i - 1, j)`.
fn longest_match<T: PartialEq>(
    a: &[T],
    b: &[T],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> MatchingBlock {
    let mut best = MatchingBlock {
        a: alo,
        b: blo,
        size: 0,
    };
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let run = if a[i] == b[j] { prev[j - blo] + 1 } else { 0 };
            curr[j - blo + 1] = run;
            if run > best.size {
                best = MatchingBlock {
                    a: i + 1 - run,
                    b: j + 1 - run,
                    size: run,
                };
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}

/// Whether two titles are the same title modulo punctuation and case.
///
/// True when the normalized titles are equal, or when their similarity is at
/// least `threshold`.
pub fn identical_titles(title1: &str, title2: &str, threshold: f64) -> bool {
    let norm1 = normalize_title(title1);
    let norm2 = normalize_title(title2);
    norm1 == norm2 || similarity(&norm1, &norm2) >= threshold
}

/// Similarity of the first authors of two author lists.
///
/// Names are lowercased and trimmed before comparison. `None` when either list is
/// empty.
pub fn first_author_similarity(authors1: &[String], authors2: &[String]) -> Option<f64> {
    let first1 = authors1.first()?;
    let first2 = authors2.first()?;
    Some(similarity(
        &normalize_author(first1),
        &normalize_author(first2),
    ))
}

/// The first-author gate: true when the first authors are more similar than
/// `threshold`. Lists without authors never match.
pub fn authors_match(authors1: &[String], authors2: &[String], threshold: f64) -> bool {
    first_author_similarity(authors1, authors2).is_some_and(|s| s > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn authors(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case("a")]
    #[case("deep learning for x")]
    #[case("study of proteins")]
    #[case("  ")]
    #[case("über käse")]
    fn test_similarity_reflexive(#[case] s: &str) {
        assert_eq!(similarity(s, s), 1.0);
    }

    #[rstest]
    #[case("tide", "diet")]
    #[case("abcd", "bcda")]
    #[case("jane smith", "j. smith")]
    #[case("study of proteins", "a study of proteins")]
    #[case("graph neural networks", "networks of graphs")]
    #[case("x", "")]
    fn test_similarity_symmetric(#[case] a: &str, #[case] b: &str) {
        assert_eq!(similarity(a, b), similarity(b, a));
    }

    #[rstest]
    #[case("", "", 0.0)]
    #[case("abc", "", 0.0)]
    #[case("", "abc", 0.0)]
    #[case("abc", "xyz", 0.0)]
    #[case("tide", "diet", 0.5)]
    #[case("abcd", "bcda", 0.75)]
    #[case("jane smith", "j. smith", 14.0 / 18.0)]
    #[case("study of proteins", "a study of proteins", 34.0 / 36.0)]
    #[case(
        "learning to rank with partial feedback",
        "learning to rank with partial feedback now",
        0.95
    )]
    fn test_similarity_known_ratios(#[case] a: &str, #[case] b: &str, #[case] expected: f64) {
        assert!(
            (similarity(a, b) - expected).abs() < 1e-12,
            "similarity({a:?}, {b:?}) = {} (expected {expected})",
            similarity(a, b)
        );
    }

    #[test]
    fn test_similarity_exact_boundary_value() {
        // 2 * 38 / 80 must land exactly on the literal, not a neighbour of it.
        assert_eq!(
            similarity(
                "learning to rank with partial feedback",
                "learning to rank with partial feedback now"
            ),
            0.95
        );
    }

    #[test]
    fn test_similarity_in_unit_interval() {
        let titles = [
            "a survey of transformers",
            "transformers a survey",
            "attention is all you need",
            "x",
        ];
        for a in titles {
            for b in titles {
                let s = similarity(a, b);
                assert!((0.0..=1.0).contains(&s), "{a:?} vs {b:?} gave {s}");
            }
        }
    }

    #[test]
    fn test_matching_blocks() {
        let blocks = matching_blocks(&chars("jane smith"), &chars("j. smith"));
        assert_eq!(
            blocks,
            vec![
                MatchingBlock { a: 0, b: 0, size: 1 },
                MatchingBlock { a: 4, b: 2, size: 6 },
            ]
        );
    }

    #[test]
    fn test_matching_blocks_prefers_earliest_longest() {
        // "ab" occurs twice in b; the first occurrence is chosen.
        let blocks = matching_blocks(&chars("ab"), &chars("abab"));
        assert_eq!(blocks, vec![MatchingBlock { a: 0, b: 0, size: 2 }]);
    }

    #[test]
    fn test_matching_blocks_empty() {
        assert!(matching_blocks(&chars(""), &chars("abc")).is_empty());
        assert!(matching_blocks(&chars("abc"), &chars("xyz")).is_empty());
    }

    #[rstest]
    #[case("Deep Learning for X", "Deep learning for X.", true)]
    #[case("Study of Proteins", "A Study of Proteins!", false)]
    #[case("The Protein Folding Problem", "The protein-folding problem", false)]
    #[case("", "", true)]
    fn test_identical_titles(#[case] a: &str, #[case] b: &str, #[case] expected: bool) {
        assert_eq!(identical_titles(a, b, 0.99), expected);
    }

    #[test]
    fn test_identical_titles_near_equal_long_titles() {
        let a = "A comprehensive evaluation of graph neural networks for molecular property prediction on large benchmark suites";
        let b = "A comprehensive evaluation of graph neural networks for molecular property prediction on large benchmark suite";
        assert!(identical_titles(a, b, 0.99));
        assert!(!identical_titles(a, b, 1.0));
    }

    #[test]
    fn test_first_author_similarity() {
        assert_eq!(
            first_author_similarity(&authors(&["Jane Smith"]), &authors(&[" jane smith "])),
            Some(1.0)
        );
        assert_eq!(
            first_author_similarity(&authors(&[]), &authors(&["Jane Smith"])),
            None
        );
    }

    #[rstest]
    #[case(&["Jane Smith", "Bob Jones"], &["JANE SMITH"], true)]
    #[case(&["Jane Smith"], &["J. Smith"], false)]
    #[case(&["Jane Smith"], &["Bob Jones", "Jane Smith"], false)]
    #[case(&[], &["Jane Smith"], false)]
    #[case(&[], &[], false)]
    fn test_authors_match(#[case] a: &[&str], #[case] b: &[&str], #[case] expected: bool) {
        assert_eq!(authors_match(&authors(a), &authors(b), 0.9), expected);
    }
}
