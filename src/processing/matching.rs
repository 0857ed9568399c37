use log::debug;

use crate::models::MatchPolicy;
use crate::processing::normalizer::normalize;

/// Decides whether an OCR-extracted name and the profile's declared name
/// belong to the same person. Exact equality after normalization wins
/// immediately; otherwise words are matched one-to-one with containment and
/// a small edit-distance tolerance, because OCR on printed ID text routinely
/// garbles a character or two per word.
pub fn compare_names(extracted: &str, profile_name: &str, policy: &MatchPolicy) -> bool {
    let a = normalize(extracted);
    let b = normalize(profile_name);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }

    let a_words: Vec<&str> = a.split(' ').filter(|w| w.len() > 1).collect();
    let b_words: Vec<&str> = b.split(' ').filter(|w| w.len() > 1).collect();
    if a_words.is_empty() || b_words.is_empty() {
        return false;
    }

    // One-to-one greedy matching: each profile word satisfies at most one
    // extracted word, otherwise short-word containment double-counts.
    let mut used = vec![false; b_words.len()];
    let mut matched = 0usize;
    for word in &a_words {
        let hit = b_words
            .iter()
            .enumerate()
            .position(|(j, other)| !used[j] && words_match(word, other, policy.max_word_edit_distance));
        if let Some(j) = hit {
            used[j] = true;
            matched += 1;
        }
    }

    let ratio = matched as f32 / a_words.len().max(b_words.len()) as f32;
    debug!("name match ratio {ratio:.2} ({matched} of {} / {} words)", a_words.len(), b_words.len());
    ratio >= policy.min_match_ratio
}

fn words_match(a: &str, b: &str, max_edits: usize) -> bool {
    a == b || a.contains(b) || b.contains(a) || levenshtein(a, b) <= max_edits
}

/// Minimum single-character edits between two words, by the usual dynamic
/// programming matrix.
pub fn levenshtein(s1: &str, s2: &str) -> usize {
    if s1 == s2 {
        return 0;
    }

    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();
    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix = vec![vec![0usize; len2 + 1]; len1 + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = usize::from(s1_chars[i - 1] != s2_chars[j - 1]);
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[len1][len2]
}
