use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::models::{rules_for, DocumentKind, KindRules, CLASSIFICATION_ORDER};
use crate::processing::normalizer::normalize;

// Field captions that terminate a name run on the printed card. Dates are
// covered separately by the digit terminator.
const STOP_LABELS: &str = "NGAY SINH|DATE OF BIRTH|QUOC TICH|NATIONALITY|GIOI TINH|SEX";

// Residual vocabulary a greedy capture can drag in around the name itself.
const LEADING_LABELS: &[&str] = &["HO VA TEN", "HO TEN", "FULL NAME", "NAME"];
const TRAILING_LABELS: &[&str] = &["NGAY SINH", "DATE OF BIRTH", "NGAY"];

lazy_static! {
    static ref NAME_PATTERNS: HashMap<DocumentKind, Vec<Regex>> = {
        let mut map = HashMap::new();
        for kind in CLASSIFICATION_ORDER {
            if let Some(rules) = rules_for(kind) {
                let compiled = rules
                    .name_anchors
                    .iter()
                    .filter_map(|anchor| {
                        Regex::new(&format!(
                            r"{anchor}\s+([A-Z][A-Z ]*?)(?:\s+(?:{STOP_LABELS})|\s+\d|$)"
                        ))
                        .ok()
                    })
                    .collect();
                map.insert(kind, compiled);
            }
        }
        map
    };
}

/// Recovers the printed full name from raw OCR text for the given document
/// kind. Primary strategy is the kind's ordered label-anchored capture
/// patterns over the whole normalized text; if no candidate survives the
/// name-shape predicate, falls back to scanning the raw lines. Returns an
/// empty string when nothing qualifies; callers must treat that as a
/// validation failure.
pub fn extract_name(raw_text: &str, kind: DocumentKind) -> String {
    let rules = match rules_for(kind) {
        Some(rules) => rules,
        None => return String::new(),
    };

    let normalized = normalize(raw_text);
    if let Some(patterns) = NAME_PATTERNS.get(&kind) {
        for pattern in patterns {
            if let Some(captures) = pattern.captures(&normalized) {
                if let Some(matched) = captures.get(1) {
                    let candidate = clean_candidate(matched.as_str());
                    if is_plausible_name(&candidate, rules) {
                        debug!("name matched anchored pattern on {kind}");
                        return candidate;
                    }
                }
            }
        }
    }

    fallback_line_scan(raw_text, rules)
}

/// Line-oriented fallback for OCR output whose name did not survive the
/// anchored patterns: normalization collapses newlines, so line structure
/// has to be read from the raw text. Tries the remainder of the anchor
/// line, then the following line, then every line independently.
fn fallback_line_scan(raw_text: &str, rules: &KindRules) -> String {
    let lines: Vec<String> = raw_text.lines().map(normalize).collect();

    for (i, line) in lines.iter().enumerate() {
        for anchor in rules.name_anchors {
            if let Some(pos) = line.find(anchor) {
                let candidate = clean_candidate(&line[pos + anchor.len()..]);
                if is_plausible_name(&candidate, rules) {
                    debug!("name found after label on line {i}");
                    return candidate;
                }
                if let Some(next) = lines.get(i + 1) {
                    let candidate = clean_candidate(next);
                    if is_plausible_name(&candidate, rules) {
                        debug!("name found on line following label");
                        return candidate;
                    }
                }
            }
        }
    }

    for line in &lines {
        let candidate = clean_candidate(line);
        if is_plausible_name(&candidate, rules) {
            debug!("name found by whole-line scan");
            return candidate;
        }
    }

    String::new()
}

/// Strips date tokens and residual label vocabulary a capture can carry,
/// then collapses the remainder. Trailing labels are stripped as phrases
/// only, since single words like SINH also occur in real names.
fn clean_candidate(raw: &str) -> String {
    let mut words: Vec<&str> = raw
        .split_whitespace()
        .filter(|w| !w.chars().any(|c| c.is_ascii_digit()))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for label in LEADING_LABELS {
            let parts: Vec<&str> = label.split(' ').collect();
            if words.len() >= parts.len() && words[..parts.len()] == parts[..] {
                words.drain(..parts.len());
                changed = true;
            }
        }
        for label in TRAILING_LABELS {
            let parts: Vec<&str> = label.split(' ').collect();
            if words.len() >= parts.len() && words[words.len() - parts.len()..] == parts[..] {
                words.truncate(words.len() - parts.len());
                changed = true;
            }
        }
    }

    words.join(" ")
}

/// Shape test for a cleaned name candidate: Latin capitals and spaces only,
/// 6-50 characters, 2-6 words, and no administrative vocabulary from the
/// kind's denylist.
pub fn is_plausible_name(candidate: &str, rules: &KindRules) -> bool {
    let len = candidate.chars().count();
    if !(6..=50).contains(&len) {
        return false;
    }
    if !candidate
        .chars()
        .all(|c| c.is_ascii_uppercase() || c == ' ')
    {
        return false;
    }
    let word_count = candidate.split(' ').filter(|w| !w.is_empty()).count();
    if !(2..=6).contains(&word_count) {
        return false;
    }
    let padded = format!(" {candidate} ");
    !rules
        .denylist
        .iter()
        .any(|entry| padded.contains(&format!(" {entry} ")))
}
