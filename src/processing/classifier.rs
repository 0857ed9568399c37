use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::models::{rules_for, DocumentKind, CLASSIFICATION_ORDER};

lazy_static! {
    static ref TITLE_PATTERNS: HashMap<DocumentKind, Vec<Regex>> = {
        let mut map = HashMap::new();
        for kind in CLASSIFICATION_ORDER {
            if let Some(rules) = rules_for(kind) {
                let compiled = rules
                    .title_patterns
                    .iter()
                    .filter_map(|p| Regex::new(p).ok())
                    .collect();
                map.insert(kind, compiled);
            }
        }
        map
    };
}

/// Decides the document kind from normalized OCR text. Each kind's clause
/// set is a disjunction of conjunctive keyword clauses, tested in fixed
/// priority order; the first satisfied clause wins. No match is `Unknown`.
///
/// Pure function of the normalized text: same input, same answer.
pub fn classify(normalized: &str) -> DocumentKind {
    for kind in CLASSIFICATION_ORDER {
        let rules = match rules_for(kind) {
            Some(rules) => rules,
            None => continue,
        };
        let hit = rules
            .keyword_clauses
            .iter()
            .any(|clause| clause.iter().all(|keyword| normalized.contains(keyword)));
        if hit {
            debug!("classified document text as {kind}");
            return kind;
        }
    }
    DocumentKind::Unknown
}

/// Extracts the human-readable document title printed on the header, using
/// the kind's ordered title patterns. Empty string when nothing matches.
pub fn extract_document_title(normalized: &str, kind: DocumentKind) -> String {
    let patterns = match TITLE_PATTERNS.get(&kind) {
        Some(patterns) => patterns,
        None => return String::new(),
    };
    for pattern in patterns {
        if let Some(captures) = pattern.captures(normalized) {
            if let Some(matched) = captures.get(1) {
                return matched.as_str().to_string();
            }
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::normalize;

    #[test]
    fn test_national_id_keywords() {
        assert_eq!(
            classify("CONG HOA XA HOI CHU NGHIA VIET NAM CAN CUOC CONG DAN SO 012345678901"),
            DocumentKind::NationalId
        );
        assert_eq!(
            classify("CITIZEN IDENTITY CARD NO 012345678901"),
            DocumentKind::NationalId
        );
        // Partial clause: both fragments present but separated by noise.
        assert_eq!(
            classify("CAN CUOC XX NOISE XX CONG DAN"),
            DocumentKind::NationalId
        );
        assert_eq!(
            classify("CCCD SOCIALIST REPUBLIC OF VIETNAM"),
            DocumentKind::NationalId
        );
    }

    #[test]
    fn test_driver_license_keywords() {
        assert_eq!(
            classify("GIAY PHEP LAI XE DRIVER S LICENSE SO 790123456789"),
            DocumentKind::DriverLicense
        );
        assert_eq!(classify("GIAY PHEP LAI XE"), DocumentKind::DriverLicense);
    }

    #[test]
    fn test_passport_keywords() {
        assert_eq!(classify("HO CHIEU PASSPORT N1234567"), DocumentKind::Passport);
        assert_eq!(classify("PASSPORT"), DocumentKind::Passport);
    }

    #[test]
    fn test_priority_order_prefers_national_id() {
        // A national ID mentioning the republic also matches no passport
        // clause by accident, but priority order settles ties anyway.
        assert_eq!(
            classify("CAN CUOC CONG DAN GIAY PHEP LAI XE PASSPORT"),
            DocumentKind::NationalId
        );
    }

    #[test]
    fn test_no_keywords_is_unknown() {
        assert_eq!(classify("HOA DON TIEN DIEN THANG 5"), DocumentKind::Unknown);
        assert_eq!(classify(""), DocumentKind::Unknown);
    }

    #[test]
    fn test_classify_after_normalization() {
        let raw = "CỘNG HÒA XÃ HỘI CHỦ NGHĨA VIỆT NAM\nCĂN CƯỚC CÔNG DÂN";
        assert_eq!(classify(&normalize(raw)), DocumentKind::NationalId);
    }

    #[test]
    fn test_title_extraction() {
        assert_eq!(
            extract_document_title("XX CAN CUOC CONG DAN XX", DocumentKind::NationalId),
            "CAN CUOC CONG DAN"
        );
        assert_eq!(
            extract_document_title("GIAY PHEP LAI XE", DocumentKind::DriverLicense),
            "GIAY PHEP LAI XE"
        );
        assert_eq!(
            extract_document_title("HO CHIEU PASSPORT", DocumentKind::Passport),
            "HO CHIEU"
        );
        assert_eq!(
            extract_document_title("NOTHING HERE", DocumentKind::Passport),
            ""
        );
        assert_eq!(
            extract_document_title("CAN CUOC CONG DAN", DocumentKind::Unknown),
            ""
        );
    }
}
