use super::data::DocumentKind;

/// Rule table for one document kind. Classification, title extraction and
/// name extraction are all table lookups, so supporting a new kind means
/// adding a row here rather than new branches in the pipeline.
pub struct KindRules {
    pub kind: DocumentKind,
    /// Disjunction of conjunctive keyword clauses, tested against the
    /// normalized OCR text. The first satisfied clause classifies the text.
    /// Partial-keyword clauses tolerate OCR dropping characters from the
    /// printed bilingual headers.
    pub keyword_clauses: &'static [&'static [&'static str]],
    /// Ordered title regexes; the first match becomes the human-readable
    /// document title.
    pub title_patterns: &'static [&'static str],
    /// Label tokens that anchor the printed full name, in priority order.
    pub name_anchors: &'static [&'static str],
    /// Administrative vocabulary that disqualifies a name candidate:
    /// document labels, field captions, ministry and country names.
    pub denylist: &'static [&'static str],
    /// Whether the physical document has a mandatory back side.
    pub requires_back: bool,
}

/// Kinds in classification priority order; the first whose clause set is
/// satisfied wins.
pub const CLASSIFICATION_ORDER: [DocumentKind; 3] = [
    DocumentKind::NationalId,
    DocumentKind::DriverLicense,
    DocumentKind::Passport,
];

/// Kinds in extraction preference order: prefer whichever optional document
/// the user supplied, fall back to the mandatory national ID.
pub const EXTRACT_PRIORITY: [DocumentKind; 3] = [
    DocumentKind::DriverLicense,
    DocumentKind::Passport,
    DocumentKind::NationalId,
];

static NATIONAL_ID_RULES: KindRules = KindRules {
    kind: DocumentKind::NationalId,
    keyword_clauses: &[
        &["CAN CUOC CONG DAN"],
        &["CITIZEN IDENTITY CARD"],
        &["CAN CUOC", "CONG DAN"],
        &["CCCD", "SOCIALIST REPUBLIC"],
    ],
    title_patterns: &[
        r"\b(CAN CUOC CONG DAN)\b",
        r"\b(CITIZEN IDENTITY CARD)\b",
        r"\b(CAN CUOC)\b",
    ],
    name_anchors: &["HO VA TEN", "FULL NAME"],
    denylist: &[
        "HO VA TEN",
        "FULL NAME",
        "CAN CUOC",
        "CONG DAN",
        "CITIZEN IDENTITY",
        "NGAY SINH",
        "DATE OF BIRTH",
        "QUOC TICH",
        "NATIONALITY",
        "GIOI TINH",
        "NOI THUONG TRU",
        "PLACE OF RESIDENCE",
        "QUE QUAN",
        "PLACE OF ORIGIN",
        "ADDRESS",
        "VIET NAM",
        "VIETNAM",
        "SOCIALIST REPUBLIC",
        "CONG HOA XA HOI",
        "DOC LAP",
        "HANH PHUC",
        "INDEPENDENCE",
        "FREEDOM",
        "HAPPINESS",
        "BO CONG AN",
        "MINISTRY OF PUBLIC SECURITY",
    ],
    requires_back: true,
};

static DRIVER_LICENSE_RULES: KindRules = KindRules {
    kind: DocumentKind::DriverLicense,
    keyword_clauses: &[
        &["GIAY PHEP LAI XE"],
        &["DRIVER S LICENSE"],
        &["DRIVING LICENCE"],
        &["GIAY PHEP", "LAI XE"],
        &["GPLX", "SOCIALIST REPUBLIC"],
    ],
    title_patterns: &[
        r"\b(GIAY PHEP LAI XE)\b",
        r"\b(DRIVER S LICENSE)\b",
        r"\b(DRIVING LICENCE)\b",
    ],
    name_anchors: &["HO TEN", "HO VA TEN", "FULL NAME"],
    denylist: &[
        "HO TEN",
        "HO VA TEN",
        "FULL NAME",
        "GIAY PHEP",
        "LAI XE",
        "LICENSE",
        "LICENCE",
        "NGAY SINH",
        "DATE OF BIRTH",
        "QUOC TICH",
        "NATIONALITY",
        "NOI CU TRU",
        "ADDRESS",
        "CLASS",
        "VIET NAM",
        "VIETNAM",
        "SOCIALIST REPUBLIC",
        "CONG HOA XA HOI",
        "DOC LAP",
        "HANH PHUC",
        "INDEPENDENCE",
        "FREEDOM",
        "HAPPINESS",
        "BO GIAO THONG VAN TAI",
        "MINISTRY OF TRANSPORT",
    ],
    requires_back: true,
};

static PASSPORT_RULES: KindRules = KindRules {
    kind: DocumentKind::Passport,
    keyword_clauses: &[&["HO CHIEU"], &["PASSPORT"]],
    title_patterns: &[r"\b(HO CHIEU)\b", r"\b(PASSPORT)\b"],
    name_anchors: &["HO VA TEN", "FULL NAME"],
    denylist: &[
        "HO VA TEN",
        "FULL NAME",
        "HO CHIEU",
        "PASSPORT",
        "SURNAME",
        "GIVEN NAMES",
        "NGAY SINH",
        "DATE OF BIRTH",
        "QUOC TICH",
        "NATIONALITY",
        "NOI SINH",
        "PLACE OF BIRTH",
        "VIET NAM",
        "VIETNAM",
        "SOCIALIST REPUBLIC",
        "CONG HOA XA HOI",
        "DOC LAP",
        "HANH PHUC",
        "INDEPENDENCE",
        "FREEDOM",
        "HAPPINESS",
        "CUC QUAN LY XUAT NHAP CANH",
        "IMMIGRATION DEPARTMENT",
    ],
    requires_back: false,
};

/// Rule row for a kind; `Unknown` has no rules.
pub fn rules_for(kind: DocumentKind) -> Option<&'static KindRules> {
    match kind {
        DocumentKind::NationalId => Some(&NATIONAL_ID_RULES),
        DocumentKind::DriverLicense => Some(&DRIVER_LICENSE_RULES),
        DocumentKind::Passport => Some(&PASSPORT_RULES),
        DocumentKind::Unknown => None,
    }
}
