pub mod classifier;
pub mod matching;
pub mod name_extractor;
pub mod normalizer;

pub use classifier::{classify, extract_document_title};
pub use matching::{compare_names, levenshtein};
pub use name_extractor::{extract_name, is_plausible_name};
pub use normalizer::normalize;
