pub mod document;
pub mod face;

pub use document::DocumentValidator;
pub use face::FaceMatcher;
