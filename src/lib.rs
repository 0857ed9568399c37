pub mod models;
pub mod processing;
pub mod utils;
pub mod validation;
pub mod verification;

pub use utils::VerifyError;
pub use validation::{DocumentValidator, FaceMatcher};
pub use verification::VerificationFlow;
