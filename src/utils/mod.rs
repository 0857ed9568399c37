pub mod error;

pub use error::VerifyError;
