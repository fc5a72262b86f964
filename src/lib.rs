pub mod error;
pub mod loan;
pub mod precision;

pub use error::{LoanError, LoanResult};
pub use precision::Precision;
