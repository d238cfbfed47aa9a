pub mod errors;
pub mod id;
pub mod types;

pub use errors::FieldErrors;
