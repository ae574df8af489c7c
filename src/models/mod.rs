pub mod submission;

pub use submission::{FieldValue, NormalizedFields, Submission};
