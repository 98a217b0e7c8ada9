pub mod json;

pub use json::{DOCUMENT_VERSION, Document};
