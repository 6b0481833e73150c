// Document upload: resume and job description text extraction, resume section parsing.

pub mod extract;
pub mod handlers;
pub mod sections;

pub use extract::{extract_text, DocumentKind, ExtractError};
pub use sections::parse_resume_sections;
