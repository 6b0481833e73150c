use serde::{Deserialize, Serialize};

/// Plain text extracted from an uploaded resume or job description, as persisted in the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedDocument {
    #[serde(default)]
    pub text: String,
}

/// Resume text split into the conventional sections. Missing sections are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeSections {
    pub education: String,
    pub skills: String,
    pub experience: String,
    pub projects: String,
    pub awards: String,
}
