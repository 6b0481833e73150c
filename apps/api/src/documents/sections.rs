use crate::models::document::ResumeSections;

/// Longer lines are body text, never section headers.
const MAX_HEADER_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Education,
    Skills,
    Experience,
    Projects,
    Awards,
}

/// Checked in order; the first section whose keyword appears in a short line wins.
const SECTION_KEYWORDS: &[(Section, &[&str])] = &[
    (Section::Education, &["education", "academic", "degree"]),
    (Section::Skills, &["skills", "competencies"]),
    (Section::Experience, &["experience", "employment"]),
    (Section::Projects, &["projects"]),
    (Section::Awards, &["awards", "achievements", "honors", "certifications"]),
];

fn header_section(line: &str) -> Option<Section> {
    let line = line.trim().to_lowercase();
    if line.is_empty() || line.chars().count() >= MAX_HEADER_CHARS {
        return None;
    }
    SECTION_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| line.contains(k)))
        .map(|(section, _)| *section)
}

/// Splits resume text on short header lines. Text before the first header is dropped;
/// a repeated header replaces the earlier content of that section.
pub fn parse_resume_sections(text: &str) -> ResumeSections {
    let mut sections = ResumeSections::default();
    let mut current: Option<Section> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(section) = header_section(line) {
            if let Some(previous) = current {
                store(&mut sections, previous, &body);
            }
            current = Some(section);
            body.clear();
        } else if current.is_some() {
            body.push(line);
        }
    }
    if let Some(last) = current {
        store(&mut sections, last, &body);
    }
    sections
}

fn store(sections: &mut ResumeSections, section: Section, body: &[&str]) {
    let content = body.join("\n").trim().to_string();
    if content.is_empty() {
        return;
    }
    let slot = match section {
        Section::Education => &mut sections.education,
        Section::Skills => &mut sections.skills,
        Section::Experience => &mut sections.experience,
        Section::Projects => &mut sections.projects,
        Section::Awards => &mut sections.awards,
    };
    *slot = content;
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe\njane@example.com\n\nEducation\nBSc Computer Science, 2018\n\n\
        Technical Skills\nRust, Python, AWS\n\nWork Experience\nBackend engineer at Acme, \
        2018-2024\nLed the billing migration\n\nKey Projects\nOpen-source job scheduler\n\n\
        Certifications\nAWS Solutions Architect";

    #[test]
    fn test_splits_on_headers() {
        let sections = parse_resume_sections(RESUME);
        assert_eq!(sections.education, "BSc Computer Science, 2018");
        assert_eq!(sections.skills, "Rust, Python, AWS");
        assert_eq!(
            sections.experience,
            "Backend engineer at Acme, 2018-2024\nLed the billing migration"
        );
        assert_eq!(sections.projects, "Open-source job scheduler");
        assert_eq!(sections.awards, "AWS Solutions Architect");
    }

    #[test]
    fn test_long_lines_are_not_headers() {
        let text = "Experience\nI have experience shipping distributed systems to millions of users";
        let sections = parse_resume_sections(text);
        assert!(sections.experience.starts_with("I have experience"));
        assert!(sections.education.is_empty());
    }

    #[test]
    fn test_no_headers_yields_empty_sections() {
        assert_eq!(parse_resume_sections("just some text"), ResumeSections::default());
    }
}
