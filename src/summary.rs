//! Content descriptors, prompt construction and the summary produced by the agent.

use clap::builder::PossibleValue;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Descriptions longer than this are cut before they reach the prompt.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// How verbose the requested summary should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DetailLevel {
    Short,
    #[default]
    Medium,
    Long,
}

impl DetailLevel {
    /// Parse a user-facing label. Unknown labels resolve to `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "short" => DetailLevel::Short,
            "long" => DetailLevel::Long,
            _ => DetailLevel::Medium,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DetailLevel::Short => "Short",
            DetailLevel::Medium => "Medium",
            DetailLevel::Long => "Long",
        }
    }

    /// Instruction line placed in the prompt for this level
    pub fn instruction(&self) -> &'static str {
        match self {
            DetailLevel::Short => {
                "Provide a very concise summary (1-2 paragraphs max) focusing only on the most critical takeaway."
            }
            DetailLevel::Medium => {
                "Provide a comprehensive summary with key points and main topics discussed."
            }
            DetailLevel::Long => {
                "Provide a very detailed summary, breaking down the video into sections, including specific examples, and capturing all important nuances."
            }
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Hand-written so serde keeps the lenient `from_label` path.
impl ValueEnum for DetailLevel {
    fn value_variants<'a>() -> &'a [Self] {
        &[DetailLevel::Short, DetailLevel::Medium, DetailLevel::Long]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        let name = match self {
            DetailLevel::Short => "short",
            DetailLevel::Medium => "medium",
            DetailLevel::Long => "long",
        };
        Some(PossibleValue::new(name))
    }
}

impl FromStr for DetailLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl From<String> for DetailLevel {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<DetailLevel> for String {
    fn from(value: DetailLevel) -> Self {
        value.label().to_string()
    }
}

/// What the page scraper hands us: the video metadata plus the chosen detail level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDescriptor {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub detail_level: DetailLevel,
}

impl ContentDescriptor {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        description: Option<String>,
        detail_level: DetailLevel,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description,
            detail_level,
        }
    }

    /// The description as it appears in the prompt, if there is one.
    pub fn truncated_description(&self) -> Option<&str> {
        let description = self.description.as_deref()?;
        if description.is_empty() {
            return None;
        }
        match description.char_indices().nth(MAX_DESCRIPTION_CHARS) {
            Some((cut, _)) => Some(&description[..cut]),
            None => Some(description),
        }
    }
}

/// Build the natural-language prompt sent to the model
pub fn build_prompt(descriptor: &ContentDescriptor) -> String {
    let level = descriptor.detail_level;
    let description = descriptor
        .truncated_description()
        .map(|d| format!("Description: {}", d))
        .unwrap_or_default();

    format!(
        "Please provide a {} summary of this video.\n{}\n\nTitle: {}\nURL: {}\n{}\n\nFormat the summary in a clear, readable way with appropriate headings and structure.",
        level.label(),
        level.instruction(),
        descriptor.title,
        descriptor.url,
        description
    )
}

/// Raw model output together with the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub text: String,
    pub model_used: String,
}

impl SummaryResult {
    pub fn new(text: impl Into<String>, model_used: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model_used: model_used.into(),
        }
    }

    /// Check if the model returned anything worth showing
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Prefix the summary with a metadata header (title, link, level, model).
pub fn labeled_summary(descriptor: &ContentDescriptor, result: &SummaryResult) -> String {
    format!(
        "# {}\n[Video Link]({}) | **Detail Level:** {}\n**Summarized with:** {}\n\n---\n\n{}",
        descriptor.title,
        descriptor.url,
        descriptor.detail_level,
        result.model_used,
        result.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(description: Option<&str>, level: DetailLevel) -> ContentDescriptor {
        ContentDescriptor::new(
            "Rust in 100 Seconds",
            "https://www.youtube.com/watch?v=5C_HPTJg5ek",
            description.map(str::to_string),
            level,
        )
    }

    #[test]
    fn unknown_labels_fall_back_to_medium() {
        for label in ["", "verbose", "extra-long", "tiny"] {
            let level = DetailLevel::from_label(label);
            assert_eq!(level, DetailLevel::Medium, "label {:?}", label);
            assert_eq!(level.instruction(), DetailLevel::Medium.instruction());
        }
        assert_eq!(DetailLevel::from_label("short"), DetailLevel::Short);
        assert_eq!(DetailLevel::from_label(" Long "), DetailLevel::Long);
    }

    #[test]
    fn value_enum_rejects_unknown_labels() {
        assert_eq!(<DetailLevel as ValueEnum>::from_str("LONG", true).unwrap(), DetailLevel::Long);
        assert_eq!(<DetailLevel as ValueEnum>::from_str("short", false).unwrap(), DetailLevel::Short);
        assert!(<DetailLevel as ValueEnum>::from_str("verbose", true).is_err());
    }

    #[test]
    fn prompt_contains_instruction_and_metadata() {
        let prompt = build_prompt(&descriptor(Some("A quick tour."), DetailLevel::Short));
        assert!(prompt.starts_with("Please provide a Short summary of this video."));
        assert!(prompt.contains(DetailLevel::Short.instruction()));
        assert!(prompt.contains("Title: Rust in 100 Seconds"));
        assert!(prompt.contains("URL: https://www.youtube.com/watch?v=5C_HPTJg5ek"));
        assert!(prompt.contains("Description: A quick tour."));
        assert!(prompt.ends_with("appropriate headings and structure."));
    }

    #[test]
    fn prompt_omits_missing_description() {
        let prompt = build_prompt(&descriptor(None, DetailLevel::Long));
        assert!(!prompt.contains("Description:"));
        let prompt = build_prompt(&descriptor(Some(""), DetailLevel::Long));
        assert!(!prompt.contains("Description:"));
    }

    #[test]
    fn long_descriptions_are_cut_to_limit() {
        let long = format!("{}{}", "a".repeat(MAX_DESCRIPTION_CHARS), "TAIL");
        let prompt = build_prompt(&descriptor(Some(&long), DetailLevel::Medium));
        let expected = format!("Description: {}\n", "a".repeat(MAX_DESCRIPTION_CHARS));
        assert!(prompt.contains(&expected));
        assert!(!prompt.contains("TAIL"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let long = "é".repeat(MAX_DESCRIPTION_CHARS + 5);
        let d = descriptor(Some(&long), DetailLevel::Medium);
        let cut = d.truncated_description().unwrap();
        assert_eq!(cut.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn descriptor_parses_scraper_json() {
        let json = r#"{"title":"T","url":"https://y.t/w","description":"D","detailLevel":"Bogus"}"#;
        let d: ContentDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.detail_level, DetailLevel::Medium);
        assert_eq!(d.description.as_deref(), Some("D"));

        let json = r#"{"title":"T","url":"https://y.t/w"}"#;
        let d: ContentDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.description, None);
    }

    #[test]
    fn labeled_summary_has_header() {
        let d = descriptor(None, DetailLevel::Long);
        let r = SummaryResult::new("Body text", "gemini-2.0-flash");
        let labeled = labeled_summary(&d, &r);
        assert!(labeled.starts_with("# Rust in 100 Seconds\n[Video Link]("));
        assert!(labeled.contains("**Detail Level:** Long"));
        assert!(labeled.contains("**Summarized with:** gemini-2.0-flash"));
        assert!(labeled.ends_with("---\n\nBody text"));
    }
}
