use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("no value for prompt slot `{0}`")]
    MissingSlot(String),
}

/// Values keyed by slot name
#[derive(Debug, Clone, Default)]
pub struct PromptValues {
    values: BTreeMap<String, String>,
}

impl PromptValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slot: &str, value: impl ToString) -> Self {
        self.values.insert(slot.to_string(), value.to_string());
        self
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.values.get(slot).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Slot(&'a str),
}

/// A prompt with `{name}` slots.
///
/// A slot name is one or more ASCII letters, digits or underscores; any other
/// brace is literal text, so JSON examples inside prompts survive rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    source: &'static str,
}

impl PromptTemplate {
    pub const fn new(source: &'static str) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Slot names in order of first appearance
    pub fn slots(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for segment in segments(self.source) {
            if let Segment::Slot(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Fill every slot. Values for slots the template lacks are ignored.
    pub fn render(&self, values: &PromptValues) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in segments(self.source) {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(name) => {
                    let value = values
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingSlot(name.to_string()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

fn is_slot_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn segments(source: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = source;

    while let Some(open) = rest.find('{') {
        let after_open = &rest[open + 1..];
        let slot = after_open
            .find('}')
            .map(|close| &after_open[..close])
            .filter(|name| is_slot_name(name));

        match slot {
            Some(name) => {
                if open > 0 {
                    segments.push(Segment::Text(&rest[..open]));
                }
                segments.push(Segment::Slot(name));
                rest = &after_open[name.len() + 1..];
            }
            None => {
                segments.push(Segment::Text(&rest[..open + 1]));
                rest = after_open;
            }
        }
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    segments
}

pub const SYSTEM_PROMPT: PromptTemplate = PromptTemplate::new(
    "You are a literary analyst specializing in character interaction analysis. \
Your task is to analyze the provided text and identify character interactions, relationships, and key dialogues.
Focus on meaningful interactions between characters and their emotional significance.",
);

pub const ANALYSIS_PROMPT: PromptTemplate = PromptTemplate::new(
    r#"Analyze the following excerpt from "{title}" by {author}:

TEXT:
{text}

Please identify up to {maxCharacters} main characters and analyze their interactions. For each interaction:
1. Identify the characters involved
2. Assess the nature of their relationship
3. Note any significant dialogue or scenes between them
4. Evaluate the emotional tone of their interactions

Format your response as structured data that can be used to create a network graph of character relationships."#,
);

pub const QUOTE_PROMPT: PromptTemplate = PromptTemplate::new(
    r#"From the following text, extract meaningful quotes by or about {character}:

TEXT:
{text}

For each quote:
1. Identify who is speaking
2. Note who they are speaking about
3. Assess the sentiment (positive/negative) of the quote
4. Evaluate its significance to the story

Return only the most significant and emotionally charged quotes."#,
);

pub const RELATIONSHIP_PROMPT: PromptTemplate = PromptTemplate::new(
    r#"Analyze the relationship between {character1} and {character2} in the following text:

TEXT:
{text}

Please evaluate:
1. Frequency of interactions
2. Emotional intensity of interactions
3. Story significance of their relationship
4. Key moments or turning points

Provide a numerical score (1-100) representing the strength/significance of their relationship."#,
);

/// Analysis prompt for a book excerpt
pub fn build_analysis_prompt(
    title: &str,
    author: &str,
    excerpt: &str,
    max_characters: usize,
) -> Result<String, TemplateError> {
    ANALYSIS_PROMPT.render(
        &PromptValues::new()
            .with("title", title)
            .with("author", author)
            .with("text", excerpt)
            .with("maxCharacters", max_characters),
    )
}
