//! Read-only inspection of Markdown bodies

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

/// Marker separating the excerpt from the rest of a post
pub const MORE_MARKER: &str = "<!-- more -->";

/// A fenced or indented code block found in a body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    /// First word of the fence info string (`csharp` for ```` ```csharp {linenos=true} ````)
    pub lang: Option<String>,
    pub code: String,
}

fn parser(markdown: &str) -> Parser<'_> {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES;
    Parser::new_ext(markdown, options)
}

/// Collect every code block in document order
pub fn code_blocks(markdown: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<CodeBlock> = None;

    for event in parser(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(|l| l.trim_matches(|c| c == '{' || c == '}' || c == '.'))
                        .filter(|l| !l.is_empty())
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                current = Some(CodeBlock {
                    lang,
                    code: String::new(),
                });
            }
            Event::Text(text) => {
                if let Some(block) = current.as_mut() {
                    block.code.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            }
            _ => {}
        }
    }

    blocks
}

/// Distinct code block languages, in order of first appearance
pub fn code_languages(markdown: &str) -> Vec<String> {
    let mut langs: Vec<String> = Vec::new();
    for block in code_blocks(markdown) {
        if let Some(lang) = block.lang {
            if !langs.contains(&lang) {
                langs.push(lang);
            }
        }
    }
    langs
}

/// The part of the body before `<!-- more -->`, if the marker is present
pub fn split_excerpt(markdown: &str) -> Option<&str> {
    markdown
        .split_once(MORE_MARKER)
        .map(|(excerpt, _)| excerpt.trim())
}

/// Count prose words, leaving code blocks out
pub fn word_count(markdown: &str) -> usize {
    let mut in_code = false;
    let mut count = 0;

    for event in parser(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code = true,
            Event::End(TagEnd::CodeBlock) => in_code = false,
            Event::Text(text) if !in_code => count += text.split_whitespace().count(),
            _ => {}
        }
    }

    count
}
