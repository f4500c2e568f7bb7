//! Narration text for a step.

use pulldown_cmark::{Event, Parser, TagEnd};
use waymark_core::model::TourStep;

/// Text read aloud for `step`: its narration override, or the title followed
/// by the description rendered to plain text.
#[must_use]
pub fn narration_script(step: &TourStep) -> String {
    if let Some(narration) = step.narration.as_deref().filter(|n| !n.trim().is_empty()) {
        return collapse_whitespace(narration);
    }

    let title = step.title.trim();
    let body = markdown_to_plain_text(&step.description);
    match (title.is_empty(), body.is_empty()) {
        (true, _) => body,
        (false, true) => title.to_owned(),
        (false, false) if title.ends_with(['.', '!', '?', ':']) => format!("{title} {body}"),
        (false, false) => format!("{title}. {body}"),
    }
}

/// Strips Markdown markup, keeping the readable text.
fn markdown_to_plain_text(markdown: &str) -> String {
    let mut text = String::with_capacity(markdown.len());
    for event in Parser::new(markdown) {
        match event {
            Event::Text(s) | Event::Code(s) => text.push_str(&s),
            Event::SoftBreak
            | Event::HardBreak
            | Event::End(TagEnd::Paragraph | TagEnd::Item | TagEnd::Heading(_)) => text.push(' '),
            _ => {}
        }
    }
    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
