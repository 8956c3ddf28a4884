//! Heuristic segmentation of annotated text runs into renderable blocks.
//!
//! Legacy records store content as Notion-style rich text rather than HTML.
//! The player and editor preview both need that flat run list grouped into
//! paragraphs, headings, and lists. The heuristics are deliberately simple
//! and fall back to a paragraph whenever they disagree; the segmenter never
//! fails on any input.

use crate::domain::newsletter::{
    RichTextAnnotations, RichTextContent, RichTextElement, RichTextLink,
};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Ordered,
    Unordered,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(Vec<RichTextElement>),
    Paragraph(Vec<RichTextElement>),
    List {
        list_type: ListType,
        items: Vec<Vec<RichTextElement>>,
    },
}

/// A run of annotated text that does not cross line boundaries.
#[derive(Debug, Clone)]
struct Segment {
    text: String,
    annotations: RichTextAnnotations,
    link: Option<RichTextLink>,
}

/// True when the joined plain text reads as HTML, in which case callers
/// bypass the segmenter and render the markup directly.
pub fn looks_like_html(text: &str) -> bool {
    let trimmed = text.trim_start();
    let mut chars = trimmed.chars();
    matches!(chars.next(), Some('<'))
        && matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && trimmed.contains('>')
}

pub fn parse_blocks(rich_text: &[RichTextElement]) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Vec<Segment> = Vec::new();

    for segment in split_into_line_segments(rich_text) {
        if segment.text == "\n" {
            flush_block(&mut blocks, &mut current);
        } else {
            current.push(segment);
        }
    }
    flush_block(&mut blocks, &mut current);

    blocks
}

/// Split the first grapheme cluster off the first run, for the drop-cap
/// treatment the renderer applies to the opening paragraph.
pub fn split_drop_cap(runs: &[RichTextElement]) -> Option<(String, Vec<RichTextElement>)> {
    let first = runs.first()?;
    let mut graphemes = first.plain_text.graphemes(true);
    let initial = graphemes.next()?.to_string();
    let remainder: String = graphemes.collect();

    let mut rest = Vec::with_capacity(runs.len());
    let mut trimmed_first = first.clone();
    trimmed_first.text.content = remainder.clone();
    trimmed_first.plain_text = remainder;
    rest.push(trimmed_first);
    rest.extend_from_slice(&runs[1..]);

    Some((initial, rest))
}

/// Flatten the runs, splitting on newlines while preserving annotations.
/// An explicit `"\n"` segment marks each line boundary.
fn split_into_line_segments(rich_text: &[RichTextElement]) -> Vec<Segment> {
    let mut segments = Vec::new();

    for element in rich_text {
        let parts: Vec<&str> = element.plain_text.split('\n').collect();
        let last = parts.len().saturating_sub(1);
        for (index, part) in parts.iter().enumerate() {
            if !part.is_empty() {
                segments.push(Segment {
                    text: (*part).to_string(),
                    annotations: element.annotations.clone(),
                    link: element.text.link.clone(),
                });
            }
            if index < last {
                segments.push(Segment {
                    text: "\n".to_string(),
                    annotations: element.annotations.clone(),
                    link: None,
                });
            }
        }
    }

    segments
}

fn flush_block(blocks: &mut Vec<Block>, current: &mut Vec<Segment>) {
    if current.is_empty() {
        return;
    }
    let segments = std::mem::take(current);

    let full_text: String = segments.iter().map(|s| s.text.as_str()).collect();
    let full_text = full_text.trim().to_string();
    if full_text.is_empty() {
        return;
    }

    if let Some((list_type, marker_len)) = detect_list_marker(&full_text) {
        let item = segments_to_runs(strip_leading_chars(segments, marker_len));

        // Contiguous items of the same marker type merge into one block; a
        // change of marker type starts a new list.
        match blocks.last_mut() {
            Some(Block::List {
                list_type: previous,
                items,
            }) if *previous == list_type => items.push(item),
            _ => blocks.push(Block::List {
                list_type,
                items: vec![item],
            }),
        }
        return;
    }

    let is_bold = segments
        .iter()
        .all(|s| s.annotations.bold || s.text.trim().is_empty());
    let length = full_text.chars().count();
    let ends_with_punctuation = full_text.ends_with(['.', '!', '?']);

    // Short bold text without trailing punctuation is the strongest heading
    // signal; very short bold text qualifies regardless.
    let is_heading = (is_bold && length < 60 && !ends_with_punctuation)
        || (is_bold && length < 30)
        || (is_bold && length < 40 && !full_text.contains('\n'));

    if is_heading {
        blocks.push(Block::Heading(segments_to_runs(segments)));
    } else {
        blocks.push(Block::Paragraph(segments_to_runs(segments)));
    }
}

/// `- `, `* `, `• ` mark unordered items; `1. ` style markers ordered ones.
/// Returns the marker type and the number of characters to strip.
fn detect_list_marker(line: &str) -> Option<(ListType, usize)> {
    let mut chars = line.chars();
    let first = chars.next()?;

    if matches!(first, '-' | '*' | '•') {
        if chars.next().is_some_and(|c| c.is_whitespace()) {
            return Some((ListType::Unordered, 2));
        }
        return None;
    }

    if first.is_ascii_digit() {
        let digits = 1 + chars.clone().take_while(|c| c.is_ascii_digit()).count();
        let mut rest = line.chars().skip(digits);
        if rest.next() == Some('.') && rest.next().is_some_and(|c| c.is_whitespace()) {
            return Some((ListType::Ordered, digits + 2));
        }
    }

    None
}

/// Drop `count` characters from the front of the segment list, splitting a
/// segment when the marker ends inside it.
fn strip_leading_chars(segments: Vec<Segment>, count: usize) -> Vec<Segment> {
    let mut remaining = count;
    let mut out = Vec::with_capacity(segments.len());

    for mut segment in segments {
        if remaining == 0 {
            out.push(segment);
            continue;
        }
        let len = segment.text.chars().count();
        if len <= remaining {
            remaining -= len;
        } else {
            segment.text = segment.text.chars().skip(remaining).collect();
            remaining = 0;
            out.push(segment);
        }
    }

    out
}

fn segments_to_runs(segments: Vec<Segment>) -> Vec<RichTextElement> {
    segments
        .into_iter()
        .map(|s| RichTextElement {
            element_type: "text".to_string(),
            href: s.link.as_ref().map(|l| l.url.clone()),
            text: RichTextContent {
                content: s.text.clone(),
                link: s.link,
            },
            annotations: s.annotations,
            plain_text: s.text,
        })
        .collect()
}
