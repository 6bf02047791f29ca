use eframe::egui::{Vec2, vec2};

use crate::config::{AnchorPoint, DescriptionConfig, TextBlockConfig};

const HIGHLIGHT_MARKER: &str = "==";

/// Width of a run of text at a given font size, supplied by the surface
/// that will draw it.
pub trait TextMeasure {
    fn width(&self, text: &str, font_size: f32) -> f32;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextToken {
    pub text: String,
    pub highlighted: bool,
}

impl TextToken {
    fn space() -> Self {
        Self {
            text: " ".to_owned(),
            highlighted: false,
        }
    }

    pub fn is_space(&self) -> bool {
        self.text == " "
    }
}

/// One whitespace-delimited word, split wherever a marker toggles emphasis.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightWord {
    pub spans: Vec<TextToken>,
}

pub fn strip_highlight_markers(text: &str) -> String {
    text.replace(HIGHLIGHT_MARKER, "")
}

pub fn tokenize_highlights(text: &str) -> Vec<HighlightWord> {
    let mut words = Vec::new();
    let mut word = HighlightWord::default();
    let mut span = String::new();
    let mut highlighted = false;
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        if rest.starts_with(HIGHLIGHT_MARKER) {
            flush_span(&mut word, &mut span, highlighted);
            highlighted = !highlighted;
            rest = &rest[HIGHLIGHT_MARKER.len()..];
            continue;
        }

        if ch.is_whitespace() {
            flush_span(&mut word, &mut span, highlighted);
            if !word.spans.is_empty() {
                words.push(std::mem::take(&mut word));
            }
        } else {
            span.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }

    flush_span(&mut word, &mut span, highlighted);
    if !word.spans.is_empty() {
        words.push(word);
    }
    words
}

fn flush_span(word: &mut HighlightWord, span: &mut String, highlighted: bool) {
    if !span.is_empty() {
        word.spans.push(TextToken {
            text: std::mem::take(span),
            highlighted,
        });
    }
}

/// Greedy word wrap over `\n`-separated paragraphs. Blank paragraphs become
/// empty lines and a word wider than `max_width` gets a line to itself.
pub fn wrap(measure: &dyn TextMeasure, text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let clean = strip_highlight_markers(text);
    let mut lines = Vec::new();

    for paragraph in clean.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }

            let candidate = format!("{line} {word}");
            if measure.width(&candidate, font_size) > max_width {
                lines.push(std::mem::replace(&mut line, word.to_owned()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }

    lines
}

/// Wraps the marker-free text, then hands the highlighted words back out
/// line by line so emphasis never changes where lines break.
pub fn wrap_with_highlights(
    measure: &dyn TextMeasure,
    text: &str,
    max_width: f32,
    font_size: f32,
) -> (Vec<String>, Vec<Vec<TextToken>>) {
    let lines = wrap(measure, text, max_width, font_size);
    let mut words = tokenize_highlights(text).into_iter();

    let token_lines = lines
        .iter()
        .map(|line| {
            let mut tokens = Vec::new();
            for (position, _) in line.split_whitespace().enumerate() {
                let Some(word) = words.next() else {
                    break;
                };
                if position > 0 {
                    tokens.push(TextToken::space());
                }
                tokens.extend(word.spans);
            }
            tokens
        })
        .collect();

    (lines, token_lines)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub max_width: f32,
    pub font_size: f32,
    pub line_height: f32,
    pub padding: f32,
}

impl TextStyle {
    pub fn description(config: &DescriptionConfig, canvas_width: f32) -> Self {
        Self {
            max_width: canvas_width * config.max_width_ratio,
            font_size: config.font_size,
            line_height: config.line_height,
            padding: config.padding,
        }
    }

    pub fn block(config: &TextBlockConfig, canvas_width: f32) -> Self {
        Self {
            max_width: canvas_width * config.max_width_ratio,
            font_size: config.font_size,
            line_height: config.line_height,
            padding: config.padding,
        }
    }
}

pub fn box_size(measure: &dyn TextMeasure, lines: &[String], style: &TextStyle) -> Vec2 {
    let widest = lines
        .iter()
        .map(|line| measure.width(line, style.font_size))
        .fold(0.0_f32, f32::max);
    vec2(
        widest + style.padding * 2.0,
        lines.len() as f32 * style.line_height + style.padding * 2.0,
    )
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextBlockLayout {
    pub lines: Vec<String>,
    pub token_lines: Vec<Vec<TextToken>>,
    pub size: Vec2,
}

impl TextBlockLayout {
    pub fn compute(measure: &dyn TextMeasure, text: &str, style: &TextStyle) -> Self {
        let (lines, token_lines) =
            wrap_with_highlights(measure, text, style.max_width, style.font_size);
        let size = box_size(measure, &lines, style);
        Self {
            lines,
            token_lines,
            size,
        }
    }
}

/// Top-left corner of a box of `size` whose `anchor` sits at `pos`.
pub fn box_origin(anchor: AnchorPoint, pos: Vec2, size: Vec2) -> Vec2 {
    match anchor {
        AnchorPoint::TopLeft => pos,
        AnchorPoint::TopRight => vec2(pos.x - size.x, pos.y),
        AnchorPoint::BottomLeft => vec2(pos.x, pos.y - size.y),
        AnchorPoint::BottomRight => pos - size,
        AnchorPoint::Center => pos - size * 0.5,
    }
}

pub fn box_center(anchor: AnchorPoint, pos: Vec2, size: Vec2) -> Vec2 {
    box_origin(anchor, pos, size) + size * 0.5
}

#[cfg(test)]
pub(in crate::app) mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Every character is half the font size wide.
    pub(in crate::app) struct Monospace;

    impl TextMeasure for Monospace {
        fn width(&self, text: &str, font_size: f32) -> f32 {
            text.chars().count() as f32 * font_size * 0.5
        }
    }

    #[test]
    fn markers_are_stripped_everywhere() {
        assert_eq!(strip_highlight_markers("a ==b== c"), "a b c");
        assert_eq!(strip_highlight_markers("====x"), "x");
    }

    #[test]
    fn highlight_state_spans_words() {
        let words = tokenize_highlights("plain ==two words== end");
        let flags: Vec<Vec<bool>> = words
            .iter()
            .map(|word| word.spans.iter().map(|span| span.highlighted).collect())
            .collect();
        assert_eq!(
            flags,
            vec![vec![false], vec![true], vec![true], vec![false]]
        );

        let mixed = tokenize_highlights("semi==bold==");
        assert_eq!(mixed.len(), 1);
        assert_eq!(mixed[0].spans.len(), 2);
        assert!(mixed[0].spans[1].highlighted);
    }

    #[test]
    fn wrap_is_greedy_and_keeps_paragraph_breaks() {
        // 10pt font: 5pt per char, 50pt fits ten chars.
        let lines = wrap(&Monospace, "aaa bbb ccc\n\nddddddddddddd e", 50.0, 10.0);
        assert_eq!(lines, vec!["aaa bbb", "ccc", "", "ddddddddddddd", "e"]);
    }

    #[test]
    fn markers_do_not_change_breaks() {
        let plain = wrap(&Monospace, "aaa bbb ccc", 50.0, 10.0);
        let (marked, tokens) = wrap_with_highlights(&Monospace, "aaa ==bbb== ccc", 50.0, 10.0);
        assert_eq!(plain, marked);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].len(), 3);
        assert!(tokens[0][1].is_space());
        assert!(tokens[0][2].highlighted);
        assert!(!tokens[1][0].highlighted);
    }

    #[test]
    fn box_size_pads_widest_line() {
        let style = TextStyle {
            max_width: 100.0,
            font_size: 10.0,
            line_height: 18.0,
            padding: 10.0,
        };
        let lines = vec!["abcd".to_owned(), "ab".to_owned()];
        assert_eq!(box_size(&Monospace, &lines, &style), vec2(40.0, 56.0));
    }

    #[test]
    fn anchors_resolve_origin_and_center() {
        let pos = vec2(100.0, 100.0);
        let size = vec2(40.0, 20.0);
        assert_eq!(box_origin(AnchorPoint::TopRight, pos, size), vec2(60.0, 100.0));
        assert_eq!(box_origin(AnchorPoint::BottomLeft, pos, size), vec2(100.0, 80.0));
        assert_eq!(box_center(AnchorPoint::Center, pos, size), pos);
        assert_eq!(box_center(AnchorPoint::TopLeft, pos, size), vec2(120.0, 110.0));
    }

    proptest! {
        #[test]
        fn wrap_is_idempotent(text in "[a-z =\n]{0,120}", max_width in 10.0_f32..200.0) {
            let once = wrap(&Monospace, &text, max_width, 10.0);
            let twice = wrap(&Monospace, &once.join("\n"), max_width, 10.0);
            prop_assert_eq!(once, twice);
        }
    }
}
