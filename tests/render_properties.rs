//! Property-based tests for the markdown subset renderer

use folio::{Block, Span, render, render_inline, render_spanned};
use proptest::prelude::*;

/// Text biased towards inline delimiters so tokens actually form.
fn inline_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            3 => "[a-z ]{1,6}",
            1 => Just("*".to_string()),
            1 => Just("**".to_string()),
            1 => Just("`".to_string()),
            1 => Just("[".to_string()),
            1 => Just("](".to_string()),
            1 => Just(")".to_string()),
            1 => Just("é".to_string()),
        ],
        0..16,
    )
    .prop_map(|parts| parts.concat())
}

/// Lines drawn from every block construct plus free text.
fn block_source() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just("# Title".to_string()),
            Just("#### Deep".to_string()),
            Just("##### Too deep".to_string()),
            Just("> quoted".to_string()),
            Just("---".to_string()),
            Just("- item".to_string()),
            Just("   * nested".to_string()),
            Just("12. step".to_string()),
            Just("```rust".to_string()),
            Just("```".to_string()),
            Just("".to_string()),
            Just("   ".to_string()),
            "[a-z *`]{0,12}",
        ],
        1..24,
    )
    .prop_map(|lines| lines.join("\n"))
}

fn concat_source(spans: &[Span]) -> String {
    spans.iter().map(Span::to_source).collect()
}

fn strip_emphasis(text: &str) -> String {
    text.chars().filter(|c| *c != '*' && *c != '`').collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn inline_spans_reconstruct_source(s in inline_text()) {
        let spans = render_inline(&s);
        prop_assert_eq!(concat_source(&spans), s);
    }

    #[test]
    fn inline_display_drops_only_delimiters(s in "[a-z *`é]{0,24}") {
        let spans = render_inline(&s);
        let display: String = spans.iter().map(Span::display_text).collect();
        prop_assert_eq!(strip_emphasis(&display), strip_emphasis(&s));
        prop_assert!(display.len() <= s.len());
    }

    #[test]
    fn inline_without_tokens_is_single_text(s in "[^*`\\[\n]{0,40}") {
        let spans = render_inline(&s);
        prop_assert_eq!(spans, vec![Span::Text(s.clone())]);
    }

    #[test]
    fn inline_spans_never_empty_tokens(s in inline_text()) {
        for span in render_inline(&s) {
            if !matches!(span, Span::Text(_)) {
                prop_assert!(!span.display_text().is_empty(), "Token with empty text: {:?}", span);
            }
        }
    }

    #[test]
    fn blocks_cover_every_line(s in block_source()) {
        let blocks = render_spanned(&s);
        let line_count = s.split('\n').count();

        let mut next = 0;
        for source in &blocks {
            prop_assert_eq!(source.lines.start, next, "Ranges must be contiguous");
            prop_assert!(source.lines.end > source.lines.start, "Ranges must be non-empty");
            if !matches!(source.block, Block::CodeBlock { .. }) {
                prop_assert_eq!(source.lines.len(), 1, "Only code blocks span lines");
            }
            next = source.lines.end;
        }
        prop_assert_eq!(next, line_count);
    }

    #[test]
    fn render_is_total(s in any::<String>()) {
        let blocks = render(&s);
        prop_assert!(!blocks.is_empty());
    }

    #[test]
    fn render_matches_spanned(s in block_source()) {
        let plain = render(&s);
        let spanned: Vec<Block> = render_spanned(&s).into_iter().map(|b| b.block).collect();
        prop_assert_eq!(plain, spanned);
    }
}

#[test]
fn test_scenario_a_heading_blank_paragraph() {
    // Act
    let blocks = render("# Hello\n\nThis is **bold** and *italic*.");

    // Assert
    assert_eq!(
        blocks,
        vec![
            Block::Heading {
                level: 1,
                content: vec![Span::Text("Hello".to_string())],
            },
            Block::Blank,
            Block::Paragraph(vec![
                Span::Text("This is ".to_string()),
                Span::Bold("bold".to_string()),
                Span::Text(" and ".to_string()),
                Span::Italic("italic".to_string()),
                Span::Text(".".to_string()),
            ]),
        ]
    );
}

#[test]
fn test_scenario_b_fenced_code() {
    // Act
    let blocks = render("```js\nconst a = 1;\n```");

    // Assert
    assert_eq!(
        blocks,
        vec![Block::CodeBlock {
            lang: Some("js".to_string()),
            lines: vec!["const a = 1;".to_string()],
        }]
    );
}
