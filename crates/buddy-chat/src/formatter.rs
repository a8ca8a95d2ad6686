//! Answer text to markup.
//!
//! A small staged pipeline over a fixed markdown subset:
//!
//! 1. [`strong_pass`] lexes `**...**` pairs into strong spans.
//! 2. [`emphasis_pass`] lexes `*...*` pairs over whatever the first stage
//!    left, so strong spans may sit inside an emphasis span but never the
//!    other way round.
//! 3. [`render`] escapes text, rewrites `- ` / `* ` line prefixes into
//!    bullets and turns newlines into `<br>`.
//!
//! Markers that do not pair up are kept as literal characters. The pipeline
//! is total: every input produces a string.

/// Glyph replacing a `- ` or `* ` line prefix.
pub const BULLET: &str = "• ";

/// Markup emitted for every newline.
pub const LINE_BREAK: &str = "<br>";

/// Inline node produced by the lexing stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(String),
    Emphasis(Vec<Inline>),
}

/// Format raw message text into renderable markup.
pub fn format_message(text: &str) -> String {
    render(&emphasis_pass(&strong_pass(text)))
}

// =============================================================================
// Stage 1: strong
// =============================================================================

/// Split `text` into literal runs and `**strong**` spans.
///
/// Pairs are matched left to right against the nearest closing marker; the
/// enclosed run must be non-empty and free of `*`.
pub fn strong_pass(text: &str) -> Vec<Inline> {
    let chars: Vec<char> = text.chars().collect();
    let mut nodes = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        if let Some(end) = strong_close(&chars, i) {
            flush_text(&mut literal, &mut nodes);
            nodes.push(Inline::Strong(chars[i + 2..end].iter().collect()));
            i = end + 2;
        } else {
            literal.push(chars[i]);
            i += 1;
        }
    }
    flush_text(&mut literal, &mut nodes);
    nodes
}

/// Index of the closing `**` for a strong span opening at `start`.
fn strong_close(chars: &[char], start: usize) -> Option<usize> {
    if chars.get(start) != Some(&'*') || chars.get(start + 1) != Some(&'*') {
        return None;
    }
    let body = chars.get(start + 2..)?;
    let end = start + 2 + body.iter().position(|&c| c == '*')?;
    (end > start + 2 && chars.get(end + 1) == Some(&'*')).then_some(end)
}

// =============================================================================
// Stage 2: emphasis
// =============================================================================

/// One lexing unit for the emphasis stage: a literal character or an
/// already-built node that counts as non-marker content.
#[derive(Clone, Copy)]
enum Piece<'a> {
    Char(char),
    Node(&'a Inline),
}

impl Piece<'_> {
    fn is_marker(&self) -> bool {
        matches!(self, Piece::Char('*'))
    }
}

/// Wrap `*emphasis*` pairs found in the literal runs of `nodes`.
///
/// Existing nodes are opaque content: `*a **b** c*` yields an emphasis span
/// containing a strong span.
pub fn emphasis_pass(nodes: &[Inline]) -> Vec<Inline> {
    let pieces = lex_pieces(nodes);
    let mut out = Vec::new();
    let mut literal_from = 0;
    let mut i = 0;

    while i < pieces.len() {
        if let Some(end) = emphasis_close(&pieces, i) {
            out.extend(group(&pieces[literal_from..i]));
            out.push(Inline::Emphasis(group(&pieces[i + 1..end])));
            i = end + 1;
            literal_from = i;
        } else {
            i += 1;
        }
    }
    out.extend(group(&pieces[literal_from..]));
    out
}

fn lex_pieces(nodes: &[Inline]) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    for node in nodes {
        match node {
            Inline::Text(text) => pieces.extend(text.chars().map(Piece::Char)),
            other => pieces.push(Piece::Node(other)),
        }
    }
    pieces
}

fn emphasis_close(pieces: &[Piece<'_>], start: usize) -> Option<usize> {
    if !pieces.get(start)?.is_marker() {
        return None;
    }
    let end = start + 1 + pieces[start + 1..].iter().position(Piece::is_marker)?;
    (end > start + 1).then_some(end)
}

/// Rebuild nodes from pieces, merging adjacent characters into text.
fn group(pieces: &[Piece<'_>]) -> Vec<Inline> {
    let mut nodes = Vec::new();
    let mut literal = String::new();
    for piece in pieces {
        match piece {
            Piece::Char(c) => literal.push(*c),
            Piece::Node(node) => {
                flush_text(&mut literal, &mut nodes);
                nodes.push((*node).clone());
            }
        }
    }
    flush_text(&mut literal, &mut nodes);
    nodes
}

fn flush_text(literal: &mut String, nodes: &mut Vec<Inline>) {
    if !literal.is_empty() {
        nodes.push(Inline::Text(std::mem::take(literal)));
    }
}

// =============================================================================
// Stage 3: render
// =============================================================================

/// Render nodes to markup: escaping, bullets and line breaks.
///
/// A bullet prefix is only recognised at the very start of a line; a line
/// that opens with a tag does not start with `- `.
pub fn render(nodes: &[Inline]) -> String {
    let mut out = String::new();
    let mut line_start = true;
    render_nodes(nodes, &mut out, &mut line_start);
    out
}

fn render_nodes(nodes: &[Inline], out: &mut String, line_start: &mut bool) {
    for node in nodes {
        match node {
            Inline::Text(text) => render_text(text, out, line_start),
            Inline::Strong(text) => {
                out.push_str("<strong>");
                *line_start = false;
                render_text(text, out, line_start);
                out.push_str("</strong>");
                *line_start = false;
            }
            Inline::Emphasis(children) => {
                out.push_str("<em>");
                *line_start = false;
                render_nodes(children, out, line_start);
                out.push_str("</em>");
                *line_start = false;
            }
        }
    }
}

fn render_text(text: &str, out: &mut String, line_start: &mut bool) {
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if *line_start && (rest.starts_with("- ") || rest.starts_with("* ")) {
            out.push_str(BULLET);
            rest = &rest[2..];
            *line_start = false;
            continue;
        }
        if c == '\n' {
            out.push_str(LINE_BREAK);
            *line_start = true;
        } else {
            push_escaped(c, out);
            *line_start = false;
        }
        rest = &rest[c.len_utf8()..];
    }
}

/// Escape a single character for HTML text or attribute context.
pub(crate) fn push_escaped(c: char, out: &mut String) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        other => out.push(other),
    }
}

/// Escape a whole string for HTML text or attribute context.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(c, &mut out);
    }
    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ---- End to end ----

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(format_message("Hello there"), "Hello there");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format_message(""), "");
    }

    #[test]
    fn test_bold() {
        assert_eq!(
            format_message("**Eligibility**: small farmers"),
            "<strong>Eligibility</strong>: small farmers"
        );
    }

    #[test]
    fn test_italic() {
        assert_eq!(format_message("an *important* note"), "an <em>important</em> note");
    }

    #[test]
    fn test_bold_and_italic_leave_no_markers() {
        let out = format_message("**PM-KISAN** gives *Rs 6000* per year");
        assert_eq!(
            out,
            "<strong>PM-KISAN</strong> gives <em>Rs 6000</em> per year"
        );
        assert!(!out.contains('*'));
    }

    #[test]
    fn test_multiple_bold_spans() {
        assert_eq!(
            format_message("**a** and **b**"),
            "<strong>a</strong> and <strong>b</strong>"
        );
    }

    #[test]
    fn test_emphasis_can_wrap_strong() {
        assert_eq!(
            format_message("*see **Form 16** first*"),
            "<em>see <strong>Form 16</strong> first</em>"
        );
    }

    #[test]
    fn test_unmatched_single_marker_is_literal() {
        assert_eq!(format_message("5 * 3 = 15"), "5 * 3 = 15");
    }

    #[test]
    fn test_odd_marker_count_degrades() {
        assert_eq!(format_message("*a*b*"), "<em>a</em>b*");
    }

    #[test]
    fn test_marker_only_inputs() {
        assert_eq!(format_message("*"), "*");
        assert_eq!(format_message("**"), "**");
        assert_eq!(format_message("****"), "****");
    }

    #[test]
    fn test_triple_marker_prefers_later_pair() {
        assert_eq!(format_message("***a**"), "*<strong>a</strong>");
    }

    #[test]
    fn test_unclosed_bold() {
        assert_eq!(format_message("**open only"), "**open only");
    }

    #[test]
    fn test_bullets() {
        assert_eq!(
            format_message("Documents:\n- Aadhaar\n- Land records"),
            "Documents:<br>• Aadhaar<br>• Land records"
        );
    }

    #[test]
    fn test_single_star_bullet_when_unpaired() {
        assert_eq!(format_message("* only item"), "• only item");
    }

    #[test]
    fn test_star_bullets_pair_up_as_emphasis_first() {
        // The emphasis stage runs before bullets, so two star-prefixed lines
        // pair up across the newline.
        assert_eq!(format_message("* a\n* b"), "<em> a<br></em> b");
    }

    #[test]
    fn test_numbered_list_passes_through() {
        assert_eq!(
            format_message("1. Apply online\n2. Verify"),
            "1. Apply online<br>2. Verify"
        );
    }

    #[test]
    fn test_dash_mid_line_is_not_bullet() {
        assert_eq!(format_message("PM - KISAN"), "PM - KISAN");
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(format_message("a\n\nb\n"), "a<br><br>b<br>");
    }

    #[test]
    fn test_line_opening_with_tag_is_not_bullet() {
        assert_eq!(format_message("**x**- y"), "<strong>x</strong>- y");
    }

    #[test]
    fn test_bullet_inside_strong_span() {
        assert_eq!(
            format_message("**Steps\n- register**"),
            "<strong>Steps<br>• register</strong>"
        );
    }

    #[test]
    fn test_html_is_escaped() {
        assert_eq!(
            format_message("<script>alert('x')</script> & \"q\""),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; &quot;q&quot;"
        );
    }

    #[test]
    fn test_escape_inside_emphasis() {
        assert_eq!(format_message("**<b>**"), "<strong>&lt;b&gt;</strong>");
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            format_message("**किसान** योजना\n- लाभ"),
            "<strong>किसान</strong> योजना<br>• लाभ"
        );
    }

    // ---- Stages in isolation ----

    #[test]
    fn test_strong_pass_nodes() {
        assert_eq!(
            strong_pass("a **b** c"),
            vec![
                Inline::Text("a ".to_string()),
                Inline::Strong("b".to_string()),
                Inline::Text(" c".to_string()),
            ]
        );
    }

    #[test]
    fn test_strong_pass_leaves_single_markers() {
        assert_eq!(
            strong_pass("*a*"),
            vec![Inline::Text("*a*".to_string())]
        );
    }

    #[test]
    fn test_emphasis_pass_nodes() {
        let nodes = emphasis_pass(&strong_pass("x *y* z"));
        assert_eq!(
            nodes,
            vec![
                Inline::Text("x ".to_string()),
                Inline::Emphasis(vec![Inline::Text("y".to_string())]),
                Inline::Text(" z".to_string()),
            ]
        );
    }

    #[test]
    fn test_emphasis_pass_keeps_strong_opaque() {
        let nodes = emphasis_pass(&strong_pass("**a** *b*"));
        assert_eq!(
            nodes,
            vec![
                Inline::Strong("a".to_string()),
                Inline::Text(" ".to_string()),
                Inline::Emphasis(vec![Inline::Text("b".to_string())]),
            ]
        );
    }

    #[test]
    fn test_render_only_escapes_and_breaks() {
        let nodes = vec![Inline::Text("- a\n<b>".to_string())];
        assert_eq!(render(&nodes), "• a<br>&lt;b&gt;");
    }

    #[test]
    fn test_escape_helper() {
        assert_eq!(escape("a&b"), "a&amp;b");
        assert_eq!(escape("plain"), "plain");
    }
}
