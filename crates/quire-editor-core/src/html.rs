//! Minimal HTML fragment parsing and serialization.
//!
//! Handles the well-formed fragments the editor produces: nested elements,
//! quoted and unquoted attributes, void tags, comments and the common
//! entities. Unbalanced closing tags are ignored.

use std::convert::Infallible;
use std::fmt;

use markdown_weaver_escape::{StrWrite, escape_html_body_text};
use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Fragment {
    Element {
        tag: SmolStr,
        attributes: Vec<(SmolStr, String)>,
        children: Vec<Fragment>,
    },
    Text(String),
}

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

type OpenElement = (SmolStr, Vec<(SmolStr, String)>, Vec<Fragment>);

pub(crate) fn parse_fragment(input: &str) -> Vec<Fragment> {
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut top: Vec<Fragment> = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = match after.find("-->") {
                Some(end) => &after[end + 3..],
                None => "",
            };
            continue;
        }

        if let Some(after) = rest.strip_prefix("</") {
            let end = after.find('>').unwrap_or(after.len());
            let tag = after[..end].trim().to_ascii_lowercase();
            rest = after.get(end + 1..).unwrap_or("");
            if let Some(pos) = stack.iter().rposition(|(t, _, _)| t == tag.as_str()) {
                while stack.len() > pos {
                    close_top(&mut stack, &mut top);
                }
            }
            continue;
        }

        if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            if let Some((tag, attributes, self_closing, remaining)) = parse_open_tag(&rest[1..]) {
                rest = remaining;
                if self_closing || is_void(&tag) {
                    push(
                        &mut stack,
                        &mut top,
                        Fragment::Element {
                            tag,
                            attributes,
                            children: Vec::new(),
                        },
                    );
                } else {
                    stack.push((tag, attributes, Vec::new()));
                }
                continue;
            }
        }

        // Text runs to the next tag. A stray '<' is kept as text.
        let skip = usize::from(rest.starts_with('<'));
        let end = rest[skip..]
            .find('<')
            .map(|i| i + skip)
            .unwrap_or(rest.len());
        push(
            &mut stack,
            &mut top,
            Fragment::Text(decode_entities(&rest[..end])),
        );
        rest = &rest[end..];
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut top);
    }
    top
}

fn push(stack: &mut [OpenElement], top: &mut Vec<Fragment>, fragment: Fragment) {
    let target = match stack.last_mut() {
        Some((_, _, children)) => children,
        None => top,
    };
    if let (Fragment::Text(new), Some(Fragment::Text(prev))) = (&fragment, target.last_mut()) {
        prev.push_str(new);
        return;
    }
    target.push(fragment);
}

fn close_top(stack: &mut Vec<OpenElement>, top: &mut Vec<Fragment>) {
    if let Some((tag, attributes, children)) = stack.pop() {
        push(
            stack,
            top,
            Fragment::Element {
                tag,
                attributes,
                children,
            },
        );
    }
}

/// Parse `name attr="v" ...>` (after the opening `<`).
fn parse_open_tag(s: &str) -> Option<(SmolStr, Vec<(SmolStr, String)>, bool, &str)> {
    let name_end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(s.len());
    let tag = SmolStr::new(s[..name_end].to_ascii_lowercase());
    let mut rest = &s[name_end..];
    let mut attributes = Vec::new();

    loop {
        rest = rest.trim_start();
        if let Some(r) = rest.strip_prefix("/>") {
            return Some((tag, attributes, true, r));
        }
        if let Some(r) = rest.strip_prefix('>') {
            return Some((tag, attributes, false, r));
        }
        if rest.is_empty() {
            return None;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        if name_end == 0 {
            // Stray '/' or '='.
            rest = &rest[1..];
            continue;
        }
        let name = SmolStr::new(rest[..name_end].to_ascii_lowercase());
        rest = rest[name_end..].trim_start();

        let value = if let Some(r) = rest.strip_prefix('=') {
            let r = r.trim_start();
            match r.chars().next().filter(|c| *c == '"' || *c == '\'') {
                Some(quote) => {
                    let body = &r[1..];
                    let end = body.find(quote).unwrap_or(body.len());
                    rest = body.get(end + 1..).unwrap_or("");
                    decode_entities(&body[..end])
                }
                None => {
                    let end = r
                        .find(|c: char| c.is_whitespace() || c == '>')
                        .unwrap_or(r.len());
                    rest = &r[end..];
                    decode_entities(&r[..end])
                }
            }
        } else {
            String::new()
        };
        attributes.push((name, value));
    }
}

pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let decoded = rest
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// `StrWrite` sink appending to a borrowed `String`.
struct MarkupWriter<'a>(&'a mut String);

impl StrWrite for MarkupWriter<'_> {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.0.push_str(s);
        Ok(())
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), Self::Error> {
        self.0.push_str(&args.to_string());
        Ok(())
    }
}

/// Append text-node content, escaping `&`, `<` and `>`.
pub(crate) fn write_text(out: &mut String, s: &str) {
    let Ok(()) = escape_html_body_text(MarkupWriter(out), s);
}

/// Append a double-quoted attribute value.
pub(crate) fn write_attribute(out: &mut String, s: &str) {
    let Ok(()) = markdown_weaver_escape::escape_html(MarkupWriter(out), s);
}

/// Escape text for inclusion in markup.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    write_text(&mut out, s);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let parsed = parse_fragment("<p class=\"x\">a<b>b</b></p>");
        assert_eq!(
            parsed,
            vec![Fragment::Element {
                tag: "p".into(),
                attributes: vec![("class".into(), "x".to_string())],
                children: vec![
                    Fragment::Text("a".to_string()),
                    Fragment::Element {
                        tag: "b".into(),
                        attributes: vec![],
                        children: vec![Fragment::Text("b".to_string())],
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_parse_void_and_comment() {
        let parsed = parse_fragment("<span><!-- --></span><br>x");
        assert_eq!(parsed.len(), 3);
        assert!(matches!(&parsed[0], Fragment::Element { children, .. } if children.is_empty()));
        assert!(matches!(&parsed[1], Fragment::Element { tag, .. } if tag == "br"));
        assert_eq!(parsed[2], Fragment::Text("x".to_string()));
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let parsed = parse_fragment("a < b");
        assert_eq!(parsed, vec![Fragment::Text("a < b".to_string())]);
    }

    #[test]
    fn test_entities() {
        assert_eq!(decode_entities("&lt;p&gt; &amp; &#8226; &#x200b;"), "<p> & \u{2022} \u{200b}");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
    }

    #[test]
    fn test_unquoted_and_bare_attributes() {
        let parsed = parse_fragment("<input type=checkbox checked>");
        assert_eq!(
            parsed,
            vec![Fragment::Element {
                tag: "input".into(),
                attributes: vec![
                    ("type".into(), "checkbox".to_string()),
                    ("checked".into(), String::new()),
                ],
                children: vec![],
            }]
        );
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_html("<b>fish & chips</b>"), "&lt;b&gt;fish &amp; chips&lt;/b&gt;");

        let mut out = String::new();
        write_attribute(&mut out, r#"say "hi" & go"#);
        assert_eq!(out, "say &quot;hi&quot; &amp; go");
        assert_eq!(decode_entities(&out), r#"say "hi" & go"#);
    }
}
