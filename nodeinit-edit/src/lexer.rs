//! Minimal JavaScript/TypeScript lexer.
//!
//! Splits source text into code, comment, string-literal and regex-literal
//! segments. That is all the editing primitives need: braces are only
//! counted in code, import specifiers are only looked for in strings, member
//! calls only in code.
//!
//! A `/` starts a regex literal when the code before it cannot end an
//! operand: start of input, an operator or opening punctuation, or a keyword
//! such as `return`. Anywhere else it is division.

/// Kind of a lexed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Code,
    Comment,
    /// A string literal. `quote` is `'`, `"` or `` ` ``.
    Str { quote: char },
    /// A regex literal, slashes and flags included.
    Regex,
}

/// A byte range of the source. For strings, `start..end` covers the
/// content between the quotes, quotes excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }
}

/// Lex `src` into consecutive segments.
///
/// Unterminated `'` and `"` strings end at the newline; unterminated
/// template literals and block comments run to the end of the input.
pub fn segments(src: &str) -> Vec<Segment> {
    let bytes = src.as_bytes();
    let mut out = Vec::new();
    let mut code_start = 0;
    let mut i = 0;

    let flush = |out: &mut Vec<Segment>, from: usize, to: usize| {
        if to > from {
            out.push(Segment {
                kind: SegmentKind::Code,
                start: from,
                end: to,
            });
        }
    };

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                flush(&mut out, code_start, i);
                let end = src[i..].find('\n').map_or(bytes.len(), |n| i + n);
                out.push(Segment {
                    kind: SegmentKind::Comment,
                    start: i,
                    end,
                });
                i = end;
                code_start = i;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                flush(&mut out, code_start, i);
                let end = src[i + 2..].find("*/").map_or(bytes.len(), |n| i + 2 + n + 2);
                out.push(Segment {
                    kind: SegmentKind::Comment,
                    start: i,
                    end,
                });
                i = end;
                code_start = i;
            }
            b'/' if regex_allowed(&src[..i]) => match regex_end(bytes, i) {
                Some(end) => {
                    flush(&mut out, code_start, i);
                    out.push(Segment {
                        kind: SegmentKind::Regex,
                        start: i,
                        end,
                    });
                    i = end;
                    code_start = i;
                }
                None => i += 1,
            },
            q @ (b'\'' | b'"' | b'`') => {
                flush(&mut out, code_start, i);
                let content_start = i + 1;
                let mut j = content_start;
                let mut closed = false;
                while j < bytes.len() {
                    match bytes[j] {
                        b'\\' => j += 2,
                        b'\n' if q != b'`' => break,
                        c if c == q => {
                            closed = true;
                            break;
                        }
                        _ => j += 1,
                    }
                }
                let content_end = j.min(bytes.len());
                out.push(Segment {
                    kind: SegmentKind::Str { quote: q as char },
                    start: content_start,
                    end: content_end,
                });
                i = if closed { content_end + 1 } else { content_end };
                code_start = i;
            }
            _ => i += 1,
        }
    }
    flush(&mut out, code_start, bytes.len());
    out
}

const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "case", "in", "of", "delete", "void", "throw", "new",
    "yield", "await", "else", "do",
];

fn regex_allowed(before: &str) -> bool {
    let before = before.trim_end();
    match before.bytes().last() {
        None => true,
        Some(b')' | b']' | b'}' | b'\'' | b'"' | b'`') => false,
        Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' => {
            let word = before
                .rsplit(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
                .next()
                .unwrap_or_default();
            REGEX_KEYWORDS.contains(&word)
        }
        Some(_) => true,
    }
}

/// End of the regex literal opening at `start`, flags included. `None`
/// when the line ends before the closing slash.
fn regex_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut j = start + 1;
    let mut in_class = false;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return None,
            b'[' => {
                in_class = true;
                j += 1;
            }
            b']' => {
                in_class = false;
                j += 1;
            }
            b'/' if !in_class => {
                j += 1;
                while j < bytes.len() && bytes[j].is_ascii_alphabetic() {
                    j += 1;
                }
                return Some(j);
            }
            _ => j += 1,
        }
    }
    None
}

/// Byte offset just past the brace that closes the first `{` in `src`.
///
/// Braces inside strings and comments are ignored. `None` when the first
/// brace never closes, or when there is no brace at all.
pub fn matching_brace_end(src: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut opened = false;
    for seg in segments(src) {
        if seg.kind != SegmentKind::Code {
            continue;
        }
        for (off, b) in seg.text(src).bytes().enumerate() {
            match b {
                b'{' => {
                    depth += 1;
                    opened = true;
                }
                b'}' if opened => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(seg.start + off + 1);
                    }
                }
                _ => {}
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(SegmentKind, &str)> {
        segments(src).into_iter().map(|s| (s.kind, s.text(src))).collect()
    }

    #[test]
    fn strings_and_comments_are_separated() {
        let src = "import x from './a' // see '}'\n";
        let segs = kinds(src);
        assert_eq!(segs[0], (SegmentKind::Code, "import x from "));
        assert_eq!(segs[1], (SegmentKind::Str { quote: '\'' }, "./a"));
        assert_eq!(segs[3], (SegmentKind::Comment, "// see '}'"));
    }

    #[test]
    fn escaped_quote_stays_in_string() {
        let src = r#"const s = "a\"b"; x"#;
        let segs = kinds(src);
        assert_eq!(segs[1], (SegmentKind::Str { quote: '"' }, r#"a\"b"#));
        assert_eq!(segs[2], (SegmentKind::Code, "; x"));
    }

    #[test]
    fn template_literal_spans_lines() {
        let src = "const t = `a\n{b`\n}";
        let segs = kinds(src);
        assert_eq!(segs[1], (SegmentKind::Str { quote: '`' }, "a\n{b"));
    }

    #[test]
    fn brace_end_skips_nested_literals() {
        let src = "f() {\n  const o = { a: 1 }\n  log('}')\n}\nafter";
        let end = matching_brace_end(src).expect("closes");
        assert_eq!(&src[end..], "\nafter");
    }

    #[test]
    fn regex_literals_hide_quotes_and_braces() {
        let src = "clean(s) {\n  return s.replace(/'/g, '').replace(/[{}]/g, '')\n}\nafter";
        let segs = kinds(src);
        assert!(segs.contains(&(SegmentKind::Regex, "/'/g")));
        assert!(segs.contains(&(SegmentKind::Regex, "/[{}]/g")));
        let end = matching_brace_end(src).expect("closes");
        assert_eq!(&src[end..], "\nafter");
    }

    #[test]
    fn division_is_not_a_regex() {
        let src = "const r = total / count / 2; const h = (a) / b";
        assert!(segments(src).iter().all(|s| s.kind == SegmentKind::Code));
    }

    #[test]
    fn regex_after_keyword() {
        let src = "if (x) return /^\\d+$/.test(x)";
        assert!(kinds(src).contains(&(SegmentKind::Regex, "/^\\d+$/")));
    }

    #[test]
    fn brace_end_none_when_unclosed() {
        assert_eq!(matching_brace_end("f() {\n  {\n}"), None);
        assert_eq!(matching_brace_end("no braces"), None);
    }
}
