//! Sentinel Region Stripper.
//!
//! Templates mark removable regions with comment-embedded markers:
//!
//! ```text
//! // @nodeinit:begin socket-import      delimited region, marker lines included
//! import { Server } from 'socket.io'
//! // @nodeinit:end socket-import
//!
//! /**
//!  * doc comment                         block region: starts at the comment
//!  */                                    block directly above the marker
//! // @nodeinit:block socket-io
//! static socketIO(event: string) {       signature: next non-blank line
//!     ...                                ends where brace depth returns to 0
//! }
//! ```
//!
//! Only the marker text matters, so `#` and `<!-- -->` comments work too.
//! All positions are 0-based line indices; errors report 1-based lines.

use crate::error::MarkerError;
use crate::lexer;

/// Every marker starts with this.
pub const MARKER_PREFIX: &str = "@nodeinit:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Begin,
    End,
    Block,
}

/// A parsed marker line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker<'a> {
    pub kind: MarkerKind,
    pub name: &'a str,
}

/// Inclusive range of line indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

// ---------------------------------------------------------------------------
// 1. Parsing
// ---------------------------------------------------------------------------

/// Parse the marker on `line`, if there is a well-formed one.
pub fn parse_marker(line: &str) -> Option<Marker<'_>> {
    let idx = line.find(MARKER_PREFIX)?;
    let rest = &line[idx + MARKER_PREFIX.len()..];
    let (kind, rest) = if let Some(r) = rest.strip_prefix("begin") {
        (MarkerKind::Begin, r)
    } else if let Some(r) = rest.strip_prefix("end") {
        (MarkerKind::End, r)
    } else if let Some(r) = rest.strip_prefix("block") {
        (MarkerKind::Block, r)
    } else {
        return None;
    };
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    if len == 0 {
        return None;
    }
    Some(Marker {
        kind,
        name: &rest[..len],
    })
}

/// Lines (1-based) that mention the marker prefix at all, well-formed or not.
pub fn residual_markers(text: &str) -> Vec<(usize, String)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| line.contains(MARKER_PREFIX))
        .map(|(idx, line)| (idx + 1, line.trim().to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// 2. Locating regions
// ---------------------------------------------------------------------------

/// Every occurrence of region `name` in `text`.
///
/// Fails with [`MarkerError::NotFound`] when there is none.
pub fn locate(text: &str, name: &str) -> Result<Vec<LineSpan>, MarkerError> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let offsets = line_offsets(&lines);
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        let Some(marker) = parse_marker(line) else {
            continue;
        };
        if marker.name != name {
            continue;
        }
        match marker.kind {
            MarkerKind::Begin => {
                if open.is_some() {
                    return Err(MarkerError::Duplicate {
                        name: name.to_string(),
                        line: idx + 1,
                    });
                }
                open = Some(idx);
            }
            MarkerKind::End => match open.take() {
                Some(start) => spans.push(LineSpan { start, end: idx }),
                None => {
                    return Err(MarkerError::Unbalanced {
                        name: name.to_string(),
                        line: idx + 1,
                    })
                }
            },
            MarkerKind::Block => {
                spans.push(block_span(text, &lines, &offsets, idx, name)?);
            }
        }
    }

    if let Some(start) = open {
        return Err(MarkerError::Unbalanced {
            name: name.to_string(),
            line: start + 1,
        });
    }
    if spans.is_empty() {
        return Err(MarkerError::NotFound {
            name: name.to_string(),
        });
    }
    tracing::debug!("located {} occurrence(s) of region '{}'", spans.len(), name);
    Ok(spans)
}

/// Like [`locate`] but an absent region is an empty list.
pub fn locate_optional(text: &str, name: &str) -> Result<Vec<LineSpan>, MarkerError> {
    match locate(text, name) {
        Err(MarkerError::NotFound { .. }) => Ok(Vec::new()),
        other => other,
    }
}

fn block_span(
    text: &str,
    lines: &[&str],
    offsets: &[usize],
    marker_idx: usize,
    name: &str,
) -> Result<LineSpan, MarkerError> {
    let unbalanced = || MarkerError::Unbalanced {
        name: name.to_string(),
        line: marker_idx + 1,
    };

    let signature = (marker_idx + 1..lines.len())
        .find(|&i| !lines[i].trim().is_empty())
        .ok_or_else(unbalanced)?;

    let mut start = marker_idx;
    while start > 0 && is_comment_line(lines[start - 1]) && parse_marker(lines[start - 1]).is_none()
    {
        start -= 1;
    }

    let from = offsets[signature];
    let close = lexer::matching_brace_end(&text[from..]).ok_or_else(unbalanced)? + from;
    let brace = close - 1;
    let end = match offsets.binary_search(&brace) {
        Ok(i) => i,
        Err(i) => i - 1,
    };
    Ok(LineSpan { start, end })
}

fn is_comment_line(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("//") || t.starts_with("/*") || t.starts_with('*')
}

fn line_offsets(lines: &[&str]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(lines.len());
    let mut acc = 0;
    for line in lines {
        offsets.push(acc);
        acc += line.len();
    }
    offsets
}

// ---------------------------------------------------------------------------
// 3. Removal
// ---------------------------------------------------------------------------

/// Remove every line covered by `spans`.
///
/// Spans that overlap, touch, or are separated only by blank lines are
/// merged first. A merged span then absorbs one neighbouring blank line so
/// removals never leave doubled blank lines or a blank line in front of a
/// closing bracket. Spans are removed in descending start order.
pub fn remove_spans(text: &str, spans: &[LineSpan]) -> String {
    if spans.is_empty() {
        return text.to_string();
    }
    let mut lines: Vec<&str> = text.split_inclusive('\n').collect();
    let merged = merge(&lines, spans.to_vec());
    let absorbed: Vec<LineSpan> = merged.iter().map(|s| absorb_blank(&lines, *s)).collect();
    let mut final_spans = merge(&lines, absorbed);
    final_spans.sort_by(|a, b| b.start.cmp(&a.start));

    for span in final_spans {
        lines.drain(span.start..=span.end);
    }
    lines.concat()
}

fn merge(lines: &[&str], mut spans: Vec<LineSpan>) -> Vec<LineSpan> {
    let line_count = lines.len();
    spans.retain(|s| s.start <= s.end && s.start < line_count);
    spans.sort();
    let mut out: Vec<LineSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        let end = span.end.min(line_count.saturating_sub(1));
        match out.last_mut() {
            Some(last)
                if span.start <= last.end + 1
                    || lines[last.end + 1..span.start]
                        .iter()
                        .all(|l| l.trim().is_empty()) =>
            {
                last.end = last.end.max(end)
            }
            _ => out.push(LineSpan {
                start: span.start,
                end,
            }),
        }
    }
    out
}

fn absorb_blank(lines: &[&str], span: LineSpan) -> LineSpan {
    let blank = |i: usize| lines[i].trim().is_empty();
    let prev = span.start.checked_sub(1);
    let next = span.end + 1;
    let next_exists = next < lines.len();

    let prev_blank = prev.map_or(true, blank);
    let prev_opens = prev.map_or(false, |p| {
        lines[p].trim_end().ends_with(['{', '(', '['])
    });

    if next_exists && blank(next) && (prev_blank || prev_opens) {
        return LineSpan {
            start: span.start,
            end: next,
        };
    }
    if let Some(p) = prev {
        let next_closes = !next_exists || lines[next].trim_start().starts_with(['}', ')', ']']);
        if blank(p) && next_closes {
            return LineSpan {
                start: p,
                end: span.end,
            };
        }
    }
    span
}

/// Strip every occurrence of region `name`. Fails when it is absent.
pub fn strip(text: &str, name: &str) -> Result<String, MarkerError> {
    let spans = locate(text, name)?;
    Ok(remove_spans(text, &spans))
}

/// Strip region `name` if present; an absent region leaves `text` untouched.
pub fn strip_optional(text: &str, name: &str) -> Result<String, MarkerError> {
    let spans = locate_optional(text, name)?;
    Ok(remove_spans(text, &spans))
}

/// Delete every remaining marker line, keeping the region contents.
pub fn sweep(text: &str) -> String {
    text.split_inclusive('\n')
        .filter(|line| parse_marker(line).is_none())
        .collect()
}

/// Check that every delimited region in `text` is balanced.
pub fn check_balance(text: &str) -> Result<(), MarkerError> {
    let mut open: Vec<(&str, usize)> = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        match parse_marker(line) {
            Some(Marker {
                kind: MarkerKind::Begin,
                name,
            }) => {
                if open.iter().any(|(n, _)| *n == name) {
                    return Err(MarkerError::Duplicate {
                        name: name.to_string(),
                        line: idx + 1,
                    });
                }
                open.push((name, idx + 1));
            }
            Some(Marker {
                kind: MarkerKind::End,
                name,
            }) => match open.iter().rposition(|(n, _)| *n == name) {
                Some(pos) => {
                    open.remove(pos);
                }
                None => {
                    return Err(MarkerError::Unbalanced {
                        name: name.to_string(),
                        line: idx + 1,
                    })
                }
            },
            _ => {}
        }
    }
    match open.first() {
        Some((name, line)) => Err(MarkerError::Unbalanced {
            name: name.to_string(),
            line: *line,
        }),
        None => Ok(()),
    }
}
