//! Reference Rewriter.
//!
//! Rewrites are anchored on lexed tokens, never on raw substrings. A
//! pattern only ever matches a whole string literal (or a whole member
//! name), so prose in comments and unrelated strings is left alone.

use glob::{MatchOptions, Pattern};

use crate::lexer::{segments, Segment, SegmentKind};

/// Which tokens a rewrite may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefScope {
    /// Specifiers of `import .. from`, side-effect `import`, `require(..)`
    /// and dynamic `import(..)`.
    ImportPath,
    /// Any complete `'..'` / `".."` literal, or a template literal without
    /// interpolation.
    StringLiteral,
    /// The name in a `.name(` call site.
    MemberCall,
}

/// Path-shaped glob: `*` matches any run of characters within one
/// `/`-separated segment. A pattern must match the whole token. A pattern
/// that does not compile as a glob is compared literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    glob: Option<Pattern>,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl PathPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        let source = pattern.into();
        let glob = Pattern::new(&source).ok();
        Self { source, glob }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match &self.glob {
            Some(glob) => glob.matches_with(candidate, MATCH_OPTIONS),
            None => self.source == candidate,
        }
    }
}

impl From<&str> for PathPattern {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Rewrite every token in `scope` matching `from` to `to`.
///
/// Returns the new text and the number of replacements made.
pub fn rewrite(text: &str, from: &PathPattern, to: &str, scope: RefScope) -> (String, usize) {
    let ranges: Vec<(usize, usize)> = match scope {
        RefScope::ImportPath => import_specifiers(text)
            .into_iter()
            .filter(|s| from.matches(s.text(text)))
            .map(|s| (s.start, s.end))
            .collect(),
        RefScope::StringLiteral => segments(text)
            .into_iter()
            .filter(|s| is_plain_string(s, text) && from.matches(s.text(text)))
            .map(|s| (s.start, s.end))
            .collect(),
        RefScope::MemberCall => member_calls(text)
            .into_iter()
            .filter(|(start, end)| from.matches(&text[*start..*end]))
            .collect(),
    };

    let count = ranges.len();
    let mut out = text.to_string();
    for (start, end) in ranges.into_iter().rev() {
        out.replace_range(start..end, to);
    }
    if count > 0 {
        tracing::debug!("rewrote {} reference(s) '{}' -> '{}'", count, from.as_str(), to);
    }
    (out, count)
}

fn is_plain_string(seg: &Segment, text: &str) -> bool {
    match seg.kind {
        SegmentKind::Str { quote: '`' } => !seg.text(text).contains("${"),
        SegmentKind::Str { .. } => true,
        _ => false,
    }
}

/// String segments that are module specifiers.
pub fn import_specifiers(text: &str) -> Vec<Segment> {
    let segs = segments(text);
    let mut out = Vec::new();
    for (idx, seg) in segs.iter().enumerate() {
        if !matches!(seg.kind, SegmentKind::Str { quote: '\'' | '"' }) {
            continue;
        }
        let before = match idx.checked_sub(1).map(|i| segs[i]) {
            Some(prev) if prev.kind == SegmentKind::Code => prev.text(text).trim_end(),
            _ => continue,
        };
        if is_specifier_context(before) {
            out.push(*seg);
        }
    }
    out
}

fn is_specifier_context(code_before: &str) -> bool {
    if ends_with_word(code_before, "from") || ends_with_word(code_before, "import") {
        return true;
    }
    match code_before.strip_suffix('(') {
        Some(head) => {
            let head = head.trim_end();
            ends_with_word(head, "require") || ends_with_word(head, "import")
        }
        None => false,
    }
}

fn ends_with_word(s: &str, word: &str) -> bool {
    s.strip_suffix(word).is_some_and(|head| {
        !head
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.')
    })
}

/// Byte ranges of member names in `.name(` call sites, outside strings
/// and comments.
fn member_calls(text: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for seg in segments(text) {
        if seg.kind != SegmentKind::Code {
            continue;
        }
        let code = seg.text(text).as_bytes();
        let mut i = 0;
        while i < code.len() {
            if code[i] != b'.' {
                i += 1;
                continue;
            }
            let name_start = i + 1;
            let mut j = name_start;
            while j < code.len() && (code[j].is_ascii_alphanumeric() || code[j] == b'_' || code[j] == b'$') {
                j += 1;
            }
            let mut k = j;
            while k < code.len() && (code[k] == b' ' || code[k] == b'\t') {
                k += 1;
            }
            if j > name_start && code.get(k) == Some(&b'(') {
                out.push((seg.start + name_start, seg.start + j));
            }
            i = j.max(i + 1);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("../repositories/*.user.repository", "../repositories/mongoose.user.repository", true)]
    #[case("../repositories/*.user.repository", "../repositories/a/b.user.repository", false)]
    #[case("../repositories/*.user.repository", "../repositories/mongoose.user.repository.ts", false)]
    #[case("/api-docs", "/api-docs", true)]
    #[case("/api-docs", "/api-docs/v2", false)]
    #[case("*", "get", true)]
    #[case("./*.model", "./user.model", true)]
    #[case("GET", "get", false)]
    #[case("[unclosed", "[unclosed", true)]
    #[case("[unclosed", "u", false)]
    fn glob_semantics(#[case] pat: &str, #[case] s: &str, #[case] ok: bool) {
        assert_eq!(PathPattern::new(pat).matches(s), ok);
    }

    #[test]
    fn import_forms_are_recognised() {
        let src = "\
import a from './a'
import './side'
const b = require(\"./b\")
const c = await import('./c')
export { d } from './d'
const s = './not-an-import'
";
        let specs: Vec<&str> = import_specifiers(src).iter().map(|s| s.text(src)).collect();
        assert_eq!(specs, vec!["./a", "./side", "./b", "./c", "./d"]);
    }

    #[test]
    fn import_rewrite_ignores_doc_strings() {
        let src = "// see '../repositories/mongoose.user.repository'\nimport r from '../repositories/mongoose.user.repository'\n";
        let (out, n) = rewrite(
            src,
            &"../repositories/*.user.repository".into(),
            "../repositories/user.repository",
            RefScope::ImportPath,
        );
        assert_eq!(n, 1);
        assert!(out.starts_with("// see '../repositories/mongoose.user.repository'"));
        assert!(out.contains("from '../repositories/user.repository'"));
    }

    #[test]
    fn string_literal_rewrite_is_whole_literal_only() {
        let src = "// mounted at /api-docs\napp.use('/api-docs', x)\nconst u = '/api-docs/extra'\n";
        let (out, n) = rewrite(src, &"/api-docs".into(), "/docs", RefScope::StringLiteral);
        assert_eq!(n, 1);
        assert_eq!(
            out,
            "// mounted at /api-docs\napp.use('/docs', x)\nconst u = '/api-docs/extra'\n"
        );
    }

    #[test]
    fn member_call_rewrite_keeps_other_members() {
        let src = "P.get(router, '/x')\nP.getAll(router)\nrouter.get ('/y')\nconst s = 'a.get('\n";
        let (out, n) = rewrite(src, &"get".into(), "post", RefScope::MemberCall);
        assert_eq!(n, 2);
        assert_eq!(
            out,
            "P.post(router, '/x')\nP.getAll(router)\nrouter.post ('/y')\nconst s = 'a.get('\n"
        );
    }
}
