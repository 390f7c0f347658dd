//! Comment and whitespace stripping for CSS and JavaScript.
//!
//! This is not a full minifier: no renaming, no syntax tree. It does track
//! string literals, template literals, regular expression literals and CSS
//! `url(...)` so that `//` or `/*` inside them is never taken for a comment.
//! `/*! ... */` license comments are kept. JavaScript line breaks are kept
//! where automatic semicolon insertion might depend on them.

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    out: String,
}

impl Scanner {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            out: String::with_capacity(source.len()),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek(0) {
            self.out.push(c);
            self.pos += 1;
        }
    }

    fn last_out(&self) -> Option<char> {
        self.out.chars().last()
    }

    fn at_gap(&self, line_comments: bool) -> bool {
        match (self.peek(0), self.peek(1), self.peek(2)) {
            (Some(c), _, _) if c.is_whitespace() => true,
            (Some('/'), Some('*'), third) => third != Some('!'),
            (Some('/'), Some('/'), _) => line_comments,
            _ => false,
        }
    }

    /// Consumes whitespace and droppable comments. Returns whether a line
    /// break was crossed.
    fn skip_gap(&mut self, line_comments: bool) -> bool {
        let mut newline = false;
        while self.at_gap(line_comments) {
            match self.peek(0) {
                Some('/') if self.peek(1) == Some('*') => {
                    self.pos += 2;
                    while let Some(ch) = self.peek(0) {
                        if ch == '*' && self.peek(1) == Some('/') {
                            self.pos += 2;
                            break;
                        }
                        newline |= ch == '\n';
                        self.pos += 1;
                    }
                }
                Some('/') => {
                    while let Some(ch) = self.peek(0) {
                        if ch == '\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(ch) => {
                    newline |= ch == '\n';
                    self.pos += 1;
                }
                None => break,
            }
        }
        newline
    }

    fn copy_quoted(&mut self, quote: char) {
        self.bump();
        while let Some(ch) = self.peek(0) {
            match ch {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                // unterminated literal
                '\n' => return,
                c if c == quote => {
                    self.bump();
                    return;
                }
                _ => self.bump(),
            }
        }
    }

    fn copy_block_comment(&mut self) {
        self.bump();
        self.bump();
        while let Some(ch) = self.peek(0) {
            self.bump();
            if ch == '*' && self.peek(0) == Some('/') {
                self.bump();
                return;
            }
        }
    }

    fn copy_template(&mut self) {
        self.bump();
        let mut depth = 0usize;
        while let Some(ch) = self.peek(0) {
            if depth > 0 {
                match ch {
                    '"' | '\'' => {
                        self.copy_quoted(ch);
                        continue;
                    }
                    '`' => {
                        self.copy_template();
                        continue;
                    }
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
                self.bump();
                continue;
            }
            match ch {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '$' if self.peek(1) == Some('{') => {
                    self.bump();
                    self.bump();
                    depth = 1;
                }
                '`' => {
                    self.bump();
                    return;
                }
                _ => self.bump(),
            }
        }
    }

    fn copy_regex(&mut self) {
        self.bump();
        let mut in_class = false;
        while let Some(ch) = self.peek(0) {
            if ch == '\n' {
                return;
            }
            self.bump();
            match ch {
                '\\' => self.bump(),
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => return,
                _ => {}
            }
        }
    }

    fn copy_url_body(&mut self) {
        self.bump();
        while let Some(ch) = self.peek(0) {
            match ch {
                '"' | '\'' => self.copy_quoted(ch),
                ')' => {
                    self.bump();
                    return;
                }
                _ => self.bump(),
            }
        }
    }

    fn ends_with_url(&self) -> bool {
        let tail: String = self.out.chars().rev().take(3).collect();
        tail.eq_ignore_ascii_case("lru")
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || !c.is_ascii()
}

pub fn minify_css(source: &str) -> String {
    let mut s = Scanner::new(source);

    while let Some(c) = s.peek(0) {
        if s.at_gap(false) {
            s.skip_gap(false);
            if let (Some(last), Some(next)) = (s.last_out(), s.peek(0)) {
                let glue_after = matches!(last, '{' | '}' | ';' | ',' | '>' | ':' | '(');
                let glue_before = matches!(next, '{' | '}' | ';' | ',' | '>' | ')');
                if !glue_after && !glue_before {
                    s.out.push(' ');
                }
            }
            continue;
        }

        match c {
            '"' | '\'' => s.copy_quoted(c),
            '/' if s.peek(1) == Some('*') => s.copy_block_comment(),
            '(' if s.ends_with_url() => s.copy_url_body(),
            '}' => {
                if s.out.ends_with(';') {
                    s.out.pop();
                }
                s.bump();
            }
            _ => s.bump(),
        }
    }

    s.out
}

const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "of", "new", "delete", "void", "throw",
    "instanceof", "yield", "await",
];

/// Whether a `/` at this point starts a regular expression rather than a division.
fn regex_allowed(out: &str) -> bool {
    let trimmed = out.trim_end();
    match trimmed.chars().last() {
        None => true,
        Some(c) if "(,=:[!&|?{};+-*%<>~^".contains(c) => true,
        Some(c) if is_word(c) => {
            let start = trimmed
                .char_indices()
                .rev()
                .take_while(|(_, ch)| is_word(*ch))
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            REGEX_KEYWORDS.contains(&&trimmed[start..])
        }
        _ => false,
    }
}

fn js_needs_space(last: char, next: char) -> bool {
    (is_word(last) && is_word(next))
        || (last == '+' && next == '+')
        || (last == '-' && next == '-')
        || (last.is_ascii_digit() && next == '.')
}

pub fn minify_js(source: &str) -> String {
    let mut s = Scanner::new(source);

    while let Some(c) = s.peek(0) {
        if s.at_gap(true) {
            let newline = s.skip_gap(true);
            if let (Some(last), Some(next)) = (s.last_out(), s.peek(0)) {
                if newline && !matches!(last, '{' | ';' | ',') {
                    s.out.push('\n');
                } else if js_needs_space(last, next) {
                    s.out.push(' ');
                }
            }
            continue;
        }

        match c {
            '"' | '\'' => s.copy_quoted(c),
            '`' => s.copy_template(),
            '/' if s.peek(1) == Some('*') => s.copy_block_comment(),
            '/' if regex_allowed(&s.out) => s.copy_regex(),
            _ => s.bump(),
        }
    }

    s.out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_strips_comments_and_whitespace() {
        let source = "body {\n  color: red;\n  /* comment */\n  background: url(http://example.com/a.png);\n}\n";
        assert_eq!(
            minify_css(source),
            "body{color:red;background:url(http://example.com/a.png)}"
        );
    }

    #[test]
    fn test_css_keeps_comment_like_strings() {
        let source = "a::before { content: \"/* not a comment */\"; }";
        assert_eq!(
            minify_css(source),
            "a::before{content:\"/* not a comment */\"}"
        );
    }

    #[test]
    fn test_css_keeps_needed_spaces() {
        let source = "@media screen and (max-width: 600px) {\n  .a { margin: 0 auto; }\n}";
        assert_eq!(
            minify_css(source),
            "@media screen and (max-width:600px){.a{margin:0 auto}}"
        );
        // descendant pseudo-class selector must keep its space
        assert_eq!(minify_css("div :hover { x: y }"), "div :hover{x:y}");
    }

    #[test]
    fn test_css_keeps_license_comment() {
        assert_eq!(
            minify_css("/*! MIT */\n.a { b: c; }"),
            "/*! MIT */ .a{b:c}"
        );
    }

    #[test]
    fn test_js_keeps_urls_and_regex() {
        let source = "// header\nvar url = \"http://example.com\"; // trailing\nvar re = /\\/\\/+/g;\n";
        assert_eq!(
            minify_js(source),
            r#"var url="http://example.com";var re=/\/\/+/g;"#
        );
    }

    #[test]
    fn test_js_division_is_not_regex() {
        let source = "let half = total / 2; // half\nlet q = a/b/c;";
        assert_eq!(minify_js(source), "let half=total/2;let q=a/b/c;");
    }

    #[test]
    fn test_js_template_literal_untouched() {
        let source = "const t = `a // b ${x /* y */} c`;";
        assert_eq!(minify_js(source), "const t=`a // b ${x /* y */} c`;");
    }

    #[test]
    fn test_js_keeps_line_breaks_for_asi() {
        assert_eq!(minify_js("let a = 1\nlet b = 2\n"), "let a=1\nlet b=2");
    }

    #[test]
    fn test_js_operator_spacing() {
        assert_eq!(minify_js("x = a + +b"), "x=a+ +b");
        assert_eq!(minify_js("return /x/.test(s)"), "return/x/.test(s)");
        assert_eq!(minify_js("1 .toString()"), "1 .toString()");
    }

    #[test]
    fn test_js_keeps_license_comment() {
        assert_eq!(minify_js("/*! keep me */\nvar a;"), "/*! keep me */\nvar a;");
    }

    #[test]
    fn test_regex_allowed() {
        assert!(regex_allowed(""));
        assert!(regex_allowed("x = "));
        assert!(regex_allowed("return"));
        assert!(!regex_allowed("total"));
        assert!(!regex_allowed("f(a)"));
    }
}
