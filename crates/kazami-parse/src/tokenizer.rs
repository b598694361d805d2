/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Contents of a bracket pair: `[Group]`, `(1080p)`.
    Bracketed,
    /// A word outside brackets. Dashes are emitted as a lone `"-"` word.
    Word,
    /// A run of spaces, underscores or dots.
    Delimiter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn is_dash(&self) -> bool {
        self.kind == TokenKind::Word && self.text == "-"
    }
}

const BRACKETS: &[(char, char)] = &[
    ('[', ']'),
    ('(', ')'),
    ('{', '}'),
    ('\u{3010}', '\u{3011}'), // 【】
    ('\u{300C}', '\u{300D}'), // 「」
];

const EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "webm", "m4v", "ts", "wmv", "ogm", "torrent"];

fn closing_bracket(c: char) -> Option<char> {
    BRACKETS.iter().find(|(open, _)| *open == c).map(|(_, close)| *close)
}

fn is_delimiter(c: char) -> bool {
    matches!(c, ' ' | '_' | '.' | '\u{3000}')
}

fn is_dash(c: char) -> bool {
    matches!(c, '-' | '\u{2013}' | '\u{2014}')
}

/// Split a release title into tokens, returning the file extension separately.
pub fn tokenize(input: &str) -> (Vec<Token>, Option<String>) {
    let (body, extension) = split_extension(input.trim());
    let chars: Vec<char> = body.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(close) = closing_bracket(c) {
            let end = chars[i + 1..]
                .iter()
                .position(|&ch| ch == close)
                .map_or(chars.len(), |p| i + 1 + p);
            let inner: String = chars[i + 1..end].iter().collect();
            let inner = inner.trim();
            if !inner.is_empty() {
                tokens.push(Token::new(TokenKind::Bracketed, inner));
            }
            i = (end + 1).min(chars.len());
            continue;
        }

        if is_dash(c) {
            tokens.push(Token::new(TokenKind::Word, "-"));
            i += 1;
            while i < chars.len() && is_delimiter(chars[i]) {
                i += 1;
            }
            continue;
        }

        if is_delimiter(c) {
            while i < chars.len() && is_delimiter(chars[i]) {
                i += 1;
            }
            tokens.push(Token::new(TokenKind::Delimiter, " "));
            continue;
        }

        let start = i;
        while i < chars.len() {
            let ch = chars[i];
            if is_dash(ch) || closing_bracket(ch).is_some() {
                break;
            }
            // "12.5" and "H.264" keep their dot.
            let inner_dot = ch == '.'
                && i > start
                && i + 1 < chars.len()
                && chars[i + 1].is_ascii_digit()
                && (chars[i - 1].is_ascii_digit()
                    || (i - start == 1 && chars[start].eq_ignore_ascii_case(&'h')));
            if is_delimiter(ch) && !inner_dot {
                break;
            }
            i += 1;
        }
        tokens.push(Token::new(TokenKind::Word, chars[start..i].iter().collect::<String>()));
    }

    (tokens, extension)
}

fn split_extension(input: &str) -> (&str, Option<String>) {
    if let Some((stem, ext)) = input.rsplit_once('.') {
        if EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)) {
            return (stem, Some(ext.to_ascii_lowercase()));
        }
    }
    (input, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Word)
            .map(|t| t.text.as_str())
            .collect()
    }

    #[test]
    fn test_brackets_and_words() {
        let (tokens, ext) = tokenize("[Group] Show Title - 05 [1080p].mkv");
        assert_eq!(ext.as_deref(), Some("mkv"));
        assert_eq!(tokens[0], Token::new(TokenKind::Bracketed, "Group"));
        assert_eq!(words(&tokens), vec!["Show", "Title", "-", "05"]);
        assert_eq!(tokens.last().map(|t| t.text.as_str()), Some("1080p"));
    }

    #[test]
    fn test_underscores() {
        let (tokens, _) = tokenize("[Group]_Show_Title_-_12_[720p]");
        assert_eq!(words(&tokens), vec!["Show", "Title", "-", "12"]);
    }

    #[test]
    fn test_decimal_dot_kept() {
        let (tokens, _) = tokenize("Show 12.5 H.264");
        assert_eq!(words(&tokens), vec!["Show", "12.5", "H.264"]);
    }

    #[test]
    fn test_unknown_extension_kept() {
        let (_, ext) = tokenize("Show - 01.txt");
        assert_eq!(ext, None);
    }

    #[test]
    fn test_unclosed_bracket() {
        let (tokens, _) = tokenize("[Group Show");
        assert_eq!(tokens, vec![Token::new(TokenKind::Bracketed, "Group Show")]);
    }
}
