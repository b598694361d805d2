use std::sync::LazyLock;

use regex::Regex;

use crate::elements::Elements;
use crate::keyword::{self, KeywordKind};
use crate::tokenizer::{self, Token, TokenKind};

// ── Regex patterns (compiled once) ──────────────────────────────

static RE_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<num>\d{1,4})(?:\.(?P<frac>5))?(?:[vV](?P<ver>\d))?$").unwrap()
});

static RE_EPISODE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:EP\.?|E|EPISODE|#)(?P<num>\d{1,4})(?:v(?P<ver>\d))?$").unwrap()
});

static RE_SEASON_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^S\d{1,2}E(?P<num>\d{1,4})(?:v(?P<ver>\d))?$").unwrap()
});

static RE_RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\d{3,4}x)?(\d{3,4})([pi])?$").unwrap());

static RE_CHECKSUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f]{8}$").unwrap());

/// Parse a release title into its elements.
///
/// # Example
/// ```
/// let e = kazami_parse::parse("[SubsPlease] Sousou no Frieren - 05v2 (1080p) [ABCD1234].mkv");
/// assert_eq!(e.title.as_deref(), Some("Sousou no Frieren"));
/// assert_eq!(e.episode_number, Some(5));
/// assert_eq!(e.release_version, Some(2));
/// assert_eq!(e.release_group.as_deref(), Some("SubsPlease"));
/// assert_eq!(e.resolution.as_deref(), Some("1080p"));
/// ```
pub fn parse(title: &str) -> Elements {
    let (tokens, extension) = tokenizer::tokenize(title);
    let mut elements = Elements {
        file_extension: extension,
        ..Default::default()
    };
    let mut identified = vec![false; tokens.len()];

    identify_keywords(&tokens, &mut elements, &mut identified, TokenKind::Bracketed);
    extract_checksum(&tokens, &mut elements, &mut identified);
    extract_release_group(&tokens, &mut elements, &mut identified);
    identify_keywords(&tokens, &mut elements, &mut identified, TokenKind::Word);
    extract_episode(&tokens, &mut elements, &mut identified);
    extract_title(&tokens, &mut elements, &identified);

    tracing::trace!(title, ?elements, "parsed release title");
    elements
}

/// Mark tokens of `kind` that are keywords or resolutions. Bracketed tokens
/// may hold several space-separated terms ("1080p HEVC AAC").
fn identify_keywords(
    tokens: &[Token],
    elements: &mut Elements,
    identified: &mut [bool],
    kind: TokenKind,
) {
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != kind || identified[i] {
            continue;
        }
        let mut terms = token.text.split_whitespace().peekable();
        if terms.peek().is_none() {
            continue;
        }
        let mut all_known = true;
        for term in terms {
            if let Some(kind) = keyword::lookup(term) {
                apply_keyword(kind, term, elements);
            } else if let Some(res) = parse_resolution(term) {
                elements.resolution.get_or_insert(res);
            } else {
                all_known = false;
            }
        }
        if all_known || keyword::lookup(&token.text).is_some() {
            identified[i] = true;
        }
    }
}

fn apply_keyword(kind: KeywordKind, text: &str, elements: &mut Elements) {
    let slot = match kind {
        KeywordKind::VideoType => &mut elements.video_type,
        KeywordKind::AudioType => &mut elements.audio_type,
        KeywordKind::Source => &mut elements.source,
        KeywordKind::Resolution => {
            elements
                .resolution
                .get_or_insert_with(|| parse_resolution(text).unwrap_or_else(|| text.to_string()));
            return;
        }
        KeywordKind::Term => return,
    };
    slot.get_or_insert_with(|| text.to_string());
}

fn extract_checksum(tokens: &[Token], elements: &mut Elements, identified: &mut [bool]) {
    let found = tokens.iter().enumerate().rev().find(|(i, t)| {
        t.kind == TokenKind::Bracketed && !identified[*i] && RE_CHECKSUM.is_match(&t.text)
    });
    if let Some((i, token)) = found {
        elements.checksum = Some(token.text.clone());
        identified[i] = true;
    }
}

/// The first unidentified bracketed token before any word is the group.
fn extract_release_group(tokens: &[Token], elements: &mut Elements, identified: &mut [bool]) {
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Word => return,
            TokenKind::Bracketed if !identified[i] => {
                elements.release_group = Some(token.text.clone());
                identified[i] = true;
                return;
            }
            _ => {}
        }
    }
}

fn extract_episode(tokens: &[Token], elements: &mut Elements, identified: &mut [bool]) {
    // " - 05" is the most common layout.
    for i in 0..tokens.len() {
        if identified[i] || !tokens[i].is_dash() {
            continue;
        }
        if let Some(next) = next_word(tokens, identified, i) {
            if try_episode(&tokens[next].text, elements) {
                identified[i] = true;
                identified[next] = true;
                return;
            }
        }
    }

    // Otherwise the first number-like word that follows some title text.
    let mut saw_text = false;
    for i in 0..tokens.len() {
        if identified[i] || tokens[i].kind != TokenKind::Word || tokens[i].is_dash() {
            continue;
        }
        if saw_text && try_episode(&tokens[i].text, elements) {
            identified[i] = true;
            return;
        }
        saw_text = true;
    }

    for i in 0..tokens.len() {
        if !identified[i]
            && tokens[i].kind == TokenKind::Bracketed
            && try_episode(&tokens[i].text, elements)
        {
            identified[i] = true;
            return;
        }
    }
}

fn try_episode(text: &str, elements: &mut Elements) -> bool {
    let caps = RE_EPISODE
        .captures(text)
        .or_else(|| RE_EPISODE_PREFIX.captures(text))
        .or_else(|| RE_SEASON_EPISODE.captures(text));
    let Some(caps) = caps else {
        return false;
    };
    let Some(number) = caps.name("num").and_then(|m| m.as_str().parse::<u32>().ok()) else {
        return false;
    };
    // Years are not episodes.
    if (1900..2100).contains(&number) && caps["num"].len() == 4 {
        return false;
    }
    elements.episode = Some(text.to_string());
    elements.episode_number = Some(number);
    elements.episode_fraction = caps.name("frac").and_then(|m| m.as_str().parse().ok());
    elements.release_version = caps.name("ver").and_then(|m| m.as_str().parse().ok());
    true
}

fn extract_title(tokens: &[Token], elements: &mut Elements, identified: &[bool]) {
    let mut title = String::new();
    for (i, token) in tokens.iter().enumerate() {
        let started = !title.is_empty();
        if identified[i] || token.kind == TokenKind::Bracketed || token.is_dash() {
            if started {
                break;
            }
            continue;
        }
        match token.kind {
            TokenKind::Word => title.push_str(&token.text),
            TokenKind::Delimiter if started => title.push(' '),
            _ => {}
        }
    }
    let title = title.trim();
    if !title.is_empty() {
        elements.title = Some(title.to_string());
    }
}

fn next_word(tokens: &[Token], identified: &[bool], from: usize) -> Option<usize> {
    for (i, token) in tokens.iter().enumerate().skip(from + 1) {
        match token.kind {
            TokenKind::Word if !identified[i] => return Some(i),
            TokenKind::Delimiter => {}
            _ => return None,
        }
    }
    None
}

/// "1920x1080" → "1080p", "720p" → "720p". Bare numbers are not resolutions.
fn parse_resolution(text: &str) -> Option<String> {
    let caps = RE_RESOLUTION.captures(text)?;
    let height = &caps[1];
    let has_width = text.to_ascii_lowercase().contains('x');
    match caps.get(2) {
        Some(scan) => Some(format!("{height}{}", scan.as_str().to_ascii_lowercase())),
        None if has_width => Some(format!("{height}p")),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_title() {
        let e = parse("Show - 01");
        assert_eq!(e.title.as_deref(), Some("Show"));
        assert_eq!(e.episode_number, Some(1));
        assert_eq!(e.release_version, None);
        assert_eq!(e.release_group, None);
    }

    #[test]
    fn test_typical_release() {
        let e = parse("[SubsPlease] Sousou no Frieren - 05 (1080p) [ABCD1234].mkv");
        assert_eq!(e.title.as_deref(), Some("Sousou no Frieren"));
        assert_eq!(e.episode_number, Some(5));
        assert_eq!(e.release_group.as_deref(), Some("SubsPlease"));
        assert_eq!(e.resolution.as_deref(), Some("1080p"));
        assert_eq!(e.checksum.as_deref(), Some("ABCD1234"));
        assert_eq!(e.file_extension.as_deref(), Some("mkv"));
    }

    #[test]
    fn test_version_kept_separate() {
        let e = parse("[Group] Title - 05v2 [720p].mkv");
        assert_eq!(e.episode_number, Some(5));
        assert_eq!(e.release_version, Some(2));
        assert_eq!(e.episode.as_deref(), Some("05v2"));
    }

    #[test]
    fn test_half_episode_keeps_fraction() {
        let whole = parse("[A] Show - 12 [720p]");
        assert_eq!(whole.episode_number, Some(12));
        assert_eq!(whole.episode_fraction, None);

        let half = parse("[A] Show - 12.5 [1080p]");
        assert_eq!(half.episode_number, Some(12));
        assert_eq!(half.episode_fraction, Some(5));
        assert_eq!(half.episode.as_deref(), Some("12.5"));
    }

    #[test]
    fn test_bracketed_terms() {
        let e = parse("[Erai-raws] Title - 12 [1920x1080 HEVC AAC]");
        assert_eq!(e.release_group.as_deref(), Some("Erai-raws"));
        assert_eq!(e.resolution.as_deref(), Some("1080p"));
        assert_eq!(e.video_type.as_deref(), Some("HEVC"));
        assert_eq!(e.audio_type.as_deref(), Some("AAC"));
    }

    #[test]
    fn test_number_without_dash() {
        let e = parse("Show Title 07 [480p]");
        assert_eq!(e.title.as_deref(), Some("Show Title"));
        assert_eq!(e.episode_number, Some(7));
        assert_eq!(e.resolution.as_deref(), Some("480p"));
    }

    #[test]
    fn test_year_is_not_episode() {
        let e = parse("Movie Title 2019 [BD]");
        assert_eq!(e.episode_number, None);
        assert_eq!(e.source.as_deref(), Some("BD"));
    }

    #[test]
    fn test_garbage_is_empty() {
        let e = parse("");
        assert!(e.is_empty());
    }

    #[test]
    fn test_serializes_without_empty_fields() {
        let e = parse("Show - 01");
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, r#"{"title":"Show","episode":"01","episode_number":1}"#);
    }
}
