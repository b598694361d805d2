use phf::phf_map;

/// Which element a keyword populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    VideoType,
    AudioType,
    Resolution,
    Source,
    /// Recognized but not stored (language, subtitle and release terms).
    Term,
}

/// Keys are uppercase; lookups upper-case their input.
static KEYWORDS: phf::Map<&'static str, KeywordKind> = phf_map! {
    "H264" => KeywordKind::VideoType,
    "H.264" => KeywordKind::VideoType,
    "X264" => KeywordKind::VideoType,
    "H265" => KeywordKind::VideoType,
    "H.265" => KeywordKind::VideoType,
    "X265" => KeywordKind::VideoType,
    "HEVC" => KeywordKind::VideoType,
    "AVC" => KeywordKind::VideoType,
    "AV1" => KeywordKind::VideoType,
    "XVID" => KeywordKind::VideoType,
    "10BIT" => KeywordKind::VideoType,
    "HI10P" => KeywordKind::VideoType,

    "AAC" => KeywordKind::AudioType,
    "AC3" => KeywordKind::AudioType,
    "EAC3" => KeywordKind::AudioType,
    "FLAC" => KeywordKind::AudioType,
    "MP3" => KeywordKind::AudioType,
    "OPUS" => KeywordKind::AudioType,
    "DTS" => KeywordKind::AudioType,

    "480P" => KeywordKind::Resolution,
    "540P" => KeywordKind::Resolution,
    "576P" => KeywordKind::Resolution,
    "720P" => KeywordKind::Resolution,
    "1080P" => KeywordKind::Resolution,
    "1080I" => KeywordKind::Resolution,
    "2160P" => KeywordKind::Resolution,
    "4K" => KeywordKind::Resolution,

    "BD" => KeywordKind::Source,
    "BDRIP" => KeywordKind::Source,
    "BLURAY" => KeywordKind::Source,
    "DVD" => KeywordKind::Source,
    "DVDRIP" => KeywordKind::Source,
    "HDTV" => KeywordKind::Source,
    "TV" => KeywordKind::Source,
    "WEB" => KeywordKind::Source,
    "WEB-DL" => KeywordKind::Source,
    "WEBRIP" => KeywordKind::Source,
    "BATCH" => KeywordKind::Source,

    "ENG" => KeywordKind::Term,
    "JPN" => KeywordKind::Term,
    "SUBBED" => KeywordKind::Term,
    "DUBBED" => KeywordKind::Term,
    "MULTI-SUB" => KeywordKind::Term,
    "UNCENSORED" => KeywordKind::Term,
    "REMASTERED" => KeywordKind::Term,
    "DUAL AUDIO" => KeywordKind::Term,
};

/// Look up a keyword, ignoring case.
pub fn lookup(s: &str) -> Option<KeywordKind> {
    KEYWORDS.get(s.to_uppercase().as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup("hevc"), Some(KeywordKind::VideoType));
        assert_eq!(lookup("1080p"), Some(KeywordKind::Resolution));
        assert_eq!(lookup("Frieren"), None);
    }
}
