use crate::error::KazamiError;
use crate::feed::EpisodeData;

/// Extracts episode metadata from free text.
pub trait TitleParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<EpisodeData, KazamiError>;
}

/// Release-name parser backed by `kazami-parse`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseTitleParser;

impl TitleParser for ReleaseTitleParser {
    fn parse(&self, text: &str) -> Result<EpisodeData, KazamiError> {
        let elements = kazami_parse::parse(text);
        if elements.is_empty() {
            return Err(KazamiError::Parse(format!("no title or episode in `{text}`")));
        }
        Ok(EpisodeData {
            anime_title: elements.title.unwrap_or_default(),
            episode_number: elements.episode_number,
            episode_fraction: elements.episode_fraction,
            version: elements.release_version,
            group: elements.release_group.unwrap_or_default(),
            resolution: elements.resolution.unwrap_or_default(),
            video_type: elements.video_type.unwrap_or_default(),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release() {
        let data = ReleaseTitleParser
            .parse("[SubsPlease] Sousou no Frieren - 05v2 (1080p) [ABCD1234].mkv")
            .unwrap();
        assert_eq!(data.anime_title, "Sousou no Frieren");
        assert_eq!(data.episode_number, Some(5));
        assert_eq!(data.version, Some(2));
        assert_eq!(data.group, "SubsPlease");
        assert_eq!(data.resolution, "1080p");
        assert!(data.anime_id.is_none());
    }

    #[test]
    fn test_half_episode_fraction() {
        let data = ReleaseTitleParser.parse("[A] Show - 12.5 [1080p]").unwrap();
        assert_eq!(data.episode_number, Some(12));
        assert_eq!(data.episode_fraction, Some(5));
    }

    #[test]
    fn test_unparsable_is_error() {
        assert!(matches!(
            ReleaseTitleParser.parse("   "),
            Err(KazamiError::Parse(_))
        ));
    }
}
