//! What the user asked for

use crate::utils::error::TubegrabError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stream selection criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criterion {
    /// Highest combined stream of acceptable size, else highest video-only
    BestAvailable,
    /// Highest resolution regardless of bundled audio
    Highest,
    AudioOnly,
    /// A resolution label such as "1080p" or "4K"
    Resolution(String),
}

impl Criterion {
    /// Target height for [`Criterion::Resolution`]
    pub fn target_height(&self) -> Option<u32> {
        match self {
            Criterion::Resolution(label) => parse_height(label),
            _ => None,
        }
    }
}

impl FromStr for Criterion {
    type Err = TubegrabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "best" | "best available" | "best-available" => Ok(Criterion::BestAvailable),
            "highest" | "max" => Ok(Criterion::Highest),
            "audio" | "audio-only" | "audio only" | "audio_only" => Ok(Criterion::AudioOnly),
            _ if parse_height(trimmed).is_some() => Ok(Criterion::Resolution(trimmed.to_string())),
            _ => Err(TubegrabError::InvalidQuality(trimmed.to_string())),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::BestAvailable => write!(f, "best"),
            Criterion::Highest => write!(f, "highest"),
            Criterion::AudioOnly => write!(f, "audio-only"),
            Criterion::Resolution(label) => write!(f, "{}", label),
        }
    }
}

/// Pixel height named by a resolution label
///
/// Accepts "1080p", "1080", "720p60", "1920x1080" and the marketing names
/// "2K", "4K", "8K".
pub fn parse_height(label: &str) -> Option<u32> {
    let label = label.trim().to_lowercase();
    match label.as_str() {
        "2k" => return Some(1440),
        "4k" => return Some(2160),
        "8k" => return Some(4320),
        _ => {}
    }

    if let Some((width, height)) = label.split_once('x') {
        if width.chars().all(|c| c.is_ascii_digit()) && !width.is_empty() {
            return height.parse().ok().filter(|h| *h > 0);
        }
        return None;
    }

    let digits_end = label
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(label.len());
    if digits_end == 0 {
        return None;
    }
    let rest = &label[digits_end..];
    let valid_suffix = rest.is_empty()
        || rest
            .strip_prefix('p')
            .map(|fps| fps.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false);
    if !valid_suffix {
        return None;
    }

    label[..digits_end].parse().ok().filter(|h| *h > 0)
}

/// Canonical label for a height
pub fn height_label(height: u32) -> String {
    format!("{}p", height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_height_variants() {
        assert_eq!(parse_height("1080p"), Some(1080));
        assert_eq!(parse_height("1080"), Some(1080));
        assert_eq!(parse_height("720p60"), Some(720));
        assert_eq!(parse_height("1920x1080"), Some(1080));
        assert_eq!(parse_height("2K"), Some(1440));
        assert_eq!(parse_height("4k"), Some(2160));
        assert_eq!(parse_height("8K"), Some(4320));
        assert_eq!(parse_height(""), None);
        assert_eq!(parse_height("0p"), None);
        assert_eq!(parse_height("p1080"), None);
        assert_eq!(parse_height("1080i"), None);
        assert_eq!(parse_height("audio only"), None);
    }

    #[test]
    fn test_criterion_from_str() {
        assert_eq!("best".parse::<Criterion>().unwrap(), Criterion::BestAvailable);
        assert_eq!("Highest".parse::<Criterion>().unwrap(), Criterion::Highest);
        assert_eq!("audio-only".parse::<Criterion>().unwrap(), Criterion::AudioOnly);
        assert_eq!(
            " 4K ".parse::<Criterion>().unwrap(),
            Criterion::Resolution("4K".to_string())
        );
        assert!(matches!(
            "ultra".parse::<Criterion>(),
            Err(TubegrabError::InvalidQuality(_))
        ));
    }

    #[test]
    fn test_display_parses_back() {
        for criterion in [
            Criterion::BestAvailable,
            Criterion::Highest,
            Criterion::AudioOnly,
            Criterion::Resolution("720p".into()),
        ] {
            assert_eq!(criterion.to_string().parse::<Criterion>().unwrap(), criterion);
        }
    }
}
