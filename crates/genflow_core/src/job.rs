use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub type JobId = u64;

/// Publishing target a piece of content is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Reddit,
    Quora,
    Medium,
    LinkedIn,
    Facebook,
    Instagram,
    GithubDiscussion,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Reddit,
        Platform::Quora,
        Platform::Medium,
        Platform::LinkedIn,
        Platform::Facebook,
        Platform::Instagram,
        Platform::GithubDiscussion,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Platform::Reddit => "reddit",
            Platform::Quora => "quora",
            Platform::Medium => "medium",
            Platform::LinkedIn => "linkedin",
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::GithubDiscussion => "github",
        }
    }

    /// Posts on this platform cannot go out without an attached image.
    pub fn requires_image(self) -> bool {
        matches!(self, Platform::Instagram)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Platform {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let needle = raw.trim();
        Platform::ALL
            .into_iter()
            .find(|p| p.wire_name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ValidationError::UnknownPlatform(needle.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfluenceLevel {
    Subtle,
    #[default]
    Moderate,
    Strong,
}

impl InfluenceLevel {
    pub fn wire_name(self) -> &'static str {
        match self {
            InfluenceLevel::Subtle => "subtle",
            InfluenceLevel::Moderate => "moderate",
            InfluenceLevel::Strong => "strong",
        }
    }
}

impl FromStr for InfluenceLevel {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "subtle" => Ok(InfluenceLevel::Subtle),
            "moderate" => Ok(InfluenceLevel::Moderate),
            "strong" => Ok(InfluenceLevel::Strong),
            other => Err(ValidationError::UnknownInfluence(other.to_string())),
        }
    }
}

/// One content-generation attempt as submitted by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub topic: String,
    pub target_keywords: Vec<String>,
    pub platform: Platform,
    pub influence_level: InfluenceLevel,
    pub brand_voice_id: Option<String>,
    pub image_ref: Option<String>,
}

impl GenerationJob {
    pub fn new(topic: impl Into<String>, target_keywords: Vec<String>, platform: Platform) -> Self {
        Self {
            topic: topic.into(),
            target_keywords,
            platform,
            influence_level: InfluenceLevel::default(),
            brand_voice_id: None,
            image_ref: None,
        }
    }

    /// Checks the submit preconditions. Nothing reaches the network unless this passes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.topic.trim().is_empty() {
            return Err(ValidationError::MissingTopic);
        }
        if !self.target_keywords.iter().any(|k| !k.trim().is_empty()) {
            return Err(ValidationError::MissingKeywords);
        }
        let has_image = self
            .image_ref
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty());
        if self.platform.requires_image() && !has_image {
            return Err(ValidationError::ImageRequired(self.platform));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("enter a topic before generating")]
    MissingTopic,
    #[error("add at least one target keyword")]
    MissingKeywords,
    #[error("{0} posts need an image; attach one and try again")]
    ImageRequired(Platform),
    #[error("unknown platform '{0}'")]
    UnknownPlatform(String),
    #[error("unknown influence level '{0}'")]
    UnknownInfluence(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(platform: Platform) -> GenerationJob {
        GenerationJob::new("Topic", vec!["kw".to_string()], platform)
    }

    #[test]
    fn blank_topic_is_rejected() {
        let mut j = job(Platform::Reddit);
        j.topic = "   ".into();
        assert_eq!(j.validate(), Err(ValidationError::MissingTopic));
    }

    #[test]
    fn whitespace_keywords_do_not_count() {
        let mut j = job(Platform::Reddit);
        j.target_keywords = vec![" ".into(), String::new()];
        assert_eq!(j.validate(), Err(ValidationError::MissingKeywords));
    }

    #[test]
    fn instagram_needs_an_image() {
        let mut j = job(Platform::Instagram);
        assert_eq!(
            j.validate(),
            Err(ValidationError::ImageRequired(Platform::Instagram))
        );
        j.image_ref = Some("uploads/cover.png".into());
        assert_eq!(j.validate(), Ok(()));
    }

    #[test]
    fn platform_parses_case_insensitively() {
        assert_eq!("LinkedIn".parse::<Platform>(), Ok(Platform::LinkedIn));
        assert_eq!(" github ".parse::<Platform>(), Ok(Platform::GithubDiscussion));
        assert!("myspace".parse::<Platform>().is_err());
    }
}
