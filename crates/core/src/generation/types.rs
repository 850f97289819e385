//! Request and content package types for generation.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::generation::llm::LlmUsage;

// ============================================================================
// Request enumerations
// ============================================================================

/// Target length of a script.
///
/// Serialized as its human-readable label. Unknown labels degrade to
/// `Standard`, so a stale client never fails a request over a length setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DurationBucket {
    Short,
    #[default]
    Standard,
    Medium,
    Long,
    Extended,
}

impl DurationBucket {
    /// Speaking rate used to turn minutes into a word budget.
    pub const WORDS_PER_MINUTE: u32 = 150;

    pub const ALL: [DurationBucket; 5] = [
        DurationBucket::Short,
        DurationBucket::Standard,
        DurationBucket::Medium,
        DurationBucket::Long,
        DurationBucket::Extended,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DurationBucket::Short => "1-2 minutes (Short)",
            DurationBucket::Standard => "3-5 minutes (Standard)",
            DurationBucket::Medium => "5-10 minutes (Medium)",
            DurationBucket::Long => "10-15 minutes (Long)",
            DurationBucket::Extended => "15-20 minutes (Extended)",
        }
    }

    /// Representative runtime for the bucket.
    pub fn minutes(&self) -> u32 {
        match self {
            DurationBucket::Short => 2,
            DurationBucket::Standard => 4,
            DurationBucket::Medium => 8,
            DurationBucket::Long => 12,
            DurationBucket::Extended => 18,
        }
    }

    pub fn target_words(&self) -> u32 {
        self.minutes() * Self::WORDS_PER_MINUTE
    }

    /// Parse a label or variant name; anything else is `Standard`.
    pub fn from_label(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|bucket| {
                bucket.label().to_lowercase() == normalized
                    || format!("{:?}", bucket).to_lowercase() == normalized
            })
            .unwrap_or_default()
    }
}

impl From<String> for DurationBucket {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<DurationBucket> for String {
    fn from(value: DurationBucket) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Narrative tone of the generated content. Unknown values are `Informative`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tone {
    #[default]
    Informative,
    Entertaining,
    Educational,
    Inspirational,
    Conversational,
    Professional,
    Humorous,
}

impl Tone {
    pub const ALL: [Tone; 7] = [
        Tone::Informative,
        Tone::Entertaining,
        Tone::Educational,
        Tone::Inspirational,
        Tone::Conversational,
        Tone::Professional,
        Tone::Humorous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Informative => "informative",
            Tone::Entertaining => "entertaining",
            Tone::Educational => "educational",
            Tone::Inspirational => "inspirational",
            Tone::Conversational => "conversational",
            Tone::Professional => "professional",
            Tone::Humorous => "humorous",
        }
    }

    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|tone| tone.as_str() == normalized)
            .unwrap_or_default()
    }
}

impl From<String> for Tone {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Tone> for String {
    fn from(value: Tone) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generatable content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Script,
    Seo,
    Thumbnails,
    #[serde(alias = "imagePrompts")]
    ImagePrompts,
    #[serde(alias = "musicAssets")]
    MusicAssets,
    #[serde(alias = "bulletPoints")]
    BulletPoints,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Script => "script",
            AssetKind::Seo => "seo",
            AssetKind::Thumbnails => "thumbnails",
            AssetKind::ImagePrompts => "image_prompts",
            AssetKind::MusicAssets => "music_assets",
            AssetKind::BulletPoints => "bullet_points",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Generation request
// ============================================================================

/// Everything the orchestrator needs to produce one content package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    /// Free-text topic, e.g. "10 ways to save money".
    pub subject_text: String,
    #[serde(default)]
    pub duration: DurationBucket,
    #[serde(default)]
    pub tone: Tone,
    /// Optional structure template the script should follow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_text: Option<String>,
    pub requested_asset_kinds: BTreeSet<AssetKind>,
    /// Literal script text uploaded by the user. When set, no script is
    /// generated and this text feeds the auxiliary generators instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_script: Option<String>,
}

impl GenerationRequest {
    pub fn new(subject_text: impl Into<String>) -> Self {
        Self {
            subject_text: subject_text.into(),
            duration: DurationBucket::default(),
            tone: Tone::default(),
            template_text: None,
            requested_asset_kinds: BTreeSet::new(),
            existing_script: None,
        }
    }

    pub fn with_duration(mut self, duration: DurationBucket) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template_text = Some(template.into());
        self
    }

    pub fn with_assets(mut self, kinds: impl IntoIterator<Item = AssetKind>) -> Self {
        self.requested_asset_kinds.extend(kinds);
        self
    }

    pub fn with_existing_script(mut self, script: impl Into<String>) -> Self {
        self.existing_script = Some(script.into());
        self
    }

    pub fn wants(&self, kind: AssetKind) -> bool {
        self.requested_asset_kinds.contains(&kind)
    }

    /// Check the request invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.requested_asset_kinds.is_empty() {
            return Err("at least one asset kind must be requested".to_string());
        }
        if self.subject_text.trim().is_empty() {
            return Err("subject text cannot be empty".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Script
// ============================================================================

/// One titled block of a script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_label: Option<String>,
}

impl ScriptSection {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            duration_label: None,
        }
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// A fully structured script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedScript {
    pub hook: ScriptSection,
    pub introduction: ScriptSection,
    pub main_content: Vec<ScriptSection>,
    pub conclusion: ScriptSection,
    pub total_words: usize,
    pub estimated_duration: String,
}

impl GeneratedScript {
    /// All sections in reading order.
    pub fn sections(&self) -> impl Iterator<Item = &ScriptSection> {
        std::iter::once(&self.hook)
            .chain(std::iter::once(&self.introduction))
            .chain(self.main_content.iter())
            .chain(std::iter::once(&self.conclusion))
    }

    pub fn count_words(&self) -> usize {
        self.sections().map(ScriptSection::word_count).sum()
    }

    /// Concatenated text of hook, introduction, main content and conclusion.
    pub fn full_text(&self) -> String {
        let mut parts = vec![self.hook.content.clone(), self.introduction.content.clone()];
        for item in &self.main_content {
            if item.title.is_empty() {
                parts.push(item.content.clone());
            } else {
                parts.push(format!("{}\n{}", item.title, item.content));
            }
        }
        parts.push(self.conclusion.content.clone());

        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

// ============================================================================
// Auxiliary assets
// ============================================================================

/// Titles, description and tags for publishing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoPackage {
    pub titles: Vec<String>,
    pub description: String,
    pub tags: Vec<String>,
}

impl SeoPackage {
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty() && self.description.is_empty() && self.tags.is_empty()
    }
}

/// A named visual design idea for a thumbnail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignConcept {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Thumbnail concept with design variations and image-model prompts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailConcept {
    pub concept_name: String,
    pub description: String,
    pub curiosity_words: Vec<String>,
    pub design_concepts: Vec<DesignConcept>,
    pub ai_prompts: Vec<String>,
}

impl ThumbnailConcept {
    pub fn is_empty(&self) -> bool {
        self.concept_name.is_empty()
            && self.description.is_empty()
            && self.curiosity_words.is_empty()
            && self.design_concepts.is_empty()
            && self.ai_prompts.is_empty()
    }
}

/// Image prompts for one section of a script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionImagePrompts {
    pub section_label: String,
    pub source_text: String,
    pub prompts: Vec<String>,
}

/// One outline entry with its supporting points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletPoint {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sub_points: Vec<String>,
}

/// Production helpers: music, per-section imagery and an outline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionAssets {
    #[serde(default)]
    pub music_prompts: Vec<String>,
    #[serde(default)]
    pub image_prompts: Vec<SectionImagePrompts>,
    #[serde(default)]
    pub bullet_points: Vec<BulletPoint>,
}

// ============================================================================
// Content package
// ============================================================================

/// The merged output of one generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPackage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<GeneratedScript>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<SeoPackage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<ThumbnailConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<ProductionAssets>,
}

/// Output of one auxiliary generator, naming the field it owns.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetOutput {
    Seo(SeoPackage),
    Thumbnails(ThumbnailConcept),
    ImagePrompts(Vec<SectionImagePrompts>),
    Production {
        music_prompts: Option<Vec<String>>,
        bullet_points: Option<Vec<BulletPoint>>,
    },
}

impl ContentPackage {
    /// Write one generator's output into the package.
    ///
    /// Generators that share the `assets` bucket only touch their own
    /// sub-fields, so a sibling's output survives regardless of order.
    pub fn apply(&mut self, output: AssetOutput) {
        match output {
            AssetOutput::Seo(seo) => self.seo = Some(seo),
            AssetOutput::Thumbnails(thumbnails) => self.thumbnails = Some(thumbnails),
            AssetOutput::ImagePrompts(prompts) => {
                self.assets.get_or_insert_with(Default::default).image_prompts = prompts;
            }
            AssetOutput::Production {
                music_prompts,
                bullet_points,
            } => {
                let assets = self.assets.get_or_insert_with(Default::default);
                if let Some(music) = music_prompts {
                    assets.music_prompts = music;
                }
                if let Some(bullets) = bullet_points {
                    assets.bullet_points = bullets;
                }
            }
        }
    }
}

/// Result of a complete generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub package: ContentPackage,
    /// Total token usage across all model calls that returned usable output.
    pub llm_usage: LlmUsage,
    /// Script attempts made (0 when no script was generated).
    pub script_attempts: u32,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_bucket_word_table() {
        assert_eq!(DurationBucket::Short.target_words(), 300);
        assert_eq!(DurationBucket::Standard.target_words(), 600);
        assert_eq!(DurationBucket::Medium.target_words(), 1200);
        assert_eq!(DurationBucket::Long.target_words(), 1800);
        assert_eq!(DurationBucket::Extended.target_words(), 2700);
    }

    #[test]
    fn test_duration_bucket_from_label() {
        assert_eq!(
            DurationBucket::from_label("3-5 minutes (Standard)"),
            DurationBucket::Standard
        );
        assert_eq!(
            DurationBucket::from_label("10-15 Minutes (long)"),
            DurationBucket::Long
        );
        assert_eq!(DurationBucket::from_label("extended"), DurationBucket::Extended);
        assert_eq!(DurationBucket::from_label("an hour"), DurationBucket::Standard);
    }

    #[test]
    fn test_tone_unknown_falls_back_to_informative() {
        assert_eq!(Tone::parse("Humorous"), Tone::Humorous);
        assert_eq!(Tone::parse("sarcastic"), Tone::Informative);
        assert_eq!(Tone::parse(""), Tone::Informative);
    }

    #[test]
    fn test_request_deserializes_leniently() {
        let json = r#"{
            "subject_text": "10 ways to save money",
            "duration": "not a bucket",
            "tone": "grumpy",
            "requested_asset_kinds": ["script", "imagePrompts", "bullet_points"]
        }"#;
        let request: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.duration, DurationBucket::Standard);
        assert_eq!(request.tone, Tone::Informative);
        assert!(request.wants(AssetKind::ImagePrompts));
        assert!(request.wants(AssetKind::BulletPoints));
        assert!(!request.wants(AssetKind::Seo));
    }

    #[test]
    fn test_request_serializes_labels() {
        let request = GenerationRequest::new("topic")
            .with_duration(DurationBucket::Medium)
            .with_assets([AssetKind::Seo]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["duration"], "5-10 minutes (Medium)");
        assert_eq!(json["tone"], "informative");
        assert_eq!(json["requested_asset_kinds"][0], "seo");
    }

    #[test]
    fn test_request_validation() {
        let empty_kinds = GenerationRequest::new("topic");
        assert!(empty_kinds.validate().is_err());

        let blank_subject = GenerationRequest::new("   ").with_assets([AssetKind::Script]);
        assert!(blank_subject.validate().is_err());

        let ok = GenerationRequest::new("topic").with_assets([AssetKind::Script]);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_script_full_text_and_word_count() {
        let script = GeneratedScript {
            hook: ScriptSection::new("Hook", "Stop wasting money."),
            introduction: ScriptSection::new("Intro", "Here is how."),
            main_content: vec![
                ScriptSection::new("1. Budget", "Write it down."),
                ScriptSection::new("", "Cook at home."),
            ],
            conclusion: ScriptSection::new("Outro", ""),
            total_words: 0,
            estimated_duration: String::new(),
        };

        assert_eq!(script.count_words(), 12);
        assert_eq!(
            script.full_text(),
            "Stop wasting money.\n\nHere is how.\n\n1. Budget\nWrite it down.\n\nCook at home."
        );
    }

    #[test]
    fn test_script_section_accepts_duration_alias() {
        let section: ScriptSection =
            serde_json::from_str(r#"{"title": "Hook", "content": "x", "duration": "0:15"}"#)
                .unwrap();
        assert_eq!(section.duration_label.as_deref(), Some("0:15"));
    }

    #[test]
    fn test_apply_merges_production_assets() {
        let mut package = ContentPackage::default();

        package.apply(AssetOutput::Production {
            music_prompts: Some(vec!["lofi beat".to_string()]),
            bullet_points: None,
        });
        package.apply(AssetOutput::ImagePrompts(vec![SectionImagePrompts {
            section_label: "Hook".to_string(),
            source_text: "text".to_string(),
            prompts: vec!["a coin".to_string()],
        }]));
        package.apply(AssetOutput::Production {
            music_prompts: None,
            bullet_points: Some(vec![BulletPoint {
                title: "Budget".to_string(),
                sub_points: vec![],
            }]),
        });

        let assets = package.assets.unwrap();
        assert_eq!(assets.music_prompts, vec!["lofi beat"]);
        assert_eq!(assets.image_prompts.len(), 1);
        assert_eq!(assets.bullet_points.len(), 1);
    }

    #[test]
    fn test_empty_package_serializes_without_fields() {
        let json = serde_json::to_string(&ContentPackage::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
