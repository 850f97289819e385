//! Auxiliary asset generators: SEO, thumbnails, image prompts and production assets.
//!
//! Each generator makes its own model call(s) from the script text. An
//! invocation failure is returned as an error; an answer that cannot be
//! parsed degrades to the asset's empty value.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::generation::answer::{bullet_point, design_concept, opt_list, text, text_list};
use crate::generation::config::GenerationConfig;
use crate::generation::invoke::invoke_json;
use crate::generation::llm::{LlmClient, LlmUsage};
use crate::generation::prompts::PromptTask;
use crate::generation::traits::GenerationError;
use crate::generation::types::{
    AssetOutput, BulletPoint, DesignConcept, GeneratedScript, GenerationRequest,
    SectionImagePrompts, SeoPackage, ThumbnailConcept,
};
use crate::metrics::PARSE_FALLBACKS;

/// Maximum number of title options kept from an SEO answer.
pub const MAX_TITLES: usize = 5;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Where image prompt sections come from.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    /// A generated script: hook, introduction, each main item, conclusion.
    Structured(&'a GeneratedScript),
    /// Uploaded text, split into paragraphs on blank lines.
    Raw(&'a str),
}

impl ImageSource<'_> {
    /// Labelled sections in reading order.
    pub fn sections(&self) -> Vec<(String, String)> {
        match self {
            ImageSource::Structured(script) => {
                let mut sections = Vec::with_capacity(script.main_content.len() + 3);
                sections.push(("Hook".to_string(), script.hook.content.clone()));
                sections.push(("Introduction".to_string(), script.introduction.content.clone()));
                for (i, item) in script.main_content.iter().enumerate() {
                    sections.push((format!("Main Content #{}", i + 1), item.content.clone()));
                }
                sections.push(("Conclusion".to_string(), script.conclusion.content.clone()));
                sections
            }
            ImageSource::Raw(text) => PARAGRAPH_BREAK
                .split(text)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .enumerate()
                .map(|(i, p)| (format!("Section {}", i + 1), p.to_string()))
                .collect(),
        }
    }
}

/// Generates every asset other than the script.
pub struct AssetGenerator<C: LlmClient> {
    client: Arc<C>,
    config: GenerationConfig,
}

impl<C: LlmClient> AssetGenerator<C> {
    pub fn new(client: Arc<C>, config: GenerationConfig) -> Self {
        Self { client, config }
    }

    /// Titles, description and tags.
    pub async fn seo(
        &self,
        request: &GenerationRequest,
        script_text: &str,
    ) -> Result<(SeoPackage, LlmUsage), GenerationError> {
        let (answer, usage) = self
            .call(&PromptTask::Seo, request, script_text, "seo")
            .await?;
        Ok((SeoResponse::from_value(&answer).into_package(), usage))
    }

    /// Thumbnail concept, design variations and image-model prompts.
    pub async fn thumbnails(
        &self,
        request: &GenerationRequest,
        script_text: &str,
    ) -> Result<(ThumbnailConcept, LlmUsage), GenerationError> {
        let (answer, usage) = self
            .call(&PromptTask::Thumbnails, request, script_text, "thumbnails")
            .await?;
        Ok((ThumbnailResponse::from_value(&answer).into_concept(), usage))
    }

    /// Image prompts for every section, in section order.
    ///
    /// Sections are processed with bounded concurrency. A section whose call
    /// fails or whose answer cannot be parsed gets an empty prompt list; an
    /// empty section gets one without calling the model.
    pub async fn image_prompts(
        &self,
        request: &GenerationRequest,
        source: ImageSource<'_>,
    ) -> Result<(Vec<SectionImagePrompts>, LlmUsage), GenerationError> {
        let sections = source.sections();
        debug!(sections = sections.len(), "Generating image prompts");

        let results: Vec<(SectionImagePrompts, LlmUsage)> = stream::iter(
            sections
                .into_iter()
                .map(|(label, text)| self.section_prompts(request, label, text)),
        )
        .buffered(self.config.image_prompt_concurrency.max(1))
        .collect()
        .await;

        let mut usage = LlmUsage::default();
        let prompts = results
            .into_iter()
            .map(|(section, call_usage)| {
                usage.accumulate(&call_usage);
                section
            })
            .collect();
        Ok((prompts, usage))
    }

    /// Music prompts and/or bullet points in a single call.
    ///
    /// The returned output only names the parts that were asked for, so it
    /// never clears a sibling's field when merged.
    pub async fn production(
        &self,
        request: &GenerationRequest,
        script_text: &str,
        music: bool,
        bullet_points: bool,
    ) -> Result<(AssetOutput, LlmUsage), GenerationError> {
        let task = PromptTask::ProductionAssets {
            music,
            bullet_points,
        };
        let (answer, usage) = self
            .call(&task, request, script_text, "production_assets")
            .await?;
        let response = ProductionResponse::from_value(&answer);

        let output = AssetOutput::Production {
            music_prompts: music.then(|| clean_list(response.music_prompts)),
            bullet_points: bullet_points.then_some(response.bullet_points),
        };
        Ok((output, usage))
    }

    async fn section_prompts(
        &self,
        request: &GenerationRequest,
        section_label: String,
        source_text: String,
    ) -> (SectionImagePrompts, LlmUsage) {
        let mut section = SectionImagePrompts {
            section_label,
            source_text,
            prompts: Vec::new(),
        };
        if section.source_text.trim().is_empty() {
            return (section, LlmUsage::default());
        }

        let per_section = self.config.image_prompts_per_section;
        let task = PromptTask::ImagePrompts {
            section_label: section.section_label.clone(),
            prompts_per_section: per_section,
        };
        let result = invoke_json::<C, Value>(
            self.client.as_ref(),
            &self.config,
            &task,
            request,
            Some(&section.source_text),
            self.config.asset_max_tokens,
        )
        .await;

        match result {
            Ok((answer, usage)) => {
                let mut prompts = clean_list(text_list(&answer, "prompts"));
                prompts.truncate(per_section);
                section.prompts = prompts;
                (section, usage)
            }
            Err(e) => {
                warn!(
                    section = %section.section_label,
                    error = %e,
                    "No image prompts for section"
                );
                if e.is_parse_failure() {
                    PARSE_FALLBACKS.with_label_values(&["image_prompts"]).inc();
                }
                (section, LlmUsage::default())
            }
        }
    }

    /// One auxiliary call. Unparseable output reads as `Value::Null`, which
    /// every answer shape turns into its empty value.
    async fn call(
        &self,
        task: &PromptTask,
        request: &GenerationRequest,
        script_text: &str,
        asset: &str,
    ) -> Result<(Value, LlmUsage), GenerationError> {
        let result = invoke_json::<C, Value>(
            self.client.as_ref(),
            &self.config,
            task,
            request,
            Some(script_text),
            self.config.asset_max_tokens,
        )
        .await;

        match result {
            Ok(parsed) => Ok(parsed),
            Err(e) if e.is_parse_failure() => {
                warn!(asset, error = %e, "Unparseable answer, using empty value");
                PARSE_FALLBACKS.with_label_values(&[asset]).inc();
                Ok((Value::Null, LlmUsage::default()))
            }
            Err(e) => Err(GenerationError::invocation(task.label(), e)),
        }
    }
}

/// Trim entries and drop empty ones.
fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ============================================================================
// Model answer shapes
// ============================================================================

#[derive(Debug, Default)]
struct SeoResponse {
    titles: Vec<String>,
    description: String,
    tags: Vec<String>,
}

impl SeoResponse {
    fn from_value(answer: &Value) -> Self {
        Self {
            titles: text_list(answer, "titles"),
            description: text(answer, "description"),
            tags: text_list(answer, "tags"),
        }
    }

    fn into_package(self) -> SeoPackage {
        let mut titles = clean_list(self.titles);
        titles.truncate(MAX_TITLES);

        let mut tags: Vec<String> = Vec::new();
        for tag in clean_list(self.tags) {
            if !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
                tags.push(tag);
            }
        }

        SeoPackage {
            titles,
            description: self.description.trim().to_string(),
            tags,
        }
    }
}

#[derive(Debug, Default)]
struct ThumbnailResponse {
    concept_name: String,
    description: String,
    curiosity_words: Vec<String>,
    design_concepts: Vec<DesignConcept>,
    ai_prompts: Vec<String>,
}

impl ThumbnailResponse {
    fn from_value(answer: &Value) -> Self {
        Self {
            concept_name: text(answer, "conceptName"),
            description: text(answer, "description"),
            curiosity_words: text_list(answer, "curiosityWords"),
            design_concepts: opt_list(answer, "designConcepts", design_concept).unwrap_or_default(),
            ai_prompts: text_list(answer, "aiPrompts"),
        }
    }

    fn into_concept(self) -> ThumbnailConcept {
        ThumbnailConcept {
            concept_name: self.concept_name.trim().to_string(),
            description: self.description.trim().to_string(),
            curiosity_words: clean_list(self.curiosity_words),
            design_concepts: self.design_concepts,
            ai_prompts: clean_list(self.ai_prompts),
        }
    }
}

#[derive(Debug, Default)]
struct ProductionResponse {
    music_prompts: Vec<String>,
    bullet_points: Vec<BulletPoint>,
}

impl ProductionResponse {
    fn from_value(answer: &Value) -> Self {
        Self {
            music_prompts: text_list(answer, "musicPrompts"),
            bullet_points: opt_list(answer, "bulletPoints", bullet_point).unwrap_or_default(),
        }
    }
}
