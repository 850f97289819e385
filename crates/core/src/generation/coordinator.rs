//! Content orchestrator - runs the script step, then fans out auxiliary generators.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, error, info};

use crate::generation::assets::{AssetGenerator, ImageSource};
use crate::generation::config::GenerationConfig;
use crate::generation::llm::{LlmClient, LlmUsage};
use crate::generation::quantity::extract_quantity;
use crate::generation::script::ScriptGenerator;
use crate::generation::traits::{ContentGenerator, GenerationError};
use crate::generation::types::{
    AssetKind, AssetOutput, ContentPackage, GenerationRequest, GenerationResult,
};
use crate::metrics::{GENERATION_DURATION, GENERATION_REQUESTS};

type AssetTask<'a> = BoxFuture<'a, Result<(AssetOutput, LlmUsage), GenerationError>>;

/// Turns a generation request into a complete content package.
///
/// The script, when requested, is generated first because its text feeds
/// every auxiliary prompt. The auxiliary generators then run concurrently and
/// the orchestrator waits for all of them. Any raised error fails the whole
/// request; the first one to complete is reported.
pub struct ContentOrchestrator<C: LlmClient> {
    scripts: ScriptGenerator<C>,
    assets: AssetGenerator<C>,
}

impl<C: LlmClient> ContentOrchestrator<C> {
    pub fn new(client: Arc<C>, config: GenerationConfig) -> Self {
        Self {
            scripts: ScriptGenerator::new(Arc::clone(&client), config.clone()),
            assets: AssetGenerator::new(client, config),
        }
    }

    async fn run(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        request
            .validate()
            .map_err(GenerationError::InvalidRequest)?;

        let quantity = extract_quantity(&request.subject_text);
        info!(
            subject = %request.subject_text,
            requested_quantity = ?quantity.requested_quantity,
            qa_format = quantity.is_qa_format,
            kinds = ?request.requested_asset_kinds,
            uploaded_script = request.existing_script.is_some(),
            "Starting content generation"
        );

        let mut package = ContentPackage::default();
        let mut usage = LlmUsage::default();
        let mut script_attempts = 0;
        let mut script = None;

        if request.existing_script.is_none() && request.wants(AssetKind::Script) {
            let outcome = self.scripts.generate(request, &quantity).await?;
            usage.accumulate(&outcome.usage);
            script_attempts = outcome.attempts;
            script = Some(outcome.script);
        } else if request.existing_script.is_some() && request.wants(AssetKind::Script) {
            debug!("Uploaded script supplied, skipping script generation");
        }

        let (script_text, image_source) = match (&request.existing_script, &script) {
            (Some(text), _) => (text.clone(), ImageSource::Raw(text)),
            (None, Some(script)) => (script.full_text(), ImageSource::Structured(script)),
            (None, None) => (String::new(), ImageSource::Raw("")),
        };

        let mut tasks: FuturesUnordered<AssetTask<'_>> = FuturesUnordered::new();

        if request.wants(AssetKind::Seo) {
            let text = script_text.as_str();
            tasks.push(Box::pin(async move {
                let (seo, usage) = self.assets.seo(request, text).await?;
                Ok((AssetOutput::Seo(seo), usage))
            }));
        }
        if request.wants(AssetKind::Thumbnails) {
            let text = script_text.as_str();
            tasks.push(Box::pin(async move {
                let (concept, usage) = self.assets.thumbnails(request, text).await?;
                Ok((AssetOutput::Thumbnails(concept), usage))
            }));
        }
        if request.wants(AssetKind::ImagePrompts) {
            tasks.push(Box::pin(async move {
                let (sections, usage) = self.assets.image_prompts(request, image_source).await?;
                Ok((AssetOutput::ImagePrompts(sections), usage))
            }));
        }
        let music = request.wants(AssetKind::MusicAssets);
        let bullet_points = request.wants(AssetKind::BulletPoints);
        if music || bullet_points {
            let text = script_text.as_str();
            tasks.push(Box::pin(
                self.assets.production(request, text, music, bullet_points),
            ));
        }

        debug!(tasks = tasks.len(), "Launching auxiliary generators");

        let mut first_error: Option<GenerationError> = None;
        while let Some(result) = tasks.next().await {
            match result {
                Ok((output, task_usage)) => {
                    usage.accumulate(&task_usage);
                    package.apply(output);
                }
                Err(e) => {
                    error!(error = %e, "Auxiliary generator failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        drop(tasks);

        if let Some(e) = first_error {
            return Err(e);
        }
        package.script = script;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            duration_ms,
            script_attempts,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Content generation complete"
        );

        Ok(GenerationResult {
            package,
            llm_usage: usage,
            script_attempts,
            duration_ms,
        })
    }
}

#[async_trait]
impl<C: LlmClient + 'static> ContentGenerator for ContentOrchestrator<C> {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let result = self.run(request).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        GENERATION_REQUESTS.with_label_values(&[outcome]).inc();
        GENERATION_DURATION
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        if let Err(e) = &result {
            error!(error = %e, "Content generation failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::types::{DurationBucket, Tone};
    use crate::testing::{fixtures, MockLlmClient, MockReply};
    use std::time::Duration;

    fn orchestrator(client: Arc<MockLlmClient>) -> ContentOrchestrator<MockLlmClient> {
        ContentOrchestrator::new(client, GenerationConfig::default())
    }

    #[tokio::test]
    async fn test_script_and_seo_for_counted_topic() {
        let client = Arc::new(MockLlmClient::new());
        client.on("script", MockReply::text(fixtures::script_json(10, "Way")));
        client.on("seo", MockReply::text(fixtures::seo_json()));

        let request = GenerationRequest::new("10 ways to save money")
            .with_duration(DurationBucket::Standard)
            .with_assets([AssetKind::Script, AssetKind::Seo]);

        let result = orchestrator(client.clone()).generate(&request).await.unwrap();

        let script = result.package.script.unwrap();
        assert_eq!(script.main_content.len(), 10);
        assert!(result.package.seo.is_some());
        assert!(result.package.thumbnails.is_none());
        assert!(result.package.assets.is_none());
        assert_eq!(result.script_attempts, 1);
        assert_eq!(result.llm_usage.input_tokens, 400);

        assert_eq!(client.call_labels(), vec!["script", "seo"]);
        let seo_prompt = &client.requests_for("seo")[0].prompt;
        assert!(seo_prompt.contains("Here is everything about way number 10."));
    }

    #[tokio::test]
    async fn test_contract_violation_fails_before_fan_out() {
        let client = Arc::new(MockLlmClient::new());
        client.on("script", MockReply::text(fixtures::script_json(8, "Way")));
        client.on("script_retry", MockReply::text(fixtures::script_json(9, "Way")));
        client.on("seo", MockReply::text(fixtures::seo_json()));

        let request = GenerationRequest::new("10 ways to save money")
            .with_assets([AssetKind::Script, AssetKind::Seo]);

        let result = orchestrator(client.clone()).generate(&request).await;

        assert!(matches!(
            result,
            Err(GenerationError::QuantityContractViolation {
                expected: 10,
                actual: 9
            })
        ));
        assert_eq!(client.call_count("seo"), 0);
    }

    #[tokio::test]
    async fn test_auxiliary_generators_run_concurrently() {
        let client = Arc::new(MockLlmClient::new());
        client.on("seo", MockReply::text(fixtures::seo_json()));
        client.on("thumbnails", MockReply::text(fixtures::thumbnail_json()));
        client.on("production_assets", MockReply::text(fixtures::production_json(true, true)));
        client.set_delay(Duration::from_millis(20));

        let request = GenerationRequest::new("Budget travel")
            .with_assets([
                AssetKind::Seo,
                AssetKind::Thumbnails,
                AssetKind::MusicAssets,
                AssetKind::BulletPoints,
            ]);

        let result = orchestrator(client.clone()).generate(&request).await.unwrap();

        assert_eq!(client.max_concurrent_calls(), 3);
        assert_eq!(client.call_count("production_assets"), 1);
        assert_eq!(result.script_attempts, 0);
        let assets = result.package.assets.unwrap();
        assert_eq!(assets.music_prompts.len(), 2);
        assert_eq!(assets.bullet_points.len(), 2);
        assert!(assets.image_prompts.is_empty());
    }

    #[tokio::test]
    async fn test_assets_bucket_merges_regardless_of_completion_order() {
        for slow in ["image_prompts", "production_assets"] {
            let client = Arc::new(MockLlmClient::new());
            client.on("script", MockReply::text(fixtures::script_json(2, "Tip")));
            client.on("image_prompts", MockReply::text(fixtures::image_prompts_json(&["shot"])));
            client.on("production_assets", MockReply::text(fixtures::production_json(true, false)));
            client.set_label_delay(slow, Duration::from_millis(30));

            let request = GenerationRequest::new("2 tips for focus").with_assets([
                AssetKind::Script,
                AssetKind::ImagePrompts,
                AssetKind::MusicAssets,
            ]);

            let result = orchestrator(client).generate(&request).await.unwrap();
            let assets = result.package.assets.unwrap();

            assert_eq!(assets.image_prompts.len(), 5, "slow task: {}", slow);
            assert_eq!(assets.music_prompts.len(), 2, "slow task: {}", slow);
            assert!(assets.bullet_points.is_empty());
        }
    }

    #[tokio::test]
    async fn test_auxiliary_invocation_failure_fails_request_after_siblings_settle() {
        let client = Arc::new(MockLlmClient::new());
        client.on("script", MockReply::text(fixtures::script_json(3, "Idea")));
        client.on("seo", MockReply::api_error(503, "overloaded"));
        client.on("thumbnails", MockReply::text(fixtures::thumbnail_json()));
        client.set_label_delay("thumbnails", Duration::from_millis(20));

        let request = GenerationRequest::new("3 ideas for dinner").with_assets([
            AssetKind::Script,
            AssetKind::Seo,
            AssetKind::Thumbnails,
        ]);

        let result = orchestrator(client.clone()).generate(&request).await;

        assert!(matches!(
            result,
            Err(GenerationError::ModelInvocation { ref task, .. }) if task == "seo"
        ));
        assert_eq!(client.call_count("thumbnails"), 1);
    }

    #[tokio::test]
    async fn test_first_completed_failure_is_reported() {
        let client = Arc::new(MockLlmClient::new());
        client.on("seo", MockReply::api_error(500, "seo down"));
        client.on("thumbnails", MockReply::api_error(500, "thumbnails down"));
        client.set_label_delay("seo", Duration::from_millis(40));

        let request =
            GenerationRequest::new("Sleep").with_assets([AssetKind::Seo, AssetKind::Thumbnails]);

        let result = orchestrator(client).generate(&request).await;

        assert!(matches!(
            result,
            Err(GenerationError::ModelInvocation { ref task, .. }) if task == "thumbnails"
        ));
    }

    #[tokio::test]
    async fn test_parse_failures_are_not_request_failures() {
        let client = Arc::new(MockLlmClient::new());
        client.on("script", MockReply::text(fixtures::script_json(1, "Fact")));
        client.on("seo", MockReply::text("garbage"));
        client.on("thumbnails", MockReply::text("more garbage"));

        let request = GenerationRequest::new("A fact about owls").with_assets([
            AssetKind::Script,
            AssetKind::Seo,
            AssetKind::Thumbnails,
        ]);

        let result = orchestrator(client).generate(&request).await.unwrap();

        assert!(result.package.seo.unwrap().is_empty());
        assert!(result.package.thumbnails.unwrap().is_empty());
        assert!(result.package.script.is_some());
    }

    #[tokio::test]
    async fn test_uploaded_script_skips_generation_and_uses_raw_sections() {
        let client = Arc::new(MockLlmClient::new());
        client.on("image_prompts", MockReply::text(fixtures::image_prompts_json(&["p"])));
        client.on_prompt_containing(
            "image_prompts",
            "Section: Section 2",
            MockReply::http_error("timeout"),
        );

        let uploaded = "Welcome back.\n\nToday we talk owls.\n\n\nBye!";
        let request = GenerationRequest::new("Owls")
            .with_existing_script(uploaded)
            .with_assets([AssetKind::Script, AssetKind::ImagePrompts]);

        let result = orchestrator(client.clone()).generate(&request).await.unwrap();

        assert!(result.package.script.is_none());
        assert_eq!(result.script_attempts, 0);
        let sections = result.package.assets.unwrap().image_prompts;
        let labels: Vec<&str> = sections.iter().map(|s| s.section_label.as_str()).collect();
        assert_eq!(labels, vec!["Section 1", "Section 2", "Section 3"]);
        assert_eq!(sections[0].prompts, vec!["p"]);
        assert!(sections[1].prompts.is_empty());
        assert_eq!(sections[2].source_text, "Bye!");
        assert_eq!(client.call_count("script"), 0);
    }

    #[tokio::test]
    async fn test_uploaded_script_feeds_auxiliary_prompts() {
        let client = Arc::new(MockLlmClient::new());
        client.on("thumbnails", MockReply::text(fixtures::thumbnail_json()));

        let request = GenerationRequest::new("Owls")
            .with_tone(Tone::Humorous)
            .with_existing_script("Owls can rotate their heads 270 degrees.")
            .with_assets([AssetKind::Thumbnails]);

        orchestrator(client.clone()).generate(&request).await.unwrap();

        let prompt = &client.requests_for("thumbnails")[0].prompt;
        assert!(prompt.contains("Owls can rotate their heads 270 degrees."));
    }

    #[tokio::test]
    async fn test_empty_asset_kinds_is_invalid_request() {
        let client = Arc::new(MockLlmClient::new());
        let request = GenerationRequest::new("Anything");

        let result = orchestrator(client.clone()).generate(&request).await;

        assert!(matches!(result, Err(GenerationError::InvalidRequest(_))));
        assert_eq!(client.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_script_invocation_failure_propagates() {
        let client = Arc::new(MockLlmClient::new());
        client.on("script", MockReply::http_error("dns failure"));

        let request = GenerationRequest::new("Sleep").with_assets([AssetKind::Script]);
        let result = orchestrator(client).generate(&request).await;

        assert!(matches!(result, Err(GenerationError::ModelInvocation { .. })));
    }

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let client = Arc::new(MockLlmClient::new());
        client.on("seo", MockReply::text(fixtures::seo_json()));

        let generator: Arc<dyn ContentGenerator> = Arc::new(orchestrator(client));
        let request = GenerationRequest::new("Sleep").with_assets([AssetKind::Seo]);

        assert!(generator.generate(&request).await.is_ok());
    }
}
