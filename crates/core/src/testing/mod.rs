//! Testing utilities and a mock model client.
//!
//! The mock answers by prompt task label, so a test can script the whole
//! generation flow without a real model.
//!
//! # Example
//!
//! ```rust,ignore
//! use contentforge_core::testing::{fixtures, MockLlmClient, MockReply};
//!
//! let client = Arc::new(MockLlmClient::new());
//! client.on("script", MockReply::text(fixtures::script_json(10, "Way")));
//! client.on("seo", MockReply::text(fixtures::seo_json()));
//!
//! let orchestrator = ContentOrchestrator::new(client.clone(), GenerationConfig::default());
//! ```

mod mock_llm_client;

pub use mock_llm_client::{MockLlmClient, MockReply};

/// Model answers in the shapes the generators expect.
pub mod fixtures {
    use serde_json::json;

    fn item(title: String, content: String) -> serde_json::Value {
        json!({ "title": title, "content": content, "duration": "0:30" })
    }

    /// A script answer with `items` main content entries titled "N. {tag} N".
    pub fn script_json(items: usize, tag: &str) -> String {
        let main: Vec<_> = (1..=items)
            .map(|i| {
                item(
                    format!("{}. {} {}", i, tag, i),
                    format!("Here is everything about {} number {}.", tag.to_lowercase(), i),
                )
            })
            .collect();

        json!({
            "hook": item("Hook".into(), format!("{} things nobody tells you.", tag)),
            "introduction": item("Introduction".into(), "Let's get straight into it.".into()),
            "mainContent": main,
            "conclusion": item("Conclusion".into(), "Thanks for watching.".into()),
            "estimatedDuration": "4:00"
        })
        .to_string()
    }

    /// A script answer with `items` question and answer entries.
    pub fn qa_script_json(items: usize) -> String {
        let main: Vec<_> = (1..=items)
            .map(|i| {
                item(
                    format!("{}. Question {}?", i, i),
                    format!("Answer {}: it depends, and here is why.", i),
                )
            })
            .collect();

        json!({
            "hook": item("Hook".into(), "You asked, we answer.".into()),
            "introduction": item("Introduction".into(), "Five questions from the comments.".into()),
            "mainContent": main,
            "conclusion": item("Conclusion".into(), "Keep the questions coming.".into()),
            "estimatedDuration": "3:30"
        })
        .to_string()
    }

    /// An SEO answer, wrapped in a code fence like real models often do.
    pub fn seo_json() -> String {
        format!(
            "```json\n{}\n```",
            json!({
                "titles": [
                    "10 Ways to Save Money Fast",
                    "Save Money Without Trying",
                    "The Budget Habits That Work",
                    "I Tried 10 Money Hacks",
                    "Stop Overspending Today",
                    "A Sixth Title To Drop"
                ],
                "description": "Practical ways to save money every month.",
                "tags": ["save money", " budgeting ", "", "save money", "personal finance"]
            })
        )
    }

    pub fn thumbnail_json() -> String {
        json!({
            "conceptName": "Piggy Bank Shock",
            "description": "A surprised face next to an overflowing piggy bank.",
            "curiosityWords": ["STOP THIS", "$500/month"],
            "designConcepts": [
                { "name": "Split", "description": "Before and after wallet." },
                { "name": "Close-up", "description": "Coins falling into a jar." }
            ],
            "aiPrompts": ["overflowing piggy bank, studio light, shallow depth of field"]
        })
        .to_string()
    }

    /// An image prompt answer with the given prompts.
    pub fn image_prompts_json(prompts: &[&str]) -> String {
        json!({ "prompts": prompts }).to_string()
    }

    /// A production answer with music prompts and/or bullet points.
    pub fn production_json(music: bool, bullet_points: bool) -> String {
        let mut value = json!({});
        if music {
            value["musicPrompts"] = json!(["upbeat lo-fi, 90 bpm, warm keys", "light acoustic guitar"]);
        }
        if bullet_points {
            value["bulletPoints"] = json!([
                { "title": "Track spending", "subPoints": ["Use one app", "Review weekly"] },
                { "title": "Cook at home", "subPoints": ["Meal prep Sundays"] }
            ]);
        }
        value.to_string()
    }
}
