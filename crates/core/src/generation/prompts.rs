//! Prompt construction for every generation task.
//!
//! Everything here is a pure function of its inputs: the same task, request
//! and prior text always produce the same prompt. Nothing in this module
//! talks to a model.

use crate::generation::quantity::QuantitySpec;
use crate::generation::types::{GenerationRequest, Tone};

/// Upper bound on script text embedded into auxiliary prompts.
const MAX_CONTEXT_CHARS: usize = 8000;

/// Numbered entries spelled out in a retry prompt before it switches to a
/// single "continue up to N" line.
const MAX_LISTED_ENTRIES: usize = 20;

/// Stock phrases the model must not reproduce.
pub const BANNED_PHRASES: [&str; 30] = [
    "In today's video",
    "Without further ado",
    "Let's dive in",
    "Dive deep",
    "Buckle up",
    "Game-changer",
    "In this day and age",
    "At the end of the day",
    "It's no secret that",
    "Unlock the secrets",
    "Harness the power of",
    "Look no further",
    "Stay tuned",
    "Smash that like button",
    "Don't forget to subscribe",
    "Hey guys",
    "Welcome back to my channel",
    "In conclusion",
    "Last but not least",
    "Needless to say",
    "In the world of",
    "A testament to",
    "Navigate the complexities",
    "Delve into",
    "Embark on a journey",
    "Elevate your",
    "Revolutionize the way",
    "Whether you're a beginner or a pro",
    "It's important to note",
    "In a nutshell",
];

/// A system instruction paired with the user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// What a prompt is asking the model to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptTask {
    /// First script attempt.
    Script { quantity: QuantitySpec },
    /// The single corrective attempt after a wrong item count.
    ScriptRetry {
        quantity: QuantitySpec,
        previous_count: usize,
    },
    Seo,
    Thumbnails,
    /// Prompts for one script section; the section text is the prior text.
    ImagePrompts {
        section_label: String,
        prompts_per_section: usize,
    },
    /// Music prompts and/or a bullet outline in a single answer.
    ProductionAssets { music: bool, bullet_points: bool },
}

impl PromptTask {
    /// Stable label used for logging, metrics and request routing in tests.
    pub fn label(&self) -> &'static str {
        match self {
            PromptTask::Script { .. } => "script",
            PromptTask::ScriptRetry { .. } => "script_retry",
            PromptTask::Seo => "seo",
            PromptTask::Thumbnails => "thumbnails",
            PromptTask::ImagePrompts { .. } => "image_prompts",
            PromptTask::ProductionAssets { .. } => "production_assets",
        }
    }
}

/// Build the prompt for `task`.
///
/// `prior_text` is the script text for auxiliary tasks, or the section text
/// for image prompts. It is ignored by the script tasks.
pub fn build_prompt(
    task: &PromptTask,
    request: &GenerationRequest,
    prior_text: Option<&str>,
) -> Prompt {
    match task {
        PromptTask::Script { quantity } => Prompt {
            system: script_system_prompt(request.tone),
            user: script_user_prompt(request, quantity, None),
        },
        PromptTask::ScriptRetry {
            quantity,
            previous_count,
        } => Prompt {
            system: script_system_prompt(request.tone),
            user: script_user_prompt(request, quantity, Some(*previous_count)),
        },
        PromptTask::Seo => seo_prompt(request, prior_text),
        PromptTask::Thumbnails => thumbnail_prompt(request, prior_text),
        PromptTask::ImagePrompts {
            section_label,
            prompts_per_section,
        } => image_prompt(request, section_label, prior_text.unwrap_or(""), *prompts_per_section),
        PromptTask::ProductionAssets {
            music,
            bullet_points,
        } => production_prompt(request, prior_text, *music, *bullet_points),
    }
}

/// Stylistic guidance for a tone.
pub fn tone_guidance(tone: Tone) -> &'static str {
    match tone {
        Tone::Informative => {
            "Write in a clear, factual and well-organized voice. Lead with concrete facts, \
             numbers and examples. Explain cause and effect plainly and avoid hype; the viewer \
             should finish each section knowing something specific they did not know before."
        }
        Tone::Entertaining => {
            "Write with energy and personality. Use vivid scenarios, surprising turns and \
             playful pacing. Keep sentences short and punchy, vary rhythm, and make every \
             section feel like it is building to a payoff."
        }
        Tone::Educational => {
            "Write like a patient teacher. Introduce one idea at a time, define terms before \
             using them, build from simple to complex, and reinforce each concept with an \
             example the viewer can picture or try themselves."
        }
        Tone::Inspirational => {
            "Write with warmth and conviction. Ground motivation in real, relatable struggles \
             and specific turning points rather than slogans. Speak directly to the viewer's \
             potential and close each section with a concrete, encouraging action."
        }
        Tone::Conversational => {
            "Write the way a knowledgeable friend talks. Use contractions, direct address and \
             natural asides. Keep it relaxed and honest, ask the occasional rhetorical question, \
             and avoid anything that sounds like a lecture or an advertisement."
        }
        Tone::Professional => {
            "Write in a polished, authoritative and concise register. Prefer precise vocabulary, \
             evidence and structured reasoning. Avoid slang and exaggeration; every sentence \
             should earn its place and respect the viewer's time."
        }
        Tone::Humorous => {
            "Write with wit. Use observational humor, unexpected comparisons and light \
             self-awareness while still delivering real information. Jokes should support the \
             point of each section, never replace it."
        }
    }
}

fn banned_phrases_block() -> String {
    let mut block = String::from(
        "NEVER use any of these overused phrases (or close variations of them):\n",
    );
    for phrase in BANNED_PHRASES {
        block.push_str(&format!("- \"{}\"\n", phrase));
    }
    block
}

fn script_system_prompt(tone: Tone) -> String {
    format!(
        r#"You are an expert YouTube scriptwriter. You write original, specific, spoken-word scripts that hold attention from the first second to the last.

TONE ({tone}):
{guidance}

STYLE RULES:
1. Write for the ear: short sentences, natural spoken rhythm
2. Open with a hook that creates curiosity in the first 15 seconds
3. Every main section delivers one concrete, useful idea
4. No filler, no generic motivational padding
5. Do not include stage directions or camera notes inside the content

{banned}
Respond with a single JSON object only, no other text."#,
        tone = tone,
        guidance = tone_guidance(tone),
        banned = banned_phrases_block(),
    )
}

fn script_schema(quantity: &QuantitySpec) -> String {
    let item = if quantity.is_qa_format {
        r#"{"title": "1. <the question>", "content": "<the full answer>", "duration": "<m:ss-m:ss>"}"#
    } else {
        r#"{"title": "1. <item title>", "content": "<spoken text>", "duration": "<m:ss-m:ss>"}"#
    };

    let main_content = match quantity.requested_quantity {
        Some(n) => format!("[ /* exactly {} objects like: */ {} ]", n, item),
        None => format!("[ {}, ... ]", item),
    };

    format!(
        r#"{{
  "hook": {{"title": "<title>", "content": "<spoken text>", "duration": "<m:ss-m:ss>"}},
  "introduction": {{"title": "<title>", "content": "<spoken text>", "duration": "<m:ss-m:ss>"}},
  "mainContent": {main_content},
  "conclusion": {{"title": "<title>", "content": "<spoken text>", "duration": "<m:ss-m:ss>"}},
  "estimatedDuration": "<total runtime, e.g. 4:30>"
}}"#
    )
}

/// The numbered-items directive injected when the topic names a count.
fn quantity_directive(quantity: &QuantitySpec) -> Option<String> {
    let n = quantity.requested_quantity?;

    let directive = if quantity.is_qa_format {
        format!(
            r#"CRITICAL STRUCTURE REQUIREMENT:
The topic asks for exactly {n} questions. "mainContent" MUST contain exactly {n} separate objects.
- Each object is ONE question and its answer: the question goes in "title", the answer in "content"
- Number the questions individually: "1. ...", "2. ...", up to "{n}. ..."
- NEVER combine two questions into one object
- NEVER group questions into themed sections
- Do not add bonus questions and do not leave any out: exactly {n}, no more, no fewer"#
        )
    } else {
        format!(
            r#"CRITICAL STRUCTURE REQUIREMENT:
The topic asks for exactly {n} items. "mainContent" MUST contain exactly {n} separate objects.
- Each object covers ONE item only
- Number the items individually in "title": "1. ...", "2. ...", up to "{n}. ..."
- NEVER group several items into one object or into themed sections
- Do not add bonus items and do not leave any out: exactly {n}, no more, no fewer"#
        )
    };

    Some(directive)
}

fn retry_directive(quantity: &QuantitySpec, previous_count: usize) -> Option<String> {
    let n = quantity.requested_quantity?;
    let unit = if quantity.is_qa_format {
        "question-and-answer pairs"
    } else {
        "items"
    };

    let mut numbered = String::new();
    for i in 1..=n.min(MAX_LISTED_ENTRIES) {
        numbered.push_str(&format!("  mainContent[{}] -> title starts with \"{}.\"\n", i - 1, i));
    }
    if n > MAX_LISTED_ENTRIES {
        numbered.push_str(&format!(
            "  ... continue the same numbering up to mainContent[{}] -> title starts with \"{}.\"\n",
            n - 1,
            n
        ));
    }

    Some(format!(
        r#"YOUR PREVIOUS ANSWER WAS REJECTED.
It contained {previous_count} objects in "mainContent", but exactly {n} {unit} are required.
This time "mainContent" MUST be an array of exactly {n} objects, one per numbered entry:
{numbered}Count the objects before answering. An answer with any other number of objects is invalid."#
    ))
}

fn script_user_prompt(
    request: &GenerationRequest,
    quantity: &QuantitySpec,
    retry_of: Option<usize>,
) -> String {
    let mut prompt = format!("Write a video script about:\n\n{}", request.subject_text.trim());

    prompt.push_str(&format!(
        "\n\nTarget length: {} (about {} words of spoken content)",
        request.duration,
        request.duration.target_words()
    ));
    prompt.push_str(&format!("\nTone: {}", request.tone));

    if let Some(template) = request
        .template_text
        .as_deref()
        .filter(|t| !t.trim().is_empty())
    {
        prompt.push_str("\n\nFollow this structure template:\n");
        prompt.push_str(template.trim());
    }

    if let Some(directive) = quantity_directive(quantity) {
        prompt.push_str("\n\n");
        prompt.push_str(&directive);
    }

    if let Some(previous_count) = retry_of {
        if let Some(directive) = retry_directive(quantity, previous_count) {
            prompt.push_str("\n\n");
            prompt.push_str(&directive);
        }
    }

    prompt.push_str("\n\nRespond with JSON in exactly this shape:\n");
    prompt.push_str(&script_schema(quantity));
    prompt
}

/// Append the topic and (bounded) script context shared by auxiliary prompts.
fn push_context(prompt: &mut String, request: &GenerationRequest, prior_text: Option<&str>) {
    prompt.push_str(&format!("Topic: {}", request.subject_text.trim()));
    prompt.push_str(&format!("\nTone: {}", request.tone));

    if let Some(script) = prior_text.map(str::trim).filter(|s| !s.is_empty()) {
        let excerpt: String = script.chars().take(MAX_CONTEXT_CHARS).collect();
        prompt.push_str("\n\nScript:\n");
        prompt.push_str(&excerpt);
    }
}

fn seo_prompt(request: &GenerationRequest, prior_text: Option<&str>) -> Prompt {
    let system = format!(
        r#"You are a YouTube SEO specialist. You write titles that earn clicks honestly, descriptions that rank, and tags that match real search behavior.

RULES:
1. Exactly 5 title options, each under 70 characters, each using a different angle
2. Description: 2-3 short paragraphs, primary keyword in the first sentence, ends with a call to action
3. 10-15 tags, most specific first, no hashtags, no duplicates

{banned}
Respond with a single JSON object only, no other text."#,
        banned = banned_phrases_block(),
    );

    let mut user = String::from("Create the SEO package for this video.\n\n");
    push_context(&mut user, request, prior_text);
    user.push_str(
        r#"

Respond with JSON in exactly this shape:
{
  "titles": ["<title 1>", "<title 2>", "<title 3>", "<title 4>", "<title 5>"],
  "description": "<description>",
  "tags": ["<tag>", "..."]
}"#,
    );

    Prompt { system, user }
}

fn thumbnail_prompt(request: &GenerationRequest, prior_text: Option<&str>) -> Prompt {
    let system = r#"You are a thumbnail design strategist for YouTube. You design thumbnails that are readable at small sizes and create an information gap the video resolves.

RULES:
1. One core concept with a short name and a one-paragraph description
2. 3-5 curiosity words or phrases of at most 4 words each, suitable as thumbnail text
3. 3 design concepts, each with a name and a description of layout, colors, subject and expression
4. 3 prompts for an image generation model, one per design concept, with no text rendered in the image

Respond with a single JSON object only, no other text."#
        .to_string();

    let mut user = String::from("Design the thumbnail for this video.\n\n");
    push_context(&mut user, request, prior_text);
    user.push_str(
        r#"

Respond with JSON in exactly this shape:
{
  "conceptName": "<name>",
  "description": "<description>",
  "curiosityWords": ["<phrase>", "..."],
  "designConcepts": [{"name": "<name>", "description": "<description>"}],
  "aiPrompts": ["<prompt>", "..."]
}"#,
    );

    Prompt { system, user }
}

fn image_prompt(
    request: &GenerationRequest,
    section_label: &str,
    section_text: &str,
    count: usize,
) -> Prompt {
    let system = r#"You are a visual director for video production. You turn narration into concrete, filmable visuals for an image generation model.

RULES:
1. Describe subject, setting, composition, lighting and style in each prompt
2. Visuals must illustrate what the narration says, not decorate it
3. No text, captions, logos or watermarks in the images
4. Keep a consistent visual style across prompts

Respond with a single JSON object only, no other text."#
        .to_string();

    let user = format!(
        r#"Video topic: {topic}
Section: {section_label}

Narration:
{section_text}

Write exactly {count} distinct image prompts for this section.

Respond with JSON in exactly this shape:
{{"prompts": ["<prompt>", "..."]}}"#,
        topic = request.subject_text.trim(),
        section_text = section_text.trim(),
    );

    Prompt { system, user }
}

fn production_prompt(
    request: &GenerationRequest,
    prior_text: Option<&str>,
    music: bool,
    bullet_points: bool,
) -> Prompt {
    let system = r#"You are a video production assistant. You prepare practical assets an editor can use immediately.

Respond with a single JSON object only, no other text."#
        .to_string();

    let mut user = String::from("Prepare production assets for this video.\n\n");
    push_context(&mut user, request, prior_text);

    let mut fields = Vec::new();
    if music {
        user.push_str(
            "\n\nMUSIC: write 3-5 prompts for a music generation model describing background \
             tracks (genre, tempo, instruments, mood) that fit the tone and the flow of the video.",
        );
        fields.push(r#"  "musicPrompts": ["<prompt>", "..."]"#);
    }
    if bullet_points {
        user.push_str(
            "\n\nOUTLINE: summarize the video as bullet points, one per main idea in order, each \
             with 2-4 short supporting sub-points.",
        );
        fields.push(r#"  "bulletPoints": [{"title": "<main point>", "subPoints": ["<detail>", "..."]}]"#);
    }

    user.push_str("\n\nRespond with JSON in exactly this shape:\n{\n");
    user.push_str(&fields.join(",\n"));
    user.push_str("\n}");

    Prompt { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::quantity::extract_quantity;
    use crate::generation::types::{AssetKind, DurationBucket};

    fn request(subject: &str) -> GenerationRequest {
        GenerationRequest::new(subject).with_assets([AssetKind::Script])
    }

    #[test]
    fn test_script_prompt_is_deterministic() {
        let req = request("10 ways to save money").with_tone(Tone::Humorous);
        let task = PromptTask::Script {
            quantity: QuantitySpec::exactly(10),
        };
        assert_eq!(build_prompt(&task, &req, None), build_prompt(&task, &req, None));
    }

    #[test]
    fn test_script_prompt_contains_word_target() {
        let req = request("Saving money").with_duration(DurationBucket::Standard);
        let prompt = build_prompt(
            &PromptTask::Script {
                quantity: QuantitySpec::unconstrained(),
            },
            &req,
            None,
        );
        assert!(prompt.user.contains("3-5 minutes (Standard)"));
        assert!(prompt.user.contains("about 600 words"));
    }

    #[test]
    fn test_script_prompt_includes_tone_guidance_and_banned_phrases() {
        let req = request("Saving money").with_tone(Tone::Professional);
        let prompt = build_prompt(
            &PromptTask::Script {
                quantity: QuantitySpec::unconstrained(),
            },
            &req,
            None,
        );
        assert!(prompt.system.contains(tone_guidance(Tone::Professional)));
        for phrase in BANNED_PHRASES {
            assert!(prompt.system.contains(phrase), "missing banned phrase {}", phrase);
        }
    }

    #[test]
    fn test_unconstrained_script_has_no_directive() {
        let prompt = build_prompt(
            &PromptTask::Script {
                quantity: QuantitySpec::unconstrained(),
            },
            &request("Saving money"),
            None,
        );
        assert!(!prompt.user.contains("CRITICAL STRUCTURE REQUIREMENT"));
        assert!(!prompt.user.contains("/* exactly"));
    }

    #[test]
    fn test_list_directive() {
        let prompt = build_prompt(
            &PromptTask::Script {
                quantity: QuantitySpec::exactly(10),
            },
            &request("10 ways to save money"),
            None,
        );
        assert!(prompt.user.contains("CRITICAL STRUCTURE REQUIREMENT"));
        assert!(prompt.user.contains("exactly 10 items"));
        assert!(prompt.user.contains("exactly 10 separate objects"));
        assert!(!prompt.user.contains("question"));
    }

    #[test]
    fn test_qa_directive_phrases_question_answer_pairs() {
        let prompt = build_prompt(
            &PromptTask::Script {
                quantity: QuantitySpec::qa(5),
            },
            &request("5 questions and answers about sleep"),
            None,
        );
        assert!(prompt.user.contains("exactly 5 questions"));
        assert!(prompt.user.contains("ONE question and its answer"));
        assert!(prompt.user.contains("<the question>"));
    }

    #[test]
    fn test_retry_prompt_names_previous_count() {
        let prompt = build_prompt(
            &PromptTask::ScriptRetry {
                quantity: QuantitySpec::exactly(3),
                previous_count: 7,
            },
            &request("3 tips for sleeping"),
            None,
        );
        assert!(prompt.user.contains("It contained 7 objects"));
        assert!(prompt.user.contains("mainContent[2] -> title starts with \"3.\""));
        assert!(!prompt.user.contains("mainContent[3]"));
    }

    #[test]
    fn test_retry_prompt_for_huge_count_stays_small() {
        let prompt = build_prompt(
            &PromptTask::ScriptRetry {
                quantity: QuantitySpec::exactly(2_000_000),
                previous_count: 12,
            },
            &request("2000000 tips for sleeping"),
            None,
        );
        assert!(prompt.user.len() < 20_000, "prompt is {} bytes", prompt.user.len());
        assert!(prompt.user.contains("exactly 2000000 items"));
        assert!(prompt.user.contains("mainContent[19] -> title starts with \"20.\""));
        assert!(!prompt.user.contains("mainContent[20] "));
        assert!(prompt.user.contains("up to mainContent[1999999] -> title starts with \"2000000.\""));
    }

    #[test]
    fn test_single_word_question_topic_gets_list_directive() {
        let subject = "10 tips for answering any interview question";
        let prompt = build_prompt(
            &PromptTask::Script {
                quantity: extract_quantity(subject),
            },
            &request(subject),
            None,
        );
        assert!(prompt.user.contains("exactly 10 items"));
        assert!(!prompt.user.contains("exactly 10 questions"));
    }

    #[test]
    fn test_template_is_included() {
        let req = request("Sleep").with_template("Problem, Story, Solution");
        let prompt = build_prompt(
            &PromptTask::Script {
                quantity: QuantitySpec::unconstrained(),
            },
            &req,
            None,
        );
        assert!(prompt.user.contains("Problem, Story, Solution"));
    }

    #[test]
    fn test_seo_prompt_embeds_script_text() {
        let prompt = build_prompt(&PromptTask::Seo, &request("Sleep"), Some("The full script body"));
        assert!(prompt.user.contains("The full script body"));
        assert!(prompt.user.contains("\"titles\""));
    }

    #[test]
    fn test_context_is_bounded() {
        let long = "x".repeat(MAX_CONTEXT_CHARS + 500);
        let prompt = build_prompt(&PromptTask::Thumbnails, &request("Sleep"), Some(&long));
        assert!(prompt.user.len() < MAX_CONTEXT_CHARS + 1000);
    }

    #[test]
    fn test_production_prompt_only_requests_selected_parts() {
        let req = request("Sleep");
        let music_only = build_prompt(
            &PromptTask::ProductionAssets {
                music: true,
                bullet_points: false,
            },
            &req,
            None,
        );
        assert!(music_only.user.contains("musicPrompts"));
        assert!(!music_only.user.contains("bulletPoints"));

        let both = build_prompt(
            &PromptTask::ProductionAssets {
                music: true,
                bullet_points: true,
            },
            &req,
            None,
        );
        assert!(both.user.contains("musicPrompts"));
        assert!(both.user.contains("bulletPoints"));
    }

    #[test]
    fn test_image_prompt_uses_section() {
        let prompt = build_prompt(
            &PromptTask::ImagePrompts {
                section_label: "Main Content #2".to_string(),
                prompts_per_section: 3,
            },
            &request("Sleep"),
            Some("Keep the bedroom cool."),
        );
        assert!(prompt.user.contains("Section: Main Content #2"));
        assert!(prompt.user.contains("Keep the bedroom cool."));
        assert!(prompt.user.contains("exactly 3 distinct"));
    }

    #[test]
    fn test_task_labels() {
        assert_eq!(PromptTask::Seo.label(), "seo");
        assert_eq!(
            PromptTask::ScriptRetry {
                quantity: QuantitySpec::exactly(1),
                previous_count: 0
            }
            .label(),
            "script_retry"
        );
    }
}
