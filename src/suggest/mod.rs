//! Natural-language command suggestion.
//!
//! A small pattern table handles the common phrasings locally. Anything it
//! does not recognize goes to an OpenAI-compatible endpoint, whose reply is
//! constrained to a JSON object and a fixed set of command primitives.
//! Every failure mode collapses to `None`: a suggestion is advisory and
//! never worth an error to the caller.

use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::{Client, config::OpenAIConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SuggestConfig;

const PATTERN_CONFIDENCE: f32 = 0.8;
const MODEL_CONFIDENCE: f32 = 0.7;

const SYSTEM_PROMPT: &str = "You translate a user's plain-English request into exactly one shell \
     command. Respond with ONLY a JSON object of the form \
     {\"command\": \"...\", \"explanation\": \"...\"} and nothing else. \
     Use only these commands: ls, pwd, cat, head, tail, touch, mkdir, rm, \
     cp, mv, echo, clear, ps, kill, grep, find, df, whoami, hostname, \
     date, wc. If the request cannot be met with them, use an empty \
     command string.";

/// A command proposed for a natural-language request. The caller decides
/// whether to run it; suggestions always re-enter the normal safety path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSuggestion {
    pub command: String,
    pub explanation: String,
    pub confidence: f32,
}

pub struct Suggester {
    config: SuggestConfig,
    client: Client<OpenAIConfig>,
}

impl Suggester {
    pub fn new(config: SuggestConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Suggest a command for `input`. Pattern table first, model second,
    /// `None` when neither produces anything usable.
    pub async fn suggest(&self, input: &str) -> Option<CommandSuggestion> {
        if !self.config.enabled {
            return None;
        }
        if let Some(suggestion) = suggest_from_pattern(input) {
            debug!(input, command = %suggestion.command, "pattern suggestion");
            return Some(suggestion);
        }
        self.suggest_from_model(input).await
    }

    async fn suggest_from_model(&self, input: &str) -> Option<CommandSuggestion> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_PROMPT)
            .build()
            .ok()?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(input)
            .build()
            .ok()?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.config.model.clone())
            .messages([system.into(), user.into()])
            .max_tokens(200u32)
            .build()
            .ok()?;

        let response = match self.client.chat().create(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "suggestion request failed");
                return None;
            }
        };
        let content = response.choices.first()?.message.content.clone()?;
        parse_model_reply(&content)
    }
}

struct PatternRule {
    prefixes: &'static [&'static str],
    default_name: &'static str,
    build: fn(&str) -> (String, String),
}

static PATTERNS: &[PatternRule] = &[
    PatternRule {
        prefixes: &["make a folder", "create a folder", "new folder"],
        default_name: "new_folder",
        build: |name| {
            (
                format!("mkdir {name}"),
                format!("Creates a folder named '{name}'"),
            )
        },
    },
    PatternRule {
        prefixes: &["list files", "show files", "show directory", "show folders"],
        default_name: "",
        build: |_| {
            (
                "ls".to_string(),
                "Lists the files in the current directory".to_string(),
            )
        },
    },
    PatternRule {
        prefixes: &["where am i", "current directory", "show current directory"],
        default_name: "",
        build: |_| {
            (
                "pwd".to_string(),
                "Shows the current directory path".to_string(),
            )
        },
    },
    PatternRule {
        prefixes: &["delete folder", "remove folder"],
        default_name: "folder_to_delete",
        build: |name| {
            (
                format!("rm {name}"),
                format!("Deletes the folder '{name}'"),
            )
        },
    },
];

fn suggest_from_pattern(input: &str) -> Option<CommandSuggestion> {
    let lower = input.trim().to_lowercase();
    for rule in PATTERNS {
        for prefix in rule.prefixes {
            if let Some(rest) = lower.strip_prefix(prefix) {
                let name = rest.split_whitespace().next().unwrap_or(rule.default_name);
                let (command, explanation) = (rule.build)(name);
                return Some(CommandSuggestion {
                    command,
                    explanation,
                    confidence: PATTERN_CONFIDENCE,
                });
            }
        }
    }
    None
}

#[derive(Deserialize)]
struct ModelReply {
    command: String,
    #[serde(default)]
    explanation: String,
}

/// Extract the JSON object from a model reply, tolerating prose around it.
fn parse_model_reply(text: &str) -> Option<CommandSuggestion> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let reply: ModelReply = serde_json::from_str(&text[start..=end]).ok()?;
    let command = reply.command.trim().to_string();
    if command.is_empty() {
        return None;
    }
    Some(CommandSuggestion {
        command,
        explanation: reply.explanation,
        confidence: MODEL_CONFIDENCE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_creation_takes_the_next_word_as_name() {
        let suggestion =
            suggest_from_pattern("make a folder projects please").unwrap_or_else(|| panic!());
        assert_eq!(suggestion.command, "mkdir projects");
        assert!(suggestion.explanation.contains("projects"));
        assert!((suggestion.confidence - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn folder_creation_without_a_name_uses_the_default() {
        let suggestion = suggest_from_pattern("new folder").unwrap_or_else(|| panic!());
        assert_eq!(suggestion.command, "mkdir new_folder");
    }

    #[test]
    fn listing_and_location_phrasings() {
        for phrase in ["list files", "Show Files in here", "show directory"] {
            let suggestion = suggest_from_pattern(phrase).unwrap_or_else(|| panic!("{phrase}"));
            assert_eq!(suggestion.command, "ls");
        }
        let suggestion = suggest_from_pattern("where am i").unwrap_or_else(|| panic!());
        assert_eq!(suggestion.command, "pwd");
    }

    #[test]
    fn folder_deletion_pattern() {
        let suggestion =
            suggest_from_pattern("delete folder old_stuff").unwrap_or_else(|| panic!());
        assert_eq!(suggestion.command, "rm old_stuff");
    }

    #[test]
    fn unrecognized_phrasing_yields_nothing() {
        assert!(suggest_from_pattern("compile my project").is_none());
        assert!(suggest_from_pattern("").is_none());
    }

    #[test]
    fn model_reply_parses_clean_json() {
        let reply = r#"{"command": "ls -la", "explanation": "Lists all files"}"#;
        let suggestion = parse_model_reply(reply).unwrap_or_else(|| panic!());
        assert_eq!(suggestion.command, "ls -la");
        assert_eq!(suggestion.explanation, "Lists all files");
        assert!((suggestion.confidence - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn model_reply_tolerates_surrounding_prose() {
        let reply = "Sure! Here you go:\n{\"command\": \"pwd\", \"explanation\": \"Shows the path\"}\nAnything else?";
        let suggestion = parse_model_reply(reply).unwrap_or_else(|| panic!());
        assert_eq!(suggestion.command, "pwd");
    }

    #[test]
    fn model_reply_rejects_garbage_and_empty_commands() {
        assert!(parse_model_reply("no json here").is_none());
        assert!(parse_model_reply("{not valid json}").is_none());
        assert!(parse_model_reply(r#"{"command": "", "explanation": "nothing"}"#).is_none());
        assert!(parse_model_reply("}{").is_none());
    }

    #[tokio::test]
    async fn disabled_suggester_returns_nothing() {
        let suggester = Suggester::new(SuggestConfig {
            enabled: false,
            ..SuggestConfig::default()
        });
        assert!(suggester.suggest("list files").await.is_none());
    }
}
