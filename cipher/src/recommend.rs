//! Agent recommendation.
//!
//! Given free-form user input, asks a text generator to pick the best
//! specialist agent from a fixed catalog and justify the choice. The
//! generator is told to reply with a JSON object holding exactly
//! `recommended_agent` and `justification`; decoding and validating that
//! reply happens here, not in the generator.

use crate::error::{RecommendError, Result};
use crate::generation::TextGenerator;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// The built-in agents and what they do.
const DEFAULT_AGENTS: &[(&str, &str)] = &[
    (
        "academic_agent",
        "Provides academic guidance, generates research insights, and assists with scholarly writing.",
    ),
    (
        "math_agent",
        "Solves mathematical problems, explains concepts, and provides tutoring on complex equations.",
    ),
    (
        "cocktail_mixlogist",
        "Suggests and customizes cocktail recipes based on ingredients and user preferences.",
    ),
    (
        "cook_therapist",
        "Combines cooking advice with therapeutic insights to make meal prep a relaxing experience.",
    ),
    (
        "creation_agent",
        "Assists with brainstorming and creating content for writing, art, or other creative projects.",
    ),
    (
        "festival_card_designer",
        "Designs greeting cards and invitations for festivals and celebrations, customized to themes and styles.",
    ),
    (
        "fitness_trainer",
        "Provides workout plans, fitness tips, and personalized training advice to meet health goals.",
    ),
    (
        "logo_creator",
        "Generates logo designs for branding, using customizable templates and artistic styles.",
    ),
    (
        "meme_creator",
        "Creates memes based on popular formats or user-submitted text for social media engagement.",
    ),
    (
        "music_composer",
        "Composes original music, generates loops and samples, and customizes tunes based on mood and genre.",
    ),
    (
        "story_teller",
        "Crafts stories, narratives, and interactive fiction, engaging users with creative storytelling.",
    ),
];

/// A specialist agent that can be recommended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Identifier the generator must answer with
    pub name: String,
    /// What the agent does
    pub description: String,
}

impl AgentProfile {
    /// Create a profile
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// The closed set of agents a recommendation may name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCatalog {
    agents: Vec<AgentProfile>,
}

impl Default for AgentCatalog {
    fn default() -> Self {
        Self::new(
            DEFAULT_AGENTS
                .iter()
                .map(|(name, description)| AgentProfile::new(*name, *description)),
        )
    }
}

impl AgentCatalog {
    /// Build a catalog. Later duplicates of a name are ignored.
    pub fn new(agents: impl IntoIterator<Item = AgentProfile>) -> Self {
        let mut unique: Vec<AgentProfile> = Vec::new();
        for agent in agents {
            if !unique.iter().any(|a| a.name == agent.name) {
                unique.push(agent);
            }
        }
        Self { agents: unique }
    }

    /// Look up an agent by name.
    pub fn get(&self, name: &str) -> Option<&AgentProfile> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Check whether `name` is in the catalog.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Agent names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(|a| a.name.as_str())
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// True if the catalog has no agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Build the prompt that asks for a JSON recommendation.
    pub fn build_prompt(&self, user_input: &str) -> String {
        let listing = self.listing();

        format!(
            r#"You are an assistant that strictly outputs JSON-formatted responses.
Based on the following user input, select the best agent from the list and provide a justification in JSON format:

User Input: '{user_input}'

Agents:
{listing}

Respond with only the following JSON structure:
{{
    "recommended_agent": "<agent_name>",
    "justification": "<reason for selecting the agent>"
}}"#
        )
    }

    /// The catalog as a pretty-printed JSON object, in catalog order.
    fn listing(&self) -> String {
        if self.agents.is_empty() {
            return "{}".to_string();
        }

        let entries: Vec<String> = self
            .agents
            .iter()
            .map(|a| {
                format!(
                    "  {}: {}",
                    serde_json::Value::from(a.name.as_str()),
                    serde_json::Value::from(a.description.as_str())
                )
            })
            .collect();
        format!("{{\n{}\n}}", entries.join(",\n"))
    }

    /// Decode a generator reply into a recommendation.
    ///
    /// The reply must be a JSON object with exactly `recommended_agent` and
    /// `justification`, optionally wrapped in a Markdown code block, and the
    /// agent must belong to this catalog.
    pub fn parse_recommendation(
        &self,
        response: &str,
    ) -> std::result::Result<Recommendation, RecommendError> {
        let recommendation: Recommendation = serde_json::from_str(extract_json(response))?;

        if !self.contains(&recommendation.recommended_agent) {
            return Err(RecommendError::UnknownAgent(recommendation.recommended_agent));
        }
        Ok(recommendation)
    }
}

/// Which agent to use and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recommendation {
    /// Name of an agent in the catalog
    pub recommended_agent: String,
    /// Free-text reason
    pub justification: String,
}

/// Recommends agents using a text generator.
pub struct AgentRecommender<G> {
    generator: G,
    catalog: AgentCatalog,
}

impl<G: TextGenerator> AgentRecommender<G> {
    /// Use the default catalog.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            catalog: AgentCatalog::default(),
        }
    }

    /// Use a custom catalog.
    pub fn with_catalog(mut self, catalog: AgentCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// The catalog recommendations are drawn from.
    pub fn catalog(&self) -> &AgentCatalog {
        &self.catalog
    }

    /// Recommend an agent for `user_input`.
    pub async fn recommend(&self, user_input: &str) -> Result<Recommendation> {
        let prompt = self.catalog.build_prompt(user_input);
        let response = self.generator.generate(&prompt).await?;

        match self.catalog.parse_recommendation(&response) {
            Ok(recommendation) => {
                info!(
                    agent = %recommendation.recommended_agent,
                    backend = self.generator.name(),
                    "agent recommended"
                );
                Ok(recommendation)
            }
            Err(e) => {
                warn!(error = %e, "could not decode recommendation");
                Err(e.into())
            }
        }
    }
}

/// Extract JSON from a response that might have markdown code blocks.
fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        let content_start = start + 7;
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        let content_start = start + 3;
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::ScriptedGenerator;

    #[test]
    fn test_default_catalog() {
        let catalog = AgentCatalog::default();
        assert_eq!(catalog.len(), 11);
        assert!(catalog.contains("math_agent"));
        assert!(catalog.contains("story_teller"));
        assert!(!catalog.contains("wizard"));
        assert_eq!(catalog.names().next(), Some("academic_agent"));
    }

    #[test]
    fn test_catalog_ignores_duplicates() {
        let catalog = AgentCatalog::new([
            AgentProfile::new("a", "first"),
            AgentProfile::new("a", "second"),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("a").unwrap().description, "first");
    }

    #[test]
    fn test_build_prompt() {
        let prompt = AgentCatalog::default().build_prompt("I need a workout plan");
        assert!(prompt.starts_with("You are an assistant that strictly outputs JSON"));
        assert!(prompt.contains("User Input: 'I need a workout plan'"));
        assert!(prompt.contains("\"fitness_trainer\": \"Provides workout plans"));
        assert!(prompt.ends_with("\"justification\": \"<reason for selecting the agent>\"\n}"));
    }

    #[test]
    fn test_prompt_lists_agents_in_catalog_order() {
        let catalog = AgentCatalog::default();
        let prompt = catalog.build_prompt("x");

        let offsets: Vec<usize> = catalog
            .names()
            .map(|name| prompt.find(&format!("\"{name}\":")).unwrap())
            .collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));

        let custom = AgentCatalog::new([
            AgentProfile::new("zither_tuner", "Tunes zithers."),
            AgentProfile::new("abacus_coach", "Teaches the abacus."),
        ]);
        let prompt = custom.build_prompt("x");
        assert!(prompt.contains(
            "Agents:\n{\n  \"zither_tuner\": \"Tunes zithers.\",\n  \"abacus_coach\": \"Teaches the abacus.\"\n}"
        ));
    }

    #[test]
    fn test_listing_is_valid_json() {
        let catalog = AgentCatalog::new([AgentProfile::new("quoter", "Says \"hi\"")]);
        let parsed: serde_json::Value = serde_json::from_str(&catalog.listing()).unwrap();
        assert_eq!(parsed["quoter"], "Says \"hi\"");
        assert_eq!(AgentCatalog::new(Vec::new()).listing(), "{}");
    }

    #[test]
    fn test_extract_json() {
        assert_eq!(extract_json("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(extract_json("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(extract_json("Sure!\n```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_recommendation() {
        let catalog = AgentCatalog::default();
        let rec = catalog
            .parse_recommendation(
                r#"{"recommended_agent": "math_agent", "justification": "It is an equation."}"#,
            )
            .unwrap();
        assert_eq!(rec.recommended_agent, "math_agent");
        assert_eq!(rec.justification, "It is an equation.");
    }

    #[test]
    fn test_parse_rejects_bad_replies() {
        let catalog = AgentCatalog::default();

        assert!(matches!(
            catalog.parse_recommendation("I think the math agent fits best."),
            Err(RecommendError::InvalidJson(_))
        ));
        assert!(matches!(
            catalog.parse_recommendation(r#"{"recommended_agent": "math_agent"}"#),
            Err(RecommendError::InvalidJson(_))
        ));
        assert!(matches!(
            catalog.parse_recommendation(
                r#"{"recommended_agent": "math_agent", "justification": "x", "confidence": 0.9}"#
            ),
            Err(RecommendError::InvalidJson(_))
        ));
        assert!(matches!(
            catalog.parse_recommendation(r#"{"recommended_agent": "wizard", "justification": "x"}"#),
            Err(RecommendError::UnknownAgent(name)) if name == "wizard"
        ));
    }

    #[tokio::test]
    async fn test_recommender_round_trip() {
        let generator = ScriptedGenerator::new([
            "```json\n{\"recommended_agent\": \"fitness_trainer\", \"justification\": \"Workout request.\"}\n```",
        ]);
        let recommender = AgentRecommender::new(generator);

        let rec = recommender.recommend("Help me get fit").await.unwrap();
        assert_eq!(rec.recommended_agent, "fitness_trainer");
    }

    #[tokio::test]
    async fn test_recommender_reports_invalid_json() {
        let recommender = AgentRecommender::new(ScriptedGenerator::new(["not json at all"]));

        let err = recommender.recommend("anything").await.unwrap_err();
        assert!(matches!(err, Error::Recommend(RecommendError::InvalidJson(_))));
    }

    #[tokio::test]
    async fn test_recommender_with_custom_catalog() {
        let catalog = AgentCatalog::new([AgentProfile::new("gardener", "Helps with plants.")]);
        let recommender = AgentRecommender::new(ScriptedGenerator::new([
            r#"{"recommended_agent": "gardener", "justification": "Tomatoes."}"#,
        ]))
        .with_catalog(catalog);

        assert_eq!(recommender.catalog().len(), 1);
        let rec = recommender.recommend("My tomatoes are wilting").await.unwrap();
        assert_eq!(rec.recommended_agent, "gardener");
    }
}
