//! Topic list files.
//!
//! A topic file is JSON, either a bare array of topics or an object with a
//! `topics` array (the shape the extraction model returns):
//!
//! ```json
//! {"topics": [{"topic_name": "Limits", "estimated_hours": "3", "complexity": 2}]}
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sp_core::{NumericInput, RawTopic};
use sp_llm::ExtractedTopic;

/// One topic as written in a topic file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicEntry {
    #[serde(alias = "name")]
    pub topic_name: String,

    #[serde(default)]
    pub subtopics: Vec<String>,

    #[serde(default = "zero_hours")]
    pub estimated_hours: NumericInput,

    #[serde(default)]
    pub complexity: Option<NumericInput>,
}

const fn zero_hours() -> NumericInput {
    NumericInput::Number(0.0)
}

impl TopicEntry {
    /// Builds the planner input for this topic under the given ID.
    pub fn to_raw_topic(&self, id: impl Into<String>) -> RawTopic {
        RawTopic {
            id: id.into(),
            name: Some(self.topic_name.clone()),
            estimated_hours: self.estimated_hours.clone(),
            complexity: self.complexity.clone(),
        }
    }
}

impl From<ExtractedTopic> for TopicEntry {
    fn from(topic: ExtractedTopic) -> Self {
        Self {
            topic_name: topic.topic_name,
            subtopics: topic.subtopics,
            estimated_hours: NumericInput::Number(topic.estimated_hours),
            complexity: topic
                .complexity
                .map(|c| NumericInput::Number(f64::from(c))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TopicFile {
    List(Vec<TopicEntry>),
    Wrapped { topics: Vec<TopicEntry> },
}

/// Parses topic file contents.
pub fn parse_topics(contents: &str) -> Result<Vec<TopicEntry>> {
    let file: TopicFile = serde_json::from_str(contents).context(
        "topic file must be a JSON array of topics or an object with a \"topics\" array",
    )?;
    Ok(match file {
        TopicFile::List(topics) | TopicFile::Wrapped { topics } => topics,
    })
}

/// Reads and parses a topic file, returning its raw contents alongside.
pub fn load_topics(path: &Path) -> Result<(Vec<TopicEntry>, String)> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let topics =
        parse_topics(&contents).with_context(|| format!("invalid topic file {}", path.display()))?;
    tracing::debug!(path = %path.display(), topics = topics.len(), "loaded topic file");
    Ok((topics, contents))
}
