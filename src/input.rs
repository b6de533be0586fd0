use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use test_console::data::{Difficulty, OptionKey, QuestionForm, TestDefinition};

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct RawTestDefinition {
    pub name: String,

    #[serde(rename = "type", default = "default_test_type")]
    pub test_type: String,
    pub subject: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub sub_topics: Vec<String>,
    pub correct_marks: f64,
    pub wrong_marks: f64,
    #[serde(default)]
    pub unattempt_marks: f64,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub total_time: u32,
    pub total_questions: u32,
    pub total_marks: u32,

    #[serde(default)]
    pub draft: bool,
}

fn default_test_type() -> String {
    "chapterwise".to_owned()
}

impl RawTestDefinition {
    pub fn into_parts(self) -> (TestDefinition, bool) {
        let test_type = match self.test_type.as_str() {
            "chapter_wise" => "chapterwise".to_owned(),
            _ => self.test_type,
        };

        let definition = TestDefinition {
            name: self.name,
            test_type,
            subject: self.subject,
            topics: self.topics,
            sub_topics: self.sub_topics,
            correct_marks: self.correct_marks,
            wrong_marks: self.wrong_marks,
            unattempt_marks: self.unattempt_marks,
            difficulty: self.difficulty,
            total_time: self.total_time,
            total_questions: self.total_questions,
            total_marks: self.total_marks,
        };

        (definition, self.draft)
    }
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct RawQuestionInput {
    pub question: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    #[serde(default)]
    pub correct_option: Option<OptionKey>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub topic_id: String,
    #[serde(default)]
    pub sub_topic_id: String,
}

impl From<RawQuestionInput> for QuestionForm {
    fn from(raw: RawQuestionInput) -> Self {
        Self {
            question: raw.question,
            option1: raw.option1,
            option2: raw.option2,
            option3: raw.option3,
            option4: raw.option4,
            correct_option: raw.correct_option,
            explanation: raw.explanation,
            difficulty: raw.difficulty,
            topic_id: raw.topic_id,
            sub_topic_id: raw.sub_topic_id,
        }
    }
}

pub fn load_test_definition(path: &Path) -> Result<(TestDefinition, bool)> {
    let raw_data = fs::read(path)
        .with_context(|| format!("cannot read test definition {}", path.display()))?;
    let raw: RawTestDefinition = serde_json::from_slice(&raw_data)
        .with_context(|| format!("invalid test definition {}", path.display()))?;

    Ok(raw.into_parts())
}

pub fn load_question_forms(path: &Path) -> Result<Vec<QuestionForm>> {
    let raw_data =
        fs::read(path).with_context(|| format!("cannot read questions {}", path.display()))?;
    let raw: Vec<RawQuestionInput> = serde_json::from_slice(&raw_data)
        .with_context(|| format!("invalid questions file {}", path.display()))?;

    Ok(raw.into_iter().map(Into::into).collect())
}
