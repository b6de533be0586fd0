use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, FieldError};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Subject {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub subject_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SubTopic {
    pub id: String,
    pub name: String,
    pub topic_id: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Draft,
    Unpublished,
    Scheduled,
    Live,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptionKey {
    Option1,
    Option2,
    Option3,
    Option4,
}

impl OptionKey {
    pub const ALL: [Self; 4] = [Self::Option1, Self::Option2, Self::Option3, Self::Option4];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Option1 => "option1",
            Self::Option2 => "option2",
            Self::Option3 => "option3",
            Self::Option4 => "option4",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuestionForm {
    pub question: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub correct_option: Option<OptionKey>,
    pub explanation: String,
    pub difficulty: Difficulty,
    pub topic_id: String,
    pub sub_topic_id: String,
}

impl QuestionForm {
    pub fn option_text(&self, key: OptionKey) -> &str {
        match key {
            OptionKey::Option1 => &self.option1,
            OptionKey::Option2 => &self.option2,
            OptionKey::Option3 => &self.option3,
            OptionKey::Option4 => &self.option4,
        }
    }

    pub fn validate(&self) -> Result<QuestionDraft, Error> {
        let mut fields = Vec::new();

        if self.question.trim().is_empty() {
            fields.push(FieldError::new("question", "Question text is required"));
        }

        for key in OptionKey::ALL {
            if self.option_text(key).trim().is_empty() {
                fields.push(FieldError::new(key.as_str(), "Option text is required"));
            }
        }

        if self.correct_option.is_none() {
            fields.push(FieldError::new(
                "correct_option",
                "Please select a correct option",
            ));
        }

        match (fields.is_empty(), self.correct_option) {
            (true, Some(correct_option)) => Ok(QuestionDraft {
                question: self.question.clone(),
                option1: self.option1.clone(),
                option2: self.option2.clone(),
                option3: self.option3.clone(),
                option4: self.option4.clone(),
                correct_option,
                explanation: self.explanation.clone(),
                difficulty: self.difficulty,
                topic_id: self.topic_id.clone(),
                sub_topic_id: self.sub_topic_id.clone(),
            }),
            _ => Err(Error::Validation(fields)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct QuestionDraft {
    pub question: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub correct_option: OptionKey,
    pub explanation: String,
    pub difficulty: Difficulty,
    pub topic_id: String,
    pub sub_topic_id: String,
}

impl QuestionDraft {
    /// The form state that reproduces this draft, for edit-in-place.
    pub fn form(&self) -> QuestionForm {
        QuestionForm {
            question: self.question.clone(),
            option1: self.option1.clone(),
            option2: self.option2.clone(),
            option3: self.option3.clone(),
            option4: self.option4.clone(),
            correct_option: Some(self.correct_option),
            explanation: self.explanation.clone(),
            difficulty: self.difficulty,
            topic_id: self.topic_id.clone(),
            sub_topic_id: self.sub_topic_id.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TestData {
    pub id: String,
    pub name: String,
    pub test_type: String,
    pub subject: String,
    pub topics: Vec<String>,
    pub sub_topics: Vec<String>,
    pub correct_marks: f64,
    pub wrong_marks: f64,
    pub unattempt_marks: f64,
    pub difficulty: Difficulty,
    pub total_time: u32,
    pub total_questions: u32,
    pub total_marks: u32,
    pub status: TestStatus,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TestDefinition {
    pub name: String,
    pub test_type: String,
    pub subject: String,
    pub topics: Vec<String>,
    pub sub_topics: Vec<String>,
    pub correct_marks: f64,
    pub wrong_marks: f64,
    pub unattempt_marks: f64,
    pub difficulty: Difficulty,
    pub total_time: u32,
    pub total_questions: u32,
    pub total_marks: u32,
}

impl TestDefinition {
    pub fn validate(&self) -> Result<(), Error> {
        let mut fields = Vec::new();

        if self.name.trim().is_empty() {
            fields.push(FieldError::new("name", "Test name is required"));
        }
        if self.subject.trim().is_empty() {
            fields.push(FieldError::new("subject", "Subject is required"));
        }
        if self.topics.is_empty() {
            fields.push(FieldError::new("topics", "Select at least one topic"));
        }
        if self.wrong_marks >= 0.0 {
            fields.push(FieldError::new(
                "wrong_marks",
                "Wrong answer marks must be negative",
            ));
        }
        if self.total_time == 0 {
            fields.push(FieldError::new("total_time", "Test duration is required"));
        }
        if self.total_questions == 0 {
            fields.push(FieldError::new(
                "total_questions",
                "Number of questions is required",
            ));
        }
        if self.total_marks == 0 {
            fields.push(FieldError::new("total_marks", "Total marks are required"));
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(fields))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishWindow {
    Immediate,
    Scheduled { at: NaiveDateTime },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublishPlan {
    pub window: PublishWindow,
    pub expiry: Option<NaiveDateTime>,
}

impl PublishPlan {
    pub fn immediate() -> Self {
        Self {
            window: PublishWindow::Immediate,
            expiry: None,
        }
    }

    pub fn scheduled(at: NaiveDateTime) -> Self {
        Self {
            window: PublishWindow::Scheduled { at },
            expiry: None,
        }
    }

    pub fn status(&self) -> TestStatus {
        match self.window {
            PublishWindow::Immediate => TestStatus::Live,
            PublishWindow::Scheduled { .. } => TestStatus::Scheduled,
        }
    }
}
