use serde::{Deserialize, Serialize};

use crate::data::{
    Difficulty, OptionKey, PublishPlan, PublishWindow, QuestionDraft, SubTopic, Subject, TestData,
    TestDefinition, TestStatus, Topic,
};

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Deserialize, Debug)]
pub struct ResponseEnvelope<T> {
    #[serde(default)]
    pub message: Option<String>,

    pub data: T,
}

#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RawSubjectData {
    pub id: String,
    pub name: String,
}

impl From<RawSubjectData> for Subject {
    fn from(raw: RawSubjectData) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RawTopicData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subject_id: String,
}

impl From<RawTopicData> for Topic {
    fn from(raw: RawTopicData) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            subject_id: raw.subject_id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RawSubTopicData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub topic_id: String,
}

impl From<RawSubTopicData> for SubTopic {
    fn from(raw: RawSubTopicData) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            topic_id: raw.topic_id,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct RawTestData {
    pub id: String,

    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub test_type: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub sub_topics: Vec<String>,
    #[serde(default)]
    pub correct_marks: f64,
    #[serde(default)]
    pub wrong_marks: f64,
    #[serde(default)]
    pub unattempt_marks: f64,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub total_time: u32,
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub total_marks: u32,

    pub status: TestStatus,
}

impl From<RawTestData> for TestData {
    fn from(raw: RawTestData) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            test_type: raw.test_type,
            subject: raw.subject,
            topics: raw.topics,
            sub_topics: raw.sub_topics,
            correct_marks: raw.correct_marks,
            wrong_marks: raw.wrong_marks,
            unattempt_marks: raw.unattempt_marks,
            difficulty: raw.difficulty,
            total_time: raw.total_time,
            total_questions: raw.total_questions,
            total_marks: raw.total_marks,
            status: raw.status,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct CreateTestPayload {
    pub name: String,
    #[serde(rename = "type")]
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

impl CreateTestPayload {
    pub fn new(definition: TestDefinition, status: TestStatus) -> Self {
        Self {
            name: definition.name,
            test_type: definition.test_type,
            subject: definition.subject,
            topics: definition.topics,
            sub_topics: definition.sub_topics,
            correct_marks: definition.correct_marks,
            wrong_marks: definition.wrong_marks,
            unattempt_marks: definition.unattempt_marks,
            difficulty: definition.difficulty,
            total_time: definition.total_time,
            total_questions: definition.total_questions,
            total_marks: definition.total_marks,
            status,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct UpdateTestPayload {
    pub status: TestStatus,
    pub total_questions: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
}

impl UpdateTestPayload {
    pub fn new(plan: &PublishPlan, total_questions: u32) -> Self {
        let scheduled_date = match plan.window {
            PublishWindow::Immediate => None,
            PublishWindow::Scheduled { at } => Some(at.format(DATE_TIME_FORMAT).to_string()),
        };

        Self {
            status: plan.status(),
            total_questions,
            scheduled_date,
            expiry_date: plan
                .expiry
                .map(|at| at.format(DATE_TIME_FORMAT).to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RawQuestionData {
    pub question: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub correct_option: OptionKey,
    pub explanation: String,
    pub difficulty: Difficulty,
    #[serde(rename = "type")]
    pub question_type: String,
    pub test_id: String,
    pub subject: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topic_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sub_topic_id: String,
}

impl RawQuestionData {
    pub fn from_draft(draft: &QuestionDraft, test: &TestData) -> Self {
        Self {
            question: draft.question.clone(),
            option1: draft.option1.clone(),
            option2: draft.option2.clone(),
            option3: draft.option3.clone(),
            option4: draft.option4.clone(),
            correct_option: draft.correct_option,
            explanation: draft.explanation.clone(),
            difficulty: draft.difficulty,
            question_type: "mcq".to_owned(),
            test_id: test.id.clone(),
            subject: test.subject.clone(),
            topic_id: draft.topic_id.clone(),
            sub_topic_id: draft.sub_topic_id.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BulkCreateQuestionsPayload {
    pub questions: Vec<RawQuestionData>,
}

impl BulkCreateQuestionsPayload {
    pub fn new(drafts: &[QuestionDraft], test: &TestData) -> Self {
        Self {
            questions: drafts
                .iter()
                .map(|draft| RawQuestionData::from_draft(draft, test))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use serde_json::json;

    use super::*;

    fn test_data() -> TestData {
        TestData {
            id: "test-9".to_owned(),
            name: "Optics mock".to_owned(),
            test_type: "chapterwise".to_owned(),
            subject: "Physics".to_owned(),
            topics: vec!["Optics".to_owned()],
            sub_topics: vec![],
            correct_marks: 4.0,
            wrong_marks: -1.0,
            unattempt_marks: 0.0,
            difficulty: Difficulty::Medium,
            total_time: 90,
            total_questions: 30,
            total_marks: 120,
            status: TestStatus::Unpublished,
        }
    }

    fn draft() -> QuestionDraft {
        QuestionDraft {
            question: "<p>Focal length of a plane mirror?</p>".to_owned(),
            option1: "Zero".to_owned(),
            option2: "Infinite".to_owned(),
            option3: "Unit".to_owned(),
            option4: "Negative".to_owned(),
            correct_option: OptionKey::Option2,
            explanation: String::new(),
            difficulty: Difficulty::Easy,
            topic_id: "t2".to_owned(),
            sub_topic_id: String::new(),
        }
    }

    #[test]
    fn bulk_payload_tags_every_question_with_the_test() {
        let payload = BulkCreateQuestionsPayload::new(&[draft()], &test_data());
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            value["questions"][0],
            json!({
                "question": "<p>Focal length of a plane mirror?</p>",
                "option1": "Zero",
                "option2": "Infinite",
                "option3": "Unit",
                "option4": "Negative",
                "correct_option": "option2",
                "explanation": "",
                "difficulty": "easy",
                "type": "mcq",
                "test_id": "test-9",
                "subject": "Physics",
                "topic_id": "t2",
            }),
        );
    }

    #[test]
    fn update_payload_omits_absent_dates() {
        let immediate = UpdateTestPayload::new(&PublishPlan::immediate(), 30);
        let value = serde_json::to_value(&immediate).unwrap();

        assert_eq!(value, json!({ "status": "live", "total_questions": 30 }));
    }

    #[test]
    fn scheduled_publish_formats_dates() {
        let at = NaiveDateTime::parse_from_str("2024-06-01T09:30", DATE_TIME_FORMAT).unwrap();
        let mut plan = PublishPlan::scheduled(at);
        plan.expiry =
            Some(NaiveDateTime::parse_from_str("2024-06-08T21:00", DATE_TIME_FORMAT).unwrap());

        let value = serde_json::to_value(&UpdateTestPayload::new(&plan, 30)).unwrap();

        assert_eq!(value["status"], "scheduled");
        assert_eq!(value["scheduled_date"], "2024-06-01T09:30");
        assert_eq!(value["expiry_date"], "2024-06-08T21:00");
    }

    #[test]
    fn raw_test_data_tolerates_sparse_responses() {
        let raw: RawTestData = serde_json::from_value(json!({
            "id": "test-1",
            "name": "Kinematics",
            "status": "draft",
        }))
        .unwrap();
        let test = TestData::from(raw);

        assert_eq!(test.status, TestStatus::Draft);
        assert_eq!(test.total_questions, 0);
        assert_eq!(test.difficulty, Difficulty::Medium);
    }
}
