use crate::api::TestService;
use crate::data::{QuestionDraft, QuestionForm, TestData};
use crate::error::Error;
use crate::raw_data::BulkCreateQuestionsPayload;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftOutcome {
    Added,
    Updated,
}

/// Ordered question drafts under composition, plus the live edit form.
/// A draft's identity is its position in the list.
#[derive(Default)]
pub struct CompositionWorkflow {
    questions: Vec<QuestionDraft>,
    form: QuestionForm,
    active_index: Option<usize>,
    edit_mode: bool,
}

impl CompositionWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &QuestionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut QuestionForm {
        &mut self.form
    }

    pub fn questions(&self) -> &[QuestionDraft] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn add_or_update(&mut self) -> Result<DraftOutcome, Error> {
        let draft = self.form.validate()?;

        let outcome = match (self.edit_mode, self.active_index) {
            (true, Some(index)) => {
                if index >= self.questions.len() {
                    return Err(Error::IndexOutOfRange {
                        index,
                        len: self.questions.len(),
                    });
                }
                self.questions[index] = draft;
                self.active_index = None;
                self.edit_mode = false;
                DraftOutcome::Updated
            }
            _ => {
                self.questions.push(draft);
                DraftOutcome::Added
            }
        };

        self.form = QuestionForm::default();
        Ok(outcome)
    }

    pub fn select_for_edit(&mut self, index: usize) -> Result<(), Error> {
        let draft = self
            .questions
            .get(index)
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.questions.len(),
            })?;

        self.form = draft.form();
        self.active_index = Some(index);
        self.edit_mode = true;
        Ok(())
    }

    pub fn delete(&mut self, index: usize) -> Result<QuestionDraft, Error> {
        if index >= self.questions.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.questions.len(),
            });
        }

        let removed = self.questions.remove(index);

        // Surviving entries keep their slots; only an exact match on the
        // active entry resets the form.
        if self.active_index == Some(index) {
            self.form = QuestionForm::default();
            self.active_index = None;
            self.edit_mode = false;
        }

        Ok(removed)
    }

    pub fn start_new(&mut self) {
        self.form = QuestionForm::default();
        self.active_index = None;
        self.edit_mode = false;
    }

    /// Sends the whole accumulated batch in one call. The drafts are kept
    /// on failure so the operator can retry.
    pub async fn submit_all(
        &self,
        service: &dyn TestService,
        test: &TestData,
    ) -> Result<usize, Error> {
        if self.questions.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let payload = BulkCreateQuestionsPayload::new(&self.questions, test);
        service.bulk_create_questions(&payload).await?;

        tracing::debug!(
            test_id = %test.id,
            count = self.questions.len(),
            "question batch submitted"
        );
        Ok(self.questions.len())
    }

    pub fn discard_all(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::data::{Difficulty, OptionKey, TestStatus};
    use crate::raw_data::{CreateTestPayload, UpdateTestPayload};

    use super::*;

    fn fill_form(workflow: &mut CompositionWorkflow, question: &str) {
        let form = workflow.form_mut();
        form.question = question.to_owned();
        form.option1 = "A".to_owned();
        form.option2 = "B".to_owned();
        form.option3 = "C".to_owned();
        form.option4 = "D".to_owned();
        form.correct_option = Some(OptionKey::Option2);
    }

    fn workflow_with(questions: &[&str]) -> CompositionWorkflow {
        let mut workflow = CompositionWorkflow::new();
        for question in questions {
            fill_form(&mut workflow, question);
            workflow.add_or_update().unwrap();
        }
        workflow
    }

    fn test_data() -> TestData {
        TestData {
            id: "test-1".to_owned(),
            name: "Kinematics revision".to_owned(),
            test_type: "chapterwise".to_owned(),
            subject: "Physics".to_owned(),
            topics: vec!["Kinematics".to_owned()],
            sub_topics: vec![],
            correct_marks: 4.0,
            wrong_marks: -1.0,
            unattempt_marks: 0.0,
            difficulty: Difficulty::Medium,
            total_time: 60,
            total_questions: 50,
            total_marks: 200,
            status: TestStatus::Unpublished,
        }
    }

    #[test]
    fn invalid_form_leaves_the_collection_untouched() {
        let mut workflow = workflow_with(&["Q1"]);
        workflow.form_mut().question = "Q2".to_owned();

        let error = workflow.add_or_update().unwrap_err();

        assert!(!error.field_errors().is_empty());
        assert_eq!(workflow.len(), 1);
        assert_eq!(workflow.form().question, "Q2");
    }

    #[test]
    fn add_appends_and_resets_the_form() {
        let mut workflow = CompositionWorkflow::new();
        fill_form(&mut workflow, "Q1");

        assert_eq!(workflow.add_or_update().unwrap(), DraftOutcome::Added);

        assert_eq!(workflow.len(), 1);
        assert_eq!(workflow.questions()[0].question, "Q1");
        assert_eq!(workflow.form(), &QuestionForm::default());
        assert_eq!(workflow.active_index(), None);
    }

    #[test]
    fn edit_in_place_preserves_position_and_neighbours() {
        let mut workflow = workflow_with(&["Q1", "Q2", "Q3"]);

        workflow.select_for_edit(1).unwrap();
        assert!(workflow.edit_mode());
        assert_eq!(workflow.form().question, "Q2");

        workflow.form_mut().question = "Q2 revised".to_owned();
        assert_eq!(workflow.add_or_update().unwrap(), DraftOutcome::Updated);

        assert_eq!(workflow.len(), 3);
        assert_eq!(workflow.questions()[0].question, "Q1");
        assert_eq!(workflow.questions()[1].question, "Q2 revised");
        assert_eq!(workflow.questions()[2].question, "Q3");
        assert!(!workflow.edit_mode());
        assert_eq!(workflow.active_index(), None);
    }

    #[test]
    fn delete_twice_at_the_same_index_removes_two_distinct_entries() {
        let mut workflow = workflow_with(&["Q1", "Q2", "Q3"]);

        assert_eq!(workflow.delete(1).unwrap().question, "Q2");
        assert_eq!(workflow.delete(1).unwrap().question, "Q3");

        assert_eq!(workflow.len(), 1);
        assert_eq!(workflow.questions()[0].question, "Q1");
    }

    #[test]
    fn out_of_range_indices_are_rejected_without_side_effects() {
        let mut workflow = workflow_with(&["Q1"]);

        assert_eq!(
            workflow.delete(1).unwrap_err(),
            Error::IndexOutOfRange { index: 1, len: 1 },
        );
        assert_eq!(
            workflow.select_for_edit(7).unwrap_err(),
            Error::IndexOutOfRange { index: 7, len: 1 },
        );
        assert_eq!(workflow.len(), 1);
    }

    #[test]
    fn deleting_the_active_entry_resets_the_form() {
        let mut workflow = workflow_with(&["Q1", "Q2"]);
        workflow.select_for_edit(0).unwrap();

        workflow.delete(0).unwrap();

        assert_eq!(workflow.form(), &QuestionForm::default());
        assert!(!workflow.edit_mode());
        assert_eq!(workflow.active_index(), None);
        assert_eq!(workflow.len(), 1);
    }

    #[test]
    fn deleting_another_entry_keeps_the_edit_session() {
        let mut workflow = workflow_with(&["Q1", "Q2"]);
        workflow.select_for_edit(0).unwrap();

        workflow.delete(1).unwrap();

        assert!(workflow.edit_mode());
        assert_eq!(workflow.active_index(), Some(0));
        assert_eq!(workflow.form().question, "Q1");
    }

    #[test]
    fn start_new_clears_the_edit_cursor() {
        let mut workflow = workflow_with(&["Q1"]);
        workflow.select_for_edit(0).unwrap();

        workflow.start_new();

        assert_eq!(workflow.form(), &QuestionForm::default());
        assert!(!workflow.edit_mode());
        assert_eq!(workflow.active_index(), None);
    }

    #[derive(Default)]
    struct RecordingTests {
        batches: Mutex<Vec<serde_json::Value>>,
        fail_with: Option<Error>,
    }

    #[async_trait]
    impl TestService for RecordingTests {
        async fn create_test(&self, _payload: &CreateTestPayload) -> Result<TestData, Error> {
            unimplemented!("not exercised here")
        }

        async fn test_by_id(&self, _id: &str) -> Result<TestData, Error> {
            unimplemented!("not exercised here")
        }

        async fn list_tests(&self) -> Result<Vec<TestData>, Error> {
            unimplemented!("not exercised here")
        }

        async fn update_test(&self, _id: &str, _payload: &UpdateTestPayload) -> Result<(), Error> {
            unimplemented!("not exercised here")
        }

        async fn bulk_create_questions(
            &self,
            payload: &BulkCreateQuestionsPayload,
        ) -> Result<(), Error> {
            if let Some(error) = &self.fail_with {
                return Err(error.clone());
            }
            self.batches
                .lock()
                .push(serde_json::to_value(payload).expect("payload serializes"));
            Ok(())
        }
    }

    #[tokio::test]
    async fn empty_batch_never_reaches_the_service() {
        let workflow = CompositionWorkflow::new();
        let service = RecordingTests::default();

        let error = workflow.submit_all(&service, &test_data()).await.unwrap_err();

        assert_eq!(error, Error::EmptyBatch);
        assert!(service.batches.lock().is_empty());
    }

    #[tokio::test]
    async fn submit_sends_one_batch_with_every_draft_in_order() {
        let workflow = workflow_with(&["Q1", "Q2", "Q3"]);
        let service = RecordingTests::default();

        let sent = workflow.submit_all(&service, &test_data()).await.unwrap();
        assert_eq!(sent, 3);

        let batches = service.batches.lock();
        assert_eq!(batches.len(), 1);

        let questions = batches[0]["questions"].as_array().unwrap();
        let texts: Vec<&str> = questions
            .iter()
            .map(|q| q["question"].as_str().unwrap())
            .collect();
        assert_eq!(texts, vec!["Q1", "Q2", "Q3"]);
        assert!(questions.iter().all(|q| q["test_id"] == "test-1"));
    }

    #[tokio::test]
    async fn drafts_survive_a_failed_submit() {
        let workflow = workflow_with(&["Q1", "Q2"]);
        let service = RecordingTests {
            fail_with: Some(Error::Fetch("bulk create rejected".to_owned())),
            ..RecordingTests::default()
        };

        let error = workflow.submit_all(&service, &test_data()).await.unwrap_err();

        assert_eq!(error, Error::Fetch("bulk create rejected".to_owned()));
        assert_eq!(workflow.len(), 2);
    }
}
