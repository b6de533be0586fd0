use std::sync::Arc;

use parking_lot::Mutex;
use secrecy::SecretString;

use crate::api::{TaxonomyService, TestService};
use crate::composer::{CompositionWorkflow, DraftOutcome};
use crate::data::{PublishPlan, TestData, TestDefinition, TestStatus};
use crate::error::Error;
use crate::raw_data::{CreateTestPayload, UpdateTestPayload};
use crate::taxonomy::TaxonomyCache;

pub trait SessionContext: Send + Sync {
    fn bearer_token(&self) -> Option<SecretString>;

    /// Tears the session down; invoked by the transport on a 401-class
    /// response.
    fn clear(&self);

    fn is_authenticated(&self) -> bool {
        self.bearer_token().is_some()
    }
}

pub struct MemorySession {
    token: Mutex<Option<SecretString>>,
}

impl MemorySession {
    pub fn new(token: SecretString) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            token: Mutex::new(None),
        }
    }
}

impl SessionContext for MemorySession {
    fn bearer_token(&self) -> Option<SecretString> {
        self.token.lock().clone()
    }

    fn clear(&self) {
        self.token.lock().take();
    }
}

pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);
}

pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn success(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}

/// One operator's composition session: the taxonomy cache, the draft
/// workflow, and the remote handles, driven through explicit selection
/// handlers instead of implicit form subscriptions.
pub struct ConsoleSession {
    cache: TaxonomyCache,
    workflow: CompositionWorkflow,
    tests: Arc<dyn TestService>,
    notifier: Arc<dyn Notifier>,
    current_test: Option<TestData>,
}

impl ConsoleSession {
    pub fn new(
        taxonomy: Arc<dyn TaxonomyService>,
        tests: Arc<dyn TestService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            cache: TaxonomyCache::new(taxonomy),
            workflow: CompositionWorkflow::new(),
            tests,
            notifier,
            current_test: None,
        }
    }

    pub fn cache(&self) -> &TaxonomyCache {
        &self.cache
    }

    pub fn workflow(&self) -> &CompositionWorkflow {
        &self.workflow
    }

    pub fn workflow_mut(&mut self) -> &mut CompositionWorkflow {
        &mut self.workflow
    }

    pub fn current_test(&self) -> Option<&TestData> {
        self.current_test.as_ref()
    }

    pub async fn open_test(&mut self, test_id: &str) -> Result<(), Error> {
        let test = self.report(self.tests.test_by_id(test_id).await)?;
        self.current_test = Some(test);
        Ok(())
    }

    pub async fn define_test(
        &mut self,
        definition: &TestDefinition,
        as_draft: bool,
    ) -> Result<TestData, Error> {
        definition.validate()?;

        let status = if as_draft {
            TestStatus::Draft
        } else {
            TestStatus::Unpublished
        };
        let payload = CreateTestPayload::new(definition.clone(), status);

        let created = self.report(self.tests.create_test(&payload).await)?;
        self.notifier.success("Test created successfully!");
        self.current_test = Some(created.clone());
        Ok(created)
    }

    /// A new subject invalidates the topic selection and everything below
    /// it before the replacement topics are fetched.
    pub async fn on_subject_changed(&mut self, subject_id: &str) -> Result<(), Error> {
        self.workflow.form_mut().topic_id.clear();
        self.workflow.form_mut().sub_topic_id.clear();

        if subject_id.trim().is_empty() {
            self.cache.clear_topics();
            self.cache.clear_sub_topics();
            return Ok(());
        }

        let loaded = self.cache.load_topics(subject_id).await;
        self.report(loaded)
    }

    /// Sub-topic selections from a previous topic set are stale by
    /// definition; an empty selection clears the tier with no request.
    pub async fn on_topics_changed(&mut self, topic_ids: &[String]) -> Result<(), Error> {
        self.workflow.form_mut().sub_topic_id.clear();

        let loaded = self.cache.load_sub_topics(topic_ids).await;
        self.report(loaded)
    }

    pub fn save_question(&mut self) -> Result<DraftOutcome, Error> {
        let outcome = self.workflow.add_or_update()?;

        match outcome {
            DraftOutcome::Added => self.notifier.success("Question added locally"),
            DraftOutcome::Updated => self.notifier.success("Question updated locally"),
        }
        Ok(outcome)
    }

    pub async fn save_all(&mut self) -> Result<usize, Error> {
        let test = match self.current_test.clone() {
            Some(test) => test,
            None => return Err(Error::NotFound("test".to_owned())),
        };

        match self.workflow.submit_all(self.tests.as_ref(), &test).await {
            Ok(count) => {
                self.notifier.success("Questions saved successfully!");
                self.workflow.discard_all();
                Ok(count)
            }
            Err(Error::EmptyBatch) => {
                self.notifier.error("Please add at least 1 question.");
                Err(Error::EmptyBatch)
            }
            Err(error) => {
                self.notifier.error(&error.to_string());
                Err(error)
            }
        }
    }

    pub async fn publish_test(&mut self, plan: &PublishPlan) -> Result<(), Error> {
        let test = match self.current_test.clone() {
            Some(test) => test,
            None => return Err(Error::NotFound("test".to_owned())),
        };

        let payload = UpdateTestPayload::new(plan, test.total_questions);
        let updated = self.tests.update_test(&test.id, &payload).await;
        self.report(updated)?;

        self.notifier.success("Test published successfully!");
        Ok(())
    }

    fn report<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
        if let Err(error) = &result {
            self.notifier.error(&error.to_string());
        }
        result
    }
}
