use async_trait::async_trait;

use crate::data::{SubTopic, Subject, TestData, Topic};
use crate::error::Error;
use crate::raw_data::{BulkCreateQuestionsPayload, CreateTestPayload, UpdateTestPayload};

#[async_trait]
pub trait TaxonomyService: Send + Sync {
    async fn subjects(&self) -> Result<Vec<Subject>, Error>;

    async fn topics_by_subject(&self, subject_id: &str) -> Result<Vec<Topic>, Error>;

    async fn sub_topics_by_topic(&self, topic_id: &str) -> Result<Vec<SubTopic>, Error>;
}

#[async_trait]
pub trait TestService: Send + Sync {
    async fn create_test(&self, payload: &CreateTestPayload) -> Result<TestData, Error>;

    async fn test_by_id(&self, id: &str) -> Result<TestData, Error>;

    async fn list_tests(&self) -> Result<Vec<TestData>, Error>;

    async fn update_test(&self, id: &str, payload: &UpdateTestPayload) -> Result<(), Error>;

    async fn bulk_create_questions(
        &self,
        payload: &BulkCreateQuestionsPayload,
    ) -> Result<(), Error>;
}
