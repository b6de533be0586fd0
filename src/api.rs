use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use test_console::api::{TaxonomyService, TestService};
use test_console::data::{SubTopic, Subject, TestData, Topic};
use test_console::error::Error;
use test_console::raw_data::{
    BulkCreateQuestionsPayload, CreateTestPayload, ErrorBody, RawSubTopicData, RawSubjectData,
    RawTestData, RawTopicData, ResponseEnvelope, UpdateTestPayload,
};
use test_console::session::SessionContext;

pub struct HttpApi {
    client: Client,
    base_url: Url,
    session: Arc<dyn SessionContext>,
}

impl HttpApi {
    pub fn new(base_url: Url, session: Arc<dyn SessionContext>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            session,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|error| Error::Fetch(error.to_string()))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.bearer_token() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let response = request
            .send()
            .await
            .map_err(|error| Error::Fetch(error.to_string()))?;
        self.check_status(response).await
    }

    async fn check_status(&self, response: Response) -> Result<Response, Error> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            // The session collaborator owns teardown; composition state is
            // deliberately not preserved across a forced re-login.
            tracing::warn!("session rejected by the server, clearing stored credential");
            self.session.clear();
            return Err(Error::Unauthenticated);
        }

        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            let message = body
                .message
                .unwrap_or_else(|| format!("request failed with status {status}"));
            tracing::debug!(%status, %message, "request failed");
            return Err(Error::Fetch(message));
        }

        Ok(response)
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let request = self.authorize(self.client.get(self.endpoint(path)?));
        let response = self.send(request).await?;
        parse_envelope(response).await
    }

    async fn post_data<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let request = self.authorize(self.client.post(self.endpoint(path)?).json(body));
        let response = self.send(request).await?;
        parse_envelope(response).await
    }

    async fn post_unit<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), Error> {
        let request = self.authorize(self.client.post(self.endpoint(path)?).json(body));
        self.send(request).await?;
        Ok(())
    }

    async fn put_unit<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), Error> {
        let request = self.authorize(self.client.put(self.endpoint(path)?).json(body));
        self.send(request).await?;
        Ok(())
    }
}

async fn parse_envelope<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let envelope: ResponseEnvelope<T> = response
        .json()
        .await
        .map_err(|error| Error::Fetch(error.to_string()))?;
    Ok(envelope.data)
}

#[async_trait]
impl TaxonomyService for HttpApi {
    async fn subjects(&self) -> Result<Vec<Subject>, Error> {
        let raw: Vec<RawSubjectData> = self.get_data("subjects").await?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    async fn topics_by_subject(&self, subject_id: &str) -> Result<Vec<Topic>, Error> {
        let raw: Vec<RawTopicData> = self
            .get_data(&format!("topics/subject/{subject_id}"))
            .await?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    async fn sub_topics_by_topic(&self, topic_id: &str) -> Result<Vec<SubTopic>, Error> {
        let raw: Vec<RawSubTopicData> = self
            .get_data(&format!("sub-topics/topic/{topic_id}"))
            .await?;
        Ok(raw.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TestService for HttpApi {
    async fn create_test(&self, payload: &CreateTestPayload) -> Result<TestData, Error> {
        let raw: RawTestData = self.post_data("tests", payload).await?;
        Ok(raw.into())
    }

    async fn test_by_id(&self, id: &str) -> Result<TestData, Error> {
        let raw: RawTestData = self.get_data(&format!("tests/{id}")).await?;
        Ok(raw.into())
    }

    async fn list_tests(&self) -> Result<Vec<TestData>, Error> {
        let raw: Vec<RawTestData> = self.get_data("tests").await?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    async fn update_test(&self, id: &str, payload: &UpdateTestPayload) -> Result<(), Error> {
        self.put_unit(&format!("tests/{id}"), payload).await
    }

    async fn bulk_create_questions(
        &self,
        payload: &BulkCreateQuestionsPayload,
    ) -> Result<(), Error> {
        self.post_unit("questions/bulk", payload).await
    }
}
