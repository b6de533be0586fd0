use std::sync::Arc;

use futures::future::try_join_all;
use parking_lot::Mutex;

use crate::api::TaxonomyService;
use crate::data::{SubTopic, Subject, Topic};
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TierPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

struct TierState<T> {
    items: Vec<T>,
    phase: TierPhase,
    epoch: u64,
}

struct Tier<T> {
    name: &'static str,
    state: Mutex<TierState<T>>,
}

impl<T: Clone> Tier<T> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(TierState {
                items: Vec::new(),
                phase: TierPhase::Idle,
                epoch: 0,
            }),
        }
    }

    // Every new request supersedes whatever is in flight, whatever the
    // current phase is.
    fn begin(&self) -> u64 {
        let mut state = self.state.lock();
        state.epoch += 1;
        state.phase = TierPhase::Loading;
        state.epoch
    }

    // Applies a response only if no newer request has started since
    // `epoch` was issued; a reply for a superseded selection is dropped.
    fn complete(&self, epoch: u64, outcome: Result<Vec<T>, Error>) -> Result<(), Error> {
        let mut state = self.state.lock();

        if state.epoch != epoch {
            tracing::debug!(tier = self.name, "discarding response for stale selection");
            return Ok(());
        }

        match outcome {
            Ok(items) => {
                tracing::debug!(tier = self.name, count = items.len(), "tier loaded");
                state.items = items;
                state.phase = TierPhase::Ready;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(tier = self.name, %error, "tier load failed");
                state.phase = TierPhase::Failed;
                Err(error)
            }
        }
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.epoch += 1;
        state.items.clear();
        state.phase = TierPhase::Idle;
    }

    fn items(&self) -> Vec<T> {
        self.state.lock().items.clone()
    }

    fn phase(&self) -> TierPhase {
        self.state.lock().phase
    }

    fn loading(&self) -> bool {
        self.phase() == TierPhase::Loading
    }
}

pub struct TaxonomyCache {
    service: Arc<dyn TaxonomyService>,
    subjects: Tier<Subject>,
    topics: Tier<Topic>,
    sub_topics: Tier<SubTopic>,
}

impl TaxonomyCache {
    pub fn new(service: Arc<dyn TaxonomyService>) -> Self {
        Self {
            service,
            subjects: Tier::new("subjects"),
            topics: Tier::new("topics"),
            sub_topics: Tier::new("sub_topics"),
        }
    }

    pub async fn load_subjects(&self) -> Result<(), Error> {
        let epoch = self.subjects.begin();
        let fetched = self.service.subjects().await;
        self.subjects.complete(epoch, fetched)
    }

    pub async fn load_topics(&self, subject_id: &str) -> Result<(), Error> {
        if subject_id.trim().is_empty() {
            return Err(Error::NotFound("subject".to_owned()));
        }

        // Topics from another subject invalidate everything below them,
        // including replies still in flight for the old selection.
        self.sub_topics.clear();

        let epoch = self.topics.begin();
        let fetched = self.service.topics_by_subject(subject_id).await;
        self.topics.complete(epoch, fetched)
    }

    pub async fn load_sub_topics(&self, topic_ids: &[String]) -> Result<(), Error> {
        if topic_ids.is_empty() {
            self.sub_topics.clear();
            return Ok(());
        }

        let epoch = self.sub_topics.begin();

        // One request per selected topic, joined wait-all; the flattened
        // union keeps input order and is not deduplicated.
        let fetched = try_join_all(
            topic_ids
                .iter()
                .map(|topic_id| self.service.sub_topics_by_topic(topic_id)),
        )
        .await
        .map(|sets| sets.into_iter().flatten().collect());

        self.sub_topics.complete(epoch, fetched)
    }

    pub fn clear_topics(&self) {
        self.topics.clear();
    }

    pub fn clear_sub_topics(&self) {
        self.sub_topics.clear();
    }

    pub fn subjects(&self) -> Vec<Subject> {
        self.subjects.items()
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.topics.items()
    }

    pub fn sub_topics(&self) -> Vec<SubTopic> {
        self.sub_topics.items()
    }

    pub fn loading_subjects(&self) -> bool {
        self.subjects.loading()
    }

    pub fn loading_topics(&self) -> bool {
        self.topics.loading()
    }

    pub fn loading_sub_topics(&self) -> bool {
        self.sub_topics.loading()
    }

    pub fn subjects_phase(&self) -> TierPhase {
        self.subjects.phase()
    }

    pub fn topics_phase(&self) -> TierPhase {
        self.topics.phase()
    }

    pub fn sub_topics_phase(&self) -> TierPhase {
        self.sub_topics.phase()
    }
}
