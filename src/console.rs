use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use parking_lot::Mutex;

use test_console::data::{PublishPlan, PublishWindow};
use test_console::raw_data::DATE_TIME_FORMAT;
use test_console::session::Notifier;
use test_console::ConsoleSession;

use crate::api::HttpApi;
use crate::config::Config;
use crate::input;

// Identical messages within a second are collapsed into one line.
const REPEAT_WINDOW: Duration = Duration::from_secs(1);

pub struct ToastNotifier {
    last: Mutex<Option<(String, Instant)>>,
}

impl ToastNotifier {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    fn repeated(&self, message: &str) -> bool {
        let mut last = self.last.lock();
        let now = Instant::now();

        let repeat = matches!(
            &*last,
            Some((previous, at)) if previous == message && now.duration_since(*at) < REPEAT_WINDOW
        );

        if !repeat {
            *last = Some((message.to_owned(), now));
        }
        repeat
    }
}

impl Notifier for ToastNotifier {
    fn success(&self, message: &str) {
        if !self.repeated(message) {
            println!("{message}");
        }
    }

    fn error(&self, message: &str) {
        if !self.repeated(message) {
            eprintln!("{message}");
        }
    }
}

fn open_session(config: &Config) -> ConsoleSession {
    let session_context = Arc::new(config.session());
    let api = Arc::new(HttpApi::new(config.api_url.clone(), session_context));

    ConsoleSession::new(api.clone(), api, Arc::new(ToastNotifier::new()))
}

// The test header stores the subject by name in some deployments and by
// id in others; the subjects tier resolves either to an id.
async fn resolve_subject_id(session: &ConsoleSession, subject: &str) -> Result<String> {
    session.cache().load_subjects().await?;

    session
        .cache()
        .subjects()
        .iter()
        .find(|candidate| candidate.id == subject || candidate.name == subject)
        .map(|candidate| candidate.id.clone())
        .ok_or_else(|| anyhow!("subject {subject:?} not found"))
}

pub async fn create_test(config: Config, definition_path: PathBuf) -> Result<()> {
    let mut session = open_session(&config);
    let (mut definition, draft) = input::load_test_definition(&definition_path)?;

    definition.subject = resolve_subject_id(&session, &definition.subject).await?;

    let created = session.define_test(&definition, draft).await?;
    println!("created test {} ({})", created.id, created.name);

    Ok(())
}

pub async fn add_questions(config: Config, test_id: String, data_path: PathBuf) -> Result<()> {
    let mut session = open_session(&config);

    session.open_test(&test_id).await?;
    let subject = session
        .current_test()
        .map(|test| test.subject.clone())
        .ok_or_else(|| anyhow!("test {test_id:?} has no subject"))?;

    let subject_id = resolve_subject_id(&session, &subject).await?;
    session.on_subject_changed(&subject_id).await?;

    for form in input::load_question_forms(&data_path)? {
        if !form.topic_id.is_empty() {
            session.on_topics_changed(&[form.topic_id.clone()]).await?;
        }

        *session.workflow_mut().form_mut() = form;
        session.save_question()?;
    }

    let saved = session.save_all().await?;
    println!("saved {saved} question(s) to test {test_id}");

    Ok(())
}

pub async fn publish(
    config: Config,
    test_id: String,
    schedule: Option<String>,
    expires: Option<String>,
) -> Result<()> {
    let mut session = open_session(&config);
    session.open_test(&test_id).await?;

    let window = match schedule {
        Some(at) => PublishWindow::Scheduled {
            at: parse_date_time(&at)?,
        },
        None => PublishWindow::Immediate,
    };
    let plan = PublishPlan {
        window,
        expiry: match expires {
            Some(at) => Some(parse_date_time(&at)?),
            None => None,
        },
    };

    session.publish_test(&plan).await?;
    Ok(())
}

pub async fn list_tests(config: Config) -> Result<()> {
    use test_console::api::TestService;

    let api = HttpApi::new(config.api_url.clone(), Arc::new(config.session()));

    for test in api.list_tests().await? {
        println!(
            "{}  {:<32}  {:?}  {} question(s)",
            test.id, test.name, test.status, test.total_questions,
        );
    }

    Ok(())
}

fn parse_date_time(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
        .map_err(|_| anyhow!("expected {DATE_TIME_FORMAT}, got {value:?}"))
}
