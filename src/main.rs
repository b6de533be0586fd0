use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;

mod api;
mod config;
mod console;
mod input;

use config::Config;

#[derive(Parser)]
struct TestConsole {
    #[clap(long, env = "TEST_CONSOLE_API_URL", value_parser)]
    api_url: Option<Url>,

    #[clap(long, env = "TEST_CONSOLE_API_TOKEN", hide_env_values = true, value_parser)]
    api_token: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    CreateTest {
        #[clap(short, long, value_parser, value_name = "PATH")]
        definition_path: PathBuf,
    },
    AddQuestions {
        #[clap(short, long, value_parser)]
        test_id: String,

        #[clap(short, long, value_parser, value_name = "PATH")]
        data_path: PathBuf,
    },
    Publish {
        #[clap(short, long, value_parser)]
        test_id: String,

        #[clap(long, value_parser, value_name = "YYYY-MM-DDTHH:MM")]
        schedule: Option<String>,

        #[clap(long, value_parser, value_name = "YYYY-MM-DDTHH:MM")]
        expires: Option<String>,
    },
    ListTests,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "env-file")]
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let test_console = TestConsole::parse();
    let config = Config::new(test_console.api_url, test_console.api_token);

    match test_console.command {
        Command::CreateTest { definition_path } => {
            console::create_test(config, definition_path).await
        }
        Command::AddQuestions { test_id, data_path } => {
            console::add_questions(config, test_id, data_path).await
        }
        Command::Publish {
            test_id,
            schedule,
            expires,
        } => console::publish(config, test_id, schedule, expires).await,
        Command::ListTests => console::list_tests(config).await,
    }
}
