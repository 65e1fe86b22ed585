mod config;

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use scout_agent::{AgentConfig, AgentError, SessionController, UserLevel};
use scout_llm::OllamaClient;
use scout_store::{ConversationStore, SessionSummary};
use scout_tools::ResearchToolkit;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;

const SESSION_LIST_LIMIT: usize = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Scout");
    tracing::info!(model = %config.llm.model, base_url = %config.llm.base_url, "Config loaded");

    let chat_client = match &config.api_key {
        Some(key) => OllamaClient::with_api_key(&config.llm.base_url, key)?,
        None => OllamaClient::new(&config.llm.base_url)?,
    };

    let toolkit = ResearchToolkit::new()?;
    let store = ConversationStore::new(&config.storage.dir)?;

    let user_level: UserLevel = config
        .agent
        .user_level
        .parse()
        .unwrap_or(UserLevel::General);
    let agent_config = AgentConfig::new(&config.llm.model)
        .with_user_level(user_level)
        .with_temperature(config.llm.temperature)
        .with_reasoning_timeout(Duration::from_secs(config.agent.reasoning_timeout_secs))
        .with_tool_timeout(Duration::from_secs(config.agent.tool_timeout_secs));

    let controller = SessionController::new(
        Arc::new(chat_client),
        Arc::new(toolkit),
        store,
        agent_config,
    );

    run_repl(&controller).await
}

async fn run_repl(controller: &SessionController) -> anyhow::Result<()> {
    println!("Scout research assistant. Type a question, or /help for commands.");

    let stdin = io::stdin();
    let mut ctx = controller.new_context();
    let mut listing: Vec<SessionSummary> = Vec::new();

    loop {
        print!("\nyou> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(command) = input.strip_prefix('/') {
            let mut parts = command.splitn(2, char::is_whitespace);
            let name = parts.next().unwrap_or_default();
            let arg = parts.next().map(str::trim).unwrap_or_default();

            match name {
                "quit" | "exit" => break,
                "help" => print_help(),
                "new" => {
                    ctx = controller.new_context();
                    println!("Started a new session.");
                }
                "sessions" => {
                    listing = controller.store().list(SESSION_LIST_LIMIT)?;
                    print_sessions(&listing);
                }
                "load" => match resolve_session_ref(arg, &listing) {
                    Some(id) => match controller.resume(&id) {
                        Ok(resumed) => {
                            ctx = resumed;
                            println!("Resumed session {}.", id);
                        }
                        Err(e) => println!("Could not load session: {}", e),
                    },
                    None => println!("Usage: /load <session-id or list number> (run /sessions first)"),
                },
                "delete" => match resolve_session_ref(arg, &listing) {
                    Some(id) => {
                        if controller.store().delete(&id)? {
                            if ctx.session_id.as_deref() == Some(id.as_str()) {
                                ctx = controller.new_context();
                            }
                            println!("Deleted session {}.", id);
                        } else {
                            println!("No session with id {}.", id);
                        }
                    }
                    None => println!("Usage: /delete <session-id or list number>"),
                },
                _ => println!("Unknown command /{}. Try /help.", name),
            }
            continue;
        }

        match controller.run_turn(&mut ctx, input).await {
            Ok(outcome) => {
                if let Some(tool) = &outcome.tool_used {
                    tracing::debug!(tool = %tool, "Turn used a tool");
                }
                println!("\nscout> {}", outcome.answer);
            }
            Err(AgentError::Reasoning(e)) => {
                println!("\nThe reasoning step failed: {:#}. Nothing was saved; please try again.", e);
            }
            Err(e) => {
                println!("\nError: {}", e);
            }
        }
    }

    println!("Bye.");
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  /new               start a new session");
    println!("  /sessions          list saved sessions");
    println!("  /load <id|N>       resume a session by id or list number");
    println!("  /delete <id|N>     delete a session by id or list number");
    println!("  /quit              exit");
    println!("Anything else is sent to the agent as a research question.");
}

fn print_sessions(listing: &[SessionSummary]) {
    if listing.is_empty() {
        println!("No saved sessions.");
        return;
    }
    for (i, summary) in listing.iter().enumerate() {
        println!(
            "{:>3}. {}  [{}]  {} exchange(s)  updated {}",
            i + 1,
            summary.name,
            summary.id,
            summary.exchange_count,
            summary.last_updated.format("%Y-%m-%d %H:%M"),
        );
    }
}

/// Resolve a session reference: a 1-based index into the last listing, or a
/// raw session id.
fn resolve_session_ref(arg: &str, listing: &[SessionSummary]) -> Option<String> {
    if arg.is_empty() {
        return None;
    }
    if let Ok(n) = arg.parse::<usize>() {
        return listing
            .get(n.checked_sub(1)?)
            .map(|summary| summary.id.clone());
    }
    Some(arg.to_string())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn summary(id: &str) -> SessionSummary {
        SessionSummary {
            id: id.to_string(),
            name: "test".to_string(),
            created_at: Utc::now(),
            last_updated: Utc::now(),
            first_query: "test".to_string(),
            exchange_count: 1,
        }
    }

    #[test]
    fn session_ref_resolves_index_and_id() {
        let listing = vec![summary("20260830_120000_001"), summary("20260830_120001_002")];

        assert_eq!(
            resolve_session_ref("2", &listing).as_deref(),
            Some("20260830_120001_002")
        );
        assert_eq!(
            resolve_session_ref("20260830_120000_001", &listing).as_deref(),
            Some("20260830_120000_001")
        );
        assert!(resolve_session_ref("", &listing).is_none());
        assert!(resolve_session_ref("3", &listing).is_none());
        assert!(resolve_session_ref("0", &listing).is_none());
    }
}
