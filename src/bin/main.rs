use finance_query_engine::{
    assistant::FinanceAssistant, config::AssistantConfig, models::AccessGrant,
    state::SessionState,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sample questions run when no query is given on the command line
const DEMO_QUERIES: [&str; 6] = [
    "What are my total assets?",
    "How can I pay off my loan faster?",
    "What is my credit score?",
    "मेरा क्रेडिट स्कोर क्या है?",
    "Can you analyze my finances?",
    "Help me create budget",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Finance Query Engine starting");

    let config = AssistantConfig::from_env();
    let assistant = FinanceAssistant::from_config(&config)?;
    let profile = config.load_profile()?;
    let grants = AccessGrant::all();
    let mut session = SessionState::default();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let queries: Vec<String> = if args.is_empty() {
        DEMO_QUERIES.iter().map(|q| q.to_string()).collect()
    } else {
        vec![args.join(" ")]
    };

    for query in &queries {
        match assistant.chat(&mut session, query, &profile, &grants).await {
            Ok(reply) => {
                info!(locale = %reply.locale, source = ?reply.source, "Answered");
                println!("\n=== {} ===", query);
                println!("{}", reply.text);
            }
            Err(e) => eprintln!("Query failed: {}", e),
        }
    }

    let (summary, _) = assistant
        .summarize(&session.log, session.locale.as_ref())
        .await;
    println!("\n=== SUMMARY ===\n{}", summary);

    Ok(())
}
