//! Document Q&A from the command line.
//!
//! Runs the same match -> compose -> complete flow as `POST /docs-qa` and
//! prints the answer with its sources. When nothing matches, the canned
//! no-documents reply is printed and the completion service is not called.

use anyhow::Result;

use crate::answer;
use crate::completion::create_provider;
use crate::config::Config;
use crate::matcher;
use crate::server::NO_DOCUMENTS_MESSAGE;
use crate::store::DocumentStore;

pub async fn run_ask(config: &Config, question: &str) -> Result<()> {
    let store = DocumentStore::new(&config.documents);
    let documents = store.list();
    let matched = matcher::find_relevant(&documents, &config.topics, question);

    if matched.is_empty() {
        println!("{}", NO_DOCUMENTS_MESSAGE);
        return Ok(());
    }

    let provider = create_provider(&config.completion)?;
    let qa =
        answer::answer_question(provider.as_ref(), &config.completion, question, &matched).await?;

    println!("{}", qa.answer);
    println!();
    println!("Sources ({}):", qa.sources.len());
    for source in &qa.sources {
        println!("  {}", source);
    }

    Ok(())
}
