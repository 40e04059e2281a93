//! CLI listing and inspection of the document store.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::store::{excerpt, DocumentStore};

pub fn run_documents(config: &Config) -> Result<()> {
    let store = DocumentStore::new(&config.documents);
    let documents = store.list();

    if documents.is_empty() {
        println!("No documents in {}.", config.documents.dir.display());
        return Ok(());
    }

    println!("{:<24} {:>8}  {:<12} PREVIEW", "NAME", "SIZE", "MODIFIED");
    for doc in &documents {
        let path = store.dir().join(&doc.name);
        let (size, modified) = file_stat(&path);
        let preview = excerpt(&doc.content, 60).replace('\n', " ");
        println!("{:<24} {:>8}  {:<12} {}", doc.name, size, modified, preview);
    }
    println!();
    println!("{} document(s)", documents.len());

    Ok(())
}

pub fn run_show(config: &Config, name: &str) -> Result<()> {
    let store = DocumentStore::new(&config.documents);
    let doc = match store.get(name) {
        Some(d) => d,
        None => {
            eprintln!("Error: document not found: {}", name);
            std::process::exit(1);
        }
    };

    println!("--- {} ---", doc.name);
    println!("{}", doc.content);

    Ok(())
}

fn file_stat(path: &std::path::Path) -> (u64, String) {
    let Ok(metadata) = std::fs::metadata(path) else {
        return (0, "-".to_string());
    };
    let modified = metadata
        .modified()
        .ok()
        .map(DateTime::<Utc>::from)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    (metadata.len(), modified)
}
