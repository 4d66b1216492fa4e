//! Retrieval subcommands.

use std::path::PathBuf;

use anyhow::Context;
use tracing::warn;

use mnemo_config::Config;
use mnemo_memory_hybrid::{FusionConfig, HybridRetriever};
use mnemo_protocols::{RetrievalError, ScopeLabel};

use crate::cli::{Commands, SnapshotAction};
use crate::components::open_retriever;

/// Retryable failures degrade to an empty result; the suppressed error is logged.
fn or_empty<T>(result: Result<Vec<T>, RetrievalError>, query: &str) -> Result<Vec<T>, RetrievalError> {
    match result {
        Err(e) if e.is_retryable() => {
            warn!(error = %e, query, "Search failed, returning no results");
            Ok(Vec::new())
        }
        other => other,
    }
}

fn snapshot_dir(dir: Option<PathBuf>, config: &Config) -> anyhow::Result<PathBuf> {
    dir.or_else(|| config.retrieval.snapshot_dir.clone())
        .context("no snapshot directory given and retrieval.snapshot_dir is not set")
}

pub(crate) async fn handle_retrieval_command<S: ScopeLabel>(
    command: Commands,
    config: &Config,
) -> anyhow::Result<()> {
    let retriever: HybridRetriever<S> = open_retriever(config).await?;
    let top_k = config.retrieval.default_top_k;

    match command {
        Commands::Add { text, scope } => {
            let id = retriever.add_document(&text, &scope).await?;
            println!("{}", id);
        }
        Commands::Search { query, k, scope } => {
            let k = k.unwrap_or(top_k);
            let results = match &scope {
                Some(scope) => retriever.vector_search_in_scope(&query, k, scope).await,
                None => retriever.vector_search(&query, k).await,
            };
            for text in or_empty(results, &query)? {
                println!("{}", text);
            }
        }
        Commands::Hybrid {
            query,
            k,
            ranked,
            alpha,
        } => {
            let k = k.unwrap_or(top_k);
            if ranked {
                let fusion = FusionConfig::with_alpha(alpha);
                let results = retriever.hybrid_search_ranked(&query, k, &fusion).await;
                for (text, score) in or_empty(results, &query)? {
                    println!("{:.5}\t{}", score, text);
                }
            } else {
                let results = retriever.hybrid_search(&query, k).await;
                for text in or_empty(results, &query)? {
                    println!("{}", text);
                }
            }
        }
        Commands::Clear => {
            retriever.clear().await?;
            println!("cleared");
        }
        Commands::Snapshot { action } => match action {
            SnapshotAction::Save { dir } => {
                let dir = snapshot_dir(dir, config)?;
                let count = retriever.save_snapshot(&dir).await?;
                println!("saved {} documents to {}", count, dir.display());
            }
            SnapshotAction::Import { dir } => {
                let dir = snapshot_dir(dir, config)?;
                match retriever.import_snapshot(&dir).await? {
                    Some(count) => println!("imported {} documents from {}", count, dir.display()),
                    None => anyhow::bail!("no snapshot found in {}", dir.display()),
                }
            }
        },
        Commands::Cache { .. } => anyhow::bail!("cache commands do not use the retriever"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_empty_swallows_retryable_errors() {
        let result: Result<Vec<String>, _> =
            Err(RetrievalError::EmbeddingUnavailable("timeout".to_string()));
        assert!(or_empty(result, "q").unwrap().is_empty());
    }

    #[test]
    fn test_or_empty_keeps_fatal_errors() {
        let result: Result<Vec<String>, _> = Err(RetrievalError::DimensionMismatch {
            expected: 384,
            actual: 3,
        });
        assert!(or_empty(result, "q").is_err());
    }

    #[test]
    fn test_snapshot_dir_falls_back_to_config() {
        let mut config = Config::default();
        assert!(snapshot_dir(None, &config).is_err());

        config.retrieval.snapshot_dir = Some(PathBuf::from("/tmp/snap"));
        assert_eq!(snapshot_dir(None, &config).unwrap(), PathBuf::from("/tmp/snap"));
        assert_eq!(
            snapshot_dir(Some(PathBuf::from("/x")), &config).unwrap(),
            PathBuf::from("/x")
        );
    }
}
