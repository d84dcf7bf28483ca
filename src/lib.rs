pub mod api;
pub mod assessment;
pub mod classify;
pub mod config;
pub mod db;
pub mod llm;
pub mod models;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::assessment::AssessmentService;
use crate::classify::{build_classifiers, KnowledgeBase, KnowledgeError};
use crate::config::{AppConfig, ClassifierStrategy, ConfigError};
use crate::db::{Database, DatabaseError};

/// Startup failures. Anything after startup is handled per request.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Llm(#[from] llm::LlmError),

    #[error(transparent)]
    Server(#[from] api::ServerError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Wire configuration, storage and classifiers into a service.
pub fn build_service(config: &AppConfig) -> Result<AssessmentService, StartupError> {
    let knowledge = match &config.classifier.knowledge_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading knowledge tables");
            Arc::new(KnowledgeBase::load(path)?)
        }
        None => KnowledgeBase::builtin()?,
    };

    let llm = match config.classifier.strategy {
        ClassifierStrategy::AiAssisted => Some(config.ai.build_client()?),
        ClassifierStrategy::RuleBased => None,
    };
    let classifiers = build_classifiers(&config.classifier, knowledge, llm);

    let db = Database::open(&config.database.resolved_path()?)?;
    Ok(AssessmentService::new(db, classifiers))
}

pub fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::load()?;

    // The blocking HTTP client inside an AI classifier must be dropped
    // outside the async runtime, so this handle outlives it.
    let service = Arc::new(build_service(&config)?);
    let router = api::api_router(
        service.clone(),
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        let mut server = api::start_api_server(&config.server.bind, router).await?;
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for shutdown signal: {e}");
        }
        server.shutdown();
        server.wait().await?;
        Ok::<(), StartupError>(())
    });

    drop(runtime);
    drop(service);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_builds_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_toml(&format!(
            "[database]\npath = {:?}\n",
            dir.path().join("nested/drugshield.db")
        ))
        .unwrap();
        let service = build_service(&config).unwrap();
        assert_eq!(service.classifiers().strategy, ClassifierStrategy::RuleBased);
        assert!(dir.path().join("nested/drugshield.db").exists());
    }

    #[test]
    fn knowledge_override_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let tables = dir.path().join("knowledge.json");
        std::fs::write(
            &tables,
            r#"{"drug_classes":[{"key":"codeine","members":["codeine"]}],
                "allergic_indicators":["rash"],"side_effect_indicators":["nausea"]}"#,
        )
        .unwrap();
        let config = AppConfig::from_toml(&format!(
            "[database]\npath = {:?}\n[classifier]\nknowledge_path = {:?}\n",
            dir.path().join("drugshield.db"),
            tables
        ))
        .unwrap();
        assert!(build_service(&config).is_ok());

        std::fs::write(&tables, "{}").unwrap();
        assert!(matches!(
            build_service(&config),
            Err(StartupError::Knowledge(_))
        ));
    }
}
