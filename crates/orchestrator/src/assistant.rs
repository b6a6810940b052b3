//! Question answering over course materials with session memory.

use std::sync::Arc;

use course_tools::{course_registry, Provenance, RegistryToolExecutor};
use rag_core::{LlmGateway, RetrievalStore, SessionHistory, StoreError};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::AssistantConfig;
use crate::error::OrchestratorError;
use crate::orchestrator::Orchestrator;

/// The answer to one query and the sources behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryAnswer {
    pub answer: String,
    pub sources: Vec<Provenance>,
}

impl QueryAnswer {
    /// Sources in their `label|link` form.
    pub fn encoded_sources(&self) -> Vec<String> {
        self.sources.iter().map(Provenance::encode).collect()
    }
}

/// Catalog summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseAnalytics {
    pub total_courses: usize,
    pub course_titles: Vec<String>,
}

/// Front door for course questions.
///
/// Every query gets its own tool registry, so provenance from one run can
/// never leak into another even when queries run concurrently. Session
/// history is shared and keyed by session id.
pub struct CourseAssistant {
    orchestrator: Orchestrator,
    store: Arc<dyn RetrievalStore>,
    history: SessionHistory,
}

impl CourseAssistant {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        store: Arc<dyn RetrievalStore>,
        config: AssistantConfig,
    ) -> Self {
        info!(
            "CourseAssistant initialized with gateway: {}, max_rounds: {}",
            gateway.name(),
            config.max_rounds
        );

        Self {
            orchestrator: Orchestrator::new(gateway).with_max_rounds(config.max_rounds),
            store,
            history: SessionHistory::with_limits(config.max_history, config.max_sessions),
        }
    }

    /// Allocate a new session id.
    pub fn create_session(&self) -> String {
        self.history.create_session()
    }

    /// Forget a session's history.
    pub async fn clear_session(&self, session_id: &str) {
        self.history.clear(session_id).await;
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Answer a question, using and extending the session's history.
    pub async fn query(
        &self,
        query: &str,
        session_id: Option<&str>,
    ) -> Result<QueryAnswer, OrchestratorError> {
        let executor = RegistryToolExecutor::new(course_registry(self.store.clone())?);

        let history = match session_id {
            Some(id) => self.history.render(id).await,
            None => None,
        };

        let prompt = format!("Answer this question about course materials: {}", query);
        let answer = self
            .orchestrator
            .run(&prompt, history.as_deref(), Some(&executor))
            .await?;

        let sources = executor.latest_provenance().await;
        executor.registry().clear_provenance().await;

        debug!("Answered query with {} source(s)", sources.len());

        if let Some(id) = session_id {
            self.history.add_exchange(id, query, &answer).await;
        }

        Ok(QueryAnswer { answer, sources })
    }

    /// Number and titles of the courses in the catalog.
    pub async fn course_analytics(&self) -> Result<CourseAnalytics, StoreError> {
        let course_titles = self.store.course_titles().await?;
        Ok(CourseAnalytics {
            total_courses: course_titles.len(),
            course_titles,
        })
    }
}
