//! In-memory repositories shared by the unit tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use medirag_types::chat::ResponseMetrics;
use medirag_types::config::KnowledgeConfig;
use medirag_types::error::RepositoryError;
use medirag_types::evaluation::EvaluationReport;
use medirag_types::knowledge::Document;
use medirag_types::memory::{
    ConversationContext, MemoryCounts, MemoryEntry, MemoryType, UserProfile,
};

use crate::knowledge::box_store::BoxChunkStore;
use crate::knowledge::fallback::FallbackEmbedder;
use crate::knowledge::memory_store::InMemoryChunkStore;
use crate::knowledge::service::KnowledgeService;
use crate::repository::document::DocumentRepository;
use crate::repository::evaluation::EvaluationRepository;
use crate::repository::memory::MemoryRepository;
use crate::repository::metrics::MetricsRepository;

/// Clones share the same documents, like two processes over one database.
#[derive(Default, Clone)]
pub struct MockDocumentRepository {
    documents: Arc<Mutex<Vec<Document>>>,
}

impl DocumentRepository for MockDocumentRepository {
    async fn save(&self, document: &Document) -> Result<(), RepositoryError> {
        let mut docs = self.documents.lock().unwrap();
        docs.retain(|d| d.id != document.id);
        docs.push(document.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Document>, RepositoryError> {
        Ok(self.documents.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Document>, RepositoryError> {
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut docs = self.documents.lock().unwrap();
        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(docs.len() != before)
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let mut docs = self.documents.lock().unwrap();
        let n = docs.len() as u64;
        docs.clear();
        Ok(n)
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.documents.lock().unwrap().len())
    }
}

#[derive(Default)]
struct MemoryTables {
    entries: Vec<MemoryEntry>,
    profiles: BTreeMap<String, UserProfile>,
    contexts: BTreeMap<String, ConversationContext>,
}

impl MemoryTables {
    fn drop_orphan_contexts(&mut self) {
        let entries = &self.entries;
        self.contexts
            .retain(|session, _| entries.iter().any(|e| &e.session_id == session));
    }
}

#[derive(Default)]
pub struct MockMemoryRepository {
    tables: Mutex<MemoryTables>,
    /// When set, every write fails.
    pub fail_writes: bool,
}

impl MockMemoryRepository {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    fn check_write(&self) -> Result<(), RepositoryError> {
        if self.fail_writes {
            Err(RepositoryError::Connection)
        } else {
            Ok(())
        }
    }
}

impl MemoryRepository for MockMemoryRepository {
    async fn save_entry(&self, entry: &MemoryEntry) -> Result<(), RepositoryError> {
        self.check_write()?;
        let mut tables = self.tables.lock().unwrap();
        tables.entries.retain(|e| e.id != entry.id);
        tables.entries.push(entry.clone());
        Ok(())
    }

    async fn list_session(&self, session_id: &str) -> Result<Vec<MemoryEntry>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        let mut entries: Vec<MemoryEntry> = tables
            .entries
            .iter()
            .filter(|e| e.memory_type == MemoryType::Session && e.session_id == session_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn list_long_term(&self, user_id: Option<&str>) -> Result<Vec<MemoryEntry>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        let mut entries: Vec<MemoryEntry> = tables
            .entries
            .iter()
            .filter(|e| e.memory_type == MemoryType::LongTerm)
            .filter(|e| user_id.is_none_or(|u| e.user_id == u))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn list_sessions(&self) -> Result<Vec<String>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        let mut sessions: Vec<String> = tables
            .entries
            .iter()
            .filter(|e| e.memory_type == MemoryType::Session)
            .map(|e| e.session_id.clone())
            .collect();
        sessions.sort();
        sessions.dedup();
        Ok(sessions)
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        self.check_write()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.entries.len();
        tables.entries.retain(|e| e.timestamp > cutoff);
        tables.drop_orphan_contexts();
        Ok((before - tables.entries.len()) as u64)
    }

    async fn delete_user(&self, user_id: &str) -> Result<u64, RepositoryError> {
        self.check_write()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.entries.len();
        tables.entries.retain(|e| e.user_id != user_id);
        tables.profiles.remove(user_id);
        tables.drop_orphan_contexts();
        Ok((before - tables.entries.len()) as u64)
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        self.check_write()?;
        let mut tables = self.tables.lock().unwrap();
        *tables = MemoryTables::default();
        Ok(())
    }

    async fn counts(&self) -> Result<MemoryCounts, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        let session: Vec<&MemoryEntry> = tables
            .entries
            .iter()
            .filter(|e| e.memory_type == MemoryType::Session)
            .collect();
        let mut sessions: Vec<&str> = session.iter().map(|e| e.session_id.as_str()).collect();
        sessions.sort_unstable();
        sessions.dedup();
        Ok(MemoryCounts {
            session_memories: session.len(),
            long_term_memories: tables.entries.len() - session.len(),
            active_sessions: sessions.len(),
            user_profiles: tables.profiles.len(),
        })
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.tables.lock().unwrap().profiles.get(user_id).cloned())
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        self.check_write()?;
        self.tables
            .lock()
            .unwrap()
            .profiles
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        Ok(self.tables.lock().unwrap().profiles.values().cloned().collect())
    }

    async fn get_context(&self, session_id: &str) -> Result<Option<ConversationContext>, RepositoryError> {
        Ok(self.tables.lock().unwrap().contexts.get(session_id).cloned())
    }

    async fn save_context(&self, context: &ConversationContext) -> Result<(), RepositoryError> {
        self.check_write()?;
        self.tables
            .lock()
            .unwrap()
            .contexts
            .insert(context.session_id.clone(), context.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockMetricsRepository {
    metrics: Mutex<Vec<ResponseMetrics>>,
}

impl MetricsRepository for MockMetricsRepository {
    async fn record(&self, _session_id: &str, metrics: &ResponseMetrics) -> Result<(), RepositoryError> {
        self.metrics.lock().unwrap().push(metrics.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ResponseMetrics>, RepositoryError> {
        Ok(self.metrics.lock().unwrap().clone())
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let mut metrics = self.metrics.lock().unwrap();
        let n = metrics.len() as u64;
        metrics.clear();
        Ok(n)
    }
}

#[derive(Default)]
pub struct MockEvaluationRepository {
    reports: Mutex<Vec<EvaluationReport>>,
}

impl EvaluationRepository for MockEvaluationRepository {
    async fn save(&self, report: &EvaluationReport) -> Result<(), RepositoryError> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<EvaluationReport>, RepositoryError> {
        let reports = self.reports.lock().unwrap();
        Ok(reports.iter().rev().take(limit).cloned().collect())
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let mut reports = self.reports.lock().unwrap();
        let n = reports.len() as u64;
        reports.clear();
        Ok(n)
    }
}

/// Hashing-embedder knowledge service over in-memory storage.
pub fn knowledge_service(relevance_threshold: f64) -> KnowledgeService<MockDocumentRepository> {
    knowledge_service_over(MockDocumentRepository::default(), relevance_threshold)
}

/// Knowledge service over `documents` with a fresh, empty chunk store.
pub fn knowledge_service_over(
    documents: MockDocumentRepository,
    relevance_threshold: f64,
) -> KnowledgeService<MockDocumentRepository> {
    let config = KnowledgeConfig {
        relevance_threshold,
        ..KnowledgeConfig::default()
    };
    KnowledgeService::new(
        documents,
        BoxChunkStore::new(InMemoryChunkStore::new()),
        FallbackEmbedder::hashing_only(),
        &config,
    )
}
