//! Turns a free-text query into an [`Intent`].
//!
//! The remote classifier is asked first. Whenever it is down, slow, or replies
//! with something that does not parse, the keyword fallback answers instead,
//! so [`IntentResolver::resolve`] never fails.

pub mod classifier;
pub mod extract;
pub mod fallback;

use crate::data_models::Intent;
use crate::error::ClassifierError;

use self::classifier::ClassifierClient;
use self::extract::{ContentExtractor, default_extractors, intent_from_payload};
use self::fallback::KeywordClassifier;

pub struct IntentResolver {
    classifier: ClassifierClient,
    extractors: Vec<Box<dyn ContentExtractor>>,
    fallback: KeywordClassifier,
}

impl IntentResolver {
    pub fn new(classifier: ClassifierClient) -> Self {
        Self {
            classifier,
            extractors: default_extractors(),
            fallback: KeywordClassifier,
        }
    }

    pub fn with_extractors(mut self, extractors: Vec<Box<dyn ContentExtractor>>) -> Self {
        self.extractors = extractors;
        self
    }

    pub async fn resolve(&self, query: &str) -> Intent {
        match self.classify(query).await {
            Ok(intent) => {
                log::info!("classifier resolved query, search: {}", intent.is_search());
                intent.with_default_query(query)
            }
            Err(e) => {
                log::warn!("using fallback parser for query {query:?}: {:#}", e);
                self.fallback.classify(query)
            }
        }
    }

    /// Remote classification only, without the fallback.
    pub async fn classify(&self, query: &str) -> Result<Intent, ClassifierError> {
        if !self.classifier.is_available().await {
            return Err(ClassifierError::Unavailable);
        }
        let payload = self.classifier.complete(query).await?;
        let intent = intent_from_payload(&payload, &self.extractors)?;
        Ok(intent)
    }
}
