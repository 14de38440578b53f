//! Core StructuredExtractor implementation

use crate::config::ExtractorConfig;
use crate::error::Degradation;
use crate::parser::{decode_contacts, decode_shows, decode_venue};
use crate::prompt::{schema, PromptBuilder};
use crate::types::{
    CandidateExtraction, FieldGroup, GroupIssue, Outcome, PromptStyle, ShowFields,
};
use std::sync::Arc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tourbook_domain::{
    Candidate, ContactFields, CoreFields, DealFields, LlmProvider, VenueFields,
};
use tracing::{debug, info, warn};

/// Turns normalized document text into candidate show bookings
///
/// Every operation is total: backend failures, timeouts and unusable model
/// output degrade to empty, zero-confidence fields instead of erroring.
pub struct StructuredExtractor<L> {
    llm_provider: Arc<L>,
    config: ExtractorConfig,
}

impl<L> Clone for StructuredExtractor<L> {
    fn clone(&self) -> Self {
        Self {
            llm_provider: Arc::clone(&self.llm_provider),
            config: self.config.clone(),
        }
    }
}

impl<L: LlmProvider> StructuredExtractor<L> {
    /// Create a new extractor over an explicitly configured backend
    pub fn new(llm_provider: Arc<L>, config: ExtractorConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract every show in the document (core fields and deal terms)
    pub async fn extract_show_fields(
        &self,
        text: &str,
        style: PromptStyle,
        cancel: &CancellationToken,
    ) -> Outcome<Vec<ShowFields>> {
        match self.call(FieldGroup::Show, text, style, cancel).await {
            Ok(response) => decode_shows(&response),
            Err(reason) => Outcome::Degraded { reason },
        }
    }

    /// Extract the venue the document is about
    pub async fn extract_venue_fields(
        &self,
        text: &str,
        style: PromptStyle,
        cancel: &CancellationToken,
    ) -> Outcome<VenueFields> {
        match self.call(FieldGroup::Venue, text, style, cancel).await {
            Ok(response) => decode_venue(&response),
            Err(reason) => Outcome::Degraded { reason },
        }
    }

    /// Extract the contacts named in the document
    pub async fn extract_contact_fields(
        &self,
        text: &str,
        style: PromptStyle,
        cancel: &CancellationToken,
    ) -> Outcome<Vec<ContactFields>> {
        match self.call(FieldGroup::Contacts, text, style, cancel).await {
            Ok(response) => decode_contacts(&response),
            Err(reason) => Outcome::Degraded { reason },
        }
    }

    /// Run all three field groups concurrently and assemble candidates
    ///
    /// Yields one candidate per show, or a single empty candidate when no
    /// show was found. Venue and contacts are shared by every candidate,
    /// with a show's own venue name and city taking precedence.
    pub async fn extract_candidates(
        &self,
        text: &str,
        style: PromptStyle,
        cancel: &CancellationToken,
    ) -> CandidateExtraction {
        if text.trim().is_empty() {
            debug!("No text to structure, skipping backend");
            return CandidateExtraction {
                candidates: vec![Candidate::empty()],
                issues: Vec::new(),
                mode: style.mode(),
            };
        }

        info!(
            "Starting structured extraction, text length {}, style {:?}",
            text.len(),
            style
        );

        let (shows, venue, contacts) = tokio::join!(
            self.extract_show_fields(text, style, cancel),
            self.extract_venue_fields(text, style, cancel),
            self.extract_contact_fields(text, style, cancel),
        );

        let mut issues = Vec::new();
        for (group, reason) in [
            (FieldGroup::Show, shows.degradation()),
            (FieldGroup::Venue, venue.degradation()),
            (FieldGroup::Contacts, contacts.degradation()),
        ] {
            if let Some(reason) = reason {
                warn!(group = %group, "Field group degraded: {}", reason);
                issues.push(GroupIssue {
                    group,
                    reason: reason.clone(),
                });
            }
        }

        let candidates = assemble(
            shows.into_fields(),
            venue.into_fields(),
            contacts.into_fields(),
            self.config.max_candidates,
        );

        info!(
            "Structured extraction complete: {} candidates, {} degraded groups",
            candidates.len(),
            issues.len()
        );

        CandidateExtraction {
            candidates,
            issues,
            mode: style.mode(),
        }
    }

    /// One backend round trip, bounded by the timeout and the cancel token
    async fn call(
        &self,
        group: FieldGroup,
        text: &str,
        style: PromptStyle,
        cancel: &CancellationToken,
    ) -> Result<String, Degradation> {
        if cancel.is_cancelled() {
            return Err(Degradation::Cancelled);
        }

        if !self.llm_provider.has_credentials() {
            return Err(Degradation::MissingCredentials);
        }

        let length = text.chars().count();
        if length > self.config.max_text_length {
            return Err(Degradation::TextTooLong(length, self.config.max_text_length));
        }

        let prompt = PromptBuilder::new(group, text).with_style(style).build();
        debug!(group = %group, "Prompt length: {} chars", prompt.len());

        let request = timeout(
            self.config.backend_timeout(),
            self.llm_provider.generate_structured(&prompt, schema(group)),
        );

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Degradation::Cancelled),
            result = request => match result {
                Err(_) => return Err(Degradation::Timeout),
                Ok(Err(e)) => return Err(Degradation::BackendUnavailable(e.to_string())),
                Ok(Ok(response)) => response,
            },
        };

        debug!(group = %group, "Backend response length: {} chars", response.len());
        Ok(response)
    }
}

fn assemble(
    shows: Vec<ShowFields>,
    venue: VenueFields,
    contacts: Vec<ContactFields>,
    max_candidates: usize,
) -> Vec<Candidate> {
    if shows.is_empty() {
        return vec![Candidate::from_parts(
            CoreFields::default(),
            venue,
            DealFields::default(),
            contacts,
        )];
    }

    if shows.len() > max_candidates {
        warn!(
            "Document lists {} shows, keeping the first {}",
            shows.len(),
            max_candidates
        );
    }

    shows
        .into_iter()
        .take(max_candidates)
        .map(|show| {
            let mut venue = venue.clone();
            venue.name = show.venue_name.or(venue.name);
            venue.city = show.city.or(venue.city);
            Candidate::from_parts(show.core, venue, show.deal, contacts.clone())
        })
        .collect()
}
