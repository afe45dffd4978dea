//! Raw data bag: merged output of the data-fetch stage
//!
//! Lives for one orchestration run. Section generators read it; nothing
//! writes to it after [`RawDataBag::merge`].

use serde_json::Value;
use std::collections::BTreeMap;

use super::naming::resolve_company_name;
use crate::jobs::JobInput;
use crate::sources::{SourceData, SourceKind};
use crate::types::Result;

/// What one source contributed
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    Data(Value),
    Unavailable { reason: String },
}

#[derive(Debug, Clone)]
pub struct RawDataBag {
    company_name: String,
    url: String,
    domain: String,
    sources: BTreeMap<SourceKind, SourceOutcome>,
}

impl RawDataBag {
    /// Merge labeled fetch outcomes. The first plausible source-supplied
    /// company name (in source order) replaces `heuristic_name`.
    pub fn merge(
        input: &JobInput,
        heuristic_name: &str,
        outcomes: Vec<(SourceKind, Result<SourceData>)>,
    ) -> Self {
        let company_name = resolve_company_name(
            heuristic_name,
            outcomes.iter().filter_map(|(_, outcome)| {
                outcome.as_ref().ok().and_then(|d| d.company_name.as_deref())
            }),
        );

        let sources = outcomes
            .into_iter()
            .map(|(kind, outcome)| {
                let outcome = match outcome {
                    Ok(data) => SourceOutcome::Data(data.payload),
                    Err(e) => SourceOutcome::Unavailable {
                        reason: e.to_string(),
                    },
                };
                (kind, outcome)
            })
            .collect();

        Self {
            company_name,
            url: input.url.clone(),
            domain: input.domain.clone(),
            sources,
        }
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn outcome(&self, kind: SourceKind) -> Option<&SourceOutcome> {
        self.sources.get(&kind)
    }

    /// Payload of a source that produced data
    pub fn data(&self, kind: SourceKind) -> Option<&Value> {
        match self.sources.get(&kind)? {
            SourceOutcome::Data(value) => Some(value),
            SourceOutcome::Unavailable { .. } => None,
        }
    }

    /// Value at `path` inside a source payload
    pub fn lookup(&self, kind: SourceKind, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(self.data(kind)?, |value, key| value.get(*key))
    }

    pub fn is_available(&self, kind: SourceKind) -> bool {
        self.data(kind).is_some()
    }

    pub fn any_available(&self, kinds: &[SourceKind]) -> bool {
        kinds.iter().any(|kind| self.is_available(*kind))
    }

    /// Why each of `kinds` has no data, joined for display
    pub fn unavailable_reasons(&self, kinds: &[SourceKind]) -> String {
        kinds
            .iter()
            .filter_map(|kind| match self.sources.get(kind) {
                Some(SourceOutcome::Data(_)) => None,
                Some(SourceOutcome::Unavailable { reason }) => Some(format!("{kind}: {reason}")),
                None => Some(format!("{kind}: not configured")),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn available_count(&self) -> usize {
        self.sources
            .values()
            .filter(|o| matches!(o, SourceOutcome::Data(_)))
            .count()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScreenerError;
    use serde_json::json;

    fn input() -> JobInput {
        JobInput::parse("https://acme.co/").unwrap()
    }

    fn outcomes() -> Vec<(SourceKind, Result<SourceData>)> {
        vec![
            (
                SourceKind::Website,
                Ok(SourceData::new(json!({"market": {"content": "Robotics"}}))
                    .with_company_name("Acme Robotics")),
            ),
            (
                SourceKind::Tracxn,
                Err(ScreenerError::provider("tracxn", Some(503), "Service Unavailable")),
            ),
        ]
    }

    #[test]
    fn test_merge_records_data_and_failures() {
        let bag = RawDataBag::merge(&input(), "acme", outcomes());
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.available_count(), 1);
        assert!(bag.is_available(SourceKind::Website));
        assert!(!bag.is_available(SourceKind::Tracxn));
        assert!(matches!(
            bag.outcome(SourceKind::Tracxn),
            Some(SourceOutcome::Unavailable { reason }) if reason.contains("503")
        ));
        assert_eq!(bag.domain(), "acme.co");
    }

    #[test]
    fn test_merge_prefers_resolved_name() {
        let bag = RawDataBag::merge(&input(), "acme", outcomes());
        assert_eq!(bag.company_name(), "Acme Robotics");

        let bag = RawDataBag::merge(&input(), "acme", Vec::new());
        assert_eq!(bag.company_name(), "acme");
        assert!(bag.is_empty());
    }

    #[test]
    fn test_lookup_walks_payload() {
        let bag = RawDataBag::merge(&input(), "acme", outcomes());
        assert_eq!(
            bag.lookup(SourceKind::Website, &["market", "content"]),
            Some(&json!("Robotics"))
        );
        assert!(bag.lookup(SourceKind::Website, &["team"]).is_none());
        assert!(bag.lookup(SourceKind::Tracxn, &[]).is_none());
    }

    #[test]
    fn test_unavailable_reasons() {
        let bag = RawDataBag::merge(&input(), "acme", outcomes());
        let reasons = bag.unavailable_reasons(&[SourceKind::Tracxn, SourceKind::Serper, SourceKind::Website]);
        assert!(reasons.contains("tracxn: Provider 'tracxn' failed (503)"));
        assert!(reasons.contains("serper: not configured"));
        assert!(!reasons.contains("website"));
        assert!(bag.any_available(&[SourceKind::Tracxn, SourceKind::Website]));
        assert!(!bag.any_available(&[SourceKind::Tracxn]));
    }
}
