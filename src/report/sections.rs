//! Section generators
//!
//! One generator per report section. Most sections are a single prompt over
//! the data bag; market analysis runs its own small fan-out of web lookups
//! before composing the final prompt.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::debug;

use super::bag::RawDataBag;
use super::model::Section;
use super::prompts;
use crate::ai::web_answer::{lookup, web_prompt};
use crate::ai::{GenerateOptions, SharedGenerator};
use crate::constants::report::NOT_AVAILABLE;
use crate::types::Result;

#[async_trait]
pub trait SectionGenerator: Send + Sync {
    fn section(&self) -> Section;

    /// Write the section's Markdown. Must not mutate the bag.
    async fn generate(&self, bag: &RawDataBag) -> Result<String>;
}

pub type SharedSectionGenerator = Arc<dyn SectionGenerator>;

/// Single-prompt section
pub struct PromptSection {
    section: Section,
    generator: SharedGenerator,
}

impl PromptSection {
    pub fn new(section: Section, generator: SharedGenerator) -> Self {
        Self { section, generator }
    }
}

#[async_trait]
impl SectionGenerator for PromptSection {
    fn section(&self) -> Section {
        self.section
    }

    async fn generate(&self, bag: &RawDataBag) -> Result<String> {
        let prompt = prompts::section_prompt(self.section, bag);
        let options = GenerateOptions::new().system_prompt(prompts::system_prompt(self.section));
        self.generator.generate(&prompt, &options).await
    }
}

/// Market analysis: rewrite → parameter lookups → final prompt
pub struct MarketSection {
    generator: SharedGenerator,
}

impl MarketSection {
    pub fn new(generator: SharedGenerator) -> Self {
        Self { generator }
    }

    fn options() -> GenerateOptions {
        GenerateOptions::new().system_prompt(prompts::system_prompt(Section::MarketAnalysis))
    }
}

#[async_trait]
impl SectionGenerator for MarketSection {
    fn section(&self) -> Section {
        Section::MarketAnalysis
    }

    async fn generate(&self, bag: &RawDataBag) -> Result<String> {
        let raw = prompts::raw_market_description(bag);
        let raw = if raw.is_empty() || raw == NOT_AVAILABLE {
            bag.company_name().to_string()
        } else {
            raw
        };

        let rewrite = prompts::market_description_prompt(&raw);
        let market = self
            .generator
            .generate(&rewrite, &Self::options())
            .await?
            .trim()
            .to_string();
        debug!(market = %market, "Market description");

        let questions = prompts::market_questions(&market);
        let findings: Vec<(&str, String)> = join_all(questions.iter().map(|(label, question)| {
            let prompt = web_prompt(question);
            async move { (*label, lookup(&self.generator, &prompt).await.content) }
        }))
        .await;

        let prompt = prompts::market_report_prompt(bag, &market, &findings);
        self.generator.generate(&prompt, &Self::options()).await
    }
}

/// Every section, in report order
pub fn default_sections(generator: &SharedGenerator) -> Vec<SharedSectionGenerator> {
    Section::ALL
        .into_iter()
        .map(|section| -> SharedSectionGenerator {
            match section {
                Section::MarketAnalysis => Arc::new(MarketSection::new(Arc::clone(generator))),
                other => Arc::new(PromptSection::new(other, Arc::clone(generator))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::{FakeProvider, completion, fake_generator, user_prompt};
    use crate::ai::Role;
    use crate::jobs::JobInput;
    use crate::sources::{SourceData, SourceKind};
    use serde_json::json;

    fn bag() -> RawDataBag {
        RawDataBag::merge(
            &JobInput::parse("https://acme.co/").unwrap(),
            "acme",
            vec![(
                SourceKind::Website,
                Ok(SourceData::new(json!({
                    "market": {"content": "Acme sells warehouse robots to retailers", "link": "N/A"}
                }))),
            )],
        )
    }

    #[test]
    fn test_default_sections_cover_report() {
        let generator = fake_generator(Arc::new(FakeProvider::constant("x")));
        let sections: Vec<Section> = default_sections(&generator)
            .iter()
            .map(|g| g.section())
            .collect();
        assert_eq!(sections, Section::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_prompt_section_uses_system_prompt() {
        let provider = Arc::new(FakeProvider::constant("## Overview"));
        let section = PromptSection::new(
            Section::CompanyOverview,
            fake_generator(Arc::clone(&provider)),
        );

        let text = section.generate(&bag()).await.unwrap();
        assert_eq!(text, "## Overview");

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].messages[0].role, Role::System);
        assert!(calls[0].messages[0].content.contains("company overview"));
        assert!(user_prompt(&calls[0]).contains("section for acme"));
    }

    #[tokio::test]
    async fn test_market_section_fans_out_lookups() {
        let provider = Arc::new(FakeProvider::new(|request, _| {
            let prompt = user_prompt(request);
            let text = if prompt.starts_with("Given the following company description") {
                "warehouse automation".to_string()
            } else if prompt.contains("CAGR") && prompt.starts_with("Search the web") {
                r#"{"content": "14% CAGR", "link": "https://example.com/report?utm_source=x"}"#
                    .to_string()
            } else if prompt.starts_with("Search the web") {
                "no data".to_string()
            } else {
                format!("MARKET REPORT\n{prompt}")
            };
            Ok(completion(&text))
        }));
        let section = MarketSection::new(fake_generator(Arc::clone(&provider)));

        let text = section.generate(&bag()).await.unwrap();
        assert!(text.starts_with("MARKET REPORT"));
        assert!(text.contains("\"CAGR\": \"14% CAGR\""));
        assert!(text.contains("\"Market Segments\": \"N/A\""));
        assert!(text.contains("\"market_description\": \"warehouse automation\""));

        // rewrite + 4 lookups + final report
        assert_eq!(provider.call_count(), 6);
        let lookups = provider
            .calls()
            .iter()
            .filter(|r| user_prompt(r).contains("'warehouse automation'"))
            .count();
        assert_eq!(lookups, 4);
    }
}
