//! Report document and its sections

use serde::{Deserialize, Serialize};

use crate::constants::report::UNAVAILABLE_MARKER;
use crate::sources::SourceKind;

// =============================================================================
// Section
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    CompanyOverview,
    ProductBusinessModel,
    MarketAnalysis,
    CompetitiveLandscape,
    FinancialMetrics,
    FundraisingHistory,
    TeamKeyStakeholders,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Self::CompanyOverview,
        Self::ProductBusinessModel,
        Self::MarketAnalysis,
        Self::CompetitiveLandscape,
        Self::FinancialMetrics,
        Self::FundraisingHistory,
        Self::TeamKeyStakeholders,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::CompanyOverview => "Company Overview",
            Self::ProductBusinessModel => "Product & Business Model",
            Self::MarketAnalysis => "Market Analysis",
            Self::CompetitiveLandscape => "Competitive Landscape",
            Self::FinancialMetrics => "Financial Metrics",
            Self::FundraisingHistory => "Fundraising History",
            Self::TeamKeyStakeholders => "Team & Key Stakeholders",
        }
    }

    /// Sources the section is written from. When none of them produced data
    /// the section is marked unavailable without calling the model.
    pub fn dependencies(&self) -> &'static [SourceKind] {
        use SourceKind::*;
        match self {
            Self::CompanyOverview => &[Website, Scraper, Coresignal, Serper],
            Self::ProductBusinessModel => &[Website, Scraper, Coresignal, Serper, Perplexity],
            Self::MarketAnalysis => &[Website, Perplexity, Serper, Tracxn],
            Self::CompetitiveLandscape => &[Perplexity, Serper, Tracxn],
            Self::FinancialMetrics => &[Perplexity, Serper, Tracxn],
            Self::FundraisingHistory => &[Tracxn],
            Self::TeamKeyStakeholders => &[Coresignal, Website, Tracxn, Serper, Perplexity],
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Text written into a section that could not be produced
pub fn unavailable_marker(reason: &str) -> String {
    format!("{UNAVAILABLE_MARKER}: {reason}_")
}

pub fn is_unavailable(text: &str) -> bool {
    text.starts_with(UNAVAILABLE_MARKER)
}

// =============================================================================
// Report
// =============================================================================

/// Finished report: one optional Markdown body per section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub company_overview: Option<String>,
    pub product_business_model: Option<String>,
    pub market_analysis: Option<String>,
    pub competitive_landscape: Option<String>,
    pub financial_metrics: Option<String>,
    pub fundraising_history: Option<String>,
    pub team_key_stakeholders: Option<String>,
}

impl Report {
    fn slot(&mut self, section: Section) -> &mut Option<String> {
        match section {
            Section::CompanyOverview => &mut self.company_overview,
            Section::ProductBusinessModel => &mut self.product_business_model,
            Section::MarketAnalysis => &mut self.market_analysis,
            Section::CompetitiveLandscape => &mut self.competitive_landscape,
            Section::FinancialMetrics => &mut self.financial_metrics,
            Section::FundraisingHistory => &mut self.fundraising_history,
            Section::TeamKeyStakeholders => &mut self.team_key_stakeholders,
        }
    }

    pub fn get(&self, section: Section) -> Option<&str> {
        let field = match section {
            Section::CompanyOverview => &self.company_overview,
            Section::ProductBusinessModel => &self.product_business_model,
            Section::MarketAnalysis => &self.market_analysis,
            Section::CompetitiveLandscape => &self.competitive_landscape,
            Section::FinancialMetrics => &self.financial_metrics,
            Section::FundraisingHistory => &self.fundraising_history,
            Section::TeamKeyStakeholders => &self.team_key_stakeholders,
        };
        field.as_deref()
    }

    pub fn set(&mut self, section: Section, text: impl Into<String>) {
        *self.slot(section) = Some(text.into());
    }

    /// Sections that hold text, in report order
    pub fn sections(&self) -> impl Iterator<Item = (Section, &str)> {
        Section::ALL
            .into_iter()
            .filter_map(|section| self.get(section).map(|text| (section, text)))
    }

    /// Sections marked unavailable
    pub fn unavailable_sections(&self) -> Vec<Section> {
        self.sections()
            .filter(|(_, text)| is_unavailable(text))
            .map(|(section, _)| section)
            .collect()
    }

    /// Render as one Markdown document under the given heading
    pub fn to_markdown(&self, heading: &str) -> String {
        let mut out = format!("# {heading}\n");
        for (section, text) in self.sections() {
            out.push_str(&format!("\n## {}\n\n{}\n", section.title(), text.trim()));
        }
        out
    }
}
