//! Section prompts
//!
//! Pure functions from the raw data bag to prompt text. Each section quotes a
//! fixed set of excerpts from the source payloads; a missing excerpt is
//! quoted as "not available" so the model sees the gap instead of guessing.

use serde_json::{Value, json};

use super::bag::RawDataBag;
use super::model::Section;
use crate::constants::report::MAX_EXCERPT_CHARS;
use crate::sources::SourceKind::{self, Coresignal, Perplexity, Scraper, Serper, Tracxn, Website};

/// A labeled slice of one source payload
#[derive(Debug, Clone, Copy)]
pub struct Excerpt {
    pub label: &'static str,
    pub source: SourceKind,
    pub path: &'static [&'static str],
}

const fn excerpt(
    label: &'static str,
    source: SourceKind,
    path: &'static [&'static str],
) -> Excerpt {
    Excerpt {
        label,
        source,
        path,
    }
}

const OVERVIEW: &[Excerpt] = &[
    excerpt("Website home page", Scraper, &["home"]),
    excerpt("About page", Scraper, &["about"]),
    excerpt("Website research: business model", Website, &["business_model"]),
    excerpt("Website research: market", Website, &["market"]),
    excerpt("LinkedIn company profile", Coresignal, &["company_profile"]),
    excerpt("Search results", Serper, &["company overview"]),
];

const PRODUCT: &[Excerpt] = &[
    excerpt("Website home page", Scraper, &["home"]),
    excerpt("Products page", Scraper, &["products"]),
    excerpt("Services page", Scraper, &["services"]),
    excerpt("Solutions page", Scraper, &["solutions"]),
    excerpt("Website research: products and services", Website, &["products_services"]),
    excerpt("Website research: business model", Website, &["business_model"]),
    excerpt("LinkedIn company profile", Coresignal, &["company_profile"]),
    excerpt("Search results: business model", Serper, &["business model"]),
    excerpt("Search results: products", Serper, &["products services"]),
    excerpt("Research: business model", Perplexity, &["business_model"]),
];

const MARKET: &[Excerpt] = &[
    excerpt("Website research: market", Website, &["market"]),
    excerpt("Research: market", Perplexity, &["market_analysis"]),
    excerpt("Search results: market size", Serper, &["market size"]),
    excerpt("Funding database profile", Tracxn, &["company_details"]),
];

const COMPETITION: &[Excerpt] = &[
    excerpt("Research: competitive landscape", Perplexity, &["competitive_landscape"]),
    excerpt("Search results: competitors", Serper, &["competitors"]),
    excerpt("Funding database profile", Tracxn, &["company_details"]),
];

const FINANCIALS: &[Excerpt] = &[
    excerpt("Research: financial metrics", Perplexity, &["financial_metrics"]),
    excerpt("Search results: revenue", Serper, &["revenue financial metrics"]),
    excerpt("Funding database profile", Tracxn, &["company_details"]),
];

const FUNDRAISING: &[Excerpt] = &[
    excerpt("Funding rounds", Tracxn, &["funding_rounds"]),
    excerpt("Investors", Tracxn, &["investors"]),
    excerpt("Funding database match", Tracxn, &["company_info"]),
];

const TEAM: &[Excerpt] = &[
    excerpt("LinkedIn executives", Coresignal, &["employees"]),
    excerpt("Website research: team", Website, &["team"]),
    excerpt("Funding database profile", Tracxn, &["company_details"]),
    excerpt("Search results: team", Serper, &["team executives management"]),
    excerpt("Research: team", Perplexity, &["team"]),
];

/// Excerpts quoted in a section's prompt
pub fn excerpts(section: Section) -> &'static [Excerpt] {
    match section {
        Section::CompanyOverview => OVERVIEW,
        Section::ProductBusinessModel => PRODUCT,
        Section::MarketAnalysis => MARKET,
        Section::CompetitiveLandscape => COMPETITION,
        Section::FinancialMetrics => FINANCIALS,
        Section::FundraisingHistory => FUNDRAISING,
        Section::TeamKeyStakeholders => TEAM,
    }
}

pub fn system_prompt(section: Section) -> &'static str {
    match section {
        Section::CompanyOverview => {
            "You are a financial analyst creating a company overview section for a report. \
             Write a concise but informative overview in 4-6 lines covering the business \
             model, geography, stage and what makes the company unique. Format your response \
             in Markdown."
        }
        Section::ProductBusinessModel => {
            "You are a business analyst creating a product and business model section for a \
             company report. Describe the products, services, revenue streams and key \
             characteristics, as a table or text depending on the company type. Format your \
             response in Markdown."
        }
        Section::MarketAnalysis => "You are a market analyst creating a market report for a company.",
        Section::CompetitiveLandscape => {
            "You are a strategy analyst creating a competitive landscape section for a company \
             report. Name the main competitors, how they differ and where the company is \
             positioned. Format your response in Markdown."
        }
        Section::FinancialMetrics => {
            "You are a financial analyst creating a financial metrics section for a company \
             report. Report revenue, growth, margins and other key metrics where the data has \
             them, and say plainly when it does not. Format your response in Markdown."
        }
        Section::FundraisingHistory => {
            "You are a venture analyst creating a fundraising history section for a company \
             report. List each funding round with date, amount, stage and lead investors, then \
             summarise total funding. Format your response in Markdown."
        }
        Section::TeamKeyStakeholders => {
            "You are an analyst creating a team and key stakeholders section for a company \
             report. Introduce the founders and executives with their roles and relevant \
             background, and note key investors or board members. Format your response in \
             Markdown."
        }
    }
}

/// Render one excerpt as pretty JSON, clipped to a fixed size
fn render_excerpt(bag: &RawDataBag, excerpt: &Excerpt) -> String {
    match bag.lookup(excerpt.source, excerpt.path) {
        Some(value) if !is_blank(value) => {
            let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            clip(&text, MAX_EXCERPT_CHARS)
        }
        _ => "not available".to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn clip(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// User prompt for a section written straight from the data bag
pub fn section_prompt(section: Section, bag: &RawDataBag) -> String {
    let mut prompt = format!(
        "Based on the following data, create a {} section for {}.\n\nCompany URL: {}\n",
        section.title().to_lowercase(),
        bag.company_name(),
        bag.url()
    );
    for excerpt in excerpts(section) {
        prompt.push_str(&format!(
            "\n{}: {}\n",
            excerpt.label,
            render_excerpt(bag, excerpt)
        ));
    }
    prompt.push_str("\nDo not invent information; base all content only on the provided data.\n");
    prompt
}

// =============================================================================
// Market analysis
// =============================================================================

/// The company's market description as the website research gave it
pub fn raw_market_description(bag: &RawDataBag) -> String {
    bag.lookup(Website, &["market", "content"])
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Ask the model to restate the company's market as a short generic query
pub fn market_description_prompt(raw_description: &str) -> String {
    format!(
        "Given the following company description, rewrite it as a generic market description \
         suitable for market research queries.\n\
         Focus on the type of market and the main activities, not the company name.\n\
         The resulting description must be short, one sentence long, 6 - 15 words.\n\
         Company market description:\n---\n{raw_description}\n---\n\
         Market description for search queries:"
    )
}

/// One web question per market parameter
pub fn market_questions(market: &str) -> [(&'static str, String); 4] {
    [
        (
            "Total Addressable Market (TAM)",
            format!(
                "What is the total addressable market (TAM) for '{market}'? Provide recent figures or best estimates."
            ),
        ),
        (
            "Market Segments",
            format!("What are the main market segments for '{market}'? List and briefly describe them."),
        ),
        (
            "CAGR",
            format!(
                "What is the Compound Annual Growth Rate (CAGR) for '{market}'? Provide recent figures or best estimates."
            ),
        ),
        (
            "Geographic Expansion",
            format!(
                "What are the main geographic regions for '{market}'? Are there notable trends in geographic expansion?"
            ),
        ),
    ]
}

/// Final market prompt from the looked-up parameters plus the bag excerpts
pub fn market_report_prompt(
    bag: &RawDataBag,
    market_description: &str,
    findings: &[(&str, String)],
) -> String {
    let parameters: serde_json::Map<String, Value> = findings
        .iter()
        .map(|(label, content)| (label.to_string(), Value::String(content.clone())))
        .collect();
    let supporting: serde_json::Map<String, Value> = MARKET
        .iter()
        .map(|e| (e.label.to_string(), Value::String(render_excerpt(bag, e))))
        .collect();

    let data = json!({
        "company_name": bag.company_name(),
        "market_description": market_description,
        "parameters": parameters,
        "supporting_data": supporting,
    });
    let data = serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string());

    format!(
        "You are an expert market analyst. Given the following structured market information:\n\
         ---\n{data}\n---\n\
         Write a concise market overview report in Markdown, using bullet points if appropriate.\n\
         If the data contains numbers, use them.\n\
         DO NOT invent information; base all content only on the provided data.\n\
         DO NOT mention source links."
    )
}
