//! Report assembly
//!
//! - `model`: the finished report and its sections
//! - `bag`: merged source outcomes for one run
//! - `naming`: company name heuristic and override
//! - `prompts`: pure prompt builders
//! - `sections`: one generator per section
//! - `orchestrator`: the job state machine and both fan-out stages

pub mod bag;
pub mod model;
pub mod naming;
pub mod orchestrator;
pub mod prompts;
pub mod sections;

pub use bag::{RawDataBag, SourceOutcome};
pub use model::{Report, Section, is_unavailable, unavailable_marker};
pub use naming::{derive_company_name, resolve_company_name};
pub use orchestrator::ReportOrchestrator;
pub use sections::{
    MarketSection, PromptSection, SectionGenerator, SharedSectionGenerator, default_sections,
};
