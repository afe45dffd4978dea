//! Report Orchestrator
//!
//! Drives one job through `Pending → Processing → {Completed, Failed}`:
//!
//! 1. mark the job `Processing`
//! 2. derive a company name from the URL
//! 3. fan out over the data sources, merge into a [`RawDataBag`]
//! 4. fan out over the section generators
//! 5. attach the report (or the failure cause) to the job
//!
//! Stage 4 starts only after stage 3's merge. A failing source or section
//! becomes an unavailable marker in the report; only failures in the glue
//! itself (name derivation, deadline, a panic outside the fan-outs) fail the
//! job, and a failed job never carries a partial report.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::bag::RawDataBag;
use super::model::{Report, unavailable_marker};
use super::naming::derive_company_name;
use super::sections::{SectionGenerator, SharedSectionGenerator, default_sections};
use crate::ai::{SharedGenerator, TextGenerator, create_provider, with_optional_timeout};
use crate::config::Config;
use crate::fanout::{FanOut, isolate};
use crate::jobs::{JobId, JobInput, JobStatus, SharedJobStore};
use crate::sources::{SharedSource, build_sources};
use crate::types::Result;

pub struct ReportOrchestrator {
    store: SharedJobStore,
    sources: Vec<SharedSource>,
    sections: Vec<SharedSectionGenerator>,
    generator: SharedGenerator,
    fanout: FanOut,
    deadline: Option<Duration>,
}

impl ReportOrchestrator {
    /// Orchestrator with every report section, unbounded fan-out and no deadline
    pub fn new(
        store: SharedJobStore,
        sources: Vec<SharedSource>,
        generator: SharedGenerator,
    ) -> Self {
        let sections = default_sections(&generator);
        Self {
            store,
            sources,
            sections,
            generator,
            fanout: FanOut::unbounded(),
            deadline: None,
        }
    }

    /// Wire the LLM backend, text generator and data sources from config.
    ///
    /// Fails with `ScreenerError::Config` when a required credential is missing.
    pub fn from_config(config: &Config, store: SharedJobStore) -> Result<Self> {
        let provider = create_provider(&config.llm)?;
        let generator: SharedGenerator = Arc::new(TextGenerator::new(provider, &config.llm));
        let sources = build_sources(&config.sources, Arc::clone(&generator))?;

        info!(
            provider = generator.provider_name(),
            model = generator.model(),
            sources = sources.len(),
            "Report orchestrator configured"
        );

        Ok(Self::new(store, sources, generator)
            .with_fanout(FanOut::bounded(config.report.max_concurrency))
            .with_deadline(config.report.deadline_secs.map(Duration::from_secs)))
    }

    pub fn with_sections(mut self, sections: Vec<SharedSectionGenerator>) -> Self {
        self.sections = sections;
        self
    }

    pub fn with_fanout(mut self, fanout: FanOut) -> Self {
        self.fanout = fanout;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn store(&self) -> &SharedJobStore {
        &self.store
    }

    pub fn generator(&self) -> &SharedGenerator {
        &self.generator
    }

    /// Run the job to a terminal state and return that state.
    ///
    /// Errors only when the job cannot be started or written back (unknown
    /// id, job not `Pending`); pipeline failures land in the job instead.
    #[instrument(skip_all, fields(job_id = %job_id))]
    pub async fn run(&self, job_id: &JobId) -> Result<JobStatus> {
        let job = self.store.update(job_id, &mut |job| job.begin_processing())?;
        let input = job.input().clone();
        info!(url = %input.url, "Report generation started");

        let pipeline = with_optional_timeout(
            self.deadline,
            self.build_report(&input),
            "report generation",
        );

        let status = match isolate(pipeline).await {
            Ok(report) => {
                let unavailable = report.unavailable_sections().len();
                self.store
                    .update(job_id, &mut |job| job.complete(report.clone()))?;
                info!(unavailable_sections = unavailable, "Report generation completed");
                JobStatus::Completed
            }
            Err(e) => {
                error!(error = %e, "Report generation failed");
                let cause = e.to_string();
                self.store.update(job_id, &mut |job| job.fail(cause.clone()))?;
                JobStatus::Failed
            }
        };

        let usage = self.generator.usage();
        info!(
            calls = usage.calls,
            retries = usage.retries,
            total_tokens = usage.total_tokens(),
            cost = %usage.total_cost,
            "LLM usage so far"
        );
        Ok(status)
    }

    /// Both fan-out stages for one input
    async fn build_report(&self, input: &JobInput) -> Result<Report> {
        let heuristic = derive_company_name(&input.url)?;
        debug!(company = %heuristic, "Derived company name from URL");

        let fetched = self
            .fanout
            .collect_labeled(
                self.sources
                    .iter()
                    .map(|source| (source.kind(), source.fetch(&heuristic, &input.url))),
            )
            .await;

        for (kind, outcome) in &fetched {
            if let Err(e) = outcome {
                warn!(source = %kind, error = %e, "Data source unavailable");
            }
        }

        let bag = RawDataBag::merge(input, &heuristic, fetched);
        if bag.company_name() != heuristic {
            info!(from = %heuristic, to = %bag.company_name(), "Company name resolved by source");
        }
        info!(
            available = bag.available_count(),
            total = bag.len(),
            "Source data collected"
        );

        let written = self
            .fanout
            .collect_labeled(
                self.sections
                    .iter()
                    .map(|generator| (generator.section(), self.write_section(generator.as_ref(), &bag))),
            )
            .await;

        let mut report = Report::default();
        for (section, outcome) in written {
            let text = outcome.unwrap_or_else(|e| {
                warn!(section = %section, error = %e, "Section generation failed");
                unavailable_marker(&e.to_string())
            });
            report.set(section, text);
        }
        Ok(report)
    }

    async fn write_section(
        &self,
        generator: &dyn SectionGenerator,
        bag: &RawDataBag,
    ) -> Result<String> {
        let section = generator.section();
        let dependencies = section.dependencies();
        if !bag.any_available(dependencies) {
            debug!(section = %section, "No source data, marking unavailable");
            return Ok(unavailable_marker(&bag.unavailable_reasons(dependencies)));
        }
        generator.generate(bag).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::{FakeProvider, completion, fake_generator, user_prompt};
    use crate::jobs::{InMemoryJobStore, JobStore};
    use crate::report::model::{Section, is_unavailable};
    use crate::report::sections::PromptSection;
    use crate::sources::{DataSource, SourceData, SourceKind};
    use crate::types::ScreenerError;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use tokio::time::Instant;

    type Respond = Box<dyn Fn() -> Result<SourceData> + Send + Sync>;

    struct StubSource {
        kind: SourceKind,
        delay: Duration,
        respond: Respond,
    }

    impl StubSource {
        fn shared(kind: SourceKind, respond: Respond) -> SharedSource {
            Arc::new(Self {
                kind,
                delay: Duration::ZERO,
                respond,
            })
        }

        fn ok(kind: SourceKind, payload: Value) -> SharedSource {
            Self::shared(kind, Box::new(move || -> Result<SourceData> { Ok(SourceData::new(payload.clone())) }))
        }

        fn failing(kind: SourceKind) -> SharedSource {
            Self::shared(
                kind,
                Box::new(move || -> Result<SourceData> {
                    Err(ScreenerError::provider(
                        kind.as_str(),
                        Some(503),
                        "Service Unavailable",
                    ))
                }),
            )
        }

        fn slow(kind: SourceKind, delay: Duration) -> SharedSource {
            Arc::new(Self {
                kind,
                delay,
                respond: Box::new(|| -> Result<SourceData> { Ok(SourceData::new(json!({"slow": true}))) }),
            })
        }
    }

    #[async_trait]
    impl DataSource for StubSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        async fn fetch(&self, _company_name: &str, _url: &str) -> Result<SourceData> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            (self.respond)()
        }
    }

    /// Answers with the most specific company name it finds in the prompt
    fn echo_provider() -> Arc<FakeProvider> {
        Arc::new(FakeProvider::new(|request, _| {
            let prompt = user_prompt(request);
            let subject = if prompt.contains("Acme Robotics") {
                "Acme Robotics"
            } else if prompt.contains("acme") {
                "acme"
            } else {
                "the market"
            };
            Ok(completion(&format!("Section about {subject}")))
        }))
    }

    fn website(name: Option<&'static str>) -> SharedSource {
        StubSource::shared(
            SourceKind::Website,
            Box::new(move || -> Result<SourceData> {
                let data = SourceData::new(json!({
                    "market": {"content": "Warehouse robots for retailers", "link": "N/A"}
                }));
                Ok(match name {
                    Some(name) => data.with_company_name(name),
                    None => data,
                })
            }),
        )
    }

    /// Four healthy sources and a failing funding database
    fn acme_sources(name: Option<&'static str>) -> Vec<SharedSource> {
        vec![
            website(name),
            StubSource::ok(SourceKind::Serper, json!({"company overview": {"organic": []}})),
            StubSource::ok(SourceKind::Perplexity, json!({"team": {"answer": "Two founders"}})),
            StubSource::ok(
                SourceKind::Coresignal,
                json!({"company_profile": {"employees_count": 40}, "employees": []}),
            ),
            StubSource::failing(SourceKind::Tracxn),
        ]
    }

    fn setup(
        url: &str,
        sources: Vec<SharedSource>,
        provider: Arc<FakeProvider>,
    ) -> (ReportOrchestrator, SharedJobStore, JobId) {
        let store = InMemoryJobStore::shared();
        let id = store.create(JobInput::parse(url).unwrap());
        let orchestrator = ReportOrchestrator::new(Arc::clone(&store), sources, fake_generator(provider));
        (orchestrator, store, id)
    }

    #[tokio::test]
    async fn test_failed_source_marks_only_its_section() {
        let (orchestrator, store, id) =
            setup("https://acme.co/", acme_sources(Some("Acme Robotics")), echo_provider());

        let status = orchestrator.run(&id).await.unwrap();
        assert_eq!(status, JobStatus::Completed);

        let job = store.get(&id).unwrap();
        assert_eq!(job.status(), JobStatus::Completed);
        assert!(job.error().is_none());

        let report = job.report().unwrap();
        for section in Section::ALL {
            let text = report.get(section).unwrap();
            if section == Section::FundraisingHistory {
                assert!(is_unavailable(text), "{text}");
                assert!(text.contains("tracxn"));
            } else {
                assert_eq!(text, "Section about Acme Robotics", "{section}");
            }
        }
    }

    #[tokio::test]
    async fn test_heuristic_name_used_without_resolution() {
        let (orchestrator, store, id) =
            setup("https://acme.co/about", acme_sources(None), echo_provider());

        orchestrator.run(&id).await.unwrap();

        let job = store.get(&id).unwrap();
        let report = job.report().unwrap();
        assert_eq!(
            report.get(Section::CompanyOverview),
            Some("Section about acme")
        );
        assert_eq!(report.get(Section::MarketAnalysis), Some("Section about acme"));
    }

    #[tokio::test]
    async fn test_short_resolved_name_is_ignored() {
        let (orchestrator, store, id) =
            setup("https://acme.co/", acme_sources(Some("Acm")), echo_provider());

        orchestrator.run(&id).await.unwrap();

        let report = store.get(&id).unwrap().report().cloned().unwrap();
        assert_eq!(
            report.get(Section::TeamKeyStakeholders),
            Some("Section about acme")
        );
    }

    #[tokio::test]
    async fn test_processing_before_any_fetch() {
        let store = InMemoryJobStore::shared();
        let id = store.create(JobInput::parse("https://acme.co/").unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let status_recorder = {
            let store = Arc::clone(&store);
            let id = id.clone();
            let seen = Arc::clone(&seen);
            StubSource::shared(
                SourceKind::Serper,
                Box::new(move || -> Result<SourceData> {
                    seen.lock().unwrap().push(store.get(&id).unwrap().status());
                    Ok(SourceData::new(json!({})))
                }),
            )
        };

        let orchestrator = ReportOrchestrator::new(
            Arc::clone(&store),
            vec![status_recorder],
            fake_generator(echo_provider()),
        );
        orchestrator.run(&id).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![JobStatus::Processing]);
        assert_eq!(store.get(&id).unwrap().status(), JobStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sections_start_after_all_sources() {
        let provider = echo_provider();
        let mut sources = acme_sources(Some("Acme Robotics"));
        sources.push(StubSource::slow(SourceKind::Scraper, Duration::from_secs(30)));
        let (orchestrator, _store, id) = setup("https://acme.co/", sources, Arc::clone(&provider));

        let started = Instant::now();
        orchestrator.run(&id).await.unwrap();

        let times = provider.call_times();
        assert!(!times.is_empty());
        assert!(
            times
                .iter()
                .all(|t| t.duration_since(started) >= Duration::from_secs(30))
        );
    }

    #[tokio::test]
    async fn test_ip_url_fails_job() {
        let (orchestrator, store, id) =
            setup("http://127.0.0.1/", acme_sources(None), echo_provider());

        let status = orchestrator.run(&id).await.unwrap();
        assert_eq!(status, JobStatus::Failed);

        let job = store.get(&id).unwrap();
        assert!(job.report().is_none());
        assert!(job.error().unwrap().contains("IP address"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fails_job() {
        let (orchestrator, store, id) = setup(
            "https://acme.co/",
            vec![StubSource::slow(SourceKind::Serper, Duration::from_secs(3600))],
            echo_provider(),
        );
        let orchestrator = orchestrator.with_deadline(Some(Duration::from_secs(60)));

        let status = orchestrator.run(&id).await.unwrap();
        assert_eq!(status, JobStatus::Failed);

        let job = store.get(&id).unwrap();
        assert!(job.error().unwrap().contains("report generation"));
        assert!(job.report().is_none());
    }

    struct FailingSection;

    #[async_trait]
    impl SectionGenerator for FailingSection {
        fn section(&self) -> Section {
            Section::CompetitiveLandscape
        }

        async fn generate(&self, _bag: &RawDataBag) -> Result<String> {
            Err(ScreenerError::RateLimited {
                attempts: 5,
                message: "429".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_failed_section_becomes_marker() {
        let provider = echo_provider();
        let (orchestrator, store, id) =
            setup("https://acme.co/", acme_sources(None), Arc::clone(&provider));
        let generator = Arc::clone(orchestrator.generator());
        let orchestrator = orchestrator.with_sections(vec![
            Arc::new(FailingSection),
            Arc::new(PromptSection::new(Section::CompanyOverview, generator)),
        ]);

        assert_eq!(orchestrator.run(&id).await.unwrap(), JobStatus::Completed);

        let report = store.get(&id).unwrap().report().cloned().unwrap();
        let competition = report.get(Section::CompetitiveLandscape).unwrap();
        assert!(is_unavailable(competition));
        assert!(competition.contains("Rate limited after 5 attempts"));
        assert_eq!(report.get(Section::CompanyOverview), Some("Section about acme"));
        assert!(report.get(Section::MarketAnalysis).is_none());
    }

    #[tokio::test]
    async fn test_panicking_source_is_isolated() {
        let mut sources = acme_sources(Some("Acme Robotics"));
        sources.push(StubSource::shared(
            SourceKind::Scraper,
            Box::new(|| -> Result<SourceData> { panic!("scraper exploded") }),
        ));
        let (orchestrator, store, id) = setup("https://acme.co/", sources, echo_provider());

        assert_eq!(orchestrator.run(&id).await.unwrap(), JobStatus::Completed);
        let report = store.get(&id).unwrap().report().cloned().unwrap();
        assert_eq!(
            report.get(Section::CompanyOverview),
            Some("Section about Acme Robotics")
        );
    }

    #[tokio::test]
    async fn test_all_sources_down_marks_every_section() {
        let sources = SourceKind::ALL.into_iter().map(StubSource::failing).collect();
        let provider = echo_provider();
        let (orchestrator, store, id) = setup("https://acme.co/", sources, Arc::clone(&provider));

        assert_eq!(orchestrator.run(&id).await.unwrap(), JobStatus::Completed);
        let report = store.get(&id).unwrap().report().cloned().unwrap();
        assert_eq!(report.unavailable_sections(), Section::ALL.to_vec());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_terminal_job_is_not_rerun() {
        let (orchestrator, store, id) =
            setup("https://acme.co/", acme_sources(None), echo_provider());
        orchestrator.run(&id).await.unwrap();
        let first = store.get(&id).unwrap();

        let err = orchestrator.run(&id).await.unwrap_err();
        assert!(matches!(err, ScreenerError::InvalidTransition { .. }));

        let second = store.get(&id).unwrap();
        assert_eq!(second.status(), JobStatus::Completed);
        assert_eq!(first.report(), second.report());
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let (orchestrator, _store, _id) =
            setup("https://acme.co/", Vec::new(), echo_provider());
        let err = orchestrator.run(&JobId::from("missing")).await.unwrap_err();
        assert!(matches!(err, ScreenerError::JobNotFound(_)));
    }
}
