//! Global Constants
//!
//! Centralized constants for configuration and tuning.

/// Text generation constants
pub mod llm {
    /// Default chat model for section writing
    pub const DEFAULT_MODEL: &str = "gpt-4.1-2025-04-14";

    /// Model used for web-answer lookups
    pub const DEFAULT_SEARCH_MODEL: &str = "gpt-4o-search-preview";

    /// Default OpenAI-compatible API base
    pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

    /// System prompt used when a caller supplies none
    pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI publishing assistant";

    /// Sampling temperature for the system-role convention
    pub const DEFAULT_TEMPERATURE: f32 = 0.5;

    /// Fixed seed for reproducible sampling
    pub const DEFAULT_SEED: i64 = 666;

    /// Completion token limit
    pub const DEFAULT_MAX_TOKENS: u32 = 4096;

    /// Model id prefixes that use the user-only calling convention
    pub const USER_ONLY_MODEL_PREFIXES: [&str; 2] = ["o1-", "gpt-4o-search"];
}

/// Rate-limit retry constants
pub mod retry {
    /// Maximum attempts per generation call (first try included)
    pub const MAX_ATTEMPTS: u32 = 5;

    /// First backoff interval (milliseconds); doubles on each retry
    pub const BASE_DELAY_MS: u64 = 1_000;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;

    /// Largest accepted `max_attempts`
    pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

    /// Largest accepted first backoff interval (milliseconds)
    pub const MAX_BASE_DELAY_MS: u64 = 60_000;

    /// Ceiling for any single backoff sleep (seconds)
    pub const MAX_DELAY_SECS: u64 = 300;
}

/// Report assembly constants
pub mod report {
    /// Resolved company names must be longer than this to replace the URL heuristic
    pub const MIN_RESOLVED_NAME_LEN: usize = 3;

    /// Placeholder a web lookup returns when it finds nothing
    pub const NOT_AVAILABLE: &str = "N/A";

    /// Prefix of the marker written into a section that could not be produced
    pub const UNAVAILABLE_MARKER: &str = "_Data unavailable";

    /// Longest excerpt of one source payload quoted in a section prompt (chars)
    pub const MAX_EXCERPT_CHARS: usize = 8_000;
}

/// HTTP/Network constants
pub mod network {
    /// Default LLM request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Default data provider request timeout (seconds)
    pub const SOURCE_TIMEOUT_SECS: u64 = 60;

    /// Default bind address for the HTTP server
    pub const DEFAULT_HOST: &str = "0.0.0.0";

    /// Default port for the HTTP server
    pub const DEFAULT_PORT: u16 = 8000;
}

/// Data provider constants
pub mod sources {
    pub const SERPER_URL: &str = "https://google.serper.dev/search";
    pub const SERPER_RESULTS_PER_QUERY: u32 = 10;

    pub const PERPLEXITY_URL: &str = "https://api.perplexity.ai/search";

    pub const SCRAPER_URL: &str = "http://api.scraperapi.com";

    pub const CORESIGNAL_URL: &str = "https://api.coresignal.com/v1";
    /// Executives requested from the employee listing
    pub const CORESIGNAL_EMPLOYEE_LIMIT: u32 = 20;
    /// Executives whose full profile is fetched
    pub const CORESIGNAL_PROFILE_LIMIT: usize = 10;

    pub const TRACXN_URL: &str = "https://platform.tracxn.com/api/2.0";
    /// Candidate companies considered when matching by domain
    pub const TRACXN_SEARCH_LIMIT: u32 = 5;
}
