//! Domain vocabularies, document classification, and keyword extraction.
//!
//! The tables are immutable statics. Matching is case-insensitive and on
//! whole words: text is cut into UAX #29 words, and a multi-word term such
//! as "machine learning" matches a run of consecutive words.
//!
//! ```text
//! "Deploy the API with Kubernetes; the api gateway caches JSON."
//!  words: deploy the api with kubernetes the api gateway caches json
//!
//! api -> 2, kubernetes -> 1, json -> 1, deployment -> 0 ("deploy" != "deployment")
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::DocumentDomain;

/// Keywords kept per chunk.
pub const KEYWORD_LIMIT: usize = 5;

/// Minimum vocabulary hits before a document leaves `General`.
pub const MIN_DOMAIN_HITS: usize = 3;

/// Software, infrastructure, data, and AI/ML terms, in display form.
pub const TECHNICAL: &[&str] = &[
    // APIs and protocols
    "API", "REST", "GraphQL", "gRPC", "endpoint", "HTTP", "JSON", "webhook", "OAuth",
    "authentication", "microservice", "microservices",
    // Data
    "database", "SQL", "NoSQL", "PostgreSQL", "MySQL", "MongoDB", "Redis", "schema", "query",
    "index", "cache",
    // Frontend and backend
    "frontend", "backend", "React", "Vue", "Angular", "JavaScript", "TypeScript", "Python",
    "Rust", "Java", "Node.js", "server", "framework", "library", "compiler",
    // DevOps
    "DevOps", "Docker", "Kubernetes", "container", "deployment", "CI", "pipeline", "Terraform",
    "AWS", "Azure", "GCP", "cloud", "latency", "throughput",
    // AI and ML
    "machine learning", "deep learning", "neural network", "AI", "ML", "LLM", "model",
    "embedding", "transformer", "inference", "training", "algorithm", "vector",
];

/// Strategy, market, and finance terms.
pub const BUSINESS: &[&str] = &[
    "strategy", "stakeholder", "stakeholders", "revenue", "profit", "margin", "market",
    "customer", "customers", "sales", "ROI", "budget", "KPI", "investment", "investor",
    "growth", "quarterly", "shareholder", "shareholders", "pricing", "competitor",
    "competitive", "acquisition", "forecast", "business", "enterprise", "portfolio",
    "marketing", "brand", "EBITDA", "fiscal", "operations",
];

/// Research and scholarship terms.
pub const ACADEMIC: &[&str] = &[
    "methodology", "literature", "hypothesis", "hypotheses", "research", "study", "studies",
    "experiment", "experimental", "theory", "theoretical", "findings", "abstract", "citation",
    "peer review", "dissertation", "thesis", "empirical", "participants", "sample",
    "statistical", "significance", "correlation", "framework", "analysis", "journal",
    "doi", "et al", "conclusion", "survey",
];

/// Lowercased UAX #29 words of `text`.
fn words(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_lowercase).collect()
}

/// Count whole-word occurrences of `term` in pre-split lowercase `words`.
fn count_term(words: &[String], term: &str) -> usize {
    let parts = self::words(term);
    if parts.is_empty() || parts.len() > words.len() {
        return 0;
    }
    words
        .windows(parts.len())
        .filter(|window| window.iter().zip(&parts).all(|(w, p)| w == p))
        .count()
}

fn vocabulary_hits(words: &[String], vocabulary: &[&str]) -> usize {
    vocabulary.iter().map(|term| count_term(words, term)).sum()
}

/// Classify a document by which vocabulary it uses most.
///
/// Falls back to `General` below [`MIN_DOMAIN_HITS`]; ties go to the
/// earlier of Technical, Business, Academic.
///
/// ```rust
/// use quarry::vocabulary::classify_domain;
/// use quarry::DocumentDomain;
///
/// let text = "Our hypothesis follows the literature; the methodology uses a survey.";
/// assert_eq!(classify_domain(text), DocumentDomain::Academic);
/// assert_eq!(classify_domain("A quiet walk in the park."), DocumentDomain::General);
/// ```
#[must_use]
pub fn classify_domain(text: &str) -> DocumentDomain {
    let words = words(text);
    let scores = [
        (DocumentDomain::Technical, vocabulary_hits(&words, TECHNICAL)),
        (DocumentDomain::Business, vocabulary_hits(&words, BUSINESS)),
        (DocumentDomain::Academic, vocabulary_hits(&words, ACADEMIC)),
    ];

    let mut best = (DocumentDomain::General, 0);
    for (domain, hits) in scores {
        if hits > best.1 {
            best = (domain, hits);
        }
    }

    if best.1 >= MIN_DOMAIN_HITS {
        best.0
    } else {
        DocumentDomain::General
    }
}

/// The technical terms in `text`, most frequent first, at most `limit`.
///
/// Ties keep vocabulary order. Terms are returned in their display form
/// and deduplicated case-insensitively.
///
/// ```rust
/// use quarry::vocabulary::extract_technical_keywords;
///
/// let text = "The API talks to Redis. Every api call is cached in redis.";
/// assert_eq!(extract_technical_keywords(text, 5), vec!["API", "Redis"]);
/// ```
#[must_use]
pub fn extract_technical_keywords(text: &str, limit: usize) -> Vec<String> {
    let words = words(text);
    let mut found: Vec<(&str, usize)> = Vec::new();

    for &term in TECHNICAL {
        let count = count_term(&words, term);
        if count == 0 || found.iter().any(|(t, _)| t.eq_ignore_ascii_case(term)) {
            continue;
        }
        found.push((term, count));
    }

    found.sort_by(|a, b| b.1.cmp(&a.1));
    found
        .into_iter()
        .take(limit)
        .map(|(term, _)| term.to_string())
        .collect()
}
