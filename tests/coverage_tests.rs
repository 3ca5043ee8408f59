#![allow(clippy::manual_assert)]
//! Scenario tests for the chunking pipeline.
//!
//! Each test pins down one concrete document and the exact behaviour
//! expected from it: paragraph packing, header removal, degenerate input,
//! strategy parsing, cancellation, pages, and structure.

use quarry::{
    CancelFlag, ChunkingOptions, Document, DocumentChunker, DocumentDomain, Error, NoiseFilter,
    NoiseFilterConfig, Strategy, StructuralRole,
};

fn chunker(strategy: Strategy, max: usize, overlap: usize) -> DocumentChunker {
    let options = ChunkingOptions::new(max, overlap)
        .unwrap()
        .with_strategy(strategy);
    DocumentChunker::new(options).unwrap()
}

/// Four sentences of 77 chars each, about 311 chars in total.
fn paragraph(p: usize) -> String {
    (1..=4)
        .map(|s| {
            format!("Paragraph {p} sentence {s} talks about retrieval pipelines and chunk boundaries.")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Paragraph strategy: 3 x ~300 chars, max 256, overlap 32
// =============================================================================

#[test]
fn paragraph_scenario_splits_at_sentences() {
    let text = (1..=3).map(paragraph).collect::<Vec<_>>().join("\n\n");
    let chunked = chunker(Strategy::Paragraph, 256, 32)
        .chunk_text(&text)
        .unwrap();

    // Every paragraph is over the bound, so each yields at least two chunks
    assert!(chunked.len() >= 6, "got {} chunks", chunked.len());

    for chunk in &chunked {
        let core = chunk.core_content();
        assert!(core.chars().count() <= 256);
        assert!(core.starts_with("Paragraph "), "core starts mid-sentence: {core:?}");
        assert!(core.ends_with("boundaries."), "core ends mid-sentence: {core:?}");
        assert!((chunk.completeness_score - 1.0).abs() < 1e-9);
    }
}

#[test]
fn paragraph_scenario_overlap_snaps_to_words() {
    let text = (1..=3).map(paragraph).collect::<Vec<_>>().join("\n\n");
    let chunked = chunker(Strategy::Paragraph, 256, 32)
        .chunk_text(&text)
        .unwrap();

    for chunk in chunked.iter().skip(1) {
        assert!(chunk.has_overlap_with_previous);
        let overlap = chunk.overlap_content();
        assert!(overlap.chars().count() <= 32);
        // Never starts mid-word
        assert!(text[..chunk.start].ends_with(char::is_whitespace));
        assert!(!overlap.starts_with(char::is_whitespace));
    }
}

#[test]
fn paragraph_scenario_prefers_whole_sentences_when_they_fit() {
    let text = "Short one. Tiny two.\n\nA third line is here.";
    let chunked = chunker(Strategy::Paragraph, 24, 12)
        .chunk_text(text)
        .unwrap();

    assert_eq!(chunked.len(), 2);
    assert_eq!(chunked.chunks()[1].overlap_content(), "Tiny two.\n\n");
}

// =============================================================================
// Noise filter: "CONFIDENTIAL" on 5 of 5 pages
// =============================================================================

const BODIES: [&str; 5] = [
    "Quarterly planning starts in March.",
    "Hiring targets were met in every region.",
    "The new office opens after the summer.",
    "Supplier contracts are up for renewal.",
    "Next review is scheduled for December.",
];

fn confidential_pages() -> String {
    BODIES
        .iter()
        .map(|body| format!("CONFIDENTIAL\n{body}\n\x0c"))
        .collect()
}

#[test]
fn confidential_header_removed_body_verbatim() {
    let text = confidential_pages();
    let filtered = NoiseFilter::default().filter(&text, 5);

    assert!(!filtered.contains("CONFIDENTIAL"));
    for body in BODIES {
        assert!(filtered.contains(&format!("{body}\n")), "body lost: {body}");
    }
}

#[test]
fn confidential_header_reported_by_analyze() {
    let text = confidential_pages();
    let report = NoiseFilter::default().analyze(&text, 5);

    let header = report
        .iter()
        .find(|line| line.sample == "CONFIDENTIAL")
        .expect("header is reported");
    assert_eq!(header.occurrences, 5);
    assert!((header.ratio - 1.0).abs() < 1e-9);
    assert!(header.would_be_filtered);
    assert!(report.iter().all(|line| line.sample != BODIES[0]));
}

#[test]
fn confidential_header_never_reaches_chunks() {
    let text = confidential_pages();
    let document = Document::from_form_feeds(&text);
    let chunked = chunker(Strategy::Semantic, 60, 0).chunk(&document).unwrap();

    assert_eq!(chunked.len(), BODIES.len());
    for (chunk, body) in chunked.iter().zip(BODIES) {
        assert_eq!(chunk.core_content(), body);
        assert!(!chunk.content.contains("CONFIDENTIAL"));
    }
    let pages: Vec<Option<usize>> = chunked.iter().map(|c| c.page).collect();
    assert_eq!(pages, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);
}

#[test]
fn preserve_and_remove_patterns() {
    let text = confidential_pages();
    let config = NoiseFilterConfig {
        preserve_patterns: vec!["^CONFIDENTIAL$".to_string()],
        remove_patterns: vec!["renewal".to_string(), "(unclosed".to_string()],
        ..NoiseFilterConfig::default()
    };
    let filter = NoiseFilter::new(config).unwrap();
    let filtered = filter.filter(&text, 5);

    assert_eq!(filtered.matches("CONFIDENTIAL").count(), 5);
    assert!(!filtered.contains("renewal"));
    assert!(filtered.contains(BODIES[0]));
}

#[test]
fn too_few_pages_is_a_no_op() {
    let text = "HEADER\nOne.\nHEADER\nTwo.\n";
    assert_eq!(NoiseFilter::default().filter(text, 2), text);
}

// =============================================================================
// Degenerate input
// =============================================================================

#[test]
fn no_terminators_yields_one_chunk() {
    let text = "a running list of items without any punctuation at all";

    for strategy in [
        Strategy::Auto,
        Strategy::Paragraph,
        Strategy::Semantic,
        Strategy::Intelligent,
    ] {
        let chunked = chunker(strategy, 2048, 200).chunk_text(text).unwrap();
        assert_eq!(chunked.len(), 1, "{strategy}");

        let chunk = &chunked.chunks()[0];
        assert_eq!(chunk.content, text);
        assert!(chunk.completeness_score < 1.0);
    }
}

#[test]
fn giant_paragraph_is_bounded() {
    let text = "word ".repeat(2_000);
    for strategy in Strategy::ALL {
        let chunked = chunker(strategy, 256, 32).chunk_text(&text).unwrap();
        assert!(chunked.len() > 1);
        assert!(chunked
            .iter()
            .all(|c| c.core_content().chars().count() <= 256));
    }
}

#[test]
fn semantic_does_not_collapse() {
    let text = "Chunking matters. Retrieval needs context.\n\n\
                Models have limits. Documents are long. Splitting is hard.";
    let chunked = chunker(Strategy::Semantic, 2048, 200).chunk_text(text).unwrap();
    assert!(chunked.len() > 1);
}

// =============================================================================
// Options and errors
// =============================================================================

#[test]
fn unsupported_strategy_is_rejected() {
    assert_eq!(
        "recursive".parse::<Strategy>(),
        Err(Error::UnsupportedStrategy("recursive".to_string()))
    );

    let json = r#"{"strategy": "late_chunking"}"#;
    assert!(serde_json::from_str::<ChunkingOptions>(json).is_err());
}

#[test]
fn invalid_options_are_rejected_before_processing() {
    assert_eq!(
        ChunkingOptions::new(0, 0).unwrap_err(),
        Error::InvalidChunkSize(0)
    );

    let options: ChunkingOptions =
        serde_json::from_str(r#"{"max_chunk_size": 100, "overlap_size": 150}"#).unwrap();
    assert_eq!(
        DocumentChunker::new(options).unwrap_err(),
        Error::OverlapExceedsSize {
            size: 100,
            overlap: 150
        }
    );
}

#[test]
fn cancellation_returns_no_partial_result() {
    let cancel = CancelFlag::new();
    let handle = cancel.clone();
    handle.cancel();

    let text = "Some sentence. ".repeat(100);
    let result = chunker(Strategy::Semantic, 40, 0).chunk_with_cancel(&Document::new(&text), &cancel);
    assert_eq!(result.unwrap_err(), Error::Cancelled);
}

#[test]
fn invalid_page_starts_are_rejected() {
    let text = "abc";
    assert!(matches!(
        Document::new(text).with_page_starts(vec![2, 1]),
        Err(Error::InvalidPageBoundary { offset: 1, len: 3 })
    ));
}

// =============================================================================
// Structure, domain, and summary
// =============================================================================

const TECHNICAL_DOC: &str = "\
# Deployment

The backend exposes a REST API. Every endpoint returns JSON.

```bash
docker compose up -d
kubectl apply -f deploy.yaml
```

## Storage

| service  | database   |
|----------|------------|
| accounts | PostgreSQL |
| sessions | Redis      |

Redis caches sessions and PostgreSQL stores accounts.
";

#[test]
fn intelligent_assigns_roles_and_domain() {
    let chunked = chunker(Strategy::Intelligent, 120, 0)
        .chunk_text(TECHNICAL_DOC)
        .unwrap();

    let roles: Vec<StructuralRole> = chunked.iter().map(|c| c.structural_role).collect();
    assert!(roles.contains(&StructuralRole::CodeBlock), "{roles:?}");
    assert!(roles.contains(&StructuralRole::Table), "{roles:?}");

    assert!(chunked
        .iter()
        .all(|c| c.document_domain == DocumentDomain::Technical));
    assert!(chunked
        .chunks()
        .iter()
        .any(|c| c.technical_keywords.contains(&"Redis".to_string())));

    // Headings open chunks
    assert!(chunked.chunks()[0].content.starts_with("# Deployment"));
    assert!(chunked
        .iter()
        .any(|c| c.core_content().starts_with("## Storage")));
}

#[test]
fn auto_picks_intelligent_for_headings() {
    let chunked = chunker(Strategy::Auto, 400, 40)
        .chunk_text(TECHNICAL_DOC)
        .unwrap();
    assert_eq!(chunked.strategy(), Strategy::Intelligent);
}

#[test]
fn summary_reduces_chunks() {
    let chunked = chunker(Strategy::Intelligent, 120, 0)
        .chunk_text(TECHNICAL_DOC)
        .unwrap();
    let summary = chunked.summary();

    assert_eq!(summary.domain, DocumentDomain::Technical);
    assert_eq!(summary.chunk_count, chunked.len());
    assert_eq!(summary.strategy, Strategy::Intelligent);
    assert!(!summary.keywords.is_empty() && summary.keywords.len() <= 10);
    assert!((0.0..=1.0).contains(&summary.mean_quality));
}

#[test]
fn chunks_serialize_with_snake_case_roles() {
    let chunked = chunker(Strategy::Intelligent, 120, 0)
        .chunk_text(TECHNICAL_DOC)
        .unwrap();
    let json = serde_json::to_value(&chunked.chunks()[1]).unwrap();
    assert_eq!(json["structural_role"], "code_block");
    assert_eq!(json["document_domain"], "Technical");
}

#[cfg(feature = "parallel")]
#[test]
fn chunk_many_keeps_order() {
    let texts = ["First doc. It is short.", "Second doc.", ""];
    let documents: Vec<Document<'_>> = texts.iter().map(|t| Document::new(t)).collect();
    let results = chunker(Strategy::Semantic, 100, 0).chunk_many(&documents);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().text(), texts[0]);
    assert_eq!(results[1].as_ref().unwrap().len(), 1);
    assert!(results[2].as_ref().unwrap().is_empty());
}
