//! 翻译管道集成测试
//!
//! 用假提供方测试批量引擎的排序、并发、重试和回退行为

use std::sync::{Arc, Mutex};
use std::time::Duration;

use paper_translator::document::ParagraphStatus;
use paper_translator::translation::{BatchTranslationEngine, EngineConfig, ProgressCallback};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{document_from, prose_document, translate, FakeMode, FakeProvider};

fn engine(provider: &Arc<FakeProvider>, config: EngineConfig) -> BatchTranslationEngine {
    BatchTranslationEngine::new(provider.clone(), config)
}

#[tokio::test]
async fn test_output_keeps_length_order_and_positions() {
    let provider = Arc::new(FakeProvider::new(FakeMode::Echo));
    let engine = engine(&provider, EngineConfig::default().with_batch_size(7));
    let input = prose_document(40);

    let output = engine.translate(&input, "ko", None).await;

    assert_eq!(output.document.paragraphs.len(), input.paragraphs.len());
    assert_eq!(output.statuses.len(), input.paragraphs.len());
    for (i, (before, after)) in input
        .paragraphs
        .iter()
        .zip(&output.document.paragraphs)
        .enumerate()
    {
        assert_eq!(after.text(), translate(before.text()), "paragraph {} misplaced", i);
        assert_eq!(after.page_index(), before.page_index());
        assert_eq!(after.regions(), before.regions());
    }
    assert_eq!(provider.batch_calls(), 6);
    assert_eq!(provider.single_calls(), 0);
}

#[tokio::test]
async fn test_sixty_paragraphs_use_three_batches() {
    let provider = Arc::new(FakeProvider::new(FakeMode::Echo).with_delay(Duration::from_millis(30)));
    let engine = engine(&provider, EngineConfig::default());

    let output = engine.translate(&prose_document(60), "ko", None).await;

    assert!(output.is_complete());
    assert_eq!(provider.batch_calls(), 3, "60 paragraphs at batch size 25 -> 25/25/10");
    assert_eq!(engine.get_stats().get_batches_processed(), 3);
    assert_eq!(provider.max_in_flight(), 3, "all three batches run concurrently");
}

#[tokio::test]
async fn test_concurrency_reaches_but_never_exceeds_limit() {
    for limit in [1, 2, 4] {
        let provider =
            Arc::new(FakeProvider::new(FakeMode::Echo).with_delay(Duration::from_millis(10)));
        let config = EngineConfig::default().with_batch_size(3).with_concurrency(limit);
        let engine = engine(&provider, config);

        let output = engine.translate(&prose_document(45), "ko", None).await;

        assert!(output.is_complete());
        assert_eq!(provider.batch_calls(), 15);
        assert_eq!(
            provider.max_in_flight(),
            limit,
            "expected exactly {} requests in flight",
            limit
        );
    }
}

#[tokio::test]
async fn test_fallback_requests_respect_limit() {
    let provider =
        Arc::new(FakeProvider::new(FakeMode::AlwaysMismatch).with_delay(Duration::from_millis(5)));
    let config = EngineConfig::default().with_batch_size(10).with_concurrency(2);
    let engine = engine(&provider, config);

    let output = engine.translate(&prose_document(30), "ko", None).await;

    assert!(output.is_complete());
    assert_eq!(provider.single_calls(), 30);
    assert_eq!(provider.max_in_flight(), 2);
}

#[tokio::test]
async fn test_mismatch_then_correct_retry_avoids_fallback() {
    let provider = Arc::new(FakeProvider::new(FakeMode::MismatchOnce));
    let engine = engine(&provider, EngineConfig::default());
    let input = prose_document(10);

    let output = engine.translate(&input, "ko", None).await;

    assert_eq!(provider.batch_calls(), 2, "one mismatch plus one retry");
    assert_eq!(provider.single_calls(), 0, "no individual fallback expected");
    assert_eq!(output.document.paragraphs[9].text(), translate(input.paragraphs[9].text()));
    assert!(output.is_complete());

    let stats = engine.get_stats();
    assert_eq!(stats.get_batch_retries(), 1);
    assert_eq!(stats.get_individual_fallbacks(), 0);
}

#[tokio::test]
async fn test_persistent_mismatch_falls_back_per_paragraph() {
    let provider = Arc::new(FakeProvider::new(FakeMode::AlwaysMismatch));
    let engine = engine(&provider, EngineConfig::default());
    let input = prose_document(8);

    let output = engine.translate(&input, "ko", None).await;

    assert_eq!(provider.batch_calls(), 2);
    assert_eq!(provider.single_calls(), 8, "one call per paragraph");
    for (before, after) in input.paragraphs.iter().zip(&output.document.paragraphs) {
        assert_eq!(after.text(), translate(before.text()));
    }

    let inputs = provider.single_inputs.lock().unwrap();
    assert!(inputs.iter().all(|text| !text.contains("PARAGRAPH_SEPARATOR")));
    assert_eq!(engine.get_stats().get_individual_fallbacks(), 8);
}

#[tokio::test]
async fn test_failing_provider_marks_every_paragraph() {
    let provider = Arc::new(FakeProvider::new(FakeMode::Failing));
    let engine = engine(&provider, EngineConfig::default().with_batch_size(4));
    let input = document_from(&[
        "The first claim is strong.",
        "$$\\int_0^1 x\\,dx$$",
        "The second claim is weaker.",
    ]);

    let output = engine.translate(&input, "ko", None).await;

    assert_eq!(output.failed_indices(), vec![0, 2]);
    assert_eq!(output.document.paragraphs[0].text(), "The first claim is strong.");
    assert_eq!(output.statuses[1], ParagraphStatus::Skipped);
    match &output.statuses[2] {
        ParagraphStatus::Failed { reason } => assert!(reason.contains("connection refused")),
        other => panic!("unexpected status: {:?}", other),
    }
    assert_eq!(engine.get_stats().get_failed_paragraphs(), 2);
}

#[tokio::test]
async fn test_progress_reports_paragraph_counts() {
    let provider = Arc::new(FakeProvider::new(FakeMode::AlwaysMismatch));
    let engine = engine(&provider, EngineConfig::default().with_batch_size(4));
    let mut texts: Vec<String> = (0..10).map(|i| format!("Sentence {} is prose.", i)).collect();
    texts.push("42".to_string());
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let progress: ProgressCallback = Arc::new(move |done, total| {
        sink.lock().unwrap().push((done, total));
    });

    engine.translate(&document_from(&refs), "ko", Some(progress)).await;

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 3, "one event per batch");
    assert!(events.iter().all(|&(_, total)| total == 10), "total excludes skipped paragraphs");
    assert!(events.windows(2).all(|w| w[0].0 < w[1].0));
    assert_eq!(events.last(), Some(&(10, 10)));
}

#[tokio::test]
async fn test_math_only_paragraphs_are_byte_identical() {
    let provider = Arc::new(FakeProvider::new(FakeMode::Echo));
    let engine = engine(&provider, EngineConfig::default());
    let math = [
        "$E = mc^2$",
        "$$\\sum_{i=1}^{n} x_i$$",
        "\\[ a^2 + b^2 = c^2 \\]",
        "\\begin{equation} f(x) = 0 \\end{equation}",
    ];
    let mut texts = vec!["Consider the following identities."];
    texts.extend(math);

    let input = document_from(&texts);
    let output = engine.translate(&input, "ko", None).await;

    for i in 1..input.paragraphs.len() {
        assert_eq!(output.document.paragraphs[i].text(), input.paragraphs[i].text());
        assert_eq!(output.statuses[i], ParagraphStatus::Skipped);
    }
    assert_eq!(provider.batch_calls(), 1);
}

#[tokio::test]
async fn test_side_channels_pass_through() {
    let provider = Arc::new(FakeProvider::new(FakeMode::Echo));
    let engine = engine(&provider, EngineConfig::default());
    let mut input = document_from(&["Only one paragraph here."]);
    input.equations = vec!["x = y".to_string()];

    let output = engine.translate(&input, "ko", None).await;

    assert_eq!(output.document.equations, input.equations);
    assert_eq!(
        output.document.paragraphs,
        vec![input.paragraphs[0].with_text(translate("Only one paragraph here."))]
    );
}
