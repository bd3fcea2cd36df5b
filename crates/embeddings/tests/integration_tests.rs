//! Integration tests for dual embedding generation
//!
//! The endpoint test requires an OpenAI-compatible embeddings server at
//! http://localhost:8000/v1 serving both local models.
//! Run with: cargo test --package repoindex-embeddings --test integration_tests -- --ignored

use pretty_assertions::assert_eq;
use repoindex_core::{Chunk, ChunkType, EmbeddingProviderKind, Language, RunConfig};
use repoindex_embeddings::{
    create_embedding_engine, textify, DualEmbedder, EmbeddingEngine, EmbeddingRecord,
    MockEmbeddingProvider,
};
use std::sync::Arc;

fn sample_chunk(name: &str, code: &str) -> Chunk {
    Chunk::builder()
        .id(format!("chunk-{name}"))
        .code(code)
        .repo("octo/demo")
        .file_path("pkg/util.py")
        .language(Language::Python)
        .chunk_type(ChunkType::Function)
        .name(name)
        .signature(Some(code.lines().next().unwrap_or_default().to_string()))
        .docstring(Some("Adds one.".to_string()))
        .start_line(1usize)
        .end_line(2usize)
        .module(Some("pkg.util".to_string()))
        .lines_of_code(2usize)
        .build()
        .expect("valid chunk")
}

#[test]
fn test_record_from_chunk_and_textify() {
    let chunk = sample_chunk("addOne", "def addOne(x):\n    return x + 1");
    let record = EmbeddingRecord::from(&chunk);

    assert_eq!(record.chunk_type, "function");
    assert_eq!(record.code, chunk.code);
    assert_eq!(
        textify(&record),
        "function Add one that does Adds one defined as Def add one x in file util py module pkg util"
    );
}

#[tokio::test]
async fn test_engine_from_run_config_reports_dimensions() {
    let config = RunConfig::new("octo", "demo", "main", "token");
    let engine = create_embedding_engine(&config);
    assert_eq!(engine.provider_name(), "local");
    assert_eq!(engine.dimensions(), (384, 768));

    let mut config = RunConfig::new("octo", "demo", "main", "token");
    config.embedding_provider = EmbeddingProviderKind::OpenAi;
    let engine = create_embedding_engine(&config);
    assert_eq!(engine.provider_name(), "openai");
    assert_eq!(engine.dimensions(), (1536, 1536));
}

#[tokio::test]
async fn test_mock_engine_preserves_order() {
    let engine = DualEmbedder::with_providers(
        "mock",
        Arc::new(MockEmbeddingProvider::new(3)),
        Arc::new(MockEmbeddingProvider::new(5)),
    );
    let chunks = vec![
        sample_chunk("a", "def a():\n    pass"),
        sample_chunk("bb", "def bb(x, y):\n    pass"),
    ];
    let records: Vec<EmbeddingRecord> = chunks.iter().map(EmbeddingRecord::from).collect();

    let pairs = engine.embed_batch(&records).await.unwrap();

    assert_eq!(pairs.len(), chunks.len());
    for (pair, chunk) in pairs.iter().zip(&chunks) {
        assert_eq!(pair.code[0], chunk.code.chars().count() as f32);
        assert_eq!(pair.nlp.len(), 3);
        assert_eq!(pair.code.len(), 5);
    }
}

#[tokio::test]
#[ignore] // Requires a local OpenAI-compatible embeddings server
async fn test_local_endpoint_round_trip() {
    let config = RunConfig::new("octo", "demo", "main", "token");
    let engine = create_embedding_engine(&config);
    let chunk = sample_chunk("hello", "def hello():\n    print('hi')");

    let pairs = engine
        .embed_batch(&[EmbeddingRecord::from(&chunk)])
        .await
        .expect("embedding server should respond");

    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].nlp.len(), 384);
    assert_eq!(pairs[0].code.len(), 768);
}
