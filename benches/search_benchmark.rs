use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lexidex::{Config, Database, FieldDefinition, FieldType, QuerySegment, SearchFilters};
use rand::Rng;
use serde_json::{json, Value};

const WORDS: [&str; 12] = [
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog",
    "rust", "index", "search", "engine",
];

fn schema() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::string("title").indexed().boost(10.0),
        FieldDefinition::text("content").indexed(),
        FieldDefinition::list("categories", FieldType::String).filterable(),
    ]
}

/// Helper to create test documents
fn create_test_document(id: u64, content_size: usize) -> Value {
    let mut rng = rand::thread_rng();
    let content: String = (0..content_size)
        .map(|_| WORDS[rng.gen_range(0..WORDS.len())])
        .collect::<Vec<_>>()
        .join(" ");

    json!({
        "id": id,
        "type": "post",
        "title": format!("Document {}", WORDS[id as usize % WORDS.len()]),
        "content": content,
        "categories": [format!("category_{}", id % 10)],
    })
}

fn database(docs: u64) -> Database {
    let config = Config::default().with_schema("post", schema());
    let db = Database::open_in_memory(config).unwrap();
    let documents: Vec<Value> = (0..docs).map(|id| create_test_document(id, 50)).collect();
    db.update_multiple(&documents).unwrap();
    db
}

/// Benchmark single document ingestion
fn bench_single_update(c: &mut Criterion) {
    let db = database(0);

    c.bench_function("single_document_update", |b| {
        let mut id = 0;
        b.iter(|| {
            db.update(&create_test_document(id % 500, 50)).unwrap();
            id += 1;
        });
    });
}

/// Benchmark batch ingestion
fn bench_batch_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_update");
    group.sample_size(10);

    for batch_size in [10u64, 100, 500].iter() {
        let documents: Vec<Value> = (0..*batch_size).map(|id| create_test_document(id, 50)).collect();
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &documents,
            |b, documents| {
                b.iter(|| {
                    let db = database(0);
                    black_box(db.update_multiple(documents).unwrap());
                });
            },
        );
    }
    group.finish();
}

/// Benchmark free-text, fuzzy and field queries; the cache is cleared so
/// every iteration evaluates
fn bench_search(c: &mut Criterion) {
    let db = database(1000);
    let filters = SearchFilters::default();
    let mut group = c.benchmark_group("search");

    for text in ["quick fox", "serch", "enginx"] {
        group.bench_with_input(BenchmarkId::new("free_text", text), &text, |b, text| {
            b.iter(|| {
                db.clear_cache().unwrap();
                black_box(db.search(*text, &filters).unwrap());
            });
        });
    }

    let segment = QuerySegment::and([
        QuerySegment::prefix("title", "document"),
        QuerySegment::exact("categories", "category_3"),
    ]).unwrap();
    group.bench_function("field_and", |b| {
        b.iter(|| {
            db.clear_cache().unwrap();
            black_box(db.search(segment.clone(), &filters).unwrap());
        });
    });

    group.bench_function("cached", |b| {
        b.iter(|| black_box(db.search("quick fox", &filters).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_single_update, bench_batch_update, bench_search);
criterion_main!(benches);
