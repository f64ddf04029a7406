use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use docsync_core::reconciliation::{LocalCache, ReconciliationEngine};
use docsync_domain::CatalogEntry;

fn catalog(size: usize) -> Vec<CatalogEntry> {
    (0..size)
        .map(|idx| CatalogEntry {
            subject_id: format!("subject-{idx}"),
            display_name: None,
            source_url: format!("https://cdn.example.test/{idx}.pdf"),
            remote_modified_at: Utc.timestamp_millis_opt(1_700_000_000_000 + idx as i64).unwrap(),
        })
        .collect()
}

/// Half the catalog cached, a quarter of that outdated
fn local_cache(size: usize) -> LocalCache {
    (0..size / 2)
        .map(|idx| {
            let downloaded_ms = if idx % 4 == 0 { 1_600_000_000_000 } else { 1_800_000_000_000 };
            (format!("subject-{idx}"), Utc.timestamp_millis_opt(downloaded_ms).unwrap())
        })
        .collect()
}

fn bench_reconcile_catalog(c: &mut Criterion) {
    let engine = ReconciliationEngine::new();
    let mut group = c.benchmark_group("reconcile_catalog");

    for size in [100_usize, 1_000, 10_000] {
        let entries = catalog(size);
        let local = local_cache(size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| engine.reconcile_catalog(black_box(entries.clone()), black_box(&local)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reconcile_catalog);
criterion_main!(benches);
