use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use folio_markdown::{
  MarkdownOptions,
  MarkdownProcessor,
  RenderMode,
  extract_toc,
  slugify,
};

const PROJECT_SMALL: &str = "# Search Indexer\n\nA short summary with `inline` \
                             code.\n\n> ✅ Shipped in two weeks.\n";

const PROJECT_LARGE: &str = r#"# Data Pipeline Rebuild

## Problem

> ⚠️ **Problem**
> Nightly batch jobs took six hours and failed silently.

Ingestion ran as a single cron script. Retries were manual, and nobody knew
which partitions were stale.

## Design

> 🧩 **Design**
> Split ingestion into idempotent stages behind a queue.

```mermaid
---
config:
  theme: neutral
---
flowchart LR
  A[Source] --> B[Queue] --> C[Workers] --> D[(Warehouse)]
```

| Stage    | Owner  | SLA   |
|----------|--------|-------|
| Extract  | Data   | 15m   |
| Load     | Infra  | 30m   |

## Implementation

> ⚙️ **Implementation**

```rust
async fn run(stage: Stage) -> anyhow::Result<()> {
    let batch = stage.fetch().await?;
    stage.commit(batch).await
}
```

```sql
SELECT partition, max(loaded_at) FROM loads GROUP BY partition;
```

![Dashboard](/images/dashboard.png)

## Result

> ✅ **Result**
> Runtime dropped to 40 minutes; failures page the owner.

- [x] Queue-backed stages
- [x] Alerting
- [ ] Backfill tooling

## Reflection

> 🧠 **Reflection**
> Schema drift was the real problem all along.[^1]

[^1]: See the follow-up project.
"#;

fn bench_processor(c: &mut Criterion) {
  let mut group = c.benchmark_group("processor");

  let document = MarkdownProcessor::new(MarkdownOptions::default());
  let card = MarkdownProcessor::new(MarkdownOptions {
    mode: RenderMode::Card,
    ..Default::default()
  });

  for (name, input) in [("small", PROJECT_SMALL), ("large", PROJECT_LARGE)] {
    group.bench_with_input(
      BenchmarkId::new("document", name),
      &input,
      |b, markdown| {
        b.iter(|| document.render(black_box(markdown)));
      },
    );

    group.bench_with_input(BenchmarkId::new("card", name), &input, |b, markdown| {
      b.iter(|| card.render(black_box(markdown)));
    });
  }

  group.finish();
}

fn bench_toc(c: &mut Criterion) {
  c.bench_function("extract_toc", |b| {
    b.iter(|| extract_toc(black_box(PROJECT_LARGE)));
  });
  c.bench_function("slugify", |b| {
    b.iter(|| slugify(black_box(" Data  Pipeline: 문제 정의! ")));
  });
}

fn bench_fallback_html(c: &mut Criterion) {
  let result = MarkdownProcessor::default().render(PROJECT_LARGE);
  c.bench_function("fallback_html", |b| {
    b.iter(|| black_box(&result).fallback_html());
  });
}

criterion_group!(benches, bench_processor, bench_toc, bench_fallback_html);
criterion_main!(benches);
