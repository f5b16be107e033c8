use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{DateTime, Duration, Utc};
use stockledger_core::{BatchId, ProductId, WarehouseId};
use stockledger_inventory::{
    AddStock, Batch, ConsumeStock, ReceiveBatch, build_forecast, plan_consumption,
};
use stockledger_infra::{InMemoryInventoryService, InventoryService, LedgerConfig};

fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Batches with a spread of expiries, some without one.
fn batches(count: usize, product: ProductId, warehouse: WarehouseId) -> Vec<Batch> {
    let now = start();
    (0..count)
        .map(|i| {
            let mut params = ReceiveBatch::new(product, warehouse, format!("LOT-{i}"), 50)
                .received(now + Duration::minutes(i as i64));
            if i % 4 != 0 {
                params = params.expiring(now + Duration::days(((i * 7) % 120) as i64 + 1));
            }
            Batch::receive(BatchId::new(), params, now).unwrap()
        })
        .collect()
}

fn seeded_service(count: usize) -> (InMemoryInventoryService, ProductId, WarehouseId) {
    let svc = InventoryService::in_memory(LedgerConfig::default(), stockledger_core::SystemClock);
    let (p, w) = (ProductId::new(), WarehouseId::new());
    let now = Utc::now();
    for i in 0..count {
        let mut params = ReceiveBatch::new(p, w, format!("LOT-{i}"), 1_000);
        if i % 3 != 0 {
            params = params.expiring(now + Duration::days(i as i64 % 90 + 30));
        }
        svc.add_stock(AddStock::new(params), "bench").unwrap();
    }
    (svc, p, w)
}

fn bench_plan_consumption(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_consumption");
    let (p, w) = (ProductId::new(), WarehouseId::new());

    for batch_count in [10, 100, 1_000].iter() {
        let stock = batches(*batch_count, p, w);
        let request = (*batch_count as i64 * 50) / 2;
        group.throughput(Throughput::Elements(*batch_count as u64));
        group.bench_with_input(
            BenchmarkId::new("half_of_stock", batch_count),
            &stock,
            |b, stock| {
                b.iter(|| black_box(plan_consumption(stock.iter(), black_box(request))));
            },
        );
    }

    group.finish();
}

fn bench_consume_stock(c: &mut Criterion) {
    let mut group = c.benchmark_group("consume_stock");

    for batch_count in [10, 100, 1_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("small_draw", batch_count),
            batch_count,
            |b, &count| {
                let (svc, p, w) = seeded_service(count);
                b.iter(|| {
                    let _ = black_box(svc.consume_stock(ConsumeStock::new(p, w, 1, "bench")));
                });
            },
        );
    }

    group.finish();
}

fn bench_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast");

    for batch_count in [100, 1_000, 10_000].iter() {
        let (svc, p, w) = seeded_service(*batch_count);
        for _ in 0..100 {
            let _ = svc.consume_stock(ConsumeStock::new(p, w, 7, "bench"));
        }

        group.bench_function(BenchmarkId::new("get_stock_forecast", batch_count), |b| {
            b.iter(|| black_box(svc.get_stock_forecast(None, None)));
        });
    }

    let (p, w) = (ProductId::new(), WarehouseId::new());
    let stock = batches(1_000, p, w);
    group.bench_function("build_forecast_without_movements", |b| {
        b.iter(|| black_box(build_forecast(&stock, &[], start(), &Default::default())));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_plan_consumption,
    bench_consume_stock,
    bench_forecast
);
criterion_main!(benches);
