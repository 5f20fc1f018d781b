use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use oee_calc::{DashboardInput, OeeCalculator, SubAssemblyTreeBuilder};
use oee_core::{AnalyticsConfig, Granularity, PlannedItemNode};
use serde_json::{json, Value};

fn dashboard_payload(records: usize) -> Value {
    let machines: Vec<Value> = (0..records)
        .map(|i| {
            json!({
                "machine_id": format!("M{}", i % 50),
                "line_id": format!("Line-{}", i % 5),
                "status": "completed",
                "availability": 80 + (i % 20),
                "performance": 70 + (i % 30),
                "quality": 95,
                "oee": 60,
                "total_units": 100,
                "rejected_units": i % 7,
                "operating_time_mins": 420,
                "downtime_mins": 60,
                "entry_date": format!("2025-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
            })
        })
        .collect();
    let downtime: Vec<Value> = (0..records / 4)
        .map(|i| json!({ "reason": format!("R{}", i % 8), "machine_id": format!("M{}", i % 50), "duration": i % 90 }))
        .collect();

    json!({
        "summary": { "availability": 90, "performance": 80, "quality": 95, "oee": 68.4 },
        "machineOEE": machines,
        "downtimeReasons": downtime,
    })
}

/// 完整計算流程
fn bench_calculate(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate");
    let calculator = OeeCalculator::new(AnalyticsConfig::default());

    for size in [100, 1000, 5000].iter() {
        let input = DashboardInput::from_payload(&dashboard_payload(*size));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| criterion::black_box(calculator.calculate(&input)));
        });
    }
    group.finish();
}

/// 子件樹重建
fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("sub_assembly_tree");
    let config = AnalyticsConfig::default();

    for size in [100, 1000, 5000].iter() {
        let items: Vec<PlannedItemNode> = (0..*size)
            .map(|i| {
                let parent = if i == 0 {
                    "top".to_string()
                } else {
                    format!("C{}", i / 4)
                };
                PlannedItemNode::new(i.to_string(), format!("C{}", i), parent)
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| criterion::black_box(SubAssemblyTreeBuilder::build(items.clone(), &config)));
        });
    }
    group.finish();
}

/// 趨勢分桶
fn bench_trend(c: &mut Criterion) {
    let calculator = OeeCalculator::new(AnalyticsConfig::default());
    let today = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default();
    let records: Vec<Value> = (0..2000)
        .map(|i| {
            let status = ["completed", "in-progress", "draft", "open"][i % 4];
            json!({
                "status": status,
                "created_at": format!("2025-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
                "quantity": i % 10,
            })
        })
        .collect();

    c.bench_function("status_trend_monthly", |b| {
        b.iter(|| criterion::black_box(calculator.status_trend(&records, Granularity::Monthly, today)));
    });
}

criterion_group!(benches, bench_calculate, bench_tree, bench_trend);
criterion_main!(benches);
