use air_quality_dashboard::analyzers::AirQualityAnalyzer;
use air_quality_dashboard::models::BinSpec;
use air_quality_dashboard::processors::DatasetPreparer;
use air_quality_dashboard::readers::AirQualityReader;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// Hourly rows starting 2013-03-01, with every 50th PM2.5 reading missing
fn create_test_csv(hours: usize) -> String {
    let mut csv = String::from("No,year,month,day,hour,PM2.5,PM10,TEMP,WSPM,station\n");

    for i in 0..hours {
        let day_index = i / 24;
        let hour = i % 24;
        let month = 3 + (day_index / 28) % 10;
        let day = 1 + day_index % 28;
        let year = 2013 + day_index / 280;

        let temp = -5.0 + (i % 400) as f64 * 0.1;
        let wspm = 0.5 + (i % 90) as f64 * 0.1;
        let pm25 = if i % 50 == 49 {
            "NA".to_string()
        } else {
            format!("{:.1}", 10.0 + (i % 300) as f64)
        };
        let pm10 = 20.0 + (i % 350) as f64;

        csv.push_str(&format!(
            "{},{},{},{},{},{},{:.1},{:.1},{:.1},Aotizhongxin\n",
            i + 1,
            year,
            month,
            day,
            hour,
            pm25,
            pm10,
            temp,
            wspm
        ));
    }

    csv
}

fn benchmark_parse(c: &mut Criterion) {
    let csv = create_test_csv(5_000);
    let reader = AirQualityReader::new();

    c.bench_function("parse_csv", |b| {
        b.iter(|| {
            let table = reader.parse_str(black_box(&csv)).unwrap();
            black_box(table.len())
        })
    });
}

fn benchmark_prepare(c: &mut Criterion) {
    let csv = create_test_csv(5_000);
    let raw = AirQualityReader::new().parse_str(&csv).unwrap();
    let preparer = DatasetPreparer::new();

    c.bench_function("prepare_dataset", |b| {
        b.iter(|| {
            let dataset = preparer.prepare(black_box(&raw)).unwrap();
            black_box(dataset.len())
        })
    });
}

fn benchmark_bin_fitting(c: &mut Criterion) {
    let values: Vec<f64> = (0..10_000).map(|i| -20.0 + (i % 600) as f64 * 0.1).collect();

    c.bench_function("bin_fit_and_assign", |b| {
        b.iter(|| {
            let spec = BinSpec::fit("TEMP", black_box(&values), 5).unwrap();
            let assigned = values.iter().filter_map(|&v| spec.assign(v)).count();
            black_box(assigned)
        })
    });
}

fn benchmark_aggregations(c: &mut Criterion) {
    let csv = create_test_csv(5_000);
    let raw = AirQualityReader::new().parse_str(&csv).unwrap();
    let dataset = DatasetPreparer::new().prepare(&raw).unwrap();
    let analyzer = AirQualityAnalyzer::new();

    c.bench_function("analyze_full_range", |b| {
        b.iter(|| {
            let data = analyzer.analyze(black_box(&dataset), None).unwrap();
            black_box(data.record_count)
        })
    });

    c.bench_function("wind_category_means", |b| {
        b.iter(|| black_box(analyzer.mean_by_wind_category(dataset.records()).len()))
    });
}

fn benchmark_varying_data_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("prepare_by_size");

    for &hours in &[500, 2_000, 8_000] {
        group.bench_with_input(BenchmarkId::new("hours", hours), &hours, |b, &hours| {
            let raw = AirQualityReader::new()
                .parse_str(&create_test_csv(hours))
                .unwrap();
            let preparer = DatasetPreparer::new();

            b.iter(|| {
                let dataset = preparer.prepare(&raw).unwrap();
                black_box(dataset.len())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parse,
    benchmark_prepare,
    benchmark_bin_fitting,
    benchmark_aggregations,
    benchmark_varying_data_sizes
);
criterion_main!(benches);
