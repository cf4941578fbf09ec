use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use geonames_core::{
    Coordinates, DatasetBuilder, DeviceLocation, Environment, FixedClock, GazetteerStore,
    MemorySource, RawCity, SearchEngine, StaticCalendar, ZoneRule,
};
use std::sync::Arc;

const SYLLABLES: [&str; 12] = [
    "ka", "lo", "mar", "ven", "sa", "to", "ri", "bel", "nor", "du", "an", "ze",
];
const ZONES: [(&str, i32); 6] = [
    ("Europe/Paris", 60),
    ("America/New_York", -300),
    ("Asia/Kolkata", 330),
    ("Asia/Tokyo", 540),
    ("America/Sao_Paulo", -180),
    ("Africa/Lagos", 60),
];

fn city_name(i: usize) -> String {
    let mut name = String::new();
    let mut n = i;
    for _ in 0..3 {
        name.push_str(SYLLABLES[n % SYLLABLES.len()]);
        n /= SYLLABLES.len();
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => name,
    }
}

fn synthetic_store(count: usize) -> GazetteerStore {
    let mut builder = DatasetBuilder::new();
    for i in 0..count {
        let (zone, _) = ZONES[i % ZONES.len()];
        let lat = ((i * 37) % 170) as f32 - 85.0;
        let lon = ((i * 91) % 350) as f32 - 175.0;
        builder.push(
            RawCity::new(&city_name(i), lat, lon, (i as u32 * 7919) % 2_000_000 + 1, zone)
                .with_country("ZZ", "Synthetica")
                .with_admin1(&format!("ZZ.{:02}", i % 50), "Province"),
        );
    }
    let set = builder.build().expect("synthetic dataset builds");

    // Berlin is known to the calendar but not packaged.
    let calendar = ZONES
        .iter()
        .fold(StaticCalendar::new(), |cal, (zone, minutes)| {
            cal.with_zone(zone, ZoneRule::fixed(*minutes))
        })
        .with_zone("Europe/Berlin", ZoneRule::fixed(60));
    let env = Environment::new(
        Arc::new(calendar),
        Arc::new(FixedClock(1_700_000_000)),
        Arc::new(DeviceLocation::new(Coordinates::new(48.85, 2.35))),
    );
    GazetteerStore::new(Arc::new(MemorySource::new(set)), env)
}

fn bench_name_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("name_search");
    for &count in &[1_000usize, 10_000, 50_000] {
        let store = synthetic_store(count);
        let engine = SearchEngine::new(&store);
        let mut out = Vec::new();
        // Warm the lazy columns outside the measurement.
        engine.search_by_name_fragment("", false, &mut out).unwrap();

        group.bench_with_input(BenchmarkId::new("fragment", count), &count, |b, _| {
            b.iter(|| {
                engine
                    .search_by_name_fragment(black_box("mar"), false, &mut out)
                    .unwrap();
                black_box(out.len())
            })
        });
        group.bench_with_input(BenchmarkId::new("proximity", count), &count, |b, _| {
            b.iter(|| {
                engine
                    .search_by_name_fragment(black_box("ka"), true, &mut out)
                    .unwrap();
                black_box(out.len())
            })
        });
    }
    group.finish();
}

fn bench_coordinate_lookups(c: &mut Criterion) {
    let store = synthetic_store(50_000);
    let engine = SearchEngine::new(&store);
    let at = Coordinates::new(40.71, -74.0);
    engine.nearest_city(at).unwrap();

    c.bench_function("nearest_city_50k", |b| {
        b.iter(|| engine.nearest_city(black_box(at)).unwrap())
    });
    c.bench_function("best_match_city_50k", |b| {
        b.iter(|| engine.best_match_city(black_box(at)).unwrap())
    });
    c.bench_function("resolve_timezone_alias_50k", |b| {
        b.iter(|| engine.resolve_timezone(black_box("Europe/Berlin")).unwrap())
    });
}

criterion_group!(benches, bench_name_search, bench_coordinate_lookups);
criterion_main!(benches);
