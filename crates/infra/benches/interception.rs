use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use mentara_auth::{Caller, Role};
use mentara_infra::{InMemoryExecutor, RlsClient};
use mentara_rls::{Operation, QueryDescriptor, RlsInterceptor};

fn seeded_store(meetings: usize) -> Arc<InMemoryExecutor> {
    let store = Arc::new(InMemoryExecutor::new());
    for i in 0..meetings {
        store.seed(
            "Meeting",
            json!({
                "id": format!("m{i}"),
                "clientId": format!("u{}", i % 50),
                "therapistId": format!("t{}", i % 7),
                "status": "SCHEDULED",
            }),
        );
    }
    store
}

fn bench_rewrite_only(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let interceptor = RlsInterceptor::default();
    let store = InMemoryExecutor::new();
    let caller = Caller::user("u1", Role::Client);

    let mut group = c.benchmark_group("rewrite");
    for (name, op) in [
        ("find_many", Operation::FindMany),
        ("update_many", Operation::UpdateMany),
        ("create", Operation::Create),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let query = QueryDescriptor::new("Notification", op)
                    .with_where(json!({ "read": false }))
                    .with_data(json!({ "read": true }));
                rt.block_on(interceptor.intercept(black_box(&caller), query, &store))
                    .expect("rewrite")
            })
        });
    }
    group.finish();
}

fn bench_guarded_reads(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let mut group = c.benchmark_group("guarded_find_many");

    for size in [100usize, 1_000, 10_000] {
        let client = RlsClient::new(RlsInterceptor::default(), seeded_store(size));
        let therapist = Caller::user("t3", Role::Therapist);
        let admin = Caller::user("a1", Role::Admin);

        group.bench_with_input(BenchmarkId::new("narrowed", size), &size, |b, _| {
            b.iter(|| {
                rt.block_on(client.execute(&therapist, QueryDescriptor::new("Meeting", Operation::FindMany)))
                    .expect("query")
            })
        });
        group.bench_with_input(BenchmarkId::new("bypassed", size), &size, |b, _| {
            b.iter(|| {
                rt.block_on(client.execute(&admin, QueryDescriptor::new("Meeting", Operation::FindMany)))
                    .expect("query")
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rewrite_only, bench_guarded_reads);
criterion_main!(benches);
