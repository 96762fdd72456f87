use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Identity, OrderLine, OrderService, ProductId, SubjectId, TokenService, order::order_total,
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use store::InMemoryRepository;

fn token_service() -> TokenService {
    TokenService::new(&SecretString::from("bench-secret".to_string())).unwrap()
}

fn lines(count: i64) -> Vec<OrderLine> {
    (1..=count)
        .map(|i| OrderLine::new(ProductId::new(i), 1, Decimal::new(100 * i, 2)))
        .collect()
}

fn bench_issue_token(c: &mut Criterion) {
    let tokens = token_service();
    let identity = Identity::customer(SubjectId::new(42));

    c.bench_function("domain/issue_token", |b| {
        b.iter(|| tokens.issue(identity).unwrap());
    });
}

fn bench_verify_token(c: &mut Criterion) {
    let tokens = token_service();
    let token = tokens.issue(Identity::admin(SubjectId::new(42))).unwrap();

    c.bench_function("domain/verify_token", |b| {
        b.iter(|| tokens.verify(&token).unwrap());
    });
}

fn bench_order_total_100_lines(c: &mut Criterion) {
    let lines = lines(100);

    c.bench_function("domain/order_total_100_lines", |b| {
        b.iter(|| order_total(&lines));
    });
}

fn bench_create_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = OrderService::new(InMemoryRepository::new());

    c.bench_function("domain/create_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.create(SubjectId::new(1), lines(5)).await.unwrap();
            });
        });
    });
}

fn bench_create_then_cancel(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = OrderService::new(InMemoryRepository::new());
    let owner = Identity::customer(SubjectId::new(1));

    c.bench_function("domain/create_then_cancel", |b| {
        b.iter(|| {
            rt.block_on(async {
                let order_id = service.create(owner.subject_id, lines(2)).await.unwrap();
                service.cancel(&owner, order_id).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_issue_token,
    bench_verify_token,
    bench_order_total_100_lines,
    bench_create_order,
    bench_create_then_cancel,
);
criterion_main!(benches);
