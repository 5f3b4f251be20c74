use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use storefront_cart::{CartCommand, CartItem, CartState, CartStore};
use storefront_core::{Amount, CategoryId, ProductId};

fn product(id: i64) -> CartItem {
    CartItem::new(
        ProductId::from_raw(id),
        format!("Product {id}"),
        Amount::new(9.99),
        100,
        CategoryId::from_raw(1),
    )
}

/// Latency of a single add against carts of growing size.
fn bench_add_item_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_item_latency");

    for lines in [1usize, 10, 50] {
        let seeded = CartState::from_items((0..lines as i64).map(product));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, _| {
            b.iter_batched(
                || CartStore::with_state(seeded.clone()),
                |store| black_box(store.dispatch(CartCommand::AddItem(product(0)))),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Rapid-click burst: many commands against one store with a listener attached.
fn bench_burst_with_listener(c: &mut Criterion) {
    let mut group = c.benchmark_group("burst_with_listener");
    let burst = 200u64;
    group.throughput(Throughput::Elements(burst));

    group.bench_function("mixed_commands", |b| {
        b.iter(|| {
            let store = CartStore::new();
            let _sub = store.subscribe(|change| {
                black_box(change.snapshot().unit_count());
            });
            for i in 0..burst as i64 {
                let id = i % 8;
                let cmd = match i % 4 {
                    0 | 1 => CartCommand::AddItem(product(id)),
                    2 => CartCommand::SetQuantity {
                        id: ProductId::from_raw(id),
                        quantity: i % 5,
                    },
                    _ => CartCommand::RemoveItem {
                        id: ProductId::from_raw(id),
                    },
                };
                black_box(store.dispatch(cmd));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_add_item_latency, bench_burst_with_listener);
criterion_main!(benches);
