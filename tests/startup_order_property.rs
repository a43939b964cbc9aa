// tests/startup_order_property.rs

use proptest::prelude::*;

use jac::config::WorkerDescriptor;
use jac::engine::startup_order;
use jac_test_utils::builders::WorkerBuilder;

// Worker `i` is named `w<i>`, so catalog position can be read back from the
// name.
fn catalog_strategy() -> impl Strategy<Value = Vec<WorkerDescriptor>> {
    proptest::collection::vec((0u8..5, any::<bool>()), 0..20).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (order, active))| {
                let builder = WorkerBuilder::new(&format!("w{i}")).order(order);
                if active { builder.build() } else { builder.inactive().build() }
            })
            .collect()
    })
}

fn position(worker: &WorkerDescriptor) -> usize {
    worker.name[1..].parse().unwrap()
}

proptest! {
    #[test]
    fn startup_order_sorts_by_rank_then_catalog_position(catalog in catalog_strategy()) {
        let ordered = startup_order(&catalog);

        let expected_len = catalog.iter().filter(|w| w.active).count();
        prop_assert_eq!(ordered.len(), expected_len);
        prop_assert!(ordered.iter().all(|w| w.active));

        for pair in ordered.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                (a.start_order, position(a)) < (b.start_order, position(b)),
                "{} (order {}) came before {} (order {})",
                a.name, a.start_order, b.name, b.start_order
            );
        }
    }
}
