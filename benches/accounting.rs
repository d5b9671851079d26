use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use syncplan_lib::core::{FixedSpace, NeverCancel};
use syncplan_lib::{
    AccountingConfig, CopyAction, DeleteAction, Direction, FileEntry, Location, PlanAccounting,
    PlanInput,
};

fn batch(count: usize) -> (Vec<CopyAction>, Vec<DeleteAction>) {
    let copies = (0..count)
        .map(|i| {
            let path = format!("dir{}/file{}", (i / 2) % 97, i / 2);
            let direction = if i % 2 == 0 {
                Direction::ToSource
            } else {
                Direction::ToDestination
            };
            CopyAction::new(
                path.clone(),
                FileEntry::new(&path, i as u64),
                FileEntry::new(&path, 0),
                direction,
                i % 4 != 0,
            )
        })
        .collect();
    let deletes = (0..count / 10)
        .map(|i| {
            let file = FileEntry::new(format!("old{}", i), i as u64);
            DeleteAction::new(file, Location::AtDestination)
        })
        .collect();
    (copies, deletes)
}

fn bench_construction(c: &mut Criterion) {
    c.bench_function("build_bidirectional_50k", |b| {
        b.iter_batched(
            || batch(50_000),
            |(mut copies, mut deletes)| {
                let plan = PlanAccounting::with_options(
                    PlanInput::new("/src", "/dst", &mut copies, &mut deletes).bidirectional(true),
                    &NeverCancel,
                    &FixedSpace::new("/src", 0, 0),
                    AccountingConfig::default(),
                )
                .unwrap();
                black_box(plan.total_update_size());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_toggle(c: &mut Criterion) {
    let (mut copies, mut deletes) = batch(50_000);
    let mut plan = PlanAccounting::with_options(
        PlanInput::new("/src", "/dst", &mut copies, &mut deletes),
        &NeverCancel,
        &FixedSpace::new("/src", 0, 0),
        AccountingConfig::default(),
    )
    .unwrap();

    c.bench_function("toggle_copy", |b| {
        let mut selected = false;
        b.iter(|| {
            plan.set_copy_selected(black_box(1234), selected);
            selected = !selected;
        })
    });
}

criterion_group!(benches, bench_construction, bench_toggle);
criterion_main!(benches);
