use std::path::PathBuf;
use std::time::Duration;
use syncplan_lib::core::{FixedSpace, NeverCancel};
use syncplan_lib::{
    AccountingConfig, CopyAction, DeleteAction, Direction, FileEntry, Location, PlanAccounting,
    PlanError, PlanInput, Side,
};
use tokio_util::sync::CancellationToken;

fn batch(count: usize) -> (Vec<CopyAction>, Vec<DeleteAction>) {
    let copies = (0..count)
        .map(|i| {
            let path = format!("dir{}/file{}.dat", (i / 2) % 17, i / 2);
            let direction = if i % 2 == 0 {
                Direction::ToSource
            } else {
                Direction::ToDestination
            };
            CopyAction::new(
                path.clone(),
                FileEntry::new(PathBuf::from("a").join(&path), 1000 + i as u64),
                FileEntry::new(PathBuf::from("b").join(&path), (i % 3) as u64 * 100),
                direction,
                i % 3 == 0,
            )
        })
        .collect();
    let deletes = (0..count / 4)
        .map(|i| {
            let location = if i % 2 == 0 {
                Location::AtSource
            } else {
                Location::AtDestination
            };
            DeleteAction::new(FileEntry::new(format!("stale{}", i), 10 * i as u64), location)
                .with_selected(i % 5 != 0)
        })
        .collect();
    (copies, deletes)
}

#[tokio::test]
async fn plan_built_on_worker_thread() {
    let token = CancellationToken::new();
    let worker_token = token.clone();

    let summary = tokio::task::spawn_blocking(move || {
        let (mut copies, mut deletes) = batch(2_000);
        let mut plan = PlanAccounting::with_options(
            PlanInput::new("/src", "/dst", &mut copies, &mut deletes).bidirectional(true),
            &worker_token,
            &FixedSpace::new("/src", 1 << 40, 1 << 40),
            AccountingConfig::default(),
        )?;

        // 模拟界面层把所有冲突改为保留备份方向
        let groups = plan.conflicts().to_vec();
        for group in &groups {
            plan.set_copy_selected(group.deselected, true);
            plan.set_copy_selected(group.kept(), false);
        }
        Ok::<_, PlanError>(plan.summary())
    })
    .await
    .unwrap()
    .unwrap();

    assert!(summary.bidirectional);
    assert!(summary.conflicts > 0);
    assert!(summary.enough_space);
    assert_eq!(summary.copy_actions, 2_000);
    assert_eq!(
        summary.derived.total_update_size,
        summary.derived.source.update_size + summary.derived.destination.update_size
    );
    let json = serde_json::to_value(&summary).unwrap();
    assert!(json.get("copyActionsSelected").is_some());
    assert!(json["totals"]["destination"].get("newSize").is_some());
}

#[tokio::test]
async fn cancelled_token_aborts_construction() {
    let token = CancellationToken::new();
    let worker_token = token.clone();
    token.cancel();

    let result = tokio::task::spawn_blocking(move || {
        let (mut copies, mut deletes) = batch(500);
        PlanAccounting::with_options(
            PlanInput::new("/src", "/dst", &mut copies, &mut deletes),
            &worker_token,
            &FixedSpace::new("/src", 0, 0),
            AccountingConfig::default(),
        )
        .map(|plan| plan.copy_actions_selected())
    })
    .await
    .unwrap();

    assert_eq!(result, Err(PlanError::OperationCancelled));
}

#[tokio::test]
async fn cancel_from_controller_while_scanning() {
    let token = CancellationToken::new();
    let worker_token = token.clone();

    let worker = tokio::task::spawn_blocking(move || {
        let (mut copies, mut deletes) = batch(50_000);
        let mut attempts = 0;
        // 控制端取消前一直重复全量统计
        loop {
            attempts += 1;
            let result = PlanAccounting::with_options(
                PlanInput::new("/src", "/dst", &mut copies, &mut deletes).bidirectional(true),
                &worker_token,
                &FixedSpace::new("/src", 0, 0),
                AccountingConfig::default(),
            )
            .map(|_| ());
            if let Err(e) = result {
                return (e, attempts);
            }
        }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();

    let (error, attempts) = worker.await.unwrap();
    assert_eq!(error, PlanError::OperationCancelled);
    assert!(attempts >= 1);
}

#[test]
fn damaged_files_alone_are_worth_showing() {
    let mut copies: Vec<CopyAction> = Vec::new();
    let mut deletes: Vec<DeleteAction> = Vec::new();
    let plan = PlanAccounting::with_options(
        PlanInput::new("/src", "/dst", &mut copies, &mut deletes).damaged_files(
            vec![],
            vec![PathBuf::from("broken.bin")],
            vec![],
        ),
        &NeverCancel,
        &FixedSpace::new("/src", 10, 10),
        AccountingConfig::default(),
    )
    .unwrap();

    assert!(plan.has_anything());
    assert!(!plan.has_conflicts());
    assert!(plan.has_damaged_files());
    assert_eq!(plan.corrupt_files(Side::Destination).len(), 1);
    assert_eq!(plan.net_sum(Side::Source), 0);
}
