//! Integration tests for the parallel scheduler

mod common;

use common::FakeNet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use zst_core::{
    DomainTarget, ParallelScheduler, Phase, Protocol, RunEnd, SmartExit, StatusHandle, TargetList,
};

fn targets(hosts: &[&str]) -> TargetList {
    hosts.iter().map(|h| DomainTarget::new(*h)).collect()
}

fn scheduler(net: &Arc<FakeNet>, workers: usize) -> ParallelScheduler {
    ParallelScheduler::new(net.runner(), workers, SmartExit::default(), StatusHandle::disabled())
}

#[tokio::test(start_paused = true)]
async fn test_results_follow_input_order() {
    let net = Arc::new(
        FakeNet::default()
            .ping_ok("10.0.0.1", 5.0)
            .ping_ok("10.0.0.2", 5.0)
            .ping_ok("10.0.0.3", 5.0)
            .delay("10.0.0.1", Duration::from_millis(900))
            .delay("10.0.0.2", Duration::from_millis(400)),
    );
    let list = targets(&["10.0.0.1", "10.0.0.2", "10.0.0.3"]);

    let outcome = scheduler(&net, 8)
        .run("s", &list, 0, &CancellationToken::new())
        .await;

    assert_eq!(outcome.end, RunEnd::Completed);
    assert_eq!(outcome.completed, 3);
    assert_eq!(outcome.available, 3);
    let keys: Vec<_> = outcome.results.keys().map(DomainTarget::as_str).collect();
    assert_eq!(keys, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
}

#[tokio::test]
async fn test_duplicates_count_but_map_once() {
    let net = Arc::new(FakeNet::default().head_ok("a.com", Protocol::Tls12, 200));
    let list = targets(&["a.com", "a.com"]);

    let outcome = scheduler(&net, 4)
        .run("s", &list, 0, &CancellationToken::new())
        .await;

    assert_eq!(outcome.total, 2);
    assert_eq!(outcome.completed, 2);
    assert_eq!(outcome.available, 2);
    assert_eq!(outcome.results.len(), 1);
}

#[tokio::test]
async fn test_smart_exit_stops_hopeless_strategy() {
    let net = Arc::new(FakeNet::default());
    let hosts: Vec<String> = (0..100).map(|i| format!("10.1.0.{i}")).collect();
    let list: TargetList = hosts.iter().map(DomainTarget::new).collect();

    let outcome = scheduler(&net, 500)
        .run("hopeless", &list, 50, &CancellationToken::new())
        .await;

    // threshold 50 - 20 = 30; 100 - 71 = 29 is the first miss
    assert_eq!(outcome.end, RunEnd::Aborted);
    assert_eq!(outcome.completed, 71);
    assert_eq!(outcome.available, 0);
    assert_eq!(outcome.results.len(), 71);
}

#[tokio::test]
async fn test_no_abort_without_best_score() {
    let net = Arc::new(FakeNet::default());
    let hosts: Vec<String> = (0..20).map(|i| format!("10.2.0.{i}")).collect();
    let list: TargetList = hosts.iter().map(DomainTarget::new).collect();

    let outcome = scheduler(&net, 500)
        .run("first", &list, 0, &CancellationToken::new())
        .await;

    assert_eq!(outcome.end, RunEnd::Completed);
    assert_eq!(outcome.completed, 20);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_interrupts_run() {
    let net = Arc::new(
        FakeNet::default()
            .ping_ok("10.3.0.1", 1.0)
            .delay("10.3.0.2", Duration::from_secs(60))
            .delay("10.3.0.3", Duration::from_secs(60)),
    );
    let list = targets(&["10.3.0.1", "10.3.0.2", "10.3.0.3"]);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let outcome = scheduler(&net, 8).run("s", &list, 0, &cancel).await;

    assert_eq!(outcome.end, RunEnd::Interrupted);
    assert_eq!(outcome.completed, 1);
    let keys: Vec<_> = outcome.results.keys().map(DomainTarget::as_str).collect();
    assert_eq!(keys, vec!["10.3.0.1"]);
}

#[tokio::test(start_paused = true)]
async fn test_worker_pool_bounds_concurrency() {
    let mut net = FakeNet::default();
    let hosts: Vec<String> = (0..12).map(|i| format!("10.4.0.{i}")).collect();
    for host in &hosts {
        net = net.ping_ok(host, 1.0).delay(host, Duration::from_millis(50));
    }
    let net = Arc::new(net);
    let list: TargetList = hosts.iter().map(DomainTarget::new).collect();

    let outcome = scheduler(&net, 3)
        .run("s", &list, 0, &CancellationToken::new())
        .await;

    assert_eq!(outcome.completed, 12);
    assert!(net.peak.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn test_panicked_probe_counts_as_unavailable() {
    let net = Arc::new(FakeNet::default().ping_ok("10.5.0.1", 3.0).panic_on("10.5.0.2"));
    let list = targets(&["10.5.0.1", "10.5.0.2"]);

    let outcome = scheduler(&net, 4)
        .run("s", &list, 0, &CancellationToken::new())
        .await;

    assert_eq!(outcome.completed, 2);
    assert_eq!(outcome.available, 1);
    assert_eq!(outcome.results.len(), 1);
}

#[tokio::test]
async fn test_status_reports_progress() {
    let net = Arc::new(FakeNet::default().ping_ok("10.6.0.1", 2.0));
    let list = targets(&["10.6.0.1"]);
    let (status, rx) = StatusHandle::channel();
    let scheduler = ParallelScheduler::new(net.runner(), 4, SmartExit::default(), status);

    scheduler.run("s", &list, 0, &CancellationToken::new()).await;

    let last = rx.borrow().clone().unwrap();
    assert_eq!(last.phase, Phase::Probing);
    assert_eq!(last.completed, 1);
    assert_eq!(last.percent(), 100);
}
