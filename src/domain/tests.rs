use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use super::*;
use crate::args::SiteStressArgs;
use crate::engine::{Clock, ManualClock};
use crate::error::{AppError, AppResult, ValidationError};

fn expect(condition: bool, message: &'static str) -> AppResult<()> {
    if condition {
        Ok(())
    } else {
        Err(AppError::validation(ValidationError::from(message)))
    }
}

fn check_alternation(transitions: &[Transition]) -> AppResult<()> {
    for (index, transition) in transitions.iter().enumerate() {
        let expected = if index % 2 == 0 {
            Status::Down
        } else {
            Status::Up
        };
        if transition.entered() != expected {
            return Err(AppError::validation(format!(
                "Entry {} is {}, expected {}",
                index,
                transition.entered(),
                expected
            )));
        }
    }
    Ok(())
}

fn state(name: &str) -> DomainState {
    DomainState::new(Domain::with_url(name, &format!("https://{}", name)))
}

/// Records a request that completed at the instant it was issued.
fn record_instant(
    domain: &DomainState,
    verdict: Verdict,
    clock: &ManualClock,
) -> Option<Transition> {
    let now = clock.now();
    domain.record_outcome(verdict, now, now)
}

const OVERLOADED: Verdict = Verdict::Failure(FailureCause::Status(503));

#[test]
fn default_policy_classification_table() -> AppResult<()> {
    let policy = ClassificationPolicy::default();
    let cases = [
        (RequestResult::Status(200), false),
        (RequestResult::Status(301), false),
        (RequestResult::Status(404), false),
        (RequestResult::Status(429), true),
        (RequestResult::Status(500), true),
        (RequestResult::Status(503), true),
        (RequestResult::Transport(TransportError::Timeout), true),
        (RequestResult::Transport(TransportError::Connect), true),
        (RequestResult::Transport(TransportError::Other), true),
    ];
    for (result, fails) in cases {
        if policy.classify(result).is_failure() != fails {
            return Err(AppError::validation(format!(
                "Unexpected verdict for {:?}",
                result
            )));
        }
    }
    Ok(())
}

#[test]
fn policy_knobs_tighten_classification() -> AppResult<()> {
    let strict = ClassificationPolicy {
        client_errors_fail: true,
        extra_failures: BTreeSet::from([302]),
    };
    expect(
        strict.classify(RequestResult::Status(404)) == Verdict::Failure(FailureCause::Status(404)),
        "Expected 404 to fail with client_errors_fail",
    )?;
    expect(
        strict.classify(RequestResult::Status(302)).is_failure(),
        "Expected extra failure status to fail",
    )?;
    expect(
        !strict.classify(RequestResult::Status(200)).is_failure(),
        "Expected 200 to succeed",
    )
}

#[test]
fn failure_cause_descriptions() -> AppResult<()> {
    expect(
        FailureCause::Status(503).to_string() == "status 503",
        "Unexpected status description",
    )?;
    expect(
        FailureCause::Transport(TransportError::Timeout).to_string() == "timeout",
        "Unexpected timeout description",
    )?;
    expect(
        FailureCause::Transport(TransportError::Connect).to_string() == "connection error",
        "Unexpected connect description",
    )
}

#[test]
fn success_while_up_records_nothing() -> AppResult<()> {
    let clock = ManualClock::new();
    let domain = state("steady.example");
    for _ in 0..10 {
        expect(
            record_instant(&domain, Verdict::Success, &clock).is_none(),
            "Success while UP must not transition",
        )?;
    }
    let snapshot = domain.snapshot();
    expect(snapshot.transitions.is_empty(), "Expected empty log")?;
    expect(snapshot.status == Status::Up, "Expected UP")?;
    expect(
        snapshot.counters
            == Counters {
                total: 10,
                success: 10,
                failure: 0,
            },
        "Unexpected counters",
    )
}

#[test]
fn repeated_failures_fire_one_down() -> AppResult<()> {
    let clock = ManualClock::new();
    let domain = state("flaky.example");
    let first = record_instant(&domain, OVERLOADED, &clock);
    expect(
        matches!(first, Some(Transition::Down { cause: FailureCause::Status(503), .. })),
        "Expected DOWN on first failure",
    )?;
    for _ in 0..5 {
        clock.advance(Duration::from_millis(100));
        expect(
            record_instant(&domain, OVERLOADED, &clock).is_none(),
            "Failure while DOWN must not transition",
        )?;
    }
    let snapshot = domain.snapshot();
    expect(snapshot.transitions.len() == 1, "Expected exactly one entry")?;
    expect(snapshot.status == Status::Down, "Expected DOWN")?;
    expect(snapshot.down_since == Some(clock.origin().wall), "Expected down-since at first failure")?;
    expect(domain.is_down(), "Expected is_down")
}

#[test]
fn recovery_records_downtime() -> AppResult<()> {
    let clock = ManualClock::new();
    let domain = state("recovering.example");
    record_instant(&domain, OVERLOADED, &clock);
    clock.advance(Duration::from_millis(10_400));
    record_instant(&domain, OVERLOADED, &clock);
    clock.advance(Duration::from_millis(200));

    let recovered = record_instant(&domain, Verdict::Success, &clock);
    let Some(Transition::Up { downtime, .. }) = recovered else {
        return Err(AppError::validation("Expected UP transition"));
    };
    expect(downtime == Duration::from_millis(10_600), "Unexpected downtime")?;

    let snapshot = domain.snapshot();
    expect(snapshot.status == Status::Up, "Expected UP")?;
    expect(snapshot.down_since.is_none(), "down-since must clear when UP")?;
    check_alternation(&snapshot.transitions)?;
    let last = snapshot
        .transitions
        .last()
        .ok_or_else(|| AppError::validation("Expected log entries"))?;
    expect(
        last.describe("recovering.example").ends_with("is back ONLINE (was down 11s)"),
        "Unexpected UP description",
    )
}

#[test]
fn failure_issued_before_recovery_is_stale() -> AppResult<()> {
    let clock = ManualClock::new();
    let domain = state("lagging.example");
    record_instant(&domain, OVERLOADED, &clock);

    clock.advance(Duration::from_millis(900));
    let in_flight = clock.now();
    clock.advance(Duration::from_millis(100));
    let issued_down = clock.now();
    clock.advance(Duration::from_millis(50));
    expect(
        domain
            .record_outcome(Verdict::Success, issued_down, clock.now())
            .is_some(),
        "Expected UP from a request issued while DOWN",
    )?;

    clock.advance(Duration::from_millis(150));
    expect(
        domain.record_outcome(OVERLOADED, in_flight, clock.now()).is_none(),
        "A failure issued before recovery must not fire DOWN",
    )?;
    expect(domain.status() == Status::Up, "Expected to stay UP")?;
    expect(
        domain.counters()
            == Counters {
                total: 3,
                success: 1,
                failure: 2,
            },
        "Stale outcomes must still be counted",
    )?;

    expect(
        record_instant(&domain, OVERLOADED, &clock).is_some(),
        "A failure issued after recovery must fire DOWN",
    )?;
    let kinds: Vec<Status> = domain
        .snapshot()
        .transitions
        .iter()
        .map(Transition::entered)
        .collect();
    expect(
        kinds == [Status::Down, Status::Up, Status::Down],
        "Unexpected transition sequence",
    )
}

#[test]
fn success_issued_before_outage_is_stale() -> AppResult<()> {
    let clock = ManualClock::new();
    let domain = state("slow.example");
    let early = clock.now();
    clock.advance(Duration::from_millis(300));
    let failed_at = clock.now();
    domain.record_outcome(OVERLOADED, failed_at, failed_at);

    clock.advance(Duration::from_millis(200));
    expect(
        domain.record_outcome(Verdict::Success, early, clock.now()).is_none(),
        "A success issued before the outage must not fire UP",
    )?;
    expect(domain.is_down(), "Expected to stay DOWN")?;
    expect(
        domain.snapshot().down_since == Some(failed_at.wall),
        "down-since must stay at the first failure",
    )
}

#[test]
fn concurrent_outcomes_keep_log_alternating() -> AppResult<()> {
    const THREADS: u64 = 8;
    const PER_THREAD: u64 = 2_000;

    let clock = Arc::new(ManualClock::new());
    let domain = Arc::new(state("contended.example"));
    std::thread::scope(|scope| {
        for thread in 0..THREADS {
            let clock = Arc::clone(&clock);
            let domain = Arc::clone(&domain);
            scope.spawn(move || {
                for step in 0..PER_THREAD {
                    let verdict = if (step.wrapping_add(thread)) % 3 == 0 {
                        OVERLOADED
                    } else {
                        Verdict::Success
                    };
                    record_instant(&domain, verdict, &clock);
                }
            });
        }
    });

    let snapshot = Arc::clone(&domain).into_snapshot();
    expect(snapshot.counters.is_settled(), "total must equal success + failure")?;
    expect(
        snapshot.counters.total == THREADS.saturating_mul(PER_THREAD),
        "No update may be lost",
    )?;
    check_alternation(&snapshot.transitions)?;
    expect(
        (snapshot.status == Status::Down) == snapshot.down_since.is_some(),
        "down-since must exist iff DOWN",
    )?;
    let ends_down = snapshot
        .transitions
        .last()
        .is_some_and(|last| last.entered() == Status::Down);
    expect(
        ends_down == (snapshot.status == Status::Down),
        "Final flag must match the last log entry",
    )
}

#[test]
fn into_snapshot_takes_unique_state() -> AppResult<()> {
    let clock = ManualClock::new();
    let domain = Arc::new(state("owned.example"));
    record_instant(&domain, OVERLOADED, &clock);
    let shared = Arc::clone(&domain);

    let while_shared = Arc::clone(&domain).into_snapshot();
    drop(shared);
    let owned = domain.into_snapshot();
    expect(while_shared == owned, "Snapshots must agree")
}

#[test]
fn run_config_normalizes_domains() -> AppResult<()> {
    let args = SiteStressArgs::try_parse_from([
        "sitestress",
        "-d",
        "https://a.example/, http://b.example.",
        "-t",
        "2",
        "--fail-status",
        "404",
    ])?;
    let config = RunConfig::from_args(&args)?;
    expect(
        config.domains == ["a.example", "b.example"],
        "Expected normalized domains",
    )?;
    expect(config.duration == Duration::from_secs(120), "Expected 2 minutes")?;
    expect(config.workers() == 500, "Expected multi-domain heuristic")?;
    expect(config.total_workers() == 1_000, "Expected 1000 workers total")?;
    expect(
        config.policy.extra_failures.contains(&404),
        "Expected extra failure status",
    )
}

#[test]
fn run_config_worker_override_and_single_domain() -> AppResult<()> {
    let single = RunConfig::new(&["example.com".to_owned()], Duration::from_secs(5))?;
    expect(single.workers() == 1_000, "Expected single-domain heuristic")?;

    let args = SiteStressArgs::try_parse_from(["sitestress", "-d", "example.com", "-t", "5", "-w", "7"])?;
    let overridden = RunConfig::from_args(&args)?;
    expect(overridden.workers() == 7, "Expected worker override")
}

#[test]
fn run_config_rejects_missing_inputs() -> AppResult<()> {
    let no_duration = SiteStressArgs::try_parse_from(["sitestress", "-d", "example.com"])?;
    expect(
        matches!(
            RunConfig::from_args(&no_duration),
            Err(AppError::Validation(ValidationError::MissingDuration))
        ),
        "Expected missing duration",
    )?;
    let no_domain = SiteStressArgs::try_parse_from(["sitestress", "-t", "5"])?;
    expect(
        matches!(
            RunConfig::from_args(&no_domain),
            Err(AppError::Validation(ValidationError::MissingDomains))
        ),
        "Expected missing domains",
    )?;
    expect(
        matches!(
            RunConfig::new(&["example.com".to_owned(), "https://".to_owned()], Duration::from_secs(1)),
            Err(AppError::Validation(ValidationError::EmptyDomain { index: 1 }))
        ),
        "Expected empty domain entry",
    )
}
