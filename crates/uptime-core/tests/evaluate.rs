use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uptime_core::{
    attempt_channel, AttemptResult, FirstSeen, ProbeConfig, ProbeEngine, ProbeError, Prober,
    Reachability, Status, StatusSnapshot, Target,
};

const SITE1_URL: &str = "https://site1.example.com/";
const SITE2_URL: &str = "https://site2.example.com/";
const SITE3_URL: &str = "https://site3.example.com/";

#[derive(Clone)]
enum Reply {
    Code(u16),
    Refused,
}

/// Replies from a per-URL script; the last reply repeats once the script runs out.
struct ScriptedProber {
    script: HashMap<String, Vec<Reply>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedProber {
    fn new(entries: &[(&str, Vec<Reply>)]) -> Self {
        Self {
            script: entries
                .iter()
                .map(|(url, replies)| (url.to_string(), replies.clone()))
                .collect(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, url: &str) -> Result<u16, ProbeError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.entry(url.to_string()).or_insert(0);
            *n += 1;
            *n
        };
        let replies = self.script.get(url).expect("unscripted URL");
        let reply = replies.get(n - 1).or(replies.last()).unwrap();
        match reply {
            Reply::Code(code) => Ok(*code),
            Reply::Refused => Err(ProbeError::Network {
                url: url.to_string(),
                reason: "connection refused".into(),
            }),
        }
    }
}

fn engine(prober: &Arc<ScriptedProber>) -> ProbeEngine {
    ProbeEngine::new(ProbeConfig::default(), prober.clone())
}

fn prior(entries: &[(&str, bool)]) -> StatusSnapshot {
    entries
        .iter()
        .map(|(name, ok)| (name.to_string(), Status { ok: *ok }))
        .collect()
}

#[tokio::test]
async fn site_goes_down_after_three_failures() {
    let prober = Arc::new(ScriptedProber::new(&[(SITE1_URL, vec![Reply::Code(500)])]));
    let targets = vec![Target::new("Site1", SITE1_URL)];

    let eval = engine(&prober)
        .evaluate(&targets, &prior(&[("Site1", true)]))
        .await
        .unwrap();

    assert_eq!(prober.calls(SITE1_URL), 3);
    assert_eq!(eval.status["Site1"], Status::down());
    assert_eq!(eval.events.len(), 1);
    assert_eq!(eval.events[0].name, "Site1");
    assert_eq!(eval.events[0].new_state, Reachability::Down);
    assert_eq!(
        uptime_core::format_report(&eval.events).as_deref(),
        Some("Site1 change status to DOWN.")
    );
    assert_eq!(eval.outcomes[0].attempts, 3);
    assert_eq!(eval.outcomes[0].last_failure.as_deref(), Some("HTTP 500"));
}

#[tokio::test]
async fn new_site_that_is_up_reports_up() {
    let prober = Arc::new(ScriptedProber::new(&[(SITE2_URL, vec![Reply::Code(200)])]));
    let targets = vec![Target::new("Site2", SITE2_URL)];

    let eval = engine(&prober)
        .evaluate(&targets, &StatusSnapshot::new())
        .await
        .unwrap();

    assert_eq!(prober.calls(SITE2_URL), 1);
    assert_eq!(eval.status["Site2"], Status::up());
    assert_eq!(eval.events.len(), 1);
    assert_eq!(eval.events[0].name, "Site2");
    assert_eq!(eval.events[0].new_state, Reachability::Up);
}

#[tokio::test]
async fn new_site_that_is_down_reports_nothing_by_default() {
    let prober = Arc::new(ScriptedProber::new(&[(SITE2_URL, vec![Reply::Refused])]));
    let targets = vec![Target::new("Site2", SITE2_URL)];

    let eval = engine(&prober)
        .evaluate(&targets, &StatusSnapshot::new())
        .await
        .unwrap();

    assert_eq!(eval.status["Site2"], Status::down());
    assert!(eval.events.is_empty());
}

#[tokio::test]
async fn first_seen_policy_is_configurable() {
    let prober = Arc::new(ScriptedProber::new(&[
        (SITE1_URL, vec![Reply::Code(200)]),
        (SITE2_URL, vec![Reply::Code(503)]),
    ]));
    let targets = vec![
        Target::new("Site1", SITE1_URL),
        Target::new("Site2", SITE2_URL),
    ];

    let report_all = ProbeEngine::new(
        ProbeConfig::default().with_first_seen(FirstSeen::ReportAll),
        prober.clone(),
    );
    let eval = report_all
        .evaluate(&targets, &StatusSnapshot::new())
        .await
        .unwrap();
    let states: Vec<_> = eval.events.iter().map(|e| e.new_state).collect();
    assert_eq!(states, vec![Reachability::Up, Reachability::Down]);

    let suppress = ProbeEngine::new(
        ProbeConfig::default().with_first_seen(FirstSeen::Suppress),
        prober.clone(),
    );
    let eval = suppress
        .evaluate(&targets, &StatusSnapshot::new())
        .await
        .unwrap();
    assert!(eval.events.is_empty());
    assert_eq!(eval.status.len(), 2);
}

#[tokio::test]
async fn site_recovers_on_second_attempt() {
    let prober = Arc::new(ScriptedProber::new(&[(
        SITE3_URL,
        vec![Reply::Code(502), Reply::Code(200), Reply::Code(500)],
    )]));
    let targets = vec![Target::new("Site3", SITE3_URL)];

    let eval = engine(&prober)
        .evaluate(&targets, &prior(&[("Site3", false)]))
        .await
        .unwrap();

    assert_eq!(prober.calls(SITE3_URL), 2);
    assert_eq!(eval.outcomes[0].attempts, 2);
    assert!(eval.outcomes[0].last_failure.is_none());
    assert_eq!(eval.status["Site3"], Status::up());
    assert_eq!(eval.events.len(), 1);
    assert_eq!(eval.events[0].new_state, Reachability::Up);
}

#[tokio::test]
async fn transport_errors_consume_attempts() {
    let prober = Arc::new(ScriptedProber::new(&[(
        SITE1_URL,
        vec![Reply::Refused, Reply::Refused, Reply::Code(204)],
    )]));
    let targets = vec![Target::new("Site1", SITE1_URL)];

    let eval = engine(&prober)
        .evaluate(&targets, &prior(&[("Site1", true)]))
        .await
        .unwrap();

    assert_eq!(prober.calls(SITE1_URL), 3);
    assert_eq!(eval.status["Site1"], Status::up());
    assert!(eval.events.is_empty());
}

#[tokio::test]
async fn one_status_per_target_and_events_in_target_order() {
    let prober = Arc::new(ScriptedProber::new(&[
        (SITE1_URL, vec![Reply::Code(404)]),
        (SITE2_URL, vec![Reply::Code(301)]),
        (SITE3_URL, vec![Reply::Refused]),
    ]));
    let targets = vec![
        Target::new("Site3", SITE3_URL),
        Target::new("Site1", SITE1_URL),
        Target::new("Site2", SITE2_URL),
    ];
    let before = prior(&[("Site1", true), ("Site2", false), ("Site3", true), ("Gone", true)]);

    let eval = engine(&prober).evaluate(&targets, &before).await.unwrap();

    assert_eq!(eval.status.len(), targets.len());
    for t in &targets {
        assert!(eval.status.contains_key(&t.name), "missing {}", t.name);
    }
    assert!(!eval.status.contains_key("Gone"));

    let names: Vec<_> = eval.events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Site3", "Site1", "Site2"]);
}

#[tokio::test]
async fn second_pass_with_unchanged_reachability_is_quiet() {
    let prober = Arc::new(ScriptedProber::new(&[
        (SITE1_URL, vec![Reply::Code(200)]),
        (SITE2_URL, vec![Reply::Code(500)]),
    ]));
    let targets = vec![
        Target::new("Site1", SITE1_URL),
        Target::new("Site2", SITE2_URL),
    ];
    let engine = ProbeEngine::new(
        ProbeConfig::default().with_first_seen(FirstSeen::ReportAll),
        prober.clone(),
    );

    let first = engine
        .evaluate(&targets, &StatusSnapshot::new())
        .await
        .unwrap();
    assert_eq!(first.events.len(), 2);

    let second = engine.evaluate(&targets, &first.status).await.unwrap();
    assert!(second.events.is_empty());
    assert_eq!(second.status, first.status);
}

#[tokio::test]
async fn invalid_targets_fail_before_probing() {
    let prober = Arc::new(ScriptedProber::new(&[(SITE1_URL, vec![Reply::Code(200)])]));
    let targets = vec![
        Target::new("Site1", SITE1_URL),
        Target::new("Site1", SITE2_URL),
    ];

    let result = engine(&prober)
        .evaluate(&targets, &StatusSnapshot::new())
        .await;

    assert!(result.is_err());
    assert_eq!(prober.calls(SITE1_URL), 0);
}

#[tokio::test]
async fn attempts_are_streamed() {
    let prober = Arc::new(ScriptedProber::new(&[(
        SITE1_URL,
        vec![Reply::Code(500), Reply::Refused, Reply::Code(200)],
    )]));
    let (tx, mut rx) = attempt_channel();
    let mut engine = engine(&prober).with_attempt_tx(tx);

    engine
        .evaluate(&[Target::new("Site1", SITE1_URL)], &StatusSnapshot::new())
        .await
        .unwrap();
    engine.close_attempts();

    let mut attempts = Vec::new();
    while let Some(a) = rx.recv().await {
        attempts.push(a);
    }
    assert_eq!(attempts.len(), 3);
    assert_eq!(attempts[0].result, AttemptResult::Down { status: 500 });
    assert!(matches!(attempts[1].result, AttemptResult::Error { .. }));
    assert_eq!(attempts[2].result, AttemptResult::Up { status: 200 });
    assert_eq!(
        attempts.iter().map(|a| a.attempt).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    // Still usable after the stream is closed.
    let eval = engine
        .evaluate(&[Target::new("Site1", SITE1_URL)], &StatusSnapshot::new())
        .await
        .unwrap();
    assert_eq!(eval.outcomes.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn backoff_is_applied_between_attempts() {
    let prober = Arc::new(ScriptedProber::new(&[(SITE1_URL, vec![Reply::Code(500)])]));
    let engine = ProbeEngine::new(
        ProbeConfig::default()
            .with_max_attempts(4)
            .with_retry_backoff(std::time::Duration::from_secs(10)),
        prober.clone(),
    );

    let started = tokio::time::Instant::now();
    let eval = engine
        .evaluate(&[Target::new("Site1", SITE1_URL)], &StatusSnapshot::new())
        .await
        .unwrap();

    assert_eq!(prober.calls(SITE1_URL), 4);
    assert_eq!(eval.outcomes[0].attempts, 4);
    assert!(started.elapsed() >= std::time::Duration::from_secs(30));
}
