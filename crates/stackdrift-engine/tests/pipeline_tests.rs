//! End-to-end drift check scenarios against in-memory collaborators.
//!
//! Local templates live in a TempDir; remote templates, uploads and
//! notifications are recorded by the fakes below.

use stackdrift_core::errors::{ExError, ExErrorKind, Result};
use stackdrift_core::logging_facility::init_test_capture;
use stackdrift_core::model::{ComparisonStatus, TemplatePair, MAX_ERROR_CHARS};
use stackdrift_core::report::{CLEAN_RUN_MARKER, COMPLETED_MARKER, NOTIFIED_MARKER};
use stackdrift_core::resolver::{ManifestResolver, PairResolver};
use stackdrift_core::template::TemplateBody;
use stackdrift_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_DIFF_COUNT, FIELD_ERROR_COUNT, FIELD_ERR_CODE,
    FIELD_PAIR_COUNT, FIELD_STACK_NAME, FIELD_TEMPLATE_PATH,
};
use stackdrift_engine::{
    run_drift_check, Collaborators, Notifier, ObjectStore, OutputConfig, RunConfig,
    TemplateSource, UploadTarget,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct FixedPairs(Vec<TemplatePair>);

impl PairResolver for FixedPairs {
    fn resolve(&self) -> Result<Vec<TemplatePair>> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct FakeSource {
    bodies: HashMap<String, TemplateBody>,
    calls: RefCell<Vec<String>>,
}

impl FakeSource {
    fn with(mut self, stack_name: &str, body: TemplateBody) -> Self {
        self.bodies.insert(stack_name.to_string(), body);
        self
    }
}

impl TemplateSource for FakeSource {
    fn fetch_template(&self, stack_name: &str) -> Result<TemplateBody> {
        self.calls.borrow_mut().push(stack_name.to_string());
        self.bodies.get(stack_name).cloned().ok_or_else(|| {
            ExError::new(ExErrorKind::ExternalService)
                .with_message(format!("Stack with id {} does not exist", stack_name))
        })
    }
}

#[derive(Default)]
struct RecordingStore {
    uploads: RefCell<Vec<(String, String, bool)>>,
}

impl ObjectStore for RecordingStore {
    fn upload_file(&self, local: &Path, destination: &str) -> Result<()> {
        self.uploads.borrow_mut().push((
            local.display().to_string(),
            destination.to_string(),
            false,
        ));
        Ok(())
    }

    fn upload_dir(&self, local: &Path, destination: &str) -> Result<()> {
        self.uploads.borrow_mut().push((
            local.display().to_string(),
            destination.to_string(),
            true,
        ));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    fail: bool,
    published: RefCell<Vec<(String, String)>>,
}

impl Notifier for RecordingNotifier {
    fn publish(&self, subject: &str, message: &str) -> Result<()> {
        if self.fail {
            return Err(ExError::new(ExErrorKind::ExternalService)
                .with_op("publish_notification")
                .with_message("AuthorizationError"));
        }
        self.published
            .borrow_mut()
            .push((subject.to_string(), message.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn write_template(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn object_body(json: &str) -> TemplateBody {
    match serde_json::from_str(json).unwrap() {
        serde_json::Value::Object(map) => TemplateBody::Object(map),
        other => panic!("not an object: {}", other),
    }
}

fn config(root: &TempDir) -> RunConfig {
    RunConfig::new("dev").with_template_root(root.path())
}

fn run(
    config: &RunConfig,
    resolver: &dyn PairResolver,
    collaborators: Collaborators<'_>,
) -> (Result<stackdrift_engine::RunOutcome>, String) {
    let mut out = Vec::new();
    let result = run_drift_check(config, resolver, collaborators, &mut out);
    (result, String::from_utf8(out).unwrap())
}

// ---------------------------------------------------------------------------
// Clean run
// ---------------------------------------------------------------------------

#[test]
fn test_yaml_matches_object_body_without_notification() {
    let root = TempDir::new().unwrap();
    write_template(root.path(), "t/a.yaml", "Resources: {}\n");
    fs::write(
        root.path().join("pairs.json"),
        r#"[{"GithubPath":"t/a.yaml","StackName":"s-a"}]"#,
    )
    .unwrap();

    let source = FakeSource::default().with("s-a", object_body(r#"{"Resources":{}}"#));
    let notifier = RecordingNotifier::default();
    let resolver = ManifestResolver::new(root.path().join("pairs.json"));

    let (result, stdout) = run(
        &config(&root),
        &resolver,
        Collaborators {
            source: &source,
            store: None,
            notifier: Some(&notifier),
        },
    );
    let outcome = result.unwrap();

    assert!(!outcome.notified);
    assert_eq!(outcome.summary.items.len(), 1);
    let item = &outcome.summary.items[0];
    assert_eq!(item.status, ComparisonStatus::Ok);
    assert!(item.equal);
    assert_eq!(item.local_digest, item.remote_digest);

    assert!(notifier.published.borrow().is_empty());
    assert!(stdout.contains("\"diffCount\": 0"));
    assert!(stdout.contains("\"errorCount\": 0"));
    assert!(stdout.contains(CLEAN_RUN_MARKER));
    assert!(stdout.trim_end().ends_with(COMPLETED_MARKER));
}

#[test]
fn test_shorthand_and_long_form_compare_equal() {
    let root = TempDir::new().unwrap();
    write_template(
        root.path(),
        "t/app.yaml",
        "Outputs:\n  Id:\n    Value: !Ref Bucket\n  Arn:\n    Value: !GetAtt Bucket.Arn\n",
    );
    let source = FakeSource::default().with(
        "s-app",
        TemplateBody::Text(
            r#"{"Outputs":{"Arn":{"Value":{"Fn::GetAtt":["Bucket","Arn"]}},"Id":{"Value":{"Ref":"Bucket"}}}}"#
                .to_string(),
        ),
    );
    let resolver = FixedPairs(vec![TemplatePair::new("t/app.yaml", "s-app")]);

    let (result, _) = run(
        &config(&root),
        &resolver,
        Collaborators {
            source: &source,
            store: None,
            notifier: None,
        },
    );

    assert!(result.unwrap().summary.is_clean());
}

// ---------------------------------------------------------------------------
// Diffs and errors
// ---------------------------------------------------------------------------

#[test]
fn test_single_diff_publishes_once() {
    let root = TempDir::new().unwrap();
    write_template(root.path(), "t/a.yaml", "Resources:\n  Q:\n    Type: AWS::SQS::Queue\n");
    let source = FakeSource::default().with("s-a", object_body(r#"{"Resources":{}}"#));
    let notifier = RecordingNotifier::default();
    let resolver = FixedPairs(vec![TemplatePair::new("t/a.yaml", "s-a")]);

    let (result, stdout) = run(
        &config(&root),
        &resolver,
        Collaborators {
            source: &source,
            store: None,
            notifier: Some(&notifier),
        },
    );
    let outcome = result.unwrap();

    assert!(outcome.notified);
    assert_eq!(outcome.summary.diff_count, 1);
    assert_eq!(outcome.summary.error_count, 0);

    let published = notifier.published.borrow();
    assert_eq!(published.len(), 1);
    let (subject, body) = &published[0];
    assert_eq!(subject, "[CFN Template Diff] dev diffs=1 errors=0");
    assert!(body.contains("github=t/a.yaml"));
    assert!(body.contains("stack=s-a"));
    assert!(stdout.contains(NOTIFIED_MARKER));
}

#[test]
fn test_missing_local_template_recorded_as_error() {
    let root = TempDir::new().unwrap();
    let source = FakeSource::default().with("s-a", object_body(r#"{"Resources":{}}"#));
    let notifier = RecordingNotifier::default();
    let resolver = FixedPairs(vec![TemplatePair::new("t/missing.yaml", "s-a")]);

    let (result, _) = run(
        &config(&root),
        &resolver,
        Collaborators {
            source: &source,
            store: None,
            notifier: Some(&notifier),
        },
    );
    let outcome = result.unwrap();

    let item = &outcome.summary.items[0];
    assert_eq!(item.status, ComparisonStatus::Error);
    assert!(!item.equal);
    assert!(item.local_digest.is_none());
    let error = item.error.as_deref().unwrap();
    assert_eq!(error, "Template not found in repo: t/missing.yaml");

    // Local load fails before the remote side is fetched
    assert!(source.calls.borrow().is_empty());

    let published = notifier.published.borrow();
    assert_eq!(published.len(), 1);
    assert!(published[0].0.ends_with("diffs=0 errors=1"));
    assert!(published[0].1.contains(error));
}

#[test]
fn test_pair_failure_does_not_stop_later_pairs() {
    let root = TempDir::new().unwrap();
    write_template(root.path(), "t/a.yaml", "Resources: {}\n");
    write_template(root.path(), "t/b.json", r#"{"Resources": {}}"#);
    let source = FakeSource::default()
        .with("s-b", object_body(r#"{"Resources":{}}"#))
        .with("s-c", TemplateBody::Unsupported("null"));
    let resolver = FixedPairs(vec![
        TemplatePair::new("t/a.yaml", "s-a"),
        TemplatePair::new("t/b.json", "s-b"),
        TemplatePair::new("t/a.yaml", "s-c"),
    ]);

    let (result, _) = run(
        &config(&root),
        &resolver,
        Collaborators {
            source: &source,
            store: None,
            notifier: None,
        },
    );
    let outcome = result.unwrap();

    let statuses: Vec<_> = outcome.summary.items.iter().map(|i| i.status).collect();
    assert_eq!(
        statuses,
        vec![
            ComparisonStatus::Error,
            ComparisonStatus::Ok,
            ComparisonStatus::Error
        ]
    );
    assert_eq!(
        outcome.summary.items[0].error.as_deref(),
        Some("Stack with id s-a does not exist")
    );
    assert!(outcome.summary.items[2]
        .error
        .as_deref()
        .unwrap()
        .contains("Unexpected TemplateBody type: null"));
    assert_eq!(outcome.summary.error_count, 2);
    assert!(!outcome.notified);
}

#[test]
fn test_publish_failure_is_fatal() {
    let root = TempDir::new().unwrap();
    let source = FakeSource::default();
    let notifier = RecordingNotifier {
        fail: true,
        ..Default::default()
    };
    let resolver = FixedPairs(vec![TemplatePair::new("t/a.yaml", "s-a")]);

    let (result, stdout) = run(
        &config(&root),
        &resolver,
        Collaborators {
            source: &source,
            store: None,
            notifier: Some(&notifier),
        },
    );

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ExternalService);
    assert!(!stdout.contains(COMPLETED_MARKER));
}

// ---------------------------------------------------------------------------
// Resolution failures
// ---------------------------------------------------------------------------

#[test]
fn test_invalid_manifest_aborts_before_any_output() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("pairs.json"),
        r#"[{"GithubPath":"t/a.yaml"}]"#,
    )
    .unwrap();
    let out_dir = root.path().join("out");
    let config = config(&root).with_output(OutputConfig::new(&out_dir));
    let source = FakeSource::default();
    let resolver = ManifestResolver::new(root.path().join("pairs.json"));

    let (result, stdout) = run(
        &config,
        &resolver,
        Collaborators {
            source: &source,
            store: None,
            notifier: None,
        },
    );

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::MissingField);
    assert!(!out_dir.exists());
    assert!(stdout.is_empty());
    assert!(source.calls.borrow().is_empty());
}

// ---------------------------------------------------------------------------
// Persisted output and upload
// ---------------------------------------------------------------------------

#[test]
fn test_output_written_and_uploaded() {
    let root = TempDir::new().unwrap();
    write_template(root.path(), "templates/vpc.yaml", "Resources: {}\n");
    let out_dir = root.path().join("out");
    let config = config(&root).with_output(
        OutputConfig::new(&out_dir).with_upload(UploadTarget::new("drift", "runs/dev/")),
    );
    let source = FakeSource::default().with("acme-dev-vpc", object_body(r#"{"Resources":{}}"#));
    let store = RecordingStore::default();
    let resolver = FixedPairs(vec![TemplatePair::new("templates/vpc.yaml", "acme-dev-vpc")]);

    let (result, _) = run(
        &config,
        &resolver,
        Collaborators {
            source: &source,
            store: Some(&store),
            notifier: None,
        },
    );
    result.unwrap();

    assert_eq!(
        fs::read_to_string(out_dir.join("github/vpc.json")).unwrap(),
        "{\"Resources\":{}}\n"
    );
    assert_eq!(
        fs::read_to_string(out_dir.join("cfn/vpc.json")).unwrap(),
        "{\"Resources\":{}}\n"
    );

    let meta: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("_meta.json")).unwrap()).unwrap();
    assert_eq!(meta["branch"], "dev");
    assert_eq!(meta["items"][0]["githubPath"], "templates/vpc.yaml");
    assert_eq!(meta["items"][0]["stackName"], "acme-dev-vpc");

    let destinations: Vec<_> = store
        .uploads
        .borrow()
        .iter()
        .map(|(_, dest, recursive)| (dest.clone(), *recursive))
        .collect();
    assert_eq!(
        destinations,
        vec![
            ("s3://drift/runs/dev/_meta.json".to_string(), false),
            ("s3://drift/runs/dev/github/".to_string(), true),
            ("s3://drift/runs/dev/cfn/".to_string(), true),
        ]
    );
}

#[test]
fn test_failed_pair_writes_no_canonical_files() {
    let root = TempDir::new().unwrap();
    let out_dir = root.path().join("out");
    let config = config(&root).with_output(OutputConfig::new(&out_dir));
    let source = FakeSource::default();
    let resolver = FixedPairs(vec![TemplatePair::new("t/a.yaml", "s-a")]);

    let (result, _) = run(
        &config,
        &resolver,
        Collaborators {
            source: &source,
            store: None,
            notifier: None,
        },
    );
    result.unwrap();

    assert!(out_dir.join("_meta.json").exists());
    assert!(out_dir.join("github").is_dir());
    assert!(!out_dir.join("github/a.json").exists());
    assert!(!out_dir.join("cfn/a.json").exists());
}

#[test]
fn test_upload_without_store_fails() {
    let root = TempDir::new().unwrap();
    let config = config(&root).with_output(
        OutputConfig::new(root.path().join("out")).with_upload(UploadTarget::new("b", "p/")),
    );
    let source = FakeSource::default();
    let resolver = FixedPairs(Vec::new());

    let (result, _) = run(
        &config,
        &resolver,
        Collaborators {
            source: &source,
            store: None,
            notifier: None,
        },
    );

    assert_eq!(result.unwrap_err().kind(), ExErrorKind::Internal);
}

#[test]
fn test_shared_template_stem_rejected_before_output() {
    let root = TempDir::new().unwrap();
    write_template(root.path(), "envs/dev/app.yaml", "Resources: {}\n");
    write_template(root.path(), "envs/prd/app.yaml", "Resources: {}\n");
    let out_dir = root.path().join("out");
    let config = config(&root).with_output(OutputConfig::new(&out_dir));
    let source = FakeSource::default()
        .with("app-dev", object_body(r#"{"Resources":{}}"#))
        .with("app-prd", object_body(r#"{"Resources":{}}"#));
    let resolver = FixedPairs(vec![
        TemplatePair::new("envs/dev/app.yaml", "app-dev"),
        TemplatePair::new("envs/prd/app.yaml", "app-prd"),
    ]);

    let (result, stdout) = run(
        &config,
        &resolver,
        Collaborators {
            source: &source,
            store: None,
            notifier: None,
        },
    );

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert!(err.message().contains("envs/dev/app.yaml"));
    assert!(err.message().contains("envs/prd/app.yaml"));
    assert!(!out_dir.exists());
    assert!(stdout.is_empty());
    assert!(source.calls.borrow().is_empty());
}

#[test]
fn test_shared_template_stem_allowed_without_output() {
    let root = TempDir::new().unwrap();
    write_template(root.path(), "envs/dev/app.yaml", "Resources: {}\n");
    write_template(root.path(), "envs/prd/app.yaml", "Resources: {}\n");
    let source = FakeSource::default()
        .with("app-dev", object_body(r#"{"Resources":{}}"#))
        .with("app-prd", object_body(r#"{"Resources":{}}"#));
    let resolver = FixedPairs(vec![
        TemplatePair::new("envs/dev/app.yaml", "app-dev"),
        TemplatePair::new("envs/prd/app.yaml", "app-prd"),
    ]);

    let (result, _) = run(
        &config(&root),
        &resolver,
        Collaborators {
            source: &source,
            store: None,
            notifier: None,
        },
    );

    let outcome = result.unwrap();
    assert_eq!(outcome.summary.items.len(), 2);
    assert!(outcome.summary.is_clean());
}

// ---------------------------------------------------------------------------
// Notification content
// ---------------------------------------------------------------------------

struct VerboseSource;

impl TemplateSource for VerboseSource {
    fn fetch_template(&self, _stack_name: &str) -> Result<TemplateBody> {
        Err(ExError::new(ExErrorKind::ExternalService).with_message("x".repeat(800)))
    }
}

#[test]
fn test_long_error_truncated_in_notification() {
    let root = TempDir::new().unwrap();
    write_template(root.path(), "t/a.yaml", "Resources: {}\n");
    let notifier = RecordingNotifier::default();
    let resolver = FixedPairs(vec![TemplatePair::new("t/a.yaml", "s-a")]);

    let (result, _) = run(
        &config(&root),
        &resolver,
        Collaborators {
            source: &VerboseSource,
            store: None,
            notifier: Some(&notifier),
        },
    );
    let outcome = result.unwrap();

    let recorded = outcome.summary.items[0].error.as_deref().unwrap();
    assert_eq!(recorded.len(), MAX_ERROR_CHARS);

    let published = notifier.published.borrow();
    let body = &published[0].1;
    let expected_line = format!(
        "1. github=t/a.yaml  stack=s-a  err={}",
        "x".repeat(MAX_ERROR_CHARS)
    );
    assert!(body.lines().any(|line| line == expected_line));
    assert!(!body.contains(&"x".repeat(MAX_ERROR_CHARS + 1)));
}

// ---------------------------------------------------------------------------
// Lifecycle logging
// ---------------------------------------------------------------------------

#[test]
fn test_run_and_pair_lifecycle_events_logged() {
    let capture = init_test_capture();
    let root = TempDir::new().unwrap();
    write_template(root.path(), "t/logged.yaml", "Resources: {}\n");
    let source = FakeSource::default().with("logged-ok", object_body(r#"{"Resources":{}}"#));
    let resolver = FixedPairs(vec![
        TemplatePair::new("t/logged.yaml", "logged-ok"),
        TemplatePair::new("t/logged-missing.yaml", "logged-missing"),
    ]);
    let config = RunConfig::new("logging-branch").with_template_root(root.path());

    let (result, _) = run(
        &config,
        &resolver,
        Collaborators {
            source: &source,
            store: None,
            notifier: None,
        },
    );
    result.unwrap();

    let pair_events = |stack: &str| -> Vec<_> {
        capture
            .events_for_op("check_pair")
            .into_iter()
            .filter(|e| e.field(FIELD_STACK_NAME) == Some(stack))
            .collect()
    };

    let ok_events = pair_events("logged-ok");
    let kinds: Vec<_> = ok_events.iter().map(|e| e.event.as_deref()).collect();
    assert_eq!(kinds, vec![Some(EVENT_START), Some(EVENT_END)]);
    assert_eq!(ok_events[0].field(FIELD_TEMPLATE_PATH), Some("t/logged.yaml"));

    let failed_events = pair_events("logged-missing");
    let kinds: Vec<_> = failed_events.iter().map(|e| e.event.as_deref()).collect();
    assert_eq!(kinds, vec![Some(EVENT_START), Some(EVENT_END_ERROR)]);
    assert_eq!(failed_events[1].field(FIELD_ERR_CODE), Some("ERR_NOT_FOUND"));

    let run_events: Vec<_> = capture
        .events_for_op("run_drift_check")
        .into_iter()
        .filter(|e| e.field("branch") == Some("logging-branch"))
        .collect();
    let kinds: Vec<_> = run_events.iter().map(|e| e.event.as_deref()).collect();
    assert_eq!(kinds, vec![Some(EVENT_START), Some(EVENT_END)]);
    let run_end = &run_events[1];
    assert_eq!(run_end.field(FIELD_PAIR_COUNT), Some("2"));
    assert_eq!(run_end.field(FIELD_DIFF_COUNT), Some("0"));
    assert_eq!(run_end.field(FIELD_ERROR_COUNT), Some("1"));
}
