//! Drift check pipeline
//!
//! Resolve pairs, compare each pair, persist, upload, notify.
//!
//! ## Logging Ownership
//!
//! The engine owns lifecycle logging for the run and for each pair:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Core and store use only `tracing::debug!()` for internal details.

use crate::collaborators::Collaborators;
use crate::config::{OutputConfig, RunConfig};
use chrono::{SecondsFormat, Utc};
use stackdrift_core::errors::{ExError, ExErrorKind, Result};
use stackdrift_core::model::{ComparisonResult, RunSummary, TemplatePair};
use stackdrift_core::report::{
    build_notification, CLEAN_RUN_MARKER, COMPLETED_MARKER, NOTIFIED_MARKER,
};
use stackdrift_core::resolver::PairResolver;
use stackdrift_core::template::{decode_template_body, load_local_template};
use stackdrift_core::{canonicalize, compare, CanonicalForm};
use stackdrift_core::{log_op_end, log_op_error, log_op_start};
use stackdrift_store::output::{OutputLayout, TemplateSide, META_FILE_NAME};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: RunSummary,
    /// True when a notification was published
    pub notified: bool,
}

/// Canonical documents of a pair that compared successfully
struct Compared {
    result: ComparisonResult,
    local: CanonicalForm,
    remote: CanonicalForm,
}

/// Run one drift check
///
/// Pairs are processed in resolver order. A failure inside one pair is
/// recorded on that pair's result and the run moves on.
///
/// Human-readable progress (the pretty summary and the status markers) is
/// written to `out`.
///
/// # Errors
///
/// - Invalid configuration or pair resolution failure (nothing is written)
/// - Output write, upload, or publish failure
pub fn run_drift_check(
    config: &RunConfig,
    resolver: &dyn PairResolver,
    collaborators: Collaborators<'_>,
    out: &mut dyn Write,
) -> Result<RunOutcome> {
    log_op_start!("run_drift_check", branch = %config.branch);
    let start = Instant::now();

    let outcome = run_impl(config, resolver, collaborators, out).map_err(|e| {
        log_op_error!(
            "run_drift_check",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "run_drift_check",
        duration_ms = start.elapsed().as_millis() as u64,
        branch = %config.branch,
        pair_count = outcome.summary.items.len() as u64,
        diff_count = outcome.summary.diff_count as u64,
        error_count = outcome.summary.error_count as u64,
    );

    Ok(outcome)
}

fn run_impl(
    config: &RunConfig,
    resolver: &dyn PairResolver,
    collaborators: Collaborators<'_>,
    out: &mut dyn Write,
) -> Result<RunOutcome> {
    config.validate()?;
    let pairs = resolver.resolve()?;
    let checked_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false);

    let layout = config.output.as_ref().map(|o| OutputLayout::new(&o.dir));
    if let Some(layout) = &layout {
        ensure_unique_document_names(&pairs)?;
        layout.prepare()?;
    }

    let mut items = Vec::with_capacity(pairs.len());
    for pair in pairs {
        match check_pair(&config.template_root, &pair, collaborators) {
            Ok(compared) => {
                if let Some(layout) = &layout {
                    let stem = pair.stem();
                    layout.write_canonical(TemplateSide::Github, stem, &compared.local)?;
                    layout.write_canonical(TemplateSide::Cfn, stem, &compared.remote)?;
                }
                items.push(compared.result);
            }
            Err(e) => items.push(ComparisonResult::failed(pair, &error_text(&e))),
        }
    }

    let summary = RunSummary::from_results(
        checked_at,
        config.branch.clone(),
        config.stack_name_label.clone(),
        items,
    );

    if let (Some(layout), Some(output)) = (&layout, &config.output) {
        layout.write_meta(&summary)?;
        upload_output(layout, output, collaborators)?;
    }

    writeln!(out, "{}", summary.to_pretty_json()?).map_err(console_error)?;

    let mut notified = false;
    if summary.is_clean() {
        writeln!(out, "{}", CLEAN_RUN_MARKER).map_err(console_error)?;
    } else if let Some(notifier) = collaborators.notifier {
        if let Some(message) = build_notification(&summary) {
            notifier.publish(&message.subject, &message.body)?;
            notified = true;
            writeln!(out, "{}", NOTIFIED_MARKER).map_err(console_error)?;
        }
    }
    writeln!(out, "{}", COMPLETED_MARKER).map_err(console_error)?;

    Ok(RunOutcome { summary, notified })
}

/// Load, fetch, canonicalize and compare one pair
fn check_pair(
    template_root: &Path,
    pair: &TemplatePair,
    collaborators: Collaborators<'_>,
) -> Result<Compared> {
    log_op_start!(
        "check_pair",
        template_path = %pair.local_path,
        stack_name = %pair.remote_identifier
    );
    let start = Instant::now();

    let result = check_pair_impl(template_root, pair, collaborators).map_err(|e| {
        log_op_error!(
            "check_pair",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            template_path = %pair.local_path,
            stack_name = %pair.remote_identifier
        );
        e
    })?;

    log_op_end!(
        "check_pair",
        duration_ms = start.elapsed().as_millis() as u64,
        stack_name = %pair.remote_identifier,
        equal = result.result.equal
    );

    Ok(result)
}

fn check_pair_impl(
    template_root: &Path,
    pair: &TemplatePair,
    collaborators: Collaborators<'_>,
) -> Result<Compared> {
    let local = load_local_template(template_root, &pair.local_path)?;

    let body = collaborators
        .source
        .fetch_template(&pair.remote_identifier)
        .map_err(|e| e.with_stack_name(&pair.remote_identifier))?;
    let remote =
        decode_template_body(body).map_err(|e| e.with_stack_name(&pair.remote_identifier))?;

    let local = canonicalize(&local)?;
    let remote = canonicalize(&remote)?;
    let comparison = compare(&local, &remote);

    Ok(Compared {
        result: ComparisonResult::compared(
            pair.clone(),
            comparison.equal,
            comparison.local_digest,
            comparison.remote_digest,
        ),
        local,
        remote,
    })
}

/// Reject pairs whose canonical documents would land on the same file
fn ensure_unique_document_names(pairs: &[TemplatePair]) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::with_capacity(pairs.len());
    for pair in pairs {
        if let Some(first) = seen.insert(pair.stem(), &pair.local_path) {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("resolve_pairs")
                .with_template_path(&pair.local_path)
                .with_message(format!(
                    "Output name '{}.json' is shared by {} and {}",
                    pair.stem(),
                    first,
                    pair.local_path
                )));
        }
    }
    Ok(())
}

/// Upload `_meta.json` and both canonical directories
fn upload_output(
    layout: &OutputLayout,
    output: &OutputConfig,
    collaborators: Collaborators<'_>,
) -> Result<()> {
    let Some(target) = &output.upload else {
        return Ok(());
    };
    let Some(store) = collaborators.store else {
        return Err(ExError::new(ExErrorKind::Internal)
            .with_op("upload_output")
            .with_message("upload configured without an object store"));
    };

    store.upload_file(&layout.meta_path(), &target.destination(META_FILE_NAME))?;
    for side in [TemplateSide::Github, TemplateSide::Cfn] {
        let key = format!("{}/", side.dir_name());
        store.upload_dir(&layout.side_dir(side), &target.destination(&key))?;
    }

    tracing::debug!(bucket = %target.bucket, prefix = %target.prefix, "uploaded run output");
    Ok(())
}

/// Error text recorded on a failed pair
fn error_text(err: &ExError) -> String {
    if err.message().is_empty() {
        err.to_string()
    } else {
        err.message().to_string()
    }
}

fn console_error(err: std::io::Error) -> ExError {
    stackdrift_core::errors::io_error("write_console", err)
}
