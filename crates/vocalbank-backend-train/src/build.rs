//! Model build entry points.

use std::path::Path;

use rayon::prelude::*;
use vocalbank_spec::AcousticModel;

use crate::accumulator::{BuildOptions, ModelAccumulator};
use crate::cache::load_feature_dir;
use crate::error::TrainResult;
use crate::features::LabeledUtterance;
use crate::report::BuildReport;

/// A built model and the report describing how it was built.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// The acoustic model.
    pub model: AcousticModel,
    /// What went in and what was excluded.
    pub report: BuildReport,
}

/// Builds a model from utterances, one after another.
///
/// Never fails: bad utterances are excluded with diagnostics and an empty
/// corpus yields fallback silence vectors.
pub fn build_model(utterances: &[LabeledUtterance], options: &BuildOptions) -> BuildOutcome {
    let mut acc = ModelAccumulator::new(options.clone());
    for utterance in utterances {
        acc.admit(utterance);
    }
    let (model, report) = acc.finish();
    BuildOutcome { model, report }
}

/// Builds a model with utterances sharded across the rayon thread pool.
///
/// The bin count is fixed up front from the first admissible utterance, so
/// shards always merge cleanly. Results match [`build_model`] up to
/// floating-point summation order.
pub fn build_model_parallel(
    utterances: &[LabeledUtterance],
    options: &BuildOptions,
) -> BuildOutcome {
    let bins = utterances.iter().find_map(LabeledUtterance::admissible_bins);
    let seed = || ModelAccumulator::with_bins(options.clone(), bins);

    let acc = utterances
        .par_iter()
        .fold(seed, |mut acc, utterance| {
            acc.admit(utterance);
            acc
        })
        .reduce(seed, |mut left, right| {
            left.merge(right);
            left
        });

    let (model, report) = acc.finish();
    BuildOutcome { model, report }
}

/// Loads every utterance under a feature cache directory and builds a model.
///
/// Loader diagnostics (missing sibling files) are folded into the report.
pub fn build_from_feature_dir(
    dir: &Path,
    options: &BuildOptions,
    parallel: bool,
) -> TrainResult<BuildOutcome> {
    let loaded = load_feature_dir(dir)?;
    let mut outcome = if parallel {
        build_model_parallel(&loaded.utterances, options)
    } else {
        build_model(&loaded.utterances, options)
    };

    let mut warnings = loaded.warnings;
    warnings.append(&mut outcome.report.warnings);
    outcome.report.warnings = warnings;
    outcome.report.excluded.extend(loaded.skipped);
    outcome.report.excluded.sort();
    Ok(outcome)
}
