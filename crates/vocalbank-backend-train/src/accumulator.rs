//! Running per-class sums for the acoustic model.
//!
//! Every class keeps elementwise sums of its spectral and aperiodicity rows
//! plus a frame count. Accumulators built over disjoint sets of utterances
//! merge by adding sums and counts, so the corpus can be sharded freely; the
//! division happens once in [`ModelAccumulator::finish`].

use std::collections::BTreeMap;

use ndarray::{Array1, ArrayView1};
use vocalbank_spec::{
    AcousticModel, Diagnostic, PhonemeClass, PhonemeStats, PipelineConfig, WarningCode,
    DEFAULT_BIN_COUNT, FRAME_PERIOD_MS, MODEL_VERSION,
};

use crate::features::LabeledUtterance;
use crate::report::BuildReport;

/// Options for a model build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    /// Pool breath frames into the silence statistics.
    pub merge_silence_and_breath: bool,
    /// Frame period recorded in the model.
    pub frame_period_ms: f64,
    /// Bin count for the fallback vectors when no utterance reveals one.
    pub fallback_bins: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            merge_silence_and_breath: true,
            frame_period_ms: FRAME_PERIOD_MS,
            fallback_bins: DEFAULT_BIN_COUNT,
        }
    }
}

impl BuildOptions {
    /// Options taken from a pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            merge_silence_and_breath: config.merge_silence_and_breath,
            frame_period_ms: config.frame_period_ms,
            fallback_bins: config.bins(),
        }
    }
}

#[derive(Debug, Clone)]
struct Bucket {
    sp_sum: Array1<f64>,
    ap_sum: Array1<f64>,
    frames: usize,
}

impl Bucket {
    fn new(bins: usize) -> Self {
        Self {
            sp_sum: Array1::zeros(bins),
            ap_sum: Array1::zeros(bins),
            frames: 0,
        }
    }

    fn add(&mut self, sp: ArrayView1<'_, f64>, ap: ArrayView1<'_, f64>) {
        self.sp_sum += &sp;
        self.ap_sum += &ap;
        self.frames += 1;
    }

    fn absorb(&mut self, other: Bucket) {
        self.sp_sum += &other.sp_sum;
        self.ap_sum += &other.ap_sum;
        self.frames += other.frames;
    }

    fn mean(&self) -> PhonemeStats {
        let n = self.frames as f64;
        PhonemeStats::new(
            self.sp_sum.mapv(|v| v / n).to_vec(),
            self.ap_sum.mapv(|v| v / n).to_vec(),
            self.frames,
        )
    }
}

fn merge_bucket(slot: &mut Option<Bucket>, other: Option<Bucket>) {
    match (slot.as_mut(), other) {
        (Some(mine), Some(theirs)) => mine.absorb(theirs),
        (None, Some(theirs)) => *slot = Some(theirs),
        (_, None) => {}
    }
}

/// Accumulates frames from admitted utterances.
#[derive(Debug, Clone)]
pub struct ModelAccumulator {
    options: BuildOptions,
    bins: Option<usize>,
    seen_bins: Option<usize>,
    phonemes: BTreeMap<String, Bucket>,
    silence: Option<Bucket>,
    breath: Option<Bucket>,
    admitted: Vec<String>,
    excluded: Vec<String>,
    warnings: Vec<Diagnostic>,
}

impl ModelAccumulator {
    /// Creates an accumulator that takes its bin count from the first
    /// admitted utterance.
    pub fn new(options: BuildOptions) -> Self {
        Self::with_bins(options, None)
    }

    /// Creates an accumulator with a fixed bin count; utterances with any other
    /// bin count are excluded. Shards of one build must share a bin count.
    pub fn with_bins(options: BuildOptions, bins: Option<usize>) -> Self {
        Self {
            options,
            bins,
            seen_bins: bins,
            phonemes: BTreeMap::new(),
            silence: None,
            breath: None,
            admitted: Vec::new(),
            excluded: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Records a diagnostic produced outside the accumulator (e.g. by the
    /// feature cache loader) so it lands in the build report.
    pub fn note(&mut self, diagnostic: Diagnostic) {
        self.warnings.push(diagnostic);
    }

    fn exclude(&mut self, name: &str, code: WarningCode, message: String) -> bool {
        self.warnings
            .push(Diagnostic::with_context(code, message, name.to_string()));
        self.excluded.push(name.to_string());
        false
    }

    /// Adds an utterance if it passes admission; returns whether it was admitted.
    ///
    /// An utterance is admitted whole or not at all. It is excluded when its
    /// label count differs from its frame count, when its f0/sp/ap arrays
    /// disagree, when `sp` or `ap` holds a NaN or infinite value, or when its
    /// bin count differs from the corpus.
    pub fn admit(&mut self, utterance: &LabeledUtterance) -> bool {
        let name = utterance.name();
        let features = &utterance.features;
        let frames = features.frame_count();

        if frames > 0 && self.seen_bins.is_none() {
            self.seen_bins = Some(features.bins());
        }

        if let Some(message) = features.shape_mismatch() {
            return self.exclude(name, WarningCode::UtteranceLengthMismatch, message);
        }
        if utterance.labels.len() != frames {
            return self.exclude(
                name,
                WarningCode::UtteranceLengthMismatch,
                format!(
                    "{} phoneme labels for {} feature frames; utterance ignored",
                    utterance.labels.len(),
                    frames
                ),
            );
        }
        if let Some(message) = features.non_finite_value() {
            return self.exclude(
                name,
                WarningCode::NonFiniteFeature,
                format!("{}; utterance ignored", message),
            );
        }
        if frames > 0 {
            match self.bins {
                Some(bins) if bins != features.bins() => {
                    return self.exclude(
                        name,
                        WarningCode::BinCountMismatch,
                        format!(
                            "{} spectral bins, corpus has {}; utterance ignored",
                            features.bins(),
                            bins
                        ),
                    );
                }
                Some(_) => {}
                None => self.bins = Some(features.bins()),
            }
        }

        let bins = features.bins();
        let merge = self.options.merge_silence_and_breath;
        for (i, label) in utterance.labels.iter().enumerate() {
            if label.is_empty() {
                continue;
            }
            let bucket = match PhonemeClass::of(label) {
                PhonemeClass::Silence => self.silence.get_or_insert_with(|| Bucket::new(bins)),
                PhonemeClass::Breath if merge => {
                    self.silence.get_or_insert_with(|| Bucket::new(bins))
                }
                PhonemeClass::Breath => self.breath.get_or_insert_with(|| Bucket::new(bins)),
                PhonemeClass::Phonetic => self
                    .phonemes
                    .entry(label.to_string())
                    .or_insert_with(|| Bucket::new(bins)),
            };
            bucket.add(features.sp_row(i), features.ap_row(i));
        }

        tracing::debug!(utterance = name, frames, "utterance admitted");
        self.admitted.push(name.to_string());
        true
    }

    /// Folds another accumulator into this one.
    ///
    /// If the two disagree on bin count, everything the other admitted is
    /// excluded instead.
    pub fn merge(&mut self, other: ModelAccumulator) {
        if self.seen_bins.is_none() {
            self.seen_bins = other.seen_bins;
        }
        self.warnings.extend(other.warnings);
        self.excluded.extend(other.excluded);

        match (self.bins, other.bins) {
            (Some(mine), Some(theirs)) if mine != theirs => {
                for name in other.admitted {
                    self.warnings.push(Diagnostic::with_context(
                        WarningCode::BinCountMismatch,
                        format!("{} spectral bins, corpus has {}; utterance ignored", theirs, mine),
                        name.clone(),
                    ));
                    self.excluded.push(name);
                }
                return;
            }
            (None, Some(theirs)) => self.bins = Some(theirs),
            _ => {}
        }

        self.admitted.extend(other.admitted);
        for (label, bucket) in other.phonemes {
            match self.phonemes.get_mut(&label) {
                Some(mine) => mine.absorb(bucket),
                None => {
                    self.phonemes.insert(label, bucket);
                }
            }
        }
        merge_bucket(&mut self.silence, other.silence);
        merge_bucket(&mut self.breath, other.breath);
    }

    /// Divides sums into means and assembles the model and its report.
    pub fn finish(mut self) -> (AcousticModel, BuildReport) {
        let bins = self
            .bins
            .or(self.seen_bins)
            .unwrap_or(self.options.fallback_bins);

        let phonemes: BTreeMap<String, PhonemeStats> = self
            .phonemes
            .iter()
            .map(|(label, bucket)| (label.clone(), bucket.mean()))
            .collect();

        let silence_frames = self.silence.as_ref().map_or(0, |b| b.frames);
        let trained_silence = self
            .silence
            .as_ref()
            .filter(|b| b.frames > 0)
            .map(Bucket::mean);
        let (silence, silence_is_fallback) = match trained_silence {
            Some(stats) => (stats, false),
            None => {
                self.warnings.push(Diagnostic::new(
                    WarningCode::EmptyTrainingCorpus,
                    format!(
                        "no silence/breath frames found; using near-silent fallback ({} bins)",
                        bins
                    ),
                ));
                (PhonemeStats::silence_fallback(bins), true)
            }
        };

        let breath = self
            .breath
            .as_ref()
            .filter(|b| b.frames > 0)
            .map(Bucket::mean);
        let breath_frames = breath.as_ref().map_or(0, |b| b.frames);

        for (label, stats) in &phonemes {
            tracing::info!(phoneme = %label, frames = stats.frames, "phoneme averaged");
        }

        let model = AcousticModel {
            version: MODEL_VERSION,
            bins,
            frame_period_ms: self.options.frame_period_ms,
            merge_silence_and_breath: self.options.merge_silence_and_breath,
            phonemes,
            silence,
            breath,
            silence_is_fallback,
        };

        self.admitted.sort();
        self.excluded.sort();
        let report = BuildReport {
            bins,
            admitted: self.admitted,
            excluded: self.excluded,
            phoneme_frames: model
                .phonemes
                .iter()
                .map(|(k, v)| (k.clone(), v.frames))
                .collect(),
            silence_frames,
            breath_frames,
            silence_is_fallback,
            warnings: self.warnings,
        };

        (model, report)
    }
}
