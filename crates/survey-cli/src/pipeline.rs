//! Survey processing pipeline with explicit stages.
//!
//! 1. **Ingest**: read the export, optionally narrowed to one survey
//! 2. **Normalize**: resolve `answer_numeric`/`answer_text` (parallel)
//! 3. **Expand**: split select-all questions into one id per option
//! 4. **Recode**: null out coded-missing values
//! 5. **Output**: pivot to `pivot_n.csv`/`pivot_t.csv`, codebook, `manifest.json`

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use polars::prelude::DataFrame;
use survey_ingest::{
    FileResponseSource, ResponseSource, read_response_table, survey_by_selection, write_csv,
};
use survey_model::{
    ExpandOptions, NormalizationStats, OutputPaths, PivotValue, RecodeOptions, RunManifest,
};
use survey_standards::{
    REFERENCE_KEY_FILE, ReferenceKey, SentinelTable, default_reference_key_path, load_reference_key,
    reference_digest,
};
use survey_transform::{
    AnswerResolver, ParallelOptions, build_codebook, expand, normalize_parallel_with_stats, pivot,
    recode,
};
use tracing::{debug, info, info_span};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const CODEBOOK_FILE: &str = "codebook.csv";
pub const NORMALIZED_FILE: &str = "responses_normalized.csv";

/// Which survey of a multi-survey export to process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SurveyFilter {
    /// Use the file as is.
    #[default]
    All,
    Name(String),
    /// 1-based position in the export's survey list.
    Selection(usize),
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub survey: SurveyFilter,
    pub output_dir: PathBuf,
    pub reference_key: PathBuf,
    /// `None` skips the expansion stage.
    pub expand: Option<ExpandOptions>,
    pub recode: RecodeOptions,
    pub parallel: ParallelOptions,
    pub write_codebook: bool,
    pub write_long: bool,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            survey: SurveyFilter::All,
            output_dir: output_dir.into(),
            reference_key: default_reference_key_path(),
            expand: Some(ExpandOptions::default()),
            recode: RecodeOptions::default(),
            parallel: ParallelOptions::default(),
            write_codebook: false,
            write_long: false,
        }
    }
}

#[derive(Debug)]
pub struct PipelineResult {
    pub manifest: RunManifest,
    pub manifest_path: PathBuf,
    pub stats: NormalizationStats,
}

/// Reference key file: `--reference-dir` first, then `SURVEY_REFERENCE_DIR`, then the packaged key.
pub fn reference_key_path(reference_dir: Option<&Path>) -> PathBuf {
    match reference_dir {
        Some(dir) => dir.join(REFERENCE_KEY_FILE),
        None => default_reference_key_path(),
    }
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Reads a response export, narrowed to one survey when requested.
///
/// Returns the table and the name of the selected survey.
pub fn ingest(input: &Path, survey: &SurveyFilter) -> Result<(DataFrame, Option<String>)> {
    let _span = info_span!("ingest", input = %input.display()).entered();
    match survey {
        SurveyFilter::All => {
            let table = read_response_table(input)
                .with_context(|| format!("read responses: {}", input.display()))?;
            Ok((table, None))
        }
        SurveyFilter::Name(name) => {
            let source = FileResponseSource::open(input)
                .with_context(|| format!("open export: {}", input.display()))?;
            let table = source.fetch(name)?;
            Ok((table, Some(name.clone())))
        }
        SurveyFilter::Selection(selection) => {
            let source = FileResponseSource::open(input)
                .with_context(|| format!("open export: {}", input.display()))?;
            let name = survey_by_selection(&source, *selection)?;
            let table = source.fetch(&name)?;
            Ok((table, Some(name)))
        }
    }
}

pub fn load_key(path: &Path) -> Result<ReferenceKey> {
    load_reference_key(path).with_context(|| format!("load reference key: {}", path.display()))
}

// ============================================================================
// Full run
// ============================================================================

pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineResult> {
    let started = Instant::now();
    let (raw, survey) = ingest(&config.input, &config.survey)?;
    let input_rows = raw.height();
    if input_rows == 0 {
        bail!("no responses in {}", config.input.display());
    }

    let key = load_key(&config.reference_key)?;
    let reference_sha256 = reference_digest(&config.reference_key)?;
    let sentinels = SentinelTable::standard();
    let resolver = AnswerResolver::new(&key, &sentinels);

    let (normalized, stats) = {
        let _span = info_span!("normalize", rows = input_rows).entered();
        normalize_parallel_with_stats(&raw, &resolver, &config.parallel)?
    };

    let expanded = match config.expand {
        Some(options) => {
            let _span = info_span!("expand").entered();
            expand(&normalized, key.select_all_questions(), options)?
        }
        None => normalized,
    };

    let mut long = {
        let _span = info_span!("recode").entered();
        recode(&expanded, config.recode)?
    };

    let _span = info_span!("output", dir = %config.output_dir.display()).entered();
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("create output dir: {}", config.output_dir.display()))?;

    let mut outputs = OutputPaths::default();
    let mut persons = 0;
    let mut questions = 0;
    for value in [PivotValue::Numeric, PivotValue::Text] {
        let mut wide = pivot(&long, value)?;
        persons = wide.height();
        questions = wide.width().saturating_sub(1);
        let path = config.output_dir.join(value.file_name());
        write_csv(&path, &mut wide)?;
        match value {
            PivotValue::Numeric => outputs.pivot_numeric = Some(path),
            PivotValue::Text => outputs.pivot_text = Some(path),
        }
    }
    if config.write_codebook {
        let mut codebook = build_codebook(&long)?;
        let path = config.output_dir.join(CODEBOOK_FILE);
        write_csv(&path, &mut codebook)?;
        outputs.codebook = Some(path);
    }
    if config.write_long {
        let path = config.output_dir.join(NORMALIZED_FILE);
        write_csv(&path, &mut long)?;
        outputs.normalized = Some(path);
    }

    let manifest = RunManifest {
        created_at: Utc::now(),
        input: config.input.clone(),
        survey,
        reference_sha256,
        input_rows,
        output_rows: long.height(),
        persons,
        questions,
        normalization: stats,
        outputs,
    };
    let manifest_path = config.output_dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest).context("serialize manifest")?;
    std::fs::write(&manifest_path, json)
        .with_context(|| format!("write manifest: {}", manifest_path.display()))?;
    debug!(path = %manifest_path.display(), "manifest written");

    info!(
        input_rows,
        output_rows = manifest.output_rows,
        persons,
        questions,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "pipeline complete"
    );
    Ok(PipelineResult {
        manifest,
        manifest_path,
        stats,
    })
}
