use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use survey_cli::pipeline::{
    PipelineConfig, PipelineResult, SurveyFilter, ingest, load_key, reference_key_path,
    run_pipeline,
};
use survey_ingest::{FileResponseSource, ResponseSource, read_table, write_csv};
use survey_model::{
    ExpandOptions, NormalizationStats, RecodeOptions, ScaleSpec, ScaleSummary,
};
use survey_standards::{SentinelTable, verify_reference_key, write_reference_digest};
use survey_transform::{
    AnswerResolver, ParallelOptions, build_codebook, normalize_parallel_with_stats, pivot, recode,
    score_with_summary,
};

use crate::cli::{
    CodebookArgs, KeyCommand, NormalizeArgs, PivotArgs, RecodeArgs, RunArgs, ScaleArgs,
    SurveySelection, SurveysArgs,
};

pub fn run_all(args: &RunArgs, reference_dir: Option<&Path>) -> Result<PipelineResult> {
    let output_dir = args.output_dir.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .map(|dir| dir.join("output"))
            .unwrap_or_else(|| PathBuf::from("output"))
    });
    let mut config = PipelineConfig::new(&args.input, output_dir);
    config.survey = survey_filter(&args.selection);
    config.reference_key = reference_key_path(reference_dir);
    config.expand = (!args.no_expand).then(|| ExpandOptions::new(args.select_all.into()));
    config.recode = recode_options(args.strict);
    config.parallel = parallel_options(args.workers);
    config.write_codebook = args.codebook;
    config.write_long = args.keep_long;
    run_pipeline(&config)
}

pub fn run_normalize(args: &NormalizeArgs, reference_dir: Option<&Path>) -> Result<NormalizationStats> {
    let (responses, _) = ingest(&args.input, &survey_filter(&args.selection))?;
    let key = load_key(&reference_key_path(reference_dir))?;
    let sentinels = SentinelTable::standard();
    let resolver = AnswerResolver::new(&key, &sentinels);
    let (mut normalized, stats) =
        normalize_parallel_with_stats(&responses, &resolver, &parallel_options(args.workers))?;
    write_csv(&args.output, &mut normalized)?;
    info!(path = %args.output.display(), rows = normalized.height(), "normalized table written");
    Ok(stats)
}

pub fn run_recode(args: &RecodeArgs) -> Result<()> {
    let _span = info_span!("recode", input = %args.input.display()).entered();
    let mut recoded = recode(args.input.as_path(), recode_options(args.strict))
        .with_context(|| format!("recode {}", args.input.display()))?;
    write_csv(&args.output, &mut recoded)?;
    info!(path = %args.output.display(), rows = recoded.height(), "recoded table written");
    Ok(())
}

pub fn run_pivot(args: &PivotArgs) -> Result<Vec<PathBuf>> {
    let long = read_table(&args.input)
        .with_context(|| format!("read long table: {}", args.input.display()))?;
    let mut written = Vec::new();
    for value in args.value.values() {
        let mut wide = pivot(&long, value)?;
        let path = args.output_dir.join(value.file_name());
        write_csv(&path, &mut wide)?;
        written.push(path);
    }
    Ok(written)
}

pub fn run_scale(args: &ScaleArgs) -> Result<ScaleSummary> {
    let wide = read_table(&args.input)
        .with_context(|| format!("read wide table: {}", args.input.display()))?;
    let spec = ScaleSpec::new(args.variables.iter().map(|v| v.trim()), &args.name)
        .with_completeness(args.completeness.into())
        .with_aggregation(args.aggregation.into());
    let (mut scored, summary) = score_with_summary(&wide, &spec)?;
    let output = args.output.as_deref().unwrap_or(&args.input);
    write_csv(output, &mut scored)?;
    Ok(summary)
}

pub fn run_surveys(args: &SurveysArgs) -> Result<Vec<String>> {
    let source = FileResponseSource::open(&args.input)
        .with_context(|| format!("open export: {}", args.input.display()))?;
    let surveys = source.surveys()?;
    if surveys.is_empty() {
        bail!("no surveys listed in {}", args.input.display());
    }
    Ok(surveys)
}

pub fn run_codebook(args: &CodebookArgs, reference_dir: Option<&Path>) -> Result<()> {
    let table = read_table(&args.input)
        .with_context(|| format!("read responses: {}", args.input.display()))?;
    let table = if args.normalize {
        let key = load_key(&reference_key_path(reference_dir))?;
        let sentinels = SentinelTable::standard();
        let resolver = AnswerResolver::new(&key, &sentinels);
        let (normalized, _) =
            normalize_parallel_with_stats(&table, &resolver, &ParallelOptions::default())?;
        normalized
    } else {
        table
    };
    let mut codebook = build_codebook(&table)?;
    write_csv(&args.output, &mut codebook)?;
    info!(path = %args.output.display(), entries = codebook.height(), "codebook written");
    Ok(())
}

pub fn run_key(command: &KeyCommand, reference_dir: Option<&Path>) -> Result<()> {
    let key_path = reference_key_path(reference_dir);
    match command {
        KeyCommand::Verify => {
            let digest = verify_reference_key(&key_path)
                .with_context(|| format!("verify {}", key_path.display()))?;
            println!("{}: OK ({digest})", key_path.display());
        }
        KeyCommand::Hash => {
            let digest_path = write_reference_digest(&key_path)?;
            println!("wrote {}", digest_path.display());
        }
    }
    Ok(())
}

fn survey_filter(selection: &SurveySelection) -> SurveyFilter {
    match (&selection.survey, selection.select) {
        (Some(name), _) => SurveyFilter::Name(name.clone()),
        (None, Some(number)) => SurveyFilter::Selection(number),
        (None, None) => SurveyFilter::All,
    }
}

fn recode_options(strict: bool) -> RecodeOptions {
    if strict {
        RecodeOptions::strict()
    } else {
        RecodeOptions::default()
    }
}

fn parallel_options(workers: Option<usize>) -> ParallelOptions {
    match workers {
        Some(workers) => ParallelOptions::default().with_workers(workers),
        None => ParallelOptions::default(),
    }
}
