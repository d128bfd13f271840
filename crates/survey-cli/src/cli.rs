//! CLI argument definitions for `omop-survey`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use survey_model::{Aggregation, CompletenessMode, PivotValue, SelectAllPolicy};

#[derive(Parser)]
#[command(
    name = "omop-survey",
    version,
    about = "Normalize, reshape and score OMOP survey responses",
    long_about = "Resolve raw survey answers to numeric and text values, expand \
                  select-all-that-apply questions, recode missing values, pivot \
                  responses to one row per person and compute scale scores."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Directory holding survey_key.csv (overrides SURVEY_REFERENCE_DIR).
    #[arg(long = "reference-dir", value_name = "DIR", global = true)]
    pub reference_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the whole pipeline on a response export and write wide tables.
    Run(RunArgs),

    /// Resolve answer_numeric and answer_text for a long response table.
    Normalize(NormalizeArgs),

    /// Replace coded-missing values (-999 to -980) with empty cells.
    Recode(RecodeArgs),

    /// Pivot a normalized long table to one row per person.
    Pivot(PivotArgs),

    /// Add a composite scale score to a wide table.
    Scale(ScaleArgs),

    /// List the surveys in a response export.
    Surveys(SurveysArgs),

    /// Write the distinct question/answer combinations of a table.
    Codebook(CodebookArgs),

    /// Check or regenerate the reference key digest.
    Key {
        #[command(subcommand)]
        command: KeyCommand,
    },
}

#[derive(Args)]
pub struct SurveySelection {
    /// Survey name to extract from a multi-survey export.
    #[arg(long = "survey", value_name = "NAME", conflicts_with = "select")]
    pub survey: Option<String>,

    /// Survey number as listed by `omop-survey surveys` (1-based).
    #[arg(long = "select", value_name = "N")]
    pub select: Option<usize>,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Long-format response export (.csv, .txt, .tsv, .xlsx, .xls).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[command(flatten)]
    pub selection: SurveySelection,

    /// Output directory (default: <INPUT directory>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// How select-all-that-apply rows get their question ids.
    #[arg(long = "select-all", value_enum, default_value = "composite")]
    pub select_all: SelectAllArg,

    /// Keep select-all questions as a single column.
    #[arg(long = "no-expand")]
    pub no_expand: bool,

    /// Coerce answer_numeric to numbers and drop empty or multi-value list cells.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Worker threads for normalization (default: available CPUs).
    #[arg(long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    /// Also write codebook.csv.
    #[arg(long = "codebook")]
    pub codebook: bool,

    /// Also write the normalized long table.
    #[arg(long = "keep-long")]
    pub keep_long: bool,
}

#[derive(Parser)]
pub struct NormalizeArgs {
    /// Long-format response table.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output CSV path.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub selection: SurveySelection,

    /// Worker threads (default: available CPUs).
    #[arg(long = "workers", value_name = "N")]
    pub workers: Option<usize>,
}

#[derive(Parser)]
pub struct RecodeArgs {
    /// Table to recode (.csv, .txt, .tsv, .xlsx, .xls).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output CSV path.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    /// Coerce answer_numeric to numbers and drop empty or multi-value list cells.
    #[arg(long = "strict")]
    pub strict: bool,
}

#[derive(Parser)]
pub struct PivotArgs {
    /// Normalized long table.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory for pivot_n.csv / pivot_t.csv.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Which resolved value to spread.
    #[arg(long = "value", value_enum, default_value = "both")]
    pub value: PivotValueArg,
}

#[derive(Parser)]
pub struct ScaleArgs {
    /// Wide table with a person_id column.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Columns to aggregate, comma separated (e.g. q43528662,q43528663).
    #[arg(long = "variables", value_name = "COLUMNS", value_delimiter = ',', required = true)]
    pub variables: Vec<String>,

    /// Name of the score column.
    #[arg(long = "name", value_name = "NAME")]
    pub name: String,

    /// Which rows are eligible for a score.
    #[arg(long = "completeness", value_enum, default_value = "strict")]
    pub completeness: CompletenessArg,

    /// How item values combine.
    #[arg(long = "aggregation", value_enum, default_value = "sum")]
    pub aggregation: AggregationArg,

    /// Output CSV path (default: overwrite INPUT).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct SurveysArgs {
    /// Multi-survey response export.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Parser)]
pub struct CodebookArgs {
    /// Response table with question_concept_id and question columns.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output CSV path.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    /// Resolve answers first so answer_numeric/answer_text are included.
    #[arg(long = "normalize")]
    pub normalize: bool,
}

#[derive(Subcommand)]
pub enum KeyCommand {
    /// Compare survey_key.csv with survey_key.sha256.
    Verify,
    /// Recompute survey_key.sha256 from survey_key.csv.
    Hash,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SelectAllArg {
    Composite,
    Reenumerate,
}

impl From<SelectAllArg> for SelectAllPolicy {
    fn from(arg: SelectAllArg) -> Self {
        match arg {
            SelectAllArg::Composite => SelectAllPolicy::Composite,
            SelectAllArg::Reenumerate => SelectAllPolicy::Reenumerate,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PivotValueArg {
    Numeric,
    Text,
    Both,
}

impl PivotValueArg {
    pub fn values(self) -> Vec<PivotValue> {
        match self {
            PivotValueArg::Numeric => vec![PivotValue::Numeric],
            PivotValueArg::Text => vec![PivotValue::Text],
            PivotValueArg::Both => vec![PivotValue::Numeric, PivotValue::Text],
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CompletenessArg {
    Strict,
    Partial,
}

impl From<CompletenessArg> for CompletenessMode {
    fn from(arg: CompletenessArg) -> Self {
        match arg {
            CompletenessArg::Strict => CompletenessMode::Strict,
            CompletenessArg::Partial => CompletenessMode::Partial,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AggregationArg {
    Sum,
    Mean,
}

impl From<AggregationArg> for Aggregation {
    fn from(arg: AggregationArg) -> Self {
        match arg {
            AggregationArg::Sum => Aggregation::Sum,
            AggregationArg::Mean => Aggregation::Mean,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
