//! Command implementations and argument parsing for the polytwin CLI.

use std::io::{self, Write};

use clap::{Args, Parser, Subcommand, ValueEnum};
use polytwin_core::{
    ColumnRange, CostTrend, DEFAULT_ROW_COUNT, DEFAULT_SEED, DEFAULT_SWEEP_POINTS,
    DashboardSnapshot, DigitalTwin, DigitalTwinBuilder, Feature, FeatureRange, FeatureVector,
    ForestParams, ModelKind, Response, ResponseMap, SweepCurve, SweepSpec, TwinError,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_TREE_COUNT: usize = 100;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "polytwin",
    about = "Query the recycled polypropylene compounding twin."
)]
pub struct Cli {
    /// Options shared by every command.
    #[command(flatten)]
    pub twin: TwinArgs,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// How the twin is generated and fitted.
#[derive(Debug, Args, Clone, Copy, PartialEq, Eq)]
pub struct TwinArgs {
    /// Seed for the synthetic training set and the forest.
    #[arg(long, global = true, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Number of synthetic training rows.
    #[arg(long, global = true, default_value_t = DEFAULT_ROW_COUNT)]
    pub rows: usize,

    /// Trees per forest. Ignored by the linear model.
    #[arg(long, global = true, default_value_t = DEFAULT_TREE_COUNT)]
    pub trees: usize,

    /// Regressor fitted for every response.
    #[arg(long, global = true, value_enum, default_value_t = ModelChoice::Forest)]
    pub model: ModelChoice,
}

impl Default for TwinArgs {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            rows: DEFAULT_ROW_COUNT,
            trees: DEFAULT_TREE_COUNT,
            model: ModelChoice::Forest,
        }
    }
}

impl TwinArgs {
    /// Translates the options into a configured builder.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] when `trees` is zero for the
    /// forest model.
    pub fn builder(&self) -> Result<DigitalTwinBuilder, TwinError> {
        let model = match self.model {
            ModelChoice::Forest => {
                ModelKind::Forest(ForestParams::new(self.trees)?.with_seed(self.seed))
            }
            ModelChoice::Linear => ModelKind::LeastSquares { ridge: None },
        };
        Ok(DigitalTwinBuilder::new()
            .with_seed(self.seed)
            .with_row_count(self.rows)
            .with_model(model))
    }
}

/// Regressors selectable with `--model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelChoice {
    /// Bootstrap-aggregated regression trees.
    Forest,
    /// Ordinary least squares.
    Linear,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Predict every response for one formulation.
    Predict(InputArgs),
    /// Vary one feature and print each response along the grid.
    Sweep(SweepCommand),
    /// Print every dashboard panel for one formulation.
    Report(InputArgs),
    /// List features and responses with their units and ranges.
    Schema,
}

impl Command {
    /// Name recorded on the `cli.run` span.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Predict(_) => "predict",
            Self::Sweep(_) => "sweep",
            Self::Report(_) => "report",
            Self::Schema => "schema",
        }
    }
}

/// The six process inputs. Defaults match the dashboard sliders.
#[derive(Debug, Args, Clone, Copy, PartialEq)]
pub struct InputArgs {
    /// Base resin melt-flow index, g/10min.
    #[arg(long = "base-mfi", default_value_t = 12.0, allow_negative_numbers = true)]
    pub base_mfi: f64,

    /// Base resin ash content, %.
    #[arg(long = "base-ash", default_value_t = 1.5, allow_negative_numbers = true)]
    pub base_ash: f64,

    /// POE toughener loading, %.
    #[arg(long = "poe", default_value_t = 15.0, allow_negative_numbers = true)]
    pub toughener: f64,

    /// Talc filler loading, %.
    #[arg(long = "talc", default_value_t = 10.0, allow_negative_numbers = true)]
    pub filler: f64,

    /// Screw speed, RPM.
    #[arg(long = "screw-speed", default_value_t = 350.0, allow_negative_numbers = true)]
    pub screw_speed: f64,

    /// Barrel temperature, °C.
    #[arg(long = "barrel-temp", default_value_t = 210.0, allow_negative_numbers = true)]
    pub barrel_temperature: f64,
}

impl Default for InputArgs {
    fn default() -> Self {
        let FeatureVector {
            base_mfi,
            base_ash,
            toughener,
            filler,
            screw_speed,
            barrel_temperature,
        } = FeatureVector::default();
        Self {
            base_mfi,
            base_ash,
            toughener,
            filler,
            screw_speed,
            barrel_temperature,
        }
    }
}

impl InputArgs {
    /// The inputs as a feature vector.
    #[must_use]
    pub const fn to_vector(self) -> FeatureVector {
        FeatureVector {
            base_mfi: self.base_mfi,
            base_ash: self.base_ash,
            toughener: self.toughener,
            filler: self.filler,
            screw_speed: self.screw_speed,
            barrel_temperature: self.barrel_temperature,
        }
    }
}

/// Options accepted by the `sweep` command.
#[derive(Debug, Args, Clone, PartialEq)]
pub struct SweepCommand {
    /// Feature to vary, by column name or option name (e.g. `poe`).
    #[arg(long)]
    pub feature: String,

    /// First grid value. Defaults to the feature's control minimum.
    #[arg(long, allow_negative_numbers = true)]
    pub start: Option<f64>,

    /// Last grid value. Defaults to the feature's control maximum.
    #[arg(long, allow_negative_numbers = true)]
    pub end: Option<f64>,

    /// Number of grid points, endpoints included.
    #[arg(long, default_value_t = DEFAULT_SWEEP_POINTS)]
    pub points: usize,

    /// Response to report; repeat for several. Defaults to all three.
    #[arg(long = "response")]
    pub responses: Vec<String>,

    /// Values held fixed for the other features.
    #[command(flatten)]
    pub inputs: InputArgs,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Twin construction or a query failed.
    #[error(transparent)]
    Core(#[from] TwinError),
}

/// Outcome of one command, ready for [`render_summary`].
#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    /// Output of `predict`.
    Prediction(PredictionSummary),
    /// Output of `sweep`.
    Sweep(SweepCurve),
    /// Output of `report`.
    Report(ReportSummary),
    /// Output of `schema`.
    Schema(SchemaSummary),
}

/// Point predictions for one formulation.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSummary {
    /// Label of the fitted regressor.
    pub model: &'static str,
    /// Evaluated inputs.
    pub features: FeatureVector,
    /// One value per response.
    pub predictions: ResponseMap<f64>,
    /// Inputs outside their training range.
    pub extrapolated: Vec<Feature>,
}

/// Dashboard snapshot plus the default toughener sweep trend.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    /// Label of the fitted regressor.
    pub model: &'static str,
    /// Every dashboard panel.
    pub snapshot: DashboardSnapshot,
    /// Mean Impact change per grid step over the default toughener sweep.
    pub toughener_trend: Option<f64>,
}

/// Feature and response metadata for labelling.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSummary {
    /// Features in column order.
    pub features: Vec<FeatureSchema>,
    /// Responses in column order.
    pub responses: Vec<ResponseSchema>,
}

/// One feature's ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSchema {
    /// The feature.
    pub feature: Feature,
    /// Range sampled by the generator.
    pub training: FeatureRange,
    /// Range offered by the dashboard controls.
    pub control: FeatureRange,
}

/// One response's observed training range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseSchema {
    /// The response.
    pub response: Response,
    /// Smallest and largest generated value.
    pub observed: ColumnRange,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the twin cannot be built or the query is
/// rejected.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use polytwin_cli::cli::{Cli, Command, InputArgs, Summary, TwinArgs, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let cli = Cli {
///     twin: TwinArgs { rows: 120, trees: 10, ..TwinArgs::default() },
///     command: Command::Predict(InputArgs::default()),
/// };
/// let Summary::Prediction(prediction) = run_cli(cli)? else {
///     return Err("predict yields a prediction".into());
/// };
/// assert_eq!(prediction.model, "forest");
/// assert!(prediction.extrapolated.is_empty());
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<Summary, CliError> {
    let Cli { twin, command } = cli;
    let label = command.label();
    Span::current().record("command", field::display(label));

    let query = Query::resolve(command)?;
    let twin = build_twin(&twin)?;
    let summary = match query {
        Query::Predict(inputs) => run_predict(&twin, inputs)?,
        Query::Sweep(request) => run_sweep(&twin, &request)?,
        Query::Report(inputs) => run_report(&twin, inputs)?,
        Query::Schema => run_schema(&twin),
    };
    info!(command = label, "command completed");
    Ok(summary)
}

#[instrument(
    name = "cli.build_twin",
    err,
    skip(args),
    fields(seed = args.seed, rows = args.rows, trees = args.trees, model = ?args.model),
)]
pub(super) fn build_twin(args: &TwinArgs) -> Result<DigitalTwin, CliError> {
    Ok(args.builder()?.build()?)
}

#[instrument(name = "cli.predict", err, skip(twin, inputs))]
pub(super) fn run_predict(twin: &DigitalTwin, inputs: InputArgs) -> Result<Summary, CliError> {
    let features = inputs.to_vector();
    let predictions = twin.predict_all(&features)?;
    Ok(Summary::Prediction(PredictionSummary {
        model: twin.model_kind().label(),
        features,
        predictions,
        extrapolated: twin.extrapolated_features(&features),
    }))
}

/// A command whose textual arguments have been checked, ready to run
/// against a fitted twin.
#[derive(Debug)]
enum Query {
    Predict(InputArgs),
    Sweep(SweepRequest),
    Report(InputArgs),
    Schema,
}

impl Query {
    fn resolve(command: Command) -> Result<Self, TwinError> {
        Ok(match command {
            Command::Predict(inputs) => Self::Predict(inputs),
            Command::Sweep(sweep) => Self::Sweep(resolve_sweep(&sweep)?),
            Command::Report(inputs) => Self::Report(inputs),
            Command::Schema => Self::Schema,
        })
    }
}

#[derive(Debug)]
pub(super) struct SweepRequest {
    pub(super) spec: SweepSpec,
    pub(super) inputs: FeatureVector,
    pub(super) responses: Vec<Response>,
}

/// Resolves the feature, responses and grid of a sweep without touching the
/// twin, so malformed arguments fail before any model is fitted.
pub(super) fn resolve_sweep(command: &SweepCommand) -> Result<SweepRequest, TwinError> {
    let feature: Feature = command.feature.parse()?;
    let responses = parse_responses(&command.responses)?;
    let control = feature.control_range();
    let spec = SweepSpec::new(
        feature,
        command.start.unwrap_or(control.min()),
        command.end.unwrap_or(control.max()),
        command.points,
    )?;
    Ok(SweepRequest {
        spec,
        inputs: command.inputs.to_vector(),
        responses,
    })
}

#[instrument(
    name = "cli.sweep",
    err,
    skip(twin, request),
    fields(feature = %request.spec.feature(), points = request.spec.points()),
)]
pub(super) fn run_sweep(twin: &DigitalTwin, request: &SweepRequest) -> Result<Summary, CliError> {
    let curve = twin.sweep(&request.spec, &request.inputs, &request.responses)?;
    Ok(Summary::Sweep(curve))
}

pub(super) fn parse_responses(names: &[String]) -> Result<Vec<Response>, TwinError> {
    if names.is_empty() {
        return Ok(Response::ALL.to_vec());
    }
    names.iter().map(|name| Response::from_name(name)).collect()
}

#[instrument(name = "cli.report", err, skip(twin, inputs))]
pub(super) fn run_report(twin: &DigitalTwin, inputs: InputArgs) -> Result<Summary, CliError> {
    let features = inputs.to_vector();
    let snapshot = twin.snapshot(&features)?;
    let curve = twin.sweep(&SweepSpec::toughener_default(), &features, &[Response::Impact])?;
    Ok(Summary::Report(ReportSummary {
        model: twin.model_kind().label(),
        snapshot,
        toughener_trend: curve.trend(Response::Impact),
    }))
}

pub(super) fn run_schema(twin: &DigitalTwin) -> Summary {
    let features = Feature::ALL
        .into_iter()
        .map(|feature| FeatureSchema {
            feature,
            training: twin.training_range(feature),
            control: feature.control_range(),
        })
        .collect();
    let responses = Response::ALL
        .into_iter()
        .map(|response| ResponseSchema {
            response,
            observed: twin.training_set().response_range(response),
        })
        .collect();
    Summary::Schema(SchemaSummary {
        features,
        responses,
    })
}

/// Renders `summary` to `writer` as tab-separated text.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use polytwin_cli::cli::{PredictionSummary, Summary, render_summary};
/// # use polytwin_core::{FeatureVector, ResponseMap};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = Summary::Prediction(PredictionSummary {
///     model: "forest",
///     features: FeatureVector::default(),
///     predictions: ResponseMap::from_fn(|_| 1.0),
///     extrapolated: Vec::new(),
/// });
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// let text = String::from_utf8(buffer)?;
/// assert_eq!(text.lines().count(), 4);
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &Summary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        Summary::Prediction(prediction) => render_prediction(prediction, &mut writer),
        Summary::Sweep(curve) => render_sweep(curve, &mut writer),
        Summary::Report(report) => render_report(report, &mut writer),
        Summary::Schema(schema) => render_schema(schema, &mut writer),
    }
}

fn render_prediction(prediction: &PredictionSummary, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "model: {}", prediction.model)?;
    for (response, value) in prediction.predictions.iter() {
        writeln!(writer, "{response}\t{value:.3}\t{}", response.unit())?;
    }
    render_extrapolated(&prediction.extrapolated, writer)
}

fn render_sweep(curve: &SweepCurve, writer: &mut impl Write) -> io::Result<()> {
    write!(writer, "{}", curve.feature)?;
    for (response, _) in &curve.series {
        write!(writer, "\t{response}")?;
    }
    writeln!(writer)?;

    let mut columns: Vec<_> = curve.series.iter().map(|(_, values)| values.iter()).collect();
    for value in &curve.grid {
        write!(writer, "{value:.4}")?;
        for column in &mut columns {
            if let Some(prediction) = column.next() {
                write!(writer, "\t{prediction:.4}")?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn render_report(report: &ReportSummary, writer: &mut impl Write) -> io::Result<()> {
    let snapshot = &report.snapshot;
    writeln!(writer, "model: {}", report.model)?;
    write!(writer, "inputs:")?;
    for feature in Feature::ALL {
        write!(writer, " {feature}={}", snapshot.features.get(feature))?;
    }
    writeln!(writer)?;

    for (response, value) in snapshot.predictions.iter() {
        let verdict = match response {
            Response::Impact => Some(snapshot.verdicts.impact),
            Response::Tensile => Some(snapshot.verdicts.tensile),
            Response::FinalMfi => None,
        };
        write!(writer, "{response}\t{value:.3}\t{}", response.unit())?;
        match verdict {
            Some(verdict) => writeln!(writer, "\t{verdict}")?,
            None => writeln!(writer)?,
        }
    }

    let trend = match snapshot.cost.trend {
        CostTrend::BelowReference => "below reference",
        CostTrend::AboveReference => "above reference",
    };
    writeln!(writer, "cost: {:.1} CNY/t ({trend})", snapshot.cost.per_tonne)?;

    write!(writer, "scorecard:")?;
    for (axis, score) in snapshot.scorecard.axes() {
        write!(writer, " {axis}={score:.1}")?;
    }
    writeln!(writer)?;

    writeln!(writer, "advice: {}", snapshot.advice.summary())?;
    for recommendation in snapshot.advice.recommendations() {
        writeln!(writer, "  - {recommendation}")?;
    }

    match report.toughener_trend {
        Some(trend) => writeln!(
            writer,
            "toughener trend: {trend:+.4} {} per step",
            Response::Impact.unit()
        )?,
        None => writeln!(writer, "toughener trend: n/a")?,
    }
    render_extrapolated(&snapshot.extrapolated, writer)
}

fn render_schema(schema: &SchemaSummary, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "feature\tunit\ttraining\tcontrol")?;
    for row in &schema.features {
        writeln!(
            writer,
            "{}\t{}\t[{}, {}]\t[{}, {}]",
            row.feature,
            row.feature.unit(),
            row.training.min(),
            row.training.max(),
            row.control.min(),
            row.control.max(),
        )?;
    }
    writeln!(writer, "response\tunit\tobserved")?;
    for row in &schema.responses {
        writeln!(
            writer,
            "{}\t{}\t[{:.3}, {:.3}]",
            row.response,
            row.response.unit(),
            row.observed.min,
            row.observed.max,
        )?;
    }
    Ok(())
}

fn render_extrapolated(features: &[Feature], writer: &mut impl Write) -> io::Result<()> {
    if features.is_empty() {
        return Ok(());
    }
    let names: Vec<&str> = features.iter().map(|feature| feature.name()).collect();
    writeln!(writer, "extrapolated: {}", names.join(", "))
}
