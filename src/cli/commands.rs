use crate::analyzers::{
    CompositionAnalyzer, CorrelationAnalyzer, LevelAnalyzer, RankingAnalyzer, TrendAnalyzer,
};
use crate::cli::args::{Cli, Commands, InputArgs};
use crate::dashboard::{Dashboard, DashboardParams};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::settings::AnalysisSettings;
use crate::utils::{init_logging, ProgressReporter};
use crate::writers::{OutputFormat, Report, ReportWriter};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let settings = AnalysisSettings::load(cli.settings.as_deref())?;
    let output = Output {
        writer: ReportWriter::new(cli.format),
        path: cli.output,
        silent: cli.format == OutputFormat::Json,
    };

    match cli.command {
        Commands::Advise { input, city } => {
            let dataset = output.load(&input)?;
            let dashboard = Dashboard::new(&dataset, &settings);
            let mut params = DashboardParams::from_settings(&settings);
            params.advisory_city = city;
            output.emit(&dashboard.advisory(&params)?)
        }

        Commands::Rank {
            input,
            measurement_type,
            mode,
            top,
        } => {
            let dataset = output.load(&input)?;
            let size = top.unwrap_or(settings.panels.ranking_size);
            let ranking = RankingAnalyzer::new(size).rank(dataset.long(), &measurement_type, mode)?;
            output.emit(&ranking)
        }

        Commands::Trend {
            input,
            measurement_type,
            cities,
        } => {
            let dataset = output.load(&input)?;
            let cities = if cities.is_empty() {
                settings.panels.trend_cities.clone()
            } else {
                cities
            };
            let series = TrendAnalyzer::new().series(dataset.long(), &measurement_type, &cities)?;
            output.emit(&series)
        }

        Commands::Correlate { input } => {
            let dataset = output.load(&input)?;
            output.emit(&CorrelationAnalyzer::new().correlate(dataset.pivot())?)
        }

        Commands::Composition { input } => {
            let dataset = output.load(&input)?;
            output.emit(&CompositionAnalyzer::new().scatter(dataset.pivot())?)
        }

        Commands::Levels { input } => {
            let dataset = output.load(&input)?;
            output.emit(&LevelAnalyzer::new().distribution(dataset.pivot())?)
        }

        Commands::Cluster {
            input,
            clusters,
            features,
        } => {
            let dataset = output.load(&input)?;
            let params = cluster_params(&settings, clusters, features);

            let progress = output.spinner("Clustering cities...");
            let panel = Dashboard::new(&dataset, &settings).clusters(&params)?;
            progress.finish_and_clear();
            output.emit(&panel)
        }

        Commands::Dashboard {
            input,
            city,
            measurement_type,
            trend_cities,
            mode,
            clusters,
            features,
        } => {
            let dataset = output.load(&input)?;
            let mut params = cluster_params(&settings, clusters, features);
            params.advisory_city = city;
            params.measurement_type = measurement_type;
            params.ranking_mode = mode;
            if !trend_cities.is_empty() {
                params.trend_cities = trend_cities;
            }

            let progress = output.spinner("Computing panels...");
            let report = Dashboard::new(&dataset, &settings).build(&params);
            progress.finish_and_clear();
            output.emit(&report)
        }

        Commands::Info { input } => {
            let dataset = output.load(&input)?;
            output.emit(&dataset.info())
        }
    }
}

fn cluster_params(
    settings: &AnalysisSettings,
    clusters: Option<usize>,
    features: Vec<String>,
) -> DashboardParams {
    let mut params = DashboardParams::from_settings(settings);
    if let Some(k) = clusters {
        params.n_clusters = k;
    }
    if !features.is_empty() {
        params.features = features;
    }
    params
}

struct Output {
    writer: ReportWriter,
    path: Option<PathBuf>,
    silent: bool,
}

impl Output {
    fn spinner(&self, message: &str) -> ProgressReporter {
        ProgressReporter::new_spinner(message, self.silent)
    }

    /// A load failure stops every command
    fn load(&self, input: &InputArgs) -> Result<Dataset> {
        let reader = input.reader()?;
        let progress = self.spinner(&format!("Loading {}...", input.input.display()));
        match Dataset::load_with_reader(&input.input, &reader) {
            Ok(dataset) => {
                info!(
                    cities = dataset.cities().len(),
                    records = dataset.long().len(),
                    "Dataset loaded"
                );
                progress.finish_and_clear();
                Ok(dataset)
            }
            Err(e) => {
                progress.finish_and_clear();
                error!(path = %input.input.display(), error = %e, "Failed to load dataset");
                Err(e)
            }
        }
    }

    fn emit<R: Report>(&self, report: &R) -> Result<()> {
        match &self.path {
            Some(path) => {
                self.writer.write_to_file(report, path)?;
                if !self.silent {
                    println!("Report written to {}", path.display());
                }
                Ok(())
            }
            None => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                self.writer.write(report, &mut out)?;
                out.flush()?;
                Ok(())
            }
        }
    }
}
