use crate::analyzers::RankingMode;
use crate::error::{AnalysisError, Result};
use crate::readers::WideTableReader;
use crate::writers::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aqi-explorer")]
#[command(about = "Explore hourly air-quality data for Chinese cities")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    #[arg(
        long,
        global = true,
        help = "TOML settings file (AQI_* environment variables override it)"
    )]
    pub settings: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Write the report to a file instead of stdout")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    #[arg(short, long, help = "Wide-format hourly CSV (UTF-8 or GBK)")]
    pub input: PathBuf,

    #[arg(long, default_value_t = ',', help = "Field delimiter of the input file")]
    pub delimiter: char,
}

impl InputArgs {
    /// The csv reader splits on a single byte
    pub fn reader(&self) -> Result<WideTableReader> {
        if !self.delimiter.is_ascii() {
            return Err(AnalysisError::InvalidParameter(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }
        Ok(WideTableReader::with_delimiter(self.delimiter as u8))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Health advisory for a city's most recent reading
    Advise {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long, help = "City column [default: first city in the file]")]
        city: Option<String>,
    },

    /// Rank cities by the mean of one measurement type
    Rank {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short = 't', long, default_value = "AQI")]
        measurement_type: String,

        #[arg(short, long, value_enum, default_value = "polluted")]
        mode: RankingMode,

        #[arg(long, help = "Number of cities to show [default: from settings]")]
        top: Option<usize>,
    },

    /// Time series of one measurement type for selected cities
    Trend {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short = 't', long, default_value = "AQI")]
        measurement_type: String,

        #[arg(
            short,
            long,
            value_delimiter = ',',
            help = "Cities to compare [default: from settings]"
        )]
        cities: Vec<String>,
    },

    /// Pearson correlation between pollutant columns
    Correlate {
        #[command(flatten)]
        input: InputArgs,
    },

    /// PM10 vs PM2.5 scatter data
    Composition {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Distribution of readings across national AQI levels
    Levels {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Cluster cities by pollution profile and label each cluster
    Cluster {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short = 'k', long, help = "Number of clusters, 2-8 [default: from settings]")]
        clusters: Option<usize>,

        #[arg(
            short,
            long,
            value_delimiter = ',',
            help = "Feature columns [default: from settings]"
        )]
        features: Vec<String>,
    },

    /// Compute every panel; failures are reported per panel
    Dashboard {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long, help = "City for the advisory panel")]
        city: Option<String>,

        #[arg(short = 't', long, help = "Measurement type for ranking and trend panels")]
        measurement_type: Option<String>,

        #[arg(long, value_delimiter = ',')]
        trend_cities: Vec<String>,

        #[arg(short, long, value_enum, default_value = "polluted")]
        mode: RankingMode,

        #[arg(short = 'k', long)]
        clusters: Option<usize>,

        #[arg(short, long, value_delimiter = ',')]
        features: Vec<String>,
    },

    /// Display the shape of the dataset
    Info {
        #[command(flatten)]
        input: InputArgs,
    },
}
