pub mod advisory;
pub mod cluster_profiles;
pub mod composition;
pub mod correlation;
pub mod level_distribution;
pub mod ranking;
pub mod trend;

pub use advisory::{Advisory, AdvisoryBand, AdvisoryEngine, CityAdvisory, ColorClass};
pub use cluster_profiles::{ClusterProfile, ClusterProfileBuilder};
pub use composition::{CompositionAnalyzer, CompositionPoint, ParticulateComposition};
pub use correlation::{CorrelationAnalyzer, CorrelationMatrix};
pub use level_distribution::{LevelAnalyzer, LevelCount, LevelDistribution};
pub use ranking::{CityMean, CityRanking, RankingAnalyzer, RankingMode};
pub use trend::{TrendAnalyzer, TrendPoint, TrendSeries};
