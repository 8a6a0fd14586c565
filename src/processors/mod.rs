pub mod cluster_pipeline;
pub mod feature_aggregator;
pub mod kmeans;
pub mod labeler;
pub mod reshaper;
pub mod standardizer;

pub use cluster_pipeline::{ClusterPipeline, ClusteringResult};
pub use feature_aggregator::{AggregatedFeatures, FeatureAggregator};
pub use kmeans::{KMeans, KMeansFit};
pub use labeler::{CentroidView, ClusterLabeler, LabelRule, LABEL_RULES};
pub use reshaper::DataReshaper;
pub use standardizer::Standardizer;
