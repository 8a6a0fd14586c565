pub mod cluster;
pub mod pivot;
pub mod pollutant;
pub mod reading;

pub use cluster::{
    CategoryFamily, CityFeatureVector, ClusterAssignment, ClusterCategory, ClusterLabel,
};
pub use pivot::{PivotRecord, PivotTable};
pub use pollutant::{describe_type, normalize_type_name, AqiLevel, Pollutant};
pub use reading::{parse_timestamp, LongRecord, WideRow, WideTable};
