use crate::error::{AnalysisError, Result};
use crate::utils::constants::{
    KMEANS_MAX_ITERATIONS, KMEANS_RESTARTS, KMEANS_SEED, KMEANS_TOLERANCE,
};
use linfa::prelude::*;
use linfa_clustering::KMeans as LinfaKMeans;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;

/// Seeded K-Means restarts on top of `linfa-clustering` (k-means++ init).
///
/// Restart `i` fits with `StdRng::seed_from_u64(seed + i)`. Restarts run in
/// parallel and the winner is chosen by (inertia, restart index), so the
/// result does not depend on scheduling.
#[derive(Debug, Clone)]
pub struct KMeans {
    n_clusters: usize,
    seed: u64,
    restarts: usize,
    max_iterations: u64,
    tolerance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster id per input row, in `0..n_clusters`
    pub labels: Vec<usize>,
    /// Centroids in the space the model was fitted in
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            seed: KMEANS_SEED,
            restarts: KMEANS_RESTARTS,
            max_iterations: KMEANS_MAX_ITERATIONS as u64,
            tolerance: KMEANS_TOLERANCE,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1) as u64;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Fit on one sample per row and keep the lowest-inertia restart
    pub fn fit(&self, data: &Array2<f64>) -> Result<KMeansFit> {
        if self.n_clusters == 0 {
            return Err(AnalysisError::InvalidParameter(
                "K-Means needs at least one cluster".to_string(),
            ));
        }
        let distinct = distinct_rows(data);
        if distinct < self.n_clusters {
            return Err(AnalysisError::InsufficientData(format!(
                "{} distinct city profiles cannot form {} clusters",
                distinct, self.n_clusters
            )));
        }

        let runs: Vec<KMeansFit> = (0..self.restarts)
            .into_par_iter()
            .map(|restart| self.fit_once(data, restart))
            .collect::<Result<_>>()?;

        let (best_restart, best) = runs
            .into_iter()
            .enumerate()
            .min_by(|(ia, a), (ib, b)| a.inertia.total_cmp(&b.inertia).then(ia.cmp(ib)))
            .ok_or_else(|| AnalysisError::InvalidParameter("No K-Means restarts ran".into()))?;

        debug!(
            k = self.n_clusters,
            restart = best_restart,
            inertia = best.inertia,
            "K-Means converged"
        );
        Ok(best)
    }

    fn fit_once(&self, data: &Array2<f64>, restart: usize) -> Result<KMeansFit> {
        let observations = DatasetBase::from(data.view());
        let rng = StdRng::seed_from_u64(self.seed.wrapping_add(restart as u64));
        let model = LinfaKMeans::params_with_rng(self.n_clusters, rng)
            .n_runs(1)
            .max_n_iterations(self.max_iterations)
            .tolerance(self.tolerance)
            .fit(&observations)?;

        let labels: Array1<usize> = model.predict(data);

        Ok(KMeansFit {
            labels: labels.to_vec(),
            centroids: model
                .centroids()
                .outer_iter()
                .map(|row| row.to_vec())
                .collect(),
            inertia: model.inertia(),
        })
    }
}

/// k-means++ seeding needs at least K distinct points
fn distinct_rows(data: &Array2<f64>) -> usize {
    let mut keys: Vec<Vec<u64>> = data
        .outer_iter()
        .map(|row| row.iter().map(|v| (v + 0.0).to_bits()).collect())
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys.len()
}
