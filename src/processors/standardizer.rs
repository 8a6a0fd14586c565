use ndarray::{Array1, Array2, Axis};

/// Column-wise z-score scaling with population standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    means: Array1<f64>,
    std_devs: Array1<f64>,
}

impl Standardizer {
    pub fn fit(data: &Array2<f64>) -> Self {
        if data.nrows() == 0 {
            return Self {
                means: Array1::zeros(data.ncols()),
                std_devs: Array1::zeros(data.ncols()),
            };
        }
        let means = data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(data.ncols()));
        let std_devs = data.std_axis(Axis(0), 0.0);
        Self { means, std_devs }
    }

    /// Constant columns scale to 0 rather than dividing by zero
    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        let mut scaled = data - &self.means;
        for (mut column, sd) in scaled.axis_iter_mut(Axis(1)).zip(self.std_devs.iter()) {
            if *sd > f64::EPSILON {
                column /= *sd;
            } else {
                column.fill(0.0);
            }
        }
        scaled
    }

    pub fn fit_transform(data: &Array2<f64>) -> (Self, Array2<f64>) {
        let scaler = Self::fit(data);
        let scaled = scaler.transform(data);
        (scaler, scaled)
    }
}
