//! Summary statistics and the least-squares trend overlay.

use crate::error::{Error, Result};

pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::Render("mean needs at least 1 value".into()));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). Needs at least 2 values.
pub fn sample_std_dev(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(Error::Render(format!(
            "standard deviation needs at least 2 values, got {}",
            values.len()
        )));
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Ok((ss / (values.len() - 1) as f64).sqrt())
}

/// Polynomial in ascending powers of `x / x_scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    pub coefficients: Vec<f64>,
    pub x_scale: f64,
}

impl Polynomial {
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn eval(&self, x: f64) -> f64 {
        let t = x / self.x_scale;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * t + c)
    }
}

/// Least-squares fit of `ys` against `xs` with the given degree.
pub fn polyfit(xs: &[f64], ys: &[f64], degree: usize) -> Result<Polynomial> {
    if xs.len() != ys.len() {
        return Err(Error::Render(format!(
            "polyfit got {} x values and {} y values",
            xs.len(),
            ys.len()
        )));
    }
    let m = degree + 1;
    if xs.len() < m {
        return Err(Error::Render(format!(
            "degree {} fit needs at least {} points, got {}",
            degree,
            m,
            xs.len()
        )));
    }

    // Scaling x into [-1, 1] keeps the normal equations well conditioned.
    let x_scale = xs.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    let x_scale = if x_scale > 0.0 { x_scale } else { 1.0 };

    let mut a = vec![vec![0.0; m + 1]; m];
    for (&x, &y) in xs.iter().zip(ys) {
        let t = x / x_scale;
        let powers: Vec<f64> = (0..2 * m).map(|p| t.powi(p as i32)).collect();
        for (i, row) in a.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().take(m).enumerate() {
                *cell += powers[i + j];
            }
            row[m] += y * powers[i];
        }
    }

    let coefficients = solve(a)?;
    Ok(Polynomial {
        coefficients,
        x_scale,
    })
}

/// Trend of `ys` against their index: degree 2, or degree 1 for two points.
pub fn trend_fit(ys: &[f64]) -> Result<Polynomial> {
    if ys.len() < 2 {
        return Err(Error::Render(format!(
            "trend needs at least 2 points, got {}",
            ys.len()
        )));
    }
    let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
    polyfit(&xs, ys, (ys.len() - 1).min(2))
}

/// Gaussian elimination with partial pivoting on an augmented matrix.
fn solve(mut a: Vec<Vec<f64>>) -> Result<Vec<f64>> {
    let n = a.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(Error::Render("trend fit is singular".into()));
        }
        a.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..=n {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (a[row][n] - tail) / a[row][row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn mean_and_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(close(mean(&values).unwrap(), 5.0));
        assert!(close(sample_std_dev(&values).unwrap(), (32.0_f64 / 7.0).sqrt()));
    }

    #[test]
    fn std_dev_of_one_value_fails() {
        let err = sample_std_dev(&[10.5]).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
        assert!(sample_std_dev(&[]).is_err());
        assert!(mean(&[]).is_err());
    }

    #[test]
    fn quadratic_is_recovered_exactly() {
        let xs: Vec<f64> = (0..6).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 1.0 + 2.0 * x + 0.5 * x * x).collect();

        let p = polyfit(&xs, &ys, 2).unwrap();

        assert_eq!(p.degree(), 2);
        for (x, y) in xs.iter().zip(&ys) {
            assert!(close(p.eval(*x), *y), "p({}) = {} != {}", x, p.eval(*x), y);
        }
    }

    #[test]
    fn noisy_fit_minimises_squared_error() {
        let ys = [10.0, 12.0, 9.0, 14.0, 11.0, 15.0, 13.0];
        let p = trend_fit(&ys).unwrap();
        let sse = |poly: &Polynomial| -> f64 {
            ys.iter()
                .enumerate()
                .map(|(i, y)| (poly.eval(i as f64) - y).powi(2))
                .sum()
        };

        let best = sse(&p);
        for (i, delta) in [(0, 0.01), (1, -0.01), (2, 0.01)] {
            let mut nudged = p.clone();
            nudged.coefficients[i] += delta;
            assert!(sse(&nudged) > best);
        }
    }

    #[test]
    fn two_points_fall_back_to_a_line() {
        let p = trend_fit(&[3.0, 5.0]).unwrap();
        assert_eq!(p.degree(), 1);
        assert!(close(p.eval(0.0), 3.0));
        assert!(close(p.eval(1.0), 5.0));
    }

    #[test]
    fn single_point_has_no_trend() {
        assert!(trend_fit(&[3.0]).is_err());
    }

    #[test]
    fn underdetermined_fit_is_rejected() {
        assert!(polyfit(&[0.0, 1.0], &[1.0, 2.0], 2).is_err());
    }
}
