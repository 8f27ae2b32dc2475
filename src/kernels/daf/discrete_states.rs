//! Discrete-state SPK segments (types 8, 9, 12 and 13).
//!
//! These segments store a list of full states `(x, y, z, vx, vy, vz)` and
//! interpolate between neighbouring states:
//!
//! | type | spacing                         | interpolation                       |
//! |------|---------------------------------|-------------------------------------|
//! | 8    | equal, from a start epoch + step | Lagrange on each of the 6 components |
//! | 9    | explicit epoch list             | Lagrange on each of the 6 components |
//! | 12   | equal, from a start epoch + step | Hermite on position, derivative gives velocity |
//! | 13   | explicit epoch list             | Hermite on position, derivative gives velocity |
//!
//! Layouts (words):
//!
//! * equal spacing: `6N` states, then `start, step, window - 1, N`,
//! * unequal spacing: `6N` states, `N` epochs, `(N - 1) / 100` directory
//!   epochs, then `window - 1, N`.
//!
//! For type 8 and 9 the `window - 1` slot is the polynomial degree; the
//! window is one state larger in every case.

use nalgebra::Vector3;

use super::array::DafArray;
use crate::spkstate_errors::SpkStateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Lagrange,
    Hermite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Spacing {
    Equal { start: f64, step: f64 },
    Unequal,
}

/// Layout of a discrete-state segment, read from its trailer.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteStates {
    interpolation: Interpolation,
    spacing: Spacing,
    window: usize,
    n_states: usize,
}

impl DiscreteStates {
    /// Read the trailer of an equally spaced segment (types 8 and 12).
    pub fn equal_spacing(
        array: &DafArray<'_>,
        interpolation: Interpolation,
    ) -> Result<Self, SpkStateError> {
        let [start, step, window_minus_one, n] = array.trailer::<4>()?;
        if !start.is_finite() || !(step > 0.0 && step.is_finite()) {
            return Err(array.corrupted(format!("invalid start {start} or step size {step}")));
        }
        let n_states = Self::state_count(array, n)?;
        Self::checked(
            array,
            interpolation,
            Spacing::Equal { start, step },
            window_minus_one,
            n_states,
            4,
        )
    }

    /// Read the trailer of an unequally spaced segment (types 9 and 13).
    pub fn unequal_spacing(
        array: &DafArray<'_>,
        interpolation: Interpolation,
    ) -> Result<Self, SpkStateError> {
        let [window_minus_one, n] = array.trailer::<2>()?;
        let n_states = Self::state_count(array, n)?;
        let directory = (n_states - 1) / 100;
        Self::checked(
            array,
            interpolation,
            Spacing::Unequal,
            window_minus_one,
            n_states,
            n_states + directory + 2,
        )
    }

    /// State count from its trailer word, bounded by the segment length.
    fn state_count(array: &DafArray<'_>, n: f64) -> Result<usize, SpkStateError> {
        if !(1.0..=array.len() as f64).contains(&n) {
            return Err(array.corrupted(format!("invalid state count {n}")));
        }
        Ok(n as usize)
    }

    fn checked(
        array: &DafArray<'_>,
        interpolation: Interpolation,
        spacing: Spacing,
        window_minus_one: f64,
        n_states: usize,
        extra_words: usize,
    ) -> Result<Self, SpkStateError> {
        // n_states and extra_words are both bounded by the segment length
        if 6 * n_states + extra_words > array.len() {
            return Err(array.corrupted(format!(
                "{n_states} states do not fit in {} words",
                array.len()
            )));
        }
        if !(window_minus_one >= 0.0 && window_minus_one.is_finite()) {
            return Err(array.corrupted(format!(
                "invalid window size {}",
                window_minus_one + 1.0
            )));
        }
        // Segments shorter than the window interpolate over all their states
        let window = window_minus_one.min((n_states - 1) as f64) as usize + 1;

        Ok(DiscreteStates {
            interpolation,
            spacing,
            window,
            n_states,
        })
    }

    fn epoch(&self, array: &DafArray<'_>, index: usize) -> Result<f64, SpkStateError> {
        match self.spacing {
            Spacing::Equal { start, step } => Ok(start + step * index as f64),
            Spacing::Unequal => array.word(6 * self.n_states + index),
        }
    }

    /// Index of the first state of the interpolation window around `et`.
    ///
    /// Even windows take as many states before `et` as after it. Odd windows
    /// are centered on the state nearest to `et`. The window is then shifted
    /// to stay inside the segment.
    fn window_start(&self, array: &DafArray<'_>, et: f64) -> Result<usize, SpkStateError> {
        let n = self.n_states;
        let w = self.window;

        // Number of epochs <= et
        let (mut low, mut high) = (0usize, n);
        while low < high {
            let mid = (low + high) / 2;
            if self.epoch(array, mid)? <= et {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        let upper = low;

        let first = if w % 2 == 0 {
            upper.saturating_sub(w / 2)
        } else {
            let nearest = if upper == 0 {
                0
            } else if upper == n {
                n - 1
            } else if et - self.epoch(array, upper - 1)? <= self.epoch(array, upper)? - et {
                upper - 1
            } else {
                upper
            };
            nearest.saturating_sub(w / 2)
        };

        Ok(first.min(n - w))
    }

    /// Interpolate position (km) and velocity (km/s) at `et`.
    pub fn interpolate(
        &self,
        array: &DafArray<'_>,
        et: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), SpkStateError> {
        let first = self.window_start(array, et)?;

        let epochs = (first..first + self.window)
            .map(|i| self.epoch(array, i))
            .collect::<Result<Vec<f64>, _>>()?;
        let states = array.words(6 * first, 6 * self.window)?;
        let component = |k: usize| -> Vec<f64> { states.chunks_exact(6).map(|s| s[k]).collect() };

        let mut position = Vector3::zeros();
        let mut velocity = Vector3::zeros();
        match self.interpolation {
            Interpolation::Lagrange => {
                for axis in 0..3 {
                    position[axis] = lagrange(&epochs, &component(axis), et);
                    velocity[axis] = lagrange(&epochs, &component(axis + 3), et);
                }
            }
            Interpolation::Hermite => {
                for axis in 0..3 {
                    let (p, v) = hermite(&epochs, &component(axis), &component(axis + 3), et);
                    position[axis] = p;
                    velocity[axis] = v;
                }
            }
        }

        Ok((position, velocity))
    }
}

/// Evaluate the Lagrange polynomial through `(xs[i], ys[i])` at `x`.
pub fn lagrange(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    xs.iter()
        .zip(ys)
        .enumerate()
        .map(|(i, (xi, yi))| {
            let basis: f64 = xs
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, xj)| (x - xj) / (xi - xj))
                .product();
            yi * basis
        })
        .sum()
}

/// Evaluate the Hermite polynomial matching values `ys` and derivatives `dys`
/// at abscissas `xs`, returning the value and the derivative at `x`.
///
/// Built from divided differences over the doubled nodes
/// `z = (x0, x0, x1, x1, ...)`, then evaluated in Newton form.
pub fn hermite(xs: &[f64], ys: &[f64], dys: &[f64], x: f64) -> (f64, f64) {
    let m = 2 * xs.len();
    if m == 0 {
        return (0.0, 0.0);
    }
    let z: Vec<f64> = xs.iter().flat_map(|&xi| [xi, xi]).collect();

    // table[k] holds the current column of divided differences ending at z[k]
    let mut table: Vec<f64> = (0..m).map(|k| ys[k / 2]).collect();
    let mut coefficients = vec![table[0]];

    for order in 1..m {
        for k in (order..m).rev() {
            table[k] = if order == 1 && k % 2 == 1 {
                dys[k / 2]
            } else {
                (table[k] - table[k - 1]) / (z[k] - z[k - order])
            };
        }
        coefficients.push(table[order]);
    }

    let mut value = coefficients[m - 1];
    let mut derivative = 0.0;
    for j in (0..m - 1).rev() {
        derivative = derivative * (x - z[j]) + value;
        value = value * (x - z[j]) + coefficients[j];
    }

    (value, derivative)
}

#[cfg(test)]
mod test_discrete_states {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_lagrange_reproduces_cubic() {
        let f = |x: f64| 2.0 * x * x * x - x + 4.0;
        let xs = [-1.0, 0.5, 2.0, 3.5];
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();

        for x in [-0.5, 1.0, 2.7] {
            assert_relative_eq!(lagrange(&xs, &ys, x), f(x), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_hermite_reproduces_quintic() {
        // Three nodes with derivatives determine a degree-5 polynomial exactly.
        let f = |x: f64| x.powi(5) - 3.0 * x.powi(3) + x - 2.0;
        let df = |x: f64| 5.0 * x.powi(4) - 9.0 * x * x + 1.0;
        let xs = [0.0, 1.0, 2.5];
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let dys: Vec<f64> = xs.iter().map(|&x| df(x)).collect();

        for x in [0.0, 0.3, 1.7, 2.5] {
            let (value, derivative) = hermite(&xs, &ys, &dys, x);
            assert_relative_eq!(value, f(x), epsilon = 1e-9);
            assert_relative_eq!(derivative, df(x), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_hermite_single_node_is_tangent_line() {
        let (value, derivative) = hermite(&[1.0], &[3.0], &[2.0], 4.0);
        assert_eq!(value, 9.0);
        assert_eq!(derivative, 2.0);
    }
}
