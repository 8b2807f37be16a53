use super::mesh::{element::Element, Mesh, MeshError, Result};

#[cfg(feature = "json_export")]
use json::{object, JsonValue};
use log::debug;
#[cfg(feature = "json_export")]
use num_complex::Complex64;
use rayon::prelude::*;
use std::ops::{Add, Mul};

/// A nodal Solution over a [Mesh].
///
/// Bundles a set of DoF values with the Mesh and Elements they are defined over so the approximate
/// solution can be evaluated (or sampled) anywhere in [0, 1]. DoF values can be real or complex.
pub struct SolutionField<'m, T> {
    mesh: &'m Mesh,
    dofs: &'m [T],
    elements: &'m [Element],
}

impl<'m, T> SolutionField<'m, T>
where
    T: Copy + Send + Sync + Add<Output = T> + Mul<f64, Output = T>,
{
    /// Pair a set of nodal values with the Mesh and Elements they are defined over
    ///
    /// * `dofs`: one value per Node of the Mesh
    /// * `elements`: one Element per Mesh Element, ordered by id (see [`Mesh::initialize_elements`])
    pub fn new(mesh: &'m Mesh, dofs: &'m [T], elements: &'m [Element]) -> Result<Self> {
        if dofs.len() != mesh.total_num_nodes() {
            Err(MeshError::DofCountMismatch {
                expected: mesh.total_num_nodes(),
                found: dofs.len(),
            })
        } else if elements.len() != mesh.total_num_elements() {
            Err(MeshError::ElementCountMismatch {
                expected: mesh.total_num_elements(),
                found: elements.len(),
            })
        } else {
            Ok(Self {
                mesh,
                dofs,
                elements,
            })
        }
    }

    /// Evaluate the approximate solution at `x` (which must be in [0, 1])
    pub fn value_at(&self, x: f64) -> T {
        self.mesh.approx_value(x, self.dofs, self.elements)
    }

    /// Evaluate the approximate solution at `x`, returning an error if `x` is outside of the Mesh
    pub fn try_value_at(&self, x: f64) -> Result<T> {
        self.mesh.try_approx_value(x, self.dofs, self.elements)
    }

    /// Evaluate the approximate solution at `density` evenly spaced points over [0, 1] (endpoints included)
    ///
    /// Returns `(x, value)` pairs in increasing order of `x`
    pub fn sample_uniform(&self, density: usize) -> Result<Vec<(f64, T)>> {
        if density < 2 {
            return Err(MeshError::InvalidDensity { density });
        }
        debug!("Sampling Solution at {} points", density);

        Ok(uniform_range(density)
            .into_par_iter()
            .map(|x| (x, self.value_at(x)))
            .collect())
    }
}

#[cfg(feature = "json_export")]
impl<'m> SolutionField<'m, f64> {
    /// Produce a Json Object describing a uniform sampling of this Solution
    pub fn samples_to_json(&self, density: usize) -> Result<JsonValue> {
        let (x, values): (Vec<f64>, Vec<f64>) = self.sample_uniform(density)?.into_iter().unzip();

        Ok(object! {
            "x": JsonValue::from(x),
            "values": JsonValue::from(values),
        })
    }
}

#[cfg(feature = "json_export")]
impl<'m> SolutionField<'m, Complex64> {
    /// Produce a Json Object describing a uniform sampling of this Solution (real and imaginary parts stored separately)
    pub fn samples_to_json(&self, density: usize) -> Result<JsonValue> {
        let samples = self.sample_uniform(density)?;

        Ok(object! {
            "x": JsonValue::from(samples.iter().map(|(x, _)| *x).collect::<Vec<_>>()),
            "values": JsonValue::from(samples.iter().map(|(_, v)| v.re).collect::<Vec<_>>()),
            "values_im": JsonValue::from(samples.iter().map(|(_, v)| v.im).collect::<Vec<_>>()),
        })
    }
}

// the last point is exactly 1.0 so it never falls outside of the Mesh
fn uniform_range(n: usize) -> Vec<f64> {
    let last = (n - 1) as f64;
    (0..n).map(|i| i as f64 / last).collect()
}
