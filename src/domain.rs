/// Structures used to evaluate solution fields over a Domain
pub mod fields;
/// The geometric structure of a Domain
pub mod mesh;

use fields::SolutionField;
use mesh::{element::Element, Mesh, Result};

use log::debug;
use std::ops::{Add, Mul};

/// High Level Description of a 1D FEM Domain: a uniform [Mesh] along with all of its [Element]s
#[derive(Debug, Clone)]
pub struct Domain {
    pub mesh: Mesh,
    /// Every Element in the Mesh, indexed by id
    pub elements: Vec<Element>,
}

impl Domain {
    /// Construct a Domain over a uniform Mesh with `n` Elements
    pub fn new(n: usize) -> Result<Self> {
        Ok(Self::from_mesh(Mesh::new(n)?))
    }

    /// Construct a Domain from a Mesh, initializing each of its Elements
    pub fn from_mesh(mesh: Mesh) -> Self {
        let elements = mesh.initialize_elements();
        debug!("Constructed Domain with {} Elements", elements.len());

        Self { mesh, elements }
    }

    /// Iterate over all `Element`s in the Domain
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements.iter()
    }

    /// Number of nodal Degrees of Freedom a solution over this Domain must provide
    pub fn num_dofs(&self) -> usize {
        self.mesh.total_num_nodes()
    }

    /// Evaluate the approximate solution described by the nodal values `d` at `x`
    pub fn approx_value<T>(&self, x: f64, d: &[T]) -> T
    where
        T: Copy + Add<Output = T> + Mul<f64, Output = T>,
    {
        self.mesh.approx_value(x, d, &self.elements)
    }

    /// Pair a set of nodal values with this Domain
    pub fn solution<'m, T>(&'m self, dofs: &'m [T]) -> Result<SolutionField<'m, T>>
    where
        T: Copy + Send + Sync + Add<Output = T> + Mul<f64, Output = T>,
    {
        SolutionField::new(&self.mesh, dofs, &self.elements)
    }
}
