#[cfg(feature = "json_export")]
use json::{array, object, JsonValue};
use nalgebra::Matrix2;
use std::fmt;

/// The `Element`s are the basic geometric unit of the Mesh.
///
/// An Element is a plain record produced by [`Mesh::initialize_element`](super::Mesh::initialize_element).
/// The Mesh does not keep track of the Elements it creates; callers typically hold them in a `Vec`
/// indexed by `id`.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Cardinal index of the Element (its position in a caller-held Element sequence)
    pub id: usize,
    /// Global coordinate of the left endpoint
    pub n1: f64,
    /// Global coordinate of the right endpoint
    pub n2: f64,
    /// Global node index of the left endpoint
    pub ind1: usize,
    /// Global node index of the right endpoint
    pub ind2: usize,
    /// Local stiffness contribution
    pub k: Matrix2<f64>,
}

impl Element {
    /// Width of the Element in real space
    pub fn width(&self) -> f64 {
        self.n2 - self.n1
    }

    /// Check if a global coordinate falls within the Element's closed bounds
    pub fn contains(&self, x: f64) -> bool {
        x >= self.n1 && x <= self.n2
    }

    /// The global node indices of the left and right endpoints
    pub fn node_ids(&self) -> [usize; 2] {
        [self.ind1, self.ind2]
    }

    /// Produce a Json Object that describes this Element
    #[cfg(feature = "json_export")]
    pub fn to_json(&self) -> JsonValue {
        object! {
            "id": self.id,
            "coords": array![self.n1, self.n2],
            "nodes": array![self.ind1, self.ind2],
            "k": array![
                array![self.k[(0, 0)], self.k[(0, 1)]],
                array![self.k[(1, 0)], self.k[(1, 1)]]
            ],
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Element {} [{:.5}, {:.5}] (nodes: {}, {})",
            self.id, self.n1, self.n2, self.ind1, self.ind2
        )
    }
}
