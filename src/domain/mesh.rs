/// A Finite Element in Real Space
pub mod element;
/// Linear Lagrange shape functions on the reference element
pub mod shape_fns;

use element::Element;

#[cfg(feature = "json_export")]
use json::{object, JsonValue};
use log::{debug, trace, warn};
use nalgebra::Matrix2;
use rayon::prelude::*;
use smallvec::{smallvec, SmallVec};
use std::ops::{Add, Mul};
use thiserror::Error;

/// Slack allowed on the reference coordinate bounds [-1, 1] when checking frame mappings.
/// Covers the rounding in `x / element_width` at the right edge of the domain.
pub const REF_COORD_TOLERANCE: f64 = 1e-12;

/// Errors produced by checked Mesh and field operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    #[error("Mesh must have at least one Element; cannot construct Mesh with {num_elements} Elements!")]
    InvalidArgument { num_elements: usize },
    #[error("Point {x} is outside the Mesh domain [0, 1]; cannot locate Element!")]
    OutsideDomain { x: f64 },
    #[error("Expected {expected} nodal DoF values (one per Node); found {found}!")]
    DofCountMismatch { expected: usize, found: usize },
    #[error("Expected {expected} Elements (one per Mesh Element); found {found}!")]
    ElementCountMismatch { expected: usize, found: usize },
    #[error("Sampling density must be at least 2; found {density}!")]
    InvalidDensity { density: usize },
}

pub type Result<T> = std::result::Result<T, MeshError>;

/// Uniform Mesh over the unit interval [0, 1].
///
/// ```text
///  0         1         2               n     <- node ids
///  *---------*---------*----- ... -----*
///  |    0    |    1    |         n-1   |     <- element ids
/// 0.0       1/n       2/n             1.0
/// ```
///
/// The Mesh is immutable after construction. All queries are pure, so a single Mesh can be shared
/// across threads.
///
/// Query preconditions (id ranges, points inside the domain) are contracts: they are checked with
/// debug assertions only. Use the `try_` variants when inputs are not trusted.
#[derive(Debug, Clone)]
pub struct Mesh {
    num_nodes: usize,
    num_elements: usize,
    element_width: f64,
    boundary_nodes: SmallVec<[usize; 2]>,
}

impl Mesh {
    /// Construct a uniform Mesh with `n` Elements
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(MeshError::InvalidArgument { num_elements: n });
        }

        let mesh = Self {
            num_nodes: n + 1,
            num_elements: n,
            element_width: 1.0 / n as f64,
            // holds the node count rather than the index of the last node
            boundary_nodes: smallvec![n + 1],
        };

        debug!(
            "Constructed Mesh with {} Elements, {} Nodes (width: {})",
            mesh.num_elements, mesh.num_nodes, mesh.element_width
        );

        Ok(mesh)
    }

    // ----------------------------------------------------------------------------------------------------
    // General Data Retrieval
    // ----------------------------------------------------------------------------------------------------

    /// Total number of Elements in the Mesh
    pub fn total_num_elements(&self) -> usize {
        self.num_elements
    }

    /// Total number of Nodes in the Mesh
    pub fn total_num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Width of every Element in the Mesh
    pub fn element_width(&self) -> f64 {
        self.element_width
    }

    /// Boundary node bookkeeping recorded at construction.
    ///
    /// This contains a single entry equal to [`total_num_nodes`](Self::total_num_nodes), which is one past
    /// the index of the right-most Node. It is not consumed anywhere in this crate.
    pub fn boundary_nodes(&self) -> &[usize] {
        &self.boundary_nodes
    }

    /// Get the global coordinate of a Node
    pub fn node_coordinate(&self, node_id: usize) -> f64 {
        debug_assert!(
            node_id < self.num_nodes,
            "Node {} does not exist; Mesh only has {} Nodes!",
            node_id,
            self.num_nodes
        );

        node_id as f64 * self.element_width
    }

    /// Iterate over the global coordinates of every Node, in order
    pub fn node_coordinates(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.num_nodes).map(move |node_id| self.node_coordinate(node_id))
    }

    /// Get the left and right endpoints of an Element
    pub fn element_coordinates(&self, element_id: usize) -> [f64; 2] {
        debug_assert!(
            element_id < self.num_elements,
            "Element {} does not exist; Mesh only has {} Elements!",
            element_id,
            self.num_elements
        );

        [
            self.node_coordinate(element_id),
            self.node_coordinate(element_id + 1),
        ]
    }

    // ----------------------------------------------------------------------------------------------------
    // Elements
    // ----------------------------------------------------------------------------------------------------

    /// Build the [Element] with the given cardinal id, including its local stiffness matrix.
    ///
    /// An Element whose right endpoint is exactly `1.0` has its off-diagonal entries and lower-right entry
    /// zeroed:
    /// ```text
    ///  interior:  | 1/h  -1/h |     right boundary:  | 1/h  0 |
    ///             |-1/h   1/h |                      |  0   0 |
    /// ```
    pub fn initialize_element(&self, element_id: usize) -> Element {
        let [n1, n2] = self.element_coordinates(element_id);

        let h = n2 - n1;
        let val = if n2 == 1.0 { 0.0 } else { 1.0 };

        let element = Element {
            id: element_id,
            n1,
            n2,
            ind1: element_id,
            ind2: element_id + 1,
            k: Matrix2::new(1.0 / h, -val / h, -val / h, val / h),
        };

        trace!("Initialized {}", element);
        element
    }

    /// Build every [Element] in the Mesh (in parallel), ordered by id
    pub fn initialize_elements(&self) -> Vec<Element> {
        debug!("Initializing {} Elements", self.num_elements);

        (0..self.num_elements)
            .into_par_iter()
            .map(|element_id| self.initialize_element(element_id))
            .collect()
    }

    // ----------------------------------------------------------------------------------------------------
    // Point Location and Frame Mappings
    // ----------------------------------------------------------------------------------------------------

    /// Find the cardinal id of the Element containing `x`.
    ///
    /// `x` must be in [0, 1]. Points on an interior Node belong to the Element on their right, except `1.0`
    /// which belongs to the last Element.
    pub fn locate_x(&self, x: f64) -> usize {
        let element_id = if x == 1.0 {
            (self.num_elements - 1) as f64
        } else {
            (x / self.element_width).floor()
        };

        debug_assert!(
            element_id >= 0.0 && element_id < self.num_elements as f64,
            "Point {} is outside the Mesh; Cannot locate Element!",
            x
        );

        element_id as usize
    }

    /// Find the cardinal id of the Element containing `x`, returning an error if `x` is not in [0, 1]
    pub fn try_locate_x(&self, x: f64) -> Result<usize> {
        if (0.0..=1.0).contains(&x) {
            // x / element_width can round up to n for points just below 1.0
            let element_id = (x / self.element_width).floor() as usize;
            Ok(element_id.min(self.num_elements - 1))
        } else {
            warn!("Rejected point location query outside the Mesh: {}", x);
            Err(MeshError::OutsideDomain { x })
        }
    }

    /// Map `x` from the global frame into the reference frame [-1, 1] of the Element containing it.
    ///
    /// `element_id` must be the result of [`locate_x`](Self::locate_x) for the same `x`.
    pub fn map_global_to_local_frame(&self, x: f64, element_id: usize) -> f64 {
        debug_assert!(
            element_id as f64 == (x / self.element_width).floor()
                || element_id == self.num_elements - 1,
            "Point {} is not within Element {}; Cannot map to the reference frame!",
            x,
            element_id
        );

        let ref_coord = (x / self.element_width - element_id as f64) * 2.0 - 1.0;

        debug_assert!(
            ref_coord >= -1.0 - REF_COORD_TOLERANCE && ref_coord <= 1.0 + REF_COORD_TOLERANCE,
            "Reference coordinate {} is outside [-1, 1]!",
            ref_coord
        );

        ref_coord
    }

    /// Map a reference coordinate into the global frame of the Element spanning [n1, n2]
    ///
    /// Independent of the Mesh's parameters.
    pub fn map_local_to_global_frame(&self, ref_coord: f64, n1: f64, n2: f64) -> f64 {
        shape_fns::reference_to_real(ref_coord, n1, n2)
    }

    // ----------------------------------------------------------------------------------------------------
    // Shape Functions
    // ----------------------------------------------------------------------------------------------------

    /// Values of the two linear shape functions at a reference coordinate (independent of the Mesh's parameters)
    pub fn shape_function_values(&self, ref_coord: f64) -> [f64; 2] {
        shape_fns::linear_values(ref_coord)
    }

    /// Returns `[-n, n]` where `n` is the number of Elements.
    ///
    /// This does *not* differentiate with respect to `ref_coord` (which is ignored). On this uniform Mesh the
    /// result coincides with the real-space gradient of the shape functions (`∓1/h`); the reference-space
    /// gradient would be `∓0.5`.
    pub fn shape_function_derivatives(&self, _ref_coord: f64) -> [f64; 2] {
        let n = self.num_elements as f64;
        [-n, n]
    }

    // ----------------------------------------------------------------------------------------------------
    // Solution Reconstruction
    // ----------------------------------------------------------------------------------------------------

    /// Evaluate the approximate solution at `x` from the nodal values `d`.
    ///
    /// * `d`: one value per Node, indexed by global node id
    /// * `elements`: every Element of the Mesh, indexed by id (see [`initialize_elements`](Self::initialize_elements))
    ///
    /// Panics if `d` or `elements` are too short to cover the Element containing `x`.
    pub fn approx_value<T>(&self, x: f64, d: &[T], elements: &[Element]) -> T
    where
        T: Copy + Add<Output = T> + Mul<f64, Output = T>,
    {
        let element_id = self.locate_x(x);
        let ref_coord = self.map_global_to_local_frame(x, element_id);

        let e = &elements[element_id];
        shape_fns::interpolate(ref_coord, [d[e.ind1], d[e.ind2]])
    }

    /// Evaluate the approximate solution at `x`, returning an error if `x` is not in [0, 1]
    ///
    /// Uses [`try_locate_x`](Self::try_locate_x), so points just below the right edge of the domain always
    /// resolve to the last Element. Still panics if `d` or `elements` are too short.
    pub fn try_approx_value<T>(&self, x: f64, d: &[T], elements: &[Element]) -> Result<T>
    where
        T: Copy + Add<Output = T> + Mul<f64, Output = T>,
    {
        let element_id = self.try_locate_x(x)?;
        let ref_coord = self.map_global_to_local_frame(x, element_id);

        let e = &elements[element_id];
        Ok(shape_fns::interpolate(ref_coord, [d[e.ind1], d[e.ind2]]))
    }

    /// Produce a Json Object that describes this Mesh
    #[cfg(feature = "json_export")]
    pub fn to_json(&self) -> JsonValue {
        object! {
            "num_elements": self.num_elements,
            "num_nodes": self.num_nodes,
            "element_width": self.element_width,
            "boundary_nodes": JsonValue::from(self.boundary_nodes.to_vec()),
            "nodes": JsonValue::from(self.node_coordinates().collect::<Vec<f64>>()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn mesh_parameters() {
        for n in 1..=64 {
            let mesh = Mesh::new(n).unwrap();
            assert_eq!(mesh.total_num_nodes(), n + 1);
            assert_eq!(mesh.total_num_elements(), n);
            assert!((mesh.element_width() - 1.0 / n as f64).abs() < 1e-15);
        }
    }

    #[test]
    fn zero_elements_rejected() {
        assert_eq!(
            Mesh::new(0).unwrap_err(),
            MeshError::InvalidArgument { num_elements: 0 }
        );
    }

    #[test]
    fn boundary_nodes_record_node_count() {
        let mesh = Mesh::new(4).unwrap();
        assert_eq!(mesh.boundary_nodes(), &[5]);
    }

    #[test]
    fn node_and_element_coordinates() {
        let n = 7;
        let mesh = Mesh::new(n).unwrap();

        for (node_id, coord) in mesh.node_coordinates().enumerate() {
            assert!((coord - node_id as f64 / n as f64).abs() < 1e-14);
        }

        for element_id in 0..n {
            let [n1, n2] = mesh.element_coordinates(element_id);
            assert!((n1 - element_id as f64 / n as f64).abs() < 1e-14);
            assert!((n2 - (element_id + 1) as f64 / n as f64).abs() < 1e-14);
            assert!((n2 - n1 - mesh.element_width()).abs() < 1e-14);
        }
    }

    #[test]
    fn four_element_scenario() {
        let mesh = Mesh::new(4).unwrap();

        assert_eq!(mesh.element_width(), 0.25);
        assert_eq!(mesh.locate_x(0.6), 2);
        assert_eq!(mesh.element_coordinates(2), [0.5, 0.75]);

        let e2 = mesh.initialize_element(2);
        assert_eq!(e2.k, Matrix2::new(4.0, -4.0, -4.0, 4.0));
        assert_eq!(e2.node_ids(), [2, 3]);

        let e3 = mesh.initialize_element(3);
        assert_eq!(e3.k, Matrix2::new(4.0, 0.0, 0.0, 0.0));
        assert_eq!(e3.n2, 1.0);
    }

    #[test]
    fn element_invariants() {
        let mesh = Mesh::new(8).unwrap();
        let elements = mesh.initialize_elements();

        assert_eq!(elements.len(), 8);
        for (element_id, element) in elements.iter().enumerate() {
            assert_eq!(element.id, element_id);
            assert_eq!(element.ind2, element.ind1 + 1);
            assert!(element.n1 < element.n2);
            assert!((element.width() - mesh.element_width()).abs() < 1e-15);
            assert_eq!(*element, mesh.initialize_element(element_id));
        }
    }

    #[test]
    fn locate_right_boundary() {
        for n in 1..=16 {
            let mesh = Mesh::new(n).unwrap();
            assert_eq!(mesh.locate_x(1.0), n - 1);
            assert_eq!(mesh.locate_x(0.0), 0);
        }
    }

    #[test]
    fn checked_location() {
        let mesh = Mesh::new(4).unwrap();
        assert_eq!(mesh.try_locate_x(0.3), Ok(1));
        assert_eq!(mesh.try_locate_x(1.0), Ok(3));
        assert_eq!(
            mesh.try_locate_x(1.5),
            Err(MeshError::OutsideDomain { x: 1.5 })
        );
        assert!(mesh.try_locate_x(-0.1).is_err());
        assert!(mesh.try_locate_x(f64::NAN).is_err());
    }

    #[test]
    fn checked_location_just_below_right_edge() {
        let x = 1.0 - f64::EPSILON / 2.0;

        let mesh = Mesh::new(3).unwrap();
        assert_eq!(mesh.try_locate_x(x), Ok(2));

        let elements = mesh.initialize_elements();
        let d = [0.0, 1.0, 2.0, 3.0];
        assert!((mesh.try_approx_value(x, &d, &elements).unwrap() - 3.0).abs() < 1e-12);

        for n in 1..=200 {
            let mesh = Mesh::new(n).unwrap();
            assert!(mesh.try_locate_x(x).unwrap() < n);
            assert_eq!(mesh.try_locate_x(1.0), Ok(n - 1));
        }
    }

    #[test]
    fn right_edge_rounding() {
        for n in [49, 98, 103] {
            let mesh = Mesh::new(n).unwrap();
            let elements = mesh.initialize_elements();
            let d: Vec<f64> = (0..mesh.total_num_nodes()).map(|i| i as f64).collect();

            let ref_coord = mesh.map_global_to_local_frame(1.0, n - 1);
            assert!((ref_coord - 1.0).abs() <= REF_COORD_TOLERANCE);

            assert!((mesh.approx_value(1.0, &d, &elements) - n as f64).abs() < 1e-10);
            assert!((mesh.try_approx_value(1.0, &d, &elements).unwrap() - n as f64).abs() < 1e-10);
        }

        // 49 * (1 / 49) rounds below 1.0, so the last Element keeps the interior stencil
        let mesh = Mesh::new(49).unwrap();
        let last = mesh.initialize_element(48);
        let h = last.width();
        assert!(last.n2 != 1.0);
        assert_eq!(last.k, Matrix2::new(1.0 / h, -1.0 / h, -1.0 / h, 1.0 / h));

        // the stencil is zeroed exactly when the right endpoint lands on 1.0
        for n in 1..=200 {
            let mesh = Mesh::new(n).unwrap();
            let last = mesh.initialize_element(n - 1);
            assert_eq!(last.k[(1, 1)] == 0.0, last.n2 == 1.0);
        }
    }

    #[test]
    fn element_contains() {
        let mesh = Mesh::new(4).unwrap();
        let element = mesh.initialize_element(1);

        assert!(element.contains(0.3));
        assert!(element.contains(0.25));
        assert!(element.contains(0.5));
        assert!(!element.contains(0.6));
        assert!(!element.contains(0.1));
    }

    #[test]
    fn frame_mapping_round_trip() {
        let mesh = Mesh::new(6).unwrap();

        for i in 0..100 {
            let x = i as f64 / 100.0;
            let element_id = mesh.locate_x(x);
            let ref_coord = mesh.map_global_to_local_frame(x, element_id);
            assert!((-1.0..=1.0).contains(&ref_coord));

            let [n1, n2] = mesh.element_coordinates(element_id);
            let x_back = mesh.map_local_to_global_frame(ref_coord, n1, n2);
            assert!((x_back - x).abs() < 1e-12);
        }
    }

    #[test]
    fn right_boundary_maps_to_reference_end() {
        let mesh = Mesh::new(4).unwrap();
        let ref_coord = mesh.map_global_to_local_frame(1.0, 3);
        assert!((ref_coord - 1.0).abs() < 1e-14);
    }

    #[test]
    fn shape_functions() {
        let mesh = Mesh::new(5).unwrap();
        for i in 0..=10 {
            let r = -1.0 + i as f64 * 0.2;
            let [n0, n1] = mesh.shape_function_values(r);
            assert!((n0 + n1 - 1.0).abs() < 1e-15);

            // constant regardless of the reference coordinate
            assert_eq!(mesh.shape_function_derivatives(r), [-5.0, 5.0]);
        }
    }

    #[test]
    fn approx_value_two_elements() {
        let mesh = Mesh::new(2).unwrap();
        let elements = mesh.initialize_elements();
        let d = [0.0, 5.0, 10.0];

        assert!((mesh.approx_value(0.75, &d, &elements) - 7.5).abs() < 1e-14);
        assert!((mesh.approx_value(0.0, &d, &elements)).abs() < 1e-14);
        assert!((mesh.approx_value(1.0, &d, &elements) - 10.0).abs() < 1e-14);
    }

    #[test]
    fn approx_value_reproduces_identity_field() {
        let n = 5;
        let mesh = Mesh::new(n).unwrap();
        let elements = mesh.initialize_elements();
        let d: Vec<f64> = (0..mesh.total_num_nodes()).map(|i| i as f64).collect();

        for node_id in 0..mesh.total_num_nodes() {
            let x = mesh.node_coordinate(node_id);
            assert!((mesh.approx_value(x, &d, &elements) - node_id as f64).abs() < 1e-12);
        }

        for i in 0..50 {
            let x = i as f64 / 50.0;
            assert!((mesh.approx_value(x, &d, &elements) - x * n as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn approx_value_complex_field() {
        let mesh = Mesh::new(2).unwrap();
        let elements = mesh.initialize_elements();
        let d = [
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, -2.0),
            Complex64::new(3.0, 2.0),
        ];

        let value = mesh.approx_value(0.75, &d, &elements);
        assert!((value - Complex64::new(2.0, 0.0)).norm() < 1e-14);
    }

    #[test]
    #[cfg(feature = "json_export")]
    fn mesh_json() {
        let mesh = Mesh::new(4).unwrap();
        let mesh_json = mesh.to_json();

        assert_eq!(mesh_json["num_elements"].as_usize(), Some(4));
        assert_eq!(mesh_json["num_nodes"].as_usize(), Some(5));
        assert_eq!(mesh_json["nodes"].len(), 5);
        assert!((mesh_json["nodes"][2].as_f64().unwrap() - 0.5).abs() < 1e-14);
        assert_eq!(mesh_json["boundary_nodes"][0].as_usize(), Some(5));

        let element_json = mesh.initialize_element(3).to_json();
        assert_eq!(element_json["nodes"][1].as_usize(), Some(4));
        assert!((element_json["k"][0][0].as_f64().unwrap() - 4.0).abs() < 1e-14);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn node_out_of_range() {
        let mesh = Mesh::new(4).unwrap();
        mesh.node_coordinate(5);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn element_out_of_range() {
        let mesh = Mesh::new(4).unwrap();
        mesh.element_coordinates(4);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn locate_outside_domain() {
        let mesh = Mesh::new(4).unwrap();
        mesh.locate_x(1.25);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn inconsistent_frame_mapping() {
        let mesh = Mesh::new(4).unwrap();
        mesh.map_global_to_local_frame(0.1, 2);
    }

    #[test]
    #[should_panic]
    fn approx_value_with_missing_elements() {
        let mesh = Mesh::new(4).unwrap();
        let elements = vec![mesh.initialize_element(0)];
        let d = [0.0; 5];
        mesh.approx_value(0.9, &d, &elements);
    }
}
