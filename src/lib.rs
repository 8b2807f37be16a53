/*!
# FEM 1D

A uniform, linear Finite Element Mesh over the unit interval.

The [`Mesh`] partitions [0, 1] into `n` equally sized [`Element`]s and provides the geometric and shape function
queries needed by a surrounding solver: node/element coordinates, point location, mappings between the global
frame and the reference element [-1, 1], and evaluation of an approximate solution from nodal Degrees of Freedom.

```
use fem_1d::{Mesh, SolutionField};

let mesh = Mesh::new(2).unwrap();
let elements = mesh.initialize_elements();
let dofs = [0.0, 5.0, 10.0];

assert!((mesh.approx_value(0.75, &dofs, &elements) - 7.5).abs() < 1e-14);

let field = SolutionField::new(&mesh, &dofs, &elements).unwrap();
let samples = field.sample_uniform(5).unwrap();
assert_eq!(samples.len(), 5);
```

## Features
* `json_export` (default): JSON descriptions of Meshes, Elements and sampled solutions
*/

/// 1D FEM Domain: the Mesh, its Elements and solution fields over them
pub mod domain;

pub use domain::{
    fields::SolutionField,
    mesh::{element::Element, shape_fns, Mesh, MeshError, Result, REF_COORD_TOLERANCE},
    Domain,
};
