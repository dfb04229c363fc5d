use std::{error::Error, path::Path};

use toetools_formats::dag::{ClippingMesh, ScaleFactor};
use tracing::info;

/// Multiplies every position of a clipping mesh by `factor` and writes the result with a
/// bounding radius recomputed for the new size.
pub fn rescale(input: &Path, output: &Path, factor: ScaleFactor) -> Result<(), Box<dyn Error>> {
    let mesh = ClippingMesh::open(input, Some(factor))?;

    let triangles = mesh
        .triangles
        .iter()
        .map(|triangle| triangle.map(u32::from))
        .collect::<Vec<_>>();
    let rescaled = ClippingMesh::from_triangles(mesh.origin, &mesh.vertices, &triangles, None)?;
    rescaled.save(output)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        factor = factor.get(),
        bounding_radius = rescaled.bounding_radius,
        "Rescaled clipping mesh"
    );

    Ok(())
}
