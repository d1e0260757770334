use crate::block::Block;
use crate::derivative::ElasticKernel;
use crate::error::*;
use crate::fields::Fields;
use crate::util::*;
use vtkio::model::*;

/// Write the owned part of one block: physical coordinates as points, one
/// scalar array per state component plus the Jacobian.
///
/// Does nothing when this process owns no part of the block.
pub fn write_vtk<F: AsRef<std::path::Path>>(
    block: &Block,
    kernel: ElasticKernel,
    fields: &Fields,
    s: &F,
) -> SolverResult<()> {
    let Some(aabb) = block.coord().owned() else {
        return Ok(());
    };
    log::info!("Writing vtk: {:?}", s.as_ref());

    let buffer_size = aabb.buffer_size();
    let mut points = Vec::with_capacity(3 * buffer_size);
    for coord in aabb.coord_iter() {
        let x = fields.coords(&coord);
        points.extend(x.iter().map(|v| *v as f32));
    }

    let (vertices, cell_type): (Vec<Coord3>, CellType) = if kernel.ndim() == 2 {
        (
            vec![vector![0, 0, 0], vector![1, 0, 0], vector![1, 1, 0], vector![0, 1, 0]],
            CellType::Quad,
        )
    } else {
        (
            vec![
                vector![0, 0, 0],
                vector![1, 0, 0],
                vector![1, 0, 1],
                vector![0, 0, 1],
                vector![0, 1, 0],
                vector![1, 1, 0],
                vector![1, 1, 1],
                vector![0, 1, 1],
            ],
            CellType::Hexahedron,
        )
    };

    let cell_bounds = aabb.cell_bounds();
    let n_cells = cell_bounds.buffer_size();
    let mut connectivity = Vec::with_capacity(n_cells * vertices.len());
    let mut offsets = Vec::with_capacity(n_cells);
    let mut cell_types = Vec::with_capacity(n_cells);
    let mut offset = 0;
    for cell_coord in cell_bounds.coord_iter() {
        // a single owned layer has no cells
        if vertices.iter().any(|v| !aabb.contains(&(cell_coord + v))) {
            continue;
        }
        for v in &vertices {
            connectivity.push(aabb.coord_to_linear(&(cell_coord + v)) as u64);
        }
        offset += vertices.len() as u64;
        offsets.push(offset);
        cell_types.push(cell_type);
    }

    let npts = fields.npts();
    let scalar = |name: &str, data: Vec<f32>| {
        Attribute::DataArray(DataArray {
            name: name.to_string(),
            elem: ElementType::Scalars {
                num_comp: 1,
                lookup_table: None,
            },
            data: IOBuffer::F32(data),
        })
    };
    let mut point_data: Vec<Attribute> = kernel
        .component_names()
        .iter()
        .enumerate()
        .map(|(comp, name)| {
            let data = aabb
                .coord_iter()
                .map(|c| fields.f[comp * npts + fields.point(&c)] as f32)
                .collect();
            scalar(name, data)
        })
        .collect();
    point_data.push(scalar(
        "jacobian",
        aabb.coord_iter().map(|c| fields.jac[fields.point(&c)] as f32).collect(),
    ));

    Vtk {
        version: Version::Auto,
        title: format!("block {}", block.index()),
        byte_order: ByteOrder::LittleEndian,
        file_path: None,
        data: DataSet::inline(UnstructuredGridPiece {
            points: IOBuffer::F32(points),
            cells: Cells {
                cell_verts: VertexNumbers::XML {
                    connectivity,
                    offsets,
                },
                types: cell_types,
            },
            data: Attributes {
                point: point_data,
                cell: vec![],
            },
        }),
    }
    .export(s)
    .map_err(|e| SolverError::Output(format!("{:?}: {}", s.as_ref(), e)))
}
