use crate::error::Result;
use crate::grid::Heightfield;
use crate::road_mask::RoadMask;
use ddsfile::{AlphaMode, D3D10ResourceDimension, Dds, DxgiFormat, NewDxgiParams};
use half::f16;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a heightfield as a single channel 32-bit float texture.
pub fn write_heightmap_r32f(path: &Path, heightfield: &Heightfield) -> Result<()> {
    let mut bytes = Vec::with_capacity(heightfield.len() * 4);
    for &height in heightfield.cells() {
        bytes.extend_from_slice(&height.to_le_bytes());
    }

    write_dds(path, heightfield.width(), heightfield.height(), DxgiFormat::R32_Float, bytes)
}

/// Write a heightfield as a half precision texture.
pub fn write_heightmap_r16f(path: &Path, heightfield: &Heightfield) -> Result<()> {
    let mut bytes = Vec::with_capacity(heightfield.len() * 2);
    for &height in heightfield.cells() {
        bytes.extend_from_slice(&f16::from_f32(height).to_bits().to_le_bytes());
    }

    write_dds(path, heightfield.width(), heightfield.height(), DxgiFormat::R16_Float, bytes)
}

/// Write a road mask as an 8-bit texture: 255 solid, 0 hole.
pub fn write_mask_r8(path: &Path, mask: &RoadMask) -> Result<()> {
    let bytes = mask
        .grid()
        .cells()
        .iter()
        .map(|&open| if open { u8::MAX } else { 0 })
        .collect();

    write_dds(path, mask.width(), mask.height(), DxgiFormat::R8_UNorm, bytes)
}

fn write_dds(path: &Path, width: usize, height: usize, format: DxgiFormat, bytes: Vec<u8>) -> Result<()> {
    let params = NewDxgiParams {
        height: height as u32,
        width: width as u32,
        depth: None,
        format,
        mipmap_levels: Some(1),
        array_layers: Some(1),
        caps2: None,
        is_cubemap: false,
        resource_dimension: D3D10ResourceDimension::Texture2D,
        alpha_mode: AlphaMode::Unknown,
    };

    let mut dds = Dds::new_dxgi(params)?;
    dds.data = bytes;
    let mut out = BufWriter::new(File::create(path)?);
    dds.write(&mut out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use std::fs;

    #[test]
    fn heightmap_round_trips_through_ddsfile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heights.dds");
        let heights = Grid::from_fn(4, 3, |x, z| (x + z * 4) as f32 * 0.1).unwrap();

        write_heightmap_r32f(&path, &heights).unwrap();

        let dds = Dds::read(&mut fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(dds.get_width(), 4);
        assert_eq!(dds.get_height(), 3);
        assert_eq!(dds.get_dxgi_format(), Some(DxgiFormat::R32_Float));
        let sixth = f32::from_le_bytes(dds.data[20..24].try_into().unwrap());
        assert_eq!(sixth, heights.cells()[5]);
    }

    #[test]
    fn half_precision_and_mask_textures_have_expected_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let heights = Grid::new(8, 8, 0.5f32).unwrap();
        let half_path = dir.path().join("half.dds");
        write_heightmap_r16f(&half_path, &heights).unwrap();
        let dds = Dds::read(&mut fs::File::open(&half_path).unwrap()).unwrap();
        assert_eq!(dds.data.len(), 8 * 8 * 2);

        let mask = RoadMask::filled(5, 5).unwrap().inverted();
        let mask_path = dir.path().join("mask.dds");
        write_mask_r8(&mask_path, &mask).unwrap();
        let dds = Dds::read(&mut fs::File::open(&mask_path).unwrap()).unwrap();
        assert_eq!(dds.data, vec![0u8; 25]);
    }
}
