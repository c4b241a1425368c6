//! Scene archive fixtures.
//!
//! Landsat Level-1 archives are flat gzipped tarballs: member files sit
//! at the archive root with no containing directory. The builder here
//! reproduces that layout.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::Path;

/// Build a flat `.tar.gz` scene archive at `dest` from named members.
pub fn build_scene_archive<P: AsRef<Path>>(
    dest: P,
    members: &[(&str, &[u8])],
) -> std::io::Result<()> {
    let file = std::fs::File::create(dest)?;
    let encoder = GzEncoder::new(file, Compression::fast());
    let mut builder = tar::Builder::new(encoder);

    for (name, data) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data)?;
    }

    builder.into_inner()?.finish()?.flush()?;
    Ok(())
}

/// A plausible MTL metadata stub for archive fixtures.
pub fn mtl_stub(scene_id: &str) -> Vec<u8> {
    format!(
        "GROUP = L1_METADATA_FILE\n  GROUP = METADATA_FILE_INFO\n    LANDSAT_SCENE_ID = \"{}\"\n  END_GROUP = METADATA_FILE_INFO\nEND_GROUP = L1_METADATA_FILE\nEND\n",
        scene_id
    )
    .into_bytes()
}
