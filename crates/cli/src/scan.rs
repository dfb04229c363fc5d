use std::{
    error::Error,
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

use indicatif::{ParallelProgressIterator, ProgressStyle};
use rayon::prelude::*;
use toetools_formats::dag::DagHeader;
use tracing::warn;
use walkdir::WalkDir;

/// Prints every `.dag` file below `root` whose header declares more than one object and
/// returns how many there were.
pub fn scan(root: &Path, out: &mut impl Write) -> Result<usize, Box<dyn Error>> {
    let files = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|extension| extension.eq_ignore_ascii_case("dag"))
        })
        .collect::<Vec<_>>();

    let style =
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos:>7}/{len:7} {msg}")?;

    let mut found = files
        .par_iter()
        .progress_with_style(style)
        .filter_map(|path| match object_count(path) {
            Ok(count) if count > 1 => Some((path.clone(), count)),
            Ok(_) => None,
            Err(err) => {
                warn!(path = %path.display(), "Skipping unreadable clipping mesh: {err}");
                None
            }
        })
        .collect::<Vec<(PathBuf, u32)>>();
    found.sort();

    for (path, count) in &found {
        writeln!(out, "{count} objects: {}", path.display())?;
    }
    writeln!(out, "{} of {} clipping meshes hold several objects", found.len(), files.len())?;

    Ok(found.len())
}

fn object_count(path: &Path) -> Result<u32, Box<dyn Error + Send + Sync>> {
    let header = DagHeader::read(&mut BufReader::new(File::open(path)?))?;

    Ok(header.object_count())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use toetools_formats::{dag::ClippingMesh, glam::Vec3};

    use super::*;

    #[test]
    fn finds_multi_object_meshes() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let mesh = ClippingMesh {
            origin: Vec3::ZERO,
            bounding_radius: 0.0,
            vertices: vec![],
            triangles: vec![],
        };
        mesh.save(dir.path().join("single.dag")).unwrap();

        let mut bytes = Vec::new();
        mesh.write_to(&mut bytes).unwrap();
        bytes[16..20].copy_from_slice(&3u32.to_le_bytes());
        fs::write(dir.path().join("nested/multi.DAG"), &bytes).unwrap();
        fs::write(dir.path().join("broken.dag"), [1, 2, 3]).unwrap();
        fs::write(dir.path().join("notes.txt"), &bytes).unwrap();

        let mut out = Vec::new();
        let found = scan(dir.path(), &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();

        assert_eq!(found, 1);
        assert!(report.starts_with("3 objects: "));
        assert!(report.contains("multi.DAG"));
        assert!(report.ends_with("1 of 3 clipping meshes hold several objects\n"));
    }
}
