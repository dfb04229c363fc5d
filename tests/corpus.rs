use std::{error::Error, path::Path};

use libtest_mimic::{Arguments, Failed, Trial};
use toetools::prelude::*;
use walkdir::WalkDir;

/// Decodes every model and material below `$TOEE_DATA_PATH`. Without the variable there is
/// nothing to check and no trials are run.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Arguments::from_args();

    let tests = match std::env::var_os("TOEE_DATA_PATH") {
        Some(root) => WalkDir::new(root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let path = entry.into_path();
                let kind = path.extension()?.to_str()?.to_ascii_lowercase();
                if !matches!(kind.as_str(), "skm" | "dag" | "mdf") {
                    return None;
                }

                let name = path.to_string_lossy().to_string();
                let label = kind.clone();
                Some(Trial::test(name, move || check_file(&path, &kind)).with_kind(label))
            })
            .collect(),
        None => vec![],
    };

    libtest_mimic::run(&args, tests).exit();
}

fn check_file(path: &Path, kind: &str) -> Result<(), Failed> {
    match kind {
        "skm" => {
            let mesh = SkeletalMesh::open(path)?;
            if let Err(SkmError::Invalid(defects)) = mesh.validate() {
                return Err(format!(
                    "{} broken references, first: {}",
                    defects.len(),
                    defects[0]
                )
                .into());
            }
        }
        "dag" => {
            ClippingMesh::open(path, Some(ScaleFactor::DEFAULT))?;
        }
        _ => {
            let bytes = std::fs::read(path)?;
            MaterialDescriptor::parse(&String::from_utf8_lossy(&bytes));
        }
    }

    Ok(())
}
