use std::{
    error::Error,
    io,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand, ValueEnum};
use toetools_config::{Options, Paths, DATA_PATH_ENV};
use toetools_formats::dag::ScaleFactor;
use tracing::warn;

use crate::{
    describe::{describe_dag, describe_mdf, describe_skm},
    materials::report_materials,
    rescale::rescale,
    scan::scan,
};

mod describe;
mod materials;
mod rescale;
mod scan;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory that material and texture paths inside models are relative to.
    #[arg(long, global = true, env(DATA_PATH_ENV))]
    pub data_path: Option<PathBuf>,

    /// Log decoding details.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Action,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum AssetType {
    Skm,
    Dag,
    Mdf,
}

impl AssetType {
    fn check_describe_flags(
        self,
        validate: bool,
        scale: Option<ScaleFactor>,
    ) -> Result<(), String> {
        if validate && self != AssetType::Skm {
            return Err(format!("--validate only applies to skm, not {self:?}"));
        }
        if scale.is_some() && self != AssetType::Dag {
            return Err(format!("--scale only applies to dag, not {self:?}"));
        }

        Ok(())
    }
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Describe the asset of a given type at a path.
    Describe {
        #[arg(value_enum)]
        ty: AssetType,

        path: PathBuf,

        /// Check every cross reference of a skeletal mesh. Only valid with `skm`.
        #[arg(long)]
        validate: bool,

        /// Scale clipping mesh positions while reading. Only valid with `dag`.
        #[arg(short, long)]
        scale: Option<ScaleFactor>,
    },
    /// Resolve and parse every material a skeletal mesh references.
    Materials { path: PathBuf },
    /// Scale a clipping mesh and write it back with a recomputed bounding radius.
    Rescale {
        input: PathBuf,

        output: PathBuf,

        #[arg(short, long, default_value_t = ScaleFactor::DEFAULT.get())]
        factor: f32,
    },
    /// List clipping meshes below a directory that hold more than one object.
    Scan { path: PathBuf },
}

impl Action {
    pub fn run(self, data_root: Option<&Path>, paths: &mut Paths) -> Result<(), Box<dyn Error>> {
        let mut out = io::stdout().lock();

        match self {
            Action::Describe {
                ty,
                path,
                validate,
                scale,
            } => {
                ty.check_describe_flags(validate, scale)?;

                match ty {
                    AssetType::Skm => describe_skm(&path, validate, &mut out)?,
                    AssetType::Dag => describe_dag(&path, scale, &mut out)?,
                    AssetType::Mdf => describe_mdf(&path, &mut out)?,
                }

                paths.remember_import(&path);
            }
            Action::Materials { path } => {
                let root = data_root.ok_or_else(|| {
                    format!("No data path configured, pass --data-path or set {DATA_PATH_ENV}")
                })?;

                report_materials(&path, root, &mut out)?;
                paths.remember_import(&path);
            }
            Action::Rescale {
                input,
                output,
                factor,
            } => {
                rescale(&input, &output, ScaleFactor::new(factor)?)?;

                paths.remember_import(&input);
                paths.remember_export(&output);
            }
            Action::Scan { path } => {
                scan(&path, &mut out)?;
            }
        }

        Ok(())
    }
}

pub fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let Cli {
        data_path, command, ..
    } = cli;

    let mut options = Options::load().unwrap_or_else(|err| {
        warn!("Using default settings: {err}");
        Options::default()
    });

    let data_root = data_path.or_else(|| options.data_root().map(Path::to_path_buf));
    command.run(data_root.as_deref(), &mut options.paths)?;

    if let Err(err) = options.save() {
        warn!("Could not save settings: {err}");
    }

    Ok(())
}
