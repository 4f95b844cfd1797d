mod python;

use crate::model::{ClassSurface, FunctionSurface, ModuleSurface, Surface};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Cannot read source root {}: {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Only produced in fail-fast mode; the default is to collect per-file
    /// errors in the `Extraction`.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, Error, Serialize)]
#[error("Failed to parse {}: {message}", path.display())]
pub struct ParseError {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Abort on the first file that fails to parse instead of collecting.
    pub fail_fast: bool,
    pub respect_gitignore: bool,
    /// Relative-path substrings to skip while walking.
    pub exclude: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            fail_fast: false,
            respect_gitignore: true,
            exclude: Vec::new(),
        }
    }
}

/// Result of one extraction pass: the surface that could be built plus the
/// files that had to be left out of it.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub surface: Surface,
    pub errors: Vec<ParseError>,
}

/// Per-file projection before modules are merged and re-exports resolved.
pub(crate) struct FileSurface {
    pub functions: Vec<FunctionSurface>,
    pub classes: Vec<ClassSurface>,
    pub reexports: Vec<Reexport>,
}

/// A name this module exposes but imports from elsewhere.
pub(crate) struct Reexport {
    pub local_name: String,
    pub source_module: String,
    pub source_name: String,
}

/// Extract the public surface of every Python file under `root`.
///
/// Files are parsed in parallel; the merge is keyed by dotted module name so
/// the result is identical regardless of scheduling. Per-file failures are
/// collected, not raised, unless `fail_fast` is set.
pub fn build_surface(root: &Path, options: &ExtractOptions) -> Result<Extraction, ExtractError> {
    let metadata = std::fs::metadata(root).map_err(|e| ExtractError::Root {
        path: root.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_dir() {
        return Err(ExtractError::Root {
            path: root.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotADirectory),
        });
    }

    let files = discover_files(root, options);

    let parsed: Vec<(String, Result<FileSurface, ParseError>)> = files
        .par_iter()
        .map(|path| {
            let (module, package) = module_name(root, path);
            let outcome = match std::fs::read_to_string(path) {
                Ok(source) => python::parse_source(&source, &package).map_err(|message| {
                    ParseError {
                        path: path.clone(),
                        message,
                    }
                }),
                Err(e) => Err(ParseError {
                    path: path.clone(),
                    message: e.to_string(),
                }),
            };
            (module, outcome)
        })
        .collect();

    let mut file_surfaces: Vec<(String, FileSurface)> = Vec::new();
    let mut errors = Vec::new();
    for (module, outcome) in parsed {
        match outcome {
            Ok(surface) => file_surfaces.push((module, surface)),
            Err(e) if options.fail_fast => return Err(ExtractError::Parse(e)),
            Err(e) => errors.push(e),
        }
    }

    let surface = assemble(file_surfaces);
    Ok(Extraction { surface, errors })
}

fn discover_files(root: &Path, options: &ExtractOptions) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(options.respect_gitignore)
        .build();

    let mut files: Vec<PathBuf> = walker
        .flatten()
        .filter(|entry| entry.path().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "py"))
        .map(|entry| entry.into_path())
        .filter(|path| {
            let relative = path.strip_prefix(root).unwrap_or(path);
            let text = relative.to_string_lossy();
            !options.exclude.iter().any(|pattern| text.contains(pattern))
        })
        .collect();

    // Walk order depends on the filesystem; pin it before fanning out.
    files.sort();
    files
}

/// Dotted module name and the package base used for relative imports.
/// `pkg/sub/__init__.py` -> ("pkg.sub", "pkg.sub"); `pkg/api.py` ->
/// ("pkg.api", "pkg").
fn module_name(root: &Path, file: &Path) -> (String, String) {
    let relative = file.strip_prefix(root).unwrap_or(file).with_extension("");
    let mut parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(os) => Some(os.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let is_package = parts.last().is_some_and(|last| last == "__init__");
    if is_package {
        parts.pop();
    }
    let module = parts.join(".");
    let package = if is_package || parts.is_empty() {
        module.clone()
    } else {
        parts[..parts.len() - 1].join(".")
    };
    (module, package)
}

/// Merge per-file surfaces into one snapshot, resolving re-exports with a
/// single hop inside the tree.
fn assemble(file_surfaces: Vec<(String, FileSurface)>) -> Surface {
    let index: HashMap<&str, usize> = file_surfaces
        .iter()
        .enumerate()
        .map(|(i, (module, _))| (module.as_str(), i))
        .collect();

    let mut function_additions: Vec<(usize, FunctionSurface)> = Vec::new();
    let mut class_additions: Vec<(usize, ClassSurface)> = Vec::new();

    for (importer, (_, surface)) in file_surfaces.iter().enumerate() {
        for reexport in &surface.reexports {
            let Some(&origin) = index.get(reexport.source_module.as_str()) else {
                continue;
            };
            let origin_surface = &file_surfaces[origin].1;
            if let Some(f) = origin_surface
                .functions
                .iter()
                .find(|f| f.name == reexport.source_name)
            {
                let mut f = f.clone();
                f.name = reexport.local_name.clone();
                function_additions.push((importer, f));
            } else if let Some(c) = origin_surface
                .classes
                .iter()
                .find(|c| c.name == reexport.source_name)
            {
                let mut c = c.clone();
                c.name = reexport.local_name.clone();
                class_additions.push((importer, c));
            }
        }
    }

    let mut file_surfaces = file_surfaces;
    for (importer, f) in function_additions {
        file_surfaces[importer].1.functions.push(f);
    }
    for (importer, c) in class_additions {
        file_surfaces[importer].1.classes.push(c);
    }

    let mut modules: BTreeMap<String, ModuleSurface> = BTreeMap::new();
    for (name, surface) in file_surfaces {
        let module = modules
            .entry(name.clone())
            .or_insert_with(|| ModuleSurface::new(name));
        module.functions.extend(surface.functions);
        module.classes.extend(surface.classes);
    }

    Surface::new(modules.into_values().collect())
}
