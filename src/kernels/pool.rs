//! The kernel pool: loaded kernel files and the variables of text kernels.
//!
//! Kernels are kept in load order. Later kernels take precedence: SPK
//! segments are searched from the most recently loaded file backwards, and
//! text kernel assignments are replayed in load order so that later
//! assignments win.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

use super::{
    daf::{SpkFile, SpkSegment},
    text_kernel::{PoolValue, PoolVariables, TextKernel},
};
use crate::{constants::NaifId, spkstate_errors::SpkStateError};

/// Kind of a kernel file, from its identification word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelKind {
    /// Binary SPK (`DAF/SPK`, or `NAIF/DAF` for old files).
    Spk,
    /// Text kernel (`KPL/LSK`, `KPL/FK`, `KPL/PCK`, ...).
    Text,
    /// Meta-kernel (`KPL/MK`).
    Meta,
}

impl KernelKind {
    /// Detect the kind from the first bytes of a file.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: File location, used in error messages.
    /// * `head`: At least the first 8 bytes of the file.
    ///
    /// Return
    /// ----------
    /// * The kernel kind, or [`SpkStateError::UnsupportedKernel`] for other
    ///   architectures (binary PCK, CK, DSK, unknown files).
    pub fn detect(path: &Utf8Path, head: &[u8]) -> Result<Self, SpkStateError> {
        let head = &head[..head.len().min(8)];
        let idword = String::from_utf8_lossy(head)
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        match idword.as_str() {
            "DAF/SPK" | "NAIF/DAF" => Ok(KernelKind::Spk),
            "KPL/MK" => Ok(KernelKind::Meta),
            word if word.starts_with("KPL/") => Ok(KernelKind::Text),
            _ => Err(SpkStateError::UnsupportedKernel {
                path: path.to_owned(),
                idword,
            }),
        }
    }
}

#[derive(Debug, Clone)]
enum LoadedKernel {
    Spk(SpkFile),
    Text(TextKernel),
    Meta {
        kernel: TextKernel,
        children: Vec<Utf8PathBuf>,
    },
}

#[derive(Debug, Clone)]
struct LoadedFile {
    path: Utf8PathBuf,
    kernel: LoadedKernel,
}

/// Set of loaded kernels.
///
/// The pool is an ordinary owned value: create one, furnish kernels into it
/// and pass it by reference to the time and state queries.
///
/// See also
/// ------------
/// * [`crate::kernels::scoped::KernelSet`] – Loads a list of kernels and
///   unloads them when dropped.
#[derive(Debug, Clone, Default)]
pub struct KernelPool {
    files: Vec<LoadedFile>,
    variables: PoolVariables,
    /// Meta-kernels being loaded, to reject self-referencing meta-kernels.
    loading: Vec<Utf8PathBuf>,
}

fn utf8_text(path: &Utf8Path, bytes: Vec<u8>) -> Result<String, SpkStateError> {
    String::from_utf8(bytes).map_err(|err| SpkStateError::TextKernelSyntax {
        path: path.to_owned(),
        reason: format!("not valid UTF-8 text: {err}"),
    })
}

impl KernelPool {
    pub fn new() -> Self {
        KernelPool::default()
    }

    /// Load a kernel file.
    ///
    /// A path that is already loaded is unloaded first and loaded again, so
    /// it moves to the highest priority instead of being loaded twice.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: SPK, text kernel or meta-kernel.
    ///
    /// Return
    /// ----------
    /// * `Ok(())` once the kernel and, for a meta-kernel, every kernel it lists
    ///   are loaded. On error the pool is left without the failing kernel.
    pub fn furnish(&mut self, path: impl AsRef<Utf8Path>) -> Result<(), SpkStateError> {
        let path = path.as_ref();

        if self.is_loaded(path) {
            debug!(kernel = %path, "kernel already loaded, reloading it");
            self.unload(path)?;
        }

        let bytes = fs::read(path).map_err(|err| SpkStateError::io(path, err))?;
        match KernelKind::detect(path, &bytes)? {
            KernelKind::Spk => {
                let spk = SpkFile::from_bytes(path, bytes)?;
                info!(kernel = %path, segments = spk.segments().len(), "loaded SPK kernel");
                self.files.push(LoadedFile {
                    path: path.to_owned(),
                    kernel: LoadedKernel::Spk(spk),
                });
            }
            KernelKind::Text => {
                let kernel = TextKernel::parse(path, &utf8_text(path, bytes)?)?;
                kernel.apply(&mut self.variables);
                info!(
                    kernel = %path,
                    assignments = kernel.assignments().len(),
                    "loaded text kernel"
                );
                self.files.push(LoadedFile {
                    path: path.to_owned(),
                    kernel: LoadedKernel::Text(kernel),
                });
            }
            KernelKind::Meta => self.furnish_meta(path, bytes)?,
        }

        Ok(())
    }

    fn furnish_meta(&mut self, path: &Utf8Path, bytes: Vec<u8>) -> Result<(), SpkStateError> {
        if self.loading.iter().any(|loading| loading == path) {
            return Err(SpkStateError::TextKernelSyntax {
                path: path.to_owned(),
                reason: "meta-kernel loads itself".to_string(),
            });
        }

        let kernel = TextKernel::parse(path, &utf8_text(path, bytes)?)?;
        let children = meta_kernel_entries(path, &kernel.variables())?;
        kernel.apply(&mut self.variables);
        info!(kernel = %path, entries = children.len(), "loaded meta-kernel");

        self.files.push(LoadedFile {
            path: path.to_owned(),
            kernel: LoadedKernel::Meta {
                kernel,
                children: children.clone(),
            },
        });

        self.loading.push(path.to_owned());
        let result = children.iter().try_for_each(|child| self.furnish(child));
        self.loading.pop();

        if let Err(err) = result {
            if let Err(cleanup) = self.unload(path) {
                warn!(kernel = %path, error = %cleanup, "could not unload partially loaded meta-kernel");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Unload a kernel file.
    ///
    /// Unloading a meta-kernel also unloads the kernels it loaded. Pool
    /// variables are rebuilt from the text kernels that remain.
    ///
    /// Return
    /// ----------
    /// * [`SpkStateError::KernelNotLoaded`] if `path` is not loaded.
    pub fn unload(&mut self, path: impl AsRef<Utf8Path>) -> Result<(), SpkStateError> {
        let path = path.as_ref();
        let index = self
            .files
            .iter()
            .position(|file| file.path == path)
            .ok_or_else(|| SpkStateError::KernelNotLoaded(path.to_owned()))?;

        let removed = self.files.remove(index);
        info!(kernel = %path, "unloaded kernel");

        match removed.kernel {
            LoadedKernel::Spk(_) => {}
            LoadedKernel::Text(_) => self.rebuild_variables(),
            LoadedKernel::Meta { children, .. } => {
                for child in children.iter().rev() {
                    if self.is_loaded(child) {
                        self.unload(child)?;
                    }
                }
                self.rebuild_variables();
            }
        }
        Ok(())
    }

    fn rebuild_variables(&mut self) {
        self.variables.clear();
        for file in &self.files {
            match &file.kernel {
                LoadedKernel::Text(kernel) | LoadedKernel::Meta { kernel, .. } => {
                    kernel.apply(&mut self.variables)
                }
                LoadedKernel::Spk(_) => {}
            }
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.files.len()
    }

    /// Loaded kernel paths, in load order.
    pub fn loaded_paths(&self) -> Vec<&Utf8Path> {
        self.files.iter().map(|file| file.path.as_path()).collect()
    }

    pub fn is_loaded(&self, path: impl AsRef<Utf8Path>) -> bool {
        let path = path.as_ref();
        self.files.iter().any(|file| file.path == path)
    }

    pub fn kind(&self, path: impl AsRef<Utf8Path>) -> Option<KernelKind> {
        let path = path.as_ref();
        self.files
            .iter()
            .find(|file| file.path == path)
            .map(|file| match file.kernel {
                LoadedKernel::Spk(_) => KernelKind::Spk,
                LoadedKernel::Text(_) => KernelKind::Text,
                LoadedKernel::Meta { .. } => KernelKind::Meta,
            })
    }

    pub fn variables(&self) -> &PoolVariables {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&[PoolValue]> {
        self.variables.get(name).map(Vec::as_slice)
    }

    /// Numeric values of a variable, `None` if undefined or not numeric.
    pub fn numbers(&self, name: &str) -> Option<Vec<f64>> {
        self.variable(name)?.iter().map(PoolValue::as_number).collect()
    }

    /// String values of a variable, `None` if undefined or not textual.
    pub fn strings(&self, name: &str) -> Option<Vec<&str>> {
        self.variable(name)?.iter().map(PoolValue::as_text).collect()
    }

    /// Loaded SPK files, highest priority first.
    pub fn spk_files(&self) -> impl Iterator<Item = &SpkFile> {
        self.files.iter().rev().filter_map(|file| match &file.kernel {
            LoadedKernel::Spk(spk) => Some(spk),
            _ => None,
        })
    }

    /// Highest priority segment giving the state of `target` at `et`.
    pub fn find_spk_segment(&self, target: NaifId, et: f64) -> Option<(&SpkFile, &SpkSegment)> {
        self.spk_files()
            .find_map(|spk| spk.find_segment(target, et).map(|segment| (spk, segment)))
    }
}

/// Paths listed by a meta-kernel, after `$SYMBOL` substitution.
///
/// Relative entries are resolved against the directory of the meta-kernel.
fn meta_kernel_entries(
    path: &Utf8Path,
    variables: &PoolVariables,
) -> Result<Vec<Utf8PathBuf>, SpkStateError> {
    let syntax = |reason: String| SpkStateError::TextKernelSyntax {
        path: path.to_owned(),
        reason,
    };
    let strings = |name: &'static str| {
        text_values(variables, name).ok_or_else(|| syntax(format!("{name} must hold strings")))
    };

    let symbols = strings("PATH_SYMBOLS")?;
    let values = strings("PATH_VALUES")?;
    if symbols.len() != values.len() {
        return Err(syntax(format!(
            "{} PATH_SYMBOLS for {} PATH_VALUES",
            symbols.len(),
            values.len()
        )));
    }

    let base = path.parent().unwrap_or(Utf8Path::new(""));
    strings("KERNELS_TO_LOAD")?
        .into_iter()
        .map(|entry| {
            let expanded = substitute_symbols(entry, &symbols, &values).map_err(&syntax)?;
            let expanded = Utf8PathBuf::from(expanded);
            Ok(if expanded.is_relative() {
                base.join(expanded)
            } else {
                expanded
            })
        })
        .collect()
}

/// String values of a meta-kernel variable; an undefined variable is empty.
fn text_values<'a>(variables: &'a PoolVariables, name: &str) -> Option<Vec<&'a str>> {
    match variables.get(name) {
        None => Some(Vec::new()),
        Some(values) => values.iter().map(PoolValue::as_text).collect(),
    }
}

/// Replace each `$NAME` in `entry` with the matching path value.
fn substitute_symbols(entry: &str, symbols: &[&str], values: &[&str]) -> Result<String, String> {
    let mut expanded = String::with_capacity(entry.len());
    let mut rest = entry;

    while let Some(dollar) = rest.find('$') {
        expanded.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];
        let len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let name = &after[..len];

        let index = symbols
            .iter()
            .position(|symbol| *symbol == name)
            .ok_or_else(|| format!("unknown path symbol '${name}' in '{entry}'"))?;
        expanded.push_str(values[index]);
        rest = &after[len..];
    }
    expanded.push_str(rest);

    Ok(expanded)
}
