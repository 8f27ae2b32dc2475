//! Scoped loading of a list of kernels.

use std::ops::Deref;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use super::pool::KernelPool;
use crate::spkstate_errors::SpkStateError;

/// Kernels loaded into a pool for the lifetime of the guard.
///
/// The guard dereferences to the pool, so time and state queries take
/// `&kernels` directly. When the guard is dropped, the kernels it loaded are
/// unloaded in reverse order, whatever the exit path. Use
/// [`KernelSet::release`] to unload explicitly and see unload errors.
///
/// Example
/// ---------
/// ```no_run
/// use spkstate::kernels::{pool::KernelPool, scoped::KernelSet};
///
/// let mut pool = KernelPool::new();
/// let kernels = KernelSet::furnish(&mut pool, ["naif0012.tls", "de440s.bsp"])?;
/// assert_eq!(kernels.loaded_count(), 2);
/// kernels.release()?;
/// assert_eq!(pool.loaded_count(), 0);
/// # Ok::<(), spkstate::spkstate_errors::SpkStateError>(())
/// ```
#[derive(Debug)]
pub struct KernelSet<'pool> {
    pool: &'pool mut KernelPool,
    paths: Vec<Utf8PathBuf>,
}

impl<'pool> KernelSet<'pool> {
    /// Load `paths` in order into `pool`.
    ///
    /// Paths already loaded in the pool, by the caller or earlier in `paths`,
    /// are left as they are and stay loaded when the guard goes away. If a
    /// kernel fails to load, the kernels loaded before it are unloaded and
    /// the error is returned.
    pub fn furnish<I, P>(pool: &'pool mut KernelPool, paths: I) -> Result<Self, SpkStateError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Utf8Path>,
    {
        let mut set = KernelSet {
            pool,
            paths: Vec::new(),
        };

        for path in paths {
            let path = path.as_ref();
            if set.pool.is_loaded(path) {
                debug!(kernel = %path, "kernel already loaded, not taken over");
                continue;
            }
            set.pool.furnish(path)?;
            set.paths.push(path.to_owned());
        }

        Ok(set)
    }

    /// Paths loaded by this guard, in load order.
    pub fn paths(&self) -> &[Utf8PathBuf] {
        &self.paths
    }

    /// Unload the kernels of this guard.
    ///
    /// Kernels already unloaded from the pool by other means are skipped.
    pub fn release(mut self) -> Result<(), SpkStateError> {
        self.unload_all()
    }

    fn unload_all(&mut self) -> Result<(), SpkStateError> {
        while let Some(path) = self.paths.pop() {
            if self.pool.is_loaded(&path) {
                self.pool.unload(&path)?;
            }
        }
        Ok(())
    }
}

impl Deref for KernelSet<'_> {
    type Target = KernelPool;

    fn deref(&self) -> &Self::Target {
        &*self.pool
    }
}

impl Drop for KernelSet<'_> {
    fn drop(&mut self) {
        while let Err(err) = self.unload_all() {
            warn!(error = %err, "failed to unload kernel");
        }
    }
}

#[cfg(test)]
mod test_kernel_set {
    use std::fs;

    use super::*;

    fn text_kernels(names: &[&str]) -> (tempfile::TempDir, Vec<Utf8PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let paths = names
            .iter()
            .map(|name| {
                let path = root.join(name);
                fs::write(&path, format!("KPL/FK\n\\begindata\nNAME += '{name}'\n")).unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    #[test]
    fn test_drop_unloads() {
        let (_dir, paths) = text_kernels(&["a.tk", "b.tk"]);
        let mut pool = KernelPool::new();
        {
            let set = KernelSet::furnish(&mut pool, &paths).unwrap();
            assert_eq!(set.loaded_count(), 2);
            assert_eq!(set.strings("NAME"), Some(vec!["a.tk", "b.tk"]));
        }
        assert_eq!(pool.loaded_count(), 0);
        assert!(pool.variables().is_empty());
    }

    #[test]
    fn test_release_keeps_other_kernels() {
        let (_dir, paths) = text_kernels(&["a.tk", "b.tk"]);
        let mut pool = KernelPool::new();
        pool.furnish(&paths[0]).unwrap();

        // Only the second kernel belongs to the guard
        let set = KernelSet::furnish(&mut pool, [&paths[1]]).unwrap();
        assert_eq!(set.loaded_count(), 2);
        set.release().unwrap();

        assert_eq!(pool.loaded_paths(), vec![paths[0].as_path()]);
    }

    #[test]
    fn test_preloaded_kernel_stays_loaded() {
        let (_dir, paths) = text_kernels(&["a.tk", "b.tk"]);
        let mut pool = KernelPool::new();
        pool.furnish(&paths[0]).unwrap();

        {
            let set = KernelSet::furnish(&mut pool, &paths).unwrap();
            assert_eq!(set.paths(), &paths[1..]);
            // Not reloaded, so the load order is unchanged
            assert_eq!(set.strings("NAME"), Some(vec!["a.tk", "b.tk"]));
        }

        assert_eq!(pool.loaded_paths(), vec![paths[0].as_path()]);
        assert_eq!(pool.strings("NAME"), Some(vec!["a.tk"]));
    }

    #[test]
    fn test_duplicates_loaded_once() {
        let (_dir, paths) = text_kernels(&["a.tk"]);
        let mut pool = KernelPool::new();
        let set = KernelSet::furnish(&mut pool, [&paths[0], &paths[0]]).unwrap();
        assert_eq!(set.paths().len(), 1);
        assert_eq!(set.strings("NAME"), Some(vec!["a.tk"]));
        set.release().unwrap();
        assert_eq!(pool.loaded_count(), 0);
    }

    #[test]
    fn test_failed_load_leaves_pool_empty() {
        let (_dir, mut paths) = text_kernels(&["a.tk", "b.tk"]);
        paths.insert(1, Utf8PathBuf::from("missing.bsp"));

        let mut pool = KernelPool::new();
        let err = KernelSet::furnish(&mut pool, &paths).unwrap_err();
        assert!(matches!(err, SpkStateError::IoError { .. }));
        assert_eq!(pool.loaded_count(), 0);
    }
}
