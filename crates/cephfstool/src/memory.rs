//! In-memory filesystem backend.
//!
//! A fully functional [`CephFs`] implementation for tests. All state
//! lives in a flat map of absolute paths behind a `parking_lot` lock,
//! shared by every mount taken from the same [`MemoryCluster`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{CephError, CephResult};
use crate::fs::{CephFs, MountOptions, PathKind};

// ---- Cluster state ----

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

#[derive(Debug, Default)]
struct State {
    /// Canonical absolute path to node. The root `/` is implicit.
    nodes: BTreeMap<String, Node>,
    /// When set, mounts must present exactly this key.
    required_key: Option<String>,
}

/// Shared state behind a set of in-memory mounts.
///
/// Cloning the cluster shares its tree. Two knobs drive the login
/// failure paths: a required key rejects mismatched credentials, and a
/// mount root other than `/` must already exist as a directory.
#[derive(Clone, Debug, Default)]
pub struct MemoryCluster {
    inner: Arc<RwLock<State>>,
}

impl MemoryCluster {
    /// Create an empty cluster that accepts any credentials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key` on subsequent mounts.
    pub fn require_key(&self, key: &str) {
        self.inner.write().required_key = Some(key.to_string());
    }

    /// Mount a view of the cluster.
    pub fn mount(&self, opts: &MountOptions) -> CephResult<MemoryFs> {
        let root = resolve("/", opts.root.as_deref().unwrap_or("/"));
        {
            let state = self.inner.read();
            if let Some(required) = &state.required_key {
                if opts.key.as_deref() != Some(required.as_str()) {
                    return Err(CephError::op("open cephfs", &root, libc::EINVAL));
                }
            }
            if root != "/" && !matches!(state.nodes.get(&root), Some(Node::Dir)) {
                return Err(CephError::op("open cephfs", &root, libc::EPERM));
            }
        }
        Ok(MemoryFs {
            cluster: self.clone(),
            root,
            cwd: RwLock::new("/".to_string()),
        })
    }
}

/// Resolve `path` against `cwd` and collapse `.`, `..`, and slash runs
/// into a canonical absolute path. `..` above the root stays at the
/// root.
fn resolve(cwd: &str, path: &str) -> String {
    let full = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{cwd}/{path}")
    };
    let mut stack: Vec<&str> = Vec::new();
    for comp in full.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            name => stack.push(name),
        }
    }
    if stack.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", stack.join("/"))
    }
}

// ---- Mounted view ----

/// One mounted view of a [`MemoryCluster`].
///
/// Paths are resolved against the mount's working directory and then
/// against its root, so a mount rooted below `/` sees a subtree.
#[derive(Debug)]
pub struct MemoryFs {
    cluster: MemoryCluster,
    root: String,
    cwd: RwLock<String>,
}

impl MemoryFs {
    fn view_path(&self, path: &str) -> String {
        resolve(&self.cwd.read(), path)
    }

    fn store_path(&self, path: &str) -> String {
        let view = self.view_path(path);
        if self.root == "/" {
            view
        } else if view == "/" {
            self.root.clone()
        } else {
            format!("{}{view}", self.root)
        }
    }

    fn kind_at(state: &State, store: &str) -> Option<PathKind> {
        if store == "/" {
            return Some(PathKind::Dir);
        }
        match state.nodes.get(store) {
            Some(Node::Dir) => Some(PathKind::Dir),
            Some(Node::File(_)) => Some(PathKind::File),
            None => None,
        }
    }

    /// Create `store` and its ancestors as directories, `mkdirs` style.
    fn make_store_dirs(state: &mut State, store: &str, path: &str) -> CephResult<()> {
        if store == "/" {
            return Err(CephError::op("mkdir", path, libc::EEXIST));
        }
        let comps: Vec<&str> = store.trim_start_matches('/').split('/').collect();
        let mut prefix = String::new();
        for (idx, comp) in comps.iter().enumerate() {
            prefix.push('/');
            prefix.push_str(comp);
            let last = idx == comps.len() - 1;
            match state.nodes.get(&prefix) {
                Some(Node::File(_)) => {
                    let errno = if last { libc::EEXIST } else { libc::ENOTDIR };
                    return Err(CephError::op("mkdir", path, errno));
                }
                Some(Node::Dir) => {
                    if last {
                        return Err(CephError::op("mkdir", path, libc::EEXIST));
                    }
                }
                None => {
                    state.nodes.insert(prefix.clone(), Node::Dir);
                }
            }
        }
        Ok(())
    }
}

impl CephFs for MemoryFs {
    fn stat(&self, path: &str) -> CephResult<Option<PathKind>> {
        let store = self.store_path(path);
        let state = self.cluster.inner.read();
        Ok(Self::kind_at(&state, &store))
    }

    fn length(&self, path: &str) -> CephResult<u64> {
        let store = self.store_path(path);
        let state = self.cluster.inner.read();
        match state.nodes.get(&store) {
            Some(Node::File(data)) => Ok(data.len() as u64),
            Some(Node::Dir) => Ok(0),
            None if store == "/" => Ok(0),
            None => Err(CephError::op("get file size", path, libc::ENOENT)),
        }
    }

    fn write_file(&self, path: &str, local_path: &Path) -> CephResult<()> {
        let data = fs::read(local_path).map_err(|err| CephError::local(local_path, err))?;
        self.ensure_dirs(path)?;
        let store = self.store_path(path);
        let mut state = self.cluster.inner.write();
        if matches!(Self::kind_at(&state, &store), Some(PathKind::Dir)) {
            return Err(CephError::op("open cephfs file", path, libc::EISDIR));
        }
        state.nodes.insert(store, Node::File(data));
        Ok(())
    }

    fn read_file(&self, path: &str, local_path: &Path) -> CephResult<()> {
        let store = self.store_path(path);
        let data = {
            let state = self.cluster.inner.read();
            match state.nodes.get(&store) {
                Some(Node::File(data)) => data.clone(),
                Some(Node::Dir) => {
                    return Err(CephError::op("open cephfs file", path, libc::EISDIR))
                }
                None => return Err(CephError::op("open cephfs file", path, libc::ENOENT)),
            }
        };
        fs::write(local_path, data).map_err(|err| CephError::local(local_path, err))
    }

    fn write_str(&self, path: &str, contents: &str) -> CephResult<()> {
        self.ensure_dirs(path)?;
        let store = self.store_path(path);
        let mut state = self.cluster.inner.write();
        if matches!(Self::kind_at(&state, &store), Some(PathKind::Dir)) {
            return Err(CephError::op("open cephfs file", path, libc::EISDIR));
        }
        state.nodes.insert(store, Node::File(contents.as_bytes().to_vec()));
        Ok(())
    }

    fn read_str(&self, path: &str) -> CephResult<String> {
        let store = self.store_path(path);
        let state = self.cluster.inner.read();
        match state.nodes.get(&store) {
            Some(Node::File(data)) => Ok(String::from_utf8_lossy(data).into_owned()),
            Some(Node::Dir) => Err(CephError::op("open cephfs file", path, libc::EISDIR)),
            None => Err(CephError::op("open cephfs file", path, libc::ENOENT)),
        }
    }

    fn remove(&self, path: &str) -> CephResult<()> {
        let store = self.store_path(path);
        let mut state = self.cluster.inner.write();
        match Self::kind_at(&state, &store) {
            Some(PathKind::File) => {
                state.nodes.remove(&store);
                Ok(())
            }
            Some(_) => Err(CephError::op("remove from cephfs", path, libc::EISDIR)),
            None => Err(CephError::op("remove from cephfs", path, libc::ENOENT)),
        }
    }

    fn make_dirs(&self, path: &str) -> CephResult<()> {
        let store = self.store_path(path);
        let mut state = self.cluster.inner.write();
        Self::make_store_dirs(&mut state, &store, path)
    }

    fn rm_dir(&self, path: &str) -> CephResult<()> {
        let store = self.store_path(path);
        let mut state = self.cluster.inner.write();
        match Self::kind_at(&state, &store) {
            Some(PathKind::Dir) if store == "/" => {
                Err(CephError::op("rm dir", path, libc::EBUSY))
            }
            Some(PathKind::Dir) => {
                let prefix = format!("{store}/");
                if state.nodes.keys().any(|key| key.starts_with(&prefix)) {
                    return Err(CephError::op("rm dir", path, libc::ENOTEMPTY));
                }
                state.nodes.remove(&store);
                Ok(())
            }
            Some(_) => Err(CephError::op("rm dir", path, libc::ENOTDIR)),
            None => Err(CephError::op("rm dir", path, libc::ENOENT)),
        }
    }

    fn rename(&self, from: &str, to: &str) -> CephResult<()> {
        self.ensure_dirs(to)?;
        let from_store = self.store_path(from);
        let to_store = self.store_path(to);
        let mut state = self.cluster.inner.write();
        let node = match state.nodes.get(&from_store) {
            Some(node) => node.clone(),
            None => return Err(CephError::op("rename", from, libc::ENOENT)),
        };
        if matches!(Self::kind_at(&state, &to_store), Some(PathKind::Dir)) {
            return Err(CephError::op("rename", to, libc::EEXIST));
        }
        if let Node::Dir = node {
            let prefix = format!("{from_store}/");
            let moved: Vec<(String, Node)> = state
                .nodes
                .iter()
                .filter(|(key, _)| key.starts_with(&prefix))
                .map(|(key, node)| {
                    (format!("{to_store}/{}", &key[prefix.len()..]), node.clone())
                })
                .collect();
            state.nodes.retain(|key, _| !key.starts_with(&prefix));
            state.nodes.extend(moved);
        }
        state.nodes.remove(&from_store);
        state.nodes.insert(to_store, node);
        Ok(())
    }

    fn list_dir(&self, path: &str) -> CephResult<Vec<String>> {
        let store = self.store_path(path);
        let state = self.cluster.inner.read();
        match Self::kind_at(&state, &store) {
            Some(PathKind::Dir) => {}
            Some(_) => return Err(CephError::op("open path", path, libc::ENOTDIR)),
            None => return Err(CephError::op("open path", path, libc::ENOENT)),
        }
        let prefix = if store == "/" {
            "/".to_string()
        } else {
            format!("{store}/")
        };
        Ok(state
            .nodes
            .keys()
            .filter_map(|key| key.strip_prefix(prefix.as_str()))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(str::to_string)
            .collect())
    }

    fn chdir(&self, path: &str) -> CephResult<()> {
        let view = self.view_path(path);
        let store = self.store_path(path);
        let state = self.cluster.inner.read();
        match Self::kind_at(&state, &store) {
            Some(PathKind::Dir) => {
                drop(state);
                *self.cwd.write() = view;
                Ok(())
            }
            Some(_) => Err(CephError::op("cd", path, libc::ENOTDIR)),
            None => Err(CephError::op("cd", path, libc::ENOENT)),
        }
    }

    fn getcwd(&self) -> CephResult<String> {
        Ok(self.cwd.read().clone())
    }
}
