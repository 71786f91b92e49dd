//! Route attribution for HTTP events.
//!
//! Maps a raw request path onto the longest registered route prefix, matching
//! whole path segments so `/webappa` never claims `/webappabc`. Routes are kept
//! in a segment trie, giving O(depth) lookups regardless of route count.

use ahash::AHashMap;

/// A registered route: its normalized prefix and an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry<T> {
    /// Normalized prefix (no trailing `/`; empty for the root route)
    pub prefix: String,
    /// Caller-defined route identifier or label
    pub payload: T,
}

#[derive(Debug)]
struct RouteNode<T> {
    entry: Option<RouteEntry<T>>,
    children: AHashMap<String, RouteNode<T>>,
}

impl<T> Default for RouteNode<T> {
    fn default() -> Self {
        Self {
            entry: None,
            children: AHashMap::new(),
        }
    }
}

/// Longest-prefix path matcher over registered routes.
#[derive(Debug)]
pub struct RouteAttributor<T> {
    root: RouteNode<T>,
    len: usize,
}

impl<T> Default for RouteAttributor<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip one trailing `/`, never an internal one.
pub fn normalize_path(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

fn segments(normalized: &str) -> impl Iterator<Item = &str> {
    // the root route has no segments at all
    let mut iter = normalized.split('/');
    if normalized.is_empty() {
        iter.next();
    }
    iter
}

impl<T> RouteAttributor<T> {
    /// Create an empty attributor
    pub fn new() -> Self {
        Self {
            root: RouteNode::default(),
            len: 0,
        }
    }

    /// Register `prefix`, returning the payload it replaced if any
    pub fn register(&mut self, prefix: &str, payload: T) -> Option<T> {
        let normalized = normalize_path(prefix);
        let mut node = &mut self.root;
        for segment in segments(normalized) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        let previous = node.entry.replace(RouteEntry {
            prefix: normalized.to_string(),
            payload,
        });
        if previous.is_none() {
            self.len += 1;
        }
        previous.map(|entry| entry.payload)
    }

    /// Remove the route registered at exactly `prefix`
    pub fn remove(&mut self, prefix: &str) -> Option<T> {
        let normalized = normalize_path(prefix);
        let mut node = &mut self.root;
        for segment in segments(normalized) {
            node = node.children.get_mut(segment)?;
        }
        let removed = node.entry.take()?;
        self.len -= 1;
        Some(removed.payload)
    }

    /// Most specific route whose prefix is a segment-wise ancestor of `path`
    pub fn find_route(&self, path: &str) -> Option<&RouteEntry<T>> {
        let normalized = normalize_path(path);
        let mut best = self.root.entry.as_ref();
        let mut node = &self.root;
        for segment in segments(normalized) {
            match node.children.get(segment) {
                Some(child) => {
                    node = child;
                    if child.entry.is_some() {
                        best = child.entry.as_ref();
                    }
                },
                None => break,
            }
        }
        best
    }

    /// Number of registered routes
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no routes are registered
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All registered routes, in no particular order
    pub fn routes(&self) -> Vec<&RouteEntry<T>> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if let Some(entry) = &node.entry {
                out.push(entry);
            }
            stack.extend(node.children.values());
        }
        out
    }
}
