//! Token trie over construct FQNs.
//!
//! FQNs are split after every non-alphanumeric character, so
//! `aws-cdk-lib.Stack` becomes `aws-` / `cdk-` / `lib.` / `Stack`, and
//! shared prefixes collapse into shared nodes. The prefix encoding groups
//! siblings with `{}` and separates them with `,`:
//!
//! ```text
//! A --> B --> C
//!  |     \--> D
//!  \--> E --> F
//!
//! A{B{C,D},EF}
//! ```

use indexmap::IndexMap;

/// Splits an FQN after each non-alphanumeric character.
///
/// The text after the last separator is always the final token, so an FQN
/// ending in a separator yields a trailing empty token. The empty FQN yields
/// no tokens. Concatenating the tokens gives back the input.
#[must_use]
pub fn tokenize(fqn: &str) -> Vec<&str> {
    if fqn.is_empty() {
        return Vec::new();
    }

    let mut tokens = Vec::new();
    let mut start = 0;
    for (idx, ch) in fqn.char_indices() {
        if !ch.is_ascii_alphanumeric() {
            let end = idx + ch.len_utf8();
            tokens.push(&fqn[start..end]);
            start = end;
        }
    }
    tokens.push(&fqn[start..]);
    tokens
}

/// Index of a node inside a [`Trie`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Node {
    children: IndexMap<String, usize>,
}

/// Insertion-ordered prefix tree keyed by FQN token
///
/// Nodes live in a flat arena and refer to their children by index, so
/// walking, cloning and dropping never recurse, however long an FQN is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trie {
    nodes: Vec<Node>,
}

impl Default for Trie {
    fn default() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }
}

impl Trie {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a trie from a sequence of FQNs, in order
    pub fn from_fqns<'a>(fqns: impl IntoIterator<Item = &'a str>) -> Self {
        let mut trie = Self::new();
        for fqn in fqns {
            trie.insert(fqn);
        }
        trie
    }

    /// Insert the tokens of `fqn`, reusing nodes for prefixes already present
    pub fn insert(&mut self, fqn: &str) {
        let mut node = 0;
        for token in tokenize(fqn) {
            node = match self.nodes[node].children.get(token) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(token.to_string(), child);
                    child
                }
            };
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of root entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes[0].children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of nodes, root included
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn child(&self, node: NodeId, token: &str) -> Option<NodeId> {
        self.nodes[node.0].children.get(token).copied().map(NodeId)
    }

    /// Child entries of `node` in insertion order
    pub fn children(&self, node: NodeId) -> impl Iterator<Item = (&str, NodeId)> {
        self.nodes[node.0]
            .children
            .iter()
            .map(|(key, &child)| (key.as_str(), NodeId(child)))
    }

    /// Every root-to-leaf path, concatenated
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut prefix = String::new();
        // (node, next child, prefix length of this node's own path)
        let mut stack = vec![(0usize, 0usize, 0usize)];
        while let Some(frame) = stack.last_mut() {
            let (node, next, base) = *frame;
            let Some((key, &child)) = self.nodes[node].children.get_index(next) else {
                stack.pop();
                continue;
            };
            frame.1 += 1;
            prefix.truncate(base);
            prefix.push_str(key);
            if self.nodes[child].children.is_empty() {
                out.push(prefix.clone());
            } else {
                stack.push((child, 0, prefix.len()));
            }
        }
        out
    }

    /// Prefix-encode the root's children
    #[must_use]
    pub fn prefix_encode(&self) -> String {
        let mut out = String::new();
        self.write_prefix_encoded(&mut out);
        out
    }

    /// Append the prefix encoding of the root's children to `out`
    ///
    /// A child with one entry of its own is followed directly by that entry;
    /// a child with several is followed by them inside `{}`.
    pub fn write_prefix_encoded(&self, out: &mut String) {
        // (node, next child, whether this level was opened with '{')
        let mut stack = vec![(0usize, 0usize, false)];
        while let Some(frame) = stack.last_mut() {
            let (node, next, braced) = *frame;
            let Some((key, &child)) = self.nodes[node].children.get_index(next) else {
                stack.pop();
                if braced {
                    out.push('}');
                }
                continue;
            };
            frame.1 += 1;
            if next > 0 {
                out.push(',');
            }
            out.push_str(key);
            match self.nodes[child].children.len() {
                0 => {}
                1 => stack.push((child, 0, false)),
                _ => {
                    out.push('{');
                    stack.push((child, 0, true));
                }
            }
        }
    }
}
