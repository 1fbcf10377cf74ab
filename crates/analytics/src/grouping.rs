use indexmap::{IndexMap, IndexSet};

use crate::trie::Trie;
use crate::types::ConstructInfo;

/// FQNs grouped by construct version
///
/// Versions keep first-seen order and each FQN appears once per version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionGroups {
    groups: IndexMap<String, IndexSet<String>>,
}

impl VersionGroups {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_infos<'a>(infos: impl IntoIterator<Item = &'a ConstructInfo>) -> Self {
        let mut groups = Self::new();
        for info in infos {
            groups.insert(&info.version, &info.fqn);
        }
        groups
    }

    /// Record one observation; returns `false` if it was already present
    pub fn insert(&mut self, version: &str, fqn: &str) -> bool {
        let fqns = self.groups.entry(version.to_string()).or_default();
        if fqns.contains(fqn) {
            return false;
        }
        fqns.insert(fqn.to_string())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of distinct versions
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn fqns(&self, version: &str) -> Option<impl Iterator<Item = &str>> {
        self.groups
            .get(version)
            .map(|fqns| fqns.iter().map(String::as_str))
    }

    /// Prefix-encoded list: `version!<trie>` per version, joined with `,`
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (idx, (version, fqns)) in self.groups.iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            let trie = Trie::from_fqns(fqns.iter().map(String::as_str));
            let mark = out.len();
            out.push_str(version);
            out.push('!');
            trie.write_prefix_encoded(&mut out);
            log::trace!("encoded version group {}", &out[mark..]);
        }
        out
    }
}
