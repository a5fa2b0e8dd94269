//! Registry of data keys each document kind must carry.
//!
//! A [`Schema`] is an ordinary value: build one, pass it to a
//! [`Validator`](super::validator::Validator), and build a different one in
//! tests. Rules can target a kind in any group or a kind in one group only.

use indexmap::IndexMap;

use super::error::DocumentError;
use super::manifest::Document;
use super::path::KeyPath;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RuleKey {
    /// `None` applies to the kind in every group
    group: Option<String>,
    kind: String,
}

/// Required key paths, per kind.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: IndexMap<RuleKey, Vec<KeyPath>>,
}

impl Schema {
    /// An empty schema: only identity fields are checked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for the common workload and core kinds.
    ///
    /// Workloads must carry a `spec`; `ConfigMap`, `Secret` and `Namespace`
    /// have no required body.
    pub fn builtin() -> Self {
        let mut schema = Self::new();
        for kind in [
            "Deployment",
            "StatefulSet",
            "DaemonSet",
            "ReplicaSet",
            "ReplicationController",
            "Service",
            "Job",
            "CronJob",
            "Pod",
        ] {
            schema.require(kind, KeyPath::new(vec!["spec".into()]));
        }
        schema
    }

    /// Requires `path` in every document of `kind`, whatever its group.
    pub fn require(&mut self, kind: impl Into<String>, path: KeyPath) -> &mut Self {
        self.insert(None, kind.into(), path);
        self
    }

    /// Requires `path` in documents of `kind` within `group` only.
    pub fn require_for_group(
        &mut self,
        group: impl Into<String>,
        kind: impl Into<String>,
        path: KeyPath,
    ) -> &mut Self {
        self.insert(Some(group.into()), kind.into(), path);
        self
    }

    /// Adds textual rules such as those read from the config file.
    ///
    /// Keys are `Kind` or `group/Kind`; values are key paths in text form.
    pub fn require_from_rules(
        &mut self,
        rules: &IndexMap<String, Vec<String>>,
    ) -> Result<&mut Self, DocumentError> {
        for (target, paths) in rules {
            let (group, kind) = match target.rsplit_once('/') {
                Some((group, kind)) => (Some(group.to_string()), kind.to_string()),
                None => (None, target.clone()),
            };
            for path in paths {
                self.insert(group.clone(), kind.clone(), KeyPath::parse(path)?);
            }
        }
        Ok(self)
    }

    fn insert(&mut self, group: Option<String>, kind: String, path: KeyPath) {
        let paths = self.rules.entry(RuleKey { group, kind }).or_default();
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    /// Key paths `doc` must carry: rules for its kind in any group first,
    /// then rules specific to its group.
    pub fn required_keys(&self, doc: &Document) -> Vec<&KeyPath> {
        let any_group = RuleKey {
            group: None,
            kind: doc.kind().to_string(),
        };
        let this_group = RuleKey {
            group: Some(doc.group().to_string()),
            kind: doc.kind().to_string(),
        };
        [any_group, this_group]
            .iter()
            .filter_map(|key| self.rules.get(key))
            .flatten()
            .collect()
    }

    /// Returns true if no rule has been registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
