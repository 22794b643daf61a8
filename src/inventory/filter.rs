use crate::gcloud::Instance;

/// True iff `name` contains a non-blank entry of `exclusions` (case-sensitive).
pub fn is_excluded<S: AsRef<str>>(name: &str, exclusions: &[S]) -> bool {
    exclusions
        .iter()
        .map(AsRef::as_ref)
        .filter(|ex| !ex.trim().is_empty())
        .any(|ex| name.contains(ex))
}

/// Exclusion list loaded once from the user config
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    patterns: Vec<String>,
}

impl ExclusionFilter {
    /// Blank and whitespace-only entries are dropped.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(Into::into)
                .filter(|p| !p.trim().is_empty())
                .collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        is_excluded(name, &self.patterns)
    }

    /// Drop every excluded instance, keeping the order of the rest.
    pub fn apply(&self, instances: Vec<Instance>) -> Vec<Instance> {
        instances
            .into_iter()
            .filter(|i| !self.is_excluded(&i.name))
            .collect()
    }
}
