/// Case-insensitive substring gate over job titles.
///
/// Matching is deliberately loose: any fragment appearing anywhere in the
/// lowercased title is a hit, so "power" also matches "Empower".
#[derive(Clone, Debug, Default)]
pub struct RelevanceFilter {
    fragments: Vec<String>,
}

impl RelevanceFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fragments = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        RelevanceFilter { fragments }
    }

    pub fn matches(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.fragments.iter().any(|k| lower.contains(k.as_str()))
    }
}
