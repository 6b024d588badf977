use super::options::OptionEntry;

/// Result of filtering an option index that may not be loaded yet.
#[derive(Debug, PartialEq, Eq)]
pub enum Filtered<'a, Id, C> {
    /// The backing collection has not arrived
    Loading,
    /// Matching entries, in index order
    Ready(Vec<&'a OptionEntry<Id, C>>),
}

impl<'a, Id, C> Filtered<'a, Id, C> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Filtered::Loading)
    }

    pub fn len(&self) -> usize {
        match self {
            Filtered::Loading => 0,
            Filtered::Ready(entries) => entries.len(),
        }
    }

    /// True for a loaded list with no matches. A loading list is not empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Filtered::Ready(entries) if entries.is_empty())
    }

    pub fn get(&self, index: usize) -> Option<&'a OptionEntry<Id, C>> {
        match self {
            Filtered::Loading => None,
            Filtered::Ready(entries) => entries.get(index).copied(),
        }
    }

    pub fn entries(&self) -> &[&'a OptionEntry<Id, C>] {
        match self {
            Filtered::Loading => &[],
            Filtered::Ready(entries) => entries,
        }
    }
}

/// Case-insensitive substring filter over the option index.
///
/// An empty query keeps every entry. Order is never changed.
pub fn filter<'a, Id, C>(options: Option<&'a [OptionEntry<Id, C>]>, query: &str) -> Filtered<'a, Id, C> {
    let options = match options {
        Some(o) => o,
        None => return Filtered::Loading,
    };
    if query.is_empty() {
        return Filtered::Ready(options.iter().collect());
    }
    let needle = query.to_lowercase();
    Filtered::Ready(
        options
            .iter()
            .filter(|o| o.query.to_lowercase().contains(&needle))
            .collect(),
    )
}
