use serde::Serialize;

/// A controlled picker value. The picker never stores one; it reads the
/// caller's current value and hands back the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Selection<Id> {
    Single(Option<Id>),
    /// Ordered by the sequence in which ids were committed
    Multiple(Vec<Id>),
}

impl<Id: Clone + PartialEq> Selection<Id> {
    pub fn empty(multiple: bool) -> Self {
        if multiple {
            Selection::Multiple(Vec::new())
        } else {
            Selection::Single(None)
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, Selection::Multiple(_))
    }

    pub fn contains(&self, id: &Id) -> bool {
        match self {
            Selection::Single(current) => current.as_ref() == Some(id),
            Selection::Multiple(ids) => ids.contains(id),
        }
    }

    /// The value that results from committing `id`.
    ///
    /// Single mode replaces the value. Multiple mode toggles membership:
    /// absent ids are appended, present ids are removed.
    pub fn commit(&self, id: &Id) -> Selection<Id> {
        match self {
            Selection::Single(_) => Selection::Single(Some(id.clone())),
            Selection::Multiple(ids) => {
                let mut next = ids.clone();
                if let Some(pos) = next.iter().position(|x| x == id) {
                    next.remove(pos);
                } else {
                    next.push(id.clone());
                }
                Selection::Multiple(next)
            }
        }
    }

    pub fn ids(&self) -> Vec<&Id> {
        match self {
            Selection::Single(current) => current.iter().collect(),
            Selection::Multiple(ids) => ids.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Selection::Single(current) => usize::from(current.is_some()),
            Selection::Multiple(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_commit_replaces() {
        let value = Selection::Single(Some("u1"));
        assert_eq!(value.commit(&"u2"), Selection::Single(Some("u2")));
        // Re-committing the current id still reports it
        assert_eq!(value.commit(&"u1"), Selection::Single(Some("u1")));
    }

    #[test]
    fn multiple_commit_appends_in_click_order() {
        let value: Selection<&str> = Selection::empty(true);
        let value = value.commit(&"u3").commit(&"u1");
        assert_eq!(value, Selection::Multiple(vec!["u3", "u1"]));
    }

    #[test]
    fn multiple_commit_twice_restores_original() {
        let original = Selection::Multiple(vec!["u1", "u2"]);
        for id in ["u1", "u2", "u3"] {
            let toggled = original.commit(&id).commit(&id);
            let mut twice = toggled.ids();
            twice.sort();
            assert_eq!(twice, original.ids());
        }
        // Removing and re-adding moves the id to the end
        assert_eq!(
            original.commit(&"u1").commit(&"u1"),
            Selection::Multiple(vec!["u2", "u1"])
        );
        assert_eq!(
            original.commit(&"u3").commit(&"u3"),
            Selection::Multiple(vec!["u1", "u2"])
        );
    }

    #[test]
    fn contains_and_len() {
        let single = Selection::Single(Some(7));
        assert!(single.contains(&7));
        assert!(!single.contains(&8));
        assert_eq!(single.len(), 1);

        let none: Selection<i32> = Selection::empty(false);
        assert!(none.is_empty());
        assert!(!none.is_multiple());

        let many = Selection::Multiple(vec![1, 2]);
        assert!(many.contains(&2));
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn serializes_untagged() {
        let single = Selection::Single(Some("u1"));
        let many = Selection::Multiple(vec!["u1", "u2"]);
        let none: Selection<&str> = Selection::Single(None);
        assert_eq!(serde_json::to_string(&single).unwrap(), "\"u1\"");
        assert_eq!(serde_json::to_string(&many).unwrap(), "[\"u1\",\"u2\"]");
        assert_eq!(serde_json::to_string(&none).unwrap(), "null");
    }
}
