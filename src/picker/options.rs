use crate::model::Member;

/// One selectable row, derived from a source item on every render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry<Id, C> {
    pub value: Id,
    /// Text matched by the filter
    pub query: String,
    /// Payload handed to the row renderer
    pub content: C,
}

/// What a member row displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberContent {
    pub label: String,
    pub avatar: String,
    pub is_you: bool,
}

impl MemberContent {
    pub fn display_label(&self) -> &str {
        if self.is_you { "You" } else { &self.label }
    }
}

/// Map a collection into option entries, 1:1 and in order.
/// `None` (collection not loaded yet) stays `None`.
pub fn build_options<T, Id, C, F>(items: Option<&[T]>, derive: F) -> Option<Vec<OptionEntry<Id, C>>>
where
    F: Fn(&T) -> OptionEntry<Id, C>,
{
    items.map(|items| items.iter().map(derive).collect())
}

/// Build member options from a list of member ids and a detail lookup.
///
/// Ids without details still produce a row, searchable and labelled by id.
pub fn member_options<'a, F>(
    member_ids: Option<&[String]>,
    lookup: F,
    current_user: Option<&str>,
) -> Option<Vec<OptionEntry<String, MemberContent>>>
where
    F: Fn(&str) -> Option<&'a Member>,
{
    build_options(member_ids, |id| {
        let fallback;
        let member = match lookup(id.as_str()) {
            Some(m) => m,
            None => {
                fallback = Member::new(id);
                &fallback
            }
        };
        OptionEntry {
            value: id.clone(),
            query: member.search_text(),
            content: MemberContent {
                label: member.label(),
                avatar: member.avatar_glyph(),
                is_you: current_user == Some(id.as_str()),
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn directory() -> Vec<Member> {
        vec![
            Member {
                display_name: Some("alice".into()),
                first_name: Some("Alice".into()),
                last_name: Some("Smith".into()),
                ..Member::new("u1")
            },
            Member {
                display_name: Some("bob".into()),
                ..Member::new("u2")
            },
        ]
    }

    #[test]
    fn unloaded_collection_stays_unknown() {
        let dir = directory();
        let opts = member_options(None, |id| dir.iter().find(|m| m.id == id), None);
        assert!(opts.is_none());
    }

    #[test]
    fn derives_one_entry_per_id_in_order() {
        let dir = directory();
        let ids = vec!["u2".to_string(), "u1".to_string()];
        let opts = member_options(Some(&ids), |id| dir.iter().find(|m| m.id == id), Some("u1"))
            .unwrap();
        let values: Vec<&str> = opts.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["u2", "u1"]);
        assert_eq!(opts[1].query, "alice Alice Smith");
        assert!(opts[1].content.is_you);
        assert_eq!(opts[1].content.display_label(), "You");
        assert_eq!(opts[0].content.display_label(), "bob");
    }

    #[test]
    fn missing_details_fall_back_to_id() {
        let dir = directory();
        let ids = vec!["ghost".to_string()];
        let opts = member_options(Some(&ids), |id| dir.iter().find(|m| m.id == id), None).unwrap();
        assert_eq!(opts[0].query, "ghost");
        assert_eq!(opts[0].content.label, "ghost");
        assert_eq!(opts[0].content.avatar, "G");
    }

    #[test]
    fn build_options_is_generic() {
        let nums = [3, 1];
        let opts = build_options(Some(&nums[..]), |n| OptionEntry {
            value: *n,
            query: n.to_string(),
            content: (),
        })
        .unwrap();
        assert_eq!(opts.len(), 2);
        assert_eq!(opts[0].value, 3);
    }
}
