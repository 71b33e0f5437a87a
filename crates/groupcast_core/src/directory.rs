use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A broadcast target as pushed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: ChatId,
    pub subject: String,
}

impl Chat {
    pub fn new(id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: ChatId::new(id),
            subject: subject.into(),
        }
    }
}

/// Chat list, text filter and selection set.
///
/// The filtered view is always derived from the full list. Selection survives
/// list replacement untouched, so ids no longer listed stay selected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatDirectory {
    all_chats: Vec<Chat>,
    filter_query: String,
    // Selection order is submission order.
    selected: Vec<ChatId>,
}

impl ChatDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_chats(&mut self, chats: Vec<Chat>) {
        self.all_chats = chats;
    }

    pub fn set_filter(&mut self, query: impl Into<String>) {
        self.filter_query = query.into();
    }

    pub fn filter_query(&self) -> &str {
        &self.filter_query
    }

    pub fn all_chats(&self) -> &[Chat] {
        &self.all_chats
    }

    /// Chats whose subject contains the filter, ignoring case.
    pub fn visible(&self) -> Vec<&Chat> {
        if self.filter_query.is_empty() {
            return self.all_chats.iter().collect();
        }
        let needle = self.filter_query.to_lowercase();
        self.all_chats
            .iter()
            .filter(|chat| chat.subject.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn is_selected(&self, id: &ChatId) -> bool {
        self.selected.contains(id)
    }

    pub fn selected(&self) -> &[ChatId] {
        &self.selected
    }

    pub fn toggle_select(&mut self, id: &ChatId) {
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id.clone());
        }
    }

    pub fn select_all_visible(&mut self) {
        let ids: Vec<ChatId> = self.visible().into_iter().map(|c| c.id.clone()).collect();
        for id in ids {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
    }

    /// Removes visible ids only; selections hidden by the filter are kept.
    pub fn deselect_all_visible(&mut self) {
        let ids: Vec<ChatId> = self.visible().into_iter().map(|c| c.id.clone()).collect();
        self.selected.retain(|id| !ids.contains(id));
    }

    pub fn clear_all_selected(&mut self) {
        self.selected.clear();
    }

    pub fn all_visible_selected(&self) -> bool {
        let visible = self.visible();
        !visible.is_empty() && visible.iter().all(|chat| self.is_selected(&chat.id))
    }

    /// Select-all / deselect-all affordance.
    pub fn toggle_all_visible(&mut self) {
        if self.all_visible_selected() {
            self.deselect_all_visible();
        } else {
            self.select_all_visible();
        }
    }
}
