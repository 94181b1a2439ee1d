//! Check marks, filtering, and cursor of the IED selection list.

use std::collections::HashSet;

use crate::domain::model::{IedHandle, ListItem};

/// Aggregate check state of the visible items, shown by the select-all box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    None,
    Partial,
    All,
}

impl CheckState {
    pub fn symbol(self) -> &'static str {
        match self {
            CheckState::None => "[ ]",
            CheckState::Partial => "[-]",
            CheckState::All => "[x]",
        }
    }
}

/// Items, check marks, filter, and cursor of a selection list.
#[derive(Debug, Default, Clone)]
pub struct SelectionListState {
    items: Vec<ListItem>,
    visible: Vec<usize>,
    cursor: usize,
    filter: String,
    filter_active: bool,
}

impl SelectionListState {
    /// Construct state holding `items`.
    pub fn new(items: Vec<ListItem>) -> Self {
        let mut state = Self::default();
        state.set_items(items);
        state
    }

    /// Replace the items.
    ///
    /// Items whose IED was present before keep their check mark; the filter is kept.
    pub fn set_items(&mut self, items: Vec<ListItem>) {
        let checked: HashSet<IedHandle> = self
            .items
            .iter()
            .filter(|item| item.selected)
            .map(|item| item.ied.clone())
            .collect();
        self.items = items;
        for item in &mut self.items {
            item.selected = item.selected || checked.contains(&item.ied);
        }
        self.refresh_visible();
    }

    /// Remove and return all items.
    pub fn take_items(&mut self) -> Vec<ListItem> {
        let items = std::mem::take(&mut self.items);
        self.refresh_visible();
        items
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Handles of every checked item, in list order, whether or not the filter hides them.
    pub fn selected_handles(&self) -> Vec<IedHandle> {
        self.items
            .iter()
            .filter(|item| item.selected)
            .map(|item| item.ied.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|item| item.selected).count()
    }

    /// Check or uncheck the item with the given handle. Returns `false` when no item matches.
    pub fn set_checked(&mut self, handle: &IedHandle, checked: bool) -> bool {
        match self.items.iter_mut().find(|item| &item.ied == handle) {
            Some(item) => {
                item.selected = checked;
                true
            }
            None => false,
        }
    }

    /// Check or uncheck every item whose IED has the given name. Returns how many matched.
    pub fn set_checked_named(&mut self, name: &str, checked: bool) -> usize {
        let mut matched = 0;
        for item in self.items.iter_mut().filter(|item| item.ied.name() == name) {
            item.selected = checked;
            matched += 1;
        }
        matched
    }

    /// Flip the check mark of the item under the cursor.
    pub fn toggle_current(&mut self) {
        if let Some(index) = self.visible.get(self.cursor).copied() {
            let item = &mut self.items[index];
            item.selected = !item.selected;
        }
    }

    /// Check every visible item, or uncheck them all when they already are.
    pub fn toggle_all_visible(&mut self) {
        let target = self.check_state() != CheckState::All;
        for index in &self.visible {
            self.items[*index].selected = target;
        }
    }

    /// Check state over the visible items.
    pub fn check_state(&self) -> CheckState {
        let checked = self
            .visible
            .iter()
            .filter(|index| self.items[**index].selected)
            .count();
        match checked {
            0 => CheckState::None,
            n if n == self.visible.len() => CheckState::All,
            _ => CheckState::Partial,
        }
    }

    /// Uncheck everything and reset the filter and cursor.
    pub fn clear(&mut self) {
        for item in &mut self.items {
            item.selected = false;
        }
        self.filter.clear();
        self.filter_active = false;
        self.cursor = 0;
        self.refresh_visible();
    }

    pub fn select_next(&mut self) {
        if self.cursor + 1 < self.visible.len() {
            self.cursor += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Activate incremental filter editing.
    pub fn begin_filter(&mut self) {
        self.filter_active = true;
    }

    /// Deactivate the filter editing mode.
    pub fn end_filter(&mut self) {
        self.filter_active = false;
    }

    pub fn is_filter_active(&self) -> bool {
        self.filter_active
    }

    pub fn push_filter_char(&mut self, ch: char) {
        self.filter.push(ch);
        self.refresh_visible();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.refresh_visible();
    }

    /// Replace the filter contents.
    pub fn set_filter<S: Into<String>>(&mut self, pattern: S) {
        self.filter = pattern.into();
        self.refresh_visible();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Items passing the filter, in list order.
    pub fn visible_items(&self) -> impl Iterator<Item = &ListItem> {
        self.visible.iter().map(|index| &self.items[*index])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Position of the cursor within the visible items.
    pub fn cursor(&self) -> Option<usize> {
        (!self.visible.is_empty()).then_some(self.cursor)
    }

    fn refresh_visible(&mut self) {
        let terms: Vec<String> = self
            .filter
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| matches_terms(item, &terms))
            .map(|(index, _)| index)
            .collect();
        if self.cursor >= self.visible.len() {
            self.cursor = self.visible.len().saturating_sub(1);
        }
    }
}

fn matches_terms(item: &ListItem, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }
    let haystack = format!("{} {}", item.headline, item.supporting_text).to_lowercase();
    terms.iter().all(|term| haystack.contains(term.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, supporting: &str) -> ListItem {
        ListItem {
            headline: format!("{name} — ABB - RTU"),
            supporting_text: supporting.into(),
            ied: IedHandle::new(name),
            selected: false,
        }
    }

    fn sample() -> SelectionListState {
        SelectionListState::new(vec![
            item("IED1", "Bay 1 feeder"),
            item("IED2", "Bay 2 feeder"),
            item("Gateway", "Station level"),
        ])
    }

    fn names(handles: Vec<IedHandle>) -> Vec<String> {
        handles.into_iter().map(|h| h.name().to_owned()).collect()
    }

    #[test]
    fn selected_handles_follow_list_order() {
        let mut state = sample();
        state.set_checked(&IedHandle::new("Gateway"), true);
        state.set_checked(&IedHandle::new("IED1"), true);
        assert_eq!(names(state.selected_handles()), ["IED1", "Gateway"]);
    }

    #[test]
    fn filter_matches_all_terms_case_insensitively() {
        let mut state = sample();
        state.set_filter("bay FEEDER 2");
        let visible: Vec<_> = state.visible_items().map(|i| i.ied.name()).collect();
        assert_eq!(visible, ["IED2"]);

        state.set_filter("station");
        let visible: Vec<_> = state.visible_items().map(|i| i.ied.name()).collect();
        assert_eq!(visible, ["Gateway"]);
    }

    #[test]
    fn hidden_items_stay_selected() {
        let mut state = sample();
        state.toggle_current();
        state.set_filter("gateway");
        assert_eq!(names(state.selected_handles()), ["IED1"]);
    }

    #[test]
    fn toggle_all_applies_to_visible_items_only() {
        let mut state = sample();
        state.set_filter("bay");
        state.toggle_all_visible();
        assert_eq!(state.check_state(), CheckState::All);
        assert_eq!(names(state.selected_handles()), ["IED1", "IED2"]);

        state.toggle_all_visible();
        assert_eq!(state.check_state(), CheckState::None);
        assert!(state.selected_handles().is_empty());
    }

    #[test]
    fn check_state_reports_partial_selection() {
        let mut state = sample();
        assert_eq!(state.check_state(), CheckState::None);
        state.select_next();
        state.toggle_current();
        assert_eq!(state.check_state(), CheckState::Partial);
    }

    #[test]
    fn clear_resets_checks_filter_and_cursor() {
        let mut state = sample();
        state.toggle_all_visible();
        state.begin_filter();
        state.push_filter_char('b');
        state.select_next();

        state.clear();

        assert!(state.selected_handles().is_empty());
        assert_eq!(state.filter(), "");
        assert!(!state.is_filter_active());
        assert_eq!(state.visible_len(), 3);
        assert_eq!(state.cursor(), Some(0));
        assert_eq!(state.check_state(), CheckState::None);
    }

    #[test]
    fn set_items_keeps_surviving_checks() {
        let mut state = sample();
        state.set_checked(&IedHandle::new("IED2"), true);
        state.set_checked(&IedHandle::new("Gateway"), true);

        state.set_items(vec![item("IED1", ""), item("Gateway", "")]);

        assert_eq!(names(state.selected_handles()), ["Gateway"]);
    }

    #[test]
    fn cursor_stays_within_visible_items() {
        let mut state = sample();
        state.select_next();
        state.select_next();
        state.select_next();
        assert_eq!(state.cursor(), Some(2));
        state.set_filter("ied1");
        assert_eq!(state.cursor(), Some(0));
        state.set_filter("nothing matches");
        assert_eq!(state.cursor(), None);
    }

    #[test]
    fn duplicate_names_keep_their_own_check_marks() {
        let twin = |occurrence, headline: &str| ListItem {
            headline: headline.into(),
            supporting_text: String::new(),
            ied: IedHandle::nth("X", occurrence),
            selected: false,
        };
        let mut state = SelectionListState::new(vec![twin(0, "X — First"), twin(1, "X — Second")]);
        state.select_next();
        state.toggle_current();

        state.set_items(vec![twin(0, "X — First"), twin(1, "X — Second")]);

        let checked: Vec<_> = state.items().iter().map(|item| item.selected).collect();
        assert_eq!(checked, [false, true]);
        assert_eq!(state.selected_handles(), [IedHandle::nth("X", 1)]);
    }

    #[test]
    fn set_checked_named_covers_every_duplicate() {
        let mut state = SelectionListState::new(vec![
            item("X", ""),
            item("Y", ""),
            ListItem {
                ied: IedHandle::nth("X", 1),
                ..item("X", "")
            },
        ]);
        assert_eq!(state.set_checked_named("X", true), 2);
        assert_eq!(state.set_checked_named("Z", true), 0);
        assert_eq!(
            state.selected_handles(),
            [IedHandle::nth("X", 0), IedHandle::nth("X", 1)]
        );
    }
}
