//! Selectable, fuzzy-filterable list used by every list view.
//!
//! Filtering uses nucleo against [`ListEntry::filter_key`]; matches are
//! ordered by score, ties keeping their original order.

use nucleo::pattern::{CaseMatching, Normalization, Pattern};
use nucleo::{Config as NucleoConfig, Matcher, Utf32Str};

use crate::core::config::CommitType;
use crate::core::scope::FileEntry;
use crate::core::store::{CommitRecord, ReleaseRecord};
use crate::git::WorkspaceCommit;

/// What a list needs to know about its items.
pub trait ListEntry {
    fn title(&self) -> String;

    fn description(&self) -> String {
        String::new()
    }

    /// Text matched against the filter query.
    fn filter_key(&self) -> String {
        self.title()
    }
}

/// Items, the filtered view over them, and the highlighted row.
#[derive(Debug, Clone)]
pub struct SelectList<T> {
    items: Vec<T>,
    visible: Vec<usize>,
    selected: usize,
    filter: String,
    filtering: bool,
}

impl<T> Default for SelectList<T> {
    fn default() -> Self {
        Self { items: Vec::new(), visible: Vec::new(), selected: 0, filter: String::new(), filtering: false }
    }
}

impl<T: ListEntry> SelectList<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut list = Self::default();
        list.set_items(items);
        list
    }

    /// Replace the items, keeping the current filter and clamping the
    /// highlighted row.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.refilter();
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Visible items in display order.
    pub fn visible(&self) -> impl Iterator<Item = &T> {
        self.visible.iter().filter_map(|&i| self.items.get(i))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Position of the highlighted row within the visible items.
    pub fn selected_position(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&T> {
        self.visible.get(self.selected).and_then(|&i| self.items.get(i))
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }

    pub fn page_down(&mut self, page: usize) {
        self.selected = (self.selected + page).min(self.visible.len().saturating_sub(1));
    }

    pub fn page_up(&mut self, page: usize) {
        self.selected = self.selected.saturating_sub(page);
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn start_filter(&mut self) {
        self.filtering = true;
    }

    /// Stop editing the query but keep it applied.
    pub fn accept_filter(&mut self) {
        self.filtering = false;
    }

    pub fn clear_filter(&mut self) {
        self.filtering = false;
        self.filter.clear();
        self.refilter();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter.push(c);
        self.refilter();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.refilter();
    }

    fn refilter(&mut self) {
        if self.filter.is_empty() {
            self.visible = (0..self.items.len()).collect();
        } else {
            let mut matcher = Matcher::new(NucleoConfig::DEFAULT);
            let pattern =
                Pattern::parse(&self.filter, CaseMatching::Smart, Normalization::Smart);
            let mut buf = Vec::new();

            let mut scored: Vec<(usize, u32)> = self
                .items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| {
                    let key = item.filter_key();
                    let score = pattern.score(Utf32Str::new(&key, &mut buf), &mut matcher)?;
                    Some((index, score))
                })
                .collect();
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            self.visible = scored.into_iter().map(|(index, _)| index).collect();
        }

        self.selected = self.selected.min(self.visible.len().saturating_sub(1));
    }
}

impl ListEntry for CommitType {
    fn title(&self) -> String {
        self.tag.clone()
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn filter_key(&self) -> String {
        format!("{} {}", self.tag, self.description)
    }
}

impl ListEntry for CommitRecord {
    fn title(&self) -> String {
        self.message_original.clone()
    }

    fn description(&self) -> String {
        format!("{} | {} | {}", self.commit_type, self.scope, self.created_at.format("%Y-%m-%d %H:%M"))
    }

    fn filter_key(&self) -> String {
        format!("{} {} {}", self.commit_type, self.scope, self.message_original)
    }
}

impl ListEntry for ReleaseRecord {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn description(&self) -> String {
        let version = if self.version.is_empty() { "untagged" } else { self.version.as_str() };
        format!("{} | {} | {}", self.release_type, self.branch, version)
    }

    fn filter_key(&self) -> String {
        format!("{} {} {}", self.release_type, self.branch, self.title)
    }
}

impl ListEntry for WorkspaceCommit {
    fn title(&self) -> String {
        self.subject.clone()
    }

    fn description(&self) -> String {
        format!("{} {}", self.short_hash(), self.date)
    }

    fn filter_key(&self) -> String {
        format!("{} {}", self.hash, self.subject)
    }
}

impl ListEntry for FileEntry {
    fn title(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }

    fn description(&self) -> String {
        self.status.clone().unwrap_or_default()
    }

    fn filter_key(&self) -> String {
        self.name.clone()
    }
}
