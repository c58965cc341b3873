//! Generic filterable list with a selection cursor and scroll offset.

pub struct ScrollableList<T> {
    items: Vec<T>,
    visible: Vec<usize>,
    selected: usize,
    scroll_offset: usize,
    filter: String,
    matches: fn(&T, &str) -> bool,
}

impl<T> ScrollableList<T> {
    pub fn new(matches: fn(&T, &str) -> bool) -> Self {
        Self {
            items: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            filter: String::new(),
            matches,
        }
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.rebuild();
    }

    pub fn set_filter(&mut self, query: &str) {
        let prev = self.visible.get(self.selected).copied();
        self.filter = query.to_string();
        self.rebuild();
        self.selected = prev
            .and_then(|p| self.visible.iter().position(|&i| i == p))
            .unwrap_or(0);
        self.scroll_offset = 0;
    }

    fn rebuild(&mut self) {
        let filter = self.filter.as_str();
        let matches = self.matches;
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| filter.is_empty() || matches(item, filter))
            .map(|(i, _)| i)
            .collect();
        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }

    pub fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        self.selected = (self.selected + n).min(self.visible.len().saturating_sub(1));
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.visible.get(self.selected).map(|&i| &self.items[i])
    }

    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected + 1 - height;
        }
    }

    /// `(is_selected, item)` pairs for the rows that fit in `height`.
    pub fn visible_items(&self, height: usize) -> impl Iterator<Item = (bool, &T)> {
        self.visible
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(height)
            .map(move |(pos, &i)| (pos == self.selected, &self.items[i]))
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn total_len(&self) -> usize {
        self.items.len()
    }
}
