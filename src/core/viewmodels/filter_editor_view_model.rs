use super::filters::Filter;

/// Editable working copy of a list's filters, used by the filter screen.
///
/// Starts from blank copies so editing never touches the live filters until
/// the result is applied.
#[derive(Debug, Clone)]
pub struct FilterEditor {
    filters: Vec<Filter>,
}

impl FilterEditor {
    pub fn new(current: &[Filter]) -> Self {
        Self {
            filters: current.iter().map(Filter::blank_copy).collect(),
        }
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn filter(&self, index: usize) -> Option<&Filter> {
        self.filters.get(index)
    }

    pub fn selected_count(&self, index: usize) -> usize {
        self.filters
            .get(index)
            .map_or(0, |filter| filter.selected_indices().len())
    }

    /// Returns false when `filter_index` is out of range.
    pub fn set_selection(
        &mut self,
        filter_index: usize,
        indices: impl IntoIterator<Item = usize>,
    ) -> bool {
        match self.filters.get_mut(filter_index) {
            Some(filter) => {
                filter.set_selected(indices);
                true
            }
            None => false,
        }
    }

    pub fn toggle_option(&mut self, filter_index: usize, option_index: usize) -> bool {
        let Some(filter) = self.filters.get_mut(filter_index) else {
            return false;
        };
        if option_index >= filter.options().len() {
            return false;
        }
        let mut selected = filter.selected_indices().clone();
        if !selected.remove(&option_index) {
            selected.insert(option_index);
        }
        filter.set_selected(selected);
        true
    }

    pub fn clear(&mut self) {
        self.filters.iter_mut().for_each(Filter::clear_selection);
    }

    pub fn into_filters(self) -> Vec<Filter> {
        self.filters
    }
}
