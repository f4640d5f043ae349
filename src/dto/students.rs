//! View model for the student list screen.

use serde::Serialize;

use crate::controller::ListSnapshot;
use crate::domain::student::{SortField, SortOrder, Student};
use crate::pagination::Paginated;

/// What to show in place of the table when the page has no rows.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmptyState {
    pub title: &'static str,
    pub description: &'static str,
    pub action: EmptyStateAction,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum EmptyStateAction {
    ClearFilters,
    AddStudent,
}

impl EmptyStateAction {
    pub const fn label(self) -> &'static str {
        match self {
            EmptyStateAction::ClearFilters => "Clear Filters",
            EmptyStateAction::AddStudent => "Add Your First Student",
        }
    }
}

impl EmptyState {
    pub fn for_filters(filtered: bool) -> Self {
        if filtered {
            Self {
                title: "No students found",
                description: "Try adjusting your filters to find what you're looking for.",
                action: EmptyStateAction::ClearFilters,
            }
        } else {
            Self {
                title: "No students yet",
                description: "Get started by adding your first student to the database.",
                action: EmptyStateAction::AddStudent,
            }
        }
    }
}

/// Header cell of a sortable column.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SortColumn {
    pub field: SortField,
    pub label: &'static str,
    /// Direction indicator, present only on the active column.
    pub order: Option<SortOrder>,
}

/// Data required to render the student list.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StudentsPageData {
    pub students: Paginated<Student>,
    pub total: usize,
    pub columns: Vec<SortColumn>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub show_pagination: bool,
    /// Set when the page finished loading without rows.
    pub empty_state: Option<EmptyState>,
}

impl StudentsPageData {
    pub fn from_snapshot(snapshot: &ListSnapshot) -> Self {
        let query = &snapshot.query;
        let students = Paginated::new(snapshot.items.clone(), query.page, snapshot.total_pages);

        let columns = SortField::SORTABLE_COLUMNS
            .iter()
            .map(|&field| SortColumn {
                field,
                label: field.label(),
                order: (field == query.sort_by).then_some(query.sort_order),
            })
            .collect();

        let has_rows = !snapshot.items.is_empty();
        let show_pagination = !snapshot.is_loading && has_rows && students.should_display();
        let empty_state = (!snapshot.is_loading && !has_rows)
            .then(|| EmptyState::for_filters(query.has_filters()));

        Self {
            students,
            total: snapshot.total,
            columns,
            is_loading: snapshot.is_loading,
            error: snapshot.error.clone(),
            show_pagination,
            empty_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ListQuery;

    fn snapshot(items: usize, total_pages: usize, query: ListQuery) -> ListSnapshot {
        ListSnapshot {
            items: (1..=items as i64)
                .map(|id| Student {
                    id,
                    ..Student::default()
                })
                .collect(),
            total: items,
            total_pages,
            is_loading: false,
            search_pending: false,
            error: None,
            query,
        }
    }

    #[test]
    fn pagination_is_shown_for_multiple_pages_with_rows() {
        let data = StudentsPageData::from_snapshot(&snapshot(9, 4, ListQuery::default()));

        assert!(data.show_pagination);
        assert!(data.empty_state.is_none());
        assert_eq!(data.students.pages, vec![Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(data.students.next_page(), Some(2));
    }

    #[test]
    fn single_page_hides_pagination() {
        let data = StudentsPageData::from_snapshot(&snapshot(3, 1, ListQuery::default()));
        assert!(!data.show_pagination);
    }

    #[test]
    fn loading_hides_pagination_and_empty_state() {
        let mut loading = snapshot(0, 4, ListQuery::default());
        loading.is_loading = true;

        let data = StudentsPageData::from_snapshot(&loading);

        assert!(!data.show_pagination);
        assert!(data.empty_state.is_none());
    }

    #[test]
    fn empty_state_depends_on_active_filters() {
        let unfiltered = StudentsPageData::from_snapshot(&snapshot(0, 1, ListQuery::default()));
        let empty = unfiltered.empty_state.unwrap();
        assert_eq!(empty.title, "No students yet");
        assert_eq!(empty.action, EmptyStateAction::AddStudent);

        let filtered =
            StudentsPageData::from_snapshot(&snapshot(0, 1, ListQuery::default().city("Rome")));
        let empty = filtered.empty_state.unwrap();
        assert_eq!(empty.title, "No students found");
        assert_eq!(empty.action.label(), "Clear Filters");
    }

    #[test]
    fn page_past_the_end_shows_empty_state_not_error() {
        let past_end = snapshot(0, 3, ListQuery::default().paginate(7));

        let data = StudentsPageData::from_snapshot(&past_end);

        assert!(data.error.is_none());
        assert!(!data.show_pagination);
        assert!(data.empty_state.is_some());
    }

    #[test]
    fn only_the_active_column_carries_a_direction() {
        let query = ListQuery::default().sort(SortField::Age, SortOrder::Asc);
        let data = StudentsPageData::from_snapshot(&snapshot(1, 1, query));

        let active: Vec<_> = data.columns.iter().filter(|c| c.order.is_some()).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].field, SortField::Age);
        assert_eq!(active[0].order, Some(SortOrder::Asc));
    }
}
