//! View-state for task lists: search, filters, sorting, pagination and the
//! create button placement.

pub mod cta;
pub mod list;
pub mod page;

pub use cta::{create_button_placement, CreateButtonPlacement, Visibility};
pub use list::{
    Filter, ListOutcome, SortDirection, SortField, SortSpec, TaskListState,
    DEFAULT_SEARCH_DEBOUNCE_MS,
};
pub use page::{paginate, Page};
