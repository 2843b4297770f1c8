//! Placement of the "create task" call-to-action.
//!
//! The list page has three places a create button can live. Which one shows
//! depends only on what is currently scrolled into view, and at most one is
//! shown at a time.

/// Visibility observations reported by the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visibility {
    /// The page header (with its inline button) is on screen.
    pub header_in_view: bool,
    /// The end of the task list is on screen.
    pub list_end_in_view: bool,
    /// The list container is on screen.
    pub container_in_view: bool,
}

/// Which create button to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateButtonPlacement {
    /// Button in the page header.
    Inline,
    /// Button docked under the last task.
    Docked,
    /// Floating button over the list.
    Floating,
    /// No button.
    None,
}

/// Pick the create button placement.
///
/// Header visible wins, then list end, then the floating button if the
/// container is visible and floating is enabled.
#[must_use]
pub const fn create_button_placement(
    visibility: Visibility,
    floating_enabled: bool,
) -> CreateButtonPlacement {
    if visibility.header_in_view {
        CreateButtonPlacement::Inline
    } else if visibility.list_end_in_view {
        CreateButtonPlacement::Docked
    } else if visibility.container_in_view && floating_enabled {
        CreateButtonPlacement::Floating
    } else {
        CreateButtonPlacement::None
    }
}
