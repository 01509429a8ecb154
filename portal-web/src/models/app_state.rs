use shared::{
    guard::GuardState,
    models::{Theme, UiPreferences},
};
use yewdux::Store;

/// Render-side mirror of the session store.
///
/// `guard` is only ever written from the store's change notifications; views
/// read it and never derive access on their own.
#[derive(Default, Clone, PartialEq, Eq, Store)]
pub struct AppState {
    pub guard: GuardState,
    pub preferences: UiPreferences,
    /// `None` until the theme switcher has resolved the saved choice.
    pub theme: Option<Theme>,
}

impl AppState {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.guard.is_admin()
    }
}
