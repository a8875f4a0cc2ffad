//! Application State
//!
//! Central state for the page renderer plus a small dispatch/subscribe store
//! around it. Window handling, picking and rendering all communicate through
//! actions; subscribers observe the state after every reduction.

/// Loading phase of the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadingPhase {
    /// Resources are still streaming in
    Loading,
    /// Everything loaded, the loading indicator is collapsing
    Finishing,
    /// The grid is live
    Ready,
}

/// Snapshot of the application state.
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    /// Name of the page the grid shows (or is transitioning to)
    pub view_name: Option<String>,
    /// Pointer position in surface pixels
    pub pointer: Option<(f32, f32)>,
    /// Cell index under the pointer, from the picking pass
    pub hovered_index: Option<u32>,
    /// Navigation target under the pointer, if any
    pub hovered_link: Option<String>,
    /// Resource loading progress in 0..=1
    pub loading_progress: f32,
    pub phase: LoadingPhase,
    /// Draw the shadow-map debug overlay
    pub debug_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view_name: None,
            pointer: None,
            hovered_index: None,
            hovered_link: None,
            loading_progress: 0.0,
            phase: LoadingPhase::Loading,
            debug_overlay: false,
        }
    }
}

/// State mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SetView(String),
    SetPointer(Option<(f32, f32)>),
    SetHovered {
        index: Option<u32>,
        link: Option<String>,
    },
    SetLoadingProgress(f32),
    LoadingFinished,
    GridReady,
    ToggleDebugOverlay,
}

type Subscriber = Box<dyn FnMut(&AppState)>;

/// Holds the state and notifies subscribers once per dispatched action.
pub struct Store {
    state: AppState,
    subscribers: Vec<Subscriber>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            state: AppState::default(),
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Register a subscriber; it is called after every dispatch.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&AppState) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Apply an action and notify every subscriber exactly once.
    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::SetView(name) => self.state.view_name = Some(name),
            Action::SetPointer(pointer) => self.state.pointer = pointer,
            Action::SetHovered { index, link } => {
                self.state.hovered_index = index;
                self.state.hovered_link = link;
            }
            Action::SetLoadingProgress(progress) => {
                self.state.loading_progress = progress.clamp(0.0, 1.0);
            }
            Action::LoadingFinished => {
                self.state.loading_progress = 1.0;
                self.state.phase = LoadingPhase::Finishing;
            }
            Action::GridReady => self.state.phase = LoadingPhase::Ready,
            Action::ToggleDebugOverlay => {
                self.state.debug_overlay = !self.state.debug_overlay;
            }
        }
        for subscriber in &mut self.subscribers {
            subscriber(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_dispatch_notifies_once_per_action() {
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);
        let mut store = Store::new();
        store.subscribe(move |_| *seen.borrow_mut() += 1);

        store.dispatch(Action::SetView("home".into()));
        store.dispatch(Action::SetLoadingProgress(0.5));
        assert_eq!(*calls.borrow(), 2);
        assert_eq!(store.state().view_name.as_deref(), Some("home"));
        assert_eq!(store.state().loading_progress, 0.5);
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut store = Store::new();
        store.dispatch(Action::SetLoadingProgress(3.0));
        assert_eq!(store.state().loading_progress, 1.0);
        store.dispatch(Action::SetLoadingProgress(-1.0));
        assert_eq!(store.state().loading_progress, 0.0);
    }

    #[test]
    fn test_loading_phases_advance() {
        let mut store = Store::new();
        assert_eq!(store.state().phase, LoadingPhase::Loading);
        store.dispatch(Action::LoadingFinished);
        assert_eq!(store.state().phase, LoadingPhase::Finishing);
        assert_eq!(store.state().loading_progress, 1.0);
        store.dispatch(Action::GridReady);
        assert_eq!(store.state().phase, LoadingPhase::Ready);
    }
}
