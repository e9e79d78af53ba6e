//! Autocomplete input with a dropdown of caller-filtered options
//!
//! The component is controlled: the caller owns the text value and the
//! option list, and reacts to the [`AutocompleteEvent`]s returned by the
//! input handlers. The component owns only the dropdown state: whether it
//! is open and which option is highlighted.

use crate::events::{EventScope, PointerEvent, Rect, Subscription};
use crate::City;
use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;

/// Item that can be shown and committed in an autocomplete dropdown
pub trait SearchOption: Clone {
    /// Stable identifier, unique within one option list
    fn key(&self) -> &str;
    /// Text written into the input on commit
    fn label(&self) -> &str;
    /// Secondary line shown under the label
    fn detail(&self) -> &str;
}

impl SearchOption for City {
    fn key(&self) -> &str {
        &self.code
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn detail(&self) -> &str {
        &self.country
    }
}

/// Keys the component reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Other,
}

/// Notification for the owner of the component
#[derive(Debug, Clone, PartialEq)]
pub enum AutocompleteEvent<T> {
    /// The text value should become this string
    Changed(String),
    /// An option was committed
    Selected(T),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct DropdownState {
    is_open: bool,
    highlighted: Option<usize>,
}

impl DropdownState {
    fn open(&mut self) {
        self.is_open = true;
    }

    fn close(&mut self) {
        self.is_open = false;
        self.highlighted = None;
    }
}

/// One row of the visible dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRow<'a> {
    pub key: &'a str,
    pub label: &'a str,
    pub detail: &'a str,
    pub highlighted: bool,
}

/// Everything needed to draw one autocomplete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteView<'a> {
    pub value: &'a str,
    pub placeholder: &'a str,
    pub icon: Option<&'a str>,
    pub loading: bool,
    /// `None` when the dropdown is hidden
    pub dropdown: Option<Vec<OptionRow<'a>>>,
}

/// Autocomplete component over options of type `T`
#[derive(Debug)]
pub struct Autocomplete<T: SearchOption> {
    placeholder: String,
    icon: Option<String>,
    loading: bool,
    options: Vec<T>,
    state: Rc<Cell<DropdownState>>,
    bounds: Rc<Cell<Rect>>,
    outside_click: Option<Subscription>,
}

impl<T: SearchOption> Autocomplete<T> {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            icon: None,
            loading: false,
            options: Vec::new(),
            state: Rc::new(Cell::new(DropdownState::default())),
            bounds: Rc::new(Cell::new(Rect::default())),
            outside_click: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Attach to a page: start listening for pointer events outside `bounds`.
    ///
    /// Mounting an already mounted component replaces its listener.
    pub fn mount(&mut self, scope: &EventScope, bounds: Rect) {
        self.bounds.set(bounds);

        let state = Rc::downgrade(&self.state);
        let region = Rc::downgrade(&self.bounds);
        let subscription = scope.subscribe(move |event: &PointerEvent| {
            let (Some(state), Some(region)) = (state.upgrade(), region.upgrade()) else {
                return;
            };
            if region.get().contains(event.position()) {
                return;
            }
            let mut current = state.get();
            if current.is_open {
                current.close();
                state.set(current);
                debug!("Dropdown closed by outside pointer event");
            }
        });

        self.outside_click = Some(subscription);
    }

    /// Detach from the page, releasing the pointer listener
    pub fn unmount(&mut self) {
        self.outside_click = None;
        self.update(DropdownState::close);
    }

    pub fn is_mounted(&self) -> bool {
        self.outside_click.is_some()
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds.set(bounds);
    }

    pub fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Replace the candidate options; a highlight past the new end is dropped
    pub fn set_options(&mut self, options: Vec<T>) {
        self.options = options;
        let len = self.options.len();
        self.update(|state| {
            if state.highlighted.is_some_and(|i| i >= len) {
                state.highlighted = None;
            }
        });
    }

    pub fn options(&self) -> &[T] {
        &self.options
    }

    pub fn is_open(&self) -> bool {
        self.state.get().is_open
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        self.state.get().highlighted
    }

    /// Whether the option list is visible: open and non-empty
    pub fn shows_dropdown(&self) -> bool {
        self.is_open() && !self.options.is_empty()
    }

    pub fn focus(&mut self) {
        self.update(DropdownState::open);
    }

    /// The user edited the text
    pub fn input(&mut self, text: impl Into<String>) -> Vec<AutocompleteEvent<T>> {
        self.update(|state| {
            state.open();
            state.highlighted = None;
        });
        vec![AutocompleteEvent::Changed(text.into())]
    }

    pub fn key(&mut self, key: Key) -> Vec<AutocompleteEvent<T>> {
        let current = self.state.get();
        if !current.is_open {
            return Vec::new();
        }

        let len = self.options.len();
        match key {
            Key::ArrowDown => {
                self.update(|state| {
                    state.highlighted = match state.highlighted {
                        None if len > 0 => Some(0),
                        Some(i) if i + 1 < len => Some(i + 1),
                        unchanged => unchanged,
                    };
                });
                Vec::new()
            }
            Key::ArrowUp => {
                self.update(|state| {
                    state.highlighted = state.highlighted.and_then(|i| i.checked_sub(1));
                });
                Vec::new()
            }
            Key::Enter => match current.highlighted {
                Some(index) if index < len => self.commit(index),
                _ => Vec::new(),
            },
            Key::Escape => {
                self.update(DropdownState::close);
                Vec::new()
            }
            Key::Other => Vec::new(),
        }
    }

    /// Direct activation of the option at `index`
    pub fn click_option(&mut self, index: usize) -> Vec<AutocompleteEvent<T>> {
        if index < self.options.len() {
            self.commit(index)
        } else {
            Vec::new()
        }
    }

    pub fn view<'a>(&'a self, value: &'a str) -> AutocompleteView<'a> {
        let highlighted = self.highlighted_index();
        let dropdown = self.shows_dropdown().then(|| {
            self.options
                .iter()
                .enumerate()
                .map(|(i, option)| OptionRow {
                    key: option.key(),
                    label: option.label(),
                    detail: option.detail(),
                    highlighted: highlighted == Some(i),
                })
                .collect()
        });

        AutocompleteView {
            value,
            placeholder: &self.placeholder,
            icon: self.icon.as_deref(),
            loading: self.loading,
            dropdown,
        }
    }

    fn commit(&mut self, index: usize) -> Vec<AutocompleteEvent<T>> {
        let option = self.options[index].clone();
        debug!(key = option.key(), "Option committed");
        self.update(DropdownState::close);
        vec![
            AutocompleteEvent::Changed(option.label().to_string()),
            AutocompleteEvent::Selected(option),
        ]
    }

    fn update(&self, f: impl FnOnce(&mut DropdownState)) {
        let mut state = self.state.get();
        f(&mut state);
        self.state.set(state);
    }
}
