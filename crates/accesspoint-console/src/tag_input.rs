//! Tag input widget with optional autocomplete.
//!
//! One component backs both tag fields of the grant form:
//!
//! - **Groups** are created with a candidate list. Typing filters the
//!   candidates and a pointer-down on a suggestion adds it.
//! - **IPs** are free-form. Enter adds whatever is in the input field; the
//!   backend does all format validation.
//!
//! The selected tags are mirrored into a hidden field as a comma-joined
//! string. Tags are not escaped, so a tag containing `,` would split into two
//! values on the server.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// How long suggestions stay visible after the input loses focus.
///
/// A pointer-down on a suggestion lands inside this window even when the
/// platform reports the blur first.
pub const SUGGESTION_HIDE_DELAY: Duration = Duration::from_millis(150);

/// Separator used when mirroring tags into the hidden field.
pub const TAG_SEPARATOR: &str = ",";

/// User actions on a tag input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent {
    /// The text in the input field changed.
    Input(String),
    /// The input field gained focus.
    Focus,
    /// The input field lost focus.
    Blur,
    /// Enter was pressed in the input field.
    Enter,
    /// Pointer-down on a rendered suggestion.
    PickSuggestion(String),
    /// The remove affordance of a chip was clicked.
    RemoveChip(String),
    /// The tag container itself (not a chip) was clicked.
    ContainerClick,
}

/// A change to the tag set caused by an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagChange {
    Added(String),
    Removed(String),
}

/// State of one tag input field.
#[derive(Debug, Clone, Default)]
pub struct TagInput {
    /// Candidate list for autocomplete; `None` for free-form inputs.
    candidates: Option<Vec<String>>,
    /// Selected tags in insertion order.
    tags: Vec<String>,
    /// Hidden form field value, kept equal to `tags.join(",")`.
    hidden: String,
    /// Current text in the input field.
    input: String,
    focused: bool,
    /// Last computed suggestions.
    suggestions: Vec<String>,
    suggestions_visible: bool,
    /// Deadline of a pending hide scheduled by a blur.
    hide_at: Option<Instant>,
}

impl TagInput {
    /// Create an input that autocompletes from `candidates`.
    pub fn with_candidates<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: Some(candidates.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Create a free-form input that adds tags on Enter.
    pub fn free_form() -> Self {
        Self::default()
    }

    /// Whether this input offers suggestions.
    pub fn has_candidates(&self) -> bool {
        self.candidates.is_some()
    }

    /// Add a tag. Returns `true` if the set changed.
    ///
    /// The value is trimmed; empty values and values already present are
    /// ignored.
    pub fn add_tag(&mut self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || self.contains(value) {
            return false;
        }
        self.tags.push(value.to_string());
        self.sync_hidden();
        debug!(tag = value, "tag added");
        true
    }

    /// Remove a tag. Returns `true` if it was present.
    pub fn remove_tag(&mut self, value: &str) -> bool {
        let Some(index) = self.tags.iter().position(|t| t == value) else {
            return false;
        };
        self.tags.remove(index);
        self.sync_hidden();
        debug!(tag = value, "tag removed");
        true
    }

    /// Comma-join of the selected tags.
    pub fn serialize(&self) -> String {
        self.tags.join(TAG_SEPARATOR)
    }

    /// Value of the mirrored hidden field.
    pub fn hidden_value(&self) -> &str {
        &self.hidden
    }

    /// Selected tags in display order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn contains(&self, value: &str) -> bool {
        self.tags.iter().any(|t| t == value)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Current text of the input field.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Filter the candidates by `query`.
    ///
    /// Case-insensitive substring match, excluding selected tags, in
    /// candidate order. An empty query with nothing selected yields nothing
    /// so an untouched field does not pop open the full list.
    pub fn suggest(&self, query: &str) -> Vec<String> {
        let Some(candidates) = &self.candidates else {
            return Vec::new();
        };
        if query.is_empty() && self.tags.is_empty() {
            return Vec::new();
        }

        let query = query.to_lowercase();
        candidates
            .iter()
            .filter(|c| !self.contains(c) && c.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }

    /// Suggestions currently shown to the operator.
    pub fn visible_suggestions(&self) -> &[String] {
        if self.suggestions_visible {
            &self.suggestions
        } else {
            &[]
        }
    }

    pub fn suggestions_visible(&self) -> bool {
        self.suggestions_visible && !self.suggestions.is_empty()
    }

    /// Apply a user action.
    pub fn handle(&mut self, event: TagEvent, now: Instant) -> Option<TagChange> {
        match event {
            TagEvent::Input(text) => {
                self.input = text;
                self.refresh_suggestions();
                None
            }
            TagEvent::Focus | TagEvent::ContainerClick => {
                self.focused = true;
                self.refresh_suggestions();
                None
            }
            TagEvent::Blur => {
                self.focused = false;
                self.hide_at = Some(now + SUGGESTION_HIDE_DELAY);
                None
            }
            TagEvent::Enter => {
                // Enter only commits on free-form inputs.
                if self.has_candidates() {
                    return None;
                }
                let value = std::mem::take(&mut self.input);
                let trimmed = value.trim().to_string();
                self.add_tag(&trimmed).then_some(TagChange::Added(trimmed))
            }
            TagEvent::PickSuggestion(value) => {
                if !self.visible_suggestions().contains(&value) {
                    return None;
                }
                // Focus returns to the input, cancelling a hide scheduled by
                // a blur reported before the pointer-down.
                let added = self.add_tag(&value);
                self.input.clear();
                self.focused = true;
                self.hide_at = None;
                self.refresh_suggestions();
                added.then(|| TagChange::Added(value.trim().to_string()))
            }
            TagEvent::RemoveChip(value) => {
                self.remove_tag(&value).then_some(TagChange::Removed(value))
            }
        }
    }

    /// Run the delayed hide if its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.hide_at {
            if now >= deadline {
                self.hide_at = None;
                if !self.focused {
                    self.suggestions_visible = false;
                }
            }
        }
    }

    /// Drop all tags and input text.
    pub fn clear(&mut self) {
        self.tags.clear();
        self.input.clear();
        self.suggestions.clear();
        self.suggestions_visible = false;
        self.hide_at = None;
        self.sync_hidden();
    }

    fn refresh_suggestions(&mut self) {
        if !self.has_candidates() {
            return;
        }
        self.suggestions = self.suggest(&self.input);
        self.suggestions_visible = !self.suggestions.is_empty();
    }

    fn sync_hidden(&mut self) {
        self.hidden = self.serialize();
    }
}
