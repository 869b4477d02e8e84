//! Read-only projection of a session for the front end.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::intake::conversation::{FileHandle, Message};
use crate::intake::coordinator::IntakeCoordinator;

/// The grid never grows past this many columns.
const MAX_GRID_COLUMNS: usize = 7;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub name: String,
    pub progress: u8,
    /// Shown only while nothing has been filled in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntakeView {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    pub categories: Vec<CategoryView>,
    pub selected_category: Option<String>,
    pub pending_input: String,
    pub attached_file: Option<FileHandle>,
    pub is_thinking: bool,
    pub is_dragging: bool,
    pub composer_open: bool,
    pub composer_text: String,
    pub can_send: bool,
    /// One column per category plus the "add" tile.
    pub grid_columns: usize,
}

impl IntakeView {
    pub fn render(
        session_id: Uuid,
        created_at: DateTime<Utc>,
        coordinator: &IntakeCoordinator,
    ) -> Self {
        let conversation = coordinator.conversation();
        let categories = coordinator.categories();

        IntakeView {
            session_id,
            created_at,
            messages: conversation.messages().to_vec(),
            categories: categories
                .categories()
                .iter()
                .map(|c| CategoryView {
                    name: c.name.clone(),
                    progress: c.progress,
                    hint: (c.progress == 0).then(|| c.hint()),
                })
                .collect(),
            selected_category: categories.selected().map(|c| c.name.clone()),
            pending_input: conversation.pending_input().to_string(),
            attached_file: conversation.attached_file().cloned(),
            is_thinking: conversation.is_thinking(),
            is_dragging: coordinator.is_dragging(),
            composer_open: coordinator.composer().is_some(),
            composer_text: coordinator.composer().unwrap_or_default().to_string(),
            can_send: conversation.can_send(),
            grid_columns: grid_columns(categories.categories().len()),
        }
    }
}

pub fn grid_columns(category_count: usize) -> usize {
    (category_count + 1).min(MAX_GRID_COLUMNS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::coordinator::IntakeEvent;

    #[test]
    fn test_grid_columns_caps_at_seven() {
        assert_eq!(grid_columns(0), 1);
        assert_eq!(grid_columns(3), 4);
        assert_eq!(grid_columns(6), 7);
        assert_eq!(grid_columns(40), 7);
    }

    #[test]
    fn test_hint_hidden_once_progress_starts() {
        let mut coordinator = IntakeCoordinator::default();
        coordinator.set_progress("Skills", 30).unwrap();

        let view = IntakeView::render(Uuid::new_v4(), Utc::now(), &coordinator);

        let skills = view.categories.iter().find(|c| c.name == "Skills").unwrap();
        let education = view
            .categories
            .iter()
            .find(|c| c.name == "Education")
            .unwrap();
        assert!(skills.hint.is_none());
        assert!(education.hint.is_some());
    }

    #[test]
    fn test_view_reflects_send_guard() {
        let mut coordinator = IntakeCoordinator::default();
        let view = IntakeView::render(Uuid::new_v4(), Utc::now(), &coordinator);
        assert!(!view.can_send);

        coordinator.handle(IntakeEvent::InputChanged {
            text: "hi".to_string(),
        });
        let view = IntakeView::render(Uuid::new_v4(), Utc::now(), &coordinator);
        assert!(view.can_send);
        assert_eq!(view.grid_columns, 7);
    }
}
