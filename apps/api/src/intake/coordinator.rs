//! Intake Coordinator: turns raw UI events into Conversation Engine and Category Model calls.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::intake::category::{CategoryModel, CategoryRejection};
use crate::intake::conversation::{Conversation, ConversationRejection, FileHandle, Message};
use crate::intake::progress::{ManualProgress, ProgressSignal};

pub const GREETING: &str = "Ready to say goodbye to CVs and Cover Letters for good? \
    Just drop your CV, portfolio, LinkedIn, or GitHub, and I'll start building your profile.";

const ENTER: &str = "Enter";
const ESCAPE: &str = "Escape";

/// A raw event from the intake surface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntakeEvent {
    DragEnter,
    DragLeave,
    Drop {
        file: FileHandle,
    },
    FileSelected {
        file: FileHandle,
    },
    InputChanged {
        text: String,
    },
    KeyDown {
        key: String,
        #[serde(default)]
        shift: bool,
    },
    ComposerOpened,
    ComposerChanged {
        text: String,
    },
    ComposerKeyDown {
        key: String,
    },
    ComposerBlurred,
    CategoryClicked {
        name: String,
    },
    CategoryDeselected,
}

/// Why a guarded action left state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Rejection {
    Category(CategoryRejection),
    Conversation(ConversationRejection),
}

impl From<CategoryRejection> for Rejection {
    fn from(value: CategoryRejection) -> Self {
        Rejection::Category(value)
    }
}

impl From<ConversationRejection> for Rejection {
    fn from(value: ConversationRejection) -> Self {
        Rejection::Conversation(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    /// Presentation or buffer state changed; the transcript did not.
    Updated,
    Sent { message: Message },
    FileAttached { file: FileHandle },
    CategoryAdded { name: String },
    SelectionChanged { selected: Option<String> },
    /// The event does not apply in the current state.
    Ignored,
    Rejected { reason: Rejection },
}

impl From<CategoryRejection> for EventOutcome {
    fn from(value: CategoryRejection) -> Self {
        EventOutcome::Rejected {
            reason: value.into(),
        }
    }
}

impl From<ConversationRejection> for EventOutcome {
    fn from(value: ConversationRejection) -> Self {
        EventOutcome::Rejected {
            reason: value.into(),
        }
    }
}

pub struct IntakeCoordinator {
    conversation: Conversation,
    categories: CategoryModel,
    is_dragging: bool,
    /// Category name being typed; `None` while the composer is closed.
    composer: Option<String>,
    progress_signal: Arc<dyn ProgressSignal>,
}

impl Default for IntakeCoordinator {
    fn default() -> Self {
        Self::new(Arc::new(ManualProgress))
    }
}

impl IntakeCoordinator {
    /// A fresh session: greeting turn plus the well-known categories.
    pub fn new(progress_signal: Arc<dyn ProgressSignal>) -> Self {
        let mut conversation = Conversation::new();
        conversation.append_agent_message(GREETING);
        Self {
            conversation,
            categories: CategoryModel::with_defaults(),
            is_dragging: false,
            composer: None,
            progress_signal,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn categories(&self) -> &CategoryModel {
        &self.categories
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn composer(&self) -> Option<&str> {
        self.composer.as_deref()
    }

    pub fn handle(&mut self, event: IntakeEvent) -> EventOutcome {
        debug!(?event, "intake event");
        match event {
            IntakeEvent::DragEnter => {
                self.is_dragging = true;
                EventOutcome::Updated
            }
            IntakeEvent::DragLeave => {
                self.is_dragging = false;
                EventOutcome::Updated
            }
            IntakeEvent::Drop { file } => {
                self.is_dragging = false;
                self.attach(file)
            }
            IntakeEvent::FileSelected { file } => self.attach(file),
            IntakeEvent::InputChanged { text } => {
                self.conversation.set_pending_input(text);
                EventOutcome::Updated
            }
            IntakeEvent::KeyDown { key, shift } => {
                if key == ENTER && !shift {
                    self.send()
                } else {
                    EventOutcome::Ignored
                }
            }
            IntakeEvent::ComposerOpened => {
                self.composer.get_or_insert_with(String::new);
                EventOutcome::Updated
            }
            IntakeEvent::ComposerChanged { text } => match self.composer.as_mut() {
                Some(buffer) => {
                    *buffer = text;
                    EventOutcome::Updated
                }
                None => EventOutcome::Ignored,
            },
            IntakeEvent::ComposerKeyDown { key } => match key.as_str() {
                ENTER => self.commit_composer(),
                ESCAPE => match self.composer.take() {
                    Some(_) => EventOutcome::Updated,
                    None => EventOutcome::Ignored,
                },
                _ => EventOutcome::Ignored,
            },
            IntakeEvent::ComposerBlurred => self.commit_composer(),
            IntakeEvent::CategoryClicked { name } => match self.categories.select(&name) {
                Ok(selected) => EventOutcome::SelectionChanged {
                    selected: selected.map(|c| c.name.clone()),
                },
                Err(rejection) => rejection.into(),
            },
            IntakeEvent::CategoryDeselected => {
                self.categories.deselect();
                EventOutcome::SelectionChanged { selected: None }
            }
        }
    }

    /// Sends the pending buffers and feeds the progress signal.
    pub fn send(&mut self) -> EventOutcome {
        match self.conversation.send() {
            Ok(message) => {
                self.apply_progress_signal();
                EventOutcome::Sent { message }
            }
            Err(rejection) => rejection.into(),
        }
    }

    /// Ends the thinking state. Called by whatever delivers agent replies.
    pub fn resolve_thinking(&mut self) {
        self.conversation.resolve_thinking();
    }

    /// Appends an agent turn and ends the thinking state.
    pub fn receive_agent_reply(&mut self, text: impl Into<String>) -> Message {
        let message = self.conversation.append_agent_message(text).clone();
        self.conversation.resolve_thinking();
        message
    }

    pub fn set_progress(&mut self, category: &str, value: i64) -> Result<u8, CategoryRejection> {
        self.categories.set_progress(category, value)
    }

    fn attach(&mut self, file: FileHandle) -> EventOutcome {
        match self.conversation.attach_file(file) {
            Ok(file) => EventOutcome::FileAttached { file: file.clone() },
            Err(rejection) => rejection.into(),
        }
    }

    /// Adds the composed name (if any), then clears and closes the composer either way.
    fn commit_composer(&mut self) -> EventOutcome {
        let Some(name) = self.composer.take() else {
            return EventOutcome::Ignored;
        };
        match self.categories.add_category(&name) {
            Ok(category) => EventOutcome::CategoryAdded {
                name: category.name.clone(),
            },
            Err(rejection) => rejection.into(),
        }
    }

    fn apply_progress_signal(&mut self) {
        let updates = self
            .progress_signal
            .assess(self.categories.categories(), self.conversation.messages());
        for update in updates {
            if let Err(rejection) = self.categories.set_progress(&update.category, update.progress) {
                debug!(category = %update.category, %rejection, "progress update skipped");
            }
        }
    }
}
