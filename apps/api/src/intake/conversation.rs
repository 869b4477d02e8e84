//! Conversation Engine: the append-only transcript, the input buffers and the thinking flag.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
const FILE_MARKER: &str = "📄";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Agent,
    User,
}

/// One transcript turn. Position in the transcript is its only identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// A file the user dropped or picked. Only metadata is kept; contents are never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: None,
        }
    }

    /// Checks the declared MIME type, ignoring case and parameters.
    pub fn is_pdf(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationRejection {
    #[error("only PDF files can be attached")]
    NotPdf,
    #[error("nothing to send")]
    NothingToSend,
}

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    pending_input: String,
    attached_file: Option<FileHandle>,
    is_thinking: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn attached_file(&self) -> Option<&FileHandle> {
        self.attached_file.as_ref()
    }

    pub fn is_thinking(&self) -> bool {
        self.is_thinking
    }

    pub fn append_agent_message(&mut self, text: impl Into<String>) -> &Message {
        self.messages.push(Message {
            role: Role::Agent,
            content: text.into(),
        });
        &self.messages[self.messages.len() - 1]
    }

    pub fn set_pending_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    /// Replaces the attachment if `file` is a PDF; anything else leaves it as it was.
    pub fn attach_file(&mut self, file: FileHandle) -> Result<&FileHandle, ConversationRejection> {
        if !file.is_pdf() {
            return Err(ConversationRejection::NotPdf);
        }
        Ok(&*self.attached_file.insert(file))
    }

    pub fn can_send(&self) -> bool {
        !self.pending_input.trim().is_empty() || self.attached_file.is_some()
    }

    /// Appends the user turn built from the buffers, clears them and starts thinking.
    pub fn send(&mut self) -> Result<Message, ConversationRejection> {
        if !self.can_send() {
            return Err(ConversationRejection::NothingToSend);
        }

        let text = std::mem::take(&mut self.pending_input);
        let file = self.attached_file.take();
        let message = Message {
            role: Role::User,
            content: compose_user_content(text.trim(), file.as_ref()),
        };

        self.messages.push(message.clone());
        self.is_thinking = true;
        Ok(message)
    }

    pub fn resolve_thinking(&mut self) {
        self.is_thinking = false;
    }
}

fn compose_user_content(text: &str, file: Option<&FileHandle>) -> String {
    match file {
        None => text.to_string(),
        Some(file) if text.is_empty() => format!("{FILE_MARKER} {}", file.name),
        Some(file) => format!("{text}\n{FILE_MARKER} {}", file.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resume() -> FileHandle {
        FileHandle::new("resume.pdf", "application/pdf")
    }

    #[test]
    fn test_send_with_blank_input_and_no_file_is_rejected() {
        let mut conversation = Conversation::new();
        conversation.set_pending_input("   \n\t");

        assert_eq!(
            conversation.send(),
            Err(ConversationRejection::NothingToSend)
        );
        assert!(conversation.messages().is_empty());
        assert!(!conversation.is_thinking());
        assert_eq!(conversation.pending_input(), "   \n\t");
    }

    #[test]
    fn test_send_text_appends_user_message_and_starts_thinking() {
        let mut conversation = Conversation::new();
        conversation.set_pending_input("hello");

        let sent = conversation.send().unwrap();

        assert_eq!(
            sent,
            Message {
                role: Role::User,
                content: "hello".to_string()
            }
        );
        assert_eq!(conversation.messages(), &[sent]);
        assert!(conversation.is_thinking());
        assert_eq!(conversation.pending_input(), "");
    }

    #[test]
    fn test_send_trims_text() {
        let mut conversation = Conversation::new();
        conversation.set_pending_input("  I studied physics  ");
        assert_eq!(conversation.send().unwrap().content, "I studied physics");
    }

    #[test]
    fn test_send_file_only_uses_file_marker() {
        let mut conversation = Conversation::new();
        conversation.attach_file(resume()).unwrap();

        let sent = conversation.send().unwrap();

        assert_eq!(sent.content, "📄 resume.pdf");
        assert!(conversation.attached_file().is_none());
        assert!(conversation.is_thinking());
    }

    #[test]
    fn test_send_text_and_file_suffixes_marker() {
        let mut conversation = Conversation::new();
        conversation.set_pending_input("my CV ");
        conversation.attach_file(resume()).unwrap();

        assert_eq!(conversation.send().unwrap().content, "my CV\n📄 resume.pdf");
    }

    #[test]
    fn test_attach_non_pdf_leaves_attachment_unset() {
        let mut conversation = Conversation::new();
        let notes = FileHandle::new("notes.txt", "text/plain");

        assert_eq!(
            conversation.attach_file(notes),
            Err(ConversationRejection::NotPdf)
        );
        assert!(conversation.attached_file().is_none());
        assert!(conversation.messages().is_empty());
    }

    #[test]
    fn test_attach_non_pdf_keeps_previous_pdf() {
        let mut conversation = Conversation::new();
        conversation.attach_file(resume()).unwrap();
        let _ = conversation.attach_file(FileHandle::new("notes.txt", "text/plain"));

        assert_eq!(conversation.attached_file(), Some(&resume()));
    }

    #[test]
    fn test_pdf_check_ignores_case_and_parameters() {
        assert!(FileHandle::new("a.pdf", "Application/PDF").is_pdf());
        assert!(FileHandle::new("a.pdf", "application/pdf; name=a.pdf").is_pdf());
        assert!(!FileHandle::new("a.pdf", "").is_pdf());
        assert!(!FileHandle::new("a.pdf", "application/x-pdf-ish").is_pdf());
    }

    #[test]
    fn test_resolve_thinking_clears_flag() {
        let mut conversation = Conversation::new();
        conversation.set_pending_input("hi");
        conversation.send().unwrap();

        conversation.resolve_thinking();

        assert!(!conversation.is_thinking());
    }

    #[test]
    fn test_consecutive_agent_messages_are_allowed() {
        let mut conversation = Conversation::new();
        conversation.append_agent_message("first");
        conversation.append_agent_message("second");

        let roles: Vec<_> = conversation.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Agent, Role::Agent]);
    }
}
