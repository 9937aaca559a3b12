//! # Message
//!
//! Module dedicated to messages and the attachments they own. Every
//! time a message receives a new wire rep, its attachments are
//! reconciled by relative id with [`KeyedList`], so that front-end
//! bindings to attachments survive the update.

pub mod attachment;

use tracing::debug;

use crate::{
    event::{Emitter, HandlerResult, ListenerId},
    keyed_list::{EventOwner, KeyedList, Shared},
};

#[doc(inline)]
pub use self::attachment::{AttachmentWireRep, MailAttachment};

/// The message wire rep.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct MessageWireRep {
    pub id: String,
    pub subject: String,
    pub flags: Vec<String>,
    pub attachments: Vec<AttachmentWireRep>,
}

/// The message event.
#[derive(Clone, Debug)]
pub enum MessageEvent {
    AttachmentAdded(Shared<MailAttachment>),
    AttachmentUpdated(Shared<MailAttachment>),
    AttachmentRemoved(Shared<MailAttachment>),

    /// The message has been updated, attachments included.
    Change,
}

/// The message.
#[derive(Debug)]
pub struct MailMessage {
    id: String,
    subject: String,
    flags: Vec<String>,
    attachments: Vec<Shared<MailAttachment>>,
    emitter: Emitter<MessageEvent>,
}

impl MailMessage {
    pub fn new(wire: MessageWireRep) -> Self {
        let mut message = Self {
            id: wire.id,
            subject: wire.subject,
            flags: wire.flags,
            attachments: Vec::new(),
            emitter: Emitter::new(),
        };

        message.attachments = message.reconcile_attachments(wire.attachments);
        message
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn attachments(&self) -> &[Shared<MailAttachment>] {
        &self.attachments
    }

    pub fn subscribe(
        &mut self,
        handler: impl Fn(MessageEvent) -> HandlerResult + 'static,
    ) -> ListenerId {
        self.emitter.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.emitter.unsubscribe(id)
    }

    /// Update the message from the given wire rep.
    ///
    /// The message id is immutable: a wire rep carrying another id is
    /// applied as if it was this message's.
    pub fn update(&mut self, wire: MessageWireRep) {
        debug!("updating message {}", self.id);

        self.subject = wire.subject;
        self.flags = wire.flags;
        self.attachments = self.reconcile_attachments(wire.attachments);

        self.emit(MessageEvent::Change);
    }

    fn reconcile_attachments(
        &self,
        wire_reps: Vec<AttachmentWireRep>,
    ) -> Vec<Shared<MailAttachment>> {
        KeyedList {
            wire_reps,
            existing_rich_reps: &self.attachments,
            constructor: MailAttachment::new,
            owner: self,
            id_key: |wire: &AttachmentWireRep| wire.rel_id.clone(),
            add_event: Some(MessageEvent::AttachmentAdded),
            update_event: Some(MessageEvent::AttachmentUpdated),
            remove_event: Some(MessageEvent::AttachmentRemoved),
        }
        .reconcile()
    }
}

impl EventOwner for MailMessage {
    type Event = MessageEvent;

    fn emit(&self, event: MessageEvent) {
        self.emitter.emit(event)
    }
}
