use crate::{
    event::Emitter,
    keyed_list::{RichRep, RichRepEvent},
};

use super::MailMessage;

/// The attachment wire rep.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct AttachmentWireRep {
    /// Identifier of the attachment, relative to its message.
    pub rel_id: String,
    pub filename: String,
    pub mimetype: String,
    pub size_estimate: u64,

    /// Location of the downloaded file, if any.
    pub file: Option<String>,
}

/// The attachment of a [`MailMessage`].
///
/// The same attachment object survives message updates as long as
/// its relative id stays part of the message.
#[derive(Debug)]
pub struct MailAttachment {
    message_id: String,
    wire: AttachmentWireRep,
    emitter: Emitter<RichRepEvent<MailAttachment>>,
}

impl MailAttachment {
    pub fn new(message: &MailMessage, wire: AttachmentWireRep) -> Self {
        Self {
            message_id: message.id().to_owned(),
            wire,
            emitter: Emitter::new(),
        }
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn rel_id(&self) -> &str {
        &self.wire.rel_id
    }

    pub fn filename(&self) -> &str {
        &self.wire.filename
    }

    pub fn mimetype(&self) -> &str {
        &self.wire.mimetype
    }

    pub fn size_estimate(&self) -> u64 {
        self.wire.size_estimate
    }

    pub fn is_downloaded(&self) -> bool {
        self.wire.file.is_some()
    }

    pub fn emitter_mut(&mut self) -> &mut Emitter<RichRepEvent<MailAttachment>> {
        &mut self.emitter
    }
}

impl RichRep for MailAttachment {
    type WireRep = AttachmentWireRep;

    fn wire_rep(&self) -> &AttachmentWireRep {
        &self.wire
    }

    fn update(&mut self, wire_rep: AttachmentWireRep) {
        self.wire = wire_rep;
    }

    fn emitter(&self) -> &Emitter<RichRepEvent<Self>> {
        &self.emitter
    }
}
