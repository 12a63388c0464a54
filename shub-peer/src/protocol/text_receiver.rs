use crate::store::{Record, StoreError};
use shub_core::PeerId;

pub const BODY: &str = "body";
pub const SRC: &str = "src";

/// Latest text message received from any peer.
pub struct TextReceiver {
    record: Record<Option<String>>,
}

impl Default for TextReceiver {
    fn default() -> Self {
        Self {
            record: Record::new([(BODY, None), (SRC, None)]),
        }
    }
}

impl TextReceiver {
    pub fn body(&self) -> Option<&str> {
        self.field(BODY)
    }

    pub fn src(&self) -> Option<&str> {
        self.field(SRC)
    }

    /// The sender is recorded before the body so a body listener sees both.
    pub fn receive(&mut self, src: &PeerId, body: String) -> Result<(), StoreError> {
        self.record.set(SRC, Some(src.to_string()))?;
        self.record.set(BODY, Some(body))
    }

    pub fn on_message<F>(&mut self, mut listener: F) -> Result<(), StoreError>
    where
        F: FnMut(&str, &str) + 'static,
    {
        self.record.on_set(BODY, move |record, _, body| {
            let src = match record.get(SRC) {
                Ok(Some(src)) => src.as_str(),
                _ => "",
            };
            if let Some(body) = body {
                listener(src, body.as_str());
            }
        })
    }

    pub fn record_mut(&mut self) -> &mut Record<Option<String>> {
        &mut self.record
    }

    fn field(&self, field: &str) -> Option<&str> {
        self.record.get(field).ok().and_then(|v| v.as_deref())
    }
}
