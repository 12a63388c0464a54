use crate::access::{AccessError, AccessGate};
use async_trait::async_trait;
use tracing::info;

/// Admits connections whose referer starts with one of the configured prefixes.
#[derive(Debug, Clone)]
pub struct RefererValidator {
    referers: Vec<String>,
}

impl RefererValidator {
    /// Every prefix is normalized to end with `/`, so `http://host` does not
    /// admit `http://host.evil.example`.
    pub fn new<I, S>(referers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let referers: Vec<String> = referers
            .into_iter()
            .map(|r| {
                let mut r = r.into();
                if !r.ends_with('/') {
                    r.push('/');
                }
                r
            })
            .collect();
        info!("Referers: {:?}", referers);

        Self { referers }
    }

    pub fn referers(&self) -> &[String] {
        &self.referers
    }
}

#[async_trait]
impl AccessGate for RefererValidator {
    async fn validate(&self, origin: Option<&str>) -> Result<(), AccessError> {
        let origin = origin.ok_or(AccessError::MissingOrigin)?;

        if self.referers.iter().any(|r| origin.starts_with(r.as_str())) {
            Ok(())
        } else {
            Err(AccessError::Rejected {
                origin: origin.to_owned(),
            })
        }
    }
}
