//! Byte-to-text decoding over an ordered list of candidate encodings.
//!
//! Report files arrive in whatever regional encoding the publishing system
//! used. [`Decoder::decode`] tries each candidate strictly and returns the
//! first clean decode. When every candidate rejects the input it decodes
//! with the first candidate again, substituting U+FFFD for malformed
//! sequences, so decoding never fails.

use encoding_rs::Encoding;

use crate::SourceError;

/// Decoded text and the encoding that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The decoded text.
    pub text: String,
    /// The encoding that was used.
    pub encoding: &'static Encoding,
    /// `true` when no candidate decoded cleanly and the text came from the
    /// lossy fallback.
    pub lossy: bool,
}

/// An ordered, non-empty list of candidate encodings.
#[derive(Debug, Clone)]
pub struct Decoder {
    candidates: Vec<&'static Encoding>,
}

impl Decoder {
    /// Resolves WHATWG encoding labels (e.g. `"big5"`, `"utf-8"`) in
    /// priority order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::UnknownEncoding`] for an unrecognized label and
    /// [`SourceError::NoEncodings`] if `labels` is empty.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self, SourceError> {
        let candidates = labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
                    SourceError::UnknownEncoding {
                        label: label.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if candidates.is_empty() {
            return Err(SourceError::NoEncodings);
        }

        Ok(Self { candidates })
    }

    /// The resolved candidates, in priority order.
    #[must_use]
    pub fn candidates(&self) -> &[&'static Encoding] {
        &self.candidates
    }

    /// Decodes `bytes` with the first candidate that accepts them without a
    /// malformed sequence, falling back to a lossy decode with the first
    /// candidate.
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> Decoded {
        for &encoding in &self.candidates {
            if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes)
            {
                return Decoded {
                    text: text.into_owned(),
                    encoding,
                    lossy: false,
                };
            }
        }

        let encoding = self.candidates[0];
        let (text, _) = encoding.decode_without_bom_handling(bytes);

        Decoded {
            text: text.into_owned(),
            encoding,
            lossy: true,
        }
    }
}
