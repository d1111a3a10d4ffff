//! Payload encoding: [`DocumentPayload`] → base64 [`ImageData`] attachment.
//!
//! Multimodal APIs take attachments as base64 data embedded in the JSON
//! request body together with their MIME type. Gemini reads
//! `application/pdf` attachments natively, so the PDF is sent as-is.

use crate::pipeline::input::DocumentPayload;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use tracing::debug;

/// Encode a document for the model request.
pub fn encode_document(doc: &DocumentPayload) -> ImageData {
    let b64 = STANDARD.encode(&doc.bytes);
    debug!("Encoded {} → {} bytes base64", doc.mime_type, b64.len());

    ImageData::new(b64, doc.mime_type.clone()).with_detail("high")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_keeps_mime_and_round_trips() {
        let doc = DocumentPayload {
            bytes: b"%PDF-1.4 tiny".to_vec(),
            mime_type: "application/pdf".into(),
        };
        let data = encode_document(&doc);
        assert_eq!(data.mime_type, "application/pdf");
        let decoded = STANDARD.decode(&data.data).expect("valid base64");
        assert_eq!(decoded, doc.bytes);
    }
}
