//! External collaborator seams
//!
//! Statement extraction and receipt OCR run outside the core (AI services,
//! OCR engines). The core only consumes their output, so each is a trait
//! with file-backed and mock implementations.
//!
//! - `StatementExtractor`: image payload -> `{transactions?, advice?}`
//! - `ReceiptOcr`: image -> `{text, confidence}`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::StatementImport;

/// Raw OCR output; only `text` feeds the receipt extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub text: String,
    /// Engine confidence, 0..=100
    pub confidence: f64,
}

/// Turns a statement payload into candidate transaction records
#[async_trait]
pub trait StatementExtractor: Send + Sync {
    async fn extract_statement(&self, payload: &[u8]) -> Result<StatementImport>;

    fn name(&self) -> &'static str;
}

/// Reads text off a receipt image
#[async_trait]
pub trait ReceiptOcr: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<OcrResult>;

    fn name(&self) -> &'static str;
}

/// Statement payloads that are already the extractor's JSON output
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStatementExtractor;

#[async_trait]
impl StatementExtractor for JsonStatementExtractor {
    async fn extract_statement(&self, payload: &[u8]) -> Result<StatementImport> {
        Ok(serde_json::from_slice(payload)?)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

/// Receipt "images" that are already UTF-8 OCR text
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextOcr;

#[async_trait]
impl ReceiptOcr for PlainTextOcr {
    async fn recognize(&self, image: &[u8]) -> Result<OcrResult> {
        let text = std::str::from_utf8(image)
            .map_err(|e| Error::InvalidData(format!("Receipt text is not UTF-8: {}", e)))?;
        Ok(OcrResult {
            text: text.to_string(),
            confidence: 100.0,
        })
    }

    fn name(&self) -> &'static str {
        "plain-text"
    }
}

/// Mock statement extractor for testing
///
/// Returns a canned import, or fails when unhealthy.
#[derive(Debug, Clone, Default)]
pub struct MockStatementExtractor {
    pub response: StatementImport,
    pub healthy: bool,
}

impl MockStatementExtractor {
    pub fn new(response: StatementImport) -> Self {
        Self {
            response,
            healthy: true,
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            response: StatementImport::default(),
            healthy: false,
        }
    }
}

#[async_trait]
impl StatementExtractor for MockStatementExtractor {
    async fn extract_statement(&self, _payload: &[u8]) -> Result<StatementImport> {
        if !self.healthy {
            return Err(Error::Collaborator("mock extractor unavailable".to_string()));
        }
        Ok(self.response.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Mock OCR engine returning fixed text
#[derive(Debug, Clone)]
pub struct MockReceiptOcr {
    pub text: String,
    pub confidence: f64,
}

impl MockReceiptOcr {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            confidence: 92.5,
        }
    }
}

#[async_trait]
impl ReceiptOcr for MockReceiptOcr {
    async fn recognize(&self, _image: &[u8]) -> Result<OcrResult> {
        Ok(OcrResult {
            text: self.text.clone(),
            confidence: self.confidence,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_json_extractor_tolerates_missing_transactions() {
        let import = JsonStatementExtractor
            .extract_statement(br#"{"advice": "Cook at home"}"#)
            .await
            .unwrap();
        assert!(import.transactions.is_none());
        assert_eq!(import.advice.as_deref(), Some("Cook at home"));
    }

    #[tokio::test]
    async fn test_json_extractor_rejects_garbage() {
        let result = JsonStatementExtractor.extract_statement(b"not json").await;
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_plain_text_ocr() {
        let result = PlainTextOcr.recognize(b"SHOP\nTotal 1.00").await.unwrap();
        assert_eq!(result.text, "SHOP\nTotal 1.00");

        assert!(PlainTextOcr.recognize(&[0xff, 0xfe]).await.is_err());
    }

    #[tokio::test]
    async fn test_mocks() {
        let err = MockStatementExtractor::unhealthy().extract_statement(b"").await;
        assert!(matches!(err, Err(Error::Collaborator(_))));

        let ocr = MockReceiptOcr::new("CAFE\nTotal 3.00");
        assert_eq!(ocr.recognize(b"").await.unwrap().confidence, 92.5);
    }
}
