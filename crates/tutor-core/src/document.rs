use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform file-selection record: the only information the store ever sees
/// about an uploaded file. File bytes are not read or stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMeta {
    /// File name as reported by the platform.
    pub name: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// MIME type as reported by the platform; "unknown" when absent.
    pub mime_type: String,
}

impl FileMeta {
    /// Creates a file record, substituting "unknown" for a missing MIME type.
    pub fn new(name: impl Into<String>, size_bytes: u64, mime_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: mime_type.unwrap_or("unknown").to_string(),
        }
    }
}

/// Metadata record for an uploaded document in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier for this document.
    pub id: Uuid,
    /// Original file name.
    pub name: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// MIME type reported at upload time.
    pub mime_type: String,
    /// UTC timestamp of when the document was uploaded.
    pub upload_time: DateTime<Utc>,
}

impl Document {
    /// Creates a document record from a file-selection record.
    pub fn from_file(file: &FileMeta) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: file.name.clone(),
            size_bytes: file.size_bytes,
            mime_type: file.mime_type.clone(),
            upload_time: Utc::now(),
        }
    }

    /// Human-readable size, one decimal place in kilobytes ("12.3 KB").
    pub fn human_size(&self) -> String {
        format!("{:.1} KB", self.size_bytes as f64 / 1024.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_document_from_file() {
        let file = FileMeta::new("notes.pdf", 2048, Some("application/pdf"));
        let doc = Document::from_file(&file);
        assert_eq!(doc.name, "notes.pdf");
        assert_eq!(doc.size_bytes, 2048);
        assert_eq!(doc.mime_type, "application/pdf");
    }

    #[test]
    fn test_missing_mime_type_is_unknown() {
        let file = FileMeta::new("mystery", 10, None);
        assert_eq!(file.mime_type, "unknown");
    }

    #[test]
    fn test_human_size() {
        let file = FileMeta::new("a.txt", 1536, Some("text/plain"));
        let doc = Document::from_file(&file);
        assert_eq!(doc.human_size(), "1.5 KB");
    }
}
