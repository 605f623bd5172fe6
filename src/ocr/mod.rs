use crate::intake::QueuedDocument;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

/// Wrapper around an external OCR executable (tesseract by default). Each
/// image becomes an in-memory text document named `{image_name}-ocr.txt`;
/// a failed recognition is scoped to that one image.
pub struct Recognizer {
    command: String,
    languages: String,
}

impl Recognizer {
    pub fn new(command: impl Into<String>, languages: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            languages: languages.into(),
        }
    }

    pub fn recognize(&self, image: &Path) -> Result<QueuedDocument> {
        let output = Command::new(&self.command)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.languages)
            .output()
            .with_context(|| format!("Failed to run {}", self.command))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "Failed to extract text from {}: {}",
                image.display(),
                stderr.trim()
            );
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        Ok(QueuedDocument::from_text(ocr_document_name(image), text))
    }
}

/// `scan.png` becomes `scan.png-ocr.txt`, keeping the original name visible
/// in analysis results.
pub fn ocr_document_name(image: &Path) -> String {
    let name = image
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image");
    format!("{}-ocr.txt", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ocr_document_name() {
        assert_eq!(ocr_document_name(Path::new("scan.png")), "scan.png-ocr.txt");
        assert_eq!(
            ocr_document_name(Path::new("photos/receipt.jpg")),
            "receipt.jpg-ocr.txt"
        );
    }

    #[test]
    fn test_recognize_reports_missing_binary() {
        let recognizer = Recognizer::new("definitely-not-a-real-ocr-binary", "eng");
        let err = recognizer.recognize(Path::new("scan.png")).unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-real-ocr-binary"));
    }
}
