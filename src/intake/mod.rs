pub mod notice;

pub use notice::Notice;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "doc", "docx"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Check a candidate document against the allowed extensions. The permissive
/// variant additionally accepts PDF.
pub fn is_valid_file(path: &Path, allow_pdf: bool) -> bool {
    let ext = extension_of(path);
    ALLOWED_EXTENSIONS.contains(&ext.as_str()) || (allow_pdf && ext == "pdf")
}

pub fn is_image_file(path: &Path) -> bool {
    IMAGE_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// One document waiting for upload: either a file on disk or text produced
/// in-memory (OCR output).
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Path(PathBuf),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct QueuedDocument {
    pub name: String,
    pub source: DocumentSource,
}

impl QueuedDocument {
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        Self {
            name,
            source: DocumentSource::Path(path.to_path_buf()),
        }
    }

    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: DocumentSource::Text(text.into()),
        }
    }

    pub fn read_bytes(&self) -> io::Result<Vec<u8>> {
        match &self.source {
            DocumentSource::Path(path) => fs::read(path),
            DocumentSource::Text(text) => Ok(text.as_bytes().to_vec()),
        }
    }

    /// Text content when it is already available locally: in-memory documents
    /// always, files only when they are plain text.
    pub fn local_text(&self) -> Option<String> {
        match &self.source {
            DocumentSource::Text(text) => Some(text.clone()),
            DocumentSource::Path(path) if extension_of(path) == "txt" => {
                fs::read_to_string(path).ok()
            }
            DocumentSource::Path(_) => None,
        }
    }
}

/// Upload queue, deduplicated by document name (first occurrence wins).
#[derive(Debug, Default)]
pub struct FileQueue {
    documents: Vec<QueuedDocument>,
}

impl FileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when a document with the same name is already queued.
    pub fn add(&mut self, document: QueuedDocument) -> bool {
        if self.documents.iter().any(|d| d.name == document.name) {
            return false;
        }
        self.documents.push(document);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<QueuedDocument> {
        if index < self.documents.len() {
            Some(self.documents.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn get(&self, name: &str) -> Option<&QueuedDocument> {
        self.documents.iter().find(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedDocument> {
        self.documents.iter()
    }
}

/// Result of walking the command-line inputs: documents queued for upload,
/// images waiting for OCR, and a transient notice per rejected file.
#[derive(Debug, Default)]
pub struct Intake {
    pub queue: FileQueue,
    pub images: Vec<PathBuf>,
    pub notices: Vec<Notice>,
}

/// Validate the given paths, expanding directories recursively. Explicitly
/// named files that fail validation produce a notice; unsupported files found
/// inside directories are skipped quietly.
pub fn collect(paths: &[PathBuf], allow_pdf: bool) -> Intake {
    let mut intake = Intake::default();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                accept(&mut intake, entry.path(), allow_pdf, false);
            }
        } else {
            accept(&mut intake, path, allow_pdf, true);
        }
    }

    intake
}

fn accept(intake: &mut Intake, path: &Path, allow_pdf: bool, noisy: bool) {
    if is_image_file(path) {
        intake.images.push(path.to_path_buf());
    } else if is_valid_file(path, allow_pdf) {
        intake.queue.add(QueuedDocument::from_path(path));
    } else if noisy {
        let allowed = if allow_pdf {
            ".txt, .doc, .docx, .pdf"
        } else {
            ".txt, .doc, .docx"
        };
        intake.notices.push(Notice::new(format!(
            "Skipping {}: unsupported file type. Allowed: {}",
            path.display(),
            allowed
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extension_validation() {
        assert!(is_valid_file(Path::new("notes.txt"), false));
        assert!(is_valid_file(Path::new("draft.docx"), false));
        assert!(is_valid_file(Path::new("memo.doc"), false));
        assert!(!is_valid_file(Path::new("report.exe"), false));
        assert!(!is_valid_file(Path::new("paper.pdf"), false));
        assert!(is_valid_file(Path::new("paper.pdf"), true));
    }

    #[test]
    fn test_extension_validation_is_case_insensitive() {
        assert!(is_valid_file(Path::new("NOTES.TXT"), false));
        assert!(is_valid_file(Path::new("Draft.DocX"), false));
    }

    #[test]
    fn test_image_detection() {
        assert!(is_image_file(Path::new("scan.jpg")));
        assert!(is_image_file(Path::new("scan.JPEG")));
        assert!(is_image_file(Path::new("page.png")));
        assert!(!is_image_file(Path::new("notes.txt")));
    }

    #[test]
    fn test_queue_deduplicates_by_name() {
        let mut queue = FileQueue::new();
        assert!(queue.add(QueuedDocument::from_text("a.txt", "one")));
        assert!(!queue.add(QueuedDocument::from_text("a.txt", "two")));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.get("a.txt").unwrap().local_text().unwrap(), "one");
    }

    #[test]
    fn test_queue_remove_and_clear() {
        let mut queue = FileQueue::new();
        queue.add(QueuedDocument::from_text("a.txt", ""));
        queue.add(QueuedDocument::from_text("b.txt", ""));

        assert!(queue.remove(5).is_none());
        assert_eq!(queue.remove(0).unwrap().name, "a.txt");
        assert_eq!(queue.len(), 1);

        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_collect_rejects_with_notice_and_keeps_valid_subset() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("notes.txt");
        let bad = dir.path().join("report.exe");
        fs::write(&good, "hello").unwrap();
        fs::write(&bad, "binary").unwrap();

        let intake = collect(&[good, bad], false);

        assert_eq!(intake.queue.len(), 1);
        assert_eq!(intake.queue.iter().next().unwrap().name, "notes.txt");
        assert_eq!(intake.notices.len(), 1);
        assert!(intake.notices[0].message().contains("report.exe"));
    }

    #[test]
    fn test_collect_expands_directories_quietly() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.docx"), "b").unwrap();
        fs::write(dir.path().join("junk.exe"), "x").unwrap();

        let intake = collect(&[dir.path().to_path_buf()], false);

        assert_eq!(intake.queue.len(), 2);
        // Unsupported files inside a directory are not worth a warning each
        assert!(intake.notices.is_empty());
    }

    #[test]
    fn test_collect_routes_images_to_ocr() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("scan.png");
        fs::write(&image, [0u8; 4]).unwrap();

        let intake = collect(&[image.clone()], false);

        assert!(intake.queue.is_empty());
        assert_eq!(intake.images, vec![image]);
    }
}
