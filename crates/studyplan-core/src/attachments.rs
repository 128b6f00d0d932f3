//! Attached study files.
//!
//! The exam model only knows opaque storage handles. [`Attachments`] is the
//! collaborator that owns the bytes: picking a file copies it into the
//! store, and page counts, opening and deletion all go through the handle.
//! [`LocalAttachments`] keeps the copies under `<data>/pdf-notes/`.

use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::career::model::{Exam, FileKind, StudyFile};
use crate::career::progress;
use crate::error::{AttachmentError, CoreError};

pub const STORE_DIR: &str = "pdf-notes";

/// A file freshly copied into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedFile {
    pub file_name: String,
    pub original_name: String,
}

/// Storage collaborator for attached files.
pub trait Attachments {
    /// Let the user choose a file and copy it into storage. `None` when the
    /// choice was cancelled.
    fn pick_file(&self) -> Result<Option<PickedFile>, AttachmentError>;

    /// Page count of a stored document, 0 when it cannot be read.
    fn page_count(&self, handle: &str) -> u32;

    fn open_file(&self, handle: &str) -> Result<(), AttachmentError>;

    /// Remove a stored file. Fails with [`AttachmentError::Missing`] when
    /// nothing is stored under `handle`.
    fn delete_file(&self, handle: &str) -> Result<(), AttachmentError>;
}

/// Source of the path to import when [`Attachments::pick_file`] runs.
pub trait FilePicker {
    fn choose(&self) -> Option<PathBuf>;
}

/// Picker that always returns the path it was built with.
#[derive(Debug, Clone, Default)]
pub struct FixedPicker(pub Option<PathBuf>);

impl FilePicker for FixedPicker {
    fn choose(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Attachment store rooted in a local directory.
#[derive(Debug, Clone)]
pub struct LocalAttachments<P = FixedPicker> {
    dir: PathBuf,
    picker: P,
}

impl LocalAttachments<FixedPicker> {
    /// Store under `<data_dir>/pdf-notes` with nothing to pick.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(STORE_DIR), FixedPicker::default())
    }
}

impl<P: FilePicker> LocalAttachments<P> {
    pub fn new(dir: PathBuf, picker: P) -> Self {
        Self { dir, picker }
    }

    pub fn with_picker<Q: FilePicker>(self, picker: Q) -> LocalAttachments<Q> {
        LocalAttachments {
            dir: self.dir,
            picker,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `source` into the store as `<millis>_<name>`.
    pub fn import(&self, source: &Path) -> Result<PickedFile, AttachmentError> {
        let original_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AttachmentError::NoFileName(source.to_path_buf()))?
            .to_string();
        let import_err = |e: std::io::Error| AttachmentError::ImportFailed {
            path: source.to_path_buf(),
            source: e,
        };
        std::fs::create_dir_all(&self.dir).map_err(import_err)?;
        let mut millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        // Two imports of the same name within one millisecond.
        while self.dir.join(format!("{millis}_{original_name}")).exists() {
            millis += 1;
        }
        let file_name = format!("{millis}_{original_name}");
        std::fs::copy(source, self.dir.join(&file_name)).map_err(import_err)?;
        tracing::info!(handle = %file_name, "file imported");
        Ok(PickedFile {
            file_name,
            original_name,
        })
    }

    /// Path of `handle` inside the store. Handles are plain file names; any
    /// separator, `..` or root component is refused.
    pub fn resolve(&self, handle: &str) -> Result<PathBuf, AttachmentError> {
        let mut components = Path::new(handle).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(self.dir.join(name)),
            _ => Err(AttachmentError::OutsideStore(handle.to_string())),
        }
    }
}

impl<P: FilePicker> Attachments for LocalAttachments<P> {
    fn pick_file(&self) -> Result<Option<PickedFile>, AttachmentError> {
        match self.picker.choose() {
            Some(source) => self.import(&source).map(Some),
            None => Ok(None),
        }
    }

    fn page_count(&self, handle: &str) -> u32 {
        let Ok(path) = self.resolve(handle) else {
            return 0;
        };
        match std::fs::read(&path) {
            Ok(bytes) => count_pdf_pages(&bytes),
            Err(e) => {
                tracing::debug!(%handle, error = %e, "page count unavailable");
                0
            }
        }
    }

    fn open_file(&self, handle: &str) -> Result<(), AttachmentError> {
        let path = self.resolve(handle)?;
        if !path.exists() {
            return Err(AttachmentError::Missing(handle.to_string()));
        }
        open::that(&path).map_err(|source| AttachmentError::OpenFailed {
            handle: handle.to_string(),
            source,
        })
    }

    fn delete_file(&self, handle: &str) -> Result<(), AttachmentError> {
        let path = self.resolve(handle)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(%handle, "file deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AttachmentError::Missing(handle.to_string()))
            }
            Err(source) => Err(AttachmentError::DeleteFailed {
                handle: handle.to_string(),
                source,
            }),
        }
    }
}

/// Number of pages in a PDF document, 0 when it cannot be parsed.
///
/// Pages packed into compressed object streams are counted too.
pub fn count_pdf_pages(bytes: &[u8]) -> u32 {
    match lopdf::Document::load_mem(bytes) {
        Ok(doc) => u32::try_from(doc.get_pages().len()).unwrap_or(u32::MAX),
        Err(e) => {
            tracing::debug!(error = %e, "not a readable PDF");
            0
        }
    }
}

/// Delete a stored file, treating an already missing file as deleted.
fn delete_if_present<A: Attachments + ?Sized>(attachments: &A, handle: &str) -> Result<(), AttachmentError> {
    match attachments.delete_file(handle) {
        Ok(()) | Err(AttachmentError::Missing(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Best-effort cleanup for files whose owner is going away.
pub fn discard_files<A: Attachments + ?Sized>(attachments: &A, files: &[StudyFile]) {
    for file in files {
        if let Err(e) = delete_if_present(attachments, &file.file_name) {
            tracing::warn!(handle = %file.file_name, error = %e, "could not delete attached file");
        }
    }
}

/// Pick a file, count its pages, and ask for its tracking type.
///
/// Cancelling the pick leaves the exam alone. Cancelling the type choice
/// deletes the just-copied file again. Returns the new file's index.
pub fn attach_file<A, F>(
    exam: &mut Exam,
    attachments: &A,
    choose_kind: F,
) -> Result<Option<usize>, AttachmentError>
where
    A: Attachments + ?Sized,
    F: FnOnce(&PickedFile, u32) -> Option<FileKind>,
{
    let Some(picked) = attachments.pick_file()? else {
        return Ok(None);
    };
    let pages = attachments.page_count(&picked.file_name);
    let Some(kind) = choose_kind(&picked, pages) else {
        if let Err(e) = delete_if_present(attachments, &picked.file_name) {
            tracing::warn!(handle = %picked.file_name, error = %e, "rollback of cancelled attachment failed");
        } else {
            tracing::info!(handle = %picked.file_name, "cancelled attachment rolled back");
        }
        return Ok(None);
    };
    exam.pdfs.push(StudyFile::new(
        picked.file_name,
        picked.original_name,
        kind,
        pages,
    ));
    progress::refresh(exam);
    Ok(Some(exam.pdfs.len() - 1))
}

/// Delete the stored copy, then drop the file from the exam. A failed delete
/// leaves the exam unchanged.
pub fn remove_file<A: Attachments + ?Sized>(
    exam: &mut Exam,
    index: usize,
    attachments: &A,
) -> Result<StudyFile, CoreError> {
    let handle = exam.file(index)?.file_name.clone();
    delete_if_present(attachments, &handle)?;
    let removed = exam.pdfs.remove(index);
    progress::refresh(exam);
    Ok(removed)
}

pub fn open_file<A: Attachments + ?Sized>(
    exam: &Exam,
    index: usize,
    attachments: &A,
) -> Result<(), CoreError> {
    let file = exam.file(index)?;
    attachments.open_file(&file.file_name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    mod test_pdf {
        use lopdf::{dictionary, Document, Object};
        use std::io::Write;

        /// Minimal document with `pages` empty pages and a classic xref table.
        pub fn plain(pages: usize) -> Vec<u8> {
            let mut doc = Document::with_version("1.4");
            let pages_id = doc.new_object_id();
            let kids: Vec<Object> = (0..pages)
                .map(|_| {
                    doc.add_object(dictionary! {
                        "Type" => "Page",
                        "Parent" => pages_id,
                        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                    })
                    .into()
                })
                .collect();
            doc.objects.insert(
                pages_id,
                Object::Dictionary(dictionary! {
                    "Type" => "Pages",
                    "Kids" => kids,
                    "Count" => pages as i64,
                }),
            );
            let catalog_id = doc.add_object(dictionary! {
                "Type" => "Catalog",
                "Pages" => pages_id,
            });
            doc.trailer.set("Root", catalog_id);
            let mut out = Vec::new();
            doc.save_to(&mut out).unwrap();
            out
        }

        /// PDF 1.5 layout: page objects packed into a Flate-compressed object
        /// stream, located through a cross-reference stream.
        pub fn object_stream(pages: usize) -> Vec<u8> {
            let first_page = 3;
            let objstm = first_page + pages;
            let xref = objstm + 1;

            let mut index = String::new();
            let mut bodies = String::new();
            for i in 0..pages {
                index.push_str(&format!("{} {} ", first_page + i, bodies.len()));
                bodies.push_str("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] >>\n");
            }
            let first = index.len() + 1;
            let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(format!("{index}\n{bodies}").as_bytes()).unwrap();
            let packed = encoder.finish().unwrap();

            let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", first_page + i)).collect();
            let mut out = b"%PDF-1.5\n".to_vec();
            let catalog_at = out.len();
            out.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
            let tree_at = out.len();
            out.extend_from_slice(
                format!(
                    "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {pages} >>\nendobj\n",
                    kids.join(" ")
                )
                .as_bytes(),
            );
            let objstm_at = out.len();
            out.extend_from_slice(
                format!(
                    "{objstm} 0 obj\n<< /Type /ObjStm /N {pages} /First {first} /Filter /FlateDecode /Length {} >>\nstream\n",
                    packed.len()
                )
                .as_bytes(),
            );
            out.extend_from_slice(&packed);
            out.extend_from_slice(b"\nendstream\nendobj\n");
            let xref_at = out.len();

            // Rows of /W [1 4 2]: kind, offset or stream number, generation or index.
            let mut rows = Vec::new();
            let mut row = |kind: u8, field: usize, extra: u16| {
                rows.push(kind);
                rows.extend_from_slice(&(field as u32).to_be_bytes());
                rows.extend_from_slice(&extra.to_be_bytes());
            };
            row(0, 0, 65535);
            row(1, catalog_at, 0);
            row(1, tree_at, 0);
            for i in 0..pages {
                row(2, objstm, i as u16);
            }
            row(1, objstm_at, 0);
            row(1, xref_at, 0);

            out.extend_from_slice(
                format!(
                    "{xref} 0 obj\n<< /Type /XRef /Size {} /W [1 4 2] /Root 1 0 R /Length {} >>\nstream\n",
                    xref + 1,
                    rows.len()
                )
                .as_bytes(),
            );
            out.extend_from_slice(&rows);
            out.extend_from_slice(b"\nendstream\nendobj\n");
            out.extend_from_slice(format!("startxref\n{xref_at}\n%%EOF\n").as_bytes());
            out
        }
    }

    #[derive(Default)]
    struct FakeStore {
        next: Option<PickedFile>,
        pages: u32,
        deleted: RefCell<Vec<String>>,
        fail_delete: bool,
    }

    impl Attachments for FakeStore {
        fn pick_file(&self) -> Result<Option<PickedFile>, AttachmentError> {
            Ok(self.next.clone())
        }

        fn page_count(&self, _handle: &str) -> u32 {
            self.pages
        }

        fn open_file(&self, _handle: &str) -> Result<(), AttachmentError> {
            Ok(())
        }

        fn delete_file(&self, handle: &str) -> Result<(), AttachmentError> {
            if self.fail_delete {
                return Err(AttachmentError::DeleteFailed {
                    handle: handle.into(),
                    source: std::io::Error::other("locked"),
                });
            }
            self.deleted.borrow_mut().push(handle.into());
            Ok(())
        }
    }

    fn picked() -> PickedFile {
        PickedFile {
            file_name: "17_analisi.pdf".into(),
            original_name: "analisi.pdf".into(),
        }
    }

    fn empty_exam() -> Exam {
        serde_json::from_str(r#"{"id":"x"}"#).unwrap()
    }

    #[test]
    fn attach_records_page_count() {
        let store = FakeStore {
            next: Some(picked()),
            pages: 42,
            ..FakeStore::default()
        };
        let mut exam = empty_exam();
        let idx = attach_file(&mut exam, &store, |p, pages| {
            assert_eq!(p.original_name, "analisi.pdf");
            assert_eq!(pages, 42);
            Some(FileKind::Appunti)
        })
        .unwrap();
        assert_eq!(idx, Some(0));
        assert_eq!(exam.pdfs[0].pages.total, 42);
        assert_eq!(exam.pages.total, 42);
    }

    #[test]
    fn cancelled_type_choice_rolls_back_copy() {
        let store = FakeStore {
            next: Some(picked()),
            ..FakeStore::default()
        };
        let mut exam = empty_exam();
        assert_eq!(attach_file(&mut exam, &store, |_, _| None).unwrap(), None);
        assert!(exam.pdfs.is_empty());
        assert_eq!(*store.deleted.borrow(), vec!["17_analisi.pdf".to_string()]);
    }

    #[test]
    fn cancelled_pick_is_noop() {
        let store = FakeStore::default();
        let mut exam = empty_exam();
        let called = attach_file(&mut exam, &store, |_, _| panic!("no file to classify"));
        assert_eq!(called.unwrap(), None);
        assert!(store.deleted.borrow().is_empty());
    }

    #[test]
    fn failed_delete_keeps_file_in_exam() {
        let store = FakeStore {
            next: Some(picked()),
            ..FakeStore::default()
        };
        let mut exam = empty_exam();
        attach_file(&mut exam, &store, |_, _| Some(FileKind::Esercizi)).unwrap();
        let locked = FakeStore {
            fail_delete: true,
            ..FakeStore::default()
        };
        assert!(remove_file(&mut exam, 0, &locked).is_err());
        assert_eq!(exam.pdfs.len(), 1);

        let removed = remove_file(&mut exam, 0, &store).unwrap();
        assert_eq!(removed.kind, FileKind::Esercizi);
        assert!(exam.pdfs.is_empty());
        assert!(remove_file(&mut exam, 0, &store).is_err());
    }

    #[test]
    fn page_count_comes_from_the_page_tree() {
        assert_eq!(count_pdf_pages(&test_pdf::plain(3)), 3);
        assert_eq!(count_pdf_pages(&test_pdf::plain(1)), 1);
        assert_eq!(count_pdf_pages(b"not a pdf"), 0);
        assert_eq!(count_pdf_pages(b""), 0);
    }

    #[test]
    fn page_count_reads_compressed_object_streams() {
        let pdf = test_pdf::object_stream(2);
        // No page dictionary is visible outside the compressed stream.
        assert!(!pdf.windows(11).any(|w| w == b"/Type /Page"));
        assert_eq!(count_pdf_pages(&pdf), 2);
    }

    #[test]
    fn handles_cannot_escape_store() {
        let store = LocalAttachments::in_data_dir(Path::new("/data"));
        assert_eq!(
            store.resolve("12_a.pdf").unwrap(),
            PathBuf::from("/data/pdf-notes/12_a.pdf")
        );
        for bad in ["../secret", "/etc/passwd", "a/b.pdf", "..", ""] {
            assert!(
                matches!(store.resolve(bad), Err(AttachmentError::OutsideStore(_))),
                "{bad} accepted"
            );
        }
    }
}
