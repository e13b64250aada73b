//! Uploaded listing images, kept as plain files in one folder. The stored
//! file name is the media reference saved on the listing row.

use regex::Regex;
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
    sync::OnceLock,
};
use tokio::{fs, io::AsyncWriteExt};

/// Name used when nothing of the proposed name survives sanitizing.
const FALLBACK_NAME: &str = "upload";

#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

/// Reduce an arbitrary client-supplied file name to a token that is safe to
/// join onto the upload folder: ASCII letters, digits, `_`, `.` and `-`,
/// never starting or ending with `.` or `_`. Path separators and runs of
/// whitespace become a single `_`.
pub fn sanitize_filename(name: &str) -> String {
    let ascii: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    let re = DISALLOWED
        .get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex is valid"));
    re.replace_all(&joined, "")
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

/// `house.jpg` -> (`house`, `.jpg`); `README` -> (`README`, ``)
fn split_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}

fn not_found(name: &str) -> io::Error {
    io::Error::new(ErrorKind::NotFound, format!("no such upload: {name}"))
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Only names that [`store`](Self::store) could have produced resolve to
    /// a path; anything else (`..`, separators) is refused.
    fn path_for(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || sanitize_filename(name) != name {
            None
        } else {
            Some(self.root.join(name))
        }
    }

    /// Write `bytes` under a fresh name derived from `proposed_name`. When the
    /// sanitized name is taken, `_1`, `_2`, ... is inserted before the
    /// extension until a free name is found. Each candidate is claimed with
    /// an exclusive create, so concurrent uploads never share a file.
    pub async fn store(
        &self,
        bytes: &[u8],
        proposed_name: &str,
    ) -> io::Result<String> {
        let mut name = sanitize_filename(proposed_name);
        if name.is_empty() {
            name = FALLBACK_NAME.to_string();
        }
        let (base, ext) = split_ext(&name);

        let mut suffix = 0;
        loop {
            let candidate = if suffix == 0 {
                name.clone()
            } else {
                format!("{base}_{suffix}{ext}")
            };
            let path = self.root.join(&candidate);
            let file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            match file {
                Ok(mut file) => {
                    let written = async {
                        file.write_all(bytes).await?;
                        file.flush().await
                    }
                    .await;
                    if let Err(e) = written {
                        let _ = fs::remove_file(&path).await;
                        return Err(e);
                    }
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    suffix += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let path = self.path_for(name).ok_or_else(|| not_found(name))?;
        fs::read(path).await
    }

    pub async fn remove(&self, name: &str) -> io::Result<()> {
        let path = self.path_for(name).ok_or_else(|| not_found(name))?;
        fs::remove_file(path).await
    }
}
