use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Resolves request paths to HTML fragments under a templates directory:
/// `/a/b` is served from `a/b.html`, falling back to `a/b/index.html`.
#[derive(Debug, Clone)]
pub struct TemplateFinder {
    root: PathBuf,
}

impl TemplateFinder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Body of the page for `path`, or `None` when there is no such page or
    /// the path tries to leave the templates directory.
    pub async fn find(&self, path: &str) -> io::Result<Option<String>> {
        let Some(relative) = sanitise(path) else {
            debug!(%path, "rejected template path");
            return Ok(None);
        };

        let candidates = if relative.as_os_str().is_empty() {
            vec![self.root.join("index.html")]
        } else {
            let mut page = self.root.join(&relative).into_os_string();
            page.push(".html");
            vec![PathBuf::from(page), self.root.join(&relative).join("index.html")]
        };

        for candidate in candidates {
            match tokio::fs::metadata(&candidate).await {
                Ok(meta) if meta.is_file() => {
                    return tokio::fs::read_to_string(&candidate).await.map(Some);
                }
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }
}

fn sanitise(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        let allowed = !segment.starts_with('.')
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !allowed {
            return None;
        }
        relative.push(segment);
    }
    Some(relative)
}
