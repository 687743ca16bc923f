use std::path::PathBuf;

/// On-disk home for uploaded media. Stored references all begin with
/// `/uploads/` and resolve back to files inside `dir`.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

pub const UPLOADS_PREFIX: &str = "/uploads";

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Persist an upload and return its `/uploads/...` reference.
    /// Names are `{unix_millis}-{original}` with the original sanitized;
    /// collisions get a numeric infix.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> std::io::Result<String> {
        let name = sanitize_filename(original_name);
        let millis = chrono::Utc::now().timestamp_millis();

        let mut stored = format!("{millis}-{name}");
        let mut attempt = 0u32;
        while tokio::fs::try_exists(self.dir.join(&stored)).await? {
            attempt += 1;
            stored = format!("{millis}-{attempt}-{name}");
        }

        tokio::fs::write(self.dir.join(&stored), data).await?;
        Ok(format!("{UPLOADS_PREFIX}/{stored}"))
    }

    /// Map a requested file name back to its path. Only bare names are
    /// served; separators and dotfiles resolve to nothing.
    pub fn resolve(&self, file: &str) -> Option<PathBuf> {
        if file.is_empty()
            || file.starts_with('.')
            || file.contains('/')
            || file.contains('\\')
        {
            return None;
        }
        Some(self.dir.join(file))
    }
}

fn sanitize_filename(original: &str) -> String {
    let cleaned: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(['_', '.']).is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (UploadStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = UploadStore::new(tmp.path().join("uploads")).unwrap();
        (store, tmp)
    }

    #[tokio::test]
    async fn save_round_trips_bytes() {
        let (store, _tmp) = test_store();
        let reference = store.save("beach.png", b"png bytes").await.unwrap();

        assert!(reference.starts_with("/uploads/"));
        assert!(reference.ends_with("-beach.png"));

        let file = reference.strip_prefix("/uploads/").unwrap();
        let stored = tokio::fs::read(store.resolve(file).unwrap())
            .await
            .unwrap();
        assert_eq!(stored, b"png bytes");
    }

    #[tokio::test]
    async fn save_sanitizes_hostile_names() {
        let (store, _tmp) = test_store();
        let reference = store.save("../../etc/passwd", b"x").await.unwrap();
        assert!(reference.ends_with("-.._.._etc_passwd"));

        let reference = store.save("写真 of trip.png", b"x").await.unwrap();
        assert!(reference.contains("_of_trip.png"));
    }

    #[tokio::test]
    async fn save_twice_yields_distinct_references() {
        let (store, _tmp) = test_store();
        let first = store.save("a.png", b"1").await.unwrap();
        let second = store.save("a.png", b"2").await.unwrap();
        assert_ne!(first, second);

        let first_file = first.strip_prefix("/uploads/").unwrap();
        let second_file = second.strip_prefix("/uploads/").unwrap();
        assert_eq!(
            tokio::fs::read(store.resolve(first_file).unwrap())
                .await
                .unwrap(),
            b"1"
        );
        assert_eq!(
            tokio::fs::read(store.resolve(second_file).unwrap())
                .await
                .unwrap(),
            b"2"
        );
    }

    #[tokio::test]
    async fn empty_name_falls_back() {
        let (store, _tmp) = test_store();
        let reference = store.save("", b"x").await.unwrap();
        assert!(reference.ends_with("-upload"));
    }

    #[test]
    fn resolve_rejects_traversal() {
        let (store, _tmp) = test_store();
        assert!(store.resolve("../secret").is_none());
        assert!(store.resolve("a/b.png").is_none());
        assert!(store.resolve("a\\b.png").is_none());
        assert!(store.resolve(".env").is_none());
        assert!(store.resolve("").is_none());
        assert!(store.resolve("1700000000000-beach.png").is_some());
    }

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_filename("photo-1.final.PNG"), "photo-1.final.PNG");
        assert_eq!(sanitize_filename("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_filename("..."), "upload");
    }
}
