use crate::{
    data::student::Student,
    error::{JsonDecodeSnafu, JsonEncodeSnafu, RosterResult, StorageSnafu},
};
use snafu::ResultExt;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

pub const STUDENTS_KEY: &str = "students";

/// A single durable slot holding the JSON roster.
///
/// None of the public methods fail: problems are logged, `load` falls back to an empty roster and
/// `save`/`clear` become no-ops.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STUDENTS_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, students: &[Student]) {
        match self.try_save(students) {
            Ok(()) => info!(count = students.len(), path = ?self.path, "Students saved to local storage"),
            Err(e) => error!(?e, "Error saving to local storage"),
        }
    }

    pub fn load(&self) -> Vec<Student> {
        match self.try_load() {
            Ok(students) => students,
            Err(e) => {
                error!(?e, "Error loading from local storage");
                Vec::new()
            }
        }
    }

    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!(path = ?self.path, "Student data cleared from local storage"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "Nothing to clear");
            }
            Err(e) => error!(?e, path = ?self.path, "Error clearing local storage"),
        }
    }

    fn try_save(&self, students: &[Student]) -> RosterResult<()> {
        let serialised = serde_json::to_vec(students).context(JsonEncodeSnafu)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context(StorageSnafu { path: parent })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serialised).context(StorageSnafu { path: &tmp })?;
        if let Err(source) = fs::rename(&tmp, &self.path) {
            if let Err(e) = fs::remove_file(&tmp) {
                warn!(?e, path = ?tmp, "Unable to remove temporary roster file");
            }
            return Err(source).context(StorageSnafu { path: &self.path });
        }
        Ok(())
    }

    fn try_load(&self) -> RosterResult<Vec<Student>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(source).context(StorageSnafu { path: &self.path });
            }
        };

        serde_json::from_slice(&bytes).context(JsonDecodeSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{course::CourseId, student::StudentId};
    use jiff::Timestamp;

    fn student(id: i64, name: &str) -> Student {
        let at = Timestamp::from_millisecond(id).unwrap();
        Student {
            id: StudentId(id),
            name: name.into(),
            email: format!("{}@x.com", name.to_lowercase()),
            course_id: CourseId(1),
            course: "HTML Basics".into(),
            profile_image: String::new(),
            enrolled_date: "10/19/2026".into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn load_from_absent_slot_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_returns_roster() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested"));
        let roster = vec![student(1_760_000_000_000, "Ana"), student(1_760_000_000_001, "Bo")];

        store.save(&roster);
        assert_eq!(store.load(), roster);

        store.save(&roster[..1]);
        assert_eq!(store.load(), roster[..1]);
    }

    #[test]
    fn corrupt_slot_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        fs::write(store.path(), b"{not json").unwrap();

        assert!(store.load().is_empty());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store.save(&[student(1, "Ana")]);

        store.clear();
        assert!(!store.path().exists());
        store.clear();
        assert!(!store.path().exists());
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_into_unwritable_location_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"").unwrap();

        // the slot's directory is a plain file, so every write fails
        let store = LocalStore::new(&blocker);
        store.save(&[student(1, "Ana")]);
        assert!(store.load().is_empty());
        store.clear();
    }

    #[test]
    fn failed_rename_leaves_no_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        // a directory where the slot should be makes the final rename fail
        fs::create_dir(store.path()).unwrap();

        store.save(&[student(1, "Ana")]);

        assert!(store.path().is_dir());
        assert!(!store.path().with_extension("json.tmp").exists());
    }
}
