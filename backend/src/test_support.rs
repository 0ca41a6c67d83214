//! Helpers shared by unit tests and the integration tests under `tests/`.

pub mod cap_fs {
    //! Filesystem access for tests, routed through `cap_std` like the media
    //! store itself.

    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    fn split(path: &Path) -> io::Result<(Dir, &Path)> {
        let name = path.file_name().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
        })?;
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
        Ok((dir, Path::new(name)))
    }

    /// Seed a file, e.g. an image the store did not write itself.
    ///
    /// ```rust
    /// use ecoswap::test_support::cap_fs::{path_exists, write_file};
    ///
    /// let path = std::env::temp_dir().join("ecoswap-seeded.png");
    /// write_file(&path, b"\x89PNG")?;
    /// assert!(path_exists(&path));
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let (dir, name) = split(path)?;
        dir.write(name, contents)
    }

    pub fn path_exists(path: &Path) -> bool {
        split(path).is_ok_and(|(dir, name)| dir.exists(name))
    }
}

pub mod clock {
    //! Clock that only moves when a test says so.

    use std::sync::Mutex;

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    #[derive(Debug)]
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// Move time forward, e.g. past a token's expiry.
        pub fn advance_seconds(&self, seconds: i64) {
            if let Ok(mut now) = self.0.lock() {
                *now += TimeDelta::seconds(seconds);
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            match self.0.lock() {
                Ok(now) => *now,
                Err(poisoned) => *poisoned.into_inner(),
            }
        }
    }
}

pub use clock::MutableClock;

pub mod openapi {
    //! Lookups into a generated OpenAPI document.

    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::{Object, Schema};

    /// The schema as an inline object; panics naming `name` otherwise.
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(object)) => object,
            RefOr::Ref(reference) => panic!(
                "schema '{name}' is a reference to '{}'",
                reference.ref_location
            ),
            RefOr::T(_) => panic!("schema '{name}' is not an object"),
        }
    }

    /// A named property of an object schema; panics when absent.
    pub fn get_property<'a>(object: &'a Object, field: &str) -> &'a RefOr<Schema> {
        object
            .properties
            .get(field)
            .unwrap_or_else(|| panic!("property '{field}' not found"))
    }
}
