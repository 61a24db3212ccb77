//! Engine tests over the in-memory stores.
//!
//! Drive [`Stash`] directly with scripted prompts to cover the conflict and
//! recovery paths a non-interactive CLI run cannot reach.

use std::rc::Rc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use stash::core::catalog::StateStore;
use stash::core::output::OutputKind;
use stash::core::report::Report;
use stash::core::service::{
    Answer, Io, MemoryBlobs, MemorySecrets, MemoryTree, Registry, Scripted,
};
use stash::core::stash::{GetOptions, PurgeOptions, Selection, Stash, SyncOptions, SyncedFile};
use stash::error::{Error, ServiceError};

struct Engine {
    dir: TempDir,
    blobs: MemoryBlobs,
    tree: MemoryTree,
    secrets: MemorySecrets,
    prompt: Rc<Scripted>,
}

impl Engine {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            blobs: MemoryBlobs::new(),
            tree: MemoryTree::new(),
            secrets: MemorySecrets::new(),
            prompt: Rc::new(Scripted::default()),
        }
    }

    fn write(&self, name: &str, contents: &str) -> String {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn stash(&self) -> Stash {
        Stash::open_or_new(
            self.dir.path().join("stash.yml"),
            Registry::memory(self.blobs.clone(), self.tree.clone(), self.secrets.clone()),
            StateStore::new(self.dir.path().join("state.yml")),
            Io::new(self.prompt.clone()),
        )
        .unwrap()
    }

    fn sync(&self, stash: &mut Stash, file: &str, service: &str) -> Report<SyncedFile> {
        stash
            .sync(SyncOptions {
                files: vec![file.to_string()],
                service: service.to_string(),
                context: Some("app".into()),
                no_clean: true,
                ..SyncOptions::default()
            })
            .unwrap()
    }
}

fn keys(stash: &Stash) -> Vec<String> {
    stash
        .catalog()
        .files
        .values()
        .flat_map(|e| e.keys.clone())
        .collect()
}

#[test]
fn test_parameter_conflict_declined() {
    let e = Engine::new();
    let env = e.write(".env", "A=1\n");
    let mut stash = e.stash();
    assert!(e.sync(&mut stash, &env, "parameter-store").is_ok());

    let name = keys(&stash)[0].clone();
    e.tree.touch(&name, Utc::now() + Duration::hours(1));
    std::fs::write(&env, "A=2\n").unwrap();
    e.prompt.push(Answer::Confirm(false));

    let report = e.sync(&mut stash, &env, "");
    assert!(matches!(
        report.failures[0].1,
        Error::Service(ServiceError::ConflictAborted)
    ));
    assert_eq!(e.tree.value(&name).as_deref(), Some("1"));
}

#[test]
fn test_parameter_conflict_accepted() {
    let e = Engine::new();
    let env = e.write(".env", "A=1\n");
    let mut stash = e.stash();
    e.sync(&mut stash, &env, "parameter-store");

    let name = keys(&stash)[0].clone();
    e.tree.touch(&name, Utc::now() + Duration::hours(1));
    std::fs::write(&env, "A=2\n").unwrap();
    e.prompt.push(Answer::Confirm(true));

    let report = e.sync(&mut stash, &env, "");
    assert!(report.is_ok());
    assert_eq!(e.tree.value(&name).as_deref(), Some("2"));
}

#[test]
fn test_blob_conflict_declined() {
    let e = Engine::new();
    let pem = e.write("certs/server.pem", "v1");
    e.prompt.push(Answer::Text("bucket".into()));
    let mut stash = e.stash();
    e.sync(&mut stash, &pem, "s3");

    let key = keys(&stash)[0].clone();
    e.blobs
        .write_external("bucket", &key, b"external", Utc::now() + Duration::hours(1));
    std::fs::write(&pem, "v2").unwrap();
    e.prompt.push(Answer::Confirm(false));

    let report = e.sync(&mut stash, &pem, "");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(e.blobs.body("bucket", &key).unwrap(), b"external");
}

#[test]
fn test_secret_restored_after_purge() {
    let e = Engine::new();
    let env = e.write(".env", "TOKEN=abc\n");
    let mut stash = e.stash();
    e.sync(&mut stash, &env, "secrets-manager");
    let name = keys(&stash)[0].clone();

    let report = stash.purge(PurgeOptions::default()).unwrap();
    assert!(report.is_ok());
    assert!(e.secrets.is_deleted(&name));

    std::fs::write(&env, "TOKEN=xyz\n").unwrap();
    let report = e.sync(&mut stash, &env, "secrets-manager");
    assert!(report.is_ok(), "{:?}", report.failures);
    assert!(!e.secrets.is_deleted(&name));
    assert!(e.secrets.value(&name).unwrap().contains("xyz"));
}

#[test]
fn test_multiple_mode_splits_groups() {
    let e = Engine::new();
    let env = e.write(".env", "DB_HOST=h\nDB_PORT=1\nAPI_KEY=k\n");
    e.prompt.push(Answer::Choice(1));
    std::env::set_var("STASH_GROUP_DELIMITER", "_");
    let mut stash = e.stash();
    let report = e.sync(&mut stash, &env, "secrets-manager");
    assert!(report.is_ok(), "{:?}", report.failures);

    let mut names = keys(&stash);
    names.sort();
    assert_eq!(names.len(), 2);
    assert!(names[0].ends_with("/API"));
    assert!(names[1].ends_with("/DB"));

    let downloaded = stash
        .get(GetOptions {
            selection: Selection::default(),
            output: OutputKind::Original,
        })
        .unwrap();
    std::env::remove_var("STASH_GROUP_DELIMITER");
    let text = String::from_utf8(downloaded.items[0].data.to_vec()).unwrap();
    assert!(text.contains("DB_HOST=\"h\""));
    assert!(text.contains("DB_PORT=1\n"));
    assert!(text.contains("API_KEY=\"k\""));
}

#[test]
fn test_get_spans_services() {
    let e = Engine::new();
    let a = e.write("a/.env", "A=1\n");
    let b = e.write("b/.env", "B=2\n");
    let mut stash = e.stash();
    e.sync(&mut stash, &a, "parameter-store");
    e.sync(&mut stash, &b, "secrets-manager");

    let report = stash
        .get(GetOptions {
            selection: Selection::default(),
            output: OutputKind::Json,
        })
        .unwrap();
    assert_eq!(report.items.len(), 2);
    let services: Vec<&str> = report.items.iter().map(|d| d.service.as_str()).collect();
    assert_eq!(services, vec!["parameter-store", "secrets-manager"]);
}
