use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use sha2::{Digest, Sha256};

use crate::backend::{FindError, InsertError};
use crate::user::User;

mod kv;
use kv::KeyValues;

type Result<T> = std::result::Result<T, ()>;

macro_rules! path {
    ($root: expr, $($components: expr),*) => {
        {
            let mut p = $root.clone();
            path!(@internal, p, $($components),*);
            p
        }
    };
    (@internal, $p:expr, $next:expr, $($rest: expr),*) => {
        $p.push($next);
        path!(@internal, $p, $($rest),*);
    };
    (@internal, $p:expr, $next:expr) => {
        $p.push($next);
    };
}

pub struct Backend {
    root: PathBuf,
}

impl Backend {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).map_err(|e| {
            error!("couldn't create data directory {data_dir:?}: {e:?}");
        })?;
        info!("Using {}", data_dir.display());

        Ok(Self {
            root: data_dir.to_path_buf(),
        })
    }

    pub async fn init(&self) -> Result<()> {
        let users = path!(self.root, "users");
        fs::create_dir_all(&users).map_err(|e| {
            error!("couldn't create {users:?}: {e:?}");
        })
    }
}

impl Backend {
    fn read(&self, path: &Path) -> std::result::Result<KeyValues, FindError> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                return FindError::NotFound;
            }
            error!("open \"{path:?}\": {e:?}");
            FindError::Internal
        })?;

        kv::read(file)
    }

    // written beside the target then renamed over it, so readers never see a partial file
    fn write(&self, path: &Path, keyvalues: &KeyValues) -> std::result::Result<(), std::io::Error> {
        let tmp = path.with_extension("tmp");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)?;

        kv::write(file, keyvalues)?;
        fs::rename(&tmp, path)
    }

    // fixed-length name whatever the username; the username itself lives in creds.txt
    fn creds_path(&self, username: &str) -> PathBuf {
        let digest = Sha256::digest(username.as_bytes());
        path!(self.root, "users", hex::encode(digest), "creds.txt")
    }

    fn storage_path(&self) -> PathBuf {
        path!(self.root, "storage.txt")
    }
}

impl Backend {
    pub async fn find_user(&self, username: &str) -> std::result::Result<User, FindError> {
        let creds = self.read(&self.creds_path(username))?;

        let field = |key: &str| -> std::result::Result<String, FindError> {
            let value = creds.get(key).ok_or_else(|| {
                error!("no {key} stored for \"{username}\"");
                FindError::Internal
            })?;
            decode(value).ok_or_else(|| {
                error!("undecodable {key} stored for \"{username}\"");
                FindError::Internal
            })
        };

        let stored_username = field("username")?;
        if stored_username != username {
            error!("digest collision: \"{username}\" vs stored \"{stored_username}\"");
            return Err(FindError::NotFound);
        }

        Ok(User {
            username: stored_username,
            password: field("password")?,
        })
    }

    pub async fn insert_user(&self, user: &User) -> std::result::Result<(), InsertError> {
        let username = &user.username;
        let path = self.creds_path(username);

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                error!("couldn't create \"{username}\"'s directory: {e:?}");
                InsertError::Internal
            })?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    return InsertError::Exists;
                }
                error!("create \"{path:?}\": {e:?}");
                InsertError::Internal
            })?;

        let mut creds = KeyValues::new();
        creds.insert("username".into(), hex::encode(username));
        creds.insert("password".into(), hex::encode(&user.password));

        kv::write(file, &creds).map_err(|e| {
            error!("write \"{username}\" creds: {e:?}");
            // don't leave a half-written account behind to block re-registration
            discard_account(&path);
            InsertError::Internal
        })
    }
}

fn decode(value: &str) -> Option<String> {
    let bytes = hex::decode(value).ok()?;
    String::from_utf8(bytes).ok()
}

fn discard_account(creds: &Path) {
    if let Err(e) = fs::remove_file(creds) {
        error!("couldn't remove \"{creds:?}\": {e:?}");
    }
    if let Some(dir) = creds.parent() {
        if let Err(e) = fs::remove_dir(dir) {
            error!("couldn't remove \"{dir:?}\": {e:?}");
        }
    }
}

impl Backend {
    fn storage(&self) -> Result<KeyValues> {
        match self.read(&self.storage_path()) {
            Ok(kv) => Ok(kv),
            Err(FindError::NotFound) => Ok(KeyValues::new()),
            Err(FindError::Internal) => Err(()),
        }
    }

    fn write_storage(&self, storage: &KeyValues) -> Result<()> {
        self.write(&self.storage_path(), storage).map_err(|e| {
            error!("write storage: {e:?}");
        })
    }

    pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.storage()?.remove(key))
    }

    pub async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut storage = self.storage()?;
        storage.insert(key.into(), value.into());
        debug!("set item {key}");
        self.write_storage(&storage)
    }

    pub async fn remove_item(&self, key: &str) -> Result<()> {
        let mut storage = self.storage()?;
        if storage.remove(key).is_none() {
            return Ok(());
        }
        debug!("removed item {key}");
        self.write_storage(&storage)
    }
}
