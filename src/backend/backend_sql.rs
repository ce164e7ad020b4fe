use std::path::{Path, PathBuf};

use sqlx::{migrate::MigrateDatabase, query, query_as, query_scalar, Pool, Sqlite, SqlitePool};

use log::{debug, error, info};

use crate::backend::{FindError, InsertError};
use crate::user::User;

type Result<T> = std::result::Result<T, ()>;

pub struct Backend(pub Pool<Sqlite>);

fn into_sql(path: &Path) -> PathBuf {
    path.join("signon.sql")
}

impl Backend {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| {
            error!("couldn't create data directory {data_dir:?}: {e:?}");
        })?;

        let db_pathbuf = into_sql(data_dir);
        let db_path = db_pathbuf.to_str().ok_or_else(|| {
            error!("non utf-8 data path: {db_pathbuf:?}");
        })?;
        let url = format!("sqlite://{db_path}");

        let exists = Sqlite::database_exists(&url).await.map_err(|e| {
            error!("couldn't check for database {url}: {e:?}");
        })?;
        if !exists {
            Sqlite::create_database(&url).await.map_err(|e| {
                error!("error creating database {url}: {e:?}");
            })?;
        }
        info!("Using {}", &url);

        let pool = SqlitePool::connect(&url).await.map_err(|e| {
            error!("db connection: {e:?}");
        })?;

        Ok(Self(pool))
    }

    /// Applies outstanding migrations; already-applied ones are skipped.
    pub async fn init(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.0)
            .await
            .map_err(|e| {
                error!("migration: {e:?}");
            })
    }
}

impl Backend {
    pub async fn find_user(&self, username: &str) -> std::result::Result<User, FindError> {
        query_as::<_, User>(
            "
            SELECT username, password
            FROM users
            WHERE username = ?
            ",
        )
        .bind(username)
        .fetch_one(&self.0)
        .await
        .map_err(|e| {
            if matches!(e, sqlx::Error::RowNotFound) {
                FindError::NotFound
            } else {
                error!("find user {username}: {e:?}");
                FindError::Internal
            }
        })
    }

    pub async fn insert_user(&self, user: &User) -> std::result::Result<(), InsertError> {
        let result = query(
            "
            INSERT INTO users (username, password)
            VALUES (?, ?)
            ON CONFLICT (username) DO NOTHING
            ",
        )
        .bind(&user.username)
        .bind(&user.password)
        .execute(&self.0)
        .await
        .map_err(|e| {
            error!("insert user {}: {e:?}", user.username);
            InsertError::Internal
        })?;

        match result.rows_affected() {
            0 => Err(InsertError::Exists),
            _ => Ok(()),
        }
    }
}

impl Backend {
    pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
        query_scalar::<_, String>("SELECT value FROM storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.0)
            .await
            .map_err(|e| {
                error!("get item {key}: {e:?}");
            })
    }

    pub async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        query(
            "
            INSERT INTO storage (key, value)
            VALUES (?, ?)
            ON CONFLICT (key)
            DO
                UPDATE SET value = excluded.value
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.0)
        .await
        .map(|_| debug!("set item {key}"))
        .map_err(|e| {
            error!("set item {key}: {e:?}");
        })
    }

    pub async fn remove_item(&self, key: &str) -> Result<()> {
        query("DELETE FROM storage WHERE key = ?")
            .bind(key)
            .execute(&self.0)
            .await
            .map(|r| {
                if r.rows_affected() > 0 {
                    debug!("removed item {key}");
                }
            })
            .map_err(|e| {
                error!("remove item {key}: {e:?}");
            })
    }
}
