use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::{oneshot, watch};

use crate::db::{
    migrations::run_migrations,
    models::{Contest, Walk},
};

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

/// Change feeds over the store, decoupled from the query layer: anything that
/// mutates the set of in-progress walks or the contest table pushes the new
/// value here.
pub(crate) struct Watchers {
    pub(crate) active_walk: watch::Sender<Option<Walk>>,
    pub(crate) contest: watch::Sender<Option<Contest>>,
}

/// Handle to the SQLite store. All access is serialized on a dedicated worker
/// thread; callers submit closures and await the reply.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<PathBuf>,
    pub(crate) watchers: Arc<Watchers>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("openwalk-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }
                if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
                    error!("Failed to enable foreign keys: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.as_path().display());

        let (active_walk_tx, _) = watch::channel(None);
        let (contest_tx, _) = watch::channel(None);

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
            watchers: Arc::new(Watchers {
                active_walk: active_walk_tx,
                contest: contest_tx,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Notified whenever the set of in-progress walks changes (a walk starts,
    /// is committed, or is deleted). `None` means no walk is in progress.
    pub fn watch_active_walk(&self) -> watch::Receiver<Option<Walk>> {
        self.watchers.active_walk.subscribe()
    }

    /// Notified whenever the stored contest changes.
    pub fn watch_contest(&self) -> watch::Receiver<Option<Contest>> {
        self.watchers.contest.subscribe()
    }

    /// Seeds both change feeds from the store. Call once after opening so
    /// subscribers created before the first write still see current values.
    pub async fn refresh_watchers(&self) -> Result<()> {
        let active = self.get_active_walk().await?;
        self.watchers.active_walk.send_replace(active);
        let contest = self.current_contest().await?;
        self.watchers.contest.send_replace(contest);
        Ok(())
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }
}
