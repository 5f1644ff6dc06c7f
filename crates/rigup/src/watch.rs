//! Watch mode: rebuild on filesystem changes.
//!
//! A recursive watcher over the project base directory feeds a rebuild
//! task. Changes under the output directory and in hidden paths are
//! filtered so persistent-channel writes cannot retrigger their own build.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::compiler::{Build, Compiler};
use crate::{Error, Result};

/// Active watch session.
///
/// Each rebuild outcome arrives through [`next`](WatchSession::next).
/// Dropping the session stops the watcher and the rebuild task.
pub struct WatchSession {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<Result<Build>>,
}

impl WatchSession {
    /// Next rebuild outcome. `None` once the session has been torn down.
    pub async fn next(&mut self) -> Option<Result<Build>> {
        self.rx.recv().await
    }
}

pub(crate) fn spawn(compiler: Compiler, debounce: Duration) -> Result<WatchSession> {
    let root = compiler.options().context.clone();
    if !root.exists() {
        return Err(Error::WatchRootNotFound(root));
    }
    let output_dir = compiler.options().output.path.clone();

    let (change_tx, mut change_rx) = mpsc::channel::<()>(64);
    let filter_root = root.clone();
    let mut last_event: Option<(PathBuf, Instant)> = None;

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let Ok(event) = res else { return };
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) {
            return;
        }

        for path in &event.paths {
            if should_ignore(path, &filter_root, output_dir.as_deref()) {
                continue;
            }

            // Debounce: collapse rapid successive events on the same file.
            let now = Instant::now();
            if let Some((last_path, last_time)) = &last_event {
                if last_path == path && now.duration_since(*last_time) < debounce {
                    continue;
                }
            }
            last_event = Some((path.clone(), now));

            let _ = change_tx.blocking_send(());
        }
    })?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    tracing::debug!(root = %root.display(), "watching for changes");

    let (build_tx, build_rx) = mpsc::channel(16);
    tokio::spawn(async move {
        // Initial build, then one rebuild per detected change.
        if build_tx.send(compiler.run().await).await.is_err() {
            return;
        }
        while change_rx.recv().await.is_some() {
            tracing::debug!("change detected, rebuilding");
            if build_tx.send(compiler.run().await).await.is_err() {
                break;
            }
        }
    });

    Ok(WatchSession {
        _watcher: watcher,
        rx: build_rx,
    })
}

/// Whether a changed path should not trigger a rebuild.
fn should_ignore(path: &Path, root: &Path, output_dir: Option<&Path>) -> bool {
    // Only react to paths within the watched root
    if !path.starts_with(root) {
        return true;
    }

    // The engine's own output must not retrigger builds
    if let Some(out) = output_dir {
        if path.starts_with(out) {
            return true;
        }
    }

    // Hidden files and directories
    let Ok(rel_path) = path.strip_prefix(root) else {
        return true;
    };
    for component in rel_path.components() {
        if let Some(name) = component.as_os_str().to_str() {
            if name.starts_with('.') {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_paths_outside_root() {
        let root = Path::new("/project");
        assert!(should_ignore(Path::new("/other/file.js"), root, None));
        assert!(!should_ignore(Path::new("/project/src/file.js"), root, None));
    }

    #[test]
    fn ignores_output_directory() {
        let root = Path::new("/project");
        let out = Path::new("/project/dist");
        assert!(should_ignore(
            Path::new("/project/dist/main.js"),
            root,
            Some(out)
        ));
        assert!(!should_ignore(
            Path::new("/project/src/main.js"),
            root,
            Some(out)
        ));
    }

    #[test]
    fn ignores_hidden_paths() {
        let root = Path::new("/project");
        assert!(should_ignore(Path::new("/project/.git/config"), root, None));
        assert!(should_ignore(Path::new("/project/.env"), root, None));
        assert!(should_ignore(
            Path::new("/project/src/.cache/file.js"),
            root,
            None
        ));
    }
}
