use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use filemover_trigger::{ChangeTarget, EventWatcher, TriggerEvent, TriggerSource};
use tempfile::TempDir;
use tokio::time::timeout;

async fn next_directory_change(watcher: &mut EventWatcher, wanted: &Path) -> anyhow::Result<PathBuf> {
    timeout(Duration::from_secs(10), async {
        loop {
            match watcher.next_trigger().await {
                Some(TriggerEvent::FilesystemChange {
                    path,
                    target: ChangeTarget::Directory,
                    ..
                }) if path == wanted => return Ok(path),
                Some(_) => {}
                None => anyhow::bail!("watcher closed before the directory event arrived"),
            }
        }
    })
    .await?
}

#[tokio::test]
async fn new_subdirectory_produces_directory_trigger() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let root = temp.path().canonicalize()?;
    let mut watcher = EventWatcher::subscribe(&root)?;
    assert_eq!(watcher.root(), root.as_path());
    assert_eq!(watcher.name(), "watch");

    let batch = root.join("batch-001");
    fs::create_dir(&batch)?;
    fs::write(batch.join("scan.pdf"), "pdf")?;

    let observed = next_directory_change(&mut watcher, &batch).await?;
    assert_eq!(observed, batch);

    watcher.shutdown()?;
    assert_eq!(watcher.next_trigger().await, None);
    Ok(())
}
