use crate::error::ConfigError;
use crate::models::work_item::WorkItem;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// TOML 条目清单
///
/// ```toml
/// repeat = 10
/// items = ["papers/a.pdf", "papers/b.pdf"]
/// ```
#[derive(Debug, Deserialize)]
pub struct ItemManifest {
    pub items: Vec<String>,
    #[serde(default)]
    pub repeat: Option<usize>,
}

/// 根据输入路径加载条目列表
///
/// - 目录：扫描文件名匹配 `pattern` 的文件（不递归，按路径排序）
/// - `.toml`：条目清单，清单内的 `repeat` 与参数 `repeat` 相乘
/// - 其它：文本列表，每行一个路径
pub async fn load_items(input_path: &str, pattern: &str, repeat: usize) -> Result<Vec<WorkItem>> {
    let path = PathBuf::from(input_path);

    if !path.exists() {
        anyhow::bail!("输入路径不存在: {}", input_path);
    }

    let (items, repeat) = if path.is_dir() {
        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        (scan_directory(&path, &regex).await?, repeat)
    } else if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        let manifest = load_manifest(&path).await?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let items = manifest
            .items
            .iter()
            .map(|p| WorkItem::new(resolve(base, p)))
            .collect();
        let manifest_repeat = manifest.repeat.unwrap_or(1);
        let repeat = repeat
            .checked_mul(manifest_repeat)
            .ok_or(ConfigError::RepeatTooLarge {
                items: manifest.items.len(),
                repeat: manifest_repeat,
            })?;
        (items, repeat)
    } else {
        (load_list_file(&path).await?, repeat)
    };

    tracing::info!("加载 {} 个条目 (重复 {} 次)", items.len(), repeat);
    Ok(repeat_items(items, repeat)?)
}

/// 读取 TOML 条目清单
pub async fn load_manifest(path: &Path) -> Result<ItemManifest> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取清单文件: {}", path.display()))?;

    let manifest: ItemManifest = toml::from_str(&content)
        .with_context(|| format!("无法解析清单文件: {}", path.display()))?;

    Ok(manifest)
}

/// 扫描目录中文件名匹配的文件
pub async fn scan_directory(folder: &Path, pattern: &Regex) -> Result<Vec<WorkItem>> {
    let mut paths = Vec::new();
    let mut entries = fs::read_dir(folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let matched = pattern.is_match(&path.file_name().unwrap_or_default().to_string_lossy());
        if matched {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        tracing::warn!("在文件夹 {} 中没有找到匹配的文件", folder.display());
    }

    // read_dir 的顺序不稳定，排序后分区才可复现
    paths.sort();
    Ok(paths.into_iter().map(WorkItem::new).collect())
}

/// 读取文本列表（每行一个路径，忽略空行和 # 注释）
pub async fn load_list_file(path: &Path) -> Result<Vec<WorkItem>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取列表文件: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(WorkItem::from)
        .collect())
}

fn resolve(base: &Path, item: &str) -> PathBuf {
    let p = Path::new(item);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

fn repeat_items(items: Vec<WorkItem>, repeat: usize) -> Result<Vec<WorkItem>, ConfigError> {
    if repeat == 1 {
        return Ok(items);
    }
    let total = items
        .len()
        .checked_mul(repeat)
        .ok_or(ConfigError::RepeatTooLarge {
            items: items.len(),
            repeat,
        })?;
    let mut out = Vec::with_capacity(total);
    for _ in 0..repeat {
        out.extend(items.iter().cloned());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;

    #[tokio::test]
    async fn test_scan_directory_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt"] {
            std_fs::write(dir.path().join(name), b"x").unwrap();
        }
        std_fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let items = load_items(dir.path().to_str().unwrap(), r"(?i)\.pdf$", 1)
            .await
            .unwrap();

        let names: Vec<String> = items.iter().map(|i| i.display_name()).collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_list_file_skips_comments_and_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("items.txt");
        std_fs::write(&list, "# header\n/data/a.pdf\n\n  /data/b.pdf  \n").unwrap();

        let items = load_items(list.to_str().unwrap(), ".*", 2).await.unwrap();

        let paths: Vec<String> = items.iter().map(|i| i.to_string()).collect();
        assert_eq!(paths, vec!["/data/a.pdf", "/data/b.pdf", "/data/a.pdf", "/data/b.pdf"]);
    }

    #[tokio::test]
    async fn test_manifest_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("batch.toml");
        std_fs::write(&manifest, "repeat = 3\nitems = [\"doc.pdf\", \"/abs/x.pdf\"]\n").unwrap();

        let items = load_items(manifest.to_str().unwrap(), ".*", 1).await.unwrap();

        assert_eq!(items.len(), 6);
        assert_eq!(items[0].path(), dir.path().join("doc.pdf"));
        assert_eq!(items[1].path(), Path::new("/abs/x.pdf"));
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_items(dir.path().to_str().unwrap(), "([", 1)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidPattern { .. })
        ));
    }

    #[tokio::test]
    async fn test_manifest_repeat_overflow_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("batch.toml");
        std_fs::write(
            &manifest,
            format!("repeat = {}\nitems = [\"doc.pdf\"]\n", i64::MAX),
        )
        .unwrap();

        // TOML 整数上限是 i64::MAX，再乘 3 超出 usize
        let err = load_items(manifest.to_str().unwrap(), ".*", 3).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::RepeatTooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_repeat_overflow_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("items.txt");
        std_fs::write(&list, "/data/a.pdf\n/data/b.pdf\n").unwrap();

        let err = load_items(list.to_str().unwrap(), ".*", usize::MAX).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::RepeatTooLarge {
                items: 2,
                repeat: usize::MAX
            })
        );
    }

    #[tokio::test]
    async fn test_missing_input_path() {
        let result = load_items("/definitely/not/here", ".*", 1).await;
        assert!(result.is_err());
    }
}
