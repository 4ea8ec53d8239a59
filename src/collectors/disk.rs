use super::host::Host;
use super::{run, run_ok, CollectError};
use crate::config::CollectConfig;
use crate::snapshot::{DiskMetrics, Filesystem, InodeUsage, LargeFile};
use tracing::debug;

const LARGE_FILES_LIMIT: usize = 5;
const EXCLUDED_FILESYSTEMS: [&str; 3] = ["tmpfs", "cdrom", "udev"];

pub async fn collect<H: Host>(host: &H, cfg: &CollectConfig) -> Result<DiskMetrics, CollectError> {
    let df = run_ok(host, "df", &["-hP"]).await?;
    let filesystems = parse_df(&df);

    let df_inodes = run_ok(host, "df", &["-iP"]).await?;
    let inodes = parse_df_inodes(&df_inodes);

    let large_files = find_large_files(host, &cfg.large_file_dir, cfg.large_file_min_mb).await;

    Ok(DiskMetrics {
        filesystems,
        inodes,
        large_files,
    })
}

// Files are searched best-effort: unreadable subdirectories make `find`
// exit non-zero but the rows it did print are kept.
async fn find_large_files<H: Host>(host: &H, dir: &str, min_mb: u64) -> Vec<LargeFile> {
    let size = format!("+{min_mb}M");
    let args = [
        dir,
        "-type",
        "f",
        "-size",
        size.as_str(),
        "-exec",
        "ls",
        "-lh",
        "{}",
        "+",
    ];
    match run(host, "find", &args).await {
        Ok(output) => parse_ls_long(&output.stdout, LARGE_FILES_LIMIT),
        Err(err) => {
            debug!(dir, error = %err, "large file search failed");
            Vec::new()
        }
    }
}

fn df_rows(text: &str) -> impl Iterator<Item = Vec<&str>> {
    text.lines()
        .filter(|l| !l.starts_with("Filesystem"))
        .filter(|l| !EXCLUDED_FILESYSTEMS.iter().any(|fs| l.contains(fs)))
        .map(|l| l.split_whitespace().collect::<Vec<_>>())
        .filter(|parts| parts.len() >= 6)
}

fn parse_percent(field: &str) -> Option<u32> {
    field.strip_suffix('%')?.parse().ok()
}

pub fn parse_df(text: &str) -> Vec<Filesystem> {
    df_rows(text)
        .filter_map(|parts| {
            Some(Filesystem {
                filesystem: parts[0].to_string(),
                size: parts[1].to_string(),
                used: parts[2].to_string(),
                available: parts[3].to_string(),
                usage_percent: parse_percent(parts[4])?,
                mountpoint: parts[5..].join(" "),
            })
        })
        .collect()
}

pub fn parse_df_inodes(text: &str) -> Vec<InodeUsage> {
    df_rows(text)
        .filter_map(|parts| {
            Some(InodeUsage {
                total: parts[1].to_string(),
                used: parts[2].to_string(),
                available: parts[3].to_string(),
                usage_percent: parse_percent(parts[4])?,
                mountpoint: parts[5..].join(" "),
            })
        })
        .collect()
}

pub fn parse_ls_long(text: &str, limit: usize) -> Vec<LargeFile> {
    text.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 9 {
                return None;
            }
            Some(LargeFile {
                size: parts[4].to_string(),
                date: parts[5..8].join(" "),
                path: parts[8..].join(" "),
            })
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::fake::FakeHost;
    use super::*;

    const DF: &str = "\
Filesystem           Size  Used Avail Use% Mounted on
devtmpfs             3.8G     0  3.8G   0% /dev
tmpfs                3.8G   84K  3.8G   1% /dev/shm
/dev/mapper/rl-root   70G   63G  7.0G  90% /
/dev/sda1           1014M  812M  203M  80% /boot
/dev/mapper/rl-home  120G   94G   26G  79% /home
//nas/share         1.0T  500G  500G  50% /mnt/nas share
";

    const DF_INODES: &str = "\
Filesystem            Inodes IUsed   IFree IUse% Mounted on
/dev/mapper/rl-root  36700160 412345 36287815    2% /
/dev/sda1             524288    350   523938    1% /boot
btrfs-pool                 0      0        0     - /data
";

    #[test]
    fn df_skips_pseudo_filesystems() {
        let fs = parse_df(DF);
        let mounts: Vec<&str> = fs.iter().map(|f| f.mountpoint.as_str()).collect();
        assert_eq!(mounts, vec!["/", "/boot", "/home", "/mnt/nas share"]);
        assert_eq!(fs[0].filesystem, "/dev/mapper/rl-root");
        assert_eq!(fs[0].size, "70G");
        assert_eq!(fs[0].available, "7.0G");
        assert_eq!(fs[0].usage_percent, 90);
    }

    #[test]
    fn df_status_follows_disk_thresholds() {
        use crate::snapshot::Health;
        let fs = parse_df(DF);
        assert_eq!(fs[0].status(), Health::Critical);
        assert_eq!(fs[1].status(), Health::Warning);
        assert_eq!(fs[2].status(), Health::Ok);
    }

    #[test]
    fn inode_rows_without_percentage_are_skipped() {
        let inodes = parse_df_inodes(DF_INODES);
        assert_eq!(inodes.len(), 2);
        assert_eq!(inodes[0].mountpoint, "/");
        assert_eq!(inodes[0].total, "36700160");
        assert_eq!(inodes[0].usage_percent, 2);
    }

    #[test]
    fn ls_rows_become_large_files() {
        let ls = "\
-rw-------. 1 root root 512M Mar 14 09:12 /var/log/messages
-rw-r-----. 1 root adm  1.2G Feb  2  2023 /var/log/old archive.log
total 8
";
        let files = parse_ls_long(ls, 5);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].size, "512M");
        assert_eq!(files[0].date, "Mar 14 09:12");
        assert_eq!(files[0].path, "/var/log/messages");
        assert_eq!(files[1].date, "Feb 2 2023");
        assert_eq!(files[1].path, "/var/log/old archive.log");
    }

    #[tokio::test]
    async fn large_file_search_errors_are_ignored() {
        let mut host = FakeHost::new();
        host.add_command("df -hP", 0, DF)
            .add_command("df -iP", 0, DF_INODES);

        let disk = collect(&host, &CollectConfig::default()).await.expect("disk");
        assert!(disk.large_files.is_empty());
        assert_eq!(disk.filesystems.len(), 4);
    }

    #[tokio::test]
    async fn partial_find_output_is_kept() {
        let mut host = FakeHost::new();
        host.add_command("df -hP", 0, DF)
            .add_command("df -iP", 0, DF_INODES)
            .add_command(
                "find /var/log -type f -size +100M -exec ls -lh {} +",
                1,
                "-rw-------. 1 root root 150M Mar 14 09:12 /var/log/audit/audit.log\n",
            );

        let disk = collect(&host, &CollectConfig::default()).await.expect("disk");
        assert_eq!(disk.large_files.len(), 1);
        assert_eq!(disk.large_files[0].path, "/var/log/audit/audit.log");
    }
}
