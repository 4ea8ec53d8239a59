use super::host::Host;
use super::processes::{top_processes, SortKey};
use super::{read, CollectError};
use crate::snapshot::{percent, MemoryMetrics};
use std::collections::HashMap;

pub async fn collect<H: Host>(host: &H, top_n: usize) -> Result<MemoryMetrics, CollectError> {
    let text = read(host, "/proc/meminfo").await?;
    let info = parse_meminfo(&text);
    let mut metrics = memory_from_meminfo(&info)?;
    metrics.top_processes = top_processes(host, SortKey::Memory, top_n).await?;
    Ok(metrics)
}

// Parses `/proc/meminfo` into byte values. Entries are reported in KiB
// (`kB`); unit-less counters such as `HugePages_Total` are kept as is.
pub fn parse_meminfo(text: &str) -> HashMap<String, u64> {
    text.lines()
        .filter_map(|line| {
            let (key, rest) = line.split_once(':')?;
            let mut parts = rest.split_whitespace();
            let value = parts.next()?.parse::<u64>().ok()?;
            let bytes = match parts.next() {
                Some("kB") => value.saturating_mul(1024),
                _ => value,
            };
            Some((key.trim().to_string(), bytes))
        })
        .collect()
}

pub fn memory_from_meminfo(info: &HashMap<String, u64>) -> Result<MemoryMetrics, CollectError> {
    let total_bytes = *info
        .get("MemTotal")
        .ok_or_else(|| CollectError::parse("/proc/meminfo", "MemTotal missing"))?;
    let available_bytes = info
        .get("MemAvailable")
        .or_else(|| info.get("MemFree"))
        .copied()
        .ok_or_else(|| CollectError::parse("/proc/meminfo", "MemAvailable and MemFree missing"))?
        .min(total_bytes);
    let used_bytes = total_bytes - available_bytes;

    let swap_total_bytes = info.get("SwapTotal").copied().unwrap_or(0);
    let swap_free_bytes = info.get("SwapFree").copied().unwrap_or(0);
    let swap_used_bytes = swap_total_bytes.saturating_sub(swap_free_bytes);

    Ok(MemoryMetrics {
        total_bytes,
        used_bytes,
        available_bytes,
        usage_percent: percent(used_bytes, total_bytes),
        swap_total_bytes,
        swap_used_bytes,
        swap_usage_percent: percent(swap_used_bytes, swap_total_bytes),
        top_processes: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "\
MemTotal:       16303428 kB
MemFree:         1218196 kB
MemAvailable:   10034844 kB
Buffers:          402724 kB
SwapTotal:       8388604 kB
SwapFree:        6291452 kB
HugePages_Total:       0
";

    #[test]
    fn converts_kib_to_bytes() {
        let info = parse_meminfo(MEMINFO);
        assert_eq!(info["MemTotal"], 16_303_428 * 1024);
        assert_eq!(info["HugePages_Total"], 0);
    }

    #[test]
    fn usage_prefers_available_estimate() {
        let m = memory_from_meminfo(&parse_meminfo(MEMINFO)).unwrap();
        assert_eq!(m.available_bytes, 10_034_844 * 1024);
        assert_eq!(m.used_bytes, (16_303_428 - 10_034_844) * 1024);
        assert_eq!(m.usage_percent, 38.4);
        assert_eq!(m.swap_used_bytes, (8_388_604 - 6_291_452) * 1024);
        assert_eq!(m.swap_usage_percent, 25.0);
        assert_eq!(m.total_human(), "15.5 GB");
    }

    #[test]
    fn falls_back_to_free_without_available() {
        let m = memory_from_meminfo(&parse_meminfo("MemTotal: 2000 kB\nMemFree: 500 kB\n")).unwrap();
        assert_eq!(m.available_bytes, 500 * 1024);
        assert_eq!(m.usage_percent, 75.0);
    }

    #[test]
    fn fully_available_memory_is_zero_usage() {
        for total in [1_u64, 1024, 16_303_428] {
            let text = format!("MemTotal: {total} kB\nMemAvailable: {total} kB\n");
            let m = memory_from_meminfo(&parse_meminfo(&text)).unwrap();
            assert_eq!(m.usage_percent, 0.0);
        }
    }

    #[test]
    fn usage_matches_rounded_ratio() {
        for (total, available) in [(3_u64, 1_u64), (7, 0), (1000, 999), (16_303_428, 10_034_844)] {
            let text = format!("MemTotal: {total} kB\nMemAvailable: {available} kB\n");
            let m = memory_from_meminfo(&parse_meminfo(&text)).unwrap();
            let expected = (((total - available) as f64 / total as f64 * 100.0) * 10.0).round() / 10.0;
            assert_eq!(m.usage_percent, expected);
        }
    }

    #[test]
    fn swap_percent_is_zero_without_swap() {
        let m = memory_from_meminfo(&parse_meminfo(
            "MemTotal: 1000 kB\nMemAvailable: 10 kB\nSwapTotal: 0 kB\nSwapFree: 4096 kB\n",
        ))
        .unwrap();
        assert_eq!(m.swap_usage_percent, 0.0);
        assert_eq!(m.swap_used_bytes, 0);
    }

    #[test]
    fn missing_total_is_error() {
        assert!(memory_from_meminfo(&parse_meminfo("MemFree: 1 kB\n")).is_err());
    }
}
