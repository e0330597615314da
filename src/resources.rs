//! Resource parameters and the flag/name derivation on top of [`FlagMap`].

use std::path::PathBuf;

use crate::flags::FlagMap;

/// Where job stdout/stderr go when `--quiet` is set.
const DISCARD: &str = "/dev/null";

/// Per-invocation resource parameters, as collected by the CLI layer.
///
/// Inputs are assumed validated by the caller; the derivation functions
/// below are total.
#[derive(Debug, Clone)]
pub struct ResourceParams {
    /// Memory to request per process, in gigabytes.
    pub mem_gb: f32,
    /// Threads per process. Values below 2 mean "no parallel environment".
    pub threads: Option<u32>,
    /// Extra comma-separated resource list, appended verbatim to `-l`.
    pub extra_resources: Option<String>,
    /// Discard job stdout/stderr.
    pub quiet: bool,
    /// Explicit job name; when absent, derived from `batch_file`.
    pub name: Option<String>,
    pub batch_file: PathBuf,
}

impl ResourceParams {
    /// Threads per process, with sub-2 values normalized to absent.
    pub fn threads(&self) -> Option<u32> {
        self.threads.filter(|&t| t >= 2)
    }
}

/// Merge the derived resource requests into an already-parsed flag map.
///
/// SGE grants `mem_free`/`h_vmem` per slot, so the memory request is
/// divided by the thread count when a parallel environment is in play.
pub fn derive_resource_flags(mut flags: FlagMap, params: &ResourceParams) -> FlagMap {
    let threads = params.threads();
    let mem_gb = match threads {
        Some(t) => params.mem_gb / t as f32,
        None => params.mem_gb,
    };
    flags.append_l(&format!("mem_free={mem_gb}G,h_vmem={mem_gb}G"));
    if let Some(extra) = params.extra_resources.as_deref() {
        flags.append_l(extra);
    }
    if let Some(t) = threads {
        flags.insert("-pe", &format!("make-dedicated {t}"));
    }
    if params.quiet {
        flags.insert("-o", DISCARD);
        flags.insert("-e", DISCARD);
    }
    flags
}

/// Derive the job name.
///
/// The explicit name wins. Otherwise the batch file name is used, minus a
/// leading `sh.`, a trailing `.sh`, and any character the scheduler would
/// reject. Returns the empty string when nothing usable is left; the caller
/// substitutes a fallback.
pub fn derive_job_name(params: &ResourceParams) -> String {
    if let Some(name) = params.name.as_deref()
        && !name.is_empty()
    {
        return name.to_string();
    }
    let path = params.batch_file.to_string_lossy();
    if !path.chars().any(|c| c.is_alphanumeric() || c == '_') {
        return String::new();
    }
    let base = match params.batch_file.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return String::new(),
    };
    let base = base.strip_prefix("sh.").unwrap_or(&base);
    let base = base.strip_suffix(".sh").unwrap_or(base);
    base.chars()
        .filter(|&c| c.is_alphanumeric() || c == '_' || c == '.' || c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(batch_file: &str) -> ResourceParams {
        ResourceParams {
            mem_gb: 4.0,
            threads: None,
            extra_resources: None,
            quiet: false,
            name: None,
            batch_file: PathBuf::from(batch_file),
        }
    }

    #[test]
    fn memory_only() {
        let flags = derive_resource_flags(FlagMap::new(), &params("jobs.sh"));
        assert_eq!(flags.get("-l"), Some("mem_free=4G,h_vmem=4G"));
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn memory_split_across_threads() {
        let flags = derive_resource_flags(
            FlagMap::new(),
            &ResourceParams {
                threads: Some(2),
                ..params("jobs.sh")
            },
        );
        assert_eq!(flags.get("-l"), Some("mem_free=2G,h_vmem=2G"));
        assert_eq!(flags.get("-pe"), Some("make-dedicated 2"));
    }

    #[test]
    fn fractional_memory_keeps_precision() {
        let flags = derive_resource_flags(
            FlagMap::new(),
            &ResourceParams {
                mem_gb: 5.0,
                threads: Some(2),
                ..params("jobs.sh")
            },
        );
        assert_eq!(flags.get("-l"), Some("mem_free=2.5G,h_vmem=2.5G"));
    }

    #[test]
    fn single_thread_is_no_parallel_environment() {
        let flags = derive_resource_flags(
            FlagMap::new(),
            &ResourceParams {
                threads: Some(1),
                ..params("jobs.sh")
            },
        );
        assert_eq!(flags.get("-l"), Some("mem_free=4G,h_vmem=4G"));
        assert_eq!(flags.get("-pe"), None);
    }

    #[test]
    fn extra_resources_appended_verbatim() {
        let flags = derive_resource_flags(
            FlagMap::new(),
            &ResourceParams {
                extra_resources: Some("oracle=1,h_rt=8:0:0".to_string()),
                ..params("jobs.sh")
            },
        );
        assert_eq!(
            flags.get("-l"),
            Some("mem_free=4G,h_vmem=4G,oracle=1,h_rt=8:0:0")
        );
    }

    #[test]
    fn appends_to_existing_resource_list() {
        let parsed = FlagMap::parse("-l oracle=1").unwrap();
        let flags = derive_resource_flags(parsed, &params("jobs.sh"));
        assert_eq!(flags.get("-l"), Some("oracle=1,mem_free=4G,h_vmem=4G"));
    }

    #[test]
    fn quiet_overwrites_output_flags() {
        let mut parsed = FlagMap::new();
        parsed.insert("-o", "logs/out");
        parsed.insert("-e", "logs/err");
        let flags = derive_resource_flags(
            parsed,
            &ResourceParams {
                quiet: true,
                ..params("jobs.sh")
            },
        );
        assert_eq!(flags.get("-o"), Some("/dev/null"));
        assert_eq!(flags.get("-e"), Some("/dev/null"));
    }

    #[test]
    fn explicit_name_wins() {
        let name = derive_job_name(&ResourceParams {
            name: Some("align".to_string()),
            ..params("/x/sh.myjob.sh")
        });
        assert_eq!(name, "align");
    }

    #[test]
    fn name_derived_from_batch_file() {
        assert_eq!(derive_job_name(&params("/x/sh.myjob.sh")), "myjob");
        assert_eq!(derive_job_name(&params("trim_all.sh")), "trim_all");
        assert_eq!(derive_job_name(&params("run v2!.sh")), "runv2");
    }

    #[test]
    fn unusable_path_yields_empty_name() {
        assert_eq!(derive_job_name(&params("---")), "");
    }
}
