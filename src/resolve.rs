//! Writable data-directory resolution.
//!
//! Resolution order:
//!   1. DATA_DIR override (environment or app config)
//!   2. Hosted notebook: <drive>/MyDrive/<preferred_subdir>/<subfolder>, after a mount attempt
//!   3. Hosted notebook: /content/<subfolder>
//!   4. ../<subfolder>, ./<subfolder>, ~/work/<subfolder>, ~/<subfolder>, <tmp>/dp_t25_data
//!   5. <cwd>/<subfolder>, force-created

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::hosted::{self, HostedRuntime, DRIVE_USER_FOLDER};

pub const DEFAULT_PREFERRED_SUBDIR: &str = "dp-t25";
pub const DEFAULT_SUBFOLDER: &str = "data";

const PROBE_FILE: &str = ".write_test";
const TEMP_FALLBACK: &str = "dp_t25_data";

/// Where a candidate directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    EnvOverride,
    CloudDrive,
    HostedLocal,
    CommonLocal,
    TempFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub source: CandidateSource,
}

impl Candidate {
    pub fn new(path: impl Into<PathBuf>, source: CandidateSource) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// Create `dir`, write a probe file into it, and remove the probe.
pub fn is_writable(dir: &Path) -> bool {
    match std::fs::create_dir_all(dir) {
        Ok(()) => probe_dir(dir),
        Err(e) => {
            debug!("{} is not writable: {}", dir.display(), e);
            false
        }
    }
}

/// Whether `dir` could be written without creating it: the probe goes into
/// `dir` when it exists, else into its nearest existing ancestor.
pub fn can_write(dir: &Path) -> bool {
    let existing = dir
        .ancestors()
        .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
        .find(|p| p.exists());
    match existing {
        Some(p) if p.is_dir() => probe_dir(p),
        _ => false,
    }
}

fn probe_dir(dir: &Path) -> bool {
    let probe = dir.join(PROBE_FILE);
    let result = std::fs::write(&probe, "ok").and_then(|_| match std::fs::remove_file(&probe) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    });
    match result {
        Ok(()) => true,
        Err(e) => {
            debug!("{} is not writable: {}", dir.display(), e);
            false
        }
    }
}

/// Return the first candidate accepted by `probe`.
///
/// Candidates after the accepted one are never produced nor probed.
pub fn first_writable<I, F>(candidates: I, mut probe: F) -> Option<Candidate>
where
    I: IntoIterator<Item = Candidate>,
    F: FnMut(&Path) -> bool,
{
    candidates.into_iter().find(|c| probe(&c.path))
}

pub struct Resolver<'a> {
    env_override: Option<PathBuf>,
    runtime: &'a dyn HostedRuntime,
    home: PathBuf,
    cwd: PathBuf,
    temp: PathBuf,
}

impl<'a> Resolver<'a> {
    pub fn new(env_override: Option<PathBuf>, runtime: &'a dyn HostedRuntime) -> Self {
        Self {
            env_override,
            runtime,
            home: home_dir(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            temp: std::env::temp_dir(),
        }
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_temp(mut self, temp: impl Into<PathBuf>) -> Self {
        self.temp = temp.into();
        self
    }

    /// Candidates in priority order.
    ///
    /// Lazy: the hosted-runtime stage (which attempts a drive mount) only runs
    /// once every earlier candidate has been rejected.
    pub fn candidates(
        &self,
        preferred_subdir: &str,
        subfolder: &str,
    ) -> impl Iterator<Item = Candidate> + '_ {
        let env = self
            .env_override
            .clone()
            .map(|p| Candidate::new(p, CandidateSource::EnvOverride));
        let preferred = preferred_subdir.to_string();
        let sub = subfolder.to_string();
        let hosted = std::iter::once(())
            .filter(move |_| self.runtime.is_hosted())
            .flat_map(move |_| self.hosted_candidates(&preferred, &sub));
        env.into_iter()
            .chain(hosted)
            .chain(self.local_candidates(subfolder))
    }

    fn hosted_candidates(&self, preferred_subdir: &str, subfolder: &str) -> Vec<Candidate> {
        let mut out = Vec::new();
        let mount_point = self.runtime.drive_mount_point();
        if let Err(e) = self.runtime.mount_drive(&mount_point) {
            warn!("Could not mount cloud drive: {}", e);
        }
        let drive_root = mount_point.join(DRIVE_USER_FOLDER);
        if drive_root.exists() {
            out.push(Candidate::new(
                drive_root.join(preferred_subdir).join(subfolder),
                CandidateSource::CloudDrive,
            ));
        }
        out.push(Candidate::new(
            self.runtime.hosted_root().join(subfolder),
            CandidateSource::HostedLocal,
        ));
        out
    }

    fn local_candidates(&self, subfolder: &str) -> Vec<Candidate> {
        vec![
            Candidate::new(
                self.cwd.join("..").join(subfolder),
                CandidateSource::CommonLocal,
            ),
            Candidate::new(self.cwd.join(subfolder), CandidateSource::CommonLocal),
            Candidate::new(
                self.home.join("work").join(subfolder),
                CandidateSource::CommonLocal,
            ),
            Candidate::new(self.home.join(subfolder), CandidateSource::CommonLocal),
            Candidate::new(self.temp.join(TEMP_FALLBACK), CandidateSource::TempFallback),
        ]
    }

    /// Resolve with the default filesystem probe.
    pub fn resolve(&self, preferred_subdir: &str, subfolder: &str) -> PathBuf {
        self.resolve_with(preferred_subdir, subfolder, is_writable)
    }

    pub fn resolve_with<F>(&self, preferred_subdir: &str, subfolder: &str, probe: F) -> PathBuf
    where
        F: FnMut(&Path) -> bool,
    {
        if let Some(found) = first_writable(self.candidates(preferred_subdir, subfolder), probe) {
            match found.source {
                CandidateSource::CloudDrive => {
                    info!("Using cloud drive for data: {}", found.path.display())
                }
                CandidateSource::HostedLocal => {
                    info!("Using hosted local path for data: {}", found.path.display())
                }
                _ => debug!("Using data directory {}", found.path.display()),
            }
            return found.path;
        }

        let fallback = self.cwd.join(subfolder);
        if let Err(e) = std::fs::create_dir_all(&fallback) {
            warn!("Could not create fallback {}: {}", fallback.display(), e);
        }
        fallback
    }
}

/// Resolve the data directory for this process.
pub fn data_dir(env_override: Option<PathBuf>, preferred_subdir: &str, subfolder: &str) -> PathBuf {
    let runtime = hosted::detect();
    Resolver::new(env_override, runtime.as_ref()).resolve(preferred_subdir, subfolder)
}

/// slidekit data-dir [--subdir NAME] [--subfolder NAME]
pub fn run(cli_data_dir: Option<PathBuf>, preferred_subdir: &str, subfolder: &str) -> Result<()> {
    let over = crate::config::data_dir_override(cli_data_dir);
    let dir = data_dir(over, preferred_subdir, subfolder);
    println!("{}", dir.display());
    Ok(())
}

/// Get the user's home directory.
pub fn home_dir() -> PathBuf {
    if let Some(dirs) = directories::BaseDirs::new() {
        return dirs.home_dir().to_path_buf();
    }
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Expand ~ to home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        home_dir().join(rest)
    } else if path == "~" {
        home_dir()
    } else {
        PathBuf::from(path)
    }
}
