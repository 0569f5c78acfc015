//! # File I/O Module
//!
//! Project file operations:
//! - **Atomic saves**: write to `.tkc.tmp`, fsync, rename over the target
//! - **File locking**: prevent two people editing one project on a shared drive
//! - **Version validation**: refuse files written by a newer schema
//! - **Listing**: summarize the saved projects in a directory
//!
//! ## File Format
//!
//! Projects are saved as `.tkc` files containing JSON.
//! Lock files use the `.tkc.lock` extension and record who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tankcalc_core::file_io::{save_project, load_project, FileLock};
//! use tankcalc_core::project::Project;
//! use tankcalc_core::units::UnitSystem;
//! use std::path::Path;
//!
//! let project = Project::new("Tank Farm B", "Balikpapan", UnitSystem::SI);
//! let path = Path::new("tank_farm_b.tkc");
//!
//! let lock = FileLock::acquire(path, "engineer@company.com").unwrap();
//! save_project(&project, path).unwrap();
//! drop(lock);
//!
//! let reloaded = load_project(path).unwrap();
//! assert_eq!(reloaded.meta.project_name, "Tank Farm B");
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::project::{Project, SCHEMA_VERSION};
use crate::standard_selector::DesignStandard;
use crate::units::UnitSystem;

/// Extension of saved project files
pub const PROJECT_EXTENSION: &str = "tkc";

/// Locks older than this are treated as abandoned
const STALE_LOCK_HOURS: i64 = 24;

/// Lock file metadata stored in `.tkc.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where the lock was acquired
    pub machine: String,
    /// Process ID holding the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// "user (machine)" for messages
    pub fn holder(&self) -> String {
        format!("{} ({})", self.user_id, self.machine)
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

fn io_error(operation: &str, path: &Path) -> impl FnOnce(std::io::Error) -> CalcError {
    let operation = operation.to_string();
    let path = path.display().to_string();
    move |e| CalcError::file_error(operation, path, e.to_string())
}

/// Exclusive lock on a project file, released on drop.
///
/// Combines an OS-level lock (fs2) with a `.lock` file that tells other
/// users who holds the project.
pub struct FileLock {
    project_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a project file.
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - Lock acquired
    /// * `Err(CalcError::FileLocked)` - Another live process holds the lock
    ///
    /// A lock left behind by a dead process, or older than 24 hours, is
    /// taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = live_lock(&lock_path) {
            return Err(CalcError::file_locked(
                path.display().to_string(),
                existing.holder(),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(io_error("create lock", &lock_path))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(io_error("write lock", &lock_path))?;
        lock_file.sync_all().map_err(io_error("sync lock", &lock_path))?;

        Ok(FileLock {
            project_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Check whether a project is locked without taking the lock.
    pub fn check(path: &Path) -> Option<LockInfo> {
        live_lock(&lock_path_for(path))
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `project.tkc` -> `project.tkc.lock`
fn lock_path_for(project_path: &Path) -> PathBuf {
    let mut lock_path = project_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

/// Lock info from `lock_path` when it exists and is not stale
fn live_lock(lock_path: &Path) -> Option<LockInfo> {
    if !lock_path.exists() {
        return None;
    }
    read_lock_info(lock_path).ok().filter(|info| !is_lock_stale(info))
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    Ok(serde_json::from_str(&contents)?)
}

/// A lock is stale when its process is gone (same machine) or it has aged out.
fn is_lock_stale(info: &LockInfo) -> bool {
    if hostname().as_deref() == Some(info.machine.as_str()) && !process_alive(info.pid) {
        return true;
    }
    (Utc::now() - info.locked_at).num_hours() > STALE_LOCK_HOURS
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    fs::metadata(format!("/proc/{}", pid)).is_ok()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    use std::process::Command;
    match Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
    {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            !stdout.contains("No tasks") && stdout.contains(&pid.to_string())
        }
        Err(_) => true,
    }
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    true
}

fn read_to_string(path: &Path, operation: &str) -> CalcResult<String> {
    let mut file = File::open(path).map_err(io_error(operation, path))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(io_error(operation, path))?;
    Ok(contents)
}

/// Save a project with atomic write semantics.
///
/// 1. Serialize to pretty JSON
/// 2. Write `<path>.tmp`-style sibling (`.tkc.tmp`)
/// 3. fsync
/// 4. Rename over `path`
///
/// An interrupted save leaves the previous file intact.
pub fn save_project(project: &Project, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(project)?;
    let tmp_path = path.with_extension(format!("{}.tmp", PROJECT_EXTENSION));

    let mut tmp_file = File::create(&tmp_path).map_err(io_error("create temp file", &tmp_path))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(io_error("write temp file", &tmp_path))?;
    tmp_file.sync_all().map_err(io_error("sync temp file", &tmp_path))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })
}

/// Load a project from a `.tkc` file.
///
/// # Returns
///
/// * `Ok(Project)` - Loaded project
/// * `Err(CalcError::VersionMismatch)` - Written by an incompatible schema
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_project(path: &Path) -> CalcResult<Project> {
    let contents = read_to_string(path, "open")?;

    let project: Project = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;

    validate_version(&project.meta.version)?;
    Ok(project)
}

/// Load a project and report whether someone else holds its lock.
///
/// * `Ok((Project, None))` - Loaded, not locked
/// * `Ok((Project, Some(LockInfo)))` - Loaded read-only; another user has it
pub fn load_project_with_lock_check(path: &Path) -> CalcResult<(Project, Option<LockInfo>)> {
    let project = load_project(path)?;
    let lock_info = FileLock::check(path);
    Ok((project, lock_info))
}

/// Summary of a saved project, for pickers and listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProjectMeta {
    pub path: PathBuf,
    pub name: String,
    pub modified: DateTime<Utc>,
    pub units: UnitSystem,
    pub standard: DesignStandard,
}

/// List the `.tkc` projects in `dir`, most recently modified first.
///
/// Files that cannot be read or parsed are skipped. A missing directory
/// lists as empty.
pub fn list_projects(dir: &Path) -> CalcResult<Vec<SavedProjectMeta>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(io_error("list", dir))?;
    let mut projects: Vec<SavedProjectMeta> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == PROJECT_EXTENSION))
        .filter_map(|path| {
            let project = load_project(&path).ok()?;
            Some(SavedProjectMeta {
                name: project.meta.project_name.clone(),
                modified: project.meta.modified,
                units: project.settings.units,
                standard: project.primary_standard(),
                path,
            })
        })
        .collect();

    projects.sort_by(|a, b| b.modified.cmp(&a.modified));
    Ok(projects)
}

/// Same major version required; on 0.x a newer minor is rejected.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let (Some(file_major), Some(current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }
    if *current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::heat_exchanger::{
        FluidProperties, HeatExchangerInput, PitchType, ShellHeadType, ShellSpecs, TubeSpecs,
    };
    use crate::calculations::CalculationItem;
    use std::env::temp_dir;

    fn temp_project_path(name: &str) -> PathBuf {
        temp_dir().join(format!("tankcalc_test_{}_{}.tkc", name, std::process::id()))
    }

    fn water(mass_flow: f64) -> FluidProperties {
        FluidProperties {
            label: "Water".to_string(),
            mass_flow,
            temp_in: 30.0,
            temp_out: 50.0,
            allowable_dp: 0.7,
            fouling_resistance: 0.0002,
            cp: 4180.0,
            mu: 0.0008,
            k: 0.6,
            rho: 995.0,
        }
    }

    #[test]
    fn test_lock_path_generation() {
        let lock_path = lock_path_for(Path::new("/data/tanks/farm.tkc"));
        assert_eq!(lock_path, Path::new("/data/tanks/farm.tkc.lock"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("qa@example.com");
        assert_eq!(info.user_id, "qa@example.com");
        assert!(info.pid > 0);
        assert!(info.holder().starts_with("qa@example.com ("));
    }

    #[test]
    fn test_stale_lock_by_age() {
        let mut info = LockInfo::new("old@example.com");
        info.machine = "some-other-host".to_string();
        info.locked_at = Utc::now() - chrono::Duration::hours(30);
        assert!(is_lock_stale(&info));

        info.locked_at = Utc::now();
        assert!(!is_lock_stale(&info));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_project_path("roundtrip");

        let mut project = Project::new("Refinery Tankage", "Dumai", UnitSystem::SI);
        project.add_item(CalculationItem::HeatExchanger(HeatExchangerInput {
            label: "E-1".to_string(),
            hot: FluidProperties {
                label: "Oil".to_string(),
                temp_in: 100.0,
                temp_out: 60.0,
                cp: 2200.0,
                mu: 0.0005,
                k: 0.13,
                rho: 750.0,
                ..water(10.0)
            },
            cold: water(10.53),
            tube: TubeSpecs {
                od: 0.02,
                id: 0.016,
                length: 4.88,
                thickness: 0.002,
                material: "CS".to_string(),
                material_conductivity: 45.0,
                pitch_type: PitchType::Square,
                pitch_ratio: 1.25,
            },
            shell: ShellSpecs {
                head_type: ShellHeadType::PullThrough,
                passes: 1,
                tube_passes: 4,
                baffle_ratio: 0.5,
                baffle_cut: 25.0,
            },
            u_assume: 450.0,
        }));
        save_project(&project, &path).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.project_name, "Refinery Tankage");
        assert_eq!(loaded.meta.location, "Dumai");
        assert_eq!(loaded.item_count(), 1);
        assert_eq!(loaded.items, project.items);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_project_path("atomic");
        let tmp_path = path.with_extension("tkc.tmp");

        save_project(&Project::default(), &path).unwrap();
        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let path = temp_project_path("lock_test");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "ops@example.com").unwrap();
        assert_eq!(lock.info.user_id, "ops@example.com");
        assert_eq!(lock.project_path(), path.as_path());

        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        drop(lock);
        assert!(!lock_path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let path = temp_project_path("newer");
        let mut project = Project::default();
        project.meta.version = "0.9.0".to_string();
        save_project(&project, &path).unwrap();

        match load_project(&path) {
            Err(CalcError::VersionMismatch { file_version, .. }) => assert_eq!(file_version, "0.9.0"),
            other => panic!("expected VersionMismatch, got {:?}", other),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_with_lock_check() {
        let path = temp_project_path("lock_check");
        save_project(&Project::new("Depot", "", UnitSystem::SI), &path).unwrap();

        let (loaded, lock_info) = load_project_with_lock_check(&path).unwrap();
        assert_eq!(loaded.meta.project_name, "Depot");
        assert!(lock_info.is_none());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_list_projects_newest_first() {
        let dir = temp_dir().join(format!("tankcalc_list_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let mut older = Project::new("Older", "", UnitSystem::US);
        older.meta.modified = Utc::now() - chrono::Duration::days(2);
        save_project(&older, &dir.join("older.tkc")).unwrap();

        let newer = Project::new("Newer", "", UnitSystem::SI);
        save_project(&newer, &dir.join("newer.tkc")).unwrap();

        fs::write(dir.join("broken.tkc"), "{ not json").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let listed = list_projects(&dir).unwrap();
        let names: Vec<&str> = listed.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Newer", "Older"]);
        assert_eq!(listed[1].units, UnitSystem::US);
        assert_eq!(listed[0].standard, DesignStandard::Api650);

        let _ = fs::remove_dir_all(&dir);
        assert!(list_projects(&dir).unwrap().is_empty());
    }
}
