//! Attaching to a running game process.
//!
//! On Windows the target is opened with `PROCESS_VM_READ` and its main module
//! is resolved through a Toolhelp snapshot. Elsewhere (games running under
//! Wine or Proton) the module range is taken from `/proc/<pid>/maps`.

#[cfg(target_os = "windows")]
mod win32;
#[cfg(target_os = "windows")]
use self::win32 as platform;

#[cfg(not(target_os = "windows"))]
mod unix;
#[cfg(not(target_os = "windows"))]
use self::unix as platform;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::memory::{Address, ReadMemory};

/// A process visible to the current user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

/// List running processes
pub fn list_processes() -> Result<Vec<ProcessEntry>> {
    platform::list_processes()
}

/// Compare a process name against a title's process name.
///
/// Case-insensitive, and a trailing `.exe` on either side is ignored.
pub fn process_name_matches(candidate: &str, wanted: &str) -> bool {
    fn stem(name: &str) -> &str {
        let len = name.len();
        if len > 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".exe")
        {
            &name[..len - 4]
        } else {
            name
        }
    }
    stem(candidate).eq_ignore_ascii_case(stem(wanted))
}

/// An open, read-only handle to a running process and its main module
pub struct AttachedProcess {
    pid: u32,
    name: String,
    base_address: Address,
    module_size: u64,
    handle: platform::RawProcess,
}

impl AttachedProcess {
    /// Open a process by id
    pub fn open(pid: u32) -> Result<Self> {
        let name = list_processes()?
            .into_iter()
            .find(|p| p.pid == pid)
            .map(|p| p.name)
            .ok_or_else(|| Error::ProcessNotFound(format!("pid {pid}")))?;
        Self::open_entry(ProcessEntry { pid, name })
    }

    /// Open the first running process whose name matches any of `names`
    pub fn find_by_names(names: &[&str]) -> Result<Self> {
        let entry = list_processes()?
            .into_iter()
            .find(|p| names.iter().any(|n| process_name_matches(&p.name, n)))
            .ok_or_else(|| Error::ProcessNotFound(names.join(", ")))?;
        Self::open_entry(entry)
    }

    fn open_entry(entry: ProcessEntry) -> Result<Self> {
        debug!("Opening process {} (pid {})", entry.name, entry.pid);
        let (handle, module) = platform::RawProcess::open(entry.pid, &entry.name)?;

        info!(
            "Attached to {} (pid {}), module base {}, size 0x{:X}",
            entry.name, entry.pid, module.base, module.size
        );

        Ok(Self {
            pid: entry.pid,
            name: entry.name,
            base_address: module.base,
            module_size: module.size,
            handle,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for AttachedProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachedProcess")
            .field("pid", &self.pid)
            .field("name", &self.name)
            .field("base_address", &self.base_address)
            .field("module_size", &self.module_size)
            .finish()
    }
}

impl ReadMemory for AttachedProcess {
    fn read_bytes(&self, address: Address, len: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        self.handle
            .read(address, &mut buffer)
            .map_err(|message| Error::read_fault(address, len, message))?;
        Ok(buffer)
    }

    fn base_address(&self) -> Address {
        self.base_address
    }

    fn module_size(&self) -> u64 {
        self.module_size
    }
}

/// Address range of a loaded module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ModuleRange {
    pub base: Address,
    pub size: u64,
}
