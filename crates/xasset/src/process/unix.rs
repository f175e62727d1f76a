use process_memory::{CopyAddress, Pid, ProcessHandle, TryIntoProcessHandle};
use sysinfo::System;

use super::{ModuleRange, ProcessEntry, process_name_matches};
use crate::error::{Error, Result};
use crate::memory::Address;

/// Last component of a Unix or Windows style path
fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Name a process is matched by.
///
/// Wine and Proton report a truncated `comm`, so the first command line
/// argument is preferred when it is available.
fn display_name(process: &sysinfo::Process) -> String {
    process
        .cmd()
        .first()
        .map(|arg| file_name(&arg.to_string_lossy()).to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| process.name().to_string_lossy().into_owned())
}

pub(super) fn list_processes() -> Result<Vec<ProcessEntry>> {
    let mut system = System::new_all();
    system.refresh_all();

    let mut processes: Vec<ProcessEntry> = system
        .processes()
        .values()
        .filter(|p| p.thread_kind().is_none())
        .map(|p| ProcessEntry {
            pid: p.pid().as_u32(),
            name: display_name(p),
        })
        .collect();
    processes.sort_by_key(|p| p.pid);
    Ok(processes)
}

/// Find the mapped range of `module` in the text of `/proc/<pid>/maps`.
///
/// The range spans every mapping backed by the module file.
pub(super) fn module_range(maps: &str, module: &str) -> Option<ModuleRange> {
    let mut range: Option<(u64, u64)> = None;

    for line in maps.lines() {
        let mut fields = line.splitn(6, ' ');
        let Some(span) = fields.next() else { continue };
        let path = fields.nth(4).map(str::trim).unwrap_or("");
        if path.is_empty() || !process_name_matches(file_name(path), module) {
            continue;
        }

        let Some((start, end)) = span.split_once('-') else {
            continue;
        };
        let (Ok(start), Ok(end)) = (u64::from_str_radix(start, 16), u64::from_str_radix(end, 16))
        else {
            continue;
        };

        range = Some(match range {
            Some((lo, hi)) => (lo.min(start), hi.max(end)),
            None => (start, end),
        });
    }

    range.map(|(start, end)| ModuleRange {
        base: Address::new(start),
        size: end - start,
    })
}

pub(super) struct RawProcess {
    handle: ProcessHandle,
}

impl RawProcess {
    pub(super) fn open(pid: u32, name: &str) -> Result<(Self, ModuleRange)> {
        let maps_path = format!("/proc/{pid}/maps");
        let maps = std::fs::read_to_string(&maps_path).map_err(|e| {
            Error::ProcessOpenFailed(format!("{maps_path}: {e}. Do you have permission?"))
        })?;
        let module = module_range(&maps, name).ok_or_else(|| {
            Error::ProcessOpenFailed(format!("module {name} is not mapped in pid {pid}"))
        })?;

        let handle = (pid as Pid)
            .try_into_process_handle()
            .map_err(|e| Error::ProcessOpenFailed(format!("{name} (pid {pid}): {e}")))?;

        Ok((Self { handle }, module))
    }

    pub(super) fn read(&self, address: Address, buffer: &mut [u8]) -> std::result::Result<(), String> {
        let address = usize::try_from(address.get()).map_err(|e| e.to_string())?;
        self.handle
            .copy_address(address, buffer)
            .map_err(|e| e.to_string())
    }
}
