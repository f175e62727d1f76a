use std::ffi::c_void;
use std::mem::size_of;

use windows::Win32::Foundation::{CloseHandle, FALSE, HANDLE};
use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW, Module32NextW, PROCESSENTRY32W,
    Process32FirstW, Process32NextW, TH32CS_SNAPMODULE, TH32CS_SNAPMODULE32, TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_VM_READ,
};

use super::{ModuleRange, ProcessEntry, process_name_matches};
use crate::error::{Error, Result};
use crate::memory::Address;

fn wide_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    String::from_utf16_lossy(&wide[..len])
}

/// Closes the wrapped handle on drop
struct Snapshot(HANDLE);

impl Drop for Snapshot {
    fn drop(&mut self) {
        // SAFETY: the handle came from CreateToolhelp32Snapshot and is closed once.
        let _ = unsafe { CloseHandle(self.0) };
    }
}

pub(super) fn list_processes() -> Result<Vec<ProcessEntry>> {
    // SAFETY: CreateToolhelp32Snapshot has no preconditions; the handle is owned by Snapshot.
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
        .map(Snapshot)
        .map_err(|e| Error::ProcessOpenFailed(format!("process snapshot failed: {e}")))?;

    let mut entry = PROCESSENTRY32W {
        dwSize: size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    let mut processes = Vec::new();
    // SAFETY: entry.dwSize is initialized as the API requires.
    if unsafe { Process32FirstW(snapshot.0, &mut entry) }.is_err() {
        return Ok(processes);
    }
    loop {
        processes.push(ProcessEntry {
            pid: entry.th32ProcessID,
            name: wide_to_string(&entry.szExeFile),
        });
        // SAFETY: same snapshot and entry as above.
        if unsafe { Process32NextW(snapshot.0, &mut entry) }.is_err() {
            break;
        }
    }
    Ok(processes)
}

fn find_module(pid: u32, name: &str) -> Result<ModuleRange> {
    // SAFETY: CreateToolhelp32Snapshot has no preconditions; the handle is owned by Snapshot.
    let snapshot =
        unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid) }
            .map(Snapshot)
            .map_err(|e| Error::ProcessOpenFailed(format!("module snapshot failed: {e}")))?;

    let mut entry = MODULEENTRY32W {
        dwSize: size_of::<MODULEENTRY32W>() as u32,
        ..Default::default()
    };

    let mut first: Option<ModuleRange> = None;
    // SAFETY: entry.dwSize is initialized as the API requires.
    let mut more = unsafe { Module32FirstW(snapshot.0, &mut entry) }.is_ok();
    while more {
        let range = ModuleRange {
            base: Address::new(entry.modBaseAddr as u64),
            size: u64::from(entry.modBaseSize),
        };
        if process_name_matches(&wide_to_string(&entry.szModule), name) {
            return Ok(range);
        }
        // The first module of the snapshot is the executable
        first.get_or_insert(range);
        // SAFETY: same snapshot and entry as above.
        more = unsafe { Module32NextW(snapshot.0, &mut entry) }.is_ok();
    }

    first.ok_or_else(|| Error::ProcessOpenFailed(format!("no modules listed for pid {pid}")))
}

pub(super) struct RawProcess {
    handle: HANDLE,
}

// SAFETY: process handles are valid from any thread and ReadProcessMemory does
// not mutate shared state on our side.
unsafe impl Send for RawProcess {}
unsafe impl Sync for RawProcess {}

impl RawProcess {
    pub(super) fn open(pid: u32, name: &str) -> Result<(Self, ModuleRange)> {
        // SAFETY: OpenProcess returns an owned handle or an error.
        let handle = unsafe {
            OpenProcess(
                PROCESS_VM_READ | PROCESS_QUERY_LIMITED_INFORMATION,
                FALSE,
                pid,
            )
        }
        .map_err(|e| Error::ProcessOpenFailed(format!("{name} (pid {pid}): {e}")))?;
        let process = Self { handle };

        let module = find_module(pid, name)?;
        Ok((process, module))
    }

    pub(super) fn read(&self, address: Address, buffer: &mut [u8]) -> std::result::Result<(), String> {
        let mut read = 0usize;
        // SAFETY: buffer is a valid writable slice of buffer.len() bytes.
        unsafe {
            ReadProcessMemory(
                self.handle,
                address.get() as *const c_void,
                buffer.as_mut_ptr().cast(),
                buffer.len(),
                Some(&mut read),
            )
        }
        .map_err(|e| e.to_string())?;

        if read != buffer.len() {
            return Err(format!("partial read of {read} bytes"));
        }
        Ok(())
    }
}

impl Drop for RawProcess {
    fn drop(&mut self) {
        // SAFETY: the handle was returned by OpenProcess and is closed once.
        let _ = unsafe { CloseHandle(self.handle) };
    }
}
