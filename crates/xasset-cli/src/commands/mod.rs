//! CLI command implementations.

pub mod export;
pub mod list;
pub mod pools;
pub mod scan;
pub mod titles;

use anyhow::{Result, anyhow, bail};
use xasset::{AttachedProcess, ExtractorConfig, ReadMemory, TitleDescriptor, title};

use crate::cli::{SelectionArgs, TargetArgs};

/// Title forced with `--title`, if any
fn requested_title(target: &TargetArgs) -> Result<Option<&'static TitleDescriptor>> {
    target
        .title
        .as_deref()
        .map(|id| {
            title::find_by_id(id)
                .ok_or_else(|| anyhow!("unknown title '{id}' (see `xasset titles`)"))
        })
        .transpose()
}

/// Open the target process without deciding which title it is
pub fn open_process(target: &TargetArgs) -> Result<AttachedProcess> {
    let process = match (target.pid, requested_title(target)?) {
        (Some(pid), _) => AttachedProcess::open(pid)?,
        (None, Some(title)) => AttachedProcess::find_by_names(title.process_names)?,
        (None, None) => AttachedProcess::find_by_names(&title::all_process_names())?,
    };

    eprintln!(
        "Found process {} (PID: {}, Base: 0x{:X}, Size: 0x{:X})",
        process.name(),
        process.pid(),
        process.base_address(),
        process.module_size()
    );
    Ok(process)
}

/// Open the target process and pick its title
pub fn attach(target: &TargetArgs) -> Result<(AttachedProcess, &'static TitleDescriptor)> {
    let process = open_process(target)?;
    let title = match requested_title(target)? {
        Some(title) => title,
        None => title::find_by_process_name(process.name()).ok_or_else(|| {
            anyhow!(
                "{} is not a known title process; pass --title",
                process.name()
            )
        })?,
    };
    eprintln!("Title: {}", title.name);
    Ok((process, title))
}

/// Session config for `selection`, rejecting types `title` cannot export
fn extractor_config(
    title: &TitleDescriptor,
    selection: &SelectionArgs,
) -> Result<ExtractorConfig> {
    for name in &selection.types {
        let ty = title
            .asset_type_by_name(name)
            .ok_or_else(|| anyhow!("{} has no asset type '{name}'", title.name))?;
        if title.handler(ty.index).is_none() {
            bail!("{} assets of {} cannot be exported", ty.name, title.name);
        }
    }

    let mut builder = ExtractorConfig::builder()
        .jobs(selection.jobs)
        .asset_types(selection.types.iter().cloned());
    if let Some(filter) = &selection.filter {
        builder = builder.name_filter(filter.clone());
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use xasset::title::modern_warfare::MODERN_WARFARE;

    use super::*;

    #[test]
    fn test_requested_title() {
        let target = TargetArgs {
            pid: None,
            title: Some("BO2".to_string()),
        };
        assert_eq!(requested_title(&target).unwrap().unwrap().id, "bo2");

        let unknown = TargetArgs {
            pid: None,
            title: Some("quake".to_string()),
        };
        assert!(requested_title(&unknown).is_err());
    }

    #[test]
    fn test_extractor_config_from_selection() {
        let selection = SelectionArgs {
            types: vec!["RawFile".to_string()],
            filter: Some("maps/".to_string()),
            jobs: 0,
        };
        let config = extractor_config(&MODERN_WARFARE, &selection).unwrap();
        assert!(config.jobs.is_none());
        assert!(config.wants_type("rawfile"));
        assert!(!config.wants_type("xmodel"));
        assert!(config.wants_name("maps/mp/_load.gsc"));
    }

    #[test]
    fn test_extractor_config_rejects_unknown_types() {
        let unknown = SelectionArgs {
            types: vec!["lightmap_atlas".to_string()],
            filter: None,
            jobs: 0,
        };
        assert!(extractor_config(&MODERN_WARFARE, &unknown).is_err());

        // Declared, but no handler
        let unsupported = SelectionArgs {
            types: vec!["xmodel".to_string()],
            filter: None,
            jobs: 0,
        };
        assert!(extractor_config(&MODERN_WARFARE, &unsupported).is_err());
    }
}
