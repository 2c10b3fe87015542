// This file is part of boardctl, an application to access registers and DMA regions of memory mapped hardware boards.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// boardctl is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// boardctl is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Device name resolution.
//!
//! A device is named either by a device descriptor or by an alias.
//!
//! # Device Descriptors
//!
//! `(kind[:address][?key=value[&key=value...]])`, for example
//! `(file:/srv/boards/llrf?map=llrf.map)`. The kind selects the backend (see
//! [`crate::backends`]), the address and parameters are interpreted by that backend. Every bundled
//! backend needs a `map` parameter naming the register map file.
//!
//! # Aliases and dmap files
//!
//! Any other name is looked up in a dmap file:
//!
//! ```text
//! # alias   uri                            map file
//! LLRF      (file:/srv/boards/llrf)        llrf.map
//! TEST      (dummy?map=test.map)
//! ```
//!
//! A map file column is resolved relative to the dmap file's directory and only used when the
//! descriptor has no `map` parameter of its own. Without an explicit dmap file, the working
//! directory is searched, see [`find_dmap_file`].

use crate::config;
use crate::error::BoardError;
use crate::system_io::{fs_read, fs_read_dir};
use log::{debug, trace, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub kind: String,
    pub address: String,
    pub parameters: BTreeMap<String, String>,
}

impl DeviceDescriptor {
    pub fn is_descriptor(name: &str) -> bool {
        name.starts_with('(') && name.ends_with(')')
    }

    pub fn parse(text: &str) -> Result<Self, BoardError> {
        let inner = text
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .ok_or_else(|| {
                BoardError::Descriptor(format!(
                    "{text:?} is not a device descriptor, expected \"(kind:address?key=value)\""
                ))
            })?;

        let (head, query) = match inner.split_once('?') {
            Some((head, query)) => (head, Some(query)),
            None => (inner, None),
        };
        let (kind, address) = match head.split_once(':') {
            Some((kind, address)) => (kind, address),
            None => (head, ""),
        };
        if kind.is_empty() {
            return Err(BoardError::Descriptor(format!(
                "{text:?} does not name a backend kind"
            )));
        }

        let mut parameters = BTreeMap::new();
        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                BoardError::Descriptor(format!(
                    "parameter {pair:?} in {text:?} is not of the form key=value"
                ))
            })?;
            if key.is_empty() {
                return Err(BoardError::Descriptor(format!(
                    "parameter {pair:?} in {text:?} has an empty key"
                )));
            }
            if parameters.insert(key.to_string(), value.to_string()).is_some() {
                return Err(BoardError::Descriptor(format!(
                    "parameter {key:?} given twice in {text:?}"
                )));
            }
        }

        Ok(DeviceDescriptor {
            kind: kind.to_string(),
            address: address.to_string(),
            parameters,
        })
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Path of the register map file, from the `map` parameter.
    pub fn map_file(&self) -> Result<PathBuf, BoardError> {
        self.parameter(config::MAP_PARAMETER)
            .filter(|m| !m.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| {
                BoardError::Descriptor(format!(
                    "{self} has no map file. Add a \"{}\" parameter or a map file column in the \
                    dmap file.",
                    config::MAP_PARAMETER
                ))
            })
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.kind)?;
        if !self.address.is_empty() {
            write!(f, ":{}", self.address)?;
        }
        for (index, (key, value)) in self.parameters.iter().enumerate() {
            let sep = if index == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        write!(f, ")")
    }
}

/// One line of a dmap file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DMapEntry {
    pub alias: String,
    pub uri: String,
    /// Map file column as written, possibly relative to the dmap file.
    pub map_file: Option<String>,
    /// Directory of the dmap file the entry came from.
    pub base_dir: PathBuf,
}

impl DMapEntry {
    /// Descriptor for this entry, with the map file column merged in.
    pub fn descriptor(&self) -> Result<DeviceDescriptor, BoardError> {
        if self.uri.starts_with("sdm://") {
            return Err(BoardError::Descriptor(format!(
                "{}: sdm URIs are not supported, use a device descriptor such as \
                \"(file:/path/to/bars?map=board.map)\"",
                self.uri
            )));
        }
        let mut descriptor = DeviceDescriptor::parse(&self.uri)?;
        if let Some(map_file) = &self.map_file {
            if descriptor.parameter(config::MAP_PARAMETER).is_none() {
                let resolved = self.base_dir.join(map_file);
                descriptor.parameters.insert(
                    config::MAP_PARAMETER.to_string(),
                    resolved.to_string_lossy().into_owned(),
                );
            }
        }
        Ok(descriptor)
    }
}

pub fn parse_dmap(file: &Path, text: &str) -> Result<Vec<DMapEntry>, BoardError> {
    let base_dir = file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let mut entries: Vec<DMapEntry> = Vec::new();
    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('@') {
            continue;
        }
        let columns: Vec<&str> = line.split_whitespace().collect();
        let (alias, uri, map_file) = match columns.as_slice() {
            [alias, uri] => (alias, uri, None),
            [alias, uri, map] => (alias, uri, Some(map.to_string())),
            _ => {
                return Err(BoardError::DMapFile {
                    file: file.into(),
                    line: index + 1,
                    msg: format!(
                        "expected \"alias uri [map file]\", found {} columns",
                        columns.len()
                    ),
                });
            }
        };
        if entries.iter().any(|e| e.alias == *alias) {
            return Err(BoardError::DMapFile {
                file: file.into(),
                line: index + 1,
                msg: format!("alias {alias} is declared twice"),
            });
        }
        entries.push(DMapEntry {
            alias: alias.to_string(),
            uri: uri.to_string(),
            map_file,
            base_dir: base_dir.clone(),
        });
    }
    trace!("{} entries in {file:?}", entries.len());
    Ok(entries)
}

pub fn load_dmap_file(file: &Path) -> Result<Vec<DMapEntry>, BoardError> {
    parse_dmap(file, &fs_read(file)?)
}

/// Look for a dmap file in `dir`.
///
/// # Returns: `Result<Option<PathBuf>, BoardError>`
/// * `Ok(None)` - No dmap file in the directory
/// * `Ok(Some(PathBuf))` - The only dmap file, or the `CommandLineTools.dmap` among several
/// * `Err(BoardError::Argument)` - Several dmap files and none of them is preferred
pub fn find_dmap_file(dir: &Path) -> Result<Option<PathBuf>, BoardError> {
    let mut dmap_files: Vec<PathBuf> = fs_read_dir(dir)?
        .into_iter()
        .filter(|p| p.extension().is_some_and(|e| e == config::DMAP_FILE_EXTENSION))
        .collect();
    dmap_files.sort();

    match dmap_files.len() {
        0 => Ok(None),
        1 => Ok(dmap_files.pop()),
        _ => {
            let preferred = dmap_files
                .into_iter()
                .find(|p| p.file_stem().is_some_and(|s| s == config::PREFERRED_DMAP_STEM));
            match preferred {
                Some(p) => {
                    warn!("Several dmap files found, using {p:?}");
                    Ok(Some(p))
                }
                None => Err(BoardError::Argument(format!(
                    "Found more than one dmap file. Name one of them '{}.{}' (or create a \
                    symlink) so I know which one to take.",
                    config::PREFERRED_DMAP_STEM,
                    config::DMAP_FILE_EXTENSION
                ))),
            }
        }
    }
}

/// The dmap file to use: the explicit one if given, else the one found in `search_dir`.
pub fn select_dmap_file(
    explicit: Option<&Path>,
    search_dir: &Path,
) -> Result<Option<PathBuf>, BoardError> {
    match explicit {
        Some(path) => Ok(Some(path.to_path_buf())),
        None => find_dmap_file(search_dir),
    }
}

/// Turn a device name given by the user into a descriptor.
///
/// # Arguments
///
/// * `name` - A device descriptor or a dmap alias
/// * `dmap_file` - The dmap file for alias lookup, if any was found or given
pub fn resolve_device(
    name: &str,
    dmap_file: Option<&Path>,
) -> Result<DeviceDescriptor, BoardError> {
    if DeviceDescriptor::is_descriptor(name) {
        debug!("{name} is a device descriptor");
        return DeviceDescriptor::parse(name);
    }
    if name.starts_with("sdm://") {
        return Err(BoardError::Descriptor(format!(
            "{name}: sdm URIs are not supported, use a device descriptor"
        )));
    }

    let dmap_file = dmap_file.ok_or_else(|| {
        BoardError::Argument(format!(
            "No dmap file found to resolve alias name '{name}'. Provide a dmap file or use a \
            device descriptor!"
        ))
    })?;
    debug!("Resolving alias {name} with {dmap_file:?}");
    let entries = load_dmap_file(dmap_file)?;
    let entry = entries.iter().find(|e| e.alias == name).ok_or_else(|| {
        BoardError::Argument(format!("Unknown device alias '{name}' in {dmap_file:?}"))
    })?;
    entry.descriptor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;
    use std::fs;

    #[rstest]
    #[case::kind_only("(dummy)", "dummy", "", &[])]
    #[case::with_address("(file:/srv/llrf)", "file", "/srv/llrf", &[])]
    #[case::with_parameters(
        "(file:/srv/llrf?map=llrf.map&mode=ro)",
        "file",
        "/srv/llrf",
        &[("map", "llrf.map"), ("mode", "ro")]
    )]
    #[case::parameters_without_address("(dummy?map=x.map)", "dummy", "", &[("map", "x.map")])]
    fn descriptors_parse(
        #[case] text: &str,
        #[case] kind: &str,
        #[case] address: &str,
        #[case] parameters: &[(&str, &str)],
    ) {
        let descriptor = DeviceDescriptor::parse(text).expect("valid descriptor");
        assert_eq!(descriptor.kind, kind);
        assert_eq!(descriptor.address, address);
        let expected: BTreeMap<String, String> = parameters
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(descriptor.parameters, expected);
        assert_eq!(descriptor.to_string(), text);
    }

    #[gtest]
    #[rstest]
    #[case::no_parens("dummy", "is not a device descriptor")]
    #[case::no_kind("(:x)", "does not name a backend kind")]
    #[case::bad_parameter("(dummy?map)", "is not of the form key=value")]
    #[case::duplicate_parameter("(dummy?map=a&map=b)", "given twice")]
    fn bad_descriptors_fail(#[case] text: &str, #[case] message: &str) {
        assert_that!(
            DeviceDescriptor::parse(text),
            err(displays_as(contains_substring(message)))
        );
    }

    #[test]
    fn dmap_map_column_is_relative_to_dmap_dir() {
        let entries = parse_dmap(
            Path::new("/etc/boards/devices.dmap"),
            "# comment\n@LOAD_LIB libfoo.so\nLLRF (file:/srv/llrf) llrf.map\nTEST (dummy?map=/abs/test.map) other.map\n",
        )
        .expect("valid dmap");
        assert_eq!(entries.len(), 2);

        let llrf = entries[0].descriptor().expect("llrf descriptor");
        assert_eq!(llrf.parameter("map"), Some("/etc/boards/llrf.map"));

        let test = entries[1].descriptor().expect("test descriptor");
        assert_eq!(test.parameter("map"), Some("/abs/test.map"));
    }

    #[gtest]
    fn dmap_with_wrong_column_count_fails() {
        assert_that!(
            parse_dmap(Path::new("x.dmap"), "ONLYALIAS\n"),
            err(displays_as(contains_substring("line 1")))
        );
    }

    #[rstest]
    #[case::none(&[], None)]
    #[case::single(&["devices.dmap", "notes.txt"], Some("devices.dmap"))]
    #[case::preferred(&["a.dmap", "CommandLineTools.dmap", "z.dmap"], Some("CommandLineTools.dmap"))]
    fn dmap_file_discovery(#[case] files: &[&str], #[case] expected: Option<&str>) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        for file in files {
            fs::write(dir.path().join(file), "").expect("failed to create file");
        }
        let found = find_dmap_file(dir.path()).expect("discovery should succeed");
        assert_eq!(found, expected.map(|f| dir.path().join(f)));
    }

    #[gtest]
    fn ambiguous_dmap_files_fail() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        fs::write(dir.path().join("a.dmap"), "").expect("failed to create file");
        fs::write(dir.path().join("b.dmap"), "").expect("failed to create file");
        assert_that!(
            find_dmap_file(dir.path()),
            err(displays_as(contains_substring("Found more than one dmap file")))
        );
    }

    #[gtest]
    fn alias_without_dmap_file_names_alias() {
        assert_that!(
            resolve_device("LLRF", None),
            err(displays_as(contains_substring(
                "No dmap file found to resolve alias name 'LLRF'"
            )))
        );
    }

    #[test]
    fn alias_is_resolved_through_dmap_file() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let dmap = dir.path().join("devices.dmap");
        fs::write(&dmap, "LLRF (file:/srv/llrf) llrf.map\n").expect("failed to write dmap");

        let descriptor = resolve_device("LLRF", Some(&dmap)).expect("alias resolves");
        assert_eq!(descriptor.kind, "file");
        assert_eq!(
            descriptor.map_file().expect("map file set"),
            dir.path().join("llrf.map")
        );

        assert!(resolve_device("OTHER", Some(&dmap)).is_err());
    }
}
