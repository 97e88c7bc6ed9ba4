/*
   Copyright (C) 2012-2021 by László Nagy

   This file is part of tracebear.

   tracebear is a tool to generate a compilation database for clang tooling.

   tracebear is free software: you can redistribute it and/or modify
   it under the terms of the GNU General Public License as published by
   the Free Software Foundation, either version 3 of the License, or
   (at your option) any later version.

   tracebear is distributed in the hope that it will be useful,
   but WITHOUT ANY WARRANTY; without even the implied warranty of
   MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
   GNU General Public License for more details.

   You should have received a copy of the GNU General Public License
   along with tracebear.  If not, see <https://www.gnu.org/licenses/>.
*/

use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, warn};

use crate::Execution;

/// File name prefix of the execution reports, same as in the preloaded
/// library.
pub const TRACE_FILE_PREFIX: &str = "execution.";

/// Parse one execution report written by the interception library.
///
/// A corrupt report is logged and swallowed; one bad file must never stop
/// the processing of the remaining ones.
pub fn parse_exec_trace(filename: &Path) -> Option<Execution> {
    debug!("parse exec trace file: {}", filename.display());
    match read_execution(filename) {
        Ok(execution) => Some(execution),
        Err(error) => {
            warn!(
                "parse exec trace file: {} failed: {}",
                filename.display(),
                error
            );
            None
        }
    }
}

fn read_execution(filename: &Path) -> io::Result<Execution> {
    let mut handle = File::open(filename)?;

    let cwd = read_string(&mut handle)?;
    let cmd = read_string_list(&mut handle)?;

    Ok(Execution {
        cwd: PathBuf::from(cwd),
        cmd,
    })
}

fn read_length(handle: &mut impl Read, expected_type: &[u8; 3]) -> io::Result<u32> {
    let mut type_bytes = [0u8; 3];
    handle.read_exact(&mut type_bytes)?;
    if &type_bytes != expected_type {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "field type {:?} is not the expected {:?}",
                type_bytes, expected_type
            ),
        ));
    }
    handle.read_u32::<LittleEndian>()
}

fn read_string(handle: &mut impl Read) -> io::Result<String> {
    let length = read_length(handle, b"str")?;
    let mut value_bytes = vec![0u8; length as usize];
    handle.read_exact(&mut value_bytes)?;
    String::from_utf8(value_bytes)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
}

fn read_string_list(handle: &mut impl Read) -> io::Result<Vec<String>> {
    let count = read_length(handle, b"lst")?;
    (0..count).map(|_| read_string(handle)).collect()
}

/// List the execution reports of a trace directory, oldest first.
///
/// Entries without the report prefix and entries which are not regular
/// files are skipped silently.
pub fn exec_trace_files(directory: &Path) -> io::Result<Vec<PathBuf>> {
    use std::os::unix::fs::MetadataExt;

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        if !entry
            .file_name()
            .to_string_lossy()
            .starts_with(TRACE_FILE_PREFIX)
        {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(_) => continue,
        };
        if !metadata.file_type().is_file() {
            continue;
        }
        candidates.push((metadata.ctime(), metadata.ctime_nsec(), entry.path()));
    }

    candidates.sort();
    Ok(candidates.into_iter().map(|(_, _, path)| path).collect())
}
