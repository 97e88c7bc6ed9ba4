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

use std::{error::Error, io, process::Command};

use log::debug;

#[cfg(test)]
use mockall::automock;

/// Recovers the compiler call hidden behind an MPI compiler wrapper.
///
/// Trait seam so the command splitter can be exercised without spawning
/// processes.
#[cfg_attr(test, automock)]
pub trait MpiResolver {
    fn resolve(&self, wrapper: &str) -> Result<Vec<String>, Box<dyn Error>>;
}

/// Asks the wrapper itself how it would have invoked the underlying
/// compiler. OpenMPI answers `--showme`, most other implementations
/// answer `-show`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryResolver;

impl MpiResolver for QueryResolver {
    fn resolve(&self, wrapper: &str) -> Result<Vec<String>, Box<dyn Error>> {
        for query_flag in &["-show", "--showme"] {
            if let Ok(Some(line)) = run_query(wrapper, query_flag) {
                if let Ok(command) = shell::split(&line) {
                    return Ok(command);
                }
            }
        }
        Err(format!("could not determine the MPI flags of {}", wrapper))?
    }
}

/// Runs one query and reports the first line of its output, or `None`
/// when the wrapper exited with failure or stayed silent.
fn run_query(wrapper: &str, query_flag: &str) -> io::Result<Option<String>> {
    debug!("exec command {} {}", wrapper, query_flag);
    let output = Command::new(wrapper).arg(query_flag).output()?;
    if !output.status.success() {
        return Ok(None);
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let first = stdout
        .lines()
        .chain(stderr.lines())
        .next()
        .map(String::from);
    Ok(first)
}
