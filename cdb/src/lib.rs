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

use std::path::{Component, Path, PathBuf};

pub mod database;
pub mod filter;
pub mod mpi;
pub mod semantic;
pub mod source;
pub mod tools;
pub mod trace;

/// One intercepted process: where it ran and what it ran.
///
/// `cmd[0]` is the executable name as invoked, which may or may not be a
/// path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Execution {
    pub cwd: PathBuf,
    pub cmd: Vec<String>,
}

/// The language a compiler call was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Cxx,
    Fortran,
    Other,
}

/// Lexical path cleanup: drops `.` components, folds `..` into a preceding
/// normal component and squeezes redundant separators. Symlinks are not
/// resolved, so two spellings of the same file through different links stay
/// different.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.last() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) => {}
                _ => normalized.push(component),
            },
            _ => normalized.push(component),
        }
    }

    if normalized.is_empty() {
        PathBuf::from(".")
    } else {
        normalized.iter().collect()
    }
}
