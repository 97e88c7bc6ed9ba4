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

use std::path::{Path, PathBuf};

use crate::{normalize_path, semantic::Compilation};

/// Filters compilation entries by the location of their source file.
///
/// Without include directories every entry is wanted; the exclude
/// directories veto entries the includes let through.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    include: Vec<PathBuf>,
    exclude: Vec<PathBuf>,
}

impl ContentFilter {
    /// `root` anchors the relative directory arguments, it is the working
    /// directory the operator invoked the tool from.
    pub fn new(include: &[PathBuf], exclude: &[PathBuf], root: &Path) -> Self {
        let make_absolute = |directory: &PathBuf| -> PathBuf {
            if directory.is_absolute() {
                directory.clone()
            } else {
                normalize_path(&root.join(directory))
            }
        };

        Self {
            include: include.iter().map(make_absolute).collect(),
            exclude: exclude.iter().map(make_absolute).collect(),
        }
    }

    pub fn matches(&self, candidate: &Compilation) -> bool {
        let source = &candidate.source;

        let needed = self.include.is_empty()
            || self
                .include
                .iter()
                .any(|directory| source.starts_with(directory));
        let rejected = self
            .exclude
            .iter()
            .any(|directory| source.starts_with(directory));

        needed && !rejected
    }
}
