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

use crate::tools::basename;

/// Classify a file name by its extension and return the presumed source
/// language, or `None` when the name does not look like a source file at
/// all.
///
/// `c_compiler` tells whether the surrounding compiler call was a C
/// compiler, which decides the language of the extensions shared between C
/// and C++.
pub fn classify_source(filename: &str, c_compiler: bool) -> Option<&'static str> {
    let name = basename(filename);
    let extension = match name.rfind('.') {
        // a name which is only an extension is a hidden file, not a source
        Some(0) | None => return None,
        Some(index) => &name[index..],
    };

    match extension {
        ".c" => Some(if c_compiler { "c" } else { "c++" }),
        ".i" => Some(if c_compiler {
            "c-cpp-output"
        } else {
            "c++-cpp-output"
        }),
        ".ii" => Some("c++-cpp-output"),
        ".m" => Some("objective-c"),
        ".mi" => Some("objective-c-cpp-output"),
        ".mm" => Some("objective-c++"),
        ".mii" => Some("objective-c++-cpp-output"),
        ".C" | ".cc" | ".CC" | ".cp" | ".cpp" | ".cxx" | ".c++" | ".C++" | ".txx" => Some("c++"),
        ".s" | ".S" | ".sx" | ".asm" => Some("assembly"),
        ".f95" | ".F95" | ".f90" | ".F90" | ".f" | ".F" | ".FOR" | ".f77" | ".fc" | ".for"
        | ".ftn" | ".fpp" => Some("fortran"),
        _ => None,
    }
}
