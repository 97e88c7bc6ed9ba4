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

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Known C/C++ compiler wrapper name patterns.
    static ref PATTERN_WRAPPER: Regex = Regex::new(r"^(distcc|ccache)$").unwrap();

    // Known MPI compiler wrapper name patterns.
    static ref PATTERN_MPI_WRAPPER: Regex =
        Regex::new(r"^mpi(cc|cxx|CC|c\+\+|fort|f77|f90)$").unwrap();

    // Known C compiler executable name patterns.
    static ref PATTERNS_CC: Vec<Regex> = vec![
        Regex::new(r"^([^-]*-)*[mg]cc(-?\d+(\.\d+){0,2})?$").unwrap(),
        Regex::new(r"^([^-]*-)*clang(-\d+(\.\d+){0,2})?$").unwrap(),
        Regex::new(r"^(|i)cc$").unwrap(),
        Regex::new(r"^(g|)xlc$").unwrap(),
    ];

    // Known C++ compiler executable name patterns.
    static ref PATTERNS_CXX: Vec<Regex> = vec![
        Regex::new(r"^(c\+\+|cxx|CC)$").unwrap(),
        Regex::new(r"^([^-]*-)*[mg]\+\+(-?\d+(\.\d+){0,2})?$").unwrap(),
        Regex::new(r"^([^-]*-)*clang\+\+(-\d+(\.\d+){0,2})?$").unwrap(),
        Regex::new(r"^icpc$").unwrap(),
        Regex::new(r"^(g|)xl(C|c\+\+)$").unwrap(),
    ];

    // Known Fortran compiler executable name patterns.
    // GFortran, Intel Fortran and PGI compilers.
    static ref PATTERNS_FORTRAN: Vec<Regex> = vec![
        Regex::new(r"^(f95)$").unwrap(),
        Regex::new(r"^(gfortran)$").unwrap(),
        Regex::new(r"^(ifort)$").unwrap(),
        Regex::new(r"^(pg)(f77|f90|f95|fortran)$").unwrap(),
    ];
}

/// Last path component of an executable, as classification works on
/// basenames only.
pub(crate) fn basename(executable: &str) -> &str {
    Path::new(executable)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(executable)
}

/// Decides whether an executable name is a compiler (and which kind).
///
/// The operator can extend the built-in name patterns with concrete
/// program names, or suppress the patterns entirely and rely on the given
/// names alone.
#[derive(Debug, Clone, Default)]
pub struct Tools {
    only_use: bool,
    c_compilers: Vec<String>,
    cxx_compilers: Vec<String>,
    fortran_compilers: Vec<String>,
}

impl Tools {
    pub fn new(
        only_use: bool,
        c_compilers: &[String],
        cxx_compilers: &[String],
        fortran_compilers: &[String],
    ) -> Self {
        let strip = |compilers: &[String]| -> Vec<String> {
            compilers
                .iter()
                .map(|compiler| basename(compiler).to_string())
                .collect()
        };

        Self {
            only_use,
            c_compilers: strip(c_compilers),
            cxx_compilers: strip(cxx_compilers),
            fortran_compilers: strip(fortran_compilers),
        }
    }

    pub fn is_wrapper(executable: &str) -> bool {
        PATTERN_WRAPPER.is_match(executable)
    }

    pub fn is_mpi_wrapper(executable: &str) -> bool {
        PATTERN_MPI_WRAPPER.is_match(executable)
    }

    pub fn is_c_compiler(&self, executable: &str) -> bool {
        self.matches(executable, &self.c_compilers, &PATTERNS_CC)
    }

    pub fn is_cxx_compiler(&self, executable: &str) -> bool {
        self.matches(executable, &self.cxx_compilers, &PATTERNS_CXX)
    }

    pub fn is_fortran_compiler(&self, executable: &str) -> bool {
        self.matches(executable, &self.fortran_compilers, &PATTERNS_FORTRAN)
    }

    fn matches(&self, executable: &str, compilers: &[String], patterns: &[Regex]) -> bool {
        let use_match = compilers.iter().any(|compiler| compiler == executable);
        if self.only_use {
            use_match
        } else {
            use_match || patterns.iter().any(|pattern| pattern.is_match(executable))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{basename, Tools};

    fn tools() -> Tools {
        Tools::new(false, &[], &[], &[])
    }

    #[test]
    fn basename_strips_directories() {
        assert_eq!("gcc", basename("/usr/bin/gcc"));
        assert_eq!("gcc", basename("gcc"));
        assert_eq!("g++", basename("../toolchain/bin/g++"));
    }

    #[test]
    fn wrappers() {
        assert!(Tools::is_wrapper("ccache"));
        assert!(Tools::is_wrapper("distcc"));

        assert!(!Tools::is_wrapper("cc"));
        assert!(!Tools::is_wrapper("ccache2"));
    }

    #[test]
    fn mpi_wrappers() {
        assert!(Tools::is_mpi_wrapper("mpicc"));
        assert!(Tools::is_mpi_wrapper("mpicxx"));
        assert!(Tools::is_mpi_wrapper("mpiCC"));
        assert!(Tools::is_mpi_wrapper("mpic++"));
        assert!(Tools::is_mpi_wrapper("mpifort"));
        assert!(Tools::is_mpi_wrapper("mpif77"));
        assert!(Tools::is_mpi_wrapper("mpif90"));

        assert!(!Tools::is_mpi_wrapper("mpirun"));
        assert!(!Tools::is_mpi_wrapper("gcc"));
    }

    #[test]
    fn c_compilers() {
        let sut = tools();

        assert!(sut.is_c_compiler("cc"));
        assert!(sut.is_c_compiler("gcc"));
        assert!(sut.is_c_compiler("gcc-9"));
        assert!(sut.is_c_compiler("gcc-10.2.1"));
        assert!(sut.is_c_compiler("arm-none-eabi-gcc"));
        assert!(sut.is_c_compiler("mcc"));
        assert!(sut.is_c_compiler("clang"));
        assert!(sut.is_c_compiler("clang-11"));
        assert!(sut.is_c_compiler("icc"));
        assert!(sut.is_c_compiler("xlc"));
        assert!(sut.is_c_compiler("gxlc"));

        assert!(!sut.is_c_compiler("g++"));
        assert!(!sut.is_c_compiler("ld"));
        assert!(!sut.is_c_compiler("make"));
    }

    #[test]
    fn cxx_compilers() {
        let sut = tools();

        assert!(sut.is_cxx_compiler("c++"));
        assert!(sut.is_cxx_compiler("cxx"));
        assert!(sut.is_cxx_compiler("CC"));
        assert!(sut.is_cxx_compiler("g++"));
        assert!(sut.is_cxx_compiler("g++-9"));
        assert!(sut.is_cxx_compiler("arm-none-eabi-g++"));
        assert!(sut.is_cxx_compiler("clang++"));
        assert!(sut.is_cxx_compiler("clang++-11"));
        assert!(sut.is_cxx_compiler("icpc"));
        assert!(sut.is_cxx_compiler("xlC"));
        assert!(sut.is_cxx_compiler("xlc++"));

        assert!(!sut.is_cxx_compiler("cc"));
        assert!(!sut.is_cxx_compiler("gcc"));
    }

    #[test]
    fn fortran_compilers() {
        let sut = tools();

        assert!(sut.is_fortran_compiler("f95"));
        assert!(sut.is_fortran_compiler("gfortran"));
        assert!(sut.is_fortran_compiler("ifort"));
        assert!(sut.is_fortran_compiler("pgf77"));
        assert!(sut.is_fortran_compiler("pgf90"));
        assert!(sut.is_fortran_compiler("pgf95"));
        assert!(sut.is_fortran_compiler("pgfortran"));

        assert!(!sut.is_fortran_compiler("fort77"));
        assert!(!sut.is_fortran_compiler("gcc"));
    }

    #[test]
    fn declared_compilers_match_by_basename() {
        let sut = Tools::new(
            false,
            &["/opt/toolchain/bin/my-cc".to_string()],
            &["my-c++".to_string()],
            &[],
        );

        assert!(sut.is_c_compiler("my-cc"));
        assert!(sut.is_cxx_compiler("my-c++"));
        assert!(!sut.is_fortran_compiler("my-cc"));
    }

    #[test]
    fn only_use_disables_patterns() {
        let sut = Tools::new(true, &["my-cc".to_string()], &[], &[]);

        assert!(sut.is_c_compiler("my-cc"));
        assert!(!sut.is_c_compiler("gcc"));
        assert!(!sut.is_cxx_compiler("g++"));
        assert!(!sut.is_fortran_compiler("gfortran"));
    }
}
