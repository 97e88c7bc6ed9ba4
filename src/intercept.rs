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
    collections::HashSet,
    env,
    error::Error,
    io,
    os::unix::process::ExitStatusExt,
    path::{Path, PathBuf},
    process::Command,
};

use log::debug;

use cdb::{
    database::CompilationDatabase,
    filter::ContentFilter,
    semantic::{iter_from_execution, Compilation},
    tools::Tools,
    trace,
};

/// Default install location of the interception library.
pub const DEFAULT_PRELOAD_FILE: &str = "/usr/local/lib/tracebear/libear.so";

/// Validated command line arguments.
#[derive(Debug, Clone)]
pub struct Arguments {
    pub build: Vec<String>,
    pub cdb: PathBuf,
    pub append: bool,
    pub field_output: bool,
    pub use_only: bool,
    pub use_cc: Vec<String>,
    pub use_cxx: Vec<String>,
    pub use_fortran: Vec<String>,
    pub include: Vec<PathBuf>,
    pub exclude: Vec<PathBuf>,
    pub libear: PathBuf,
    pub verbose: usize,
}

/// Runs the build under interception and writes the compilation database.
///
/// The reported exit code is the build's own; problems with the database
/// itself surface as errors.
pub fn intercept_build(args: &Arguments) -> Result<i32, Box<dyn Error>> {
    let tools = Tools::new(
        args.use_only,
        &args.use_cc,
        &args.use_cxx,
        &args.use_fortran,
    );

    let (exit_code, current) = capture(args, &tools)?;

    // to support incremental builds, the entries of a previous run are
    // read back and merged with the current ones.
    if args.append && args.cdb.is_file() {
        let previous = CompilationDatabase::load(&args.cdb, &tools)?;
        let entries: HashSet<Compilation> = current.into_iter().chain(previous).collect();
        CompilationDatabase::save(&entries, &args.cdb, args.field_output)?;
    } else {
        CompilationDatabase::save(&current, &args.cdb, args.field_output)?;
    }

    Ok(exit_code)
}

fn capture(
    args: &Arguments,
    tools: &Tools,
) -> Result<(i32, HashSet<Compilation>), Box<dyn Error>> {
    let trace_dir = tempfile::Builder::new().prefix("intercept-").tempdir()?;

    let exit_code = run_build(&args.build, trace_dir.path(), &args.libear)?;

    let filter = ContentFilter::new(&args.include, &args.exclude, &env::current_dir()?);
    let mut result = HashSet::new();
    for filename in trace::exec_trace_files(trace_dir.path())? {
        if let Some(execution) = trace::parse_exec_trace(&filename) {
            for compilation in iter_from_execution(&execution, tools) {
                if filter.matches(&compilation) {
                    result.insert(compilation);
                }
            }
        }
    }

    Ok((exit_code, result))
}

/// Runs the build command with the interception environment and reports
/// its exit code. Termination by signal maps to the shell convention of
/// 128 plus the signal number, so an interrupted build reports 130.
fn run_build(command: &[String], trace_dir: &Path, libear: &Path) -> io::Result<i32> {
    debug!("run build {:?}", command);

    let mut build = Command::new(&command[0]);
    build.args(&command[1..]);
    build.env("INTERCEPT_BUILD_TARGET_DIR", trace_dir);
    if cfg!(target_os = "macos") {
        build
            .env("DYLD_INSERT_LIBRARIES", libear)
            .env("DYLD_FORCE_FLAT_NAMESPACE", "1");
    } else {
        build.env("LD_PRELOAD", libear);
    }

    let status = build.status()?;
    let exit_code = status
        .code()
        .unwrap_or_else(|| 128 + status.signal().unwrap_or(0));
    debug!("build finished with exit code: {}", exit_code);
    Ok(exit_code)
}
