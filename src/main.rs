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

use std::{env, path::PathBuf, process};

use clap::{crate_name, crate_version, App, AppSettings, Arg};
use log::error;

use intercept::Arguments;

mod intercept;

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    let args = parse_arguments();

    stderrlog::new().verbosity(args.verbose + 1).init().ok();

    match intercept::intercept_build(&args) {
        Ok(exit_code) => exit_code,
        Err(error) => {
            error!("internal error: {}", error);
            64
        }
    }
}

fn parse_arguments() -> Arguments {
    let default_cc = env::var("CC").unwrap_or_else(|_| "cc".to_string());
    let default_cxx = env::var("CXX").unwrap_or_else(|_| "c++".to_string());

    let matches = App::new(crate_name!())
        .version(crate_version!())
        .about("Generates a compilation database by intercepting the compiler calls of a build")
        .setting(AppSettings::TrailingVarArg)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Enable verbose output. Repeat the flag to increase verbosity."),
        )
        .arg(
            Arg::with_name("cdb")
                .short("o")
                .long("cdb")
                .value_name("file")
                .default_value("compile_commands.json")
                .help("The JSON compilation database."),
        )
        .arg(
            Arg::with_name("field-output")
                .long("field-output")
                .help("Put an output field into the entries when one was seen."),
        )
        .arg(
            Arg::with_name("use-cc")
                .long("use-cc")
                .value_name("path")
                .multiple(true)
                .number_of_values(1)
                .help("Classify the given program name as C compiler."),
        )
        .arg(
            Arg::with_name("use-cxx")
                .long("use-c++")
                .value_name("path")
                .multiple(true)
                .number_of_values(1)
                .help("Classify the given program name as C++ compiler."),
        )
        .arg(
            Arg::with_name("use-fortran")
                .long("use-fortran")
                .value_name("path")
                .multiple(true)
                .number_of_values(1)
                .help("Classify the given program name as Fortran compiler."),
        )
        .arg(
            Arg::with_name("use-only")
                .long("use-only")
                .help("Only use the compilers given on the command line."),
        )
        .arg(
            Arg::with_name("include")
                .long("include")
                .value_name("directory")
                .multiple(true)
                .number_of_values(1)
                .help("Only include sources under these directories in the output."),
        )
        .arg(
            Arg::with_name("exclude")
                .long("exclude")
                .value_name("directory")
                .multiple(true)
                .number_of_values(1)
                .help("Exclude sources under these directories from the output."),
        )
        .arg(
            Arg::with_name("append")
                .short("a")
                .long("append")
                .help("Extend an existing compilation database with the new entries."),
        )
        .arg(
            Arg::with_name("libear")
                .short("l")
                .long("libear")
                .value_name("path")
                .default_value(intercept::DEFAULT_PRELOAD_FILE)
                .help("The location of the interception library."),
        )
        .arg(
            Arg::with_name("COMMAND")
                .required(true)
                .multiple(true)
                .help("Build command to run."),
        )
        .get_matches();

    let strings = |name: &str| -> Vec<String> {
        matches
            .values_of(name)
            .map(|values| values.map(String::from).collect())
            .unwrap_or_default()
    };
    let paths = |name: &str| -> Vec<PathBuf> {
        matches
            .values_of(name)
            .map(|values| values.map(PathBuf::from).collect())
            .unwrap_or_default()
    };

    // the defaults stay recognized even when the operator names more
    // compilers on the command line
    let mut use_cc = vec![default_cc];
    use_cc.extend(strings("use-cc"));
    let mut use_cxx = vec![default_cxx];
    use_cxx.extend(strings("use-cxx"));
    let mut use_fortran = vec!["f95".to_string()];
    use_fortran.extend(strings("use-fortran"));

    Arguments {
        build: strings("COMMAND"),
        cdb: PathBuf::from(matches.value_of("cdb").unwrap()),
        append: matches.is_present("append"),
        field_output: matches.is_present("field-output"),
        use_only: matches.is_present("use-only"),
        use_cc,
        use_cxx,
        use_fortran,
        include: paths("include"),
        exclude: paths("exclude"),
        libear: PathBuf::from(matches.value_of("libear").unwrap()),
        verbose: matches.occurrences_of("verbose") as usize,
    }
}
