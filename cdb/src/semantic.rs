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
    collections::HashMap,
    error::Error,
    hash::{Hash, Hasher},
    path::{Path, PathBuf},
};

use itertools::Itertools;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use crate::{
    mpi::{MpiResolver, QueryResolver},
    normalize_path,
    source::classify_source,
    tools::{basename, Tools},
    Execution, Language,
};

// Compiler options ignored for the creation of a compilation database.
// Option names are mapped to the number of following arguments which
// should be skipped along with them.
const IGNORED_FLAGS: &[(&str, usize)] = &[
    // preprocessor make options, they would only cause duplicate entries
    ("-MD", 0),
    ("-MMD", 0),
    ("-MG", 0),
    ("-MP", 0),
    ("-MF", 1),
    ("-MT", 1),
    ("-MQ", 1),
    // linker options, the database holds compile commands only
    ("-static", 0),
    ("-shared", 0),
    ("-s", 0),
    ("-rdynamic", 0),
    ("-l", 1),
    ("-L", 1),
    ("-u", 1),
    ("-z", 1),
    ("-T", 1),
    ("-Xlinker", 1),
    // clang-cl / msvc cl specific flags
    ("-nologo", 0),
    ("-EHsc", 0),
    ("-EHa", 0),
];

// Options which prove the call was preprocess-only, driver-internal or a
// dry run. None of them produces an object file.
const NOT_A_COMPILATION: &[&str] = &["-E", "-cc1", "-cc1as", "-M", "-MM", "-###"];

lazy_static! {
    static ref IGNORED: HashMap<&'static str, usize> = IGNORED_FLAGS.iter().copied().collect();
    static ref LINKER_FLAG: Regex = Regex::new(r"^-(l|L|Wl,).+").unwrap();
}

/// Raw split of a compiler call, before path normalization. Phase and
/// output are kept as lists because nothing stops a command line from
/// repeating them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationCommand {
    pub compiler: String,
    pub language: Language,
    pub phase: Vec<String>,
    pub flags: Vec<String>,
    pub files: Vec<String>,
    pub output: Vec<String>,
}

/// A single compilation of a single source file.
///
/// Identity is the `(directory, source, phase, flags)` tuple: the same
/// translation unit compiled twice with different output names (or through
/// a differently spelled compiler) is one entry in the database.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub compiler: String,
    pub language: Language,
    pub phase: String,
    pub flags: Vec<String>,
    pub directory: PathBuf,
    pub source: PathBuf,
    pub output: Option<String>,
}

impl Compilation {
    pub fn new(
        compiler: String,
        language: Language,
        phase: String,
        flags: Vec<String>,
        directory: PathBuf,
        source: PathBuf,
        output: Option<String>,
    ) -> Self {
        let directory = normalize_path(&directory);
        let source = if source.is_absolute() {
            normalize_path(&source)
        } else {
            normalize_path(&directory.join(source))
        };

        Self {
            compiler,
            language,
            phase,
            flags,
            directory,
            source,
            output,
        }
    }

    fn identity(&self) -> (&Path, &Path, &str, &[String]) {
        (
            self.directory.as_path(),
            self.source.as_path(),
            self.phase.as_str(),
            self.flags.as_slice(),
        )
    }
}

impl PartialEq for Compilation {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Compilation {}

impl Hash for Compilation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

/// Generates the compilation entries of a single intercepted execution.
///
/// Most executions of a build are not compiler calls at all, those yield
/// nothing. A compiler call yields one entry per source file, and only
/// for sources which are present on disk.
pub fn iter_from_execution(execution: &Execution, tools: &Tools) -> Vec<Compilation> {
    iter_from_execution_with(execution, tools, &QueryResolver)
}

pub fn iter_from_execution_with(
    execution: &Execution,
    tools: &Tools,
    resolver: &dyn MpiResolver,
) -> Vec<Compilation> {
    let candidate = match split_command(&execution.cmd, tools, resolver) {
        Some(candidate) => candidate,
        None => return Vec::new(),
    };

    let mut result = Vec::new();
    for source in &candidate.files {
        let compilation = Compilation::new(
            candidate.compiler.clone(),
            candidate.language,
            candidate
                .phase
                .first()
                .cloned()
                .unwrap_or_else(|| "-c".to_string()),
            candidate.flags.clone(),
            execution.cwd.clone(),
            PathBuf::from(source),
            candidate.output.first().cloned(),
        );
        if compilation.source.is_file() {
            result.push(compilation);
        }
    }
    result
}

/// Returns a value when the command is a compilation, `None` otherwise.
fn split_command(
    command: &[String],
    tools: &Tools,
    resolver: &dyn MpiResolver,
) -> Option<CompilationCommand> {
    debug!("input was: {}", command.iter().join(" "));

    // quit right now, if the program was not a compiler
    let (compiler, language, arguments) = match split_compiler(command, tools, resolver) {
        Ok(Some(found)) => found,
        Ok(None) => return None,
        Err(error) => {
            warn!("compiler detection failed: {}", error);
            return None;
        }
    };

    let mut result = CompilationCommand {
        compiler,
        language,
        phase: Vec::new(),
        flags: Vec::new(),
        files: Vec::new(),
        output: Vec::new(),
    };

    let mut args = arguments.into_iter();
    while let Some(arg) = args.next() {
        // quit when compilation pass is not involved
        if NOT_A_COMPILATION.contains(&arg.as_str()) {
            return None;
        } else if arg == "-S" || arg == "-c" {
            result.phase.push(arg);
        // ignore some flags, together with their arguments
        } else if let Some(&count) = IGNORED.get(arg.as_str()) {
            for _ in 0..count {
                args.next();
            }
        } else if LINKER_FLAG.is_match(&arg) {
            // a linker concern, the compilation does not need it
        // some parameters look like a filename, take those explicitly
        } else if arg == "-D" || arg == "-U" || arg == "-I" || arg == "-include" {
            result.flags.push(arg);
            if let Some(value) = args.next() {
                result.flags.push(value);
            }
        // get the output file separately
        } else if arg == "-o" {
            if let Some(value) = args.next() {
                result.output.push(value);
            }
        // a parameter which looks like a source file is taken as one
        } else if arg.len() >= 2
            && !arg.starts_with('-')
            && classify_source(&arg, true).is_some()
        {
            result.files.push(arg);
        // and consider everything else as a compile option
        } else {
            result.flags.push(arg);
        }
    }
    debug!("output is: {:?}", result);

    // a compiler call without a source file is not a compilation
    if result.files.is_empty() {
        None
    } else {
        Some(result)
    }
}

/// A predicate to decide whether the command is a compiler call.
///
/// Peels compiler wrappers recursively and expands MPI wrappers through
/// the resolver. The returned compiler name is the `argv[0]` of whichever
/// executable was matched last, not a canonicalized one.
fn split_compiler(
    command: &[String],
    tools: &Tools,
    resolver: &dyn MpiResolver,
) -> Result<Option<(String, Language, Vec<String>)>, Box<dyn Error>> {
    let executable = match command.first() {
        Some(executable) => basename(executable),
        None => return Ok(None),
    };
    let parameters = &command[1..];

    // 'wrapper' 'parameters' and 'wrapper' 'compiler' 'parameters' are
    // both valid. Additionally, a wrapper can wrap another wrapper.
    if Tools::is_wrapper(executable) {
        return match split_compiler(parameters, tools, resolver)? {
            Some(result) => Ok(Some(result)),
            // a compiler wrapper without a compiler is a 'C' compiler
            None => Ok(Some((
                command[0].clone(),
                Language::C,
                parameters.to_vec(),
            ))),
        };
    }
    // MPI compiler wrappers add extra parameters. Query with the name as
    // invoked, to not pick a different executable from PATH.
    if Tools::is_mpi_wrapper(executable) {
        let mut mpi_call = resolver.resolve(&command[0])?;
        mpi_call.extend_from_slice(parameters);
        return split_compiler(&mpi_call, tools, resolver);
    }
    // and 'compiler' 'parameters' is valid too
    if tools.is_c_compiler(executable) {
        return Ok(Some((command[0].clone(), Language::C, parameters.to_vec())));
    }
    if tools.is_cxx_compiler(executable) {
        return Ok(Some((
            command[0].clone(),
            Language::Cxx,
            parameters.to_vec(),
        )));
    }
    if tools.is_fortran_compiler(executable) {
        return Ok(Some((
            command[0].clone(),
            Language::Fortran,
            parameters.to_vec(),
        )));
    }
    Ok(None)
}
