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
    error::Error,
    fs::{self, File},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    semantic::{iter_from_execution, Compilation},
    tools::Tools,
    Execution,
};

/// One object of the JSON compilation database.
///
/// Fields are declared in alphabetical order, which is also the key order
/// in the emitted file. The `command` form is accepted on read for
/// databases written by older tools, but never written.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DbEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    arguments: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<String>,

    directory: String,

    file: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
}

impl DbEntry {
    fn new(compilation: &Compilation, field_output: bool) -> Self {
        let source = pathdiff::diff_paths(&compilation.source, &compilation.directory)
            .unwrap_or_else(|| compilation.source.clone());
        let source = source.to_string_lossy().into_owned();

        let mut arguments = vec![compilation.compiler.clone(), compilation.phase.clone()];
        arguments.extend(compilation.flags.iter().cloned());
        if let Some(output) = &compilation.output {
            arguments.push("-o".to_string());
            arguments.push(output.clone());
        }
        arguments.push(source.clone());

        Self {
            arguments: Some(arguments),
            command: None,
            directory: compilation.directory.to_string_lossy().into_owned(),
            file: source,
            output: if field_output {
                compilation.output.clone()
            } else {
                None
            },
        }
    }

    fn into_execution(self) -> Result<Execution, Box<dyn Error>> {
        let cmd = match (self.command, self.arguments) {
            (Some(command), _) => shell::split(&command)?,
            (None, Some(arguments)) => arguments,
            (None, None) => {
                return Err("entry has neither 'arguments' nor 'command' field")?;
            }
        };

        Ok(Execution {
            cwd: PathBuf::from(self.directory),
            cmd,
        })
    }
}

/// Compilation database persistence.
pub struct CompilationDatabase;

impl CompilationDatabase {
    /// Saves the compilations to the given file.
    ///
    /// The whole document is rendered first, so an error leaves either the
    /// previous content or a complete new one behind.
    pub fn save<'a, I>(entries: I, filename: &Path, field_output: bool) -> Result<(), Box<dyn Error>>
    where
        I: IntoIterator<Item = &'a Compilation>,
    {
        let entries: Vec<DbEntry> = entries
            .into_iter()
            .map(|entry| DbEntry::new(entry, field_output))
            .collect();

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        entries.serialize(&mut serializer)?;

        fs::write(filename, buffer)?;
        Ok(())
    }

    /// Loads compilations from the given file.
    ///
    /// Each entry goes through the same command splitter as the runtime
    /// captures, so a malformed entry behaves like a malformed command
    /// line, and a stale entry whose source disappeared is dropped.
    pub fn load(filename: &Path, tools: &Tools) -> Result<Vec<Compilation>, Box<dyn Error>> {
        let handle = File::open(filename)?;
        let entries: Vec<DbEntry> = serde_json::from_reader(handle)?;

        let mut result = Vec::new();
        for entry in entries {
            let execution = entry.into_execution()?;
            result.extend(iter_from_execution(&execution, tools));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, fs, path::Path};

    use serde_json::json;

    use super::CompilationDatabase;
    use crate::{semantic::iter_from_execution, tools::Tools, Execution};

    fn tools() -> Tools {
        Tools::new(false, &[], &[], &[])
    }

    fn compile(directory: &Path, cmd: &[&str]) -> Vec<crate::semantic::Compilation> {
        let execution = Execution {
            cwd: directory.to_path_buf(),
            cmd: cmd.iter().copied().map(String::from).collect(),
        };
        iter_from_execution(&execution, &tools())
    }

    #[test]
    fn save_and_load_round_trip() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(directory.path().join("a.c"), b"").unwrap();
        fs::write(directory.path().join("b.c"), b"").unwrap();

        let entries = compile(
            directory.path(),
            &["gcc", "-c", "-O2", "a.c", "b.c", "-o", "a.o"],
        );
        assert_eq!(2, entries.len());

        let filename = directory.path().join("compile_commands.json");
        CompilationDatabase::save(&entries, &filename, false).unwrap();

        let loaded = CompilationDatabase::load(&filename, &tools()).unwrap();
        assert_eq!(entries, loaded);
    }

    #[test]
    fn entry_shape() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(directory.path().join("a.c"), b"").unwrap();

        let entries = compile(directory.path(), &["gcc", "-c", "-O2", "a.c", "-o", "a.o"]);
        let filename = directory.path().join("compile_commands.json");
        CompilationDatabase::save(&entries, &filename, false).unwrap();

        let content = fs::read_to_string(&filename).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();

        let entry = &parsed.as_array().unwrap()[0];
        assert_eq!(
            json!(["gcc", "-c", "-O2", "-o", "a.o", "a.c"]),
            entry["arguments"]
        );
        assert_eq!(json!("a.c"), entry["file"]);
        assert_eq!(
            json!(directory.path().to_str().unwrap()),
            entry["directory"]
        );
        assert!(entry.get("output").is_none());
        assert!(entry.get("command").is_none());

        // pretty-printed with four spaces, keys in sorted order
        assert!(content.contains("\n        \"arguments\": ["));
        assert!(content.find("\"arguments\"").unwrap() < content.find("\"directory\"").unwrap());
        assert!(content.find("\"directory\"").unwrap() < content.find("\"file\"").unwrap());
    }

    #[test]
    fn output_field_on_request() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(directory.path().join("a.c"), b"").unwrap();

        let entries = compile(directory.path(), &["gcc", "-c", "a.c", "-o", "a.o"]);
        let filename = directory.path().join("compile_commands.json");
        CompilationDatabase::save(&entries, &filename, true).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&filename).unwrap()).unwrap();
        assert_eq!(json!("a.o"), parsed.as_array().unwrap()[0]["output"]);
    }

    #[test]
    fn legacy_command_form_loaded() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(directory.path().join("a.c"), b"").unwrap();

        let content = json!([{
            "directory": directory.path().to_str().unwrap(),
            "file": "a.c",
            "command": "gcc -c -DX=\"y z\" a.c",
        }]);
        let filename = directory.path().join("compile_commands.json");
        fs::write(&filename, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = CompilationDatabase::load(&filename, &tools()).unwrap();
        assert_eq!(1, loaded.len());
        assert_eq!(vec!["-DX=y z"], loaded[0].flags);
        assert_eq!(directory.path().join("a.c"), loaded[0].source);
    }

    #[test]
    fn append_merge_deduplicates() {
        let directory = tempfile::tempdir().unwrap();
        for name in &["a.c", "b.c", "c.c"] {
            fs::write(directory.path().join(name), b"").unwrap();
        }
        let filename = directory.path().join("compile_commands.json");

        // first build compiles a.c and b.c
        let first = compile(directory.path(), &["gcc", "-c", "a.c", "b.c"]);
        CompilationDatabase::save(&first, &filename, false).unwrap();

        // second build compiles b.c and c.c; the union keeps one b.c
        let second = compile(directory.path(), &["gcc", "-c", "b.c", "c.c"]);
        let previous = CompilationDatabase::load(&filename, &tools()).unwrap();
        let merged: HashSet<_> = second.into_iter().chain(previous).collect();
        CompilationDatabase::save(&merged, &filename, false).unwrap();

        let loaded = CompilationDatabase::load(&filename, &tools()).unwrap();
        assert_eq!(3, loaded.len());
    }

    #[test]
    fn malformed_database_fails() {
        let directory = tempfile::tempdir().unwrap();
        let filename = directory.path().join("compile_commands.json");

        fs::write(&filename, b"not a json document").unwrap();
        assert!(CompilationDatabase::load(&filename, &tools()).is_err());

        fs::write(&filename, b"[ { } ]").unwrap();
        assert!(CompilationDatabase::load(&filename, &tools()).is_err());
    }

    #[test]
    fn missing_database_fails() {
        assert!(
            CompilationDatabase::load(Path::new("/no/such/compile_commands.json"), &tools())
                .is_err()
        );
    }
}
