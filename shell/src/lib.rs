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

use std::error::Error;

use lazy_static::lazy_static;
use regex::Regex;

/// Takes a command string and returns it as an argument list.
///
/// The string is tokenized POSIX-style, then each token goes through an
/// unescaping pass. Compilation database `command` fields and compiler
/// wrapper outputs are written by a shell, so both sources need the same
/// treatment.
pub fn split(string: &str) -> Result<Vec<String>, Box<dyn Error>> {
    match shlex::split(string) {
        Some(tokens) => Ok(tokens.iter().map(|token| unescape(token)).collect()),
        None => Err(format!("invalid shell syntax: {}", string))?,
    }
}

/// Gets rid of the escaping characters.
fn unescape(arg: &str) -> String {
    lazy_static! {
        static ref QUOTED: Regex = Regex::new(r#"\\(["\\])"#).unwrap();
        static ref PLAIN: Regex = Regex::new(r"\\([\\ $%&\(\)\[\]\{\}\*|<>@?!])").unwrap();
    }

    let bytes = arg.as_bytes();
    if arg.len() >= 2 && bytes[0] == b'"' && bytes[arg.len() - 1] == b'"' {
        QUOTED
            .replace_all(&arg[1..arg.len() - 1], "$1")
            .into_owned()
    } else {
        PLAIN.replace_all(arg, "$1").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::split;

    fn assert_split(expected: &[&str], string: &str) {
        let expected: Vec<String> = expected.iter().copied().map(String::from).collect();
        assert_eq!(expected, split(string).unwrap());
    }

    #[test]
    fn empty() {
        assert_split(&[], "");
    }

    #[test]
    fn plain_tokens() {
        assert_split(&["cc", "-c", "source.c"], "cc -c source.c");
        assert_split(&["cc", "-c", "source.c"], "  cc   -c\tsource.c ");
    }

    #[test]
    fn quoted_tokens() {
        assert_split(&["cc", "-DX=y z", "source.c"], r#"cc -DX="y z" source.c"#);
        assert_split(&["cc", "-DX=y z", "source.c"], r#"cc "-DX=y z" source.c"#);
        assert_split(&["cc", "-DX=y z", "source.c"], r"cc -DX=y\ z source.c");
    }

    #[test]
    fn escaped_characters() {
        assert_split(&["echo", "$HOME"], r"echo \$HOME");
        assert_split(&["ls", "a b"], r"ls a\ b");
    }

    #[test]
    fn unbalanced_quote_fails() {
        assert!(split(r#"cc "-DX=y z source.c"#).is_err());
    }
}
