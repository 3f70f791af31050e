//! Converters backed by external programs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use mp_document::DocType;

use crate::{ConvertError, Converter};

const PANDOC_FORMAT: &str = "markdown+fancy_lists+fenced_code_blocks+fenced_code_attributes";

/// Markdown converter that shells out to `pandoc`.
#[derive(Debug, Clone, Default)]
pub struct PandocConverter;

impl Converter for PandocConverter {
    fn convert(&self, text: &str) -> Result<String, ConvertError> {
        let program = locate("pandoc")?;
        run_filter(
            &program,
            &["-f", PANDOC_FORMAT, "-t", "html", "--no-highlight"],
            text.as_bytes(),
        )
    }
}

/// AsciiDoc converter that shells out to `asciidoctor`.
///
/// Output is embedded HTML (no header or footer). The `blogpost` attribute is
/// always set so sources can tailor their output for publishing.
#[derive(Debug, Clone, Default)]
pub struct AsciidocConverter {
    doctype: DocType,
    attributes: Vec<String>,
}

impl AsciidocConverter {
    #[must_use]
    pub fn new(doctype: DocType, attributes: Vec<String>) -> Self {
        Self {
            doctype,
            attributes,
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-s".to_owned(),
            "-b".to_owned(),
            "html5".to_owned(),
            "-d".to_owned(),
            self.doctype.as_str().to_owned(),
            "-a".to_owned(),
            "blogpost".to_owned(),
        ];
        for attr in &self.attributes {
            args.push("-a".to_owned());
            args.push(attr.clone());
        }
        args.extend(["-o".to_owned(), "-".to_owned(), "-".to_owned()]);
        args
    }
}

impl Converter for AsciidocConverter {
    fn convert(&self, text: &str) -> Result<String, ConvertError> {
        let program = locate("asciidoctor")?;
        run_filter(&program, &self.args(), text.as_bytes())
    }
}

/// Find `program` on `PATH`.
pub(crate) fn locate(program: &str) -> Result<std::path::PathBuf, ConvertError> {
    which::which(program).map_err(|_| ConvertError::NotFound {
        program: program.to_owned(),
    })
}

/// Run `program` with `input` on stdin and return its stdout.
///
/// Stdin is fed from a separate thread so large outputs cannot deadlock
/// against a full stdin pipe.
pub(crate) fn run_filter<S: AsRef<std::ffi::OsStr>>(
    program: &Path,
    args: &[S],
    input: &[u8],
) -> Result<String, ConvertError> {
    let name = program
        .file_stem()
        .map_or_else(|| program.display().to_string(), |s| s.to_string_lossy().into_owned());
    tracing::debug!(program = %program.display(), "running converter");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ConvertError::Spawn {
            program: name.clone(),
            source,
        })?;

    let output = std::thread::scope(|scope| {
        if let Some(mut stdin) = child.stdin.take() {
            scope.spawn(move || {
                // A converter that exits early closes the pipe; its exit
                // status reports the real problem.
                let _ = stdin.write_all(input);
            });
        }
        child.wait_with_output()
    })
    .map_err(|source| ConvertError::Spawn {
        program: name.clone(),
        source,
    })?;

    if !output.status.success() {
        return Err(ConvertError::Process {
            program: name,
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_asciidoc_args() {
        let conv = AsciidocConverter::new(DocType::Manpage, vec!["toc".to_owned()]);
        assert_eq!(
            conv.args().join(" "),
            "-s -b html5 -d manpage -a blogpost -a toc -o - -"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_run_filter_pipes_stdin() {
        let cat = locate("cat").unwrap();
        let out = run_filter::<&str>(&cat, &[], b"hello").unwrap();
        assert_eq!(out, "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_filter_reports_exit_code() {
        let sh = locate("sh").unwrap();
        let err = run_filter(&sh, &["-c", "echo broken >&2; exit 3"], b"").unwrap_err();
        match err {
            ConvertError::Process {
                program,
                code,
                stderr,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(code, 3);
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_program() {
        let err = locate("definitely-not-a-real-converter").unwrap_err();
        assert!(matches!(err, ConvertError::NotFound { .. }));
    }
}
