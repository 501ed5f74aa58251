//! External converter: runs a program that reads Asciidoc on stdin and
//! writes embedded HTML on stdout.
//!
//! The normalized option attributes are appended as `-a` flags, using the
//! Asciidoctor CLI spelling (`-a name=value`, `-a name` for `true`,
//! `-a name!` for `false`; a trailing `@` keeps its soft-set meaning).

use super::converter::{ConvertError, ConvertInput, Converter};
use crate::options::{AttributeValue, ConversionOptions};
use std::io::Write;
use std::process::{Command, Stdio};

/// Default invocation: Asciidoctor, embedded output, stdin to stdout.
pub const ASCIIDOCTOR_ARGV: &[&str] = &["asciidoctor", "--embedded", "-o", "-", "-"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConverter {
    argv: Vec<String>,
}

impl CommandConverter {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    pub fn asciidoctor() -> Self {
        Self::new(ASCIIDOCTOR_ARGV.iter().map(|s| s.to_string()).collect())
    }

    /// Full argument list (program excluded) for a set of options.
    pub fn arguments(&self, options: &ConversionOptions) -> Vec<String> {
        let mut args: Vec<String> = self.argv.iter().skip(1).cloned().collect();
        for (name, value) in &options.attributes {
            args.push("-a".to_string());
            args.push(match value {
                AttributeValue::Flag(true) => name.clone(),
                AttributeValue::Flag(false) => format!("{name}!"),
                other => format!("{name}={other}"),
            });
        }
        args
    }
}

impl Converter for CommandConverter {
    fn name(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("command")
    }

    fn convert(&self, input: &ConvertInput<'_>) -> Result<String, ConvertError> {
        let program = self.argv.first().ok_or(ConvertError::NoProgram)?;
        let mut child = Command::new(program)
            .args(self.arguments(input.options))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Feed stdin from a separate thread so a chatty child can't fill its
        // stdout pipe while we are still writing.
        let stdin = child.stdin.take();
        let source = input.source.to_string();
        let writer = std::thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(source.as_bytes())?;
            }
            Ok(())
        });

        let output = child.wait_with_output()?;
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));

        // A failing exit status is the more useful report, even when the
        // child also broke the pipe.
        if !output.status.success() {
            return Err(ConvertError::CommandFailed {
                program: program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // Exiting 0 without reading the whole document means the output
        // covers only part of it.
        written?;
        String::from_utf8(output.stdout).map_err(|_| ConvertError::InvalidOutput)
    }
}
