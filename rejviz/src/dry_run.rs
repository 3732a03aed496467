use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::OutputFormat;

#[derive(Debug, Serialize)]
struct DryRun<'a, T: Serialize> {
    program: &'a str,
    args: &'a [String],
    nics: &'a [T],
}

/// Render the command line that would have been run, plus the NICs that
/// produced it.
pub fn render<T: Serialize>(
    format: OutputFormat,
    program: &str,
    args: &[String],
    nics: &[T],
) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut words = Vec::with_capacity(args.len() + 1);
            for word in std::iter::once(program).chain(args.iter().map(String::as_str)) {
                let quoted = shlex::try_quote(word)
                    .with_context(|| format!("failed to quote argument {word:?}"))?;
                words.push(quoted.into_owned());
            }
            Ok(words.join(" "))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&DryRun {
            program,
            args,
            nics,
        })?),
    }
}
