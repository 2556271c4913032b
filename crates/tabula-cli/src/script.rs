//! Edit scripts
//!
//! One command per line. For `set`, everything after the address (and the
//! single space following it) is the cell text, so it may be empty.
//!
//! ```text
//! # comment
//! set A1 some text
//! blank A1
//! clear A1
//! print values
//! print texts
//! size
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tabula::{Position, Sheet};

/// Which side of the cells to print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintMode {
    Values,
    Texts,
}

/// A single script command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set { pos: Position, text: String },
    Blank(Position),
    Clear(Position),
    Print(PrintMode),
    Size,
}

/// Parse one script line; blank lines and comments yield `None`
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim_start();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (keyword, rest) = split_word(line);
    let command = match keyword {
        "set" => {
            let (address, text) = split_word(rest.trim_start());
            Command::Set {
                pos: parse_address(address)?,
                text: text.to_string(),
            }
        }
        "blank" => Command::Blank(parse_address(single_argument(keyword, rest)?)?),
        "clear" => Command::Clear(parse_address(single_argument(keyword, rest)?)?),
        "print" => match single_argument(keyword, rest)? {
            "values" => Command::Print(PrintMode::Values),
            "texts" => Command::Print(PrintMode::Texts),
            other => bail!("Unknown print mode '{}'", other),
        },
        "size" => {
            if !rest.trim().is_empty() {
                bail!("'size' takes no arguments");
            }
            Command::Size
        }
        other => bail!("Unknown command '{}'", other),
    };

    Ok(Some(command))
}

/// Split off the first word and the single whitespace character after it
fn split_word(s: &str) -> (&str, &str) {
    s.split_once(char::is_whitespace).unwrap_or((s, ""))
}

fn single_argument<'a>(keyword: &str, rest: &'a str) -> Result<&'a str> {
    let mut words = rest.split_whitespace();
    match (words.next(), words.next()) {
        (Some(arg), None) => Ok(arg),
        _ => bail!("'{}' takes exactly one argument", keyword),
    }
}

fn parse_address(address: &str) -> Result<Position> {
    if address.is_empty() {
        bail!("Missing cell address");
    }
    address
        .parse()
        .with_context(|| format!("Bad cell address '{}'", address))
}

/// Open a script file for reading
pub fn open_script(path: &Path) -> Result<BufReader<File>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    Ok(BufReader::new(file))
}

/// Run a script against `sheet`
///
/// Output of `print` and `size` goes to `out`. Commands the sheet rejects are
/// reported to `errors` with their line number and the script continues; a
/// malformed line or an I/O failure stops it.
pub fn run_script<R, W, E>(sheet: &mut Sheet, input: R, out: &mut W, errors: &mut E) -> Result<()>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
        let Some(command) = parse_line(&line).with_context(|| format!("line {}", line_no))? else {
            continue;
        };

        tracing::debug!(line = line_no, ?command, "executing");

        let outcome = match command {
            Command::Set { pos, text } => sheet.set_cell(pos, &text),
            Command::Blank(pos) => sheet.blank_cell(pos),
            Command::Clear(pos) => sheet.clear_cell(pos),
            Command::Print(mode) => {
                print_sheet(sheet, mode, out)?;
                Ok(())
            }
            Command::Size => {
                writeln!(out, "{}", sheet.printable_size())?;
                Ok(())
            }
        };

        if let Err(e) = outcome {
            tracing::warn!(line = line_no, error = %e, "command rejected");
            writeln!(errors, "line {}: {}", line_no, e)?;
        }
    }

    Ok(())
}

/// Print the sheet's values or texts
pub fn print_sheet<W: Write>(sheet: &Sheet, mode: PrintMode, out: &mut W) -> Result<()> {
    match mode {
        PrintMode::Values => sheet.print_values(out)?,
        PrintMode::Texts => sheet.print_texts(out)?,
    }
    Ok(())
}
