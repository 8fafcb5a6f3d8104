//! Line-oriented statement-map files.
//!
//! The format is DIMACS-flavored:
//!
//! ```text
//! c premises are zero-terminated literal lists
//! s 5
//! i 1 2 -3 0 1
//! u 2 4 0 1
//! ```
//!
//! `c` starts a comment, `s n` declares at least `n` statements,
//! `i` adds an inference (trailing token: conclusion literal) and
//! `u` adds an undercut (trailing token: target rule id). A rule id of
//! `0` requests auto-assignment.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use snafu::{ensure, OptionExt, ResultExt, Snafu};
use tap::Tap;
use tracing::debug;

use crate::lit::Lit;
use crate::map::StatementMap;
use crate::rule::RuleId;

#[derive(Debug, Snafu)]
pub enum ParseError {
    #[snafu(display("i/o error: {}", source))]
    Io { source: std::io::Error },

    #[snafu(display("line {}: unknown directive '{}'", line, directive))]
    UnknownDirective { line: usize, directive: String },

    #[snafu(display("line {}: bad integer '{}'", line, token))]
    BadInt {
        line: usize,
        token: String,
        source: std::num::ParseIntError,
    },

    #[snafu(display("line {}: missing {}", line, what))]
    Missing { line: usize, what: &'static str },

    #[snafu(display("line {}: invalid {}: {}", line, what, value))]
    BadValue { line: usize, what: &'static str, value: i32 },

    #[snafu(display("line {}: unexpected trailing tokens", line))]
    Trailing { line: usize },
}

pub fn parse_map_file<P: AsRef<Path>>(path: P) -> Result<StatementMap, ParseError> {
    let file = File::open(path).context(IoSnafu)?;
    parse_map(BufReader::new(file))
}

pub fn parse_map<R: BufRead>(reader: R) -> Result<StatementMap, ParseError> {
    let mut map = StatementMap::new();
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.context(IoSnafu)?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&directive, rest)) = tokens.split_first() else {
            continue;
        };
        match directive {
            "c" => continue,
            "s" => {
                ensure!(rest.len() <= 1, TrailingSnafu { line: line_number });
                let n = parse_int::<i32>(rest.first().copied(), "statement count", line_number)?;
                ensure!(
                    n >= 1,
                    BadValueSnafu {
                        line: line_number,
                        what: "statement count",
                        value: n
                    }
                );
                map.add_statement(n as u32);
            }
            "i" => {
                let (requested, premises, trailer) = parse_rule(rest, line_number)?;
                ensure!(
                    trailer != 0,
                    BadValueSnafu {
                        line: line_number,
                        what: "conclusion literal",
                        value: trailer
                    }
                );
                map.add_inference(premises, trailer, requested);
            }
            "u" => {
                let (requested, premises, trailer) = parse_rule(rest, line_number)?;
                ensure!(
                    trailer >= 1,
                    BadValueSnafu {
                        line: line_number,
                        what: "target rule id",
                        value: trailer
                    }
                );
                map.add_undercut(premises, RuleId::new(trailer as u32), requested);
            }
            _ => {
                return UnknownDirectiveSnafu {
                    line: line_number,
                    directive: directive.to_string(),
                }
                .fail();
            }
        }
    }
    Ok(map.tap(|map| {
        debug!(
            "parsed statement map: {} statements, {} inferences, {} undercuts",
            map.num_statements(),
            map.num_inferences(),
            map.num_undercuts()
        );
    }))
}

/// Parse `<id> <premise lits> 0 <trailer>`; the trailer's meaning is up
/// to the caller.
fn parse_rule(tokens: &[&str], line: usize) -> Result<(Option<RuleId>, Vec<Lit>, i32), ParseError> {
    let mut iter = tokens.iter().copied();
    let id = parse_int::<u32>(iter.next(), "rule id", line)?;
    let requested = (id != 0).then(|| RuleId::new(id));

    let mut premises = Vec::new();
    loop {
        let token = iter.next().context(MissingSnafu {
            line,
            what: "'0' terminator after premises",
        })?;
        let value: i32 = token.parse().context(BadIntSnafu { line, token })?;
        if value == 0 {
            break;
        }
        premises.push(Lit::new(value));
    }

    let trailer = parse_int::<i32>(iter.next(), "rule target", line)?;
    ensure!(iter.next().is_none(), TrailingSnafu { line });
    Ok((requested, premises, trailer))
}

fn parse_int<T: std::str::FromStr<Err = std::num::ParseIntError>>(
    token: Option<&str>,
    what: &'static str,
    line: usize,
) -> Result<T, ParseError> {
    let token = token.context(MissingSnafu { line, what })?;
    token.parse().context(BadIntSnafu { line, token })
}
