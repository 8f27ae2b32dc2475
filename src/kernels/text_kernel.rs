//! Reader for NAIF text kernels (leapseconds, frame and meta-kernels).
//!
//! Only the lines between `\begindata` and `\begintext` markers are data.
//! A data block is a sequence of assignments:
//!
//! ```text
//! DELTET/DELTA_T_A = 32.184
//! DELTET/M         = ( 6.239996D0  1.99096871D-7 )
//! DELTET/DELTA_AT  = ( 10, @1972-JAN-1
//!                      11, @1972-JUL-1 )
//! KERNELS_TO_LOAD += ( '$KERNELS/de440s.bsp' )
//! ```
//!
//! Values are numbers (Fortran `D` exponents accepted), quoted strings (a
//! doubled quote `''` stands for one quote) or `@` dates, stored as formal
//! seconds past J2000.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0, none_of},
    combinator::{all_consuming, map_res, value},
    multi::many0,
    sequence::{delimited, preceded, terminated},
    IResult, Parser,
};

use crate::{spkstate_errors::SpkStateError, time::calendar::CalendarTime};

/// Value stored in the kernel pool.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolValue {
    Number(f64),
    Text(String),
}

impl PoolValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PoolValue::Number(number) => Some(*number),
            PoolValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PoolValue::Text(text) => Some(text),
            PoolValue::Number(_) => None,
        }
    }
}

/// Kernel pool variables, by name.
pub type PoolVariables = BTreeMap<String, Vec<PoolValue>>;

/// One `NAME = values` or `NAME += values` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub append: bool,
    pub values: Vec<PoolValue>,
}

/// A parsed text kernel.
#[derive(Debug, Clone)]
pub struct TextKernel {
    path: Utf8PathBuf,
    assignments: Vec<Assignment>,
}

impl TextKernel {
    /// Parse the content of a text kernel.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: Kernel location, used in error messages.
    /// * `content`: Full text of the kernel.
    ///
    /// Return
    /// ----------
    /// * The assignments of every data block, in file order, or
    ///   [`SpkStateError::TextKernelSyntax`] with the offending line.
    pub fn parse(path: impl Into<Utf8PathBuf>, content: &str) -> Result<Self, SpkStateError> {
        let path = path.into();
        let data = data_lines(content);

        let assignments = match all_consuming(assignments).parse(&data) {
            Ok((_, assignments)) => assignments,
            Err(err) => {
                let rest = match err {
                    nom::Err::Error(e) | nom::Err::Failure(e) => e.input,
                    nom::Err::Incomplete(_) => "",
                };
                let line = data[..data.len() - rest.len()].matches('\n').count() + 1;
                let excerpt: String = rest.chars().take_while(|c| *c != '\n').take(40).collect();
                return Err(SpkStateError::TextKernelSyntax {
                    path,
                    reason: format!("cannot parse line {line}: '{}'", excerpt.trim()),
                });
            }
        };

        Ok(TextKernel { path, assignments })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Apply the assignments to a set of pool variables, in file order.
    pub fn apply(&self, variables: &mut PoolVariables) {
        for assignment in &self.assignments {
            if assignment.append {
                variables
                    .entry(assignment.name.clone())
                    .or_default()
                    .extend(assignment.values.iter().cloned());
            } else {
                variables.insert(assignment.name.clone(), assignment.values.clone());
            }
        }
    }

    /// Pool variables defined by this kernel alone.
    pub fn variables(&self) -> PoolVariables {
        let mut variables = PoolVariables::new();
        self.apply(&mut variables);
        variables
    }
}

/// Keep the data lines and blank out the comment lines, so that line numbers
/// in error messages match the file.
fn data_lines(content: &str) -> String {
    let mut in_data = false;
    content
        .lines()
        .map(|line| match line.trim() {
            r"\begindata" => {
                in_data = true;
                ""
            }
            r"\begintext" => {
                in_data = false;
                ""
            }
            _ if in_data => line,
            _ => "",
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn separators(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_whitespace() || c == ',').parse(input)
}

fn variable_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !"=+(),'@".contains(c)).parse(input)
}

fn operator(input: &str) -> IResult<&str, bool> {
    alt((value(true, tag("+=")), value(false, tag("=")))).parse(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('\''),
        many0(alt((value('\'', tag("''")), none_of("'")))),
        char('\''),
    )
    .map(|chars| chars.into_iter().collect())
    .parse(input)
}

fn date(input: &str) -> IResult<&str, f64> {
    map_res(
        preceded(
            char('@'),
            take_while1(|c: char| !c.is_whitespace() && c != ',' && c != ')'),
        ),
        |text: &str| CalendarTime::parse(text).map(|time| time.formal_seconds),
    )
    .parse(input)
}

fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        take_while1(|c: char| c.is_ascii_digit() || "+-.EeDd".contains(c)),
        |text: &str| text.replace(['D', 'd'], "E").parse::<f64>(),
    )
    .parse(input)
}

fn scalar(input: &str) -> IResult<&str, PoolValue> {
    alt((
        quoted.map(PoolValue::Text),
        date.map(PoolValue::Number),
        number.map(PoolValue::Number),
    ))
    .parse(input)
}

fn values(input: &str) -> IResult<&str, Vec<PoolValue>> {
    alt((
        delimited(
            (char('('), separators),
            many0(terminated(scalar, separators)),
            char(')'),
        ),
        scalar.map(|value| vec![value]),
    ))
    .parse(input)
}

fn assignment(input: &str) -> IResult<&str, Assignment> {
    (variable_name, multispace0, operator, multispace0, values)
        .map(|(name, _, append, _, values)| Assignment {
            name: name.to_string(),
            append,
            values,
        })
        .parse(input)
}

fn assignments(input: &str) -> IResult<&str, Vec<Assignment>> {
    terminated(many0(preceded(separators, assignment)), separators).parse(input)
}

#[cfg(test)]
mod test_text_kernel {
    use super::*;

    const LSK_EXCERPT: &str = r"KPL/LSK

Some comments, DELTET/K = 1 here is not data.

\begindata

DELTET/DELTA_T_A =   32.184
DELTET/K         =    1.657D-3
DELTET/M = (  6.239996D0   1.99096871D-7 )
DELTET/DELTA_AT  = ( 10,   @1972-JAN-1
                     11,   @1972-JUL-1  )

\begintext

End of kernel.
";

    fn parse(content: &str) -> Result<TextKernel, SpkStateError> {
        TextKernel::parse("test.tk", content)
    }

    #[test]
    fn test_lsk_excerpt() {
        let variables = parse(LSK_EXCERPT).unwrap().variables();

        assert_eq!(variables.len(), 4);
        assert_eq!(variables["DELTET/DELTA_T_A"], vec![PoolValue::Number(32.184)]);
        assert_eq!(variables["DELTET/K"], vec![PoolValue::Number(1.657e-3)]);
        assert_eq!(
            variables["DELTET/M"],
            vec![PoolValue::Number(6.239996), PoolValue::Number(1.99096871e-7)]
        );
        assert_eq!(
            variables["DELTET/DELTA_AT"],
            vec![
                PoolValue::Number(10.0),
                PoolValue::Number(-883_656_000.0),
                PoolValue::Number(11.0),
                PoolValue::Number(-867_931_200.0),
            ]
        );
    }

    #[test]
    fn test_strings_and_append() {
        let content = r"
\begindata
PATH_VALUES     = ( '/data/kernels' )
KERNELS_TO_LOAD = ( 'a.tls',
                    'b.bsp' )
KERNELS_TO_LOAD += 'it''s.bsp'
NAME='x'
\begintext
";
        let variables = parse(content).unwrap().variables();

        let texts: Vec<&str> = variables["KERNELS_TO_LOAD"]
            .iter()
            .filter_map(PoolValue::as_text)
            .collect();
        assert_eq!(texts, vec!["a.tls", "b.bsp", "it's.bsp"]);
        assert_eq!(variables["NAME"][0].as_text(), Some("x"));
        assert_eq!(variables["PATH_VALUES"][0].as_number(), None);
    }

    #[test]
    fn test_reassignment_replaces() {
        let content = "\\begindata\nA = 1\nA = ( 2 3 )\n";
        let kernel = parse(content).unwrap();
        assert_eq!(kernel.assignments().len(), 2);
        assert_eq!(
            kernel.variables()["A"],
            vec![PoolValue::Number(2.0), PoolValue::Number(3.0)]
        );
    }

    #[test]
    fn test_no_data_block() {
        let kernel = parse("KPL/FK\nonly comments\n").unwrap();
        assert!(kernel.assignments().is_empty());
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let content = "KPL/LSK\n\\begindata\nA = 1\nB = ( 2 3\n\\begintext\n";
        let err = parse(content).unwrap_err();
        match err {
            SpkStateError::TextKernelSyntax { path, reason } => {
                assert_eq!(path, "test.tk");
                assert!(reason.contains("line 4"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
