//! Marker-flag scanning over a wrapped tool's argument list.
//!
//! A marker is recognised in up to two spellings: the bare flag, which
//! consumes the following token as its value, and `--flag=value`. Every other
//! token is passed through untouched.

use crate::error::NicError;

/// How a marker flag takes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerValue {
    /// Bare switch, e.g. `--auto-nic-mappings`.
    None,
    /// Value is the next token, e.g. `--nic-mappings eth0=net0`.
    Next,
    /// Value is the next token or joined with `=`, e.g. `--nic=name=eth0`.
    NextOrJoined,
}

/// A marker flag recognised by one of the rewriters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub flag: &'static str,
    pub value: MarkerValue,
}

/// One scanned element of the argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scanned<'a> {
    /// A token that is not a marker.
    Plain(&'a str),
    /// An occurrence of the marker, with its value when it takes one.
    Marker(Option<&'a str>),
}

/// Iterator over `args` that folds each marker occurrence into one item.
pub struct MarkerScanner<I> {
    tokens: I,
    marker: Marker,
    joined_prefix: String,
    done: bool,
}

impl<'a, I> MarkerScanner<I>
where
    I: Iterator<Item = &'a str>,
{
    pub fn new(tokens: I, marker: Marker) -> Self {
        Self {
            tokens,
            marker,
            joined_prefix: format!("{}=", marker.flag),
            done: false,
        }
    }
}

impl<'a, I> Iterator for MarkerScanner<I>
where
    I: Iterator<Item = &'a str>,
{
    type Item = Result<Scanned<'a>, NicError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let token = self.tokens.next()?;

        if token == self.marker.flag {
            return Some(match self.marker.value {
                MarkerValue::None => Ok(Scanned::Marker(None)),
                MarkerValue::Next | MarkerValue::NextOrJoined => match self.tokens.next() {
                    Some(value) => Ok(Scanned::Marker(Some(value))),
                    None => {
                        self.done = true;
                        Err(NicError::ArgumentSyntax(self.marker.flag.to_string()))
                    }
                },
            });
        }

        if self.marker.value == MarkerValue::NextOrJoined {
            if let Some(value) = token.strip_prefix(self.joined_prefix.as_str()) {
                return Some(Ok(Scanned::Marker(Some(value))));
            }
        }

        Some(Ok(Scanned::Plain(token)))
    }
}

/// Scan an owned argument list for `marker`.
pub fn scan<'a>(
    args: &'a [String],
    marker: Marker,
) -> MarkerScanner<impl Iterator<Item = &'a str>> {
    MarkerScanner::new(args.iter().map(String::as_str), marker)
}

/// Whether `marker` occurs in `args` in any of its spellings.
pub fn contains(args: &[String], marker: Marker) -> bool {
    let joined = format!("{}=", marker.flag);
    args.iter().any(|arg| {
        arg == marker.flag
            || (marker.value == MarkerValue::NextOrJoined && arg.starts_with(joined.as_str()))
    })
}

/// Values of every occurrence of `marker`, in order.
pub fn values<'a>(args: &'a [String], marker: Marker) -> Result<Vec<&'a str>, NicError> {
    let mut found = Vec::new();
    for item in scan(args, marker) {
        if let Scanned::Marker(Some(value)) = item? {
            found.push(value);
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{contains, scan, values, Marker, MarkerValue, Scanned};
    use crate::error::NicError;

    const NIC: Marker = Marker {
        flag: "--nic",
        value: MarkerValue::NextOrJoined,
    };
    const AUTO: Marker = Marker {
        flag: "--auto",
        value: MarkerValue::None,
    };

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn folds_bare_and_joined_spellings() {
        let input = args(&["-x", "--nic", "a=b", "--nic=c=d", "--nicer", "y"]);
        let scanned: Vec<Scanned<'_>> = scan(&input, NIC)
            .collect::<Result<_, _>>()
            .expect("scan");
        assert_eq!(
            scanned,
            vec![
                Scanned::Plain("-x"),
                Scanned::Marker(Some("a=b")),
                Scanned::Marker(Some("c=d")),
                Scanned::Plain("--nicer"),
                Scanned::Plain("y"),
            ]
        );
    }

    #[test]
    fn bare_switch_takes_no_value() {
        let input = args(&["--auto", "next"]);
        let scanned: Vec<Scanned<'_>> = scan(&input, AUTO)
            .collect::<Result<_, _>>()
            .expect("scan");
        assert_eq!(scanned, vec![Scanned::Marker(None), Scanned::Plain("next")]);
    }

    #[test]
    fn trailing_marker_without_value_is_a_syntax_error() {
        let input = args(&["--size", "10G", "--nic"]);
        let result: Result<Vec<_>, _> = scan(&input, NIC).collect();
        assert!(matches!(result, Err(NicError::ArgumentSyntax(flag)) if flag == "--nic"));
    }

    #[test]
    fn contains_and_values_see_both_spellings() {
        let input = args(&["--nic=x=1", "--nic", "y=2"]);
        assert!(contains(&input, NIC));
        assert!(!contains(&input, AUTO));
        assert_eq!(values(&input, NIC).expect("values"), vec!["x=1", "y=2"]);
    }
}
