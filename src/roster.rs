use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").unwrap());

/// PTX instructions documented by default, in processing order.
pub const BUILTIN: &[&str] = &[
    "abs", "cvta", "membar", "setp", "vabsdiff",
    "activemask", "discard", "min", "shf", "vabsdiff2",
    "add", "div", "mma", "shfl", "vabsdiff4",
    "addc", "dp2a", "mov", "shl", "vadd",
    "alloca", "dp4a", "movmatrix", "shr", "vadd2",
    "and", "elect", "mul", "sin", "vadd4",
    "applypriority", "ex2", "mul24", "slct", "vavrg2",
    "atom", "exit", "multimem", "sqrt", "vavrg4",
    "bar", "fence", "nanosleep", "st", "vmad",
    "barrier", "fma", "neg", "stackrestore", "vmax",
    "bfe", "fns", "not", "stacksave", "vmax2",
    "bfi", "getctarank", "or", "stmatrix", "vmax4",
    "bfind", "griddepcontrol", "pmevent", "sub", "vmin",
    "bmsk", "isspacep", "popc", "subc", "vmin2",
    "bra", "istypep", "prefetch", "suld", "vmin4",
    "brev", "ld", "prefetchu", "suq", "vote",
    "brkpt", "ldmatrix", "prmt", "sured", "vset",
    "brx", "ldu", "rcp", "sust", "vset2",
    "call", "lg2", "red", "szext", "vset4",
    "clz", "lop3", "redux", "tanh", "vshl",
    "cnot", "mad", "rem", "tcgen05", "vshr",
    "copysign", "mad24", "ret", "tensormap", "vsub",
    "cos", "madc", "rsqrt", "testp", "vsub2",
    "clusterlaunchcontrol", "mapa", "sad", "tex", "vsub4",
    "cp", "match", "selp", "tld4", "wgmma",
    "createpolicy", "max", "set", "trap", "wmma",
    "cvt", "mbarrier", "setmaxnreg", "txq", "xor",
];

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("invalid roster name {name:?} (line {line})")]
    InvalidName { name: String, line: usize },
    #[error("failed to read roster {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("--start {start} is out of range (1..={len})")]
    StartOutOfRange { start: usize, len: usize },
    #[error("--end {end} is out of range ({start}..={len})")]
    EndOutOfRange { start: usize, end: usize, len: usize },
}

/// Ordered list of canonical entry names. Duplicates are kept here and
/// dropped by [`Roster::dedup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    pub fn builtin() -> Self {
        Roster {
            names: BUILTIN.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_names<I, S>(names: I) -> Result<Self, RosterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        for (i, name) in names.iter().enumerate() {
            if !NAME_RE.is_match(name) {
                return Err(RosterError::InvalidName {
                    name: name.clone(),
                    line: i + 1,
                });
            }
        }
        Ok(Roster { names })
    }

    /// One name per line; blank lines and `#` comments are ignored.
    pub fn parse(text: &str) -> Result<Self, RosterError> {
        let mut names = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if !NAME_RE.is_match(line) {
                return Err(RosterError::InvalidName {
                    name: line.to_string(),
                    line: i + 1,
                });
            }
            names.push(line.to_string());
        }
        Ok(Roster { names })
    }

    pub fn from_file(path: &Path) -> Result<Self, RosterError> {
        let text = std::fs::read_to_string(path).map_err(|source| RosterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// 1-based inclusive slice; `end == 0` runs to the last name.
    pub fn range(&self, start: usize, end: usize) -> Result<Self, RosterError> {
        let len = self.names.len();
        if start == 0 || start > len {
            return Err(RosterError::StartOutOfRange { start, len });
        }
        let stop = if end == 0 { len } else { end };
        if stop < start || stop > len {
            return Err(RosterError::EndOutOfRange { start, end, len });
        }
        Ok(Roster {
            names: self.names[start - 1..stop].to_vec(),
        })
    }

    /// Unique names in first-seen order, plus how many repeats were dropped.
    pub fn dedup(&self) -> (Vec<&str>, usize) {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(self.names.len());
        for name in &self.names {
            if seen.insert(name.as_str()) {
                unique.push(name.as_str());
            }
        }
        let skipped = self.names.len() - unique.len();
        (unique, skipped)
    }

    /// Whether the name at `idx` already appeared earlier in the roster.
    pub fn is_repeat(&self, idx: usize) -> bool {
        self.names[..idx].contains(&self.names[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_roster() {
        let roster = Roster::builtin();
        assert_eq!(roster.len(), 145);
        assert_eq!(roster.names()[0], "abs");
        assert_eq!(roster.names()[144], "xor");
        let (unique, skipped) = roster.dedup();
        assert_eq!(unique.len(), 145);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn builtin_names_are_valid() {
        assert!(Roster::from_names(BUILTIN.iter().copied()).is_ok());
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let roster = Roster::from_names(["add", "abs", "add", "elect", "abs"]).unwrap();
        let (unique, skipped) = roster.dedup();
        assert_eq!(unique, ["add", "abs", "elect"]);
        assert_eq!(skipped, 2);
        assert!(!roster.is_repeat(0));
        assert!(roster.is_repeat(2));
    }

    #[test]
    fn rejects_non_identifiers() {
        let err = Roster::from_names(["add", "", "x"]).unwrap_err();
        assert!(matches!(err, RosterError::InvalidName { line: 2, .. }));
        assert!(Roster::from_names(["mov d"]).is_err());
        assert!(Roster::from_names(["1abs"]).is_err());
    }

    #[test]
    fn parse_skips_comments_and_blanks() {
        let roster = Roster::parse("# arithmetic\nabs\n\n  add  # integer add\nelect\n").unwrap();
        assert_eq!(roster.names(), ["abs", "add", "elect"]);
    }

    #[test]
    fn parse_reports_line_of_bad_name() {
        let err = Roster::parse("abs\nnot a name\n").unwrap_err();
        assert!(matches!(err, RosterError::InvalidName { line: 2, .. }));
    }

    #[test]
    fn range_is_one_based_inclusive() {
        let roster = Roster::from_names(["a", "b", "c", "d"]).unwrap();
        assert_eq!(roster.range(2, 3).unwrap().names(), ["b", "c"]);
        assert_eq!(roster.range(3, 0).unwrap().names(), ["c", "d"]);
        assert_eq!(roster.range(1, 0).unwrap(), roster);
    }

    #[test]
    fn range_validation() {
        let roster = Roster::from_names(["a", "b"]).unwrap();
        assert!(matches!(roster.range(0, 0), Err(RosterError::StartOutOfRange { .. })));
        assert!(matches!(roster.range(3, 0), Err(RosterError::StartOutOfRange { .. })));
        assert!(matches!(roster.range(2, 1), Err(RosterError::EndOutOfRange { .. })));
        assert!(matches!(roster.range(1, 5), Err(RosterError::EndOutOfRange { .. })));
    }

    #[test]
    fn from_file_missing() {
        let err = Roster::from_file(Path::new("tests/fixtures/no-roster.txt")).unwrap_err();
        assert!(matches!(err, RosterError::Read { .. }));
    }
}
