//! A process's position in its group, and checking what a whole group reported
//!
//! Every process prints its [`Placement`] as one `<rank>/<size>` line. [`GroupReport`] reads
//! the collected lines of a run back and checks that together they describe one complete group.
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use thiserror::Error;

use crate::error::{Error, Result};
use crate::topology::Rank;

/// A rank together with the size of the group it belongs to
///
/// Always satisfies `0 <= rank < size`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    rank: Rank,
    size: Rank,
}

impl Placement {
    /// Pair `rank` with `size`, failing with [`Error::InvalidPlacement`] unless
    /// `0 <= rank < size`.
    pub fn new(rank: Rank, size: Rank) -> Result<Placement> {
        if 0 <= rank && rank < size {
            Ok(Placement { rank, size })
        } else {
            Err(Error::InvalidPlacement { rank, size })
        }
    }

    /// Zero-based rank of the process
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Number of processes in the group
    pub fn size(&self) -> Rank {
        self.size
    }

    /// Write the `<rank>/<size>` line to `out` and flush it.
    pub fn write_line<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(out, "{}", self)?;
        out.flush()?;
        Ok(())
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.rank, self.size)
    }
}

impl FromStr for Placement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Placement> {
        let malformed = || Error::ParsePlacement {
            text: s.to_owned(),
        };
        let text = s.trim();
        let (rank, size) = text.split_once('/').ok_or_else(malformed)?;
        let rank = rank.parse().map_err(|_| malformed())?;
        let size = size.parse().map_err(|_| malformed())?;
        let placement = Placement::new(rank, size)?;
        // Integer parsing also takes `+1` and `01`, which `Display` never produces.
        if placement.to_string() != text {
            return Err(malformed());
        }
        Ok(placement)
    }
}

/// Why a set of output lines does not describe one complete group
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// No non-blank line at all.
    #[error("no placement was reported")]
    Empty,
    /// A line that does not parse as a valid placement.
    #[error("line {line}: `{text}` is not a valid <rank>/<size> placement")]
    Malformed {
        /// One-based line number
        line: usize,
        /// The line as read
        text: String,
    },
    /// A line whose group size differs from the first one's.
    #[error("line {line}: group size {found} differs from {expected} reported earlier")]
    SizeMismatch {
        /// One-based line number
        line: usize,
        /// Size reported by the first line
        expected: Rank,
        /// Size reported by this line
        found: Rank,
    },
    /// Two lines claiming the same rank.
    #[error("rank {0} was reported more than once")]
    DuplicateRank(Rank),
    /// A rank below the group size that no line reported.
    #[error("rank {0} was never reported")]
    MissingRank(Rank),
}

/// The placements reported by every process of one run, checked for consistency
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupReport {
    size: Rank,
    placements: Vec<Placement>,
}

impl GroupReport {
    /// Check the captured standard output of a run.
    pub fn from_output(output: &str) -> std::result::Result<GroupReport, ReportError> {
        GroupReport::from_lines(output.lines())
    }

    /// Check that `lines` contain exactly one placement per rank of a single group.
    ///
    /// Blank lines are skipped. Lines may appear in any order, as processes write independently.
    pub fn from_lines<I, S>(lines: I) -> std::result::Result<GroupReport, ReportError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut placements: Vec<Placement> = Vec::new();
        for (i, line) in lines.into_iter().enumerate() {
            let text = line.as_ref();
            if text.trim().is_empty() {
                continue;
            }
            let malformed = || ReportError::Malformed {
                line: i + 1,
                text: text.to_owned(),
            };
            let placement: Placement = text.parse().map_err(|_| malformed())?;
            // Processes print the line bare, so indentation or padding is a format error too.
            if placement.to_string() != text {
                return Err(malformed());
            }
            if let Some(first) = placements.first() {
                if placement.size != first.size {
                    return Err(ReportError::SizeMismatch {
                        line: i + 1,
                        expected: first.size,
                        found: placement.size,
                    });
                }
            }
            placements.push(placement);
        }

        let size = placements.first().ok_or(ReportError::Empty)?.size;
        placements.sort_by_key(Placement::rank);
        let mut expected: Rank = 0;
        for placement in &placements {
            if placement.rank < expected {
                return Err(ReportError::DuplicateRank(placement.rank));
            }
            if placement.rank > expected {
                return Err(ReportError::MissingRank(expected));
            }
            expected += 1;
        }
        if expected < size {
            return Err(ReportError::MissingRank(expected));
        }

        Ok(GroupReport { size, placements })
    }

    /// Size of the group every line agreed on
    pub fn size(&self) -> Rank {
        self.size
    }

    /// The placements, ordered by rank
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_rank_slash_size() {
        assert_eq!(Placement::new(0, 4).unwrap().to_string(), "0/4");
        assert_eq!(Placement::new(3, 4).unwrap().to_string(), "3/4");
    }

    #[test]
    fn rejects_out_of_range_ranks() {
        assert!(matches!(
            Placement::new(4, 4),
            Err(Error::InvalidPlacement { rank: 4, size: 4 })
        ));
        assert!(Placement::new(-1, 4).is_err());
        assert!(Placement::new(0, 0).is_err());
    }

    #[test]
    fn writes_one_line() {
        let mut out = Vec::new();
        Placement::new(1, 4).unwrap().write_line(&mut out).unwrap();
        assert_eq!(out, b"1/4\n");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_surface_as_io_errors() {
        let err = Placement::new(0, 1).unwrap().write_line(BrokenPipe).unwrap_err();
        match err {
            Error::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn parses_its_own_rendering() {
        let placement: Placement = " 2/8\n".parse().unwrap();
        assert_eq!((placement.rank(), placement.size()), (2, 8));
    }

    #[test]
    fn rejects_malformed_text() {
        for text in [
            "", "3", "3/", "/4", "a/4", "1/4/2", "1 / 4", "5/4", "+1/4", "1/+4", "01/04", "00/4",
            "-0/4",
        ] {
            assert!(text.parse::<Placement>().is_err(), "accepted {:?}", text);
        }
    }

    #[test]
    fn singleton_group() {
        let report = GroupReport::from_output("0/1\n").unwrap();
        assert_eq!(report.size(), 1);
        assert_eq!(report.placements(), &[Placement::new(0, 1).unwrap()]);
    }

    #[test]
    fn interleaved_group_of_four() {
        let report = GroupReport::from_output("2/4\n0/4\n3/4\n1/4\n").unwrap();
        assert_eq!(report.size(), 4);
        let ranks: Vec<Rank> = report.placements().iter().map(Placement::rank).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert!(GroupReport::from_lines(["", "1/2", "  ", "0/2"]).is_ok());
    }

    #[test]
    fn padded_lines_are_malformed() {
        assert_eq!(
            GroupReport::from_output("0/2\n  1/2\n"),
            Err(ReportError::Malformed {
                line: 2,
                text: String::from("  1/2")
            })
        );
        assert_eq!(
            GroupReport::from_output("+0/2\n1/2\n"),
            Err(ReportError::Malformed {
                line: 1,
                text: String::from("+0/2")
            })
        );
        assert!(GroupReport::from_output("0/2 \n1/2\n").is_err());
    }

    #[test]
    fn empty_output() {
        assert_eq!(GroupReport::from_output(""), Err(ReportError::Empty));
        assert_eq!(GroupReport::from_output("\n\n"), Err(ReportError::Empty));
    }

    #[test]
    fn malformed_line_is_located() {
        assert_eq!(
            GroupReport::from_output("0/2\nhello\n"),
            Err(ReportError::Malformed {
                line: 2,
                text: String::from("hello")
            })
        );
    }

    #[test]
    fn sizes_must_agree() {
        assert_eq!(
            GroupReport::from_output("0/2\n1/3\n"),
            Err(ReportError::SizeMismatch {
                line: 2,
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn each_rank_exactly_once() {
        assert_eq!(
            GroupReport::from_output("0/2\n0/2\n"),
            Err(ReportError::DuplicateRank(0))
        );
        assert_eq!(
            GroupReport::from_output("0/3\n2/3\n"),
            Err(ReportError::MissingRank(1))
        );
    }
}
