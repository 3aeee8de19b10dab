/// Parser for the LCOV `.info` format.
///
/// Reference: https://ltp.sourceforge.net/coverage/lcov/geninfo.1.php
///
/// Key records:
///   TN:<test name>
///   SF:<absolute path to source file>
///   FN:<line>,<function name>
///   FNDA:<execution count>,<function name>
///   FNF:<number of functions found>
///   FNH:<number of functions hit>
///   DA:<line number>,<execution count>[,<checksum>]
///   BRDA:<line>,<block>,<branch>,<taken>   ("-" means 0)
///   BRF:<branches found>
///   BRH:<branches hit>
///   LF:<lines found>
///   LH:<lines hit>
///   end_of_record
use std::io::BufRead;

use super::Parser;
use crate::error::Result;
use crate::model::*;

/// LCOV format parser.
pub struct LcovParser;

impl Parser for LcovParser {
    fn parse(&self, input: &[u8]) -> Result<Snapshot> {
        parse(input)
    }
}

/// Parse LCOV coverage data from raw bytes.
pub fn parse(input: &[u8]) -> Result<Snapshot> {
    let mut files = Snapshot::new();
    parse_streaming_reader(&mut &*input, &mut |file| files.push(file))?;
    Ok(files)
}

/// Totals declared by the summary records of one file. Missing totals are
/// derived from the detail records when the file is finished.
#[derive(Default)]
struct Declared {
    lines: (Option<u64>, Option<u64>),
    branches: (Option<u64>, Option<u64>),
    functions: (Option<u64>, Option<u64>),
}

/// Per-file accumulator between `SF` and `end_of_record`.
struct PendingFile {
    path: String,
    lines: Vec<LineDetail>,
    branches: Vec<BranchDetail>,
    function_hits: Vec<u64>,
    declared: Declared,
}

impl PendingFile {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            lines: Vec::new(),
            branches: Vec::new(),
            function_hits: Vec::new(),
            declared: Declared::default(),
        }
    }

    fn finish(self) -> FileRecord {
        let d = self.declared;

        let lines = CoverageCount::new(
            d.lines.0.unwrap_or(self.lines.len() as u64),
            d.lines
                .1
                .unwrap_or_else(|| self.lines.iter().filter(|l| l.hit > 0).count() as u64),
        );
        let branches = CoverageCount::new(
            d.branches.0.unwrap_or(self.branches.len() as u64),
            d.branches
                .1
                .unwrap_or_else(|| self.branches.iter().filter(|b| b.taken > 0).count() as u64),
        );
        let functions = CoverageCount::new(
            d.functions.0.unwrap_or(self.function_hits.len() as u64),
            d.functions
                .1
                .unwrap_or_else(|| self.function_hits.iter().filter(|&&h| h > 0).count() as u64),
        );

        FileRecord {
            file: self.path,
            branches: Some(BranchCoverage {
                count: branches,
                details: self.branches,
            }),
            functions: Some(functions),
            lines: Some(LineCoverage {
                count: lines,
                details: self.lines,
            }),
        }
    }
}

/// Streaming LCOV parser. Calls `emit` once per `end_of_record`.
fn parse_streaming_reader(
    reader: &mut dyn BufRead,
    emit: &mut dyn FnMut(FileRecord),
) -> Result<()> {
    let mut current: Option<PendingFile> = None;

    let mut raw_line = String::new();
    loop {
        raw_line.clear();
        let n = reader.read_line(&mut raw_line)?;
        if n == 0 {
            break;
        }

        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if line == "end_of_record" {
            if let Some(file) = current.take() {
                emit(file.finish());
            }
            continue;
        }

        let Some((tag, value)) = line.split_once(':') else {
            continue;
        };

        if tag == "SF" {
            if let Some(file) = current.take() {
                emit(file.finish());
            }
            current = Some(PendingFile::new(value));
            continue;
        }

        let Some(file) = current.as_mut() else {
            continue;
        };

        match tag {
            "DA" => {
                // DA:<line_number>,<execution_count>[,<checksum>]
                // Negative counts mark non-instrumentable lines.
                let mut parts = value.splitn(3, ',');
                let line_number = parts.next().and_then(|s| s.parse::<u32>().ok());
                let count = parts.next().and_then(|s| s.parse::<i64>().ok());
                if let (Some(line), Some(count)) = (line_number, count) {
                    if count >= 0 {
                        file.lines.push(LineDetail {
                            line,
                            hit: count as u64,
                        });
                    }
                }
            }
            "BRDA" => {
                // BRDA:<line>,<block>,<branch>,<taken>
                let parts: Vec<&str> = value.splitn(4, ',').collect();
                if parts.len() == 4 {
                    if let Ok(line) = parts[0].parse::<u32>() {
                        let taken = if parts[3] == "-" {
                            0
                        } else {
                            parts[3].parse::<u64>().unwrap_or(0)
                        };
                        file.branches.push(BranchDetail { line, taken });
                    }
                }
            }
            "FNDA" => {
                if let Some((count, _name)) = value.split_once(',') {
                    file.function_hits.push(count.parse::<u64>().unwrap_or(0));
                }
            }
            "LF" => file.declared.lines.0 = value.parse().ok(),
            "LH" => file.declared.lines.1 = value.parse().ok(),
            "BRF" => file.declared.branches.0 = value.parse().ok(),
            "BRH" => file.declared.branches.1 = value.parse().ok(),
            "FNF" => file.declared.functions.0 = value.parse().ok(),
            "FNH" => file.declared.functions.1 = value.parse().ok(),
            // TN, FN, VER and anything unknown.
            _ => {}
        }
    }

    // Handle case where file ends without end_of_record
    if let Some(file) = current.take() {
        emit(file.finish());
    }

    Ok(())
}
