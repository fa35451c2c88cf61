use crate::cue::Cue;
use crate::timestamp::to_seconds;

use nom::bytes::complete::{tag, take_till, take_until};
use nom::character::complete::{digit1, space0};
use nom::combinator::{all_consuming, map_res};
use nom::sequence::delimited;
use nom::IResult;
use tracing::debug;

/// Parses a SubRip (or WebVTT-shaped) document into cues.
///
/// Never fails: blocks without a timing line are skipped and broken
/// timestamps degrade to zero. Cues come back in document order.
pub fn parse(document: &str) -> Vec<Cue> {
    Parser::new().parse(document)
}

#[derive(Debug, Default)]
pub struct Parser {
    skipped: usize,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks the last call to [`Parser::parse`] had to skip.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn parse(&mut self, input: &str) -> Vec<Cue> {
        self.skipped = 0;
        let input = strip_bom(input);

        let mut cues = Vec::new();
        for block in blocks(input) {
            let found = block_cues(&block.lines);
            if found.is_empty() {
                self.skipped += 1;
                debug!(
                    line = block.first_line,
                    "Skipping subtitle block without a timing line"
                );
            }
            cues.extend(found);
        }
        cues
    }
}

struct Block<'a> {
    first_line: usize,
    lines: Vec<&'a str>,
}

fn strip_bom(input: &str) -> &str {
    input.strip_prefix('\u{FEFF}').unwrap_or(input)
}

/// Groups the document into runs of non-blank lines.
fn blocks(input: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;

    for (idx, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }
        current
            .get_or_insert_with(|| Block {
                first_line: idx + 1,
                lines: Vec::new(),
            })
            .lines
            .push(line);
    }
    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

/// Cues of one run of non-blank lines. Every timing line starts a new cue,
/// so blocks that are not separated by a blank line still come apart.
fn block_cues(lines: &[&str]) -> Vec<Cue> {
    let timings: Vec<(usize, (&str, &str))> = lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| timing_line(line).ok().map(|(_, times)| (idx, times)))
        .collect();

    // Anything in front of the first timing line is an index or a WebVTT cue id.
    if let Some(&(first, _)) = timings.first() {
        if first > 0 && seq_num(lines[0].trim()).is_err() {
            debug!(header = lines[0], "Ignoring non-numeric cue identifier");
        }
    }

    timings
        .iter()
        .enumerate()
        .map(|(n, &(timing_idx, (start, end)))| {
            let mut text_end = timings.get(n + 1).map_or(lines.len(), |&(next, _)| next);
            // The next cue's index sits right above its timing line.
            if text_end < lines.len()
                && text_end > timing_idx + 1
                && seq_num(lines[text_end - 1].trim()).is_ok()
            {
                text_end -= 1;
            }
            let text = lines[timing_idx + 1..text_end]
                .iter()
                .map(|line| line.trim())
                .collect::<Vec<_>>()
                .join("\n");
            Cue::new(to_seconds(start), to_seconds(end), text)
        })
        .collect()
}

/// `start --> end [settings]`, returning the raw start and end strings.
fn timing_line(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, start) = take_until("-->")(input)?;
    let (input, _) = tag("-->")(input)?;
    // Cue settings such as `align:center` may follow the end timestamp.
    let (input, end) = delimited(space0, take_till(|c: char| c.is_whitespace()), space0)(input)?;

    Ok((input, (start.trim(), end)))
}

fn seq_num(input: &str) -> IResult<&str, usize> {
    all_consuming(map_res(digit1, |s: &str| s.parse()))(input)
}
