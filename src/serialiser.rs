use crate::cue::Cue;
use crate::error::Result;
use crate::timestamp::format_timestamp;

use std::io::{BufWriter, Write};

/// Writes cues back out as a SubRip document, numbered from 1.
pub fn serialise<W: Write>(cues: &[Cue], output: W) -> Result<()> {
    let mut writer = BufWriter::new(output);
    for (idx, cue) in cues.iter().enumerate() {
        write_cue(&mut writer, idx + 1, cue)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_cue<W: Write>(buf: &mut W, seq: usize, cue: &Cue) -> Result<()> {
    writeln!(buf, "{}", seq)?;
    writeln!(
        buf,
        "{} --> {}",
        format_timestamp(cue.start),
        format_timestamp(cue.end)
    )?;
    for line in cue.text.lines() {
        writeln!(buf, "{}", line)?;
    }
    writeln!(buf)?;
    Ok(())
}
