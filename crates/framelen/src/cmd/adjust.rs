use std::fs::File;
use std::io::{BufReader, BufWriter};

use framelen_adjust::{adjust_frames, AdjustConfig, AdjustedFrame};
use framelen_frame::{Frame, FrameReader, FrameWriter};
use tracing::{debug, info};

use crate::cmd::AdjustArgs;
use crate::exit::{
    adjust_error, config_error, frame_error, io_error, CliError, CliResult, SUCCESS, USAGE,
};
use crate::output::{print_adjusted, OutputFormat};

pub fn run(args: AdjustArgs, format: OutputFormat) -> CliResult<i32> {
    let config = AdjustConfig::new(args.min, args.max, args.width)
        .map_err(|err| config_error("invalid configuration", err))?;

    let frames = resolve_frames(&args)?;
    info!(
        frames = frames.len(),
        min = args.min,
        max = args.max,
        lanes = args.width,
        "adjusting frames"
    );

    let adjusted =
        adjust_frames(&frames, config).map_err(|err| adjust_error("adjust failed", err))?;
    print_adjusted(&adjusted, format);

    if let Some(path) = &args.output {
        write_records(path, &adjusted)?;
    }

    Ok(SUCCESS)
}

fn resolve_frames(args: &AdjustArgs) -> CliResult<Vec<Frame>> {
    let mut frames = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            FrameReader::new(BufReader::new(file))
                .read_all()
                .map_err(|err| frame_error(&format!("failed reading {}", path.display()), err))?
        }
        None => args
            .frames
            .iter()
            .map(|hex| parse_hex(hex).map(Frame::new))
            .collect::<CliResult<Vec<_>>>()?,
    };

    let count = frames.len();
    for &index in &args.user_on {
        let frame = frames.get_mut(index).ok_or_else(|| {
            CliError::new(
                USAGE,
                format!("--user-on {index}: only {count} frames given"),
            )
        })?;
        frame.user = true;
    }
    Ok(frames)
}

fn write_records(path: &std::path::Path, adjusted: &[AdjustedFrame]) -> CliResult<()> {
    let context = format!("failed writing {}", path.display());
    let file = File::create(path).map_err(|err| io_error(&context, err))?;
    let written = FrameWriter::new(BufWriter::new(file))
        .write_frames(adjusted.iter().map(|out| &out.frame))
        .map_err(|err| frame_error(&context, err))?;
    debug!(frames = written, path = %path.display(), "wrote frame records");
    Ok(())
}

/// Parse hex digits, ignoring an optional `0x` prefix and `_`, `:` or
/// whitespace separators. An empty string is an empty frame.
fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = body
        .chars()
        .filter(|c| !matches!(c, '_' | ':') && !c.is_whitespace())
        .collect();

    hex::decode(&digits)
        .map_err(|err| CliError::new(USAGE, format!("--frame {input:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(frames: &[&str], user_on: Vec<usize>) -> AdjustArgs {
        AdjustArgs {
            min: 2,
            max: 4,
            width: 1,
            frames: frames.iter().map(|s| s.to_string()).collect(),
            input: None,
            user_on,
            output: None,
        }
    }

    #[test]
    fn parse_hex_accepts_separators_and_prefix() {
        assert_eq!(parse_hex("000102").unwrap(), vec![0, 1, 2]);
        assert_eq!(parse_hex("0xDE_AD").unwrap(), vec![0xde, 0xad]);
        assert_eq!(parse_hex("de:ad be").unwrap(), vec![0xde, 0xad, 0xbe]);
        assert!(parse_hex("").unwrap().is_empty());
    }

    #[test]
    fn parse_hex_rejects_bad_input() {
        assert_eq!(parse_hex("abc").unwrap_err().code, USAGE);
        assert_eq!(parse_hex("zz").unwrap_err().code, USAGE);
        let err = parse_hex("0x12g4").unwrap_err();
        assert!(err.message.contains("'g'"), "{}", err.message);
    }

    #[test]
    fn user_on_marks_frames() {
        let frames = resolve_frames(&args(&["00", "0102"], vec![1])).unwrap();
        assert!(!frames[0].user);
        assert!(frames[1].user);
    }

    #[test]
    fn user_on_out_of_range_is_usage() {
        let err = resolve_frames(&args(&["00"], vec![3])).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn records_round_trip_through_file() {
        let dir = std::env::temp_dir().join(format!("framelen-adjust-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.fl");

        let frames = resolve_frames(&args(&["00", "0001020304"], vec![0])).unwrap();
        let config = AdjustConfig::new(2, 4, 1).unwrap();
        let adjusted = adjust_frames(&frames, config).unwrap();
        write_records(&path, &adjusted).unwrap();

        let file = File::open(&path).unwrap();
        let read = FrameReader::new(file).read_all().unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0], Frame::flagged(vec![0, 0]));
        assert_eq!(read[1].data.as_ref(), &[0, 1, 2, 3]);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
