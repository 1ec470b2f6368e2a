use bytes::BytesMut;
use serialink_frame::decode_frame;

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let mut wire = BytesMut::from(parse_hex(&args.wire)?.as_slice());

    let frame = decode_frame(&mut wire)
        .map_err(|err| frame_error("decode failed", err))?
        .ok_or_else(|| CliError::new(DATA_INVALID, "decode failed: incomplete frame"))?;

    if !wire.is_empty() {
        tracing::warn!(trailing = wire.len(), "ignoring bytes after the first frame");
    }
    print_frame(&frame, "decode", format);

    Ok(SUCCESS)
}
