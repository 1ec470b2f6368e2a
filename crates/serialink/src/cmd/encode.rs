use bytes::BytesMut;
use serialink_frame::encode_frame;

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_wire, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let request = args.request.resolve()?;
    let payload = args.payload.resolve()?;

    let mut wire = BytesMut::new();
    encode_frame(request, &payload, &mut wire).map_err(|err| frame_error("encode failed", err))?;
    print_wire(&wire, format);

    Ok(SUCCESS)
}
