use bytes::BytesMut;
use serialink_frame::{encode_frame, Frame, FrameConfig, Session};

use crate::cmd::SendArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};
use crate::target;

pub fn run(args: SendArgs, format: OutputFormat, config: FrameConfig) -> CliResult<i32> {
    let request = args.request.resolve()?;
    let payload = args.payload.resolve()?;

    // Reject bad sizes before touching the link.
    encode_frame(request, &payload, &mut BytesMut::new())
        .map_err(|err| frame_error("invalid frame", err))?;

    let mut channel = target::connect(&args.target)?;
    let source = target::describe(&args.target);
    let mut session = Session::open_with_config(channel.as_mut(), config);

    if !args.wait {
        session
            .send(request, &payload)
            .map_err(|err| frame_error("send failed", err))?;
        tracing::info!(request, size = payload.len(), link = %source, "frame sent");
        session
            .close()
            .map_err(|err| frame_error("close failed", err))?;
        return Ok(SUCCESS);
    }

    let mut response = Vec::new();
    let code = session
        .send_and_receive(request, &payload, &mut response)
        .map_err(|err| frame_error("exchange failed", err))?;
    print_frame(&Frame::new(code, response), &source, format);

    session
        .close()
        .map_err(|err| frame_error("close failed", err))?;
    Ok(SUCCESS)
}
