use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serialink_channel::Channel;
use serialink_frame::{FrameConfig, Request, Session};

use crate::cmd::listen::{
    classify_recv_error, install_ctrlc_handler, serve_config, RecvDisposition,
};
use crate::cmd::EchoArgs;
use crate::exit::{channel_error, frame_error, CliResult, SUCCESS};
use crate::target::{self, Inbound};

pub fn run(args: EchoArgs, config: FrameConfig) -> CliResult<i32> {
    let inbound = target::listen(&args.target)?;
    let source = target::describe(&args.target);
    let config = serve_config(config);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    match inbound {
        Inbound::Socket(listener) => {
            tracing::info!(link = %source, "echo server ready");
            while running.load(Ordering::SeqCst) {
                let mut channel = listener
                    .accept()
                    .map_err(|err| channel_error("accept failed", err))?;
                let mut session = Session::attach(&mut channel, config.clone());
                serve(&mut session, &running)?;
            }
        }
        Inbound::Serial(mut channel) => {
            tracing::info!(link = %source, "echo server ready");
            let mut session = Session::open_with_config(channel.as_mut(), config);
            serve(&mut session, &running)?;
            session
                .close()
                .map_err(|err| frame_error("close failed", err))?;
        }
    }

    Ok(SUCCESS)
}

/// Answer each frame with the same payload under the slave form of its request.
fn serve<C: Channel + ?Sized>(
    session: &mut Session<'_, C>,
    running: &AtomicBool,
) -> CliResult<()> {
    let mut payload = Vec::new();
    while running.load(Ordering::SeqCst) {
        let code = match session.receive(&mut payload) {
            Ok(code) => code,
            Err(err) => match classify_recv_error(err) {
                RecvDisposition::Idle | RecvDisposition::Skip => continue,
                RecvDisposition::Disconnected => return Ok(()),
                RecvDisposition::Fatal(err) => return Err(err),
            },
        };

        let reply = reply_request(code);
        if payload.is_empty() {
            tracing::warn!(request = %reply, "empty payload cannot be echoed");
            continue;
        }

        tracing::info!(request = %reply, size = payload.len(), "echoing frame");
        session
            .send(reply.byte(), &payload)
            .map_err(|err| frame_error("echo send failed", err))?;
    }
    Ok(())
}

fn reply_request(code: u8) -> Request {
    Request::from(code).as_slave()
}
