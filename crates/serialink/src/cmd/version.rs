use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("serialink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: serialink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("SERIALINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("features: serial={}, cli=true", cfg!(feature = "serial"));
    println!(
        "protocol: max_payload={}, poll_interval={}ms",
        serialink_frame::MAX_PAYLOAD,
        serialink_frame::DEFAULT_POLL_INTERVAL.as_millis()
    );

    Ok(SUCCESS)
}
