// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "std"))]
compile_error!("asimov-camerax-bridge requires the 'std' feature");

use asimov_camerax_bridge::{
    cli::{handle_error, info_user, warn_user_with_error},
    shared::{
        Bridge, BridgeConfig, BridgeError, BridgeResult, Envelope, LensFacing, QueueMessenger,
        Size,
        drivers::loopback::{LoopbackCameraX, LoopbackConfig, LoopbackTextureRegistry},
    },
};
use asimov_module::SysexitsError::{self, *};
use clap::Parser;
use clientele::StandardOptions;
use serde_json::{Value, json};
use std::{
    error::Error as StdError,
    io::{self, BufRead, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError},
    },
    time::Duration,
};

#[derive(Debug, Parser)]
struct Options {
    #[clap(flatten)]
    flags: StandardOptions,

    /// Which way the simulated camera faces.
    #[arg(long, value_parser = parse_lens, default_value = "back")]
    lens: LensFacing,

    /// Sensor size of the simulated camera.
    #[arg(short, long = "size", value_parser = parse_dimensions, default_value = "1920x1080")]
    size: (u32, u32),

    /// How many remote events may be pending before new ones are dropped.
    #[arg(long, default_value_t = 64)]
    event_capacity: usize,
}

pub fn main() -> Result<SysexitsError, Box<dyn StdError>> {
    asimov_module::dotenv().ok();
    let args = asimov_module::args_os()?;
    let options = Options::parse_from(args);

    if options.flags.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(EX_OK);
    }

    if options.flags.license {
        print!("{}", include_str!("../../UNLICENSE"));
        return Ok(EX_OK);
    }

    #[cfg(feature = "tracing")]
    asimov_module::init_tracing_subscriber(&options.flags).expect("failed to initialize logging");

    let exit_code = match run_host(&options) {
        Ok(()) => EX_OK,
        Err(err) => handle_error(&err, &options.flags),
    };

    Ok(exit_code)
}

fn run_host(opts: &Options) -> BridgeResult {
    let quit = Arc::new(AtomicBool::new(false));
    {
        let quit2 = Arc::clone(&quit);
        ctrlc::set_handler(move || {
            quit2.store(true, Ordering::SeqCst);
        })
        .map_err(|e| BridgeError::other(format!("{e}")))?;
    }

    let (width, height) = opts.size;
    let config = BridgeConfig::new()
        .with_event_capacity(opts.event_capacity)
        .with_diagnostics(opts.flags.debug || opts.flags.verbose >= 3);
    let camerax = LoopbackCameraX::new(
        LoopbackConfig::default()
            .with_sensor_size(Size::new(width, height))
            .with_lens_facing(opts.lens),
    );

    let (messenger, events) = QueueMessenger::new(config.event_capacity);
    let bridge = Bridge::new(
        config,
        Arc::new(camerax),
        Arc::new(LoopbackTextureRegistry::new()),
        Arc::new(messenger),
    );

    info_user(
        &opts.flags,
        &format!("bridge ready ({:?} lens, {width}x{height} sensor)", opts.lens),
    );

    let lines = spawn_stdin_reader();
    let mut stdout = io::stdout().lock();

    while !quit.load(Ordering::SeqCst) {
        let line = match lines.recv_timeout(Duration::from_millis(50)) {
            Ok(line) => Some(line),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        if let Some(line) = line.filter(|line| !line.trim().is_empty()) {
            let reply = bridge.handle_message(line.as_bytes());
            if bridge.diagnostics() {
                info_user(&opts.flags, &format!("call: {}", line.trim()));
                info_user(&opts.flags, &format!("reply: {}", String::from_utf8_lossy(&reply)));
            }
            write_line(&mut stdout, &reply, &quit)?;
        }

        for envelope in events.try_iter() {
            write_line(&mut stdout, &event_line(&opts.flags, envelope), &quit)?;
        }
    }

    bridge.instance_manager().clear();
    for envelope in events.try_iter() {
        write_line(&mut stdout, &event_line(&opts.flags, envelope), &quit)?;
    }

    Ok(())
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn event_line(flags: &StandardOptions, envelope: Envelope) -> Vec<u8> {
    let event = match serde_json::from_slice::<Value>(&envelope.payload) {
        Ok(event) => event,
        Err(err) => {
            warn_user_with_error(flags, "undecodable remote event", &err);
            Value::Null
        },
    };
    json!({ "channel": envelope.channel, "event": event })
        .to_string()
        .into_bytes()
}

fn write_line(out: &mut impl Write, line: &[u8], quit: &AtomicBool) -> BridgeResult {
    let result = out
        .write_all(line)
        .and_then(|_| out.write_all(b"\n"))
        .and_then(|_| out.flush());
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            quit.store(true, Ordering::SeqCst);
            Ok(())
        },
        Err(err) => Err(BridgeError::native("writing to stdout", err)),
    }
}

fn parse_lens(s: &str) -> Result<LensFacing, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "front" => Ok(LensFacing::Front),
        "back" => Ok(LensFacing::Back),
        "external" => Ok(LensFacing::External),
        other => Err(format!("Invalid lens '{other}'. Use front, back or external")),
    }
}

fn parse_dimensions(s: &str) -> Result<(u32, u32), String> {
    let s = s.trim().replace('×', "x");
    let (width, height) = s
        .split_once('x')
        .map(|(w, h)| (w.trim(), h.trim()))
        .filter(|(w, h)| !w.is_empty() && !h.is_empty())
        .ok_or_else(|| format!("Invalid format '{s}'. Use WxH (e.g., 1920x1080)"))?;

    let width: u32 = width.parse().map_err(|_| format!("Invalid width: {width}"))?;
    let height: u32 = height.parse().map_err(|_| format!("Invalid height: {height}"))?;

    if !(160..=7680).contains(&width) {
        return Err(format!("Width {width} is out of reasonable range (160-7680)"));
    }
    if !(120..=4320).contains(&height) {
        return Err(format!("Height {height} is out of reasonable range (120-4320)"));
    }

    Ok((width, height))
}
