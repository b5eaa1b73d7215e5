//! Receive-path demo daemon.
//!
//! Binds the receive transport, registers it with a mio poll loop (standing
//! in for the host application's readiness multiplexer), and reports inbound
//! traffic. Useful for watching live frames and for manual loss-injection
//! runs against a sending peer.
//!
//! # Usage
//!
//! ```sh
//! rhea-recv --bind 0.0.0.0:40123 --loss-rate 0.1 --seed 42
//! ```

use std::cell::Cell;
use std::net::SocketAddr;
use std::rc::Rc;
use std::time::Duration;

use mio::{Events, Poll, Token};

use rhea::events::{EventKind, EventRecorder};
use rhea::loss::RandomLossGenerator;
use rhea::net::Endpoint;
use rhea::protocol::{DataHeader, SetupHeader};
use rhea::rx::{
    DataFrameHandler, FrameDispatcher, FrameReceiver, ReceiverConfig, SetupFrameHandler,
    TransportError,
};

/// Poll token for the receive socket.
const RECV: Token = Token(0);

/// Default bind address.
const DEFAULT_BIND: &str = "0.0.0.0:40123";

/// Poll timeout; also picks up any datagrams left behind by a bounded drain.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Parsed command line options.
struct Options {
    bind: SocketAddr,
    loss_rate: f64,
    seed: u64,
}

/// Recorder that counts consumed datagrams.
///
/// One event is recorded per datagram pulled off the socket, which makes the
/// counter double as the drain signal for mio's edge-triggered readiness.
#[derive(Clone, Default)]
struct EventCounter {
    seen: Rc<Cell<u64>>,
    dropped: Rc<Cell<u64>>,
}

impl EventRecorder for EventCounter {
    fn record(&mut self, kind: EventKind, _frame: &[u8], _src: Endpoint) {
        self.seen.set(self.seen.get() + 1);
        if kind == EventKind::FrameInDropped {
            self.dropped.set(self.dropped.get() + 1);
        }
        if self.seen.get() % 100_000 == 0 {
            eprintln!(
                "rhea-recv: {} datagrams in, {} dropped by loss simulation",
                self.seen.get(),
                self.dropped.get()
            );
        }
    }
}

/// Data handler that tallies frames and bytes.
struct DataCounter {
    frames: u64,
    bytes: u64,
}

impl DataFrameHandler for DataCounter {
    fn on_frame(&mut self, header: &DataHeader<'_>, frame: &[u8], src: Endpoint) -> usize {
        self.frames += 1;
        self.bytes += frame.len() as u64;
        if self.frames % 100_000 == 0 {
            eprintln!(
                "rhea-recv: {} frames / {} bytes, last session {} from {src}",
                self.frames,
                self.bytes,
                header.session()
            );
        }
        1
    }
}

/// Setup handler that prints each stream announcement.
struct SetupPrinter;

impl SetupFrameHandler for SetupPrinter {
    fn on_frame(&mut self, header: &SetupHeader<'_>, _frame: &[u8], src: Endpoint) {
        eprintln!(
            "rhea-recv: SETUP session={} stream={} term_length={} mtu={} from {src}",
            header.session(),
            header.stream(),
            header.term_length(),
            header.mtu()
        );
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("rhea-recv: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), TransportError> {
    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args)?;

    rhea::init_tracing();

    let receiver = FrameReceiver::bind(&ReceiverConfig {
        bind_addr: Endpoint::from(options.bind),
        ..ReceiverConfig::default()
    })
    .map_err(TransportError::Bind)?;

    let counter = EventCounter::default();
    let mut dispatcher = FrameDispatcher::with_hooks(
        receiver,
        DataCounter { frames: 0, bytes: 0 },
        SetupPrinter,
        RandomLossGenerator::new(options.loss_rate, options.seed),
        counter.clone(),
    );

    let mut poll = Poll::new().map_err(TransportError::Register)?;
    dispatcher.register_for_read(poll.registry(), RECV)?;

    eprintln!(
        "rhea-recv: listening on {} (loss rate {})",
        dispatcher.local_addr().map_err(TransportError::Bind)?,
        options.loss_rate
    );

    let mut events = Events::with_capacity(16);
    loop {
        poll.poll(&mut events, Some(POLL_TIMEOUT))
            .map_err(TransportError::Register)?;

        // mio readiness is edge-triggered: drain until a pass consumes no
        // datagram, using the recorder's one-event-per-datagram invariant.
        loop {
            let before = counter.seen.get();
            dispatcher.receive_frames()?;
            if counter.seen.get() == before {
                break;
            }
        }
    }
}

/// Parses command line arguments.
fn parse_args(args: &[String]) -> Result<Options, TransportError> {
    fn invalid(msg: impl Into<String>) -> TransportError {
        TransportError::Bind(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            msg.into(),
        ))
    }

    let mut bind: SocketAddr = DEFAULT_BIND
        .parse()
        .map_err(|e| invalid(format!("default bind: {e}")))?;
    let mut loss_rate = 0.0f64;
    let mut seed = 0u64;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" | "-b" => {
                i += 1;
                let value = args.get(i).ok_or_else(|| invalid("missing value for --bind"))?;
                bind = value.parse().map_err(|e| invalid(format!("--bind: {e}")))?;
            }
            "--loss-rate" | "-l" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| invalid("missing value for --loss-rate"))?;
                loss_rate = value
                    .parse()
                    .map_err(|e| invalid(format!("--loss-rate: {e}")))?;
            }
            "--seed" | "-s" => {
                i += 1;
                let value = args.get(i).ok_or_else(|| invalid("missing value for --seed"))?;
                seed = value.parse().map_err(|e| invalid(format!("--seed: {e}")))?;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            arg => return Err(invalid(format!("unknown argument: {arg}"))),
        }
        i += 1;
    }

    Ok(Options {
        bind,
        loss_rate,
        seed,
    })
}

fn print_usage() {
    eprintln!(
        r#"rhea-recv - receive-path demo daemon

USAGE:
    rhea-recv [OPTIONS]

OPTIONS:
    -b, --bind <ADDR>        Bind address (default: 0.0.0.0:40123)
    -l, --loss-rate <RATE>   Simulated loss rate, 0.0..=1.0 (default: 0.0)
    -s, --seed <SEED>        Loss generator seed (default: 0)
    -h, --help               Print this help message

EXAMPLE:
    rhea-recv --bind 0.0.0.0:40123 --loss-rate 0.05 --seed 7
"#
    );
}
