use getopts::Options;
use log::{error, info};
use std::{
    env,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
use wavefront_metrics::{resolve_proxy, Exporter, Registry, ReservoirManager};

fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

pub fn opts() -> Options {
    let mut opts = Options::new();

    opts.optopt("a", "address", "address of the wavefront proxy", "HOST:PORT");
    opts.optopt("i", "interval", "seconds between two flushes", "INTEGER");
    opts.optopt("d", "duration", "seconds to run for", "INTEGER");
    opts.optopt("p", "prefix", "prefix of every metric name", "STRING");
    opts.optflag("h", "help", "print this help menu");

    opts
}

fn parse_secs(value: Option<String>, default: u64) -> Result<u64, String> {
    match value {
        Some(v) => v.parse().map_err(|_| format!("not a number of seconds: {}", v)),
        None => Ok(default),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let program = &args[0];
    let opts = opts();

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            error!("Failed to parse command line args: {}", f);
            return;
        },
    };

    if matches.opt_present("help") {
        print_usage(program, &opts);
        return;
    }

    let address = matches.opt_str("address").unwrap_or_else(|| "localhost:2878".to_owned());
    let prefix = matches.opt_str("prefix").unwrap_or_else(|| "demo".to_owned());
    let (interval, duration) = match (
        parse_secs(matches.opt_str("interval"), 5),
        parse_secs(matches.opt_str("duration"), 30),
    ) {
        (Ok(i), Ok(d)) => (i, d),
        (Err(e), _) | (_, Err(e)) => {
            error!("{}", e);
            return;
        },
    };

    let proxy = match resolve_proxy(&address) {
        Ok(addr) => addr,
        Err(e) => {
            error!("{}", e);
            return;
        },
    };

    info!("wavefront proxy reporter");
    info!("proxy: {}", proxy);
    info!("flush interval: {}s", interval);

    let registry = Arc::new(Registry::new());
    let reservoirs = ReservoirManager::new();
    let tags = vec![("source", "proxy-reporter")];

    let requests = registry.counter("requests", tags.clone()).expect("requests counter");
    let delta = registry.delta_counter("requests", tags.clone()).expect("delta counter");
    let inflight = registry.gauge("inflight", tags.clone()).expect("inflight gauge");
    let latency = registry.timer("latency", tags.clone()).expect("latency timer");
    let window = registry
        .histogram("payload.size", tags, || {
            wavefront_metrics::Histogram::new(reservoirs.time_uniform_sample(Duration::from_secs(60), 1024))
        })
        .expect("payload histogram");

    let controller = match Exporter::builder()
        .proxy(proxy)
        .prefix(&prefix)
        .duration_unit(Duration::from_millis(1))
        .flush_interval(Duration::from_secs(interval))
        .build(registry)
        .spawn()
    {
        Ok(controller) => controller,
        Err(e) => {
            error!("failed to start exporter: {}", e);
            return;
        },
    };

    let t0 = Instant::now();
    let mut tick = 0;
    while t0.elapsed() < Duration::from_secs(duration) {
        tick += 1;
        let start = Instant::now();
        requests.inc(1);
        delta.inc(1);
        inflight.update(tick % 10);
        window.update(100 + (tick % 50) * 10);
        thread::sleep(Duration::from_millis(10 + (tick % 7) as u64));
        latency.update_since(start);
    }

    if let Err(e) = controller.flush_now() {
        error!("final flush failed: {}", e);
    }
    if let Err(e) = controller.shutdown() {
        error!("{}", e);
    }
    reservoirs.stop();

    info!("total requests recorded: {}", requests.count());
}
