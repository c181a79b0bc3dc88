//! Implementation of the 'probe' subcommand.
//!
//! An unusable encoder is a normal answer, so the exit code is 0 whatever
//! the probe finds.

use anyhow::Result;
use log::info;
use mediascan_core::{CoreConfig, EncoderTable, HardwareProbe, ProcessInvoker};

use crate::cli::ProbeArgs;
use crate::output::print_probe_results;

pub fn run_probe(config: CoreConfig, args: ProbeArgs) -> Result<i32> {
    let invoker = ProcessInvoker::new(config.tool_timeout);
    let table = EncoderTable::standard();
    info!("Probing hardware encoders (table version {})", table.version());
    let probe = HardwareProbe::new(config, table, invoker);

    let results = if args.encoders.is_empty() {
        probe.probe_all()
    } else {
        let mut results = Vec::with_capacity(args.encoders.len());
        for encoder in &args.encoders {
            results.push(probe.probe(*encoder)?);
        }
        results
    };

    let usable = results.iter().filter(|r| r.usable).count();
    info!("{} of {} encoder(s) usable", usable, results.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_probe_results(&results);
    }
    Ok(0)
}
