use clap::Parser;

use clusterd_controlapi::cli::ClusterCtlOpt;

fn main() {
    fluvio_future::subscriber::init_tracer(None);

    let opt = ClusterCtlOpt::parse();
    fluvio_future::task::run_block_on(opt.process_or_exit());
}
